//! Deciding whether an album has already been downloaded.
//!
//! Two strategies exist: an explicit JSON log written after every successful
//! download, and a plain look at the destination folder on disk.

mod completion_log;
mod folder_presence;

pub use completion_log::{CompletionLog, CompletionRecord};
pub use folder_presence::FolderPresence;

use crate::error::Result;
use std::path::Path;

/// Shared by every worker of a batch, so implementations must be thread safe.
pub trait CompletionTracker: Send + Sync {
    /// `artist` and `album` are the raw catalog names, `destination` the sanitized album folder.
    fn is_done(&self, artist: &str, album: &str, destination: &Path) -> bool;

    /// Records a successful download. Called from worker threads.
    fn mark_done(&self, artist: &str, album: &str) -> Result<()>;
}
