use crate::error::Result;
use crate::foundation::tracker::CompletionTracker;
use std::fs;
use std::path::Path;

/// Treats an album as downloaded when its folder exists and is not empty.
///
/// Nothing is persisted. This cannot tell a finished download from one that was
/// interrupted halfway: any file left in the folder counts as complete. Use
/// [`CompletionLog`](super::CompletionLog) when that distinction matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct FolderPresence;

impl CompletionTracker for FolderPresence {
    fn is_done(&self, _artist: &str, _album: &str, destination: &Path) -> bool {
        fs::read_dir(destination)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    fn mark_done(&self, _artist: &str, _album: &str) -> Result<()> {
        Ok(())
    }
}
