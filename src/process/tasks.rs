//! Turning a catalog into the list of albums that still need downloading.

use crate::error::{AppError, Result};
use crate::foundation::catalog::Catalog;
use crate::foundation::tracker::CompletionTracker;
use crate::foundation::utils::sanitize_folder_name;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One album to download into one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub source_url: String,
    pub destination: PathBuf,
    pub artist: String,
    pub album: String,
}

impl Task {
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.album)
    }
}

/// Folder an album is downloaded into: `root/<artist>/<album>`, both sanitized.
pub fn album_folder(root: &Path, artist: &str, album: &str) -> PathBuf {
    root.join(sanitize_folder_name(artist))
        .join(sanitize_folder_name(album))
}

/// Builds the pending tasks for a catalog, in catalog order.
///
/// Albums without a URL are skipped with a warning whatever their completion
/// state. Albums the tracker reports as done are skipped. Every remaining album
/// gets its destination folder created before its task is emitted.
///
/// # Arguments
///
/// * `catalog` - The artist and albums to consider.
/// * `root` - Download root under which artist folders live.
/// * `tracker` - Decides which albums are already downloaded.
///
pub fn build_tasks(
    catalog: &Catalog,
    root: &Path,
    tracker: &dyn CompletionTracker,
) -> Result<Vec<Task>> {
    let artist = &catalog.artist_name;
    let mut tasks = Vec::new();

    for album in &catalog.albums {
        let Some(url) = album.url() else {
            warn!(artist = %artist, album = %album.name, "album has no URL");
            println!(
                "\x1b[33mSkipping {} - {}: no album URL\x1b[0m",
                artist, album.name
            );
            continue;
        };

        let destination = album_folder(root, artist, &album.name);

        if tracker.is_done(artist, &album.name, &destination) {
            println!("Already downloaded: {} - {}", artist, album.name);
            continue;
        }

        fs::create_dir_all(&destination).map_err(|source| AppError::CreateFolder {
            path: destination.clone(),
            source,
        })?;
        tasks.push(Task {
            source_url: url.to_string(),
            destination,
            artist: artist.clone(),
            album: album.name.clone(),
        });
    }

    Ok(tasks)
}
