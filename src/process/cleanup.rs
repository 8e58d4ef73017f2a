use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::{debug, warn};

/// Removes the downloader's shared cache directory after a batch.
///
/// Returns whether anything was removed. A missing directory is not an error.
pub fn clean_cache(cache_dir: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(cache_dir) {
        Ok(()) => {
            debug!(path = %cache_dir.display(), "cache directory removed");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Like [`clean_cache`], but a failure only produces a warning: every download
/// of the batch has already finished when this runs.
pub fn clean_cache_best_effort(cache_dir: &Path) {
    if let Err(e) = clean_cache(cache_dir) {
        warn!(path = %cache_dir.display(), error = %e, "failed to remove cache directory");
        eprintln!(
            "\x1b[33mCould not remove cache directory {}: {}\x1b[0m",
            cache_dir.display(),
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_removes_nested_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = temp_dir.path().join(".spotdl-cache");
        fs::create_dir_all(cache.join("tracks")).unwrap();
        File::create(cache.join("tracks").join("1.json")).unwrap();

        assert!(clean_cache(&cache).unwrap());
        assert!(!cache.exists());
    }

    #[test]
    fn test_missing_cache_is_fine() {
        let temp_dir = TempDir::new().unwrap();

        assert!(!clean_cache(&temp_dir.path().join("absent")).unwrap());
        clean_cache_best_effort(&temp_dir.path().join("absent"));
    }
}
