//! Running the external downloader for one album.

use crate::configuration::DownloaderSettings;
use crate::error::{AppError, Result};
use crate::foundation::tracker::CompletionTracker;
use crate::process::Task;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Something that can fetch an album into its destination folder.
#[cfg_attr(test, mockall::automock)]
pub trait Downloader: Send + Sync {
    /// Blocks until the album is downloaded or the attempt has failed.
    fn download(&self, task: &Task) -> Result<()>;
}

/// Starts the configured downloader program as a subprocess inside the album folder.
pub struct ExternalDownloader {
    settings: DownloaderSettings,
    cache_dir: Option<PathBuf>,
}

impl ExternalDownloader {
    pub fn new(settings: DownloaderSettings) -> Self {
        Self {
            settings,
            cache_dir: None,
        }
    }

    /// Passes `<cache_flag> <cache_dir>` to every invocation.
    pub fn with_cache_dir(mut self, cache_dir: PathBuf) -> Self {
        self.cache_dir = Some(cache_dir);
        self
    }

    /// Arguments after the program name for downloading `url`.
    pub fn arguments(&self, url: &str) -> Vec<String> {
        let mut args = self.settings.args.clone();
        args.push(url.to_string());

        if let Some(cache_dir) = &self.cache_dir {
            args.push(self.settings.cache_flag.clone());
            args.push(cache_dir.to_string_lossy().into_owned());
        }

        args
    }
}

impl Downloader for ExternalDownloader {
    fn download(&self, task: &Task) -> Result<()> {
        let args = self.arguments(&task.source_url);
        debug!(program = %self.settings.program, ?args, cwd = %task.destination.display(), "spawning downloader");

        let output = Command::new(&self.settings.program)
            .args(&args)
            .current_dir(&task.destination)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| AppError::SpawnError {
                destination: task.destination.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AppError::DownloadFailure {
                destination: task.destination.clone(),
                status: output.status,
                stderr: last_line(&output.stderr),
            });
        }

        Ok(())
    }
}

fn last_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no error output")
        .trim()
        .to_string()
}

/// Downloads one album and records it as done once the downloader succeeded.
///
/// A failed download leaves the tracker untouched so the album is scheduled again
/// on the next run.
pub fn execute_task(
    task: &Task,
    downloader: &dyn Downloader,
    tracker: &dyn CompletionTracker,
) -> Result<()> {
    downloader.download(task)?;
    tracker.mark_done(&task.artist, &task.album)?;
    info!(artist = %task.artist, album = %task.album, "download finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::tracker::CompletionLog;
    use std::io;
    use std::path::Path;
    use tempfile::TempDir;

    fn task(destination: &Path) -> Task {
        Task {
            source_url: "https://open.spotify.com/album/1".to_string(),
            destination: destination.to_path_buf(),
            artist: "A".to_string(),
            album: "X".to_string(),
        }
    }

    fn shell(script: &str) -> DownloaderSettings {
        DownloaderSettings {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string(), "downloader".to_string()],
            cache_flag: "--cache-dir".to_string(),
        }
    }

    #[test]
    fn test_arguments_without_cache_dir() {
        let downloader = ExternalDownloader::new(DownloaderSettings::default());
        assert_eq!(
            downloader.arguments("http://u/1"),
            vec!["-m", "spotdl", "http://u/1"]
        );
    }

    #[test]
    fn test_arguments_with_cache_dir() {
        let downloader = ExternalDownloader::new(DownloaderSettings::default())
            .with_cache_dir(PathBuf::from("/tmp/cache"));
        assert_eq!(
            downloader.arguments("http://u/1"),
            vec!["-m", "spotdl", "http://u/1", "--cache-dir", "/tmp/cache"]
        );
    }

    #[test]
    fn test_last_line_skips_trailing_blanks() {
        assert_eq!(last_line(b"first\nsecond error\n\n"), "second error");
        assert_eq!(last_line(b""), "no error output");
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_inside_destination_with_url_argument() {
        let temp_dir = TempDir::new().unwrap();
        let downloader = ExternalDownloader::new(shell("echo \"$1\" > url.txt"));

        downloader.download(&task(temp_dir.path())).unwrap();

        let written = std::fs::read_to_string(temp_dir.path().join("url.txt")).unwrap();
        assert_eq!(written.trim(), "https://open.spotify.com/album/1");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_a_download_failure() {
        let temp_dir = TempDir::new().unwrap();
        let downloader = ExternalDownloader::new(shell("echo 'album not found' >&2; exit 3"));

        let err = downloader.download(&task(temp_dir.path())).unwrap_err();

        match err {
            AppError::DownloadFailure {
                destination,
                status,
                stderr,
            } => {
                assert_eq!(destination, temp_dir.path());
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "album not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let temp_dir = TempDir::new().unwrap();
        let downloader = ExternalDownloader::new(DownloaderSettings {
            program: "albumfetch-no-such-downloader".to_string(),
            ..DownloaderSettings::default()
        });

        assert!(matches!(
            downloader.download(&task(temp_dir.path())),
            Err(AppError::SpawnError { .. })
        ));
    }

    #[test]
    fn test_execute_task_marks_done_on_success() {
        let temp_dir = TempDir::new().unwrap();
        let log = CompletionLog::open(&temp_dir.path().join("log.json")).unwrap();
        let mut downloader = MockDownloader::new();
        downloader.expect_download().times(1).returning(|_| Ok(()));

        execute_task(&task(temp_dir.path()), &downloader, &log).unwrap();

        assert!(log.is_done("A", "X", temp_dir.path()));
    }

    #[test]
    fn test_execute_task_leaves_log_alone_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let log = CompletionLog::open(&temp_dir.path().join("log.json")).unwrap();
        let mut downloader = MockDownloader::new();
        downloader.expect_download().returning(|task| {
            Err(AppError::IoError(io::Error::new(
                io::ErrorKind::Other,
                format!("boom {}", task.album),
            )))
        });

        assert!(execute_task(&task(temp_dir.path()), &downloader, &log).is_err());
        assert!(!log.is_done("A", "X", temp_dir.path()));
        assert!(!temp_dir.path().join("log.json").exists());
    }
}
