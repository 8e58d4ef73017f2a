use std::path::PathBuf;
use std::process::ExitStatus;
use std::{io, result};
use thiserror::Error;

pub type Result<T> = result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse catalog {}: {source}", .path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Completion log {} is corrupt: {source}", .path.display())]
    CorruptLog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No catalog files found in {}", .0.display())]
    NoCatalogs(PathBuf),

    #[error("Invalid selection: {0}")]
    SelectionError(String),

    #[error("Failed to create album folder {}: {source}", .path.display())]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to start downloader in {}: {source}", .destination.display())]
    SpawnError {
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Download into {} failed ({status}): {stderr}", .destination.display())]
    DownloadFailure {
        destination: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Completion log lock poisoned")]
    LockPoisoned,
}
