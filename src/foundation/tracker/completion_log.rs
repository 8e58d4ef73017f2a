use crate::error::{AppError, Result};
use crate::foundation::tracker::CompletionTracker;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Artist name to the names of its albums that finished downloading.
pub type CompletionRecord = BTreeMap<String, Vec<String>>;

/// A completion record persisted as a JSON file.
///
/// The whole record is rewritten on every change while the lock is held, so
/// two workers finishing at the same moment cannot lose each other's entry
/// and the file on disk always holds a complete document.
pub struct CompletionLog {
    path: PathBuf,
    record: Mutex<CompletionRecord>,
}

impl CompletionLog {
    /// Loads the log at `path`, starting empty when the file does not exist.
    ///
    /// A file that exists but cannot be parsed is an error: it holds the
    /// history of earlier runs and must not be silently replaced.
    pub fn open(path: &Path) -> Result<Self> {
        let record = match fs::read_to_string(path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| AppError::CorruptLog {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => CompletionRecord::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), artists = record.len(), "completion log loaded");

        Ok(Self {
            path: path.to_path_buf(),
            record: Mutex::new(record),
        })
    }

    /// A copy of the current record.
    pub fn snapshot(&self) -> Result<CompletionRecord> {
        self.record
            .lock()
            .map(|record| record.clone())
            .map_err(|_| AppError::LockPoisoned)
    }

    fn persist(&self, record: &CompletionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CompletionTracker for CompletionLog {
    fn is_done(&self, artist: &str, album: &str, _destination: &Path) -> bool {
        // The record is only replaced after a successful persist, so a
        // poisoned lock still guards a consistent record.
        let record = self.record.lock().unwrap_or_else(|poisoned| {
            warn!("completion log lock poisoned, reading last saved state");
            PoisonError::into_inner(poisoned)
        });

        record
            .get(artist)
            .map(|albums| albums.iter().any(|a| a == album))
            .unwrap_or(false)
    }

    fn mark_done(&self, artist: &str, album: &str) -> Result<()> {
        let mut record = self.record.lock().map_err(|_| AppError::LockPoisoned)?;

        let mut updated = record.clone();
        let albums = updated.entry(artist.to_string()).or_default();
        if !albums.iter().any(|a| a == album) {
            albums.push(album.to_string());
        }

        self.persist(&updated)?;
        *record = updated;
        debug!(artist, album, "recorded in completion log");
        Ok(())
    }
}
