//! Running a batch of download tasks on a fixed-size worker pool.
//!
//! Every task ends either succeeded or failed, exactly once. A failure, even a
//! panic escaping the downloader, is reported with the task it belongs to and
//! never stops the rest of the batch.

use crate::error::Result;
use crate::foundation::tracker::CompletionTracker;
use crate::process::{execute_task, Downloader, Task};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use tracing::{error, info};

/// How one task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed(String),
}

/// Outcomes of a batch, in the order the tasks were submitted.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub results: Vec<(Task, TaskOutcome)>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, outcome)| *outcome == TaskOutcome::Succeeded)
            .count()
    }

    pub fn failed(&self) -> Vec<(&Task, &str)> {
        self.results
            .iter()
            .filter_map(|(task, outcome)| match outcome {
                TaskOutcome::Failed(reason) => Some((task, reason.as_str())),
                TaskOutcome::Succeeded => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Runs every task with at most `worker_count` downloads in flight.
///
/// # Arguments
///
/// * `tasks` - Pending albums, as produced by [`build_tasks`](crate::process::build_tasks).
/// * `worker_count` - Size of the worker pool, at least 1.
/// * `downloader` - Performs each download.
/// * `tracker` - Receives a `mark_done` for every successful download.
///
pub fn run_tasks(
    tasks: Vec<Task>,
    worker_count: usize,
    downloader: &dyn Downloader,
    tracker: &dyn CompletionTracker,
) -> Result<BatchSummary> {
    if tasks.is_empty() {
        return Ok(BatchSummary::default());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count.max(1))
        .thread_name(|i| format!("albumfetch-worker-{i}"))
        .build()?;

    let progress = create_progress_bar(tasks.len() as u64);

    let results = pool.install(|| {
        tasks
            .into_par_iter()
            .with_max_len(1)
            .map(|task| {
                report(&progress, format!("Downloading: {}", task.label()));
                let outcome = run_one(&task, downloader, tracker);

                match &outcome {
                    TaskOutcome::Succeeded => {
                        report(&progress, format!("\x1b[32mFinished: {}\x1b[0m", task.label()));
                    }
                    TaskOutcome::Failed(reason) => report(
                        &progress,
                        format!("\x1b[31mFailed: {} -> {}\x1b[0m", task.label(), reason),
                    ),
                }
                progress.inc(1);
                (task, outcome)
            })
            .collect::<Vec<_>>()
    });

    progress.finish_and_clear();

    let summary = BatchSummary { results };
    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed().len(),
        "batch finished"
    );
    Ok(summary)
}

fn run_one(task: &Task, downloader: &dyn Downloader, tracker: &dyn CompletionTracker) -> TaskOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        execute_task(task, downloader, tracker)
    }));

    match result {
        Ok(Ok(())) => TaskOutcome::Succeeded,
        Ok(Err(e)) => {
            error!(artist = %task.artist, album = %task.album, error = %e, "download failed");
            TaskOutcome::Failed(e.to_string())
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            error!(artist = %task.artist, album = %task.album, %reason, "unexpected error in task");
            TaskOutcome::Failed(format!("unexpected error: {reason}"))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

/// Prints above the bar, or plainly when the bar is not drawn (no terminal).
fn report(progress: &ProgressBar, line: String) {
    if progress.is_hidden() {
        println!("{line}");
    } else {
        progress.println(line);
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let progress = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{elapsed_precise} [{bar:40.cyan/blue}] {pos}/{len} albums")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::foundation::tracker::{CompletionLog, FolderPresence};
    use crate::process::MockDownloader;
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn tasks(count: usize) -> Vec<Task> {
        (0..count)
            .map(|i| Task {
                source_url: format!("http://u/{i}"),
                destination: PathBuf::from(format!("unused/{i}")),
                artist: "A".to_string(),
                album: format!("album-{i}"),
            })
            .collect()
    }

    /// Counts how many downloads are in flight at once.
    #[derive(Default)]
    struct SlowDownloader {
        running: AtomicUsize,
        peak: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl Downloader for SlowDownloader {
        fn download(&self, task: &Task) -> Result<()> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            self.seen.lock().unwrap().push(task.album.clone());
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct PanickingDownloader;

    impl Downloader for PanickingDownloader {
        fn download(&self, task: &Task) -> Result<()> {
            if task.album == "album-2" {
                panic!("downloader crashed");
            }
            Ok(())
        }
    }

    #[test]
    fn test_never_exceeds_worker_count() {
        let downloader = SlowDownloader::default();

        let summary = run_tasks(tasks(12), 3, &downloader, &FolderPresence).unwrap();

        assert!(downloader.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(downloader.running.load(Ordering::SeqCst), 0);
        assert_eq!(summary.results.len(), 12);
        assert_eq!(summary.succeeded(), 12);

        let mut seen = downloader.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 12);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let temp_dir = TempDir::new().unwrap();
        let log = CompletionLog::open(&temp_dir.path().join("log.json")).unwrap();

        let mut downloader = MockDownloader::new();
        downloader.expect_download().times(5).returning(|task| {
            if task.album == "album-1" {
                Err(AppError::IoError(io::Error::new(
                    io::ErrorKind::Other,
                    "exit status: 1",
                )))
            } else {
                Ok(())
            }
        });

        let summary = run_tasks(tasks(5), 2, &downloader, &log).unwrap();

        assert_eq!(summary.succeeded(), 4);
        let failed = summary.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0.album, "album-1");
        assert!(failed[0].1.contains("exit status: 1"));

        let record = log.snapshot().unwrap();
        assert_eq!(record["A"].len(), 4);
        assert!(!record["A"].contains(&"album-1".to_string()));
    }

    #[test]
    fn test_panicking_task_is_reported_as_failed() {
        let summary = run_tasks(tasks(4), 2, &PanickingDownloader, &FolderPresence).unwrap();

        assert_eq!(summary.results.len(), 4);
        assert_eq!(summary.succeeded(), 3);
        let failed = summary.failed();
        assert_eq!(failed[0].0.album, "album-2");
        assert!(failed[0].1.contains("downloader crashed"));
    }

    #[test]
    fn test_empty_batch_does_nothing() {
        let mut downloader = MockDownloader::new();
        downloader.expect_download().never();

        let summary = run_tasks(Vec::new(), 4, &downloader, &FolderPresence).unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "task panicked");
    }
}
