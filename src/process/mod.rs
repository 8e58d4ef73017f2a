//! Building download tasks from a catalog and running them.

mod cleanup;
mod executor;
mod runner;
mod tasks;

pub use cleanup::{clean_cache, clean_cache_best_effort};
pub use executor::{execute_task, Downloader, ExternalDownloader};
#[cfg(test)]
pub use executor::MockDownloader;
pub use runner::{run_tasks, BatchSummary, TaskOutcome};
pub use tasks::{album_folder, build_tasks, Task};
