pub mod api_client;
pub mod configuration;
pub mod error;
pub mod foundation;
pub mod process;
pub mod startup;

pub use api_client::{fetch_catalog, SpotifyClient};
pub use configuration::*;
pub use error::{AppError, Result};
pub use foundation::catalog::*;
pub use foundation::tracker::*;
pub use process::{build_tasks, run_tasks, ExternalDownloader};
