mod loader;
mod models;

pub use loader::*;
pub use models::{Album, Catalog};
