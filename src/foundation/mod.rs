pub mod catalog;
pub mod tracker;
pub mod utils;
