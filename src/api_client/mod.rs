mod catalog_fetch;
mod spotify;
mod spotify_error;

pub use catalog_fetch::fetch_catalog;
pub use spotify::*;
pub use spotify_error::SpotifyError;
