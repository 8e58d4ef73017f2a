use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: StatusCode, message: String },

    #[error("Spotify credentials missing: set spotify.client_id and spotify.client_secret")]
    MissingCredentials,

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("No artist found for '{0}'")]
    NoResults(String),
}
