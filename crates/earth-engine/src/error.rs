//! Earth Engine client errors.

use thiserror::Error;

pub type EeResult<T> = Result<T, EeError>;

#[derive(Debug, Error)]
pub enum EeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Earth Engine returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}
