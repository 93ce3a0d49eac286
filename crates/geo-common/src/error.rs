//! Error types for the urban-insight services.

use thiserror::Error;

use crate::bbox::BboxParseError;

/// Result type alias using UrbanError.
pub type UrbanResult<T> = Result<T, UrbanError>;

/// Primary error type for the processing pipeline.
///
/// Each variant is a distinct category that survives all the way to the
/// JSON error payload.
#[derive(Debug, Clone, Error)]
pub enum UrbanError {
    // === Input Errors ===
    #[error("Invalid request: {0}")]
    Validation(String),

    // === External Service Errors ===
    #[error("Landcover export failed: {0}")]
    Export(String),

    #[error("Statistics retrieval failed: {0}")]
    DataFetch(String),

    #[error("No data available for the selected region: {0}")]
    EmptySeries(String),

    // === Local Processing Errors ===
    #[error("Image conversion failed: {0}")]
    Conversion(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl UrbanError {
    /// Machine-readable category reported next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            UrbanError::Validation(_) => "validation",
            UrbanError::Export(_) => "export",
            UrbanError::DataFetch(_) => "data_fetch",
            UrbanError::EmptySeries(_) => "empty_series",
            UrbanError::Conversion(_) => "conversion",
            UrbanError::Internal(_) => "internal",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            UrbanError::Validation(_) => 400,
            UrbanError::EmptySeries(_) => 404,
            UrbanError::Export(_) | UrbanError::DataFetch(_) => 502,
            UrbanError::Conversion(_) | UrbanError::Internal(_) => 500,
        }
    }
}

impl From<BboxParseError> for UrbanError {
    fn from(err: BboxParseError) -> Self {
        UrbanError::Validation(err.to_string())
    }
}

impl From<std::io::Error> for UrbanError {
    fn from(err: std::io::Error) -> Self {
        UrbanError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for UrbanError {
    fn from(err: serde_json::Error) -> Self {
        UrbanError::Internal(format!("JSON error: {}", err))
    }
}
