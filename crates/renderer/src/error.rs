//! Rendering error types.

use thiserror::Error;

use geo_common::UrbanError;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Empty raster: {0}")]
    EmptyRaster(String),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("Encoding failed: {0}")]
    Encode(String),
}

impl From<RenderError> for UrbanError {
    fn from(err: RenderError) -> Self {
        UrbanError::Conversion(err.to_string())
    }
}
