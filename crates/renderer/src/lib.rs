//! Image rendering and raster encoding.
//!
//! - Land-cover palette rendering
//! - GeoTIFF export and band reading
//! - Band-major to pixel-major conversion with max rescaling
//! - PNG encoding
//! - Bar charts for snapshot statistics

pub mod chart;
pub mod convert;
pub mod error;
pub mod geotiff;
pub mod palette;
pub mod png;

pub use error::{RenderError, RenderResult};
