//! Common types and utilities shared across the urban-insight services.

pub mod bbox;
pub mod error;
pub mod landcover;
pub mod raster;
pub mod series;

pub use bbox::{BboxParseError, BoundingBox, RegionOfInterest};
pub use error::{UrbanError, UrbanResult};
pub use landcover::{LandCoverClass, LANDCOVER_CLASSES};
pub use raster::RasterLayer;
pub use series::{StatRecord, TimeSeries};
