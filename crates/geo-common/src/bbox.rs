//! Bounding box and region-of-interest types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A geographic bounding box in EPSG:4326 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Build a bbox from a `[west, south, east, north]` sequence as sent by the
    /// browser client.
    pub fn from_slice(values: &[f64]) -> Result<Self, BboxParseError> {
        match values {
            [west, south, east, north] => Ok(Self::new(*west, *south, *east, *north)),
            _ => Err(BboxParseError::InvalidFormat(values.len())),
        }
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Check that the box is a finite, ordered, non-degenerate rectangle
    /// within geographic range.
    pub fn validate(&self) -> Result<(), BboxParseError> {
        let coords = [self.west, self.south, self.east, self.north];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(BboxParseError::NotFinite);
        }

        if self.west < -180.0 || self.east > 180.0 {
            return Err(BboxParseError::OutOfRange(format!(
                "longitude must be within [-180, 180], got {}..{}",
                self.west, self.east
            )));
        }
        if self.south < -90.0 || self.north > 90.0 {
            return Err(BboxParseError::OutOfRange(format!(
                "latitude must be within [-90, 90], got {}..{}",
                self.south, self.north
            )));
        }

        if self.west > self.east || self.south > self.north {
            return Err(BboxParseError::Reversed(self.to_string()));
        }
        if self.width() == 0.0 || self.height() == 0.0 {
            return Err(BboxParseError::Degenerate(self.to_string()));
        }

        Ok(())
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.west, self.south, self.east, self.north
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bounds: expected 4 numbers [west, south, east, north], got {0}")]
    InvalidFormat(usize),

    #[error("Invalid bounds: coordinates must be finite numbers")]
    NotFinite,

    #[error("Invalid bounds: {0}")]
    OutOfRange(String),

    #[error("Invalid bounds: {0} is reversed (west must be < east and south < north)")]
    Reversed(String),

    #[error("Invalid bounds: {0} has zero width or height")]
    Degenerate(String),
}

/// The area a request is clipped and reduced over.
///
/// Only constructible from a validated [`BoundingBox`], so every region in
/// flight is a non-degenerate rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOfInterest {
    bbox: BoundingBox,
}

impl RegionOfInterest {
    pub fn from_bbox(bbox: BoundingBox) -> Result<Self, BboxParseError> {
        bbox.validate()?;
        Ok(Self { bbox })
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Closed, counter-clockwise exterior ring.
    pub fn ring(&self) -> Vec<[f64; 2]> {
        let b = &self.bbox;
        vec![
            [b.west, b.south],
            [b.east, b.south],
            [b.east, b.north],
            [b.west, b.north],
            [b.west, b.south],
        ]
    }

    /// GeoJSON polygon geometry for this region.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [self.ring()],
        })
    }
}
