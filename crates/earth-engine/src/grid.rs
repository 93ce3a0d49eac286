//! Pixel grids for `computePixels` requests.

use serde_json::{json, Value};

use geo_common::RegionOfInterest;

/// Approximate meters per degree at the equator.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// An EPSG:4326 pixel grid covering a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelGrid {
    pub width: usize,
    pub height: usize,
    /// Degrees per pixel.
    pub scale_x: f64,
    pub scale_y: f64,
    pub west: f64,
    pub north: f64,
}

impl PixelGrid {
    /// Grid at `scale_m` meters per pixel, coarsened so neither edge exceeds
    /// `max_dimension`.
    pub fn for_region(roi: &RegionOfInterest, scale_m: f64, max_dimension: usize) -> Self {
        let bbox = roi.bbox();
        let max_dimension = max_dimension.max(1) as f64;

        let mut degrees = scale_m / METERS_PER_DEGREE;
        let longest = bbox.width().max(bbox.height());
        if longest / degrees > max_dimension {
            degrees = longest / max_dimension;
        }

        let width = (bbox.width() / degrees).ceil().max(1.0) as usize;
        let height = (bbox.height() / degrees).ceil().max(1.0) as usize;

        Self {
            width,
            height,
            scale_x: bbox.width() / width as f64,
            scale_y: bbox.height() / height as f64,
            west: bbox.west,
            north: bbox.north,
        }
    }

    /// The `PixelGrid` JSON object expected by the REST API.
    pub fn to_json(&self) -> Value {
        json!({
            "dimensions": { "width": self.width, "height": self.height },
            "affineTransform": {
                "scaleX": self.scale_x,
                "shearX": 0.0,
                "translateX": self.west,
                "shearY": 0.0,
                "scaleY": -self.scale_y,
                "translateY": self.north,
            },
            "crsCode": "EPSG:4326",
        })
    }
}
