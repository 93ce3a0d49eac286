//! In-memory raster layers.

use chrono::NaiveDate;

use crate::bbox::BoundingBox;

/// A named, dated grid of numeric values covering a region.
///
/// Values are stored band-major: `bands[b][row * width + col]`, row 0 at the
/// northern edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub width: usize,
    pub height: usize,
    pub bands: Vec<Vec<f32>>,
    pub bbox: BoundingBox,
}

impl RasterLayer {
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Number of pixels per band.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Verify that every band holds exactly `width * height` values.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.bands.is_empty() {
            return Err(format!("raster '{}' has no bands", self.name));
        }
        let expected = self.pixel_count();
        for (i, band) in self.bands.iter().enumerate() {
            if band.len() != expected {
                return Err(format!(
                    "band {} of '{}' has {} values, expected {}x{}={}",
                    i,
                    self.name,
                    band.len(),
                    self.width,
                    self.height,
                    expected
                ));
            }
        }
        Ok(())
    }
}
