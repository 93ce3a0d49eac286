//! Discrete palette rendering for classified rasters.

use rayon::prelude::*;

use geo_common::landcover::class_color;
use geo_common::RasterLayer;

use crate::error::{RenderError, RenderResult};

/// Color used for nodata and classes outside the table.
pub const NODATA_COLOR: (u8, u8, u8) = (0, 0, 0);

/// Map the first band of a land-cover layer to interleaved RGB pixels.
///
/// Values are rounded to the nearest class; anything that is not one of the
/// nine dense classes renders as [`NODATA_COLOR`].
pub fn apply_landcover_palette(layer: &RasterLayer) -> RenderResult<Vec<u8>> {
    layer.check_shape().map_err(RenderError::ShapeMismatch)?;
    if layer.pixel_count() == 0 {
        return Err(RenderError::EmptyRaster(layer.name.clone()));
    }

    let classes = &layer.bands[0];
    let mut rgb = vec![0u8; classes.len() * 3];

    rgb.par_chunks_mut(3)
        .zip(classes.par_iter())
        .for_each(|(pixel, &value)| {
            let (r, g, b) = classify(value)
                .and_then(class_color)
                .unwrap_or(NODATA_COLOR);
            pixel.copy_from_slice(&[r, g, b]);
        });

    Ok(rgb)
}

fn classify(value: f32) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    if (0.0..=255.0).contains(&rounded) {
        Some(rounded as u8)
    } else {
        None
    }
}
