//! Test data generators for synthetic rasters and statistics.
//!
//! These generators create predictable, verifiable patterns that can be
//! used across the test suite.

use chrono::NaiveDate;

use geo_common::{BoundingBox, RasterLayer, StatRecord};

/// Creates a single-band land-cover layer cycling through dense classes 1..=9.
///
/// Pixel `i` holds class `i % 9 + 1`, so every class appears once a layer
/// has at least nine pixels.
pub fn create_landcover_layer(width: usize, height: usize, bbox: BoundingBox) -> RasterLayer {
    let band = (0..width * height).map(|i| (i % 9 + 1) as f32).collect();
    RasterLayer {
        name: "lc".to_string(),
        date: NaiveDate::from_ymd_opt(2017, 1, 1),
        width,
        height,
        bands: vec![band],
        bbox,
    }
}

/// Yearly records starting at `first_year`, one per value, five years apart.
pub fn create_stat_records(first_year: i32, values: &[Option<f64>]) -> Vec<StatRecord> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| {
            NaiveDate::from_ymd_opt(first_year + 5 * i as i32, 1, 1)
                .map(|date| StatRecord::new(date, *value))
        })
        .collect()
}
