//! The `/process` pipeline.
//!
//! Every mode fetches and exports the land-cover layer first, then adds
//! either nothing, snapshot charts, or aggregated time series.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use earth_engine::{require_values, SnapshotStats, StatLayer};
use geo_common::{RasterLayer, RegionOfInterest, TimeSeries, UrbanError, UrbanResult};
use renderer::chart::{bar_chart_png, ChartStyle};
use renderer::convert::convert_geotiff_to_png;
use renderer::geotiff::write_rgb_geotiff;
use renderer::palette::apply_landcover_palette;

use crate::config::ServiceConfig;
use crate::response::{png_data_uri, BuiltAreaData, PopulationData, ProcessResponse};
use crate::state::AppState;

/// Public URL prefix under which `static_dir` is served.
pub const STATIC_URL_PREFIX: &str = "static";

const POPULATION_BAR: (u8, u8, u8) = (59, 130, 246);
const BUILT_BAR: (u8, u8, u8) = (237, 2, 42);

/// What a `/process` request returns besides the land-cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    LandcoverOnly,
    #[serde(alias = "snapshot")]
    LandcoverPlusSnapshotStats,
    #[serde(alias = "time_series")]
    LandcoverPlusTimeSeries,
}

impl PipelineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineMode::LandcoverOnly => "landcover_only",
            PipelineMode::LandcoverPlusSnapshotStats => "landcover_plus_snapshot_stats",
            PipelineMode::LandcoverPlusTimeSeries => "landcover_plus_time_series",
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineMode {
    type Err = UrbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landcover_only" | "landcover" => Ok(PipelineMode::LandcoverOnly),
            "landcover_plus_snapshot_stats" | "snapshot" => {
                Ok(PipelineMode::LandcoverPlusSnapshotStats)
            }
            "landcover_plus_time_series" | "time_series" => {
                Ok(PipelineMode::LandcoverPlusTimeSeries)
            }
            other => Err(UrbanError::Validation(format!(
                "unknown mode '{}' (expected landcover_only, snapshot or time_series)",
                other
            ))),
        }
    }
}

/// Run the pipeline for one validated region.
#[instrument(skip(state, roi, mode), fields(bbox = %roi.bbox(), mode = %mode))]
pub async fn run(
    state: &AppState,
    roi: &RegionOfInterest,
    mode: PipelineMode,
) -> UrbanResult<ProcessResponse> {
    let layer = state.service.fetch_landcover(roi).await?;
    let landcover = export_landcover(layer, &state.config).await?;

    let mut response = ProcessResponse {
        landcover: Some(landcover),
        ..Default::default()
    };

    match mode {
        PipelineMode::LandcoverOnly => {}
        PipelineMode::LandcoverPlusSnapshotStats => {
            let population = state.service.snapshot_stats(StatLayer::Population, roi).await?;
            require_values(StatLayer::Population, &population)?;
            let built = state.service.snapshot_stats(StatLayer::BuiltUp, roi).await?;
            require_values(StatLayer::BuiltUp, &built)?;
            response.pop_graph = Some(snapshot_chart(population, POPULATION_BAR).await?);
            response.built_graph = Some(snapshot_chart(built, BUILT_BAR).await?);
        }
        PipelineMode::LandcoverPlusTimeSeries => {
            let records = state.service.stat_series(StatLayer::Population, roi).await?;
            let population = TimeSeries::aggregate(StatLayer::Population.label(), &records)?;

            let records = state.service.stat_series(StatLayer::BuiltUp, roi).await?;
            let built = TimeSeries::aggregate(StatLayer::BuiltUp.label(), &records)?;

            debug!(
                population_points = population.len(),
                built_points = built.len(),
                "Aggregated series"
            );
            response.population_data = Some(PopulationData::from(population));
            response.built_area_data = Some(BuiltAreaData::from(built));
        }
    }

    Ok(response)
}

/// Palette-render the layer, write it as a GeoTIFF and optionally as PNG.
///
/// Returns the public path of the file the client should display.
pub async fn export_landcover(layer: RasterLayer, config: &ServiceConfig) -> UrbanResult<String> {
    let export_dir = config.export_dir();
    let convert = config.export.convert_to_png;

    let written = tokio::task::spawn_blocking(move || write_export(&layer, &export_dir, convert))
        .await
        .map_err(|e| UrbanError::Internal(format!("export task failed: {}", e)))??;

    let file_name = written
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| UrbanError::Internal(format!("bad export path {:?}", written)))?;

    Ok(format!(
        "{}/{}/{}",
        STATIC_URL_PREFIX, config.export.subdir, file_name
    ))
}

fn write_export(layer: &RasterLayer, dir: &Path, convert: bool) -> UrbanResult<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| UrbanError::Export(format!("cannot create {}: {}", dir.display(), e)))?;

    let rgb = apply_landcover_palette(layer)?;

    let stem = format!("landcover-{}", Uuid::new_v4());
    let tif = dir.join(format!("{}.tif", stem));
    write_rgb_geotiff(&tif, &rgb, layer.width, layer.height, &layer.bbox)
        .map_err(|e| UrbanError::Export(format!("writing {}: {}", tif.display(), e)))?;

    if !convert {
        info!(path = %tif.display(), "Exported land cover");
        return Ok(tif);
    }

    let png = dir.join(format!("{}.png", stem));
    convert_geotiff_to_png(&tif, &png)?;
    info!(path = %png.display(), "Exported land cover");
    Ok(png)
}

async fn snapshot_chart(stats: SnapshotStats, bar_color: (u8, u8, u8)) -> UrbanResult<String> {
    let entries: Vec<(String, Option<f64>)> = stats.into_iter().collect();
    let style = ChartStyle {
        bar_color,
        ..Default::default()
    };

    let png = tokio::task::spawn_blocking(move || bar_chart_png(&entries, &style))
        .await
        .map_err(|e| UrbanError::Internal(format!("chart task failed: {}", e)))??;

    Ok(png_data_uri(&png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_common::BoundingBox;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("landcover_only".parse::<PipelineMode>().unwrap(), PipelineMode::LandcoverOnly);
        assert_eq!(
            "Snapshot".parse::<PipelineMode>().unwrap(),
            PipelineMode::LandcoverPlusSnapshotStats
        );
        assert_eq!(
            "landcover_plus_time_series".parse::<PipelineMode>().unwrap(),
            PipelineMode::LandcoverPlusTimeSeries
        );
        let err = "heatmap".parse::<PipelineMode>().unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_mode_display_round_trips() {
        for mode in [
            PipelineMode::LandcoverOnly,
            PipelineMode::LandcoverPlusSnapshotStats,
            PipelineMode::LandcoverPlusTimeSeries,
        ] {
            assert_eq!(mode.to_string().parse::<PipelineMode>().unwrap(), mode);
        }
    }

    fn layer(width: usize, height: usize) -> RasterLayer {
        RasterLayer {
            name: "lc".to_string(),
            date: None,
            width,
            height,
            bands: vec![(0..width * height).map(|i| (i % 9 + 1) as f32).collect()],
            bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    #[test]
    fn test_write_export_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(&layer(4, 3), dir.path(), true).unwrap();
        assert_eq!(path.extension().unwrap(), "png");
        assert!(path.exists());
        assert!(path.with_extension("tif").exists());
    }

    #[test]
    fn test_write_export_tif_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(&layer(4, 3), dir.path(), false).unwrap();
        assert_eq!(path.extension().unwrap(), "tif");
        assert!(!path.with_extension("png").exists());
    }

    #[test]
    fn test_export_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_export(&layer(2, 2), dir.path(), false).unwrap();
        let b = write_export(&layer(2, 2), dir.path(), false).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_write_export_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = layer(4, 3);
        bad.bands[0].truncate(5);
        let err = write_export(&bad, dir.path(), true).unwrap_err();
        assert_eq!(err.kind(), "conversion");
    }
}
