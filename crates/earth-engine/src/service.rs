//! The geospatial data service seen by the request pipeline.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use geo_common::landcover::{DENSE_CLASSES, SOURCE_CLASSES};
use geo_common::{RasterLayer, RegionOfInterest, StatRecord, UrbanError, UrbanResult};
use renderer::geotiff::read_bands_from_bytes;

use crate::client::EarthEngineClient;
use crate::config::{DatasetConfig, EarthEngineConfig};
use crate::expr::{Expr, ReduceOptions, Reducer};
use crate::grid::PixelGrid;

/// Reducer used for every population and built-up statistic.
///
/// Mean keeps snapshot and time-series figures comparable across regions of
/// different size.
pub const STAT_REDUCER: Reducer = Reducer::Mean;

/// Band name → reduced value, as returned by one region reduction.
pub type SnapshotStats = BTreeMap<String, Option<f64>>;

/// Statistic layers that can be reduced over a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatLayer {
    Population,
    BuiltUp,
}

impl StatLayer {
    /// Human-readable metric name used in logs and error messages.
    pub fn label(self) -> &'static str {
        match self {
            StatLayer::Population => "population",
            StatLayer::BuiltUp => "built-up area",
        }
    }

    fn collection(self, datasets: &DatasetConfig) -> &str {
        match self {
            StatLayer::Population => &datasets.population_collection,
            StatLayer::BuiltUp => &datasets.built_collection,
        }
    }

    fn band(self, datasets: &DatasetConfig) -> &str {
        match self {
            StatLayer::Population => &datasets.population_band,
            StatLayer::BuiltUp => &datasets.built_band,
        }
    }
}

/// Remote source of land-cover rasters and region statistics.
#[async_trait]
pub trait GeoDataService: Send + Sync {
    /// Mosaicked, remapped land-cover classes clipped to the region.
    async fn fetch_landcover(&self, roi: &RegionOfInterest) -> UrbanResult<RasterLayer>;

    /// One aggregate reduction of the layer's mosaic over the region.
    async fn snapshot_stats(
        &self,
        layer: StatLayer,
        roi: &RegionOfInterest,
    ) -> UrbanResult<SnapshotStats>;

    /// One reduction per image in the layer's collection.
    ///
    /// An empty collection yields an empty vector, not an error.
    async fn stat_series(
        &self,
        layer: StatLayer,
        roi: &RegionOfInterest,
    ) -> UrbanResult<Vec<StatRecord>>;
}

/// [`GeoDataService`] backed by the Earth Engine REST API.
pub struct EarthEngineService {
    client: EarthEngineClient,
    datasets: DatasetConfig,
    max_dimension: usize,
}

impl EarthEngineService {
    pub fn new(config: &EarthEngineConfig, datasets: DatasetConfig) -> UrbanResult<Self> {
        let client = EarthEngineClient::new(config)
            .map_err(|e| UrbanError::Internal(format!("Earth Engine client: {}", e)))?;

        info!(
            api_url = %config.api_url,
            project = %config.project,
            authenticated = config.access_token.is_some(),
            "Earth Engine client initialized"
        );

        Ok(Self {
            client,
            datasets,
            max_dimension: config.max_dimension,
        })
    }

    fn reduce_options(&self) -> ReduceOptions {
        ReduceOptions {
            reducer: STAT_REDUCER,
            scale: self.datasets.stats_scale,
            max_pixels: self.datasets.max_pixels,
            best_effort: self.datasets.best_effort,
        }
    }

    fn landcover_expr(&self, roi: &RegionOfInterest) -> Expr {
        Expr::image_collection(&self.datasets.landcover_collection)
            .filter_date(&self.datasets.landcover_start, &self.datasets.landcover_end)
            .mosaic()
            .remap(&SOURCE_CLASSES, &DENSE_CLASSES)
            .rename("lc")
            .clip(roi)
    }
}

#[async_trait]
impl GeoDataService for EarthEngineService {
    #[instrument(skip(self, roi), fields(bbox = %roi.bbox()))]
    async fn fetch_landcover(&self, roi: &RegionOfInterest) -> UrbanResult<RasterLayer> {
        let grid = PixelGrid::for_region(roi, self.datasets.landcover_scale, self.max_dimension);
        let bytes = self
            .client
            .compute_pixels(&self.landcover_expr(roi), &grid)
            .await
            .map_err(|e| UrbanError::Export(e.to_string()))?;

        let stack = read_bands_from_bytes(&bytes)
            .map_err(|e| UrbanError::Export(format!("unreadable land-cover raster: {}", e)))?;

        debug!(width = stack.width, height = stack.height, "Fetched land-cover raster");

        Ok(RasterLayer {
            name: "lc".to_string(),
            date: NaiveDate::parse_from_str(&self.datasets.landcover_start, "%Y-%m-%d").ok(),
            width: stack.width,
            height: stack.height,
            bands: stack
                .bands
                .into_iter()
                .map(|band| band.into_iter().map(|v| v as f32).collect())
                .collect(),
            bbox: *roi.bbox(),
        })
    }

    #[instrument(skip(self, layer, roi), fields(layer = layer.label()))]
    async fn snapshot_stats(
        &self,
        layer: StatLayer,
        roi: &RegionOfInterest,
    ) -> UrbanResult<SnapshotStats> {
        let expr = Expr::image_collection(layer.collection(&self.datasets))
            .mosaic()
            .select(layer.band(&self.datasets))
            .clip(roi)
            .reduce_region(roi, &self.reduce_options());

        let result = self
            .client
            .compute_value(&expr)
            .await
            .map_err(|e| UrbanError::DataFetch(format!("{}: {}", layer.label(), e)))?;

        parse_reduction(layer, &result)
    }

    #[instrument(skip(self, layer, roi), fields(layer = layer.label()))]
    async fn stat_series(
        &self,
        layer: StatLayer,
        roi: &RegionOfInterest,
    ) -> UrbanResult<Vec<StatRecord>> {
        let band = layer.band(&self.datasets);
        let images = self
            .client
            .list_images(layer.collection(&self.datasets))
            .await
            .map_err(|e| UrbanError::DataFetch(format!("{}: {}", layer.label(), e)))?;

        let mut records = Vec::with_capacity(images.len());
        for image in images {
            let Some(date) = image.start_time.as_deref().and_then(parse_start_date) else {
                warn!(image = %image.id, "Skipping image without a start time");
                continue;
            };

            let expr = Expr::image(&image.id)
                .select(band)
                .reduce_region(roi, &self.reduce_options());
            let result = self
                .client
                .compute_value(&expr)
                .await
                .map_err(|e| UrbanError::DataFetch(format!("{} ({}): {}", layer.label(), image.id, e)))?;

            // an all-null image is a missing observation, not a failure
            let stats = parse_bands(layer, &result)?;
            records.push(StatRecord::new(date, stats.get(band).copied().flatten()));
        }

        debug!(records = records.len(), "Collected per-image statistics");
        Ok(records)
    }
}

/// Validate a `reduceRegion` result: a non-empty object of numbers or nulls
/// with at least one finite value.
pub fn parse_reduction(layer: StatLayer, result: &Value) -> UrbanResult<SnapshotStats> {
    let stats = parse_bands(layer, result)?;
    require_values(layer, &stats)?;
    Ok(stats)
}

fn parse_bands(layer: StatLayer, result: &Value) -> UrbanResult<SnapshotStats> {
    let object = result.as_object().ok_or_else(|| {
        UrbanError::DataFetch(format!(
            "{}: expected a dictionary of band values, got {}",
            layer.label(),
            result
        ))
    })?;

    if object.is_empty() {
        return Err(UrbanError::DataFetch(format!(
            "{}: reduction returned no bands",
            layer.label()
        )));
    }

    object
        .iter()
        .map(|(band, value)| match value {
            Value::Null => Ok((band.clone(), None)),
            Value::Number(n) => Ok((band.clone(), n.as_f64())),
            other => Err(UrbanError::DataFetch(format!(
                "{}: band '{}' has non-numeric value {}",
                layer.label(),
                band,
                other
            ))),
        })
        .collect()
}

/// Fail with `DataFetch` unless some band holds a finite value.
///
/// A region without valid pixels reduces to all-null bands.
pub fn require_values(layer: StatLayer, stats: &SnapshotStats) -> UrbanResult<()> {
    if stats.values().flatten().any(|v| v.is_finite()) {
        return Ok(());
    }
    Err(UrbanError::DataFetch(format!(
        "{}: reduction returned no values",
        layer.label()
    )))
}

fn parse_start_date(start_time: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(start_time)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(start_time, "%Y-%m-%d").ok())
}
