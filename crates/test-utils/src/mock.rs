//! In-memory [`GeoDataService`] for pipeline and handler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use earth_engine::{GeoDataService, SnapshotStats, StatLayer};
use geo_common::{RasterLayer, RegionOfInterest, StatRecord, UrbanError, UrbanResult};

use crate::generators::{create_landcover_layer, create_stat_records};

/// A call observed by [`MockGeoService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCall {
    Landcover,
    Snapshot(StatLayer),
    Series(StatLayer),
}

/// Scriptable service returning canned rasters and statistics.
///
/// By default every call succeeds: land cover is an 8x8 layer covering the
/// requested region, snapshots return one band each and both series have
/// three yearly records.
pub struct MockGeoService {
    landcover_size: (usize, usize),
    landcover_error: Option<UrbanError>,
    snapshots: HashMap<StatLayer, UrbanResult<SnapshotStats>>,
    series: HashMap<StatLayer, UrbanResult<Vec<StatRecord>>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockGeoService {
    pub fn new() -> Self {
        let mut snapshots = HashMap::new();
        snapshots.insert(
            StatLayer::Population,
            Ok(SnapshotStats::from([("population_count".to_string(), Some(1250.5))])),
        );
        snapshots.insert(
            StatLayer::BuiltUp,
            Ok(SnapshotStats::from([("built_surface".to_string(), Some(420.0))])),
        );

        let mut series = HashMap::new();
        series.insert(
            StatLayer::Population,
            Ok(create_stat_records(1975, &[Some(10.0), Some(20.0), Some(15.0)])),
        );
        series.insert(
            StatLayer::BuiltUp,
            Ok(create_stat_records(1975, &[Some(100.0), Some(150.0), Some(150.0)])),
        );

        Self {
            landcover_size: (8, 8),
            landcover_error: None,
            snapshots,
            series,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_landcover_size(mut self, width: usize, height: usize) -> Self {
        self.landcover_size = (width, height);
        self
    }

    pub fn with_landcover_error(mut self, error: UrbanError) -> Self {
        self.landcover_error = Some(error);
        self
    }

    pub fn with_snapshot(mut self, layer: StatLayer, result: UrbanResult<SnapshotStats>) -> Self {
        self.snapshots.insert(layer, result);
        self
    }

    pub fn with_series(mut self, layer: StatLayer, result: UrbanResult<Vec<StatRecord>>) -> Self {
        self.series.insert(layer, result);
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: MockCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Default for MockGeoService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeoDataService for MockGeoService {
    async fn fetch_landcover(&self, roi: &RegionOfInterest) -> UrbanResult<RasterLayer> {
        self.record(MockCall::Landcover);
        if let Some(error) = &self.landcover_error {
            return Err(error.clone());
        }
        let (width, height) = self.landcover_size;
        Ok(create_landcover_layer(width, height, *roi.bbox()))
    }

    async fn snapshot_stats(
        &self,
        layer: StatLayer,
        _roi: &RegionOfInterest,
    ) -> UrbanResult<SnapshotStats> {
        self.record(MockCall::Snapshot(layer));
        self.snapshots
            .get(&layer)
            .cloned()
            .unwrap_or_else(|| Err(UrbanError::DataFetch(format!("{}: no data", layer.label()))))
    }

    async fn stat_series(
        &self,
        layer: StatLayer,
        _roi: &RegionOfInterest,
    ) -> UrbanResult<Vec<StatRecord>> {
        self.record(MockCall::Series(layer));
        self.series.get(&layer).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}
