//! Application state for the urban API.

use anyhow::Result;
use std::sync::Arc;

use earth_engine::{EarthEngineService, GeoDataService};

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// Remote source of rasters and statistics.
    pub service: Arc<dyn GeoDataService>,

    /// Service configuration, fixed at startup.
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(service: Arc<dyn GeoDataService>, config: ServiceConfig) -> Self {
        Self { service, config }
    }

    /// Create state backed by the Earth Engine REST API.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let service = EarthEngineService::new(&config.earth_engine, config.datasets.clone())?;
        Ok(Self::new(Arc::new(service), config))
    }
}
