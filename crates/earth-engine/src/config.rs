//! Client and dataset configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the Earth Engine REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthEngineConfig {
    /// API root, without the version segment.
    pub api_url: String,

    /// Cloud project billed for the computations.
    pub project: String,

    /// OAuth2 bearer token. Usually supplied via `EE_ACCESS_TOKEN`.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Largest raster edge, in pixels, requested from `computePixels`.
    pub max_dimension: usize,
}

impl Default for EarthEngineConfig {
    fn default() -> Self {
        Self {
            api_url: "https://earthengine.googleapis.com".to_string(),
            project: "ee-urban-insight".to_string(),
            access_token: None,
            timeout_secs: 120,
            max_dimension: 2048,
        }
    }
}

/// Dataset ids and reduction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub landcover_collection: String,
    pub landcover_start: String,
    pub landcover_end: String,
    /// Export scale in meters.
    pub landcover_scale: f64,

    pub population_collection: String,
    pub population_band: String,

    pub built_collection: String,
    pub built_band: String,

    /// Reduction scale in meters.
    pub stats_scale: f64,
    pub max_pixels: f64,
    pub best_effort: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            landcover_collection: "projects/sat-io/open-datasets/landcover/ESRI_Global-LULC_10m_TS"
                .to_string(),
            landcover_start: "2017-01-01".to_string(),
            landcover_end: "2017-12-31".to_string(),
            landcover_scale: 30.0,
            population_collection: "JRC/GHSL/P2023A/GHS_POP".to_string(),
            population_band: "population_count".to_string(),
            built_collection: "JRC/GHSL/P2023A/GHS_BUILT_S".to_string(),
            built_band: "built_surface".to_string(),
            stats_scale: 100.0,
            max_pixels: 1e9,
            best_effort: true,
        }
    }
}
