//! Service configuration loading and types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use earth_engine::{DatasetConfig, EarthEngineConfig};

use crate::pipeline::PipelineMode;

/// Top-level configuration, loaded from `config/urban-api.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory served under `/static`. Exports are written below it.
    pub static_dir: PathBuf,

    /// Directory holding `index.html`.
    pub template_dir: PathBuf,

    /// Mode used when a request does not name one.
    pub default_mode: PipelineMode,

    pub export: ExportConfig,

    pub earth_engine: EarthEngineConfig,

    pub datasets: DatasetConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            template_dir: PathBuf::from("templates"),
            default_mode: PipelineMode::LandcoverOnly,
            export: ExportConfig::default(),
            earth_engine: EarthEngineConfig::default(),
            datasets: DatasetConfig::default(),
        }
    }
}

/// Land-cover export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Convert the exported GeoTIFF to PNG and return the PNG path.
    pub convert_to_png: bool,

    /// Subdirectory of `static_dir` receiving exported files.
    pub subdir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            convert_to_png: true,
            subdir: "exports".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing file yields the defaults; a present but invalid file is an
    /// error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Config file {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!(path = %path.display(), mode = %config.default_mode, "Loaded service config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `EE_PROJECT`, `EE_ACCESS_TOKEN`, `EE_API_URL` and
    /// `URBAN_DEFAULT_MODE` from the environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(project) = lookup("EE_PROJECT") {
            self.earth_engine.project = project;
        }
        if let Some(token) = lookup("EE_ACCESS_TOKEN").filter(|t| !t.is_empty()) {
            self.earth_engine.access_token = Some(token);
        }
        if let Some(url) = lookup("EE_API_URL") {
            self.earth_engine.api_url = url;
        }
        if let Some(mode) = lookup("URBAN_DEFAULT_MODE") {
            self.default_mode = mode
                .parse()
                .with_context(|| format!("Invalid URBAN_DEFAULT_MODE: {}", mode))?;
        }
        Ok(())
    }

    /// Directory receiving exported rasters.
    pub fn export_dir(&self) -> PathBuf {
        self.static_dir.join(&self.export.subdir)
    }
}
