use std::path::Path;

use geoloc_core::GeolocConfig;
use geoloc_detect::DetectorConfig;
use serde::{Deserialize, Serialize};

use crate::{GeolocError, GeolocResult};

/// Everything a `Session` needs to run the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub matching: GeolocConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> GeolocResult<()> {
        self.detector.validate()?;
        self.matching.validate()?;
        Ok(())
    }

    pub fn summary(&self) -> String {
        format!(
            "{}; ratio={}, threshold={}, threads={}",
            self.detector.summary(),
            self.matching.ratio,
            self.matching.match_threshold,
            self.matching.n_threads
        )
    }

    pub fn from_toml(toml_str: &str) -> GeolocResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| GeolocError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> GeolocResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| GeolocError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> GeolocResult<String> {
        toml::to_string_pretty(self).map_err(|e| GeolocError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> GeolocResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GeolocError::Config(e.to_string()))
    }

    /// Load from a `.json` or `.toml` file, chosen by extension
    pub fn load<P: AsRef<Path>>(path: P) -> GeolocResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GeolocError::Config(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }
}
