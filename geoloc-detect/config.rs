use crate::error::{DetectError, DetectResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_KEYPOINTS: usize = 1000;

/// Complete detector configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    /// FAST intensity threshold (1-127)
    pub threshold: u8,
    /// Contiguous arc length of the segment test (FAST-9 .. FAST-12)
    pub arc_length: usize,
    /// Side of the orientation / description patch in level pixels, odd
    pub patch_size: usize,
    /// Minimum distance between kept keypoints on one level
    pub nms_distance: f32,
    pub n_levels: usize,
    pub scale_factor: f32,
    /// Upper bound on keypoints returned per image
    pub max_keypoints: usize,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 20,
            arc_length: 9,
            patch_size: 31,
            nms_distance: 3.0,
            n_levels: 8,
            scale_factor: 1.2,
            max_keypoints: DEFAULT_MAX_KEYPOINTS,
            name: None,
            description: None,
        }
    }
}

impl DetectorConfig {
    /// Fewer levels and a higher threshold, for large training sets
    pub fn fast_preset() -> Self {
        Self {
            threshold: 30,
            arc_length: 9,
            patch_size: 31,
            nms_distance: 5.0,
            n_levels: 4,
            scale_factor: 1.4,
            max_keypoints: 500,
            name: Some("Fast".to_string()),
            description: Some("Fewer levels and keypoints for large training sets".to_string()),
        }
    }

    /// Denser detection for low-texture scenes
    pub fn quality_preset() -> Self {
        Self {
            threshold: 12,
            arc_length: 9,
            patch_size: 31,
            nms_distance: 2.0,
            n_levels: 8,
            scale_factor: 1.2,
            max_keypoints: 2000,
            name: Some("Quality".to_string()),
            description: Some("Low threshold and dense keypoints for low-texture scenes".to_string()),
        }
    }

    /// Add metadata to configuration
    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    /// Convert to DetectorBuilder for further customization
    pub fn to_builder(self) -> crate::builder::DetectorBuilder {
        crate::builder::DetectorBuilder::from_config(self)
    }

    pub fn summary(&self) -> String {
        let params = format!(
            "threshold={}, FAST-{}, patch={}, NMS={:.1}, levels={}x{:.2}, max_keypoints={}",
            self.threshold, self.arc_length, self.patch_size, self.nms_distance,
            self.n_levels, self.scale_factor, self.max_keypoints
        );
        match &self.name {
            Some(name) => format!("DetectorConfig '{}': {}", name, params),
            None => format!("DetectorConfig: {}", params),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> DetectResult<()> {
        if self.threshold == 0 || self.threshold > 127 {
            return Err(DetectError::InvalidThreshold(self.threshold));
        }
        if !(9..=12).contains(&self.arc_length) {
            return Err(DetectError::InvalidArcLength(self.arc_length));
        }
        if self.patch_size % 2 == 0 || self.patch_size < 7 {
            return Err(DetectError::InvalidPatchSize(self.patch_size));
        }
        if self.max_keypoints == 0 {
            return Err(DetectError::InvalidMaxKeypoints(self.max_keypoints));
        }
        if self.n_levels == 0 || !(self.scale_factor > 1.0) {
            return Err(DetectError::InvalidPyramid {
                levels: self.n_levels,
                scale_factor: self.scale_factor,
            });
        }
        if !(self.nms_distance >= 0.0) {
            return Err(DetectError::InvalidNmsDistance(self.nms_distance));
        }
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
        assert!(DetectorConfig::fast_preset().validate().is_ok());
        assert!(DetectorConfig::quality_preset().validate().is_ok());
        assert_eq!(DetectorConfig::default().max_keypoints, 1000);
    }

    #[test]
    fn test_invalid_parameters() {
        let cfg = DetectorConfig { threshold: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(DetectError::InvalidThreshold(0))));
        let cfg = DetectorConfig { threshold: 200, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(DetectError::InvalidThreshold(200))));
        let cfg = DetectorConfig { arc_length: 8, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(DetectError::InvalidArcLength(8))));
        let cfg = DetectorConfig { patch_size: 16, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(DetectError::InvalidPatchSize(16))));
        let cfg = DetectorConfig { max_keypoints: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(DetectError::InvalidMaxKeypoints(0))));
        let cfg = DetectorConfig { scale_factor: 1.0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(DetectError::InvalidPyramid { .. })));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_and_toml_round_trip() {
        let cfg = DetectorConfig::quality_preset().with_metadata("Street", "Dense street scenes");
        assert_eq!(DetectorConfig::from_json(&cfg.to_json().unwrap()).unwrap(), cfg);
        assert_eq!(DetectorConfig::from_toml(&cfg.to_toml().unwrap()).unwrap(), cfg);

        // missing fields fall back to defaults, invalid values are rejected on load
        let partial = DetectorConfig::from_toml("max_keypoints = 250").unwrap();
        assert_eq!(partial.max_keypoints, 250);
        assert_eq!(partial.threshold, 20);
        assert!(DetectorConfig::from_json(r#"{"threshold": 0}"#).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("geoloc-detect-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let cfg = DetectorConfig::fast_preset().with_metadata("Fast", "Large training sets");

        let json_path = dir.join("detector.json");
        cfg.save_json(&json_path).unwrap();
        assert_eq!(DetectorConfig::load_json(&json_path).unwrap(), cfg);

        let toml_path = dir.join("detector.toml");
        cfg.save_toml(&toml_path).unwrap();
        let loaded = DetectorConfig::load_toml(&toml_path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.name.as_deref(), Some("Fast"));
        assert!(loaded.summary().starts_with("DetectorConfig 'Fast': threshold="));

        std::fs::write(&toml_path, "arc_length = 20").unwrap();
        assert!(DetectorConfig::load_toml(&toml_path).is_err());
        assert!(DetectorConfig::load_json(dir.join("missing.json")).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
