use crate::config::DetectorConfig;
use crate::detector::KeypointDetector;
use crate::error::DetectResult;

/// Builder for creating a `KeypointDetector`
#[derive(Debug, Clone, Default)]
pub struct DetectorBuilder {
    config: DetectorConfig,
}

impl DetectorBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the FAST threshold (1-127)
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the segment-test arc length (9-12)
    pub fn arc_length(mut self, n: usize) -> Self {
        self.config.arc_length = n;
        self
    }

    /// Set the patch size for orientation and description
    pub fn patch_size(mut self, patch_size: usize) -> Self {
        self.config.patch_size = patch_size;
        self
    }

    /// Set the non-maximum suppression (NMS) distance
    pub fn nms_distance(mut self, distance: f32) -> Self {
        self.config.nms_distance = distance;
        self
    }

    /// Set pyramid depth and per-level scale factor
    pub fn pyramid(mut self, n_levels: usize, scale_factor: f32) -> Self {
        self.config.n_levels = n_levels;
        self.config.scale_factor = scale_factor;
        self
    }

    pub fn max_keypoints(mut self, max_keypoints: usize) -> Self {
        self.config.max_keypoints = max_keypoints;
        self
    }

    pub fn preset_fast(mut self) -> Self {
        self.config = DetectorConfig::fast_preset();
        self
    }

    pub fn preset_quality(mut self) -> Self {
        self.config = DetectorConfig::quality_preset();
        self
    }

    /// Build the detector, validating the configuration
    pub fn build(self) -> DetectResult<KeypointDetector> {
        KeypointDetector::new(self.config)
    }

    pub fn summary(&self) -> String {
        self.config.summary()
    }

    /// Create a builder from an existing `DetectorConfig`
    pub fn from_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Convert the builder into a `DetectorConfig`
    pub fn to_config(self) -> DetectorConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectError;

    #[test]
    fn test_builder_overrides() {
        let cfg = DetectorBuilder::new()
            .threshold(35)
            .arc_length(12)
            .max_keypoints(64)
            .pyramid(3, 1.5)
            .to_config();
        assert_eq!(cfg.threshold, 35);
        assert_eq!(cfg.arc_length, 12);
        assert_eq!(cfg.max_keypoints, 64);
        assert_eq!(cfg.n_levels, 3);
    }

    #[test]
    fn test_builder_validates_on_build() {
        let result = DetectorBuilder::new().patch_size(8).build();
        assert!(matches!(result, Err(DetectError::InvalidPatchSize(8))));
        assert!(DetectorBuilder::new().preset_fast().build().is_ok());
    }

    #[test]
    fn test_round_trip_through_config() {
        let builder = DetectorConfig::quality_preset().to_builder().nms_distance(4.0);
        assert!(builder.summary().contains("NMS=4.0"));
        assert_eq!(builder.to_config().threshold, 12);
    }
}
