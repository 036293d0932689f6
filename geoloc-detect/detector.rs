use geoloc_core::{Image, Keypoint};
use crate::config::DetectorConfig;
use crate::corner_detection::CornerDetector;
use crate::error::{DetectError, DetectResult};
use crate::pyramid::ImagePyramid;
use crate::refinement::KeypointRefinement;
use crate::types::ScaleLevel;
use log::debug;
use rayon::prelude::*;

/// Multi-scale FAST detector with oriented, response-ranked output
#[derive(Debug, Clone)]
pub struct KeypointDetector {
    cfg: DetectorConfig,
}

impl KeypointDetector {
    /// Creates a new detector with validation
    pub fn new(cfg: DetectorConfig) -> DetectResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Validates image data before processing
    fn validate_image(img: &Image) -> DetectResult<()> {
        let expected_len = img.width * img.height;
        if img.width == 0 || img.height == 0 || img.data.len() != expected_len {
            return Err(DetectError::InvalidImageData {
                expected_len,
                actual_len: img.data.len(),
            });
        }
        Ok(())
    }

    /// Detect at most `max_keypoints` keypoints, strongest first, in level-0 coordinates.
    /// Images without corners (or too small to hold one) yield an empty list.
    pub fn detect_keypoints(&self, img: &Image) -> DetectResult<Vec<Keypoint>> {
        let mut kps = self.detect_keypoints_unranked(img)?;

        kps.sort_by(|a, b| {
            b.response
                .total_cmp(&a.response)
                .then(a.octave.cmp(&b.octave))
                .then(a.y.total_cmp(&b.y))
                .then(a.x.total_cmp(&b.x))
        });
        kps.truncate(self.cfg.max_keypoints);

        Ok(kps)
    }

    /// Detect keypoints across all scales, suppressed and oriented, unranked
    pub fn detect_keypoints_unranked(&self, img: &Image) -> DetectResult<Vec<Keypoint>> {
        Self::validate_image(img)?;

        let scale_levels = self.scale_levels(img.width, img.height);
        let pyramid = ImagePyramid::build_image_pyramid(img, &scale_levels);

        let per_level: Vec<Vec<Keypoint>> = scale_levels
            .par_iter()
            .zip(pyramid.par_iter())
            .map(|(scale_level, scaled_img)| self.detect_keypoints_at_scale(scaled_img, scale_level))
            .collect();

        for (level, kps) in scale_levels.iter().zip(&per_level) {
            debug!("level {} ({}x{}): {} keypoints", level.level, level.width, level.height, kps.len());
        }

        Ok(per_level.into_iter().flatten().collect())
    }

    /// Detect on one pyramid level and map the result back to level-0 coordinates
    pub fn detect_keypoints_at_scale(&self, img: &Image, scale_level: &ScaleLevel) -> Vec<Keypoint> {
        let corners = CornerDetector::detect_keypoints_at_scale(
            img,
            scale_level,
            self.cfg.threshold,
            self.cfg.arc_length,
        );
        let suppressed = KeypointRefinement::non_maximum_suppression(&corners, self.cfg.nms_distance);

        suppressed
            .into_iter()
            .map(|mut kp| {
                kp.angle = KeypointRefinement::compute_orientation(img, kp.x, kp.y, self.cfg.patch_size);
                kp.x *= scale_level.scale;
                kp.y *= scale_level.scale;
                kp
            })
            .collect()
    }

    pub fn scale_levels(&self, width: usize, height: usize) -> Vec<ScaleLevel> {
        ImagePyramid::generate_scale_levels(width, height, self.cfg.n_levels, self.cfg.scale_factor)
    }

    /// Get detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }
}
