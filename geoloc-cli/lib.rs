use geoloc_core::{CoreError, Descriptor, DescriptorSet, Image, Keypoint};
use geoloc_describe::DescriptorGenerator;
use geoloc_detect::{DetectError, DetectorConfig, KeypointDetector};
use log::warn;
use thiserror::Error;

pub mod config;
pub mod manifest;
pub mod report;
pub mod session;
pub mod visualize;

pub use config::PipelineConfig;
pub use geoloc_core::{self, Coordinate, GeolocConfig};
pub use geoloc_estimate::{Aggregation, Contributor, DistanceReport, LocationEstimate};
pub use geoloc_match::MatchClass;
pub use session::{
    DistanceOutcome, EstimateReport, LabeledImage, PairOutcome, PairReport, RunReport, ScoreReport, Session,
};

#[derive(Debug, Error)]
pub enum GeolocError {
    #[error("Select a test image first")]
    MissingTestImage,
    #[error("Select training images first")]
    NoTrainingImages,
    #[error("No estimated location available")]
    EstimateUnavailable,
    #[error("Test image has no known location")]
    MissingReference,
    #[error("Detection error: {0}")]
    Detect(#[from] DetectError),
    #[error("Invalid input: {0}")]
    Core(#[from] CoreError),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type GeolocResult<T> = Result<T, GeolocError>;

/// Keypoint detection plus description in one step
pub struct Extractor {
    detector: KeypointDetector,
    descriptor: DescriptorGenerator,
}

impl Extractor {
    pub fn new(cfg: DetectorConfig) -> GeolocResult<Self> {
        let descriptor = DescriptorGenerator::new(cfg.patch_size);
        let detector = KeypointDetector::new(cfg)?;
        Ok(Self { detector, descriptor })
    }

    /// Detect keypoints, strongest first, capped at `max_keypoints`
    pub fn detect_keypoints(&self, img: &Image) -> GeolocResult<Vec<Keypoint>> {
        Ok(self.detector.detect_keypoints(img)?)
    }

    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<Descriptor> {
        self.descriptor.generate_descriptors(img, kps)
    }

    /// Detect keypoints and describe them. An image without features gives an
    /// empty set, not an error.
    pub fn extract(&self, img: &Image) -> GeolocResult<DescriptorSet> {
        let kps = self.detect_keypoints(img)?;
        if kps.is_empty() {
            warn!("no keypoints detected in {}x{} image", img.width, img.height);
            return Ok(DescriptorSet::empty());
        }
        let desc = self.generate_descriptors(img, &kps);
        Ok(DescriptorSet::new(kps, desc)?)
    }

    pub fn config(&self) -> &DetectorConfig {
        self.detector.config()
    }
}
