//! Scale- and rotation-aware keypoint detection.
//!
//! Corners are found with a FAST segment test on every level of an image
//! pyramid, thinned with non-maximum suppression, oriented by intensity
//! centroid and ranked by response.

pub mod builder;
pub mod config;
pub mod corner_detection;
pub mod detector;
pub mod error;
pub mod pyramid;
pub mod refinement;
pub mod types;

pub use builder::DetectorBuilder;
pub use config::{DetectorConfig, DEFAULT_MAX_KEYPOINTS};
pub use detector::KeypointDetector;
pub use error::{DetectError, DetectResult};
pub use types::ScaleLevel;
