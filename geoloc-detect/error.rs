use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectError {
    #[error("Image data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData { expected_len: usize, actual_len: usize },
    #[error("Invalid threshold: {0} (must be 1-127)")]
    InvalidThreshold(u8),
    #[error("Invalid arc length: {0} (must be 9-12)")]
    InvalidArcLength(usize),
    #[error("Invalid patch size: {0} (must be odd and >= 7)")]
    InvalidPatchSize(usize),
    #[error("Invalid keypoint budget: {0} (must be > 0)")]
    InvalidMaxKeypoints(usize),
    #[error("Invalid pyramid: {levels} levels with scale factor {scale_factor}")]
    InvalidPyramid { levels: usize, scale_factor: f32 },
    #[error("Invalid NMS distance: {0}")]
    InvalidNmsDistance(f32),
}

pub type DetectResult<T> = Result<T, DetectError>;
