use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Invalid image dimensions: {width}x{height} (must be > 0)")]
    InvalidImageSize { width: usize, height: usize },
    #[error("Image data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData { expected_len: usize, actual_len: usize },
    #[error("Invalid ratio: {0} (must be in (0, 1])")]
    InvalidRatio(f32),
    #[error("Invalid thread count: {0} (must be > 0)")]
    InvalidThreadCount(usize),
    #[error("Descriptor count mismatch: {keypoints} keypoints, {descriptors} descriptors")]
    DescriptorCountMismatch { keypoints: usize, descriptors: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Row-major 8-bit grayscale raster
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Image {
    /// Wrap an 8-bit luma buffer, checking it against the dimensions
    pub fn from_luma(width: usize, height: usize, data: Vec<u8>) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidImageSize { width, height });
        }
        let expected_len = width * height;
        if data.len() != expected_len {
            return Err(CoreError::InvalidImageData {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Convert an interleaved RGBA buffer (alpha ignored)
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> CoreResult<Self> {
        Self::from_interleaved(width, height, rgba, 4)
    }

    /// Convert an interleaved RGB buffer
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> CoreResult<Self> {
        Self::from_interleaved(width, height, rgb, 3)
    }

    fn from_interleaved(width: usize, height: usize, raw: &[u8], channels: usize) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidImageSize { width, height });
        }
        let expected_len = width * height * channels;
        if raw.len() != expected_len {
            return Err(CoreError::InvalidImageData {
                expected_len,
                actual_len: raw.len(),
            });
        }
        // BT.601 luma, fixed point
        let data = raw
            .chunks_exact(channels)
            .map(|px| {
                let y = 299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32;
                ((y + 500) / 1000) as u8
            })
            .collect();
        Ok(Self { width, height, data })
    }

    /// Buffer length matches the declared dimensions
    pub fn is_consistent(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == self.width * self.height
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Bilinear interpolation for subpixel sampling, clamped at the border
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let x1 = x0 + 1.0;
        let y1 = y0 + 1.0;

        if x0 < 0.0 || y0 < 0.0 || x1 >= self.width as f32 || y1 >= self.height as f32 {
            let cx = x.round().clamp(0.0, (self.width - 1) as f32) as usize;
            let cy = y.round().clamp(0.0, (self.height - 1) as f32) as usize;
            return self.pixel(cx, cy) as f32;
        }

        let dx = x - x0;
        let dy = y - y0;
        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);

        let p00 = self.pixel(x0, y0) as f32;
        let p10 = self.pixel(x1, y0) as f32;
        let p01 = self.pixel(x0, y1) as f32;
        let p11 = self.pixel(x1, y1) as f32;

        let top = p00 * (1.0 - dx) + p10 * dx;
        let bottom = p01 * (1.0 - dx) + p11 * dx;
        top * (1.0 - dy) + bottom * dy
    }
}

/// Keypoint in level-0 pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Orientation in radians
    pub angle: f32,
    /// Pyramid scale the keypoint was detected at (1.0 = full resolution)
    pub scale: f32,
    pub octave: usize,
    pub response: f32,
}

pub const DESCRIPTOR_LEN: usize = 128;

/// 4x4 spatial cells x 8 orientation bins
pub type Descriptor = [f32; DESCRIPTOR_LEN];

/// Keypoints and their descriptors, row `i` of `descriptors` belongs to `keypoints[i]`
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl DescriptorSet {
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<Descriptor>) -> CoreResult<Self> {
        if keypoints.len() != descriptors.len() {
            return Err(CoreError::DescriptorCountMismatch {
                keypoints: keypoints.len(),
                descriptors: descriptors.len(),
            });
        }
        Ok(Self { keypoints, descriptors })
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Latitude/longitude pair in degrees. No range validation is performed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lat {}, Lon {}", self.latitude, self.longitude)
    }
}

pub const DEFAULT_RATIO: f32 = 0.75;
pub const DEFAULT_MATCH_THRESHOLD: usize = 10;

/// Matching and scheduling parameters shared by the pipeline stages
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeolocConfig {
    /// Lowe ratio: nearest must be closer than `ratio * second`
    pub ratio: f32,
    /// Minimum number of good matches for a pair to count as matching (inclusive)
    pub match_threshold: usize,
    pub n_threads: usize,
}

impl Default for GeolocConfig {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_RATIO,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            n_threads: num_cpus::get().max(1),
        }
    }
}

impl GeolocConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.ratio > 0.0 && self.ratio <= 1.0) {
            return Err(CoreError::InvalidRatio(self.ratio));
        }
        if self.n_threads == 0 {
            return Err(CoreError::InvalidThreadCount(self.n_threads));
        }
        Ok(())
    }
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}
