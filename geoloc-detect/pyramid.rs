use geoloc_core::Image;
use crate::types::ScaleLevel;

/// Smallest side a downsampled level may have
pub const MIN_LEVEL_SIDE: usize = 32;

/// Image pyramid operations for multi-scale feature detection
pub struct ImagePyramid;

impl ImagePyramid {
    /// Generate scale levels for image pyramid. Level 0 is always present.
    pub fn generate_scale_levels(width: usize, height: usize, n_levels: usize, scale_factor: f32) -> Vec<ScaleLevel> {
        let mut levels = vec![ScaleLevel { level: 0, scale: 1.0, width, height }];
        let mut current_scale = 1.0f32;

        for level in 1..n_levels {
            current_scale *= scale_factor;
            let scaled_width = ((width as f32) / current_scale) as usize;
            let scaled_height = ((height as f32) / current_scale) as usize;

            if scaled_width < MIN_LEVEL_SIDE || scaled_height < MIN_LEVEL_SIDE {
                break;
            }

            levels.push(ScaleLevel {
                level,
                scale: current_scale,
                width: scaled_width,
                height: scaled_height,
            });
        }

        levels
    }

    /// Build image pyramid from base image
    pub fn build_image_pyramid(img: &Image, scale_levels: &[ScaleLevel]) -> Vec<Image> {
        scale_levels
            .iter()
            .map(|scale_level| {
                if scale_level.level == 0 {
                    img.clone()
                } else {
                    Self::downsample_image(img, scale_level.width, scale_level.height)
                }
            })
            .collect()
    }

    /// Downsample image using bilinear interpolation at pixel centres
    fn downsample_image(img: &Image, target_width: usize, target_height: usize) -> Image {
        let x_ratio = img.width as f32 / target_width as f32;
        let y_ratio = img.height as f32 / target_height as f32;

        let mut data = Vec::with_capacity(target_width * target_height);
        for y in 0..target_height {
            let src_y = (y as f32 + 0.5) * y_ratio - 0.5;
            for x in 0..target_width {
                let src_x = (x as f32 + 0.5) * x_ratio - 0.5;
                data.push(img.sample_bilinear(src_x, src_y).round().clamp(0.0, 255.0) as u8);
            }
        }

        Image {
            width: target_width,
            height: target_height,
            data,
        }
    }
}
