use std::path::Path;

use geoloc_core::{Image, Keypoint};
use image::{GrayImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use crate::{GeolocError, GeolocResult};

const KEYPOINT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Circle each keypoint, radius growing with scale, with a tick showing its angle
pub fn draw_keypoints(img: &Image, kps: &[Keypoint]) -> GeolocResult<RgbaImage> {
    let gray = GrayImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
        .ok_or_else(|| GeolocError::Config("image buffer does not match its dimensions".into()))?;
    let mut output = image::DynamicImage::ImageLuma8(gray).into_rgba8();

    for kp in kps {
        let radius = (3.0 * kp.scale).round().max(3.0);
        draw_hollow_circle_mut(&mut output, (kp.x as i32, kp.y as i32), radius as i32, KEYPOINT_COLOR);
        let end = (kp.x + radius * kp.angle.cos(), kp.y + radius * kp.angle.sin());
        draw_line_segment_mut(&mut output, (kp.x, kp.y), end, KEYPOINT_COLOR);
    }
    Ok(output)
}

pub fn save_keypoints<P: AsRef<Path>>(img: &Image, kps: &[Keypoint], path: P) -> GeolocResult<()> {
    draw_keypoints(img, kps)?.save(path)?;
    Ok(())
}
