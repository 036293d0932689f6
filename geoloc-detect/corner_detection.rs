use geoloc_core::{Image, Keypoint};
use crate::types::ScaleLevel;
use rayon::prelude::*;

/// FAST segment-test corner detection
pub struct CornerDetector;

impl CornerDetector {
    /// Bresenham circle of radius 3, clockwise from 12 o'clock
    pub const FAST_OFFSETS: [(i32, i32); 16] = [
        (0, -3), (1, -3), (2, -2), (3, -1),
        (3, 0), (3, 1), (2, 2), (1, 3),
        (0, 3), (-1, 3), (-2, 2), (-3, 1),
        (-3, 0), (-3, -1), (-2, -2), (-1, -3),
    ];

    pub const BORDER: usize = 3;

    /// Detect corners on one pyramid level. Coordinates are in that level's pixels.
    pub fn detect_keypoints_at_scale(
        img: &Image,
        scale_level: &ScaleLevel,
        threshold: u8,
        arc_length: usize,
    ) -> Vec<Keypoint> {
        let width = img.width;
        let height = img.height;
        if width <= 2 * Self::BORDER || height <= 2 * Self::BORDER {
            return Vec::new();
        }

        (Self::BORDER..height - Self::BORDER)
            .into_par_iter()
            .flat_map_iter(|y| {
                let mut row = Vec::new();
                for x in Self::BORDER..width - Self::BORDER {
                    if let Some(response) = Self::segment_test(img, x, y, threshold, arc_length) {
                        row.push(Keypoint {
                            x: x as f32,
                            y: y as f32,
                            angle: 0.0,
                            scale: scale_level.scale,
                            octave: scale_level.level,
                            response,
                        });
                    }
                }
                row
            })
            .collect()
    }

    /// Returns the corner response if `(x, y)` passes the segment test
    fn segment_test(img: &Image, x: usize, y: usize, threshold: u8, arc_length: usize) -> Option<f32> {
        let p = img.pixel(x, y) as i32;
        let t = threshold as i32;

        // Any arc of N >= 9 covers at least N/4 of the compass pixels
        let mut compass_bright = 0;
        let mut compass_dark = 0;
        for i in (0..16).step_by(4) {
            let q = Self::ring_pixel(img, x, y, i);
            if q >= p + t {
                compass_bright += 1;
            } else if q <= p - t {
                compass_dark += 1;
            }
        }
        let min_compass = arc_length / 4;
        if compass_bright < min_compass && compass_dark < min_compass {
            return None;
        }

        let mut bright_mask = 0u16;
        let mut dark_mask = 0u16;
        let mut bright_sum = 0i32;
        let mut dark_sum = 0i32;
        for i in 0..16 {
            let q = Self::ring_pixel(img, x, y, i);
            if q >= p + t {
                bright_mask |= 1 << i;
                bright_sum += q - p;
            } else if q <= p - t {
                dark_mask |= 1 << i;
                dark_sum += p - q;
            }
        }

        if has_consecutive_bits(bright_mask, arc_length) {
            Some(bright_sum as f32 / bright_mask.count_ones() as f32)
        } else if has_consecutive_bits(dark_mask, arc_length) {
            Some(dark_sum as f32 / dark_mask.count_ones() as f32)
        } else {
            None
        }
    }

    #[inline]
    fn ring_pixel(img: &Image, x: usize, y: usize, i: usize) -> i32 {
        let (dx, dy) = Self::FAST_OFFSETS[i];
        img.pixel((x as i32 + dx) as usize, (y as i32 + dy) as usize) as i32
    }
}

/// Check for a run of at least `min_count` set bits in a circular 16-bit mask
pub fn has_consecutive_bits(mask: u16, min_count: usize) -> bool {
    if min_count > 16 || min_count == 0 {
        return false;
    }

    let mut test_mask = mask;
    for i in 1..min_count {
        test_mask &= mask.rotate_left(i as u32);
        if test_mask == 0 {
            return false;
        }
    }

    test_mask != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mask_from(bits: impl IntoIterator<Item = usize>) -> u16 {
        bits.into_iter().fold(0u16, |m, i| m | (1 << i))
    }

    fn level0(img: &Image) -> ScaleLevel {
        ScaleLevel { level: 0, scale: 1.0, width: img.width, height: img.height }
    }

    #[test]
    fn test_consecutive_bits_simple() {
        let mask = mask_from(0..9);
        assert!(has_consecutive_bits(mask, 9));
        assert!(!has_consecutive_bits(mask, 10));
    }

    #[test]
    fn test_consecutive_bits_wrap_around() {
        let mask = mask_from((12..16).chain(0..5));
        assert!(has_consecutive_bits(mask, 9));
    }

    #[test]
    fn test_non_consecutive_bits() {
        let mask = mask_from((0..16).step_by(2));
        assert!(!has_consecutive_bits(mask, 2));
        assert!(!has_consecutive_bits(0, 1));
        assert!(has_consecutive_bits(u16::MAX, 16));
    }

    #[test]
    fn test_flat_image_has_no_corners() {
        let img = Image::from_luma(20, 20, vec![128; 400]).unwrap();
        let kps = CornerDetector::detect_keypoints_at_scale(&img, &level0(&img), 20, 9);
        assert!(kps.is_empty());
    }

    #[test]
    fn test_bright_square_corner_detected() {
        let mut data = vec![50u8; 30 * 30];
        for y in 10..20 {
            for x in 10..20 {
                data[y * 30 + x] = 220;
            }
        }
        let img = Image::from_luma(30, 30, data).unwrap();
        let kps = CornerDetector::detect_keypoints_at_scale(&img, &level0(&img), 20, 9);
        assert!(!kps.is_empty());
        assert!(kps.iter().any(|k| k.x == 10.0 && k.y == 10.0));
        for k in &kps {
            assert!(k.response > 0.0 && k.response.is_finite());
        }
    }

    #[test]
    fn test_image_smaller_than_border() {
        let img = Image::from_luma(6, 6, vec![0; 36]).unwrap();
        assert!(CornerDetector::detect_keypoints_at_scale(&img, &level0(&img), 20, 9).is_empty());
    }

    /// Longest circular run of set bits, by walking the ring twice
    fn longest_circular_run(mask: u16) -> usize {
        if mask == u16::MAX {
            return 16;
        }
        let (mut best, mut run) = (0, 0);
        for i in 0..32 {
            if mask & (1 << (i % 16)) != 0 {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        best
    }

    proptest! {
        #[test]
        fn prop_consecutive_bits_matches_longest_run(mask in any::<u16>(), n in 1usize..=16) {
            prop_assert_eq!(has_consecutive_bits(mask, n), longest_circular_run(mask) >= n);
        }
    }
}
