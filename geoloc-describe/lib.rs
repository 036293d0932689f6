use geoloc_core::{Descriptor, Image, Keypoint, DESCRIPTOR_LEN};
use rayon::prelude::*;
use std::f32::consts::PI;

/// Samples per side of the descriptor window
const GRID: usize = 16;
/// Spatial cells per side
const CELLS: usize = 4;
const BINS: usize = 8;
/// Per-component cap before renormalisation
const CLAMP: f32 = 0.2;
const EPS: f32 = 1e-6;

/// Gradient-orientation histogram descriptor. The sampling window follows the
/// keypoint's angle and scale, so descriptors are comparable across rotation
/// and pyramid level.
pub struct DescriptorGenerator {
    patch_size: usize,
}

impl DescriptorGenerator {
    pub fn new(patch_size: usize) -> Self {
        Self { patch_size: patch_size.max(1) }
    }

    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<Descriptor> {
        kps.par_iter().map(|kp| self.describe(img, kp)).collect()
    }

    /// Describe a single keypoint against the level-0 image
    pub fn describe(&self, img: &Image, kp: &Keypoint) -> Descriptor {
        let radius = self.patch_size as f32 * 0.5 * kp.scale;
        let spacing = 2.0 * radius / GRID as f32;
        // one level pixel, expressed in level-0 pixels
        let step = kp.scale.max(1.0);
        let sigma = radius * 0.5;
        let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);

        let (s, c) = kp.angle.sin_cos();
        let (ax, ay) = (c * step, s * step);
        let (bx, by) = (-s * step, c * step);

        let mut hist = [0f32; DESCRIPTOR_LEN];

        for i in 0..GRID {
            let v = (i as f32 + 0.5) * spacing - radius;
            for j in 0..GRID {
                let u = (j as f32 + 0.5) * spacing - radius;

                // Apply rotation and translation
                let px = kp.x + c * u - s * v;
                let py = kp.y + s * u + c * v;

                // Derivatives along the keypoint's own axes
                let gx = img.sample_bilinear(px + ax, py + ay) - img.sample_bilinear(px - ax, py - ay);
                let gy = img.sample_bilinear(px + bx, py + by) - img.sample_bilinear(px - bx, py - by);

                let magnitude = (gx * gx + gy * gy).sqrt();
                if magnitude == 0.0 {
                    continue;
                }

                let weight = (-(u * u + v * v) * inv_two_sigma_sq).exp();
                let t = (gy.atan2(gx) + PI) / (2.0 * PI) * BINS as f32;
                let bin = (t as usize).min(BINS - 1);
                let cell = (i / (GRID / CELLS)) * CELLS + j / (GRID / CELLS);

                hist[cell * BINS + bin] += magnitude * weight;
            }
        }

        normalize(&mut hist);
        hist
    }
}

/// L2-normalise, clamp large components, renormalise. Near-zero vectors become zero.
fn normalize(hist: &mut Descriptor) {
    if !scale_to_unit(hist) {
        return;
    }
    for v in hist.iter_mut() {
        *v = v.min(CLAMP);
    }
    scale_to_unit(hist);
}

fn scale_to_unit(hist: &mut Descriptor) -> bool {
    let norm = hist.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm <= EPS {
        hist.fill(0.0);
        return false;
    }
    for v in hist.iter_mut() {
        *v /= norm;
    }
    true
}
