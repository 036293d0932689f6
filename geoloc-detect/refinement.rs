use geoloc_core::{Image, Keypoint};

/// Non-maximum suppression and orientation assignment
pub struct KeypointRefinement;

impl KeypointRefinement {
    /// Greedy suppression: strongest first, drop anything closer than `min_distance`
    /// to an already accepted keypoint. Ties keep input order.
    pub fn non_maximum_suppression(keypoints: &[Keypoint], min_distance: f32) -> Vec<Keypoint> {
        if keypoints.is_empty() {
            return Vec::new();
        }

        let mut sorted_keypoints = keypoints.to_vec();
        sorted_keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));

        let mut suppressed: Vec<Keypoint> = Vec::new();
        let min_distance_sq = min_distance * min_distance;

        for candidate in sorted_keypoints {
            let is_local_max = suppressed.iter().all(|accepted| {
                let dx = candidate.x - accepted.x;
                let dy = candidate.y - accepted.y;
                dx * dx + dy * dy >= min_distance_sq
            });

            if is_local_max {
                suppressed.push(candidate);
            }
        }

        suppressed
    }

    /// Intensity-centroid orientation over a `patch_size` square, clipped at the border
    pub fn compute_orientation(img: &Image, x: f32, y: f32, patch_size: usize) -> f32 {
        let half = (patch_size / 2) as i64;
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        let (w, h) = (img.width as i64, img.height as i64);

        let mut m10 = 0i64;
        let mut m01 = 0i64;

        for dy in -half..=half {
            let yy = cy + dy;
            if yy < 0 || yy >= h {
                continue;
            }
            for dx in -half..=half {
                let xx = cx + dx;
                if xx < 0 || xx >= w {
                    continue;
                }
                let val = img.pixel(xx as usize, yy as usize) as i64;
                m10 += dx * val;
                m01 += dy * val;
            }
        }

        if m10 == 0 && m01 == 0 {
            0.0
        } else {
            (m01 as f32).atan2(m10 as f32)
        }
    }
}
