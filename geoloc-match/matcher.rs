use geoloc_core::Descriptor;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A query descriptor paired with one candidate descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f32,
}

#[inline]
pub fn euclidean_distance(a: &Descriptor, b: &Descriptor) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Exhaustive k-nearest-neighbour search from every `query` row into `train`.
///
/// Returns one group per query row, in query order. Each group holds at most
/// `k` matches sorted by ascending distance (ties: lower train index first), so
/// it is shorter than `k` only when `train` has fewer than `k` rows.
pub fn knn_match(query: &[Descriptor], train: &[Descriptor], k: usize) -> Vec<Vec<Match>> {
    query
        .par_iter()
        .enumerate()
        .map(|(query_idx, q)| {
            let mut best: Vec<Match> = Vec::with_capacity(k + 1);
            for (train_idx, t) in train.iter().enumerate() {
                let distance = euclidean_distance(q, t);
                if best.len() == k && best.last().map_or(true, |worst| distance >= worst.distance) {
                    continue;
                }
                let pos = best.partition_point(|m| m.distance <= distance);
                best.insert(pos, Match { query_idx, train_idx, distance });
                best.truncate(k);
            }
            best
        })
        .collect()
}
