use geoloc_core::{DescriptorSet, DEFAULT_RATIO};
use crate::matcher::{knn_match, Match};

/// Lowe's ratio test: keep the nearest match only when it is clearly closer
/// than the second nearest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioTest {
    pub ratio: f32,
}

impl Default for RatioTest {
    fn default() -> Self {
        Self { ratio: DEFAULT_RATIO }
    }
}

impl RatioTest {
    pub fn new(ratio: f32) -> Self {
        Self { ratio }
    }

    /// Groups that do not hold exactly two candidates never pass
    pub fn accept(&self, group: &[Match]) -> Option<Match> {
        match group {
            [nearest, second] if nearest.distance < self.ratio * second.distance => Some(*nearest),
            _ => None,
        }
    }
}

/// Matches from `query` into `train` that survive the ratio test, in query order
pub fn good_matches(query: &DescriptorSet, train: &DescriptorSet, test: RatioTest) -> Vec<Match> {
    if query.is_empty() || train.len() < 2 {
        return Vec::new();
    }
    knn_match(query.descriptors(), train.descriptors(), 2)
        .iter()
        .filter_map(|group| test.accept(group))
        .collect()
}

/// Number of good matches from `query` into `train`. Not symmetric: swapping
/// the arguments changes which side is searched.
pub fn match_score(query: &DescriptorSet, train: &DescriptorSet, test: RatioTest) -> usize {
    good_matches(query, train, test).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoloc_core::{Descriptor, Keypoint, DESCRIPTOR_LEN};
    use proptest::prelude::*;

    fn desc(values: &[f32]) -> Descriptor {
        let mut d = [0f32; DESCRIPTOR_LEN];
        d[..values.len()].copy_from_slice(values);
        d
    }

    fn set(rows: Vec<Descriptor>) -> DescriptorSet {
        let keypoints = rows
            .iter()
            .enumerate()
            .map(|(i, _)| Keypoint { x: i as f32, y: 0.0, angle: 0.0, scale: 1.0, octave: 0, response: 1.0 })
            .collect();
        DescriptorSet::new(keypoints, rows).unwrap()
    }

    fn m(distance: f32) -> Match {
        Match { query_idx: 0, train_idx: 0, distance }
    }

    #[test]
    fn test_ratio_boundary() {
        let test = RatioTest::default();
        assert!(test.accept(&[m(0.74), m(1.0)]).is_some());
        // strictly less than
        assert!(test.accept(&[m(0.75), m(1.0)]).is_none());
        assert!(test.accept(&[m(0.0), m(0.0)]).is_none());
    }

    #[test]
    fn test_groups_without_two_candidates_are_skipped() {
        let test = RatioTest::default();
        assert!(test.accept(&[]).is_none());
        assert!(test.accept(&[m(0.0)]).is_none());
        assert!(test.accept(&[m(0.0), m(1.0), m(2.0)]).is_none());
    }

    #[test]
    fn test_single_candidate_scores_zero() {
        let query = set(vec![desc(&[0.0]), desc(&[1.0]), desc(&[2.0])]);
        let train = set(vec![desc(&[0.0])]);
        assert_eq!(match_score(&query, &train, RatioTest::default()), 0);
        assert_eq!(match_score(&query, &DescriptorSet::empty(), RatioTest::default()), 0);
        assert_eq!(match_score(&DescriptorSet::empty(), &query, RatioTest::default()), 0);
    }

    #[test]
    fn test_score_is_directional() {
        // one distinctive query row against three spread-out candidates
        let a = set(vec![desc(&[0.0])]);
        let b = set(vec![desc(&[0.1]), desc(&[5.0]), desc(&[10.0])]);
        assert_eq!(match_score(&a, &b, RatioTest::default()), 1);
        // the reverse direction only has one candidate per query
        assert_eq!(match_score(&b, &a, RatioTest::default()), 0);
    }

    #[test]
    fn test_ambiguous_candidates_rejected() {
        let query = set(vec![desc(&[0.0])]);
        let train = set(vec![desc(&[1.0]), desc(&[-1.1])]);
        assert_eq!(match_score(&query, &train, RatioTest::default()), 0);
        let good = good_matches(&query, &set(vec![desc(&[0.5]), desc(&[3.0])]), RatioTest::default());
        assert_eq!(good, vec![Match { query_idx: 0, train_idx: 0, distance: 0.5 }]);
    }

    proptest! {
        #[test]
        fn prop_score_bounded_by_query_count(
            q in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 4), 0..20),
            t in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 4), 0..20),
        ) {
            let query = set(q.iter().map(|v| desc(v)).collect());
            let train = set(t.iter().map(|v| desc(v)).collect());
            let score = match_score(&query, &train, RatioTest::default());
            prop_assert!(score <= query.len());
            if train.len() < 2 {
                prop_assert_eq!(score, 0);
            }
        }
    }
}
