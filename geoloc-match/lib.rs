//! Descriptor matching: exhaustive k-nearest-neighbour search, Lowe's ratio
//! test and the count threshold that decides whether two images match.

pub mod matcher;
pub mod scorer;
pub mod threshold;

pub use matcher::{euclidean_distance, knn_match, Match};
pub use scorer::{good_matches, match_score, RatioTest};
pub use threshold::{classify, MatchClass};
