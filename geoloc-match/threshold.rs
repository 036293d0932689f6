#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether a test/training pair shares enough good matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchClass {
    Matching,
    NonMatching,
}

impl MatchClass {
    pub fn is_matching(self) -> bool {
        self == MatchClass::Matching
    }
}

/// `score >= threshold` is matching; the boundary is inclusive
pub fn classify(score: usize, threshold: usize) -> MatchClass {
    if score >= threshold {
        MatchClass::Matching
    } else {
        MatchClass::NonMatching
    }
}
