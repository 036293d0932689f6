use geoloc_core::Coordinate;
use geoloc_match::MatchClass;
use log::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One scored training image as seen by the aggregator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position in the training set (display rank)
    pub index: usize,
    pub score: usize,
    pub class: MatchClass,
    pub coordinate: Option<Coordinate>,
}

/// A matching training image
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contributor {
    pub index: usize,
    pub score: usize,
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LocationEstimate {
    /// No located training image passed the threshold
    Undefined,
    Estimated(Coordinate),
}

impl LocationEstimate {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            LocationEstimate::Estimated(c) => Some(*c),
            LocationEstimate::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, LocationEstimate::Estimated(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aggregation {
    pub estimate: LocationEstimate,
    /// Matching images whose coordinates went into the mean
    pub contributors: Vec<Contributor>,
    /// Matching images without a coordinate, excluded from the mean
    pub unlocated: Vec<Contributor>,
}

impl Aggregation {
    pub fn count(&self) -> usize {
        self.contributors.len()
    }
}

/// Average the coordinates of every matching candidate.
///
/// Latitude and longitude are averaged independently, which is only meaningful
/// for points that lie close together. Needs the complete candidate list.
pub fn aggregate(candidates: &[Candidate]) -> Aggregation {
    let mut contributors = Vec::new();
    let mut unlocated = Vec::new();
    let mut sum_lat = 0.0f64;
    let mut sum_lon = 0.0f64;

    for candidate in candidates.iter().filter(|c| c.class.is_matching()) {
        let contributor = Contributor {
            index: candidate.index,
            score: candidate.score,
            coordinate: candidate.coordinate,
        };
        match candidate.coordinate {
            Some(c) => {
                sum_lat += c.latitude;
                sum_lon += c.longitude;
                contributors.push(contributor);
            }
            None => {
                warn!("training image {} matches but has no coordinate", candidate.index + 1);
                unlocated.push(contributor);
            }
        }
    }

    let estimate = if contributors.is_empty() {
        LocationEstimate::Undefined
    } else {
        let n = contributors.len() as f64;
        LocationEstimate::Estimated(Coordinate::new(sum_lat / n, sum_lon / n))
    };
    debug!("aggregated {} of {} candidates: {:?}", contributors.len(), candidates.len(), estimate);

    Aggregation {
        estimate,
        contributors,
        unlocated,
    }
}
