pub mod aggregate;
pub mod distance;

pub use aggregate::{aggregate, Aggregation, Candidate, Contributor, LocationEstimate};
pub use distance::{
    distance_between, haversine_distance, round_micro_degrees, DistanceReport, EARTH_RADIUS_M,
};
