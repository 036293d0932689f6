use geoloc_core::Coordinate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Rounded components closer than this are treated as the same location
const SAME_LOCATION_EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceReport {
    pub meters: f64,
    /// The points were equal after rounding and the formula was skipped
    pub short_circuited: bool,
}

/// Round degrees to 6 decimal places (about 0.11 m)
pub fn round_micro_degrees(degrees: f64) -> f64 {
    (degrees * 1e6).round() / 1e6
}

/// Great-circle distance in meters. Inputs are degrees and are not range-checked.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon2 = b.longitude.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // rounding can push h just past 1 near antipodes
    let h = h.min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Distance between a reference and an estimate after rounding both to 6
/// decimals. Points that coincide after rounding report exactly 0.0.
pub fn distance_between(reference: Coordinate, estimate: Coordinate) -> DistanceReport {
    let a = Coordinate::new(round_micro_degrees(reference.latitude), round_micro_degrees(reference.longitude));
    let b = Coordinate::new(round_micro_degrees(estimate.latitude), round_micro_degrees(estimate.longitude));

    if (a.latitude - b.latitude).abs() < SAME_LOCATION_EPS && (a.longitude - b.longitude).abs() < SAME_LOCATION_EPS {
        return DistanceReport { meters: 0.0, short_circuited: true };
    }

    DistanceReport {
        meters: haversine_distance(a, b),
        short_circuited: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((d - 111_195.0).abs() < 1.0, "d = {d}");
        let report = distance_between(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!(!report.short_circuited);
        assert_eq!(report.meters, d);
    }

    #[test]
    fn test_rounding_short_circuit() {
        let report = distance_between(
            Coordinate::new(48.856_614_1, 2.352_221_9),
            Coordinate::new(48.856_613_9, 2.352_222_1),
        );
        assert_eq!(report, DistanceReport { meters: 0.0, short_circuited: true });

        let same = Coordinate::new(-33.868_82, 151.209_29);
        assert_eq!(distance_between(same, same).meters, 0.0);
    }

    #[test]
    fn test_small_offsets_still_measured() {
        let report = distance_between(Coordinate::new(10.0, 20.0), Coordinate::new(10.000_005, 20.0));
        assert!(!report.short_circuited);
        assert!((report.meters - 0.556).abs() < 0.01, "meters = {}", report.meters);
    }

    #[test]
    fn test_round_micro_degrees() {
        assert_eq!(round_micro_degrees(1.234_567_4), 1.234_567);
        assert_eq!(round_micro_degrees(-1.234_567_6), -1.234_568);
    }

    #[test]
    fn test_out_of_range_input_is_not_rejected() {
        let d = haversine_distance(Coordinate::new(95.0, 0.0), Coordinate::new(0.0, 200.0));
        assert!(d.is_finite());
    }

    #[test]
    fn test_antipodes() {
        let d = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_symmetric_and_non_negative(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let a = Coordinate::new(lat1, lon1);
            let b = Coordinate::new(lat2, lon2);
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-6);
            prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_M + 1e-6);
        }
    }
}
