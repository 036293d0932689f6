//! Human-readable renderings of the session reports.

use std::fmt::Write;
use std::time::Duration;

use crate::session::{DistanceOutcome, EstimateReport, PairOutcome, RunReport, ScoreReport};

fn processing_time(elapsed: Duration) -> String {
    format!("Processing Time: {} ms", elapsed.as_millis())
}

pub fn format_scores(report: &ScoreReport) -> String {
    let mut out = String::new();
    for pair in &report.pairs {
        let _ = match &pair.outcome {
            PairOutcome::Scored { score, .. } => writeln!(out, "Score {}: {}", pair.index + 1, score),
            PairOutcome::Failed(reason) => writeln!(out, "Score {}: failed ({})", pair.index + 1, reason),
            PairOutcome::Cancelled => writeln!(out, "Score {}: cancelled", pair.index + 1),
        };
    }
    out.push_str(&processing_time(report.elapsed));
    out
}

pub fn format_threshold(report: &ScoreReport) -> String {
    let mut out = String::new();
    let matching: Vec<_> = report.matching().collect();
    if matching.is_empty() {
        let _ = writeln!(out, "No matches found above threshold ({}).", report.threshold);
    } else {
        let _ = writeln!(out, "Threshold: {}", report.threshold);
        for pair in matching {
            if let Some(score) = pair.outcome.score() {
                let _ = writeln!(out, "Image {}: Score {}", pair.index + 1, score);
            }
        }
    }
    out.push_str(&processing_time(report.elapsed));
    out
}

pub fn format_estimate(report: &EstimateReport) -> String {
    let mut out = String::new();
    match report.aggregation.estimate.coordinate() {
        Some(c) => {
            let _ = writeln!(out, "Estimated Location: {}", c);
            for contributor in &report.aggregation.contributors {
                let _ = writeln!(out, "Image {} used (Score: {})", contributor.index + 1, contributor.score);
            }
        }
        None => {
            let _ = writeln!(out, "No image passed the threshold. Unable to estimate location.");
        }
    }
    for skipped in &report.aggregation.unlocated {
        let _ = writeln!(
            out,
            "Image {} matched (Score: {}) but has no location",
            skipped.index + 1,
            skipped.score
        );
    }
    out.push_str(&processing_time(report.elapsed));
    out
}

pub fn format_distance(outcome: &DistanceOutcome) -> String {
    let line = if outcome.report.short_circuited {
        "Distance: 0.0 meters (Same Location Used)".to_string()
    } else {
        format!("Distance: {:.2} meters", outcome.report.meters)
    };
    format!("{}\n{}", line, processing_time(outcome.elapsed))
}

pub fn format_run(run: &RunReport) -> String {
    let mut out = format!(
        "{}\n\n{}\n\n{}",
        format_scores(&run.estimate.scores),
        format_threshold(&run.estimate.scores),
        format_estimate(&run.estimate)
    );
    if let Some(distance) = &run.distance {
        out.push_str("\n\n");
        out.push_str(&format_distance(distance));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PairReport;
    use geoloc_core::Coordinate;
    use geoloc_estimate::{Aggregation, Contributor, DistanceReport, LocationEstimate};
    use geoloc_match::MatchClass;

    fn pair(index: usize, outcome: PairOutcome) -> PairReport {
        PairReport {
            index,
            label: format!("img{index}.jpg"),
            coordinate: None,
            keypoints: 0,
            outcome,
        }
    }

    fn scores() -> ScoreReport {
        ScoreReport {
            pairs: vec![
                pair(0, PairOutcome::Scored { score: 14, class: MatchClass::Matching }),
                pair(1, PairOutcome::Scored { score: 3, class: MatchClass::NonMatching }),
                pair(2, PairOutcome::Failed("bad buffer".into())),
            ],
            test_keypoints: 200,
            threshold: 10,
            elapsed: Duration::from_millis(42),
        }
    }

    #[test]
    fn test_scores_lines() {
        let text = format_scores(&scores());
        assert!(text.contains("Score 1: 14\n"));
        assert!(text.contains("Score 2: 3\n"));
        assert!(text.contains("Score 3: failed (bad buffer)"));
        assert!(text.ends_with("Processing Time: 42 ms"));
    }

    #[test]
    fn test_threshold_lines() {
        let text = format_threshold(&scores());
        assert!(text.starts_with("Threshold: 10\nImage 1: Score 14\n"));
        assert!(!text.contains("Image 2"));

        let mut none = scores();
        none.threshold = 50;
        none.pairs.truncate(1);
        none.pairs[0].outcome = PairOutcome::Scored { score: 14, class: MatchClass::NonMatching };
        assert!(format_threshold(&none).starts_with("No matches found above threshold (50)."));
    }

    #[test]
    fn test_estimate_lines() {
        let report = EstimateReport {
            scores: scores(),
            aggregation: Aggregation {
                estimate: LocationEstimate::Estimated(Coordinate::new(2.0, 3.0)),
                contributors: vec![Contributor { index: 0, score: 14, coordinate: Some(Coordinate::new(2.0, 3.0)) }],
                unlocated: vec![],
            },
            elapsed: Duration::from_millis(7),
        };
        let text = format_estimate(&report);
        assert!(text.starts_with("Estimated Location: Lat 2, Lon 3\nImage 1 used (Score: 14)\n"));

        let undefined = EstimateReport {
            aggregation: Aggregation {
                estimate: LocationEstimate::Undefined,
                contributors: vec![],
                unlocated: vec![],
            },
            ..report
        };
        assert!(format_estimate(&undefined).starts_with("No image passed the threshold. Unable to estimate location."));
    }

    #[test]
    fn test_distance_lines() {
        let same = DistanceOutcome {
            reference: Coordinate::new(1.0, 1.0),
            estimate: Coordinate::new(1.0, 1.0),
            report: DistanceReport { meters: 0.0, short_circuited: true },
            elapsed: Duration::from_millis(0),
        };
        assert!(format_distance(&same).starts_with("Distance: 0.0 meters (Same Location Used)"));

        let far = DistanceOutcome {
            report: DistanceReport { meters: 111_195.08, short_circuited: false },
            ..same
        };
        assert!(format_distance(&far).starts_with("Distance: 111195.08 meters"));
    }

    #[test]
    fn test_run_sections() {
        let estimate = EstimateReport {
            scores: scores(),
            aggregation: Aggregation {
                estimate: LocationEstimate::Estimated(Coordinate::new(2.0, 3.0)),
                contributors: vec![Contributor { index: 0, score: 14, coordinate: Some(Coordinate::new(2.0, 3.0)) }],
                unlocated: vec![],
            },
            elapsed: Duration::from_millis(7),
        };
        let distance = DistanceOutcome {
            reference: Coordinate::new(2.0, 3.0),
            estimate: Coordinate::new(2.0, 3.0),
            report: DistanceReport { meters: 0.0, short_circuited: true },
            elapsed: Duration::from_millis(0),
        };

        let without = format_run(&RunReport { estimate: estimate.clone(), distance: None });
        assert!(without.starts_with("Score 1: 14\n"));
        assert!(without.contains("\n\nThreshold: 10\n"));
        assert!(without.contains("\n\nEstimated Location: Lat 2, Lon 3\n"));
        assert!(!without.contains("Distance:"));

        let with = format_run(&RunReport { estimate, distance: Some(distance) });
        assert!(with.contains("\n\nDistance: 0.0 meters (Same Location Used)\n"));
    }
}
