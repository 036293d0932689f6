use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use geoloc_core::{Coordinate, DescriptorSet, Image};
use geoloc_estimate::{aggregate, distance_between, Aggregation, Candidate, DistanceReport, LocationEstimate};
use geoloc_match::{classify, match_score, MatchClass, RatioTest};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::{Extractor, GeolocError, GeolocResult, PipelineConfig};

/// An image together with where it was taken, if known
#[derive(Debug, Clone)]
pub struct LabeledImage {
    pub label: String,
    pub image: Image,
    pub coordinate: Option<Coordinate>,
}

impl LabeledImage {
    pub fn new(label: impl Into<String>, image: Image, coordinate: Option<Coordinate>) -> Self {
        Self {
            label: label.into(),
            image,
            coordinate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PairOutcome {
    Scored { score: usize, class: MatchClass },
    /// Extraction failed for this training image only
    Failed(String),
    Cancelled,
}

impl PairOutcome {
    pub fn score(&self) -> Option<usize> {
        match self {
            PairOutcome::Scored { score, .. } => Some(*score),
            _ => None,
        }
    }

    pub fn is_matching(&self) -> bool {
        matches!(self, PairOutcome::Scored { class: MatchClass::Matching, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairReport {
    /// Position in the training list
    pub index: usize,
    pub label: String,
    pub coordinate: Option<Coordinate>,
    /// Keypoints found in the training image
    pub keypoints: usize,
    pub outcome: PairOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    /// One entry per training image, in training order
    pub pairs: Vec<PairReport>,
    pub test_keypoints: usize,
    pub threshold: usize,
    pub elapsed: Duration,
}

impl ScoreReport {
    pub fn scores(&self) -> Vec<Option<usize>> {
        self.pairs.iter().map(|p| p.outcome.score()).collect()
    }

    /// Scored pairs in the form the aggregator takes
    pub fn candidates(&self) -> Vec<Candidate> {
        self.pairs
            .iter()
            .filter_map(|p| match p.outcome {
                PairOutcome::Scored { score, class } => Some(Candidate {
                    index: p.index,
                    score,
                    class,
                    coordinate: p.coordinate,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn matching(&self) -> impl Iterator<Item = &PairReport> {
        self.pairs.iter().filter(|p| p.outcome.is_matching())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateReport {
    pub scores: ScoreReport,
    pub aggregation: Aggregation,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceOutcome {
    pub reference: Coordinate,
    pub estimate: Coordinate,
    pub report: DistanceReport,
    pub elapsed: Duration,
}

/// Every step in order. `distance` is absent when there is no estimate or
/// the test image has no coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub estimate: EstimateReport,
    pub distance: Option<DistanceOutcome>,
}

/// Holds the selected images and the last estimate between operations
pub struct Session {
    config: PipelineConfig,
    extractor: Extractor,
    test: Option<LabeledImage>,
    training: Vec<LabeledImage>,
    last_estimate: Option<EstimateReport>,
}

impl Session {
    pub fn new(config: PipelineConfig) -> GeolocResult<Self> {
        config.validate()?;
        let extractor = Extractor::new(config.detector.clone())?;
        Ok(Self {
            config,
            extractor,
            test: None,
            training: Vec::new(),
            last_estimate: None,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn test_image(&self) -> Option<&LabeledImage> {
        self.test.as_ref()
    }

    pub fn training_images(&self) -> &[LabeledImage] {
        &self.training
    }

    pub fn last_estimate(&self) -> Option<&EstimateReport> {
        self.last_estimate.as_ref()
    }

    pub fn select_test_image(&mut self, image: LabeledImage) {
        debug!("test image {} selected ({:?})", image.label, image.coordinate);
        self.test = Some(image);
        self.last_estimate = None;
    }

    pub fn select_training_images(&mut self, images: Vec<LabeledImage>) {
        debug!("{} training images selected", images.len());
        self.training = images;
        self.last_estimate = None;
    }

    pub fn set_match_threshold(&mut self, threshold: usize) {
        self.config.matching.match_threshold = threshold;
        self.last_estimate = None;
    }

    /// Score the test image against every training image
    pub fn score_pairs(&self) -> GeolocResult<ScoreReport> {
        self.score_pairs_cancellable(&AtomicBool::new(false))
    }

    /// Like `score_pairs`, but pairs not yet started when `cancel` is set are
    /// reported as `PairOutcome::Cancelled`
    pub fn score_pairs_cancellable(&self, cancel: &AtomicBool) -> GeolocResult<ScoreReport> {
        let start = Instant::now();
        let test = self.test.as_ref().ok_or(GeolocError::MissingTestImage)?;
        if self.training.is_empty() {
            return Err(GeolocError::NoTrainingImages);
        }

        let query = self.extractor.extract(&test.image)?;
        let ratio = RatioTest::new(self.config.matching.ratio);
        let threshold = self.config.matching.match_threshold;

        let pairs: Vec<PairReport> = self
            .training
            .par_iter()
            .enumerate()
            .map(|(index, train)| {
                let (keypoints, outcome) = if cancel.load(Ordering::Relaxed) {
                    (0, PairOutcome::Cancelled)
                } else {
                    self.score_pair(&query, train, ratio, threshold)
                };
                debug!("pair {} ({}): {:?}", index + 1, train.label, outcome);
                PairReport {
                    index,
                    label: train.label.clone(),
                    coordinate: train.coordinate,
                    keypoints,
                    outcome,
                }
            })
            .collect();

        let elapsed = start.elapsed();
        info!(
            "scored {} pairs against {} test keypoints in {:?}",
            pairs.len(),
            query.len(),
            elapsed
        );

        Ok(ScoreReport {
            pairs,
            test_keypoints: query.len(),
            threshold,
            elapsed,
        })
    }

    fn score_pair(
        &self,
        query: &DescriptorSet,
        train: &LabeledImage,
        ratio: RatioTest,
        threshold: usize,
    ) -> (usize, PairOutcome) {
        match self.extractor.extract(&train.image) {
            Ok(set) => {
                let score = match_score(query, &set, ratio);
                (set.len(), PairOutcome::Scored { score, class: classify(score, threshold) })
            }
            Err(e) => {
                warn!("training image {} failed: {}", train.label, e);
                (0, PairOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Score, classify and average the matching training coordinates. The
    /// result is cached for `calculate_distance`.
    pub fn estimate_location(&mut self) -> GeolocResult<&EstimateReport> {
        let start = Instant::now();
        let scores = self.score_pairs()?;
        let aggregation = aggregate(&scores.candidates());
        match aggregation.estimate {
            LocationEstimate::Estimated(c) => {
                info!("estimated location {} from {} images", c, aggregation.count())
            }
            LocationEstimate::Undefined => info!("no image passed threshold {}", scores.threshold),
        }

        let report = EstimateReport {
            scores,
            aggregation,
            elapsed: start.elapsed(),
        };
        Ok(&*self.last_estimate.insert(report))
    }

    /// Estimate, then measure the distance when both coordinates are known
    pub fn run(&mut self) -> GeolocResult<RunReport> {
        let estimate = self.estimate_location()?.clone();
        let distance = match self.calculate_distance() {
            Ok(d) => Some(d),
            Err(e @ (GeolocError::EstimateUnavailable | GeolocError::MissingReference)) => {
                info!("distance skipped: {}", e);
                None
            }
            Err(e) => return Err(e),
        };
        Ok(RunReport { estimate, distance })
    }

    /// Distance from the test image's own coordinate to the cached estimate
    pub fn calculate_distance(&self) -> GeolocResult<DistanceOutcome> {
        let start = Instant::now();
        let test = self.test.as_ref().ok_or(GeolocError::MissingTestImage)?;
        let estimate = self
            .last_estimate
            .as_ref()
            .and_then(|r| r.aggregation.estimate.coordinate())
            .ok_or(GeolocError::EstimateUnavailable)?;
        let reference = test.coordinate.ok_or(GeolocError::MissingReference)?;

        let report = distance_between(reference, estimate);
        debug!("distance {} -> {}: {:?}", reference, estimate, report);
        Ok(DistanceOutcome {
            reference,
            estimate,
            report,
            elapsed: start.elapsed(),
        })
    }
}
