// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::f32::consts::FRAC_PI_2;

use crate::constant::{DEFAULT_ANGLE_TOLERANCE, DEFAULT_IOU_THRESHOLD};
use crate::error::PinceError;
use crate::gr::detect::{ExtractConfig, extract_grasps_with};
use crate::gr::{Candidates, GroundTruth, HeatMaps};

/// Settings deciding when a candidate matches a ground truth rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    iou_threshold: f32,
    angle_tolerance: f32,
    max_candidates: Option<usize>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
            max_candidates: None,
        }
    }
}

impl MatchConfig {
    /// Initialize a validated match configuration
    ///
    /// # Arguments
    ///
    /// * `iou_threshold` - Minimum IoU in (0, 1]
    /// * `angle_tolerance` - Maximum orientation difference in [0, pi/2] radians
    /// * `max_candidates` - Number of ranked candidates to test (`None` tests all)
    ///
    /// # Examples
    ///
    /// ```
    /// use pince_core::gr::MatchConfig;
    ///
    /// assert!(MatchConfig::new(0.25, 0.5, Some(1)).is_ok());
    /// assert!(MatchConfig::new(0.0, 0.5, None).is_err());
    /// assert!(MatchConfig::new(0.25, 0.5, Some(0)).is_err());
    /// ```
    pub fn new(
        iou_threshold: f32,
        angle_tolerance: f32,
        max_candidates: Option<usize>,
    ) -> Result<Self, PinceError> {
        if !(iou_threshold > 0.0 && iou_threshold <= 1.0) {
            return Err(PinceError::InvalidInput(format!(
                "IoU threshold must lie in (0, 1], got {}",
                iou_threshold
            )));
        }

        if !(0.0..=FRAC_PI_2).contains(&angle_tolerance) {
            return Err(PinceError::InvalidInput(format!(
                "Angle tolerance must lie in [0, pi/2] radians, got {}",
                angle_tolerance
            )));
        }

        if max_candidates == Some(0) {
            return Err(PinceError::InvalidInput(
                "Number of candidates to test must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            iou_threshold,
            angle_tolerance,
            max_candidates,
        })
    }

    pub fn iou_threshold(&self) -> f32 {
        self.iou_threshold
    }

    pub fn angle_tolerance(&self) -> f32 {
        self.angle_tolerance
    }

    pub fn max_candidates(&self) -> Option<usize> {
        self.max_candidates
    }
}

/// Check whether any tested candidate matches any ground truth rectangle
///
/// Candidates are tested in ranked order, up to `max_candidates` of them. A
/// pair matches when their rotated IoU reaches the threshold and their
/// orientations differ by no more than the angle tolerance. Empty candidates
/// or empty ground truth never match.
///
/// # Examples
///
/// ```
/// use pince_core::gr::{GraspRectangle, GroundTruth, HeatMaps, MatchConfig};
/// use pince_core::gr::{extract_grasps, is_match};
///
/// let mut quality = vec![0.0; 100];
/// quality[5 * 10 + 5] = 0.9;
///
/// let maps = HeatMaps::new(10, 10, quality, vec![0.0; 100], vec![20.0; 100]).unwrap();
/// let candidates = extract_grasps(&maps, 1).unwrap();
///
/// let aligned = GraspRectangle::new([5., 5.], 0.0, 40., 20.).unwrap();
/// let rotated = GraspRectangle::new([5., 5.], 1.6, 40., 20.).unwrap();
///
/// let config = MatchConfig::default();
/// assert!(is_match(&candidates, &GroundTruth::new(vec![aligned]), &config));
/// assert!(!is_match(&candidates, &GroundTruth::new(vec![rotated]), &config));
/// ```
pub fn is_match(candidates: &Candidates, ground_truth: &GroundTruth, config: &MatchConfig) -> bool {
    if ground_truth.is_empty() {
        return false;
    }

    let n = config.max_candidates.unwrap_or(candidates.len());

    candidates.iter().take(n).any(|candidate| {
        ground_truth
            .iter()
            .any(|truth| candidate.matches(truth, config.iou_threshold, config.angle_tolerance))
    })
}

/// Extract candidates from heat maps and test them against ground truth
///
/// # Arguments
///
/// * `maps` - Quality, angle, and width maps for one image
/// * `ground_truth` - Annotated rectangles in the same frame as the maps
/// * `no_grasps` - Number of candidates to extract
/// * `extract` - Peak search settings
/// * `config` - Match settings
pub fn calculate_iou_match(
    maps: &HeatMaps,
    ground_truth: &GroundTruth,
    no_grasps: usize,
    extract: &ExtractConfig,
    config: &MatchConfig,
) -> Result<bool, PinceError> {
    let candidates = extract_grasps_with(maps, no_grasps, extract)?;
    Ok(is_match(&candidates, ground_truth, config))
}

/// Running count of correct and failed images in an evaluation
///
/// # Examples
///
/// ```
/// use pince_core::gr::IouTally;
///
/// let mut tally = IouTally::default();
/// tally.record(true);
/// tally.record(false);
/// tally.record(true);
///
/// assert_eq!(tally.total(), 3);
/// assert!((tally.accuracy() - 2.0 / 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IouTally {
    pub correct: usize,
    pub failed: usize,
}

impl IouTally {
    pub fn record(&mut self, matched: bool) {
        if matched {
            self.correct += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Combine two partial tallies
    pub fn merge(self, other: IouTally) -> IouTally {
        IouTally {
            correct: self.correct + other.correct,
            failed: self.failed + other.failed,
        }
    }

    pub fn total(&self) -> usize {
        self.correct + self.failed
    }

    /// Fraction of correct images, or 0.0 if nothing was recorded
    pub fn accuracy(&self) -> f32 {
        if self.total() == 0 {
            return 0.0;
        }

        self.correct as f32 / self.total() as f32
    }
}

/// Summary of how one image fared during an evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct IouRecord {
    pub image: String,
    pub correct: bool,
    /// Best IoU between a tested candidate and an angle-compatible ground truth
    pub iou: f32,
    pub candidates: usize,
    /// Quality of the best candidate, or 0.0 if none were extracted
    pub quality: f32,
}

impl IouRecord {
    /// Score candidates for one image against its ground truth
    ///
    /// # Examples
    ///
    /// ```
    /// use pince_core::gr::{Candidates, GraspRectangle, GroundTruth, IouRecord, MatchConfig};
    ///
    /// let candidate = GraspRectangle::new([50., 50.], 0., 40., 20.).unwrap().with_quality(Some(0.8));
    /// let truth = GraspRectangle::new([50., 50.], 0., 40., 20.).unwrap();
    ///
    /// let record = IouRecord::new(
    ///     "pcd0100",
    ///     &Candidates::new(vec![candidate]).unwrap(),
    ///     &GroundTruth::new(vec![truth]),
    ///     &MatchConfig::default(),
    /// );
    ///
    /// assert!(record.correct);
    /// assert_eq!(record.iou, 1.0);
    /// assert_eq!(record.quality, 0.8);
    /// ```
    pub fn new(
        image: &str,
        candidates: &Candidates,
        ground_truth: &GroundTruth,
        config: &MatchConfig,
    ) -> Self {
        let n = config.max_candidates.unwrap_or(candidates.len());

        let iou = candidates
            .iter()
            .take(n)
            .map(|c| c.max_iou(ground_truth.as_rectangles(), config.angle_tolerance))
            .fold(0.0, f32::max);

        Self {
            image: image.to_string(),
            correct: is_match(candidates, ground_truth, config),
            iou,
            candidates: candidates.len(),
            quality: candidates.best().and_then(|g| g.quality()).unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gr::{GraspRectangle, extract_grasps};

    fn single_peak_maps() -> HeatMaps {
        let mut quality = vec![0.0; 100];
        quality[5 * 10 + 5] = 0.9;
        HeatMaps::new(10, 10, quality, vec![0.0; 100], vec![20.0; 100]).unwrap()
    }

    fn candidate(x: f32, y: f32, angle: f32, quality: f32) -> GraspRectangle {
        GraspRectangle::new([x, y], angle, 40., 20.)
            .unwrap()
            .with_quality(Some(quality))
    }

    fn truth(x: f32, y: f32, angle: f32) -> GraspRectangle {
        GraspRectangle::new([x, y], angle, 40., 20.).unwrap()
    }

    #[test]
    fn test_all_zero_never_matches() {
        let maps = HeatMaps::new(10, 10, vec![0.0; 100], vec![0.0; 100], vec![20.0; 100]).unwrap();
        let candidates = extract_grasps(&maps, 1).unwrap();
        assert!(candidates.is_empty());

        let ground_truth = GroundTruth::new(vec![truth(5., 5., 0.)]);
        assert!(!is_match(&candidates, &ground_truth, &MatchConfig::default()));
        assert!(!is_match(&candidates, &GroundTruth::default(), &MatchConfig::default()));
    }

    #[test]
    fn test_single_peak_matches() {
        let candidates = extract_grasps(&single_peak_maps(), 1).unwrap();
        let ground_truth = GroundTruth::new(vec![truth(5., 5., 0.)]);
        assert!(is_match(&candidates, &ground_truth, &MatchConfig::default()));
    }

    #[test]
    fn test_angle_beyond_tolerance() {
        let candidates = extract_grasps(&single_peak_maps(), 1).unwrap();
        let ground_truth = GroundTruth::new(vec![truth(5., 5., 1.6)]);

        // Spatial overlap alone would pass
        let spatial = candidates.as_rectangles()[0].iou(&ground_truth.as_rectangles()[0]);
        assert!(spatial >= 0.25);

        assert!(!is_match(&candidates, &ground_truth, &MatchConfig::default()));
    }

    #[test]
    fn test_empty_ground_truth() {
        let candidates = extract_grasps(&single_peak_maps(), 1).unwrap();
        assert!(!is_match(&candidates, &GroundTruth::default(), &MatchConfig::default()));
    }

    #[test]
    fn test_ground_truth_order_irrelevant() {
        let candidates = Candidates::new(vec![candidate(50., 50., 0.2, 0.8)]).unwrap();
        let far = truth(200., 200., 0.2);
        let near = truth(52., 50., 0.1);

        let config = MatchConfig::default();
        assert!(is_match(&candidates, &GroundTruth::new(vec![far, near]), &config));
        assert!(is_match(&candidates, &GroundTruth::new(vec![near, far]), &config));
    }

    #[test]
    fn test_max_candidates() {
        let candidates = Candidates::new(vec![
            candidate(200., 200., 0., 0.9),
            candidate(50., 50., 0., 0.5),
        ])
        .unwrap();

        let ground_truth = GroundTruth::new(vec![truth(50., 50., 0.)]);

        let all = MatchConfig::default();
        let top = MatchConfig::new(0.25, DEFAULT_ANGLE_TOLERANCE, Some(1)).unwrap();
        let many = MatchConfig::new(0.25, DEFAULT_ANGLE_TOLERANCE, Some(10)).unwrap();

        assert!(is_match(&candidates, &ground_truth, &all));
        assert!(!is_match(&candidates, &ground_truth, &top));
        assert!(is_match(&candidates, &ground_truth, &many));
    }

    #[test]
    fn test_threshold() {
        // Shifted by half the length: IoU = 400 / 1200
        let candidates = Candidates::new(vec![candidate(70., 50., 0., 0.9)]).unwrap();
        let ground_truth = GroundTruth::new(vec![truth(50., 50., 0.)]);

        let loose = MatchConfig::new(0.3, DEFAULT_ANGLE_TOLERANCE, None).unwrap();
        let strict = MatchConfig::new(0.4, DEFAULT_ANGLE_TOLERANCE, None).unwrap();

        assert!(is_match(&candidates, &ground_truth, &loose));
        assert!(!is_match(&candidates, &ground_truth, &strict));
    }

    #[test]
    fn test_zero_area_candidate() {
        let mut quality = vec![0.0; 100];
        quality[5 * 10 + 5] = 0.9;
        let maps = HeatMaps::new(10, 10, quality, vec![0.0; 100], vec![0.0; 100]).unwrap();

        let ground_truth = GroundTruth::new(vec![truth(5., 5., 0.)]);
        let matched = calculate_iou_match(
            &maps,
            &ground_truth,
            1,
            &ExtractConfig::default(),
            &MatchConfig::default(),
        )
        .unwrap();

        assert!(!matched);
    }

    #[test]
    fn test_record_agrees_with_match() {
        let candidates = Candidates::new(vec![
            candidate(200., 200., 0., 0.9),
            candidate(70., 50., 0., 0.5),
        ])
        .unwrap();
        let ground_truth = GroundTruth::new(vec![truth(50., 50., 0.)]);

        let record = IouRecord::new("a", &candidates, &ground_truth, &MatchConfig::default());
        assert!(record.correct);
        assert!((record.iou - 1.0 / 3.0).abs() < 1e-4);
        assert_eq!(record.candidates, 2);
        assert_eq!(record.quality, 0.9);

        let top = MatchConfig::new(0.25, DEFAULT_ANGLE_TOLERANCE, Some(1)).unwrap();
        let record = IouRecord::new("a", &candidates, &ground_truth, &top);
        assert!(!record.correct);
        assert_eq!(record.iou, 0.0);
    }

    #[test]
    fn test_record_without_candidates() {
        let ground_truth = GroundTruth::new(vec![truth(50., 50., 0.)]);
        let record = IouRecord::new(
            "b",
            &Candidates::default(),
            &ground_truth,
            &MatchConfig::default(),
        );

        assert!(!record.correct);
        assert_eq!(record.quality, 0.0);
        assert_eq!(record.candidates, 0);
    }

    #[test]
    fn test_tally_merge() {
        let a = IouTally {
            correct: 3,
            failed: 1,
        };
        let b = IouTally {
            correct: 1,
            failed: 5,
        };

        assert_eq!(a.merge(b), IouTally { correct: 4, failed: 6 });
        assert_eq!(IouTally::default().accuracy(), 0.0);
    }
}
