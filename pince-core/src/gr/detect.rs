// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use crate::constant::LENGTH_WIDTH_RATIO;
use crate::cv::filter::gaussian_blur;
use crate::cv::peaks::local_maxima;
use crate::error::PinceError;
use crate::gr::{Candidates, GraspRectangle, HeatMaps};

/// Settings for converting heat maps into grasp candidates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractConfig {
    /// Peaks must have a quality strictly above this value
    pub min_quality: f32,
    /// Peaks must dominate every pixel within this Chebyshev radius
    pub min_distance: usize,
    /// Optional gaussian sigma applied to the quality map before peak search
    pub smoothing: Option<f32>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_quality: 0.0,
            min_distance: 1,
            smoothing: None,
        }
    }
}

/// Extract up to `no_grasps` ranked grasp candidates with default settings
///
/// # Examples
///
/// ```
/// use pince_core::gr::{HeatMaps, extract_grasps};
///
/// let mut quality = vec![0.0; 100];
/// quality[5 * 10 + 5] = 0.9;
///
/// let maps = HeatMaps::new(10, 10, quality, vec![0.0; 100], vec![20.0; 100]).unwrap();
/// let candidates = extract_grasps(&maps, 3).unwrap();
///
/// assert_eq!(candidates.len(), 1);
/// assert_eq!(candidates.as_rectangles()[0].center(), [5.0, 5.0]);
/// assert_eq!(candidates.as_rectangles()[0].length(), 40.0);
/// ```
pub fn extract_grasps(maps: &HeatMaps, no_grasps: usize) -> Result<Candidates, PinceError> {
    extract_grasps_with(maps, no_grasps, &ExtractConfig::default())
}

/// Extract up to `no_grasps` ranked grasp candidates
///
/// Local maxima of the (optionally smoothed) quality map are ranked by
/// descending quality. Each selected pixel becomes a rectangle centered on
/// the pixel with the angle and width predicted there and a length of
/// `LENGTH_WIDTH_RATIO` times the width.
///
/// # Arguments
///
/// * `maps` - Quality, angle, and width maps
/// * `no_grasps` - Maximum number of candidates to return (> 0)
/// * `config` - Peak search settings
pub fn extract_grasps_with(
    maps: &HeatMaps,
    no_grasps: usize,
    config: &ExtractConfig,
) -> Result<Candidates, PinceError> {
    if no_grasps == 0 {
        return Err(PinceError::InvalidInput(
            "Number of grasps must be a positive integer".to_string(),
        ));
    }

    let (width, height) = (maps.width(), maps.height());

    let smoothed;
    let quality = match config.smoothing {
        Some(sigma) if sigma > 0.0 => {
            smoothed = gaussian_blur(maps.quality(), width, height, sigma);
            &smoothed
        }
        _ => maps.quality(),
    };

    let grasps = local_maxima(
        quality,
        width,
        height,
        config.min_distance,
        config.min_quality,
    )
    .into_iter()
    .take(no_grasps)
    .map(|(row, col, q)| {
        let (_, angle, grasp_width) = maps.at(row, col);
        GraspRectangle::from_prediction(
            [col as f32, row as f32],
            angle,
            grasp_width * LENGTH_WIDTH_RATIO,
            grasp_width,
            q,
        )
    })
    .collect();

    Ok(Candidates::from_ranked(grasps))
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    fn maps_with_peaks(peaks: &[(usize, usize, f32)]) -> HeatMaps {
        let mut quality = vec![0.0; 20 * 20];
        for &(row, col, q) in peaks {
            quality[row * 20 + col] = q;
        }

        let angle: Vec<f32> = (0..400).map(|i| (i % 7) as f32 * 0.5).collect();
        let width: Vec<f32> = (0..400).map(|i| 5.0 + (i % 11) as f32).collect();

        HeatMaps::new(20, 20, quality, angle, width).unwrap()
    }

    #[test]
    fn test_zero_grasps_is_invalid() {
        let maps = maps_with_peaks(&[(3, 3, 0.5)]);
        assert!(extract_grasps(&maps, 0).is_err());
    }

    #[test]
    fn test_all_zero_is_empty() {
        let maps = HeatMaps::new(10, 10, vec![0.0; 100], vec![0.0; 100], vec![0.0; 100]).unwrap();
        assert!(extract_grasps(&maps, 1).unwrap().is_empty());
    }

    #[test]
    fn test_count_is_min_of_request_and_peaks() {
        let peaks = [(2, 2, 0.3), (8, 15, 0.9), (17, 4, 0.6), (12, 12, 0.1)];
        let maps = maps_with_peaks(&peaks);

        for no_grasps in 1..8 {
            let candidates = extract_grasps(&maps, no_grasps).unwrap();
            assert_eq!(candidates.len(), no_grasps.min(peaks.len()));
        }
    }

    #[test]
    fn test_sorted_and_unique() {
        let peaks = [(2, 2, 0.3), (8, 15, 0.9), (17, 4, 0.6), (12, 12, 0.1)];
        let maps = maps_with_peaks(&peaks);
        let candidates = extract_grasps(&maps, 10).unwrap();

        let qualities: Vec<f32> = candidates.iter().map(|g| g.quality().unwrap()).collect();
        assert_eq!(qualities, vec![0.9, 0.6, 0.3, 0.1]);

        let centers: Vec<[i32; 2]> = candidates
            .iter()
            .map(|g| [g.center()[0] as i32, g.center()[1] as i32])
            .collect();
        let unique: HashSet<[i32; 2]> = centers.iter().copied().collect();

        assert_eq!(unique.len(), centers.len());
        assert_eq!(centers.len(), 4);
        assert_eq!(centers[0], [15, 8]);
    }

    #[test]
    fn test_reads_angle_and_width_at_peak() {
        let maps = maps_with_peaks(&[(8, 15, 0.9)]);
        let grasp = extract_grasps(&maps, 1).unwrap().as_rectangles()[0];

        let (_, angle, width) = maps.at(8, 15);
        assert_eq!(grasp.width(), width);
        assert_eq!(grasp.length(), 2.0 * width);
        assert_eq!(grasp.angle(), crate::gr::normalize_angle(angle));
    }

    #[test]
    fn test_min_quality() {
        let maps = maps_with_peaks(&[(2, 2, 0.3), (8, 15, 0.9)]);
        let config = ExtractConfig {
            min_quality: 0.5,
            ..Default::default()
        };

        let candidates = extract_grasps_with(&maps, 5, &config).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_smoothing_keeps_isolated_peak() {
        let maps = maps_with_peaks(&[(10, 10, 1.0)]);
        let config = ExtractConfig {
            smoothing: Some(1.0),
            ..Default::default()
        };

        let candidates = extract_grasps_with(&maps, 5, &config).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates.as_rectangles()[0].center(), [10.0, 10.0]);
        assert!(candidates.as_rectangles()[0].quality().unwrap() < 1.0);
    }
}
