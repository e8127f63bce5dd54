// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::path::Path;

use crate::constant::{ANGLE_SIGMA, QUALITY_SIGMA, WIDTH_SIGMA};
use crate::cv::filter::gaussian_blur;
use crate::error::PinceError;
use crate::io::read_prediction_npz;

/// Pixel-wise grasp predictions for one image
///
/// Three row-major maps of identical shape: grasp quality in [0, 1], grasp
/// angle in radians, and gripper opening width in pixels.
///
/// # Examples
///
/// ```
/// use pince_core::gr::HeatMaps;
///
/// let maps = HeatMaps::new(2, 3, vec![0.0; 6], vec![0.0; 6], vec![10.0; 6]);
/// assert!(maps.is_ok());
///
/// let maps = HeatMaps::new(2, 3, vec![0.0; 6], vec![0.0; 5], vec![10.0; 6]);
/// assert!(maps.is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMaps {
    height: usize,
    width: usize,
    quality: Vec<f32>,
    angle: Vec<f32>,
    width_map: Vec<f32>,
}

impl HeatMaps {
    /// Initialize heat maps from post-processed network outputs
    ///
    /// # Arguments
    ///
    /// * `height` - Number of rows
    /// * `width` - Number of columns
    /// * `quality` - Grasp quality map
    /// * `angle` - Grasp angle map in radians
    /// * `width_map` - Gripper width map in pixels
    pub fn new(
        height: usize,
        width: usize,
        quality: Vec<f32>,
        angle: Vec<f32>,
        width_map: Vec<f32>,
    ) -> Result<Self, PinceError> {
        let n = height * width;

        if n == 0 || quality.len() != n || angle.len() != n || width_map.len() != n {
            return Err(PinceError::ShapeError);
        }

        Ok(Self {
            height,
            width,
            quality,
            angle,
            width_map,
        })
    }

    /// Initialize heat maps from raw network outputs
    ///
    /// The network predicts grasp quality, the cosine and sine of twice the
    /// grasp angle, and a normalized width. Quality and angle are smoothed
    /// with a gaussian of sigma 2, width is rescaled to pixels and smoothed
    /// with a gaussian of sigma 1.
    ///
    /// # Arguments
    ///
    /// * `height` - Number of rows
    /// * `width` - Number of columns
    /// * `pos` - Raw quality output
    /// * `cos` - Raw cos(2 * angle) output
    /// * `sin` - Raw sin(2 * angle) output
    /// * `raw_width` - Raw width output in [0, 1]
    /// * `width_scale` - Pixels corresponding to a raw width of 1
    ///
    /// # Examples
    ///
    /// ```
    /// use pince_core::gr::HeatMaps;
    ///
    /// let maps = HeatMaps::from_raw(
    ///     4, 4, vec![0.5; 16], vec![0.0; 16], vec![1.0; 16], vec![0.1; 16], 150.0
    /// ).unwrap();
    ///
    /// let (q, angle, width) = maps.at(1, 1);
    /// assert!((q - 0.5).abs() < 1e-5);
    /// assert!((angle - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
    /// assert!((width - 15.0).abs() < 1e-3);
    /// ```
    pub fn from_raw(
        height: usize,
        width: usize,
        pos: Vec<f32>,
        cos: Vec<f32>,
        sin: Vec<f32>,
        raw_width: Vec<f32>,
        width_scale: f32,
    ) -> Result<Self, PinceError> {
        let n = height * width;

        if n == 0 || pos.len() != n || cos.len() != n || sin.len() != n || raw_width.len() != n
        {
            return Err(PinceError::ShapeError);
        }

        let angle: Vec<f32> = sin
            .iter()
            .zip(cos.iter())
            .map(|(s, c)| s.atan2(*c) / 2.0)
            .collect();

        let raw_width: Vec<f32> = raw_width.iter().map(|w| w * width_scale).collect();

        Self::new(
            height,
            width,
            gaussian_blur(&pos, width, height, QUALITY_SIGMA),
            gaussian_blur(&angle, width, height, ANGLE_SIGMA),
            gaussian_blur(&raw_width, width, height, WIDTH_SIGMA),
        )
    }

    /// Open heat maps from a .npz file
    ///
    /// See [`crate::io::read_prediction_npz`] for the accepted array names.
    pub fn open<P: AsRef<Path>>(path: P, width_scale: f32) -> Result<HeatMaps, PinceError> {
        read_prediction_npz(path, width_scale).map(|prediction| prediction.maps)
    }
}

impl HeatMaps {
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn quality(&self) -> &[f32] {
        &self.quality
    }

    pub fn angle(&self) -> &[f32] {
        &self.angle
    }

    pub fn width_map(&self) -> &[f32] {
        &self.width_map
    }

    /// Quality, angle, and width at a pixel
    ///
    /// # Panics
    ///
    /// Panics if `row >= height` or `col >= width`.
    pub fn at(&self, row: usize, col: usize) -> (f32, f32, f32) {
        assert!(
            row < self.height && col < self.width,
            "pixel ({}, {}) is outside {}x{} heat maps",
            row,
            col,
            self.height,
            self.width
        );

        let idx = row * self.width + col;
        (self.quality[idx], self.angle[idx], self.width_map[idx])
    }
}

/// Heat maps together with the transform that was applied to the network input
///
/// Ground truth annotations must be rotated and zoomed the same way before
/// they can be compared with the maps.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub maps: HeatMaps,
    pub rotation: f32,
    pub zoom: f32,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shape_mismatch() {
        assert!(HeatMaps::new(0, 0, vec![], vec![], vec![]).is_err());
        assert!(HeatMaps::new(2, 2, vec![0.; 4], vec![0.; 4], vec![0.; 3]).is_err());
        assert_eq!(
            HeatMaps::new(2, 2, vec![0.; 5], vec![0.; 4], vec![0.; 4]),
            Err(PinceError::ShapeError)
        );
    }

    #[test]
    fn test_at_is_row_major() {
        let quality: Vec<f32> = (0..6).map(|i| i as f32).collect();
        let maps = HeatMaps::new(2, 3, quality, vec![0.; 6], vec![0.; 6]).unwrap();
        assert_eq!(maps.at(1, 2).0, 5.0);
        assert_eq!(maps.at(0, 1).0, 1.0);
    }

    #[test]
    #[should_panic]
    fn test_at_column_out_of_bounds() {
        let maps = HeatMaps::new(2, 3, vec![0.; 6], vec![0.; 6], vec![0.; 6]).unwrap();
        maps.at(0, 3);
    }

    #[test]
    fn test_from_raw_angle_halves() {
        // cos(2a) = 0, sin(2a) = -1 gives a = -pi/4
        let maps = HeatMaps::from_raw(
            3,
            3,
            vec![0.0; 9],
            vec![0.0; 9],
            vec![-1.0; 9],
            vec![0.0; 9],
            150.0,
        )
        .unwrap();

        assert!(maps
            .angle()
            .iter()
            .all(|a| (a + std::f32::consts::FRAC_PI_4).abs() < 1e-5));
    }

    #[test]
    fn test_from_raw_shape_mismatch() {
        let maps = HeatMaps::from_raw(
            3,
            3,
            vec![0.0; 9],
            vec![0.0; 8],
            vec![0.0; 9],
            vec![0.0; 9],
            150.0,
        );
        assert!(maps.is_err());
    }
}
