// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::f32::consts::{FRAC_PI_2, PI};

use serde::Serialize;

use crate::cv::polygon;
use crate::error::PinceError;

/// Wrap an angle into the half-open range [-pi/2, pi/2)
///
/// Grasps have no direction so angles are only defined modulo pi.
///
/// # Examples
///
/// ```
/// use std::f32::consts::PI;
/// use pince_core::gr::normalize_angle;
///
/// assert_eq!(normalize_angle(0.0), 0.0);
/// assert!((normalize_angle(PI) - 0.0).abs() < 1e-6);
/// assert!((normalize_angle(0.75 * PI) + 0.25 * PI).abs() < 1e-6);
/// assert_eq!(normalize_angle(PI / 2.0), -PI / 2.0);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    if (-FRAC_PI_2..FRAC_PI_2).contains(&angle) {
        return angle;
    }

    let wrapped = (angle + FRAC_PI_2).rem_euclid(PI);
    let wrapped = if wrapped >= PI { 0.0 } else { wrapped };
    wrapped - FRAC_PI_2
}

/// Absolute orientation difference between two grasp angles in [0, pi/2]
///
/// # Examples
///
/// ```
/// use pince_core::gr::angle_difference;
///
/// let a = 1_f32.to_radians();
/// let b = 179_f32.to_radians();
///
/// assert!((angle_difference(a, b) - 2_f32.to_radians()).abs() < 1e-5);
/// ```
#[inline]
pub fn angle_difference(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

/// An oriented grasp rectangle
///
/// The center is stored as `[x, y]` in image coordinates (x is the column,
/// y is the row, y grows downward). The angle is measured counter-clockwise
/// on screen and is always kept in [-pi/2, pi/2). The length runs along the
/// gripper closing direction and the width along the jaw.
///
/// Candidates carry the quality score at which they were detected while
/// ground truth rectangles carry none.
///
/// # Examples
///
/// ```
/// use pince_core::gr::GraspRectangle;
///
/// let grasp = GraspRectangle::new([10., 20.], 0.5, 40., 20.);
/// assert!(grasp.is_ok());
///
/// let grasp = GraspRectangle::new([10., 20.], 0.5, 0., 20.);
/// assert!(grasp.is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraspRectangle {
    center: [f32; 2],
    angle: f32,
    length: f32,
    width: f32,
    quality: Option<f32>,
}

impl GraspRectangle {
    /// Initialize a new validated grasp rectangle
    ///
    /// # Arguments
    ///
    /// * `center` - Center point in `[x, y]` format
    /// * `angle` - Orientation in radians (normalized modulo pi)
    /// * `length` - Extent along the closing direction (> 0)
    /// * `width` - Extent along the jaw (> 0)
    pub fn new(center: [f32; 2], angle: f32, length: f32, width: f32) -> Result<Self, PinceError> {
        let valid = center.iter().all(|c| c.is_finite())
            && angle.is_finite()
            && length.is_finite()
            && width.is_finite()
            && length > 0.0
            && width > 0.0;

        if !valid {
            return Err(PinceError::RectangleError);
        }

        Ok(Self {
            center,
            angle: normalize_angle(angle),
            length,
            width,
            quality: None,
        })
    }

    /// Build a rectangle directly from network predictions
    ///
    /// Predicted dimensions are not validated: a zero width at a peak yields a
    /// zero-area rectangle that can never match any ground truth.
    pub(crate) fn from_prediction(
        center: [f32; 2],
        angle: f32,
        length: f32,
        width: f32,
        quality: f32,
    ) -> Self {
        Self {
            center,
            angle: normalize_angle(angle),
            length,
            width,
            quality: Some(quality),
        }
    }

    /// Initialize a validated rectangle from four ordered corner points
    ///
    /// The first edge (p0 to p1) defines the length and orientation and the
    /// second edge (p1 to p2) defines the width.
    ///
    /// # Examples
    ///
    /// ```
    /// use pince_core::gr::GraspRectangle;
    ///
    /// let points = [[0., 10.], [40., 10.], [40., 30.], [0., 30.]];
    /// let grasp = GraspRectangle::from_points(&points).unwrap();
    ///
    /// assert_eq!(grasp.center(), [20., 20.]);
    /// assert_eq!(grasp.angle(), 0.);
    /// assert_eq!(grasp.length(), 40.);
    /// assert_eq!(grasp.width(), 20.);
    /// ```
    pub fn from_points(points: &[[f32; 2]; 4]) -> Result<Self, PinceError> {
        let grasp = Self::from_corners(points, None);
        Self::new(grasp.center, grasp.angle, grasp.length, grasp.width)
    }

    fn from_corners(points: &[[f32; 2]; 4], quality: Option<f32>) -> Self {
        let cx = points.iter().map(|p| p[0]).sum::<f32>() / 4.0;
        let cy = points.iter().map(|p| p[1]).sum::<f32>() / 4.0;

        let dx = points[1][0] - points[0][0];
        let dy = points[1][1] - points[0][1];

        let length = (dx * dx + dy * dy).sqrt();
        let angle = normalize_angle((-dy).atan2(dx));

        let wx = points[2][0] - points[1][0];
        let wy = points[2][1] - points[1][1];
        let width = (wx * wx + wy * wy).sqrt();

        Self {
            center: [cx, cy],
            angle,
            length,
            width,
            quality,
        }
    }

    /// Attach a detection quality score
    pub fn with_quality(mut self, quality: Option<f32>) -> Self {
        self.quality = quality;
        self
    }
}

// >>> PROPERTY METHODS

impl GraspRectangle {
    /// Center point in `[x, y]` format
    pub fn center(&self) -> [f32; 2] {
        self.center
    }

    /// Orientation in radians within [-pi/2, pi/2)
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Detection quality, only present on extracted candidates
    pub fn quality(&self) -> Option<f32> {
        self.quality
    }

    pub fn area(&self) -> f32 {
        self.length * self.width
    }
}

// <<< PROPERTY METHODS

// >>> CONVERSION METHODS

impl GraspRectangle {
    /// Corner points of the rectangle in `[x, y]` format
    ///
    /// # Examples
    ///
    /// ```
    /// use pince_core::gr::GraspRectangle;
    ///
    /// let grasp = GraspRectangle::new([20., 20.], 0., 40., 20.).unwrap();
    ///
    /// assert_eq!(
    ///     grasp.as_points(),
    ///     [[0., 10.], [40., 10.], [40., 30.], [0., 30.]]
    /// );
    /// ```
    pub fn as_points(&self) -> [[f32; 2]; 4] {
        let (sin, cos) = self.angle.sin_cos();
        let [cx, cy] = self.center;

        let (lx, ly) = (self.length / 2.0 * cos, -self.length / 2.0 * sin);
        let (wx, wy) = (self.width / 2.0 * sin, self.width / 2.0 * cos);

        [
            [cx - lx - wx, cy - ly - wy],
            [cx + lx - wx, cy + ly - wy],
            [cx + lx + wx, cy + ly + wy],
            [cx - lx + wx, cy - ly + wy],
        ]
    }

    /// Format the grasp as a line of a Jacquard benchmark submission
    ///
    /// Fields are `x;y;angle;length;width` with the angle in degrees using the
    /// clockwise Jacquard convention. Distances are multiplied by `scale`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pince_core::gr::GraspRectangle;
    ///
    /// let grasp = GraspRectangle::new([10., 20.], 0.5, 40., 20.).unwrap();
    /// assert_eq!(grasp.to_jacquard(2.0), "20.00;40.00;-28.65;80.00;40.00");
    ///
    /// let grasp = GraspRectangle::new([10., 20.], 0.0, 40., 20.).unwrap();
    /// assert_eq!(grasp.to_jacquard(1.0), "10.00;20.00;0.00;40.00;20.00");
    /// ```
    pub fn to_jacquard(&self, scale: f32) -> String {
        // Adding zero turns -0.0 into 0.0
        let degrees = -self.angle.to_degrees() + 0.0;

        format!(
            "{:.2};{:.2};{:.2};{:.2};{:.2}",
            self.center[0] * scale,
            self.center[1] * scale,
            degrees,
            self.length * scale,
            self.width * scale
        )
    }
}

// <<< CONVERSION METHODS

// >>> TRANSFORM METHODS

impl GraspRectangle {
    fn map_points<F>(&self, f: F) -> Self
    where
        F: Fn([f32; 2]) -> [f32; 2],
    {
        let points = self.as_points().map(f);
        Self::from_corners(&points, self.quality)
    }

    /// Rotate the rectangle by `angle` radians about `center`
    ///
    /// Rotation is counter-clockwise on screen, matching the rectangle angle,
    /// so the orientation changes by `+angle`.
    pub fn rotate(&self, angle: f32, center: [f32; 2]) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.map_points(|[x, y]| {
            let dx = x - center[0];
            let dy = y - center[1];
            [
                cos * dx + sin * dy + center[0],
                -sin * dx + cos * dy + center[1],
            ]
        })
    }

    /// Translate the rectangle by `[dx, dy]`
    pub fn offset(&self, offset: [f32; 2]) -> Self {
        Self {
            center: [self.center[0] + offset[0], self.center[1] + offset[1]],
            ..*self
        }
    }

    /// Multiply all coordinates by `factor`
    pub fn scale(&self, factor: f32) -> Self {
        self.map_points(|[x, y]| [x * factor, y * factor])
    }

    /// Zoom about `center`, shrinking distances by `1 / factor`
    pub fn zoom(&self, factor: f32, center: [f32; 2]) -> Self {
        self.map_points(|[x, y]| {
            [
                (x - center[0]) / factor + center[0],
                (y - center[1]) / factor + center[1],
            ]
        })
    }
}

// <<< TRANSFORM METHODS

// >>> MATCHING METHODS

impl GraspRectangle {
    /// Rotated intersection-over-union with another rectangle
    ///
    /// # Examples
    ///
    /// ```
    /// use pince_core::gr::GraspRectangle;
    ///
    /// let a = GraspRectangle::new([20., 20.], 0.3, 40., 20.).unwrap();
    /// let b = GraspRectangle::new([200., 20.], 0.3, 40., 20.).unwrap();
    ///
    /// assert_eq!(a.iou(&a), 1.0);
    /// assert_eq!(a.iou(&b), 0.0);
    /// ```
    pub fn iou(&self, other: &GraspRectangle) -> f32 {
        polygon::iou(&self.as_points(), &other.as_points())
    }

    /// Orientation difference to another rectangle in [0, pi/2]
    pub fn angle_difference(&self, other: &GraspRectangle) -> f32 {
        angle_difference(self.angle, other.angle)
    }

    /// Check if this rectangle matches another under an IoU threshold and
    /// an angle tolerance
    pub fn matches(&self, other: &GraspRectangle, threshold: f32, angle_tolerance: f32) -> bool {
        self.angle_difference(other) <= angle_tolerance && self.iou(other) >= threshold
    }

    /// Best IoU against a set of rectangles within the angle tolerance
    ///
    /// Rectangles oriented further than `angle_tolerance` away are skipped.
    /// Returns 0.0 if no rectangle qualifies.
    pub fn max_iou(&self, rectangles: &[GraspRectangle], angle_tolerance: f32) -> f32 {
        rectangles
            .iter()
            .filter(|other| self.angle_difference(other) <= angle_tolerance)
            .map(|other| self.iou(other))
            .fold(0.0, f32::max)
    }
}

// <<< MATCHING METHODS
