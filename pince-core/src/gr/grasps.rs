// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

use serde_json::Value;

use crate::constant::GRASP_JSON_VALID_KEYS;
use crate::error::PinceError;
use crate::gr::GraspRectangle;

/// A ranked set of grasp candidates extracted from one image
///
/// Candidates always carry a quality score and are stored in non-increasing
/// order of quality.
///
/// # Examples
///
/// ```
/// use pince_core::gr::{Candidates, GraspRectangle};
///
/// let a = GraspRectangle::new([5., 5.], 0., 40., 20.).unwrap().with_quality(Some(0.9));
/// let b = GraspRectangle::new([9., 2.], 0., 40., 20.).unwrap().with_quality(Some(0.4));
///
/// assert!(Candidates::new(vec![a, b]).is_ok());
/// assert!(Candidates::new(vec![b, a]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates {
    data: Vec<GraspRectangle>,
}

impl Candidates {
    /// Initialize a new candidate set
    ///
    /// # Arguments
    ///
    /// * `data` - Rectangles with quality scores in non-increasing order
    pub fn new(data: Vec<GraspRectangle>) -> Result<Self, PinceError> {
        let qualities: Option<Vec<f32>> = data.iter().map(|g| g.quality()).collect();

        let Some(qualities) = qualities else {
            return Err(PinceError::InvalidInput(
                "Every grasp candidate requires a quality score".to_string(),
            ));
        };

        if qualities.windows(2).any(|w| w[0] < w[1]) {
            return Err(PinceError::InvalidInput(
                "Grasp candidates must be ordered by non-increasing quality".to_string(),
            ));
        }

        Ok(Self { data })
    }

    pub(crate) fn from_ranked(data: Vec<GraspRectangle>) -> Self {
        Self { data }
    }
}

impl Candidates {
    /// Save candidates at the provided path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to save candidates (.json)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PinceError> {
        if has_json_extension(&path) {
            return write_grasps_json(path, &self.data);
        }

        Err(PinceError::GraspsWriteError)
    }
}

impl Candidates {
    /// Number of candidates
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if no candidates were extracted
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Highest quality candidate
    pub fn best(&self) -> Option<&GraspRectangle> {
        self.data.first()
    }

    /// Return a reference to the underlying rectangles
    pub fn as_rectangles(&self) -> &[GraspRectangle] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GraspRectangle> {
        self.data.iter()
    }
}

/// Ground truth grasp rectangles annotated for one image
///
/// Order carries no meaning and rectangles never carry a quality score.
///
/// # Examples
///
/// ```
/// use pince_core::gr::{GraspRectangle, GroundTruth};
///
/// let grasp = GraspRectangle::new([5., 5.], 0., 40., 20.).unwrap().with_quality(Some(0.3));
/// let ground_truth = GroundTruth::new(vec![grasp]);
///
/// assert_eq!(ground_truth.len(), 1);
/// assert_eq!(ground_truth.as_rectangles()[0].quality(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruth {
    data: Vec<GraspRectangle>,
}

impl GroundTruth {
    /// Initialize a new ground truth set, dropping any quality scores
    pub fn new(data: Vec<GraspRectangle>) -> Self {
        Self {
            data: data.into_iter().map(|g| g.with_quality(None)).collect(),
        }
    }
}

// >>> I/O METHODS

impl GroundTruth {
    /// Open ground truth rectangles from the provided path
    ///
    /// # Arguments
    ///
    /// * `path` - A path to grasp rectangles with a valid extension
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pince_core::gr::GroundTruth;
    /// let ground_truth = GroundTruth::open("grasps.json");
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<GroundTruth, PinceError> {
        if has_json_extension(&path) {
            return read_grasps_json(path).map(GroundTruth::new);
        }

        Err(PinceError::GraspsReadError)
    }

    /// Save ground truth rectangles at the provided path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PinceError> {
        if has_json_extension(&path) {
            return write_grasps_json(path, &self.data);
        }

        Err(PinceError::GraspsWriteError)
    }
}

// <<< I/O METHODS

// >>> PROPERTY METHODS

impl GroundTruth {
    /// Number of annotated rectangles
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if there are no annotated rectangles
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return a reference to the underlying rectangles
    pub fn as_rectangles(&self) -> &[GraspRectangle] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GraspRectangle> {
        self.data.iter()
    }

    /// Mean of all rectangle corners, or `None` if empty
    pub fn center(&self) -> Option<[f32; 2]> {
        if self.data.is_empty() {
            return None;
        }

        let (sum_x, sum_y) = self
            .data
            .iter()
            .flat_map(|g| g.as_points())
            .fold((0.0, 0.0), |(sx, sy), [x, y]| (sx + x, sy + y));

        let n = (4 * self.data.len()) as f32;
        Some([sum_x / n, sum_y / n])
    }
}

// <<< PROPERTY METHODS

// >>> TRANSFORM METHODS

impl GroundTruth {
    /// Rotate every rectangle by `angle` radians about `center`
    pub fn rotate(&mut self, angle: f32, center: [f32; 2]) {
        self.data
            .iter_mut()
            .for_each(|g| *g = g.rotate(angle, center));
    }

    /// Translate every rectangle by `[dx, dy]`
    pub fn offset(&mut self, offset: [f32; 2]) {
        self.data.iter_mut().for_each(|g| *g = g.offset(offset));
    }

    /// Multiply every coordinate by `factor`
    pub fn scale(&mut self, factor: f32) {
        self.data.iter_mut().for_each(|g| *g = g.scale(factor));
    }

    /// Zoom every rectangle about `center` by `factor`
    pub fn zoom(&mut self, factor: f32, center: [f32; 2]) {
        self.data
            .iter_mut()
            .for_each(|g| *g = g.zoom(factor, center));
    }
}

// <<< TRANSFORM METHODS

fn has_json_extension<P: AsRef<Path>>(path: &P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .is_some_and(|ext| ext == "json")
}

/// Read grasp rectangles stored as json format
pub fn read_grasps_json<P: AsRef<Path>>(path: P) -> Result<Vec<GraspRectangle>, PinceError> {
    let mut contents = String::new();

    File::open(path)
        .map_err(|err| PinceError::NoFileError(err.to_string()))?
        .read_to_string(&mut contents)
        .map_err(|err| PinceError::NoFileError(err.to_string()))?;

    let data: Value = serde_json::from_str(&contents).map_err(|_| PinceError::GraspsReadError)?;

    fn to_f32(value: Option<&Value>) -> Result<f32, PinceError> {
        value
            .and_then(Value::as_f64)
            .map(|n| n as f32)
            .ok_or(PinceError::GraspsReadError)
    }

    for key in &GRASP_JSON_VALID_KEYS {
        if let Some(grasps) = data.get(key).and_then(|v| v.as_array()) {
            let grasps: Result<Vec<GraspRectangle>, _> = grasps
                .iter()
                .map(|item| {
                    let center = item
                        .get("center")
                        .and_then(Value::as_array)
                        .filter(|c| c.len() == 2)
                        .ok_or(PinceError::GraspsReadError)?;

                    let quality = item.get("quality").and_then(Value::as_f64);

                    GraspRectangle::new(
                        [to_f32(center.first())?, to_f32(center.get(1))?],
                        to_f32(item.get("angle"))?,
                        to_f32(item.get("length"))?,
                        to_f32(item.get("width"))?,
                    )
                    .map(|g| g.with_quality(quality.map(|q| q as f32)))
                })
                .collect();

            return grasps;
        }
    }

    Err(PinceError::GraspsReadError)
}

/// Write grasp rectangles to a json file
pub fn write_grasps_json<P: AsRef<Path>>(
    path: P,
    grasps: &[GraspRectangle],
) -> Result<(), PinceError> {
    let file = File::create(path).map_err(|_| PinceError::GraspsWriteError)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer(writer, &serde_json::json!({ "grasps": grasps }))
        .map_err(|_| PinceError::GraspsWriteError)?;

    Ok(())
}
