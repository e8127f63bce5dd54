// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::path::{Path, PathBuf};

use pince_core::constant::JACQUARD_RESOLUTION;
use pince_core::error::PinceError;
use pince_core::gr::GroundTruth;
use pince_core::ut::path::collect_files_recursive;

use crate::data::GraspDatasets;
use crate::data::{read_cornell_grasps, read_jacquard_grasps};

/// Annotation files of a grasp dataset on disk
///
/// Ground truth is returned in the frame of a square network input of
/// `output_size` pixels, aligned with the rotation and zoom that were applied
/// to the input image.
#[derive(Debug, Clone)]
pub struct GraspDataset {
    kind: GraspDatasets,
    files: Vec<PathBuf>,
    output_size: usize,
}

impl GraspDataset {
    /// Discover the annotation files of a dataset
    ///
    /// # Arguments
    ///
    /// * `kind` - Dataset layout
    /// * `root` - Directory searched recursively for annotation files
    /// * `output_size` - Side length of the network input in pixels
    /// * `ds_rotate` - Fraction in [0, 1] shifting the start of the file list
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pince_data::data::{GraspDataset, GraspDatasets};
    ///
    /// let dataset = GraspDataset::open(GraspDatasets::Cornell, "cornell/", 300, 0.0).unwrap();
    /// let ground_truth = dataset.ground_truth(0, 0.0, 1.0).unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(
        kind: GraspDatasets,
        root: P,
        output_size: usize,
        ds_rotate: f32,
    ) -> Result<Self, PinceError> {
        let (frame_width, frame_height) = kind.frame();

        if output_size == 0 || output_size > frame_width.min(frame_height) {
            return Err(PinceError::InvalidInput(format!(
                "Output size for {} must lie in [1, {}], got {}",
                kind.name(),
                frame_width.min(frame_height),
                output_size
            )));
        }

        if !(0.0..=1.0).contains(&ds_rotate) {
            return Err(PinceError::InvalidInput(format!(
                "Dataset rotation must lie in [0, 1], got {}",
                ds_rotate
            )));
        }

        let mut files = collect_files_recursive(&root, kind.annotation_suffix())?;

        if files.is_empty() {
            return Err(PinceError::DatasetError(format!(
                "No {} annotation files (*{}) found in {}",
                kind.name(),
                kind.annotation_suffix(),
                root.as_ref().display()
            )));
        }

        let start = (files.len() as f32 * ds_rotate).floor() as usize;
        let len = files.len();
        files.rotate_left(start.min(len));

        Ok(Self {
            kind,
            files,
            output_size,
        })
    }
}

impl GraspDataset {
    pub fn kind(&self) -> GraspDatasets {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Path to the annotation file of an image
    pub fn path(&self, idx: usize) -> Result<&Path, PinceError> {
        self.files.get(idx).map(PathBuf::as_path).ok_or_else(|| {
            PinceError::DatasetError(format!(
                "Index {} is out of bounds for a dataset of {} images",
                idx,
                self.len()
            ))
        })
    }

    /// Image identifier: the annotation file name without its suffix
    ///
    /// Cornell `pcd0100cpos.txt` becomes `pcd0100` and Jacquard
    /// `0_1a9fa4c2_grasps.txt` becomes `0_1a9fa4c2`.
    pub fn id(&self, idx: usize) -> Result<String, PinceError> {
        let name = self
            .path(idx)?
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(name
            .strip_suffix(self.kind.annotation_suffix())
            .unwrap_or(&name)
            .to_string())
    }

    /// All image identifiers in dataset order
    pub fn ids(&self) -> Result<Vec<String>, PinceError> {
        (0..self.len()).map(|idx| self.id(idx)).collect()
    }

    /// Name of an image in a Jacquard benchmark submission
    ///
    /// The annotation file name with its last underscore-separated component
    /// removed.
    pub fn jacquard_name(&self, idx: usize) -> Result<String, PinceError> {
        let name = self
            .path(idx)?
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(match name.rsplit_once('_') {
            Some((head, _)) => head.to_string(),
            None => name,
        })
    }

    /// Annotations of an image in the native image frame
    pub fn annotations(&self, idx: usize) -> Result<GroundTruth, PinceError> {
        let path = self.path(idx)?;

        match self.kind {
            GraspDatasets::Cornell => read_cornell_grasps(path),
            GraspDatasets::Jacquard | GraspDatasets::Fsim => read_jacquard_grasps(path),
        }
    }

    /// Ground truth of an image in the frame of the network output
    ///
    /// # Arguments
    ///
    /// * `idx` - Image index
    /// * `rot` - Rotation in radians applied to the network input
    /// * `zoom` - Zoom factor applied to the network input
    pub fn ground_truth(&self, idx: usize, rot: f32, zoom: f32) -> Result<GroundTruth, PinceError> {
        if !(zoom > 0.0 && zoom.is_finite()) || !rot.is_finite() {
            return Err(PinceError::InvalidInput(format!(
                "Zoom must be positive and rotation finite, got zoom {} and rotation {}",
                zoom, rot
            )));
        }

        let mut ground_truth = self.annotations(idx)?;
        let size = self.output_size as f32;
        let half = (self.output_size / 2) as f32;

        match self.kind {
            GraspDatasets::Cornell => {
                let Some([cx, cy]) = ground_truth.center() else {
                    return Ok(ground_truth);
                };

                let center = [cx.round(), cy.round()];
                let (frame_width, frame_height) = self.kind.frame();

                let left = (center[0] - half).min(frame_width as f32 - size).max(0.0);
                let top = (center[1] - half).min(frame_height as f32 - size).max(0.0);

                ground_truth.rotate(rot, center);
                ground_truth.offset([-left, -top]);
                ground_truth.zoom(zoom, [half, half]);
            }
            GraspDatasets::Jacquard | GraspDatasets::Fsim => {
                ground_truth.scale(size / JACQUARD_RESOLUTION);
                ground_truth.rotate(rot, [half, half]);
                ground_truth.zoom(zoom, [half, half]);
            }
        }

        Ok(ground_truth)
    }

    /// Total number of annotated grasps
    pub fn count_grasps(&self) -> Result<usize, PinceError> {
        (0..self.len())
            .map(|idx| self.annotations(idx).map(|gt| gt.len()))
            .sum()
    }
}
