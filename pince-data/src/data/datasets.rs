// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use pince_core::error::PinceError;

/// Grasp datasets with a known annotation layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraspDatasets {
    Cornell,
    Jacquard,
    Fsim,
}

impl GraspDatasets {
    /// Select a dataset by name.
    ///
    /// # Examples
    ///
    /// ```
    /// use pince_data::data::GraspDatasets;
    ///
    /// assert_eq!(GraspDatasets::select("jacquard").unwrap(), GraspDatasets::Jacquard);
    /// assert!(GraspDatasets::select("graspnet").is_err());
    /// ```
    pub fn select(name: &str) -> Result<Self, PinceError> {
        match name.to_lowercase().as_str() {
            "cornell" => Ok(GraspDatasets::Cornell),
            "jacquard" => Ok(GraspDatasets::Jacquard),
            "fsim" => Ok(GraspDatasets::Fsim),
            _ => Err(PinceError::DatasetError(format!(
                "Dataset {} not found. Available grasp datasets include: {}.",
                name,
                GraspDatasets::iter()
                    .map(|d| d.name())
                    .collect::<Vec<&str>>()
                    .join(", ")
            ))),
        }
    }

    /// Return an iterator over the enum members.
    pub fn iter() -> impl Iterator<Item = &'static GraspDatasets> {
        static DATASETS: [GraspDatasets; 3] = [
            GraspDatasets::Cornell,
            GraspDatasets::Jacquard,
            GraspDatasets::Fsim,
        ];

        DATASETS.iter()
    }

    /// Name used to select the dataset.
    pub fn name(&self) -> &'static str {
        match self {
            GraspDatasets::Cornell => "cornell",
            GraspDatasets::Jacquard => "jacquard",
            GraspDatasets::Fsim => "fsim",
        }
    }

    /// Ending shared by every annotation file in the dataset.
    pub fn annotation_suffix(&self) -> &'static str {
        match self {
            GraspDatasets::Cornell => "cpos.txt",
            GraspDatasets::Jacquard => "_grasps.txt",
            GraspDatasets::Fsim => "_grasps.txt",
        }
    }

    /// Native image width and height in pixels.
    pub fn frame(&self) -> (usize, usize) {
        match self {
            GraspDatasets::Cornell => (640, 480),
            GraspDatasets::Jacquard => (1024, 1024),
            GraspDatasets::Fsim => (1024, 1024),
        }
    }

    /// Authors or origin of the annotations.
    pub fn data_authors(&self) -> &'static str {
        match self {
            GraspDatasets::Cornell => "Jiang et al. 2011",
            GraspDatasets::Jacquard => "Depierre et al. 2018",
            GraspDatasets::Fsim => "Simulation",
        }
    }

    /// Short description of the dataset.
    pub fn description(&self) -> &'static str {
        match self {
            GraspDatasets::Cornell => {
                "885 RGB-D images of household objects with rectangle corner annotations"
            }
            GraspDatasets::Jacquard => {
                "Synthetic RGB-D scenes with simulated grasp annotations (x;y;angle;w;h)"
            }
            GraspDatasets::Fsim => "Simulated scenes annotated in the Jacquard line format",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_select_roundtrip() {
        for dataset in GraspDatasets::iter() {
            assert_eq!(GraspDatasets::select(dataset.name()).unwrap(), *dataset);
        }
    }

    #[test]
    fn test_select_case_insensitive() {
        assert_eq!(
            GraspDatasets::select("Cornell").unwrap(),
            GraspDatasets::Cornell
        );
    }

    #[test]
    fn test_unknown_lists_available() {
        let err = GraspDatasets::select("ocid").unwrap_err();
        assert!(err.to_string().contains("cornell, jacquard, fsim"));
    }
}
