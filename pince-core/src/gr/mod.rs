// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

mod detect;
mod evaluate;
mod grasps;
mod maps;
mod rectangle;

pub use rectangle::GraspRectangle;
pub use rectangle::{angle_difference, normalize_angle};

pub use grasps::{Candidates, GroundTruth};
pub use grasps::{read_grasps_json, write_grasps_json};

pub use maps::HeatMaps;
pub use maps::Prediction;

pub use detect::ExtractConfig;
pub use detect::{extract_grasps, extract_grasps_with};

pub use evaluate::IouTally;
pub use evaluate::IouRecord;
pub use evaluate::MatchConfig;
pub use evaluate::{calculate_iou_match, is_match};
