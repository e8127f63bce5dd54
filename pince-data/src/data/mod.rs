// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

mod annotation;
mod dataset;
mod datasets;

pub use annotation::{parse_cornell_grasps, read_cornell_grasps};
pub use annotation::{parse_jacquard_grasps, read_jacquard_grasps};
pub use dataset::GraspDataset;
pub use datasets::GraspDatasets;
