// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

// Default intersection-over-union needed for a grasp to count as correct
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.25;

// Maximum orientation difference between matched grasps (30 degrees)
pub const DEFAULT_ANGLE_TOLERANCE: f32 = std::f32::consts::FRAC_PI_6;

// Extracted grasps have a length equal to this multiple of the predicted width
pub const LENGTH_WIDTH_RATIO: f32 = 2.0;

// Raw network width outputs are normalized by this many pixels
pub const DEFAULT_WIDTH_SCALE: f32 = 150.0;

// Gaussian smoothing applied when post-processing raw network outputs
pub const QUALITY_SIGMA: f32 = 2.0;
pub const ANGLE_SIGMA: f32 = 2.0;
pub const WIDTH_SIGMA: f32 = 1.0;

// Gaussian kernels are truncated at this many standard deviations
pub const GAUSSIAN_TRUNCATE: f32 = 4.0;

// Native resolution of the Jacquard submission format
pub const JACQUARD_RESOLUTION: f32 = 1024.0;

// All currently supported prediction formats
pub const SUPPORTED_MAP_FORMATS: [&str; 1] = ["npz"];

// All currently supported grasp array formats
pub const SUPPORTED_ARRAY_FORMATS: [&str; 1] = ["json"];

// All currently supported table formats
pub const SUPPORTED_TABLE_FORMATS: [&str; 5] = ["csv", "tsv", "txt", "pq", "parquet"];

// Array names for post-processed heat maps stored in a .npz file
pub const NPZ_QUALITY: &str = "q";
pub const NPZ_ANGLE: &str = "angle";
pub const NPZ_WIDTH: &str = "width";

// Array names for raw network outputs stored in a .npz file
pub const NPZ_POS: &str = "pos";
pub const NPZ_COS: &str = "cos";
pub const NPZ_SIN: &str = "sin";

// Optional scalar arrays describing the transform applied to the input
pub const NPZ_ROTATION: &str = "rot";
pub const NPZ_ZOOM: &str = "zoom";

// The valid json keys indicating grasp rectangle values
pub const GRASP_JSON_VALID_KEYS: [&str; 4] = ["grasps", "rectangles", "grs", "gtbbs"];

// Names for per-image evaluation results
pub const RESULT_COLUMN_NAMES: [&str; 5] = ["image", "correct", "iou", "candidates", "quality"];
