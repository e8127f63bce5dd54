// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::path::Path;

use pince_core::error::PinceError;
use pince_core::gr::{GraspRectangle, GroundTruth};

fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String, PinceError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|_| PinceError::NoFileError(path.display().to_string()))
}

fn parse_cornell_point(line: &str) -> Option<[f32; 2]> {
    let mut values = line.split_whitespace().map(|v| v.parse::<f32>());

    let x = values.next()?.ok()?;
    let y = values.next()?.ok()?;

    if values.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }

    Some([x.round(), y.round()])
}

/// Parse Cornell grasp annotations
///
/// Every rectangle spans four consecutive lines, each holding one corner as
/// `x y`. Coordinates are rounded to whole pixels. Groups with missing,
/// non-numeric, or NaN coordinates and degenerate rectangles are skipped.
///
/// # Examples
///
/// ```
/// use pince_data::data::parse_cornell_grasps;
///
/// let contents = "0 10\n40 10\n40 30\n0 30\nNaN NaN\n1 1\n2 2\n3 3\n";
/// let ground_truth = parse_cornell_grasps(contents);
///
/// assert_eq!(ground_truth.len(), 1);
/// assert_eq!(ground_truth.as_rectangles()[0].center(), [20., 20.]);
/// ```
pub fn parse_cornell_grasps(contents: &str) -> GroundTruth {
    let lines: Vec<&str> = contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let grasps = lines
        .chunks_exact(4)
        .filter_map(|group| {
            let points = [
                parse_cornell_point(group[0])?,
                parse_cornell_point(group[1])?,
                parse_cornell_point(group[2])?,
                parse_cornell_point(group[3])?,
            ];

            GraspRectangle::from_points(&points).ok()
        })
        .collect();

    GroundTruth::new(grasps)
}

/// Read Cornell grasp annotations from a `pcd####cpos.txt` file
pub fn read_cornell_grasps<P: AsRef<Path>>(path: P) -> Result<GroundTruth, PinceError> {
    Ok(parse_cornell_grasps(&read_to_string(path)?))
}

/// Parse Jacquard grasp annotations
///
/// Each line is `x;y;angle;width;height` in the 1024 x 1024 image frame with
/// the angle in clockwise degrees. The jaw opening (`width` in the file) is
/// the rectangle length and the jaw size (`height`) is its width.
///
/// # Examples
///
/// ```
/// use pince_data::data::parse_jacquard_grasps;
///
/// let ground_truth = parse_jacquard_grasps("512;480;-90;60;20\n").unwrap();
/// let grasp = ground_truth.as_rectangles()[0];
///
/// assert_eq!(grasp.center(), [512., 480.]);
/// assert_eq!(grasp.length(), 60.);
/// assert!((grasp.angle().abs() - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
///
/// assert!(parse_jacquard_grasps("512;480;-90;60\n").is_err());
/// ```
pub fn parse_jacquard_grasps(contents: &str) -> Result<GroundTruth, PinceError> {
    let grasps = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let values: Vec<f32> = line
                .trim()
                .split(';')
                .map(|v| v.trim().parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|_| {
                    PinceError::AnnotationError(format!("Line {} is not numeric: {}", idx + 1, line))
                })?;

            let [x, y, theta, length, width] = values[..] else {
                return Err(PinceError::AnnotationError(format!(
                    "Line {} requires 5 values (x;y;angle;width;height), found {}",
                    idx + 1,
                    values.len()
                )));
            };

            GraspRectangle::new([x, y], -theta.to_radians(), length, width).map_err(|_| {
                PinceError::AnnotationError(format!("Line {} is not a valid grasp: {}", idx + 1, line))
            })
        })
        .collect::<Result<Vec<GraspRectangle>, PinceError>>()?;

    Ok(GroundTruth::new(grasps))
}

/// Read Jacquard grasp annotations from a `*_grasps.txt` file
pub fn read_jacquard_grasps<P: AsRef<Path>>(path: P) -> Result<GroundTruth, PinceError> {
    parse_jacquard_grasps(&read_to_string(path)?)
}
