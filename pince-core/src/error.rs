// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum PinceError {
    InvalidInput(String),
    ShapeError,
    RectangleError,
    MapsReadError(String),
    MapsWriteError,
    GraspsReadError,
    GraspsWriteError,
    AnnotationError(String),
    DatasetError(String),
    NoFileError(String),
    DirError(String),
    OtherError(String),
}

impl fmt::Display for PinceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PinceError::InvalidInput(message) => {
                write!(f, "[pince::InvalidInput] Invalid input. {}", message)
            }
            PinceError::ShapeError => {
                write!(
                    f,
                    "[pince::ShapeError] Quality, angle, and width maps must share the same non-empty height and width."
                )
            }
            PinceError::RectangleError => {
                write!(
                    f,
                    "[pince::RectangleError] Grasp rectangles require a finite center and angle with positive length and width."
                )
            }
            PinceError::MapsReadError(message) => {
                write!(
                    f,
                    "[pince::MapsReadError] Failed to read heat maps. {}",
                    message
                )
            }
            PinceError::MapsWriteError => {
                write!(f, "[pince::MapsWriteError] Failed to write heat maps.")
            }
            PinceError::GraspsReadError => {
                write!(
                    f,
                    "[pince::GraspsReadError] Grasp rectangles could not be read."
                )
            }
            PinceError::GraspsWriteError => {
                write!(
                    f,
                    "[pince::GraspsWriteError] Failed to successfully write grasp rectangles to output."
                )
            }
            PinceError::AnnotationError(message) => {
                write!(
                    f,
                    "[pince::AnnotationError] Failed to parse grasp annotations. {}",
                    message
                )
            }
            PinceError::DatasetError(message) => {
                write!(f, "[pince::DatasetError] {}", message)
            }
            PinceError::NoFileError(message) => {
                write!(
                    f,
                    "[pince::NoFileError] File could not be found. {}.",
                    message
                )
            }
            PinceError::DirError(message) => {
                write!(
                    f,
                    "[pince::DirError] Directory could not be read. {}.",
                    message
                )
            }
            PinceError::OtherError(message) => {
                write!(f, "[pince::OtherError] Error: {}.", message)
            }
        }
    }
}

impl std::error::Error for PinceError {}
