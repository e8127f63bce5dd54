// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use crate::constant::GAUSSIAN_TRUNCATE;

/// Normalized 1D gaussian kernel truncated at `GAUSSIAN_TRUNCATE` sigmas
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 || !sigma.is_finite() {
        return vec![1.0];
    }

    let radius = (GAUSSIAN_TRUNCATE * sigma).ceil() as isize;
    let denominator = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denominator).exp())
        .collect();

    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Separable gaussian blur of a row-major 2D buffer
///
/// Edges are handled by repeating the nearest valid pixel. A buffer whose
/// length is not `width * height` is returned unchanged.
///
/// # Arguments
///
/// * `buffer` - Row-major data of length `width * height`
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `sigma` - Standard deviation of the gaussian in pixels
///
/// # Examples
///
/// ```
/// use pince_core::cv::filter::gaussian_blur;
///
/// let buffer = vec![1.0; 16];
/// let blurred = gaussian_blur(&buffer, 4, 4, 1.0);
///
/// assert!(blurred.iter().all(|v| (v - 1.0).abs() < 1e-5));
/// ```
pub fn gaussian_blur(buffer: &[f32], width: usize, height: usize, sigma: f32) -> Vec<f32> {
    let kernel = gaussian_kernel(sigma);
    if kernel.len() == 1 || buffer.is_empty() || buffer.len() != width * height {
        return buffer.to_vec();
    }

    let radius = (kernel.len() / 2) as isize;
    let clamp = |i: isize, n: usize| i.clamp(0, n as isize - 1) as usize;

    let mut horizontal = vec![0.0; buffer.len()];
    for y in 0..height {
        let row = &buffer[y * width..(y + 1) * width];
        for x in 0..width {
            horizontal[y * width + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * row[clamp(x as isize + k as isize - radius, width)])
                .sum();
        }
    }

    let mut output = vec![0.0; buffer.len()];
    for y in 0..height {
        for x in 0..width {
            output[y * width + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    w * horizontal[clamp(y as isize + k as isize - radius, height) * width + x]
                })
                .sum();
        }
    }

    output
}
