// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

/// Find strict local maxima in a row-major 2D buffer
///
/// A pixel is a peak when it is strictly greater than `threshold` and than
/// every in-bounds pixel within a Chebyshev distance of `min_distance`.
/// NaN pixels are never peaks and never suppress a neighbour. Peaks are
/// returned as `(row, col, value)` sorted by descending value, with ties
/// kept in row-major order. A buffer whose length is not `width * height`
/// has no peaks.
///
/// # Arguments
///
/// * `buffer` - Row-major data of length `width * height`
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `min_distance` - Neighbourhood radius (1 compares the 8 adjacent pixels)
/// * `threshold` - Peaks must exceed this value
///
/// # Examples
///
/// ```
/// use pince_core::cv::peaks::local_maxima;
///
/// let buffer = vec![
///     0.0, 0.0, 0.0, 0.0,
///     0.0, 0.5, 0.0, 0.0,
///     0.0, 0.0, 0.0, 0.9,
/// ];
///
/// let peaks = local_maxima(&buffer, 4, 3, 1, 0.0);
/// assert_eq!(peaks, vec![(2, 3, 0.9), (1, 1, 0.5)]);
/// ```
pub fn local_maxima(
    buffer: &[f32],
    width: usize,
    height: usize,
    min_distance: usize,
    threshold: f32,
) -> Vec<(usize, usize, f32)> {
    if buffer.is_empty() || buffer.len() != width * height {
        return Vec::new();
    }

    let radius = min_distance.max(1);
    let mut peaks = Vec::new();

    for row in 0..height {
        let row_start = row.saturating_sub(radius);
        let row_end = (row + radius).min(height - 1);

        for col in 0..width {
            let value = buffer[row * width + col];

            if value.is_nan() || value <= threshold {
                continue;
            }

            let col_start = col.saturating_sub(radius);
            let col_end = (col + radius).min(width - 1);

            let is_peak = (row_start..=row_end).all(|r| {
                (col_start..=col_end).all(|c| {
                    let neighbour = buffer[r * width + c];
                    (r == row && c == col) || neighbour.is_nan() || neighbour < value
                })
            });

            if is_peak {
                peaks.push((row, col, value));
            }
        }
    }

    peaks.sort_by(|a, b| b.2.total_cmp(&a.2));
    peaks
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mismatched_shape() {
        let buffer = vec![0.0, 0.0, 0.0, 0.0, 0.9, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(local_maxima(&buffer, 3, 3, 1, 0.0).len(), 1);
        assert!(local_maxima(&buffer, 4, 4, 1, 0.0).is_empty());
        assert!(local_maxima(&buffer, 2, 3, 1, 0.0).is_empty());
    }

    #[test]
    fn test_empty_and_flat() {
        assert!(local_maxima(&[], 0, 0, 1, 0.0).is_empty());
        assert!(local_maxima(&[0.0; 100], 10, 10, 1, 0.0).is_empty());
        assert!(local_maxima(&[0.4; 100], 10, 10, 1, 0.0).is_empty());
    }

    #[test]
    fn test_plateau_is_not_a_peak() {
        let mut buffer = vec![0.0; 25];
        buffer[2 * 5 + 2] = 0.8;
        buffer[2 * 5 + 3] = 0.8;
        assert!(local_maxima(&buffer, 5, 5, 1, 0.0).is_empty());
    }

    #[test]
    fn test_border_peaks() {
        let mut buffer = vec![0.0; 16];
        buffer[0] = 0.3;
        buffer[15] = 0.6;

        let peaks = local_maxima(&buffer, 4, 4, 1, 0.0);
        assert_eq!(peaks, vec![(3, 3, 0.6), (0, 0, 0.3)]);
    }

    #[test]
    fn test_threshold() {
        let mut buffer = vec![0.0; 16];
        buffer[5] = 0.1;
        buffer[15] = 0.6;

        let peaks = local_maxima(&buffer, 4, 4, 1, 0.2);
        assert_eq!(peaks, vec![(3, 3, 0.6)]);
    }

    #[test]
    fn test_min_distance_suppresses_neighbours() {
        let mut buffer = vec![0.0; 10 * 10];
        buffer[2 * 10 + 2] = 0.9;
        buffer[2 * 10 + 5] = 0.7;

        assert_eq!(local_maxima(&buffer, 10, 10, 1, 0.0).len(), 2);
        assert_eq!(
            local_maxima(&buffer, 10, 10, 3, 0.0),
            vec![(2, 2, 0.9)]
        );
    }

    #[test]
    fn test_nan_is_ignored() {
        let mut buffer = vec![0.0; 9];
        buffer[4] = f32::NAN;
        buffer[0] = 0.5;

        let peaks = local_maxima(&buffer, 3, 3, 1, 0.0);
        assert_eq!(peaks.len(), 1);
        assert_eq!((peaks[0].0, peaks[0].1), (0, 0));
    }

    #[test]
    fn test_ties_keep_row_major_order() {
        let mut buffer = vec![0.0; 25];
        buffer[4 * 5] = 0.5;
        buffer[0] = 0.5;
        buffer[4] = 0.5;

        let peaks = local_maxima(&buffer, 5, 5, 1, 0.0);
        let positions: Vec<(usize, usize)> = peaks.iter().map(|p| (p.0, p.1)).collect();
        assert_eq!(positions, vec![(0, 0), (0, 4), (4, 0)]);
    }
}
