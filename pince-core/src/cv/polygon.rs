// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

/// Twice the signed area of a closed or open polygon
///
/// Positive for counter-clockwise ordering in a y-up frame.
#[inline]
pub fn signed_area(points: &[[f32; 2]]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let p1 = points[i];
        let p2 = points[(i + 1) % n];
        area += p1[0] * p2[1] - p2[0] * p1[1];
    }

    area / 2.0
}

/// Compute the area of a polygon with the shoelace formula
///
/// # Examples
///
/// ```
/// use pince_core::cv::polygon::area;
///
/// let square = [[0., 0.], [2., 0.], [2., 2.], [0., 2.]];
/// assert_eq!(area(&square), 4.0);
///
/// let line = [[0., 0.], [1., 1.], [2., 2.]];
/// assert_eq!(area(&line), 0.0);
/// ```
#[inline]
pub fn area(points: &[[f32; 2]]) -> f32 {
    signed_area(points).abs()
}

#[inline]
fn cross(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

#[inline]
fn intersect(p: [f32; 2], q: [f32; 2], a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
    let cp = cross(a, b, p);
    let cq = cross(a, b, q);
    let t = cp / (cp - cq);
    [p[0] + t * (q[0] - p[0]), p[1] + t * (q[1] - p[1])]
}

/// Intersect a polygon with a convex clipping polygon (Sutherland-Hodgman)
///
/// The clipping polygon may be given in either orientation. Subject vertices
/// that lie inside or on the clipping boundary are emitted in their original
/// order, so clipping a convex polygon by itself returns it unchanged.
///
/// # Arguments
///
/// * `subject` - Polygon to clip
/// * `clip` - Convex clipping polygon
///
/// # Examples
///
/// ```
/// use pince_core::cv::polygon::{area, clip_convex};
///
/// let a = [[0., 0.], [2., 0.], [2., 2.], [0., 2.]];
/// let b = [[1., 1.], [3., 1.], [3., 3.], [1., 3.]];
///
/// let overlap = clip_convex(&a, &b);
/// assert_eq!(area(&overlap), 1.0);
/// ```
pub fn clip_convex(subject: &[[f32; 2]], clip: &[[f32; 2]]) -> Vec<[f32; 2]> {
    let mut clip = clip.to_vec();
    if signed_area(&clip) < 0.0 {
        clip.reverse();
    }

    let mut output = subject.to_vec();

    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }

        let a = clip[i];
        let b = clip[(i + 1) % clip.len()];

        let input = std::mem::take(&mut output);
        let n = input.len();

        for j in 0..n {
            let current = input[j];
            let previous = input[(j + n - 1) % n];

            let current_inside = cross(a, b, current) >= 0.0;
            let previous_inside = cross(a, b, previous) >= 0.0;

            if current_inside {
                if !previous_inside {
                    output.push(intersect(previous, current, a, b));
                }
                output.push(current);
            } else if previous_inside {
                output.push(intersect(previous, current, a, b));
            }
        }
    }

    output
}

/// Intersection-over-union of two convex polygons
///
/// Returns 0.0 when either polygon is degenerate (zero or non-finite area)
/// or when the polygons do not overlap.
///
/// # Examples
///
/// ```
/// use pince_core::cv::polygon::iou;
///
/// let a = [[0., 0.], [2., 0.], [2., 2.], [0., 2.]];
/// let b = [[1., 0.], [3., 0.], [3., 2.], [1., 2.]];
///
/// assert!((iou(&a, &b) - 1.0 / 3.0).abs() < 1e-6);
/// assert_eq!(iou(&a, &a), 1.0);
/// ```
pub fn iou(a: &[[f32; 2]], b: &[[f32; 2]]) -> f32 {
    let area_a = area(a);
    let area_b = area(b);

    if !(area_a.is_finite() && area_b.is_finite()) || area_a <= 0.0 || area_b <= 0.0 {
        return 0.0;
    }

    let intersection = area(&clip_convex(a, b));
    let union = area_a + area_b - intersection;

    if !intersection.is_finite() || union <= 0.0 {
        return 0.0;
    }

    (intersection / union).clamp(0.0, 1.0)
}
