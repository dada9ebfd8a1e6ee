//! Shared 3D sample geometry.
//!
//! Trajectory histories arrive from the host as `Option<Point3<f64>>` per
//! frame; `None` marks a frame where the tracker lost the marker. Absent
//! samples are skipped, never substituted with the origin.

use nalgebra::Point3;

/// Euclidean distance between two sample positions.
#[inline]
pub fn distance(p: &Point3<f64>, q: &Point3<f64>) -> f64 {
    (p - q).norm()
}

/// Iterates the present samples of a history, keeping their frame indices.
pub fn present(
    history: &[Option<Point3<f64>>],
) -> impl Iterator<Item = (usize, &Point3<f64>)> {
    history
        .iter()
        .enumerate()
        .filter_map(|(frame, sample)| sample.as_ref().map(|p| (frame, p)))
}
