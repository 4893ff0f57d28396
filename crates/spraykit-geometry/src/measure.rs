//! Path length and runtime limits

use crate::trajectory::Trajectory;
use spraykit_core::{mm_to_m, Point3D, REFERENCE_SPEED_M_PER_S};

/// Lengths at or below this (meters) count as zero
pub const LENGTH_EPSILON_M: f64 = 1e-9;

/// Sum of distances between consecutive points, in millimeters.
///
/// `closed` adds the edge from the last point back to the first when there
/// are at least three points.
pub fn path_length_mm(points: &[Point3D], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let open: f64 = points.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
    match (closed && points.len() > 2, points.first(), points.last()) {
        (true, Some(first), Some(last)) => open + last.distance_to(first),
        _ => open,
    }
}

/// Length of the trajectory's discretized path in meters
pub fn calculate_trajectory_length(trajectory: &Trajectory) -> f64 {
    mm_to_m(path_length_mm(
        trajectory.points(),
        trajectory.primitive().is_closed_loop(),
    ))
}

/// Shortest runtime the robot can execute for a path of `length_m` meters
pub fn min_runtime_for_length(length_m: f64) -> f64 {
    if length_m <= LENGTH_EPSILON_M {
        0.0
    } else {
        length_m / REFERENCE_SPEED_M_PER_S
    }
}

/// Minimum runtime of a trajectory in seconds
pub fn calculate_min_runtime(trajectory: &Trajectory) -> f64 {
    min_runtime_for_length(calculate_trajectory_length(trajectory))
}
