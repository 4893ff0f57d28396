//! Arc and circle discretization
//!
//! Curves become polylines by walking a fixed angular step through the local
//! frame of their plane. The same step is used for arcs, circles and the arc
//! segments of bulge polylines.

use crate::arc::{ArcParameters, CircleParameters};
use serde::{Deserialize, Serialize};
use spraykit_core::data::COORDINATE_TOLERANCE;
use spraykit_core::Point3D;
use std::f64::consts::TAU;

/// Default angular step between generated points (degrees)
pub const DEFAULT_RESOLUTION_DEG: f64 = 15.0;

/// Finest accepted angular step (degrees)
pub const MIN_RESOLUTION_DEG: f64 = 0.1;

/// Angular step used when walking arcs and circles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct AngularResolution(f64);

impl AngularResolution {
    /// Create a resolution from a step in degrees.
    ///
    /// Non-finite steps and steps below [`MIN_RESOLUTION_DEG`] fall back to
    /// the default.
    pub fn from_degrees(degrees: f64) -> Self {
        if degrees.is_finite() && degrees >= MIN_RESOLUTION_DEG {
            Self(degrees.min(180.0))
        } else {
            Self::default()
        }
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }

    pub fn radians(&self) -> f64 {
        self.0.to_radians()
    }

    /// Number of steps needed to cover `sweep` radians (at least one)
    pub fn step_count(&self, sweep: f64) -> usize {
        let steps = (sweep.abs() / self.radians() - 1e-9).ceil();
        if steps.is_finite() && steps >= 1.0 {
            steps as usize
        } else {
            1
        }
    }
}

impl Default for AngularResolution {
    fn default() -> Self {
        Self(DEFAULT_RESOLUTION_DEG)
    }
}

impl From<f64> for AngularResolution {
    fn from(degrees: f64) -> Self {
        Self::from_degrees(degrees)
    }
}

impl From<AngularResolution> for f64 {
    fn from(resolution: AngularResolution) -> Self {
        resolution.0
    }
}

/// Walk an arc from start to end angle.
///
/// The last point sits at the exact end angle even when it falls between
/// steps. Reversed arcs walk the same parameters from end back to start.
pub fn discretize_arc(
    arc: &ArcParameters,
    reversed: bool,
    resolution: AngularResolution,
) -> Vec<Point3D> {
    let frame = arc.frame();
    let steps = resolution.step_count(arc.sweep());
    let step = resolution.radians();

    let (from, to, direction) = if reversed {
        (arc.end_angle, arc.start_angle, -1.0)
    } else {
        (arc.start_angle, arc.end_angle, 1.0)
    };

    let mut points = Vec::with_capacity(steps + 1);
    for k in 0..steps {
        let angle = from + direction * k as f64 * step;
        points.push(frame.point_at(&arc.center, arc.radius, angle));
    }
    points.push(frame.point_at(&arc.center, arc.radius, to));
    points
}

/// Walk a full circle from local angle 0, closing on the first point.
pub fn discretize_circle(
    circle: &CircleParameters,
    reversed: bool,
    resolution: AngularResolution,
) -> Vec<Point3D> {
    let frame = circle.frame();
    let steps = resolution.step_count(TAU);
    let step = resolution.radians();
    let direction = if reversed { -1.0 } else { 1.0 };

    let mut points: Vec<Point3D> = (0..steps)
        .map(|k| frame.point_at(&circle.center, circle.radius, direction * k as f64 * step))
        .collect();

    close_loop(&mut points);
    points
}

/// Append a copy of the first point unless the path already ends on it
pub fn close_loop(points: &mut Vec<Point3D>) {
    if let (Some(first), Some(last)) = (points.first().copied(), points.last()) {
        if !last.approx_eq(&first, COORDINATE_TOLERANCE) {
            points.push(first);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::{
        calculate_arc_parameters_from_three_points,
        calculate_circle_center_radius_from_three_points,
    };
    use std::f64::consts::PI;

    fn unit_circle() -> CircleParameters {
        calculate_circle_center_radius_from_three_points(
            &Point3D::xy(1.0, 0.0),
            &Point3D::xy((2.0 * PI / 3.0).cos(), (2.0 * PI / 3.0).sin()),
            &Point3D::xy((4.0 * PI / 3.0).cos(), (4.0 * PI / 3.0).sin()),
        )
        .unwrap()
    }

    #[test]
    fn test_step_count() {
        let res = AngularResolution::default();
        assert_eq!(res.step_count(TAU), 24);
        assert_eq!(res.step_count(PI / 2.0), 6);
        assert_eq!(res.step_count(0.1_f64.to_radians()), 1);
        assert_eq!(res.step_count(16.0_f64.to_radians()), 2);
    }

    #[test]
    fn test_invalid_resolution_falls_back() {
        assert_eq!(AngularResolution::from_degrees(0.0).degrees(), 15.0);
        assert_eq!(AngularResolution::from_degrees(f64::NAN).degrees(), 15.0);
        assert_eq!(AngularResolution::from_degrees(5.0).degrees(), 5.0);
        assert_eq!(AngularResolution::from_degrees(1e-12).degrees(), 15.0);
        assert_eq!(
            AngularResolution::from_degrees(MIN_RESOLUTION_DEG).degrees(),
            MIN_RESOLUTION_DEG
        );
    }

    #[test]
    fn test_deserialize_applies_bounds() {
        let resolution: AngularResolution = serde_json::from_str("1e-12").unwrap();
        assert_eq!(resolution, AngularResolution::default());
        let resolution: AngularResolution = serde_json::from_str("7.5").unwrap();
        assert_eq!(resolution.degrees(), 7.5);
        assert_eq!(serde_json::to_string(&resolution).unwrap(), "7.5");
    }

    #[test]
    fn test_unit_circle_has_24_points_plus_closing() {
        let circle = unit_circle();
        let points = discretize_circle(&circle, false, AngularResolution::default());
        assert_eq!(points.len(), 25);
        assert_eq!(points[24], points[0]);
        for p in &points {
            assert!((p.distance_to(&Point3D::ORIGIN) - 1.0).abs() < 1e-6);
        }
        // Counterclockwise from local X
        assert!(points[0].approx_eq(&Point3D::xy(1.0, 0.0), 1e-9));
        assert!(points[6].approx_eq(&Point3D::xy(0.0, 1.0), 1e-9));
    }

    #[test]
    fn test_reversed_circle_walks_clockwise() {
        let circle = unit_circle();
        let points = discretize_circle(&circle, true, AngularResolution::default());
        assert_eq!(points.len(), 25);
        assert!(points[6].approx_eq(&Point3D::xy(0.0, -1.0), 1e-9));
    }

    #[test]
    fn test_arc_ends_on_exact_end_angle() {
        // 100 degree arc does not land on a 15 degree boundary
        let end = 100.0_f64.to_radians();
        let mid = 50.0_f64.to_radians();
        let arc = calculate_arc_parameters_from_three_points(
            &Point3D::xy(10.0, 0.0),
            &Point3D::xy(10.0 * mid.cos(), 10.0 * mid.sin()),
            &Point3D::xy(10.0 * end.cos(), 10.0 * end.sin()),
        )
        .unwrap();

        let points = discretize_arc(&arc, false, AngularResolution::default());
        assert_eq!(points.len(), 8);
        assert!(points[0].approx_eq(&Point3D::xy(10.0, 0.0), 1e-9));
        assert!(points[7].approx_eq(&Point3D::xy(10.0 * end.cos(), 10.0 * end.sin()), 1e-9));
    }

    #[test]
    fn test_reversed_arc_walks_back_from_end() {
        let arc = calculate_arc_parameters_from_three_points(
            &Point3D::xy(10.0, 0.0),
            &Point3D::xy(0.0, 10.0),
            &Point3D::xy(-10.0, 0.0),
        )
        .unwrap();

        let forward = discretize_arc(&arc, false, AngularResolution::default());
        let backward = discretize_arc(&arc, true, AngularResolution::default());
        assert_eq!(forward.len(), backward.len());
        assert!(backward[0].approx_eq(&Point3D::xy(-10.0, 0.0), 1e-9));
        assert!(backward.last().unwrap().approx_eq(&Point3D::xy(10.0, 0.0), 1e-9));
        for (a, b) in forward.iter().zip(backward.iter().rev()) {
            assert!(a.approx_eq(b, 1e-9));
        }
    }
}
