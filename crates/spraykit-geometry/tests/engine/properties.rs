//! Property-based tests for the geometry engine.
//!
//! Run with: cargo test -p spraykit-geometry -- properties

use proptest::prelude::*;
use spraykit_core::Point3D;
use spraykit_geometry::{
    calculate_arc_parameters_from_three_points, calculate_circle_center_radius_from_three_points,
    calculate_min_runtime, calculate_trajectory_length, Primitive, Trajectory,
};

// =============================================================================
// Strategies
// =============================================================================

/// Three well separated points on a circle in the XY plane, counterclockwise.
fn arb_circle_points() -> impl Strategy<Value = (Point3D, f64, [Point3D; 3])> {
    (
        prop::array::uniform2(-1000.0..1000.0f64),
        1.0..500.0f64,
        0.0..std::f64::consts::TAU,
        0.3..2.5f64,
        0.3..2.5f64,
        -50.0..50.0f64,
    )
        .prop_map(|([cx, cy], radius, start, gap1, gap2, z)| {
            let center = Point3D::new(cx, cy, z);
            let at = |angle: f64| {
                Point3D::new(cx + radius * angle.cos(), cy + radius * angle.sin(), z)
            };
            (
                center,
                radius,
                [at(start), at(start + gap1), at(start + gap1 + gap2)],
            )
        })
}

fn arb_point() -> impl Strategy<Value = Point3D> {
    prop::array::uniform3(-500.0..500.0f64).prop_map(|[x, y, z]| Point3D::new(x, y, z))
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn circumcenter_is_equidistant((center, radius, [p1, p2, p3]) in arb_circle_points()) {
        let circle = calculate_circle_center_radius_from_three_points(&p1, &p2, &p3).unwrap();
        prop_assert!(circle.center.approx_eq(&center, 1e-6));
        for p in [p1, p2, p3] {
            prop_assert!((circle.center.distance_to(&p) - radius).abs() < 1e-6);
        }
    }

    #[test]
    fn arc_angles_reproduce_endpoints((_center, _radius, [p1, p2, p3]) in arb_circle_points()) {
        let arc = calculate_arc_parameters_from_three_points(&p1, &p2, &p3).unwrap();
        prop_assert!(!arc.is_clockwise);
        prop_assert!(arc.end_angle > arc.start_angle);
        prop_assert!(arc.point_at(arc.start_angle).approx_eq(&p1, 1e-6));
        prop_assert!(arc.point_at(arc.end_angle).approx_eq(&p3, 1e-6));
    }

    #[test]
    fn double_reversal_restores_points((_center, _radius, [p1, p2, p3]) in arb_circle_points()) {
        for primitive in [
            Primitive::Line { start: p1, end: p3 },
            Primitive::Arc { p1, p2, p3 },
            Primitive::Polygon { vertices: vec![p1, p2, p3], closed: true, elevation: 0.0 },
        ] {
            let mut trajectory = Trajectory::new(primitive);
            let original = trajectory.points().to_vec();
            trajectory.toggle_reversed();
            trajectory.toggle_reversed();
            prop_assert_eq!(trajectory.points(), original.as_slice());
        }
    }

    #[test]
    fn min_runtime_is_half_the_length(start in arb_point(), end in arb_point()) {
        let trajectory = Trajectory::new(Primitive::Line { start, end });
        let length = calculate_trajectory_length(&trajectory);
        let min_runtime = calculate_min_runtime(&trajectory);
        if length > 1e-9 {
            prop_assert!((min_runtime - length / 2.0).abs() < 1e-12);
        } else {
            prop_assert_eq!(min_runtime, 0.0);
        }
    }
}
