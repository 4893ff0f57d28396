use approx::assert_relative_eq;
use spraykit_core::Point3D;
use spraykit_geometry::{
    expand_bulge_polyline, regenerate_points, AngularResolution, BulgeSegment, HeightEdit,
    HeightOverrides, Primitive, Trajectory,
};

#[test]
fn test_unit_circle_discretization() {
    let circle = Primitive::Circle {
        p1: Point3D::xy(1.0, 0.0),
        p2: Point3D::xy(0.0, 1.0),
        p3: Point3D::xy(-1.0, 0.0),
    };
    let reconstruction = regenerate_points(
        &circle,
        false,
        &HeightOverrides::default(),
        AngularResolution::from_degrees(15.0),
    );

    assert!(!reconstruction.is_fallback());
    assert_eq!(reconstruction.points.len(), 25);
    assert_eq!(reconstruction.points[0], reconstruction.points[24]);
    for p in &reconstruction.points {
        assert_relative_eq!(p.distance_to(&Point3D::ORIGIN), 1.0, epsilon = 1e-9);
    }
    // Second point sits 15 degrees counterclockwise from the first
    assert_relative_eq!(reconstruction.points[1].x, 15f64.to_radians().cos(), epsilon = 1e-12);
    assert_relative_eq!(reconstruction.points[1].y, 15f64.to_radians().sin(), epsilon = 1e-12);
}

#[test]
fn test_reversed_circle_walks_clockwise() {
    let circle = Primitive::Circle {
        p1: Point3D::xy(1.0, 0.0),
        p2: Point3D::xy(0.0, 1.0),
        p3: Point3D::xy(-1.0, 0.0),
    };
    let points = regenerate_points(
        &circle,
        true,
        &HeightOverrides::default(),
        AngularResolution::default(),
    )
    .points;
    assert_eq!(points.len(), 25);
    assert!(points[1].y < 0.0);
}

#[test]
fn test_arc_ends_on_exact_endpoint() {
    // 100 degree arc does not divide evenly by 15 degrees
    let radius = 50.0;
    let end = 100f64.to_radians();
    let arc = Primitive::Arc {
        p1: Point3D::xy(radius, 0.0),
        p2: Point3D::xy(radius * (end / 2.0).cos(), radius * (end / 2.0).sin()),
        p3: Point3D::xy(radius * end.cos(), radius * end.sin()),
    };
    let trajectory = Trajectory::new(arc);
    let points = trajectory.points();

    assert_eq!(points.len(), 8);
    assert!(points[0].approx_eq(&Point3D::xy(radius, 0.0), 1e-9));
    assert!(points[7].approx_eq(&Point3D::xy(radius * end.cos(), radius * end.sin()), 1e-9));
}

#[test]
fn test_bulge_segments() {
    let start = Point3D::xy(0.0, 0.0);
    let end = Point3D::xy(20.0, 0.0);

    let straight = BulgeSegment::from_vertices(start, end, 0.0);
    assert_eq!(straight.points(AngularResolution::default()).len(), 2);

    let BulgeSegment::Arc(half) = BulgeSegment::from_vertices(start, end, 1.0) else {
        panic!("expected an arc segment");
    };
    assert_relative_eq!(half.included_angle(), std::f64::consts::PI, epsilon = 1e-12);
    assert_relative_eq!(half.radius, 10.0, epsilon = 1e-12);
}

#[test]
fn test_rounded_polyline_length() {
    // Slot: two straight edges joined by two semicircles of radius 5
    let vertices = vec![
        (Point3D::xy(0.0, 0.0), 0.0),
        (Point3D::xy(40.0, 0.0), 1.0),
        (Point3D::xy(40.0, 10.0), 0.0),
        (Point3D::xy(0.0, 10.0), 1.0),
    ];
    let points = expand_bulge_polyline(&vertices, true, AngularResolution::from_degrees(1.0));
    let trajectory = Trajectory::new(Primitive::Polygon {
        vertices: points,
        closed: true,
        elevation: 0.0,
    });

    let expected_mm = 80.0 + 2.0 * std::f64::consts::PI * 5.0;
    assert_relative_eq!(trajectory.length_m() * 1000.0, expected_mm, max_relative = 1e-3);
}

#[test]
fn test_height_edits_regenerate_arc() {
    let mut trajectory = Trajectory::new(Primitive::Arc {
        p1: Point3D::xy(10.0, 0.0),
        p2: Point3D::xy(0.0, 10.0),
        p3: Point3D::xy(-10.0, 0.0),
    });
    trajectory.apply_height(HeightEdit::Uniform, 75.0).unwrap();
    assert!(trajectory.points().iter().all(|p| (p.z - 75.0).abs() < 1e-9));
    assert!(trajectory.apply_height(HeightEdit::LineStart, 1.0).is_err());
}
