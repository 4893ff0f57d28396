//! Three-point arc and circle parametrization
//!
//! Arcs and circles are captured as three points on the curve. Their center,
//! radius and plane are recovered through the circumcenter of the triangle
//! the points span. Angles are measured in a local 2D frame of that plane
//! which depends on the normal alone, so the same three points always give
//! the same parameters.

use nalgebra::Vector3;
use spraykit_core::data::COORDINATE_TOLERANCE;
use spraykit_core::{GeometryError, Point3D};
use std::f64::consts::TAU;

/// Relative cross-product magnitude under which three points count as collinear
const COLLINEAR_EPSILON: f64 = 1e-9;

/// `|normal.z|` above which the normal counts as nearly vertical
const VERTICAL_NORMAL_THRESHOLD: f64 = 0.9;

/// Orthonormal 2D frame spanning the plane of an arc or circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    /// Local X axis
    pub u: Vector3<f64>,
    /// Local Y axis (`normal × u`)
    pub v: Vector3<f64>,
    /// Plane normal
    pub normal: Vector3<f64>,
}

impl LocalFrame {
    /// Build the frame for a unit normal.
    ///
    /// Nearly vertical normals project world X into the plane, all others
    /// project world Z. A +Z normal yields the world XY frame.
    pub fn from_normal(normal: Vector3<f64>) -> Self {
        let reference = if normal.z.abs() > VERTICAL_NORMAL_THRESHOLD {
            Vector3::x()
        } else {
            Vector3::z()
        };
        let u = (reference - normal * normal.dot(&reference)).normalize();
        let v = normal.cross(&u);
        Self { u, v, normal }
    }

    /// Angle of `point` around `center`, measured from `u` towards `v`
    pub fn angle_of(&self, center: &Point3D, point: &Point3D) -> f64 {
        let d = point.to_vector() - center.to_vector();
        d.dot(&self.v).atan2(d.dot(&self.u))
    }

    /// Point on the circle of `radius` around `center` at `angle`
    pub fn point_at(&self, center: &Point3D, radius: f64, angle: f64) -> Point3D {
        let p = center.to_vector() + (self.u * angle.cos() + self.v * angle.sin()) * radius;
        Point3D::from_vector(&p)
    }
}

/// Parameters of an arc through three points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParameters {
    pub center: Point3D,
    pub radius: f64,
    /// Angle of the first point in the local frame (radians)
    pub start_angle: f64,
    /// Angle of the last point in the local frame, always greater than `start_angle`
    pub end_angle: f64,
    /// Unit normal from p1→p2→p3 by the right-hand rule
    pub normal: Vector3<f64>,
    /// Sweep direction as seen from +Z
    pub is_clockwise: bool,
}

impl ArcParameters {
    pub fn frame(&self) -> LocalFrame {
        LocalFrame::from_normal(self.normal)
    }

    /// Angular extent of the arc (radians, positive)
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn point_at(&self, angle: f64) -> Point3D {
        self.frame().point_at(&self.center, self.radius, angle)
    }
}

/// Parameters of a circle through three points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleParameters {
    pub center: Point3D,
    pub radius: f64,
    pub normal: Vector3<f64>,
}

impl CircleParameters {
    pub fn frame(&self) -> LocalFrame {
        LocalFrame::from_normal(self.normal)
    }

    pub fn point_at(&self, angle: f64) -> Point3D {
        self.frame().point_at(&self.center, self.radius, angle)
    }
}

/// Compute center, radius, sweep angles and plane of the arc p1→p2→p3.
///
/// Fails with [`GeometryError::Degenerate`] when two points coincide
/// (per-axis 1e-6) or the points are collinear.
pub fn calculate_arc_parameters_from_three_points(
    p1: &Point3D,
    p2: &Point3D,
    p3: &Point3D,
) -> Result<ArcParameters, GeometryError> {
    let circle = calculate_circle_center_radius_from_three_points(p1, p2, p3)?;
    let frame = circle.frame();

    let start_angle = frame.angle_of(&circle.center, p1);
    let mut end_angle = frame.angle_of(&circle.center, p3);
    // The normal makes p1→p2→p3 counterclockwise in the local frame.
    while end_angle <= start_angle {
        end_angle += TAU;
    }

    Ok(ArcParameters {
        center: circle.center,
        radius: circle.radius,
        start_angle,
        end_angle,
        normal: circle.normal,
        is_clockwise: circle.normal.z < 0.0,
    })
}

/// Compute the circumscribed circle of three points.
pub fn calculate_circle_center_radius_from_three_points(
    p1: &Point3D,
    p2: &Point3D,
    p3: &Point3D,
) -> Result<CircleParameters, GeometryError> {
    for (a, b, label) in [(p1, p2, "p1/p2"), (p2, p3, "p2/p3"), (p1, p3, "p1/p3")] {
        if !a.is_finite() || !b.is_finite() {
            return Err(GeometryError::degenerate("non-finite coordinate"));
        }
        if a.approx_eq(b, COORDINATE_TOLERANCE) {
            return Err(GeometryError::degenerate(format!(
                "points {} coincide",
                label
            )));
        }
    }

    let a = p1.to_vector() - p3.to_vector();
    let b = p2.to_vector() - p3.to_vector();
    let axb = a.cross(&b);
    let area = axb.norm();
    if area <= COLLINEAR_EPSILON * a.norm() * b.norm() {
        return Err(GeometryError::degenerate("points are collinear"));
    }

    let offset = (b * a.norm_squared() - a * b.norm_squared()).cross(&axb)
        / (2.0 * axb.norm_squared());
    let center = p3.to_vector() + offset;
    let radius = (p1.to_vector() - center).norm();

    let normal = (p2.to_vector() - p1.to_vector())
        .cross(&(p3.to_vector() - p1.to_vector()))
        .normalize();

    Ok(CircleParameters {
        center: Point3D::from_vector(&center),
        radius,
        normal,
    })
}
