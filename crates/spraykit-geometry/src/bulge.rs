//! Bulge-encoded polyline segments
//!
//! A DXF polyline vertex carries a bulge: the tangent of a quarter of the
//! included angle of the arc running to the next vertex. Positive bulges
//! sweep counterclockwise, negative ones clockwise, zero is a straight edge.

use crate::discretize::AngularResolution;
use spraykit_core::Point3D;

/// Bulges below this magnitude are straight segments
pub const BULGE_EPSILON: f64 = 1e-3;

/// Chords shorter than this cannot carry an arc
pub const MIN_CHORD_LENGTH: f64 = 1e-3;

/// Arc recovered from a bulge, in the XY plane at the start vertex height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulgeArc {
    pub start: Point3D,
    pub end: Point3D,
    pub center: Point3D,
    pub radius: f64,
    /// Angle of `start` around `center` (radians)
    pub start_angle: f64,
    /// Signed sweep; positive is counterclockwise
    pub sweep: f64,
}

impl BulgeArc {
    /// Included angle of the arc (radians, positive)
    pub fn included_angle(&self) -> f64 {
        self.sweep.abs()
    }

    pub fn is_counterclockwise(&self) -> bool {
        self.sweep > 0.0
    }
}

/// One polyline edge between two vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BulgeSegment {
    Straight { start: Point3D, end: Point3D },
    Arc(BulgeArc),
}

impl BulgeSegment {
    /// Interpret the edge `start → end` with the bulge stored on `start`.
    pub fn from_vertices(start: Point3D, end: Point3D, bulge: f64) -> Self {
        let chord = start.distance_xy(&end);
        if !bulge.is_finite() || bulge.abs() < BULGE_EPSILON || chord < MIN_CHORD_LENGTH {
            return Self::Straight { start, end };
        }

        let magnitude = bulge.abs();
        let included = 4.0 * magnitude.atan();
        let radius = chord * (1.0 + bulge * bulge) / (4.0 * magnitude);

        // Signed distance from the chord midpoint to the center, towards the
        // left of the chord for counterclockwise arcs.
        let apothem = radius * (1.0 - bulge * bulge) / (1.0 + bulge * bulge);
        let side = bulge.signum();
        let dx = (end.x - start.x) / chord;
        let dy = (end.y - start.y) / chord;
        let mid_x = (start.x + end.x) / 2.0;
        let mid_y = (start.y + end.y) / 2.0;
        let center = Point3D::new(
            mid_x - dy * apothem * side,
            mid_y + dx * apothem * side,
            start.z,
        );

        let start_angle = (start.y - center.y).atan2(start.x - center.x);

        Self::Arc(BulgeArc {
            start,
            end,
            center,
            radius,
            start_angle,
            sweep: included * side,
        })
    }

    pub fn start(&self) -> Point3D {
        match self {
            Self::Straight { start, .. } => *start,
            Self::Arc(arc) => arc.start,
        }
    }

    pub fn end(&self) -> Point3D {
        match self {
            Self::Straight { end, .. } => *end,
            Self::Arc(arc) => arc.end,
        }
    }

    pub fn is_arc(&self) -> bool {
        matches!(self, Self::Arc(_))
    }

    /// Points along the segment, both endpoints included.
    pub fn points(&self, resolution: AngularResolution) -> Vec<Point3D> {
        match self {
            Self::Straight { start, end } => vec![*start, *end],
            Self::Arc(arc) => {
                let steps = resolution.step_count(arc.sweep);
                let step = resolution.radians() * arc.sweep.signum();
                let mut points = Vec::with_capacity(steps + 1);
                points.push(arc.start);
                for k in 1..steps {
                    let angle = arc.start_angle + k as f64 * step;
                    points.push(Point3D::new(
                        arc.center.x + arc.radius * angle.cos(),
                        arc.center.y + arc.radius * angle.sin(),
                        arc.start.z,
                    ));
                }
                points.push(arc.end);
                points
            }
        }
    }
}

/// Expand a bulge polyline into a plain vertex list.
///
/// Each vertex carries the bulge of the edge leaving it. Closed polylines
/// also expand the edge from the last vertex back to the first, without
/// repeating the first vertex at the end.
pub fn expand_bulge_polyline(
    vertices: &[(Point3D, f64)],
    closed: bool,
    resolution: AngularResolution,
) -> Vec<Point3D> {
    let count = vertices.len();
    if count < 2 {
        return vertices.iter().map(|(p, _)| *p).collect();
    }

    let edge_count = if closed { count } else { count - 1 };
    let mut expanded = Vec::with_capacity(count);
    for i in 0..edge_count {
        let (start, bulge) = vertices[i];
        let (end, _) = vertices[(i + 1) % count];
        let segment_points = BulgeSegment::from_vertices(start, end, bulge).points(resolution);
        // The end vertex is pushed by the next edge, or below for open polylines.
        expanded.extend_from_slice(&segment_points[..segment_points.len() - 1]);
    }
    if !closed {
        expanded.push(vertices[count - 1].0);
    }
    expanded
}
