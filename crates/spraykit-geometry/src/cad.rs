//! Drawing entities and their normalization into primitives
//!
//! Drawings describe arcs by center and angles and polylines by bulges. The
//! rest of the pipeline only knows three-point arcs and circles and plain
//! vertex lists, so every entity is normalized once when it is captured.

use crate::bulge::expand_bulge_polyline;
use crate::discretize::AngularResolution;
use crate::polygon::rotate_to_nearest_origin;
use crate::primitive::Primitive;
use spraykit_core::Point3D;

/// Geometry of a drawing entity as stored in the source file
#[derive(Debug, Clone, PartialEq)]
pub enum CadShape {
    Line {
        start: Point3D,
        end: Point3D,
    },
    /// Counterclockwise from `start_angle_deg` to `end_angle_deg` in the XY plane
    Arc {
        center: Point3D,
        radius: f64,
        start_angle_deg: f64,
        end_angle_deg: f64,
    },
    Circle {
        center: Point3D,
        radius: f64,
    },
    /// Each vertex carries the bulge of the edge leaving it
    Polyline {
        vertices: Vec<(Point3D, f64)>,
        closed: bool,
        elevation: f64,
    },
}

/// A drawing entity with the layer it was drawn on
#[derive(Debug, Clone, PartialEq)]
pub struct CadEntity {
    pub layer: String,
    pub shape: CadShape,
}

impl CadEntity {
    pub fn new(layer: impl Into<String>, shape: CadShape) -> Self {
        Self {
            layer: layer.into(),
            shape,
        }
    }

    /// Short type name used in listings
    pub fn type_name(&self) -> &'static str {
        match self.shape {
            CadShape::Line { .. } => "line",
            CadShape::Arc { .. } => "arc",
            CadShape::Circle { .. } => "circle",
            CadShape::Polyline { .. } => "polyline",
        }
    }

    pub fn normalize(&self, resolution: AngularResolution) -> Primitive {
        normalize(&self.shape, resolution)
    }
}

fn point_on_circle(center: &Point3D, radius: f64, angle_deg: f64) -> Point3D {
    let angle = angle_deg.to_radians();
    Point3D::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
        center.z,
    )
}

/// Sweep of a counterclockwise arc in degrees, in `(0, 360]`
pub fn arc_sweep_deg(start_angle_deg: f64, end_angle_deg: f64) -> f64 {
    let sweep = (end_angle_deg - start_angle_deg).rem_euclid(360.0);
    if sweep <= f64::EPSILON {
        360.0
    } else {
        sweep
    }
}

/// Convert a drawing shape to a primitive.
///
/// Arcs become start, mid-sweep and end points. Circles become three points
/// 120° apart starting at angle 0. Polylines have their bulges expanded and,
/// when closed, start at the vertex nearest the origin.
pub fn normalize(shape: &CadShape, resolution: AngularResolution) -> Primitive {
    match shape {
        CadShape::Line { start, end } => Primitive::Line {
            start: *start,
            end: *end,
        },
        CadShape::Arc {
            center,
            radius,
            start_angle_deg,
            end_angle_deg,
        } => {
            let sweep = arc_sweep_deg(*start_angle_deg, *end_angle_deg);
            Primitive::Arc {
                p1: point_on_circle(center, *radius, *start_angle_deg),
                p2: point_on_circle(center, *radius, start_angle_deg + sweep / 2.0),
                p3: point_on_circle(center, *radius, start_angle_deg + sweep),
            }
        }
        CadShape::Circle { center, radius } => Primitive::Circle {
            p1: point_on_circle(center, *radius, 0.0),
            p2: point_on_circle(center, *radius, 120.0),
            p3: point_on_circle(center, *radius, 240.0),
        },
        CadShape::Polyline {
            vertices,
            closed,
            elevation,
        } => {
            let flattened: Vec<(Point3D, f64)> = vertices
                .iter()
                .map(|(p, bulge)| (p.with_z(*elevation), *bulge))
                .collect();
            let mut points = expand_bulge_polyline(&flattened, *closed, resolution);
            if *closed {
                rotate_to_nearest_origin(&mut points);
            }
            Primitive::Polygon {
                vertices: points,
                closed: *closed,
                elevation: *elevation,
            }
        }
    }
}

/// Normalize every entity of a drawing, in drawing order
pub fn normalize_all(entities: &[CadEntity], resolution: AngularResolution) -> Vec<Primitive> {
    entities
        .iter()
        .map(|entity| entity.normalize(resolution))
        .collect()
}
