//! Parametric primitives underlying spray trajectories

use crate::polygon;
use serde::{Deserialize, Serialize};
use spraykit_core::Point3D;
use std::fmt;

/// Kind of a [`Primitive`], without its geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Line,
    Arc,
    Circle,
    Polygon,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => write!(f, "Line"),
            Self::Arc => write!(f, "Arc"),
            Self::Circle => write!(f, "Circle"),
            Self::Polygon => write!(f, "Polygon"),
        }
    }
}

/// One parametric shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    Line {
        start: Point3D,
        end: Point3D,
    },
    /// Start, a point on the arc, end
    Arc {
        p1: Point3D,
        p2: Point3D,
        p3: Point3D,
    },
    /// Three points on the circumference
    Circle {
        p1: Point3D,
        p2: Point3D,
        p3: Point3D,
    },
    Polygon {
        vertices: Vec<Point3D>,
        closed: bool,
        elevation: f64,
    },
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Line { .. } => PrimitiveKind::Line,
            Self::Arc { .. } => PrimitiveKind::Arc,
            Self::Circle { .. } => PrimitiveKind::Circle,
            Self::Polygon { .. } => PrimitiveKind::Polygon,
        }
    }

    /// Geometry in traversal order.
    ///
    /// Lines swap their endpoints, arcs and circles swap p1 and p3 around a
    /// fixed p2, polygons reverse their vertex list.
    pub fn directed(&self, reversed: bool) -> Primitive {
        if !reversed {
            return self.clone();
        }
        match self {
            Self::Line { start, end } => Self::Line {
                start: *end,
                end: *start,
            },
            Self::Arc { p1, p2, p3 } => Self::Arc {
                p1: *p3,
                p2: *p2,
                p3: *p1,
            },
            Self::Circle { p1, p2, p3 } => Self::Circle {
                p1: *p3,
                p2: *p2,
                p3: *p1,
            },
            Self::Polygon {
                vertices,
                closed,
                elevation,
            } => Self::Polygon {
                vertices: vertices.iter().rev().copied().collect(),
                closed: *closed,
                elevation: *elevation,
            },
        }
    }

    /// Whether the primitive is a polygon with a closing edge
    pub fn is_closed_loop(&self) -> bool {
        match self {
            Self::Polygon {
                vertices, closed, ..
            } => polygon::has_closing_edge(vertices.len(), *closed),
            _ => false,
        }
    }

    /// Number of device primitives this shape encodes to
    pub fn primitive_count(&self) -> usize {
        match self {
            Self::Polygon {
                vertices, closed, ..
            } => polygon::segment_count(vertices.len(), *closed),
            _ => 1,
        }
    }

    /// Defining points of the primitive
    pub fn defining_points(&self) -> Vec<Point3D> {
        match self {
            Self::Line { start, end } => vec![*start, *end],
            Self::Arc { p1, p2, p3 } | Self::Circle { p1, p2, p3 } => vec![*p1, *p2, *p3],
            Self::Polygon { vertices, .. } => vertices.clone(),
        }
    }

    /// Geometric equivalence in the XY plane.
    ///
    /// Heights are operator overrides and are ignored, so a trajectory whose
    /// Z was edited still matches the drawing entity it came from.
    pub fn approx_eq(&self, other: &Primitive, tolerance: f64) -> bool {
        match (self, other) {
            (
                Self::Polygon {
                    vertices: a,
                    closed: closed_a,
                    ..
                },
                Self::Polygon {
                    vertices: b,
                    closed: closed_b,
                    ..
                },
            ) => {
                closed_a == closed_b
                    && a.len() == b.len()
                    && a.iter().zip(b).all(|(p, q)| p.approx_eq_xy(q, tolerance))
            }
            _ if self.kind() == other.kind() => self
                .defining_points()
                .iter()
                .zip(other.defining_points().iter())
                .all(|(p, q)| p.approx_eq_xy(q, tolerance)),
            _ => false,
        }
    }
}

/// Index of the first candidate geometrically equivalent to `primitive`
pub fn find_matching_primitive(
    candidates: &[Primitive],
    primitive: &Primitive,
    tolerance: f64,
) -> Option<usize> {
    candidates
        .iter()
        .position(|candidate| candidate.approx_eq(primitive, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc() -> Primitive {
        Primitive::Arc {
            p1: Point3D::xy(10.0, 0.0),
            p2: Point3D::xy(0.0, 10.0),
            p3: Point3D::xy(-10.0, 0.0),
        }
    }

    #[test]
    fn test_directed_arc_keeps_midpoint() {
        let Primitive::Arc { p1, p2, p3 } = arc().directed(true) else {
            panic!("expected an arc");
        };
        assert_eq!(p1, Point3D::xy(-10.0, 0.0));
        assert_eq!(p2, Point3D::xy(0.0, 10.0));
        assert_eq!(p3, Point3D::xy(10.0, 0.0));
        assert_eq!(arc().directed(true).directed(true), arc());
    }

    #[test]
    fn test_primitive_count() {
        let closed = Primitive::Polygon {
            vertices: vec![
                Point3D::xy(0.0, 0.0),
                Point3D::xy(1.0, 0.0),
                Point3D::xy(1.0, 1.0),
            ],
            closed: true,
            elevation: 0.0,
        };
        assert_eq!(closed.primitive_count(), 3);
        assert!(closed.is_closed_loop());
        assert_eq!(arc().primitive_count(), 1);
    }

    #[test]
    fn test_matching_ignores_height() {
        let edited = Primitive::Line {
            start: Point3D::new(0.0, 0.0, 25.0),
            end: Point3D::new(100.0, 0.0, 25.0),
        };
        let drawing = vec![
            arc(),
            Primitive::Line {
                start: Point3D::xy(0.0, 0.0),
                end: Point3D::xy(100.0, 0.0),
            },
        ];
        assert_eq!(find_matching_primitive(&drawing, &edited, 1e-6), Some(1));
        assert_eq!(
            find_matching_primitive(&drawing, &edited.directed(true), 1e-6),
            None
        );
    }

    #[test]
    fn test_kind_mismatch_never_matches() {
        let Primitive::Arc { p1, p2, p3 } = arc() else {
            unreachable!()
        };
        let circle = Primitive::Circle { p1, p2, p3 };
        assert!(!circle.approx_eq(&arc(), 1.0));
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_value(arc()).unwrap();
        assert_eq!(json["kind"], "arc");
        let back: Primitive = serde_json::from_value(json).unwrap();
        assert_eq!(back, arc());
    }
}
