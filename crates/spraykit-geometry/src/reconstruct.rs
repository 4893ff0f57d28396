//! Point regeneration for trajectories
//!
//! Points are always rebuilt from scratch out of the primitive, the
//! direction flag, the height overrides and the resolution. Nothing is
//! patched incrementally.

use crate::arc::{
    calculate_arc_parameters_from_three_points, calculate_circle_center_radius_from_three_points,
};
use crate::discretize::{discretize_arc, discretize_circle, AngularResolution};
use crate::primitive::Primitive;
use spraykit_core::{GeometryError, Point3D};

/// Height values that override the primitive's own coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeightOverrides {
    /// Uniform Z for every polygon vertex
    pub polygon_z: Option<f64>,
}

/// Regenerated points plus the geometry error absorbed on the way, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub points: Vec<Point3D>,
    pub fallback: Option<GeometryError>,
}

impl Reconstruction {
    fn exact(points: Vec<Point3D>) -> Self {
        Self {
            points,
            fallback: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Materialize the discretized path of a primitive.
///
/// Degenerate arcs degrade to their three raw points and degenerate circles
/// to their three points closed on the first; the error is returned in
/// [`Reconstruction::fallback`] instead of dropping the geometry.
pub fn regenerate_points(
    primitive: &Primitive,
    reversed: bool,
    heights: &HeightOverrides,
    resolution: AngularResolution,
) -> Reconstruction {
    match primitive {
        Primitive::Line { start, end } => {
            if reversed {
                Reconstruction::exact(vec![*end, *start])
            } else {
                Reconstruction::exact(vec![*start, *end])
            }
        }
        Primitive::Arc { p1, p2, p3 } => {
            match calculate_arc_parameters_from_three_points(p1, p2, p3) {
                Ok(arc) => Reconstruction::exact(discretize_arc(&arc, reversed, resolution)),
                Err(err) => {
                    let points = if reversed {
                        vec![*p3, *p2, *p1]
                    } else {
                        vec![*p1, *p2, *p3]
                    };
                    Reconstruction {
                        points,
                        fallback: Some(err),
                    }
                }
            }
        }
        Primitive::Circle { p1, p2, p3 } => {
            match calculate_circle_center_radius_from_three_points(p1, p2, p3) {
                Ok(circle) => {
                    Reconstruction::exact(discretize_circle(&circle, reversed, resolution))
                }
                Err(err) => {
                    let points = if reversed {
                        vec![*p3, *p2, *p1, *p3]
                    } else {
                        vec![*p1, *p2, *p3, *p1]
                    };
                    Reconstruction {
                        points,
                        fallback: Some(err),
                    }
                }
            }
        }
        Primitive::Polygon {
            vertices,
            elevation,
            ..
        } => {
            let z = heights.polygon_z.unwrap_or(*elevation);
            let mut points: Vec<Point3D> = vertices.iter().map(|v| v.with_z(z)).collect();
            if reversed {
                points.reverse();
            }
            Reconstruction::exact(points)
        }
    }
}

/// Regenerates trajectory points and reports absorbed geometry failures
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveReconstructor {
    resolution: AngularResolution,
}

impl PrimitiveReconstructor {
    pub fn new(resolution: AngularResolution) -> Self {
        Self { resolution }
    }

    pub fn resolution(&self) -> AngularResolution {
        self.resolution
    }

    /// Regenerate points, logging when a raw-point fallback was used
    pub fn reconstruct(
        &self,
        primitive: &Primitive,
        reversed: bool,
        heights: &HeightOverrides,
    ) -> Vec<Point3D> {
        let reconstruction = regenerate_points(primitive, reversed, heights, self.resolution);
        if let Some(err) = &reconstruction.fallback {
            tracing::warn!(
                "{} geometry could not be reconstructed, using raw points: {}",
                primitive.kind(),
                err
            );
        }
        reconstruction.points
    }
}
