//! DXF drawing import
//!
//! Reads LINE, ARC, CIRCLE, LWPOLYLINE and POLYLINE entities from the
//! ENTITIES section. Anything else is counted and skipped. Block definitions
//! are in block-local coordinates and are not imported.

use crate::cad::{CadEntity, CadShape};
use anyhow::{Context, Result};
use dxf::entities::{Entity, EntityType};
use dxf::Drawing;
use spraykit_core::Point3D;
use std::path::Path;

/// Entities captured from one drawing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DxfImport {
    pub entities: Vec<CadEntity>,
    /// Number of entities of unsupported types
    pub skipped: usize,
}

impl DxfImport {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Load a DXF file and capture its supported entities
pub fn import_dxf(path: impl AsRef<Path>) -> Result<DxfImport> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open DXF file {}", path.display()))?;
    let drawing = Drawing::load(&mut file).context("Failed to parse DXF file")?;

    let import = entities_from_drawing(&drawing);
    tracing::info!(
        "Imported {} entities from {} ({} skipped)",
        import.entities.len(),
        path.display(),
        import.skipped
    );
    Ok(import)
}

/// Capture the supported entities of an already loaded drawing
pub fn entities_from_drawing(drawing: &Drawing) -> DxfImport {
    let mut import = DxfImport::default();

    for entity in drawing.entities() {
        match shape_from_entity(entity) {
            Some(shape) => import
                .entities
                .push(CadEntity::new(entity.common.layer.clone(), shape)),
            None => {
                tracing::debug!("Skipping unsupported DXF entity on layer {}", entity.common.layer);
                import.skipped += 1;
            }
        }
    }

    let block_entities: usize = drawing.blocks().map(|block| block.entities.len()).sum();
    if block_entities > 0 {
        tracing::debug!("Ignoring {} entities inside block definitions", block_entities);
    }

    import
}

fn to_point(p: &dxf::Point) -> Point3D {
    Point3D::new(p.x, p.y, p.z)
}

fn shape_from_entity(entity: &Entity) -> Option<CadShape> {
    match &entity.specific {
        EntityType::Line(line) => Some(CadShape::Line {
            start: to_point(&line.p1),
            end: to_point(&line.p2),
        }),
        EntityType::Arc(arc) => {
            let center = to_point(&arc.center);
            // Arcs extruded along -Z are stored in a mirrored object frame.
            if arc.normal.z < 0.0 {
                Some(CadShape::Arc {
                    center: Point3D::new(-center.x, center.y, center.z),
                    radius: arc.radius,
                    start_angle_deg: 180.0 - arc.end_angle,
                    end_angle_deg: 180.0 - arc.start_angle,
                })
            } else {
                Some(CadShape::Arc {
                    center,
                    radius: arc.radius,
                    start_angle_deg: arc.start_angle,
                    end_angle_deg: arc.end_angle,
                })
            }
        }
        EntityType::Circle(circle) => {
            let mut center = to_point(&circle.center);
            if circle.normal.z < 0.0 {
                center.x = -center.x;
            }
            Some(CadShape::Circle {
                center,
                radius: circle.radius,
            })
        }
        EntityType::LwPolyline(polyline) => {
            if polyline.vertices.is_empty() {
                return None;
            }
            let elevation = entity.common.elevation;
            let vertices = polyline
                .vertices
                .iter()
                .map(|v| (Point3D::new(v.x, v.y, elevation), v.bulge))
                .collect();
            Some(CadShape::Polyline {
                vertices,
                closed: polyline.flags & 1 != 0,
                elevation,
            })
        }
        EntityType::Polyline(polyline) => {
            let vertices: Vec<(Point3D, f64)> = polyline
                .vertices()
                .map(|v| (to_point(&v.location), v.bulge))
                .collect();
            let elevation = vertices.first().map(|(p, _)| p.z)?;
            Some(CadShape::Polyline {
                vertices,
                closed: polyline.flags & 1 != 0,
                elevation,
            })
        }
        _ => None,
    }
}
