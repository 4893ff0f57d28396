//! Polygon vertex helpers
//!
//! Spray polygons are sent to the device as one line per edge, so most of
//! the work here is about edges: counting them, walking them and measuring
//! them.

use spraykit_core::Point3D;

/// Rotate a closed polygon so the vertex nearest the origin comes first.
///
/// Distance is measured in the XY plane; ties keep the earliest vertex.
/// Relative vertex order is preserved.
pub fn rotate_to_nearest_origin(vertices: &mut [Point3D]) {
    let nearest = vertices
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |best, (i, p)| {
            let d = p.distance_xy(&Point3D::ORIGIN);
            match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((i, d)),
            }
        });

    if let Some((index, _)) = nearest {
        vertices.rotate_left(index);
    }
}

/// Whether a polygon has a closing edge from its last vertex back to the first
pub fn has_closing_edge(vertex_count: usize, closed: bool) -> bool {
    closed && vertex_count > 2
}

/// Number of line edges a polygon contributes to a program
pub fn segment_count(vertex_count: usize, closed: bool) -> usize {
    vertex_count.saturating_sub(1) + usize::from(has_closing_edge(vertex_count, closed))
}

/// Consecutive vertex pairs, plus the closing pair when applicable
pub fn segments(vertices: &[Point3D], closed: bool) -> Vec<(Point3D, Point3D)> {
    let mut edges: Vec<(Point3D, Point3D)> =
        vertices.windows(2).map(|w| (w[0], w[1])).collect();
    if has_closing_edge(vertices.len(), closed) {
        edges.push((vertices[vertices.len() - 1], vertices[0]));
    }
    edges
}

/// Total edge length in millimeters
pub fn perimeter_mm(vertices: &[Point3D], closed: bool) -> f64 {
    segments(vertices, closed)
        .iter()
        .map(|(a, b)| a.distance_to(b))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point3D> {
        vec![
            Point3D::xy(10.0, 10.0),
            Point3D::xy(20.0, 10.0),
            Point3D::xy(20.0, 20.0),
            Point3D::xy(10.0, 20.0),
        ]
    }

    #[test]
    fn test_rotation_keeps_order() {
        let mut vertices = vec![
            Point3D::xy(20.0, 20.0),
            Point3D::xy(10.0, 20.0),
            Point3D::xy(10.0, 10.0),
            Point3D::xy(20.0, 10.0),
        ];
        rotate_to_nearest_origin(&mut vertices);
        assert_eq!(vertices, square());
    }

    #[test]
    fn test_rotation_tie_keeps_first() {
        let mut vertices = vec![
            Point3D::xy(5.0, 0.0),
            Point3D::xy(0.0, 5.0),
            Point3D::xy(-5.0, 0.0),
        ];
        let original = vertices.clone();
        rotate_to_nearest_origin(&mut vertices);
        assert_eq!(vertices, original);
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count(0, true), 0);
        assert_eq!(segment_count(1, true), 0);
        assert_eq!(segment_count(2, true), 1);
        assert_eq!(segment_count(3, false), 2);
        assert_eq!(segment_count(3, true), 3);
        assert_eq!(segment_count(4, true), 4);
    }

    #[test]
    fn test_segments_and_perimeter() {
        let vertices = square();
        let open = segments(&vertices, false);
        assert_eq!(open.len(), 3);
        let closed = segments(&vertices, true);
        assert_eq!(closed.len(), 4);
        assert_eq!(closed[3], (vertices[3], vertices[0]));
        assert_eq!(perimeter_mm(&vertices, true), 40.0);
        assert_eq!(perimeter_mm(&vertices, false), 30.0);
    }
}
