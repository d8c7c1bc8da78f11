//! Building closed-shape meshes from polylines.
//!
//! The input is an ordered run of points, typically the spine of a stroke.
//! It is treated as implicitly closed (duplicate points and
//! self-intersections allowed), and the region with non-zero winding number
//! is triangulated into a position-only [`Mesh`].

mod planar;

use crate::errors::{GeometryError, GeometryResult};
use crate::geometry::Point;
use crate::mesh::{Mesh, MeshFormat};

/// Constructs a `Mesh` triangulating the interior of `polyline`: the set
/// of points the closed polyline winds around a non-zero number of times.
/// The mesh uses the default position-only `MeshFormat`.
///
/// Every input point appears in the output vertex list at its original
/// index, including duplicates; the triangulation may append additional
/// vertices after them (for example at self-intersection crossings), and
/// not every input vertex is necessarily referenced by a triangle. On
/// success the mesh is guaranteed to be non-empty.
///
/// Returns an `InvalidArgument` error when `polyline` has fewer than three
/// points, and an `Internal` error when no interior exists to triangulate
/// (for example when every point is collinear).
pub fn create_mesh_from_polyline(polyline: &[Point]) -> GeometryResult<Mesh> {
    if polyline.len() < 3 {
        return Err(GeometryError::invalid_argument(format!(
            "Cannot tessellate a polyline with size: {}. The polyline must have \
             at least three points.",
            polyline.len()
        )));
    }
    let triangulation = planar::triangulate_closed_polyline(polyline);
    if triangulation.triangles.is_empty() {
        return Err(GeometryError::internal("Could not tessellate polyline."));
    }

    let mut position_x = Vec::with_capacity(triangulation.vertices.len());
    let mut position_y = Vec::with_capacity(triangulation.vertices.len());
    for vertex in &triangulation.vertices {
        position_x.push(vertex.x);
        position_y.push(vertex.y);
    }
    let indices: Vec<u32> = triangulation
        .triangles
        .iter()
        .flat_map(|t| t.iter().copied())
        .collect();

    Mesh::create(
        &MeshFormat::default(),
        &[&position_x, &position_y],
        &indices,
        &[],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn triangle_set(mesh: &Mesh) -> Vec<[u32; 3]> {
        let mut triangles: Vec<[u32; 3]> = (0..mesh.triangle_count())
            .map(|t| {
                let mut indices = mesh.triangle_indices(t);
                let min_pos = indices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, &v)| v)
                    .map(|(i, _)| i)
                    .unwrap();
                indices.rotate_left(min_pos);
                indices
            })
            .collect();
        triangles.sort();
        triangles
    }

    #[test]
    fn test_rejects_short_polylines() {
        for points in [
            vec![],
            vec![Point::new(0.0, 0.0)],
            vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
        ] {
            let error = create_mesh_from_polyline(&points).unwrap_err();
            assert_eq!(error.code, ErrorCode::InvalidArgument);
            assert!(error.message.contains(&format!("size: {}", points.len())));
        }
    }

    #[test]
    fn test_rejects_collinear_points() {
        let error = create_mesh_from_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 2.0),
            Point::new(2.0, 4.0),
            Point::new(3.0, 6.0),
        ])
        .unwrap_err();
        assert_eq!(error.code, ErrorCode::Internal);
        assert!(error.message.contains("tessellate"));
    }

    #[test]
    fn test_single_triangle() {
        let mesh = create_mesh_from_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ])
        .unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.format(), &MeshFormat::default());
        assert_eq!(mesh.vertex_stride(), 8);
        assert_eq!(mesh.index_stride(), 2);
        assert_eq!(mesh.vertex_position(0), Point::new(0.0, 0.0));
        assert_eq!(mesh.vertex_position(1), Point::new(10.0, 0.0));
        assert_eq!(mesh.vertex_position(2), Point::new(0.0, 10.0));
        // The lone triangle winds counter-clockwise.
        assert!(mesh.get_triangle(0).signed_area() > 0.0);
    }

    #[test]
    fn test_concave_loop() {
        let mesh = create_mesh_from_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 10.0),
        ])
        .unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        for t in 0..2 {
            assert!(mesh.get_triangle(t).signed_area() > 0.0);
        }
        // The triangulated area matches the polygon's.
        let total: f32 = (0..2).map(|t| mesh.get_triangle(t).signed_area()).sum();
        assert!((total - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_preserves_duplicate_points() {
        let mesh = create_mesh_from_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(15.0, 5.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 5.0),
        ])
        .unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
        // The duplicate point is preserved verbatim at its input index.
        assert_eq!(mesh.vertex_position(1), Point::new(10.0, 0.0));
        assert_eq!(mesh.vertex_position(4), Point::new(10.0, 0.0));
        assert_eq!(mesh.vertex_position(3), Point::new(15.0, 5.0));
        assert_eq!(mesh.vertex_position(5), Point::new(5.0, 5.0));
        // Two lobes joined at the duplicated point; triangles reference the
        // first occurrence.
        assert_eq!(triangle_set(&mesh), vec![[0, 1, 5], [1, 2, 3]]);
    }

    #[test]
    fn test_self_intersection_adds_crossing_vertex() {
        let mesh = create_mesh_from_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ])
        .unwrap();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.triangle_count(), 2);
        // The crossing point is appended after the inputs.
        assert_eq!(mesh.vertex_position(4), Point::new(5.0, 5.0));
        assert_eq!(triangle_set(&mesh), vec![[0, 4, 3], [1, 4, 2]]);
    }

    #[test]
    fn test_explicitly_closed_polyline() {
        // A repeated first point adds a zero-length closing edge.
        let mesh = create_mesh_from_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertex_position(3), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_winding_excludes_hole_of_a_loop() {
        // A square ring traced so the inner square has winding zero: outer
        // square counter-clockwise, inner square clockwise, joined by a
        // doubled-back bridge along the x-axis.
        let mesh = create_mesh_from_polyline(&[
            Point::new(-4.0, -4.0),
            Point::new(4.0, -4.0),
            Point::new(4.0, 4.0),
            Point::new(-4.0, 4.0),
            Point::new(-4.0, -4.0),
            Point::new(-2.0, -2.0),
            Point::new(-2.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, -2.0),
            Point::new(-2.0, -2.0),
            Point::new(-4.0, -4.0),
        ])
        .unwrap();
        let total: f32 = (0..mesh.triangle_count())
            .map(|t| mesh.get_triangle(t).signed_area().abs())
            .sum();
        // Outer area 64 minus the winding-zero hole of 16.
        assert!((total - 48.0).abs() < 1e-3);
    }
}
