//! Mesh generators shared by tests.

use super::format::{AttributeId, AttributeType, IndexFormat, MeshFormat};
use super::mutable::MutableMesh;
use super::partitioned::PartitionedMesh;
use crate::geometry::{Angle, Point, Vec2};

/// A format with a single packed-position attribute and 32-bit unpacked
/// indices.
pub(crate) fn single_packed_position_format() -> MeshFormat {
    MeshFormat::new(
        &[(AttributeType::Float2PackedInOneFloat, AttributeId::Position)],
        IndexFormat::Unpacked32Packed16,
    )
    .unwrap()
}

/// A straight triangle-strip mesh along the x-axis:
///
/// ```text
///     0-----2-----4  ...
///      \ A / \ C /
///       \ / B \ /
///        1-----3  ...
/// ```
///
/// Vertices are `(0, 0), (1, -1), (2, 0), (3, -1), ...`; every triangle
/// winds counter-clockwise.
pub(crate) fn make_straight_line_mutable_mesh(
    n_triangles: u32,
    format: MeshFormat,
) -> MutableMesh {
    let mut mesh = MutableMesh::new(format);
    for i in 0..n_triangles + 2 {
        mesh.append_vertex(Point::new(
            i as f32,
            if i % 2 == 0 { 0.0 } else { -1.0 },
        ));
    }
    for i in 0..n_triangles {
        if i % 2 == 0 {
            mesh.append_triangle_indices([i, i + 1, i + 2]);
        } else {
            mesh.append_triangle_indices([i, i + 2, i + 1]);
        }
    }
    mesh
}

pub(crate) fn make_straight_line_partitioned_mesh(
    n_triangles: u32,
    format: MeshFormat,
) -> PartitionedMesh {
    PartitionedMesh::from_mutable_mesh(
        &make_straight_line_mutable_mesh(n_triangles, format),
        &[],
        &[],
        &[],
    )
    .unwrap()
}

/// A star-like fan of `n_triangles` triangles around the origin. Vertices
/// alternate between an inner polygon of circumradius 0.25 and an outer one
/// of circumradius 1, rotating π / `n_triangles` per vertex; triangle `i`
/// uses vertices `(2i, 2i + 1, 2i + 2)`.
pub(crate) fn make_star_mutable_mesh(n_triangles: u32) -> MutableMesh {
    let step = Angle::degrees(180.0 / n_triangles as f32);
    let mut mesh = MutableMesh::default();
    for i in 0..2 * n_triangles + 1 {
        let radius = if i % 2 == 1 { 1.0 } else { 0.25 };
        mesh.append_vertex(
            Point::new(0.0, 0.0)
                + Vec2::from_direction_and_magnitude(i as f32 * step, radius),
        );
    }
    for i in 0..n_triangles {
        mesh.append_triangle_indices([2 * i, 2 * i + 1, 2 * i + 2]);
    }
    mesh
}

pub(crate) fn make_star_partitioned_mesh(n_triangles: u32) -> PartitionedMesh {
    PartitionedMesh::from_mutable_mesh(&make_star_mutable_mesh(n_triangles), &[], &[], &[])
        .unwrap()
}

/// A ring-shaped triangle strip with inner radius 0.75 and outer radius 1,
/// advancing by 2π / `n_subdivisions` after every second vertex. With more
/// than 2 · `n_subdivisions` triangles the strip keeps winding and overlaps
/// itself.
pub(crate) fn make_coiled_ring_mutable_mesh(
    n_triangles: u32,
    n_subdivisions: u32,
) -> MutableMesh {
    let step = Angle::degrees(360.0 / n_subdivisions as f32);
    let mut mesh = MutableMesh::default();
    for i in 0..n_triangles + 2 {
        let magnitude = if i % 2 == 1 { 1.0 } else { 0.75 };
        mesh.append_vertex(
            Point::new(0.0, 0.0)
                + Vec2::from_direction_and_magnitude((i / 2) as f32 * step, magnitude),
        );
    }
    for i in 0..n_triangles {
        if i % 2 == 0 {
            mesh.append_triangle_indices([i, i + 1, i + 2]);
        } else {
            mesh.append_triangle_indices([i, i + 2, i + 1]);
        }
    }
    mesh
}

/// Four triangles in a row along the x-axis, with unit bases and heights of
/// 1 through 4, so they hold 10%, 20%, 30%, and 40% of the total area:
///
/// ```text
///         8
///       6
///     4
///   2
/// 0 1 3 5 7
/// ```
pub(crate) fn make_rising_sawtooth_shape() -> PartitionedMesh {
    let mut mesh = MutableMesh::default();
    mesh.append_vertex(Point::new(0.0, 0.0));
    mesh.append_vertex(Point::new(1.0, 0.0));
    mesh.append_vertex(Point::new(1.0, 1.0));
    mesh.append_vertex(Point::new(2.0, 0.0));
    mesh.append_vertex(Point::new(2.0, 2.0));
    mesh.append_vertex(Point::new(3.0, 0.0));
    mesh.append_vertex(Point::new(3.0, 3.0));
    mesh.append_vertex(Point::new(4.0, 0.0));
    mesh.append_vertex(Point::new(4.0, 4.0));
    mesh.append_triangle_indices([0, 1, 2]);
    mesh.append_triangle_indices([1, 3, 4]);
    mesh.append_triangle_indices([3, 5, 6]);
    mesh.append_triangle_indices([5, 7, 8]);
    PartitionedMesh::from_mutable_mesh(&mesh, &[], &[], &[]).unwrap()
}
