//! 2D geometry kernel for ink strokes.
//!
//! This crate provides the geometric core of a stroke-rendering platform:
//! - Affine transforms in the plane, with closed-form best-fit solvers that
//!   recover the transform mapping one primitive onto another
//! - Small geometric value types (`Point`, `Vec2`, `Angle`, `Segment`,
//!   `Triangle`, `Rect`, `Quad`) with boundary-inclusive intersection
//!   predicates over every pair
//! - Immutable triangle meshes with schema-driven, bit-packed vertex
//!   attributes, and an unpacked mutable builder that validates and
//!   quantizes on conversion
//! - `PartitionedMesh`, a render-group aggregate with outlines, a lazily
//!   built R-tree over all triangles, intersection visitation, and coverage
//!   queries, including under non-invertible transforms
//! - A tessellator that triangulates the non-zero-winding interior of a
//!   closed polyline into a mesh
//!
//! Meshes and partitioned meshes are handles to shared immutable data:
//! copies are cheap, and all read-only types may be shared freely across
//! threads.

pub mod errors;
pub mod geometry;
pub mod mesh;
pub mod tessellation;

pub use errors::{ErrorCode, GeometryError, GeometryResult};
pub use geometry::{
    AffineTransform, Angle, Bounded, Envelope, Intersects, Point, Quad, Rect, Segment,
    Triangle, Vec2,
};
pub use mesh::{
    AttributeId, AttributeType, ComponentCodingParams, FlowControl, IndexFormat, Mesh,
    MeshAttribute, MeshAttributeBounds, MeshAttributeCodingParams, MeshFormat, MeshGroup,
    MutableMesh, MutableMeshGroup, PartitionedMesh, StaticRTree, TriangleIndexPair,
    VertexIndexPair,
};
pub use tessellation::create_mesh_from_polyline;
