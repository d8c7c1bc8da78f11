//! Render-group aggregates of meshes with spatial queries.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::format::{AttributeId, MeshAttributeCodingParams, MeshFormat};
use super::mesh::{Mesh, MAX_VERTICES_PER_MESH};
use super::mutable::MutableMesh;
use super::packing;
use super::rtree::StaticRTree;
use crate::errors::{GeometryError, GeometryResult};
use crate::geometry::{
    AffineTransform, Bounded, Envelope, Intersects, Point, Quad, Rect, Segment, Triangle,
};

/// A pair of indices identifying one vertex of a [`PartitionedMesh`], used
/// by outlines. The `mesh_index` is local to the render group's mesh list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexIndexPair {
    pub mesh_index: u16,
    pub vertex_index: u16,
}

/// A pair of indices identifying one triangle of a [`PartitionedMesh`]. The
/// `mesh_index` is an index into [`PartitionedMesh::meshes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriangleIndexPair {
    pub mesh_index: u16,
    pub triangle_index: u16,
}

/// Returned by triangle visitors to continue or stop a traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowControl {
    Break,
    Continue,
}

/// One render group expressed as a `MutableMesh` plus outlines of vertex
/// indices into it.
#[derive(Clone, Copy)]
pub struct MutableMeshGroup<'a> {
    pub mesh: &'a MutableMesh,
    pub outlines: &'a [&'a [u32]],
    /// Attributes to strip while converting to `Mesh`es.
    pub omit_attributes: &'a [AttributeId],
    /// Packing params, indexed against `mesh.format()`, as in
    /// [`Mesh::create`].
    pub packing_params: &'a [Option<MeshAttributeCodingParams>],
}

/// One render group expressed as ready-made `Mesh`es. The `mesh_index` of
/// each outline entry refers into this group's `meshes`.
#[derive(Clone, Copy, Default)]
pub struct MeshGroup<'a> {
    pub meshes: &'a [Mesh],
    pub outlines: &'a [&'a [VertexIndexPair]],
}

/// A triangulated shape: zero or more non-empty meshes divided among render
/// groups, optionally carrying vertex outlines, with a lazily built spatial
/// index over every triangle.
///
/// All the meshes within one render group share a `MeshFormat`. Meshes are
/// listed bottom-to-top in render order. The spatial index and the total
/// absolute triangle area are computed on the first query that needs them
/// and cached; [`PartitionedMesh::initialize_spatial_index`] forces the
/// index eagerly, which can keep the cost off a latency-sensitive thread.
///
/// The data lives behind an [`Arc`]: clones are cheap and share both the
/// meshes and the caches, whichever handle populated them.
#[derive(Clone, Debug)]
pub struct PartitionedMesh {
    data: Arc<PartitionedMeshData>,
}

#[derive(Debug)]
struct PartitionedMeshData {
    meshes: Vec<Mesh>,
    outlines: Vec<Vec<VertexIndexPair>>,
    /// For each render group, the index into `meshes` of its first mesh.
    group_first_mesh_indices: Vec<u16>,
    /// For each render group, the index into `outlines` of its first
    /// outline.
    group_first_outline_indices: Vec<u32>,
    group_formats: Vec<MeshFormat>,
    // Both caches follow a publish-once discipline: the cell is written
    // exactly once, and readers that find it populated take no lock at all,
    // so a visitor re-entering query methods on the same shape cannot
    // deadlock.
    rtree: OnceLock<StaticRTree<TriangleIndexPair>>,
    total_absolute_area: OnceLock<f32>,
}

impl Default for PartitionedMesh {
    /// An empty shape with no render groups.
    fn default() -> Self {
        PartitionedMesh::with_empty_groups(0)
    }
}

impl PartitionedMesh {
    /// A shape with `num_groups` render groups, each empty.
    pub fn with_empty_groups(num_groups: u32) -> PartitionedMesh {
        let groups = vec![MeshGroup::default(); num_groups as usize];
        PartitionedMesh::from_mesh_groups(&groups)
            .expect("empty groups are always valid")
    }

    /// Builds a single-group shape from a `MutableMesh`, converting it with
    /// [`MutableMesh::as_meshes`]. Each outline is a sequence of vertex
    /// indices into `mesh`; empty outlines are dropped. Returns an error if
    /// the mesh has no triangles, if the conversion fails, or if an outline
    /// refers to a non-existent vertex.
    pub fn from_mutable_mesh(
        mesh: &MutableMesh,
        outlines: &[&[u32]],
        omit_attributes: &[AttributeId],
        packing_params: &[Option<MeshAttributeCodingParams>],
    ) -> GeometryResult<PartitionedMesh> {
        PartitionedMesh::from_mutable_mesh_groups(&[MutableMeshGroup {
            mesh,
            outlines,
            omit_attributes,
            packing_params,
        }])
    }

    /// Builds a shape with one render group per entry of `groups`, as in
    /// [`PartitionedMesh::from_mutable_mesh`]. Group-local outline indices
    /// are translated across the partitioning performed by `as_meshes`, so
    /// the stored `VertexIndexPair`s refer to the group's final mesh list.
    pub fn from_mutable_mesh_groups(
        groups: &[MutableMeshGroup],
    ) -> GeometryResult<PartitionedMesh> {
        let mut owned_groups = Vec::with_capacity(groups.len());
        for group in groups {
            if group.mesh.triangle_count() == 0 {
                return Err(GeometryError::invalid_argument("Mesh contains no triangles"));
            }
            let vertex_count = group.mesh.vertex_count();
            for (o, outline) in group.outlines.iter().enumerate() {
                if let Some(&bad) = outline.iter().find(|&&v| v >= vertex_count) {
                    return Err(GeometryError::invalid_argument(format!(
                        "Outline {o} refers to non-existent vertex {bad} \
                         (vertices: {vertex_count})"
                    )));
                }
            }

            let meshes = group.mesh.as_meshes(group.packing_params, group.omit_attributes)?;

            // `as_meshes` renumbers vertices per partition; rebuild the same
            // partitioning to translate outline indices. A vertex may land
            // in several partitions; the outline uses the first.
            let triangles: Vec<[u32; 3]> = (0..group.mesh.triangle_count())
                .map(|t| group.mesh.triangle_indices(t))
                .collect();
            let partitions = packing::partition_triangles(&triangles, MAX_VERTICES_PER_MESH);
            let mut partition_map: HashMap<u32, VertexIndexPair> = HashMap::new();
            for (p, partition) in partitions.iter().enumerate() {
                for (v, &original) in partition.vertex_indices.iter().enumerate() {
                    partition_map.entry(original).or_insert(VertexIndexPair {
                        mesh_index: p as u16,
                        vertex_index: v as u16,
                    });
                }
            }

            let mut translated_outlines = Vec::new();
            for outline in group.outlines {
                let translated: Vec<VertexIndexPair> = outline
                    .iter()
                    .filter_map(|index| partition_map.get(index).copied())
                    .collect();
                // Outlines that reference only unindexed vertices (or were
                // empty to begin with) are dropped, not errors, on this
                // path.
                if !translated.is_empty() {
                    translated_outlines.push(translated);
                }
            }
            owned_groups.push((meshes, translated_outlines));
        }
        PartitionedMeshData::from_owned_groups(owned_groups).map(|data| PartitionedMesh {
            data: Arc::new(data),
        })
    }

    /// Builds a single-group shape from ready-made meshes. Returns an error
    /// if there are more than 2^16 meshes, any mesh is empty, the formats
    /// differ, any outline is empty, or any outline entry refers to a
    /// non-existent mesh or vertex.
    pub fn from_meshes(
        meshes: &[Mesh],
        outlines: &[&[VertexIndexPair]],
    ) -> GeometryResult<PartitionedMesh> {
        PartitionedMesh::from_mesh_groups(&[MeshGroup { meshes, outlines }])
    }

    /// Builds a shape with one render group per entry of `groups`; failure
    /// rules as in [`PartitionedMesh::from_meshes`], applied per group.
    pub fn from_mesh_groups(groups: &[MeshGroup]) -> GeometryResult<PartitionedMesh> {
        let owned_groups = groups
            .iter()
            .map(|group| {
                (
                    group.meshes.to_vec(),
                    group.outlines.iter().map(|o| o.to_vec()).collect(),
                )
            })
            .collect();
        PartitionedMeshData::from_owned_groups(owned_groups).map(|data| PartitionedMesh {
            data: Arc::new(data),
        })
    }

    pub fn render_group_count(&self) -> u32 {
        self.data.group_first_mesh_indices.len() as u32
    }

    /// The format shared by the meshes of render group `group_index`.
    /// Panics if `group_index` is out of range.
    pub fn render_group_format(&self, group_index: u32) -> &MeshFormat {
        assert!(
            group_index < self.render_group_count(),
            "Render group {group_index} is out of range (groups: {})",
            self.render_group_count()
        );
        &self.data.group_formats[group_index as usize]
    }

    /// The meshes of render group `group_index`, bottom-to-top. Panics if
    /// `group_index` is out of range.
    pub fn render_group_meshes(&self, group_index: u32) -> &[Mesh] {
        assert!(
            group_index < self.render_group_count(),
            "Render group {group_index} is out of range (groups: {})",
            self.render_group_count()
        );
        let start = self.data.group_first_mesh_indices[group_index as usize] as usize;
        let end = self
            .data
            .group_first_mesh_indices
            .get(group_index as usize + 1)
            .map_or(self.data.meshes.len(), |&i| i as usize);
        &self.data.meshes[start..end]
    }

    /// Every mesh across all render groups, bottom-to-top.
    pub fn meshes(&self) -> &[Mesh] {
        &self.data.meshes
    }

    fn group_outlines(&self, group_index: u32) -> &[Vec<VertexIndexPair>] {
        assert!(
            group_index < self.render_group_count(),
            "Render group {group_index} is out of range (groups: {})",
            self.render_group_count()
        );
        let start = self.data.group_first_outline_indices[group_index as usize] as usize;
        let end = self
            .data
            .group_first_outline_indices
            .get(group_index as usize + 1)
            .map_or(self.data.outlines.len(), |&i| i as usize);
        &self.data.outlines[start..end]
    }

    /// The number of outlines in render group `group_index`. Panics if
    /// `group_index` is out of range.
    pub fn outline_count(&self, group_index: u32) -> u32 {
        self.group_outlines(group_index).len() as u32
    }

    /// The outline at `outline_index` within render group `group_index`;
    /// never empty. Each entry's `mesh_index` refers into
    /// `render_group_meshes(group_index)`. Panics if either index is out of
    /// range.
    pub fn outline(&self, group_index: u32, outline_index: u32) -> &[VertexIndexPair] {
        let outlines = self.group_outlines(group_index);
        assert!(
            (outline_index as usize) < outlines.len(),
            "Outline {outline_index} is out of range (outlines: {})",
            outlines.len()
        );
        &outlines[outline_index as usize]
    }

    /// The number of vertices in one outline. Panics if either index is out
    /// of range.
    pub fn outline_vertex_count(&self, group_index: u32, outline_index: u32) -> u32 {
        self.outline(group_index, outline_index).len() as u32
    }

    /// The position of one outline vertex. Panics if any index is out of
    /// range.
    pub fn outline_position(
        &self,
        group_index: u32,
        outline_index: u32,
        vertex_index: u32,
    ) -> Point {
        let outline = self.outline(group_index, outline_index);
        assert!(
            (vertex_index as usize) < outline.len(),
            "Outline vertex {vertex_index} is out of range (vertices: {})",
            outline.len()
        );
        let pair = outline[vertex_index as usize];
        self.render_group_meshes(group_index)[pair.mesh_index as usize]
            .vertex_position(pair.vertex_index as u32)
    }

    /// The bounds of all meshes; empty when the shape has no meshes.
    pub fn bounds(&self) -> Envelope {
        let mut envelope = Envelope::new();
        for mesh in &self.data.meshes {
            envelope.add_envelope(&mesh.bounds());
        }
        envelope
    }

    /// Builds the spatial index now if it hasn't been built yet. A no-op
    /// for an empty shape.
    pub fn initialize_spatial_index(&self) {
        if self.data.meshes.is_empty() {
            return;
        }
        let _ = self.spatial_index();
    }

    pub fn is_spatial_index_initialized(&self) -> bool {
        self.data.rtree.get().is_some()
    }

    /// The spatial index over every triangle. Must not be called on an
    /// empty shape.
    fn spatial_index(&self) -> &StaticRTree<TriangleIndexPair> {
        debug_assert!(!self.data.meshes.is_empty());
        self.data.rtree.get_or_init(|| {
            let meshes = &self.data.meshes;
            let pairs = meshes.iter().enumerate().flat_map(|(m, mesh)| {
                (0..mesh.triangle_count()).map(move |t| TriangleIndexPair {
                    mesh_index: m as u16,
                    triangle_index: t as u16,
                })
            });
            StaticRTree::new(pairs, |pair| {
                Bounded::bounding_rect(
                    &meshes[pair.mesh_index as usize]
                        .get_triangle(pair.triangle_index as u32),
                )
            })
        })
    }

    fn triangle_absolute_area(&self, pair: TriangleIndexPair) -> f32 {
        self.data.meshes[pair.mesh_index as usize]
            .get_triangle(pair.triangle_index as u32)
            .signed_area()
            .abs()
    }

    /// The cached sum of the absolute areas of all triangles.
    fn total_absolute_area(&self) -> f32 {
        *self.data.total_absolute_area.get_or_init(|| {
            let mut total = 0.0f32;
            for mesh in &self.data.meshes {
                for t in 0..mesh.triangle_count() {
                    total += mesh.get_triangle(t).signed_area().abs();
                }
            }
            total
        })
    }

    /// Visits every triangle that intersects `query`, where `query_to_this`
    /// maps the query's coordinate space into this shape's. The visitor
    /// returns [`FlowControl::Break`] to stop early. Candidates come from
    /// the spatial index (initializing it if needed) and are confirmed with
    /// the exact primitive predicate before the visitor runs; visitation
    /// order follows the index structure and should be treated as
    /// arbitrary.
    pub fn visit_intersected_triangles<Q, V>(
        &self,
        query: &Q,
        query_to_this: &AffineTransform,
        mut visitor: V,
    ) where
        Q: Query,
        V: FnMut(TriangleIndexPair) -> FlowControl,
    {
        if self.data.meshes.is_empty() {
            return;
        }
        let transformed = query.apply(query_to_this);
        let meshes = &self.data.meshes;
        self.spatial_index().visit_intersected_elements(
            &transformed.bounding_rect(),
            |&pair| {
                let triangle = meshes[pair.mesh_index as usize]
                    .get_triangle(pair.triangle_index as u32);
                if !transformed.intersects_triangle(&triangle) {
                    return true;
                }
                visitor(pair) == FlowControl::Continue
            },
        );
    }

    /// As [`PartitionedMesh::visit_intersected_triangles`], with another
    /// `PartitionedMesh` as the query. When `query_to_this` is not
    /// invertible it collapses `query` to a segment computed from its
    /// bounds, and the segment overload is used instead.
    pub fn visit_mesh_intersected_triangles<V>(
        &self,
        query: &PartitionedMesh,
        query_to_this: &AffineTransform,
        mut visitor: V,
    ) where
        V: FnMut(TriangleIndexPair) -> FlowControl,
    {
        if self.data.meshes.is_empty() || query.meshes().is_empty() {
            return;
        }
        let query_bounds = query
            .bounds()
            .as_rect()
            .expect("a non-empty shape has bounds");
        match query_to_this.inverse() {
            Some(this_to_query) => {
                // Candidates are triangles hitting the transformed bounds of
                // `query`; each is confirmed by running it as a triangle
                // query against `query` in the other frame.
                let search_rect = Bounded::bounding_rect(&query_to_this.apply_rect(&query_bounds));
                let meshes = &self.data.meshes;
                self.spatial_index()
                    .visit_intersected_elements(&search_rect, |&pair| {
                        let triangle = meshes[pair.mesh_index as usize]
                            .get_triangle(pair.triangle_index as u32);
                        let mut found = false;
                        query.visit_intersected_triangles(
                            &triangle,
                            &this_to_query,
                            |_| {
                                found = true;
                                FlowControl::Break
                            },
                        );
                        if found {
                            visitor(pair) == FlowControl::Continue
                        } else {
                            true
                        }
                    });
            }
            None => {
                let collapsed = collapsed_segment(&query_bounds, query_to_this);
                self.visit_intersected_triangles(
                    &collapsed,
                    &AffineTransform::IDENTITY,
                    visitor,
                );
            }
        }
    }

    /// Returns true if any triangle of this shape intersects `query`, where
    /// `self_to_query` maps this shape's space into the query's. When the
    /// transform is not invertible, this shape is collapsed to a segment in
    /// the query's space.
    pub fn intersects<Q: Query>(&self, self_to_query: &AffineTransform, query: &Q) -> bool {
        if self.data.meshes.is_empty() {
            return false;
        }
        match self_to_query.inverse() {
            Some(query_to_self) => {
                let mut found = false;
                self.visit_intersected_triangles(query, &query_to_self, |_| {
                    found = true;
                    FlowControl::Break
                });
                found
            }
            None => {
                let bounds = self
                    .bounds()
                    .as_rect()
                    .expect("a non-empty shape has bounds");
                let collapsed = collapsed_segment(&bounds, self_to_query);
                query.intersects_segment(&collapsed)
            }
        }
    }

    /// Returns true if the two shapes intersect in a common coordinate
    /// space, given each shape's transform into that space. When both
    /// transforms are non-invertible, both shapes collapse to segments.
    pub fn intersects_mesh(
        &self,
        self_to_common: &AffineTransform,
        other: &PartitionedMesh,
        other_to_common: &AffineTransform,
    ) -> bool {
        if self.meshes().is_empty() || other.meshes().is_empty() {
            return false;
        }
        // Prefer testing in whichever shape's own frame has an invertible
        // transform.
        if let Some(result) =
            try_one_way_mesh_intersection(self, self_to_common, other, other_to_common)
        {
            return result;
        }
        if let Some(result) =
            try_one_way_mesh_intersection(other, other_to_common, self, self_to_common)
        {
            return result;
        }
        let collapsed_self = collapsed_segment(
            &self.bounds().as_rect().expect("a non-empty shape has bounds"),
            self_to_common,
        );
        let collapsed_other = collapsed_segment(
            &other.bounds().as_rect().expect("a non-empty shape has bounds"),
            other_to_common,
        );
        collapsed_self.intersects(&collapsed_other)
    }

    /// The approximate fraction of this shape covered by `query`: the sum
    /// of the absolute areas of the intersected triangles over the sum over
    /// all triangles. Overlapping triangles (e.g. a stroke looping over
    /// itself) count individually. Returns 0 for an empty shape.
    /// Initializes the spatial index and the area cache.
    pub fn coverage<Q: AreaQuery>(&self, query: &Q, query_to_this: &AffineTransform) -> f32 {
        if self.data.meshes.is_empty() {
            return 0.0;
        }
        let total = self.total_absolute_area();
        let mut covered = 0.0f32;
        self.visit_intersected_triangles(query, query_to_this, |pair| {
            covered += self.triangle_absolute_area(pair);
            FlowControl::Continue
        });
        covered / total
    }

    /// As [`PartitionedMesh::coverage`], with another shape as the query.
    pub fn mesh_coverage(
        &self,
        query: &PartitionedMesh,
        query_to_this: &AffineTransform,
    ) -> f32 {
        if self.data.meshes.is_empty() {
            return 0.0;
        }
        let total = self.total_absolute_area();
        let mut covered = 0.0f32;
        self.visit_mesh_intersected_triangles(query, query_to_this, |pair| {
            covered += self.triangle_absolute_area(pair);
            FlowControl::Continue
        });
        covered / total
    }

    /// Equivalent to `coverage(query, query_to_this) > coverage_threshold`,
    /// but stops visiting once the accumulated area crosses the threshold.
    /// Returns false for an empty shape.
    pub fn coverage_is_greater_than<Q: AreaQuery>(
        &self,
        query: &Q,
        coverage_threshold: f32,
        query_to_this: &AffineTransform,
    ) -> bool {
        if self.data.meshes.is_empty() {
            return false;
        }
        let area_threshold = coverage_threshold * self.total_absolute_area();
        let mut covered = 0.0f32;
        self.visit_intersected_triangles(query, query_to_this, |pair| {
            covered += self.triangle_absolute_area(pair);
            if covered > area_threshold {
                FlowControl::Break
            } else {
                FlowControl::Continue
            }
        });
        covered > area_threshold
    }

    /// As [`PartitionedMesh::coverage_is_greater_than`], with another shape
    /// as the query.
    pub fn mesh_coverage_is_greater_than(
        &self,
        query: &PartitionedMesh,
        coverage_threshold: f32,
        query_to_this: &AffineTransform,
    ) -> bool {
        if self.data.meshes.is_empty() {
            return false;
        }
        let area_threshold = coverage_threshold * self.total_absolute_area();
        let mut covered = 0.0f32;
        self.visit_mesh_intersected_triangles(query, query_to_this, |pair| {
            covered += self.triangle_absolute_area(pair);
            if covered > area_threshold {
                FlowControl::Break
            } else {
                FlowControl::Continue
            }
        });
        covered > area_threshold
    }
}

/// Tests `lhs` against `rhs` in `rhs`'s own frame; `None` when
/// `rhs_to_common` is not invertible and the test must run the other way.
fn try_one_way_mesh_intersection(
    lhs: &PartitionedMesh,
    lhs_to_common: &AffineTransform,
    rhs: &PartitionedMesh,
    rhs_to_common: &AffineTransform,
) -> Option<bool> {
    let common_to_rhs = rhs_to_common.inverse()?;
    let mut found = false;
    rhs.visit_mesh_intersected_triangles(lhs, &(common_to_rhs * *lhs_to_common), |_| {
        found = true;
        FlowControl::Break
    });
    Some(found)
}

/// The segment that `bounds` collapses to under a non-invertible transform:
/// the farthest pair among the images of the four corners.
fn collapsed_segment(bounds: &Rect, transform: &AffineTransform) -> Segment {
    let corners = bounds.corners().map(|corner| transform.apply_point(corner));
    let mut best = Segment::new(corners[0], corners[0]);
    let mut best_distance = -1.0f32;
    for i in 0..4 {
        for j in i..4 {
            let distance = (corners[j] - corners[i]).magnitude_squared();
            if distance > best_distance {
                best_distance = distance;
                best = Segment::new(corners[i], corners[j]);
            }
        }
    }
    best
}

impl PartitionedMeshData {
    fn from_owned_groups(
        groups: Vec<(Vec<Mesh>, Vec<Vec<VertexIndexPair>>)>,
    ) -> GeometryResult<PartitionedMeshData> {
        let total_meshes: usize = groups.iter().map(|(meshes, _)| meshes.len()).sum();
        if total_meshes > u16::MAX as usize {
            return Err(GeometryError::invalid_argument(format!(
                "A PartitionedMesh supports at most 2^16 meshes; {total_meshes} given"
            )));
        }

        let mut group_formats = Vec::with_capacity(groups.len());
        for (meshes, outlines) in &groups {
            match meshes.first() {
                None => group_formats.push(MeshFormat::default()),
                Some(first) => {
                    let format = first.format();
                    if let Some(mismatch) =
                        meshes.iter().position(|m| m.format() != format)
                    {
                        return Err(GeometryError::invalid_argument(format!(
                            "Every mesh in a render group must have the same format; \
                             mesh {mismatch} differs from mesh 0"
                        )));
                    }
                    group_formats.push(format.clone());
                }
            }
            for (i, mesh) in meshes.iter().enumerate() {
                if mesh.triangle_count() == 0 {
                    return Err(GeometryError::invalid_argument(format!(
                        "Mesh at index {i} contains no triangles"
                    )));
                }
            }
            for (o, outline) in outlines.iter().enumerate() {
                if outline.is_empty() {
                    return Err(GeometryError::invalid_argument(format!(
                        "Outline at index {o} contains no points"
                    )));
                }
                for (v, pair) in outline.iter().enumerate() {
                    if pair.mesh_index as usize >= meshes.len() {
                        return Err(GeometryError::invalid_argument(format!(
                            "Vertex {v} in outline {o} refers to non-existent mesh {} \
                             (meshes: {})",
                            pair.mesh_index,
                            meshes.len()
                        )));
                    }
                    let mesh = &meshes[pair.mesh_index as usize];
                    if pair.vertex_index as u32 >= mesh.vertex_count() {
                        return Err(GeometryError::invalid_argument(format!(
                            "Vertex {v} in outline {o} refers to non-existent vertex {} \
                             in mesh {} (vertices: {})",
                            pair.vertex_index,
                            pair.mesh_index,
                            mesh.vertex_count()
                        )));
                    }
                }
            }
        }

        let mut data = PartitionedMeshData {
            meshes: Vec::with_capacity(total_meshes),
            outlines: Vec::new(),
            group_first_mesh_indices: Vec::with_capacity(groups.len()),
            group_first_outline_indices: Vec::with_capacity(groups.len()),
            group_formats,
            rtree: OnceLock::new(),
            total_absolute_area: OnceLock::new(),
        };
        for (meshes, outlines) in groups {
            data.group_first_mesh_indices.push(data.meshes.len() as u16);
            data.group_first_outline_indices.push(data.outlines.len() as u32);
            data.meshes.extend(meshes);
            data.outlines.extend(outlines);
        }
        Ok(data)
    }
}

/// A primitive usable as a query against a [`PartitionedMesh`]. The image
/// of the primitive under an affine transform may be of a different type
/// (a transformed `Rect` is in general a `Quad`).
pub trait Query {
    type Image: QueryImage;
    fn apply(&self, transform: &AffineTransform) -> Self::Image;
    /// Used for the collapsed-segment fallback under non-invertible
    /// transforms.
    fn intersects_segment(&self, segment: &Segment) -> bool;
}

/// The transformed form of a query, as tested against candidate triangles.
pub trait QueryImage {
    fn bounding_rect(&self) -> Rect;
    fn intersects_triangle(&self, triangle: &Triangle) -> bool;
}

/// Queries with a well-defined area, accepted by the coverage APIs.
pub trait AreaQuery: Query {}

impl Query for Point {
    type Image = Point;
    fn apply(&self, transform: &AffineTransform) -> Point {
        transform.apply_point(*self)
    }
    fn intersects_segment(&self, segment: &Segment) -> bool {
        self.intersects(segment)
    }
}

impl Query for Segment {
    type Image = Segment;
    fn apply(&self, transform: &AffineTransform) -> Segment {
        transform.apply_segment(self)
    }
    fn intersects_segment(&self, segment: &Segment) -> bool {
        self.intersects(segment)
    }
}

impl Query for Triangle {
    type Image = Triangle;
    fn apply(&self, transform: &AffineTransform) -> Triangle {
        transform.apply_triangle(self)
    }
    fn intersects_segment(&self, segment: &Segment) -> bool {
        segment.intersects(self)
    }
}

impl Query for Rect {
    type Image = Quad;
    fn apply(&self, transform: &AffineTransform) -> Quad {
        transform.apply_rect(self)
    }
    fn intersects_segment(&self, segment: &Segment) -> bool {
        segment.intersects(self)
    }
}

impl Query for Quad {
    type Image = Quad;
    fn apply(&self, transform: &AffineTransform) -> Quad {
        transform.apply_quad(self)
    }
    fn intersects_segment(&self, segment: &Segment) -> bool {
        segment.intersects(self)
    }
}

impl AreaQuery for Triangle {}
impl AreaQuery for Rect {}
impl AreaQuery for Quad {}

impl QueryImage for Point {
    fn bounding_rect(&self) -> Rect {
        Bounded::bounding_rect(self)
    }
    fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        self.intersects(triangle)
    }
}

impl QueryImage for Segment {
    fn bounding_rect(&self) -> Rect {
        Bounded::bounding_rect(self)
    }
    fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        self.intersects(triangle)
    }
}

impl QueryImage for Triangle {
    fn bounding_rect(&self) -> Rect {
        Bounded::bounding_rect(self)
    }
    fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        self.intersects(triangle)
    }
}

impl QueryImage for Quad {
    fn bounding_rect(&self) -> Rect {
        Bounded::bounding_rect(self)
    }
    fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        self.intersects(triangle)
    }
}
