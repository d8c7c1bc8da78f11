//! An appendable, unpacked mesh builder.

use log::warn;
use smallvec::SmallVec;

use super::format::{AttributeId, MeshAttributeBounds, MeshAttributeCodingParams, MeshFormat};
use super::mesh::{Mesh, MAX_VERTICES_PER_MESH};
use super::packing;
use crate::errors::{GeometryError, GeometryResult};
use crate::geometry::{Point, Triangle};

/// A readable and writable mesh. Unlike [`Mesh`], attributes are stored at
/// full precision, one float per component, and triangles may be edited
/// freely. Converting to immutable [`Mesh`]es with [`MutableMesh::as_meshes`]
/// packs the attributes and validates the triangles.
///
/// A `MutableMesh` owns its buffers outright: it moves cheaply, and copying
/// is always the explicit, deep [`Clone`].
#[derive(Clone, Debug, Default)]
pub struct MutableMesh {
    format: MeshFormat,
    vertex_data: Vec<f32>,
    index_data: Vec<u32>,
}

impl MutableMesh {
    /// An empty mesh with the given format.
    pub fn new(format: MeshFormat) -> Self {
        MutableMesh {
            format,
            vertex_data: Vec::new(),
            index_data: Vec::new(),
        }
    }

    /// Copies (and unpacks) the vertex and triangle data of a `Mesh`.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut result = MutableMesh::new(mesh.format().clone());
        for v in 0..mesh.vertex_count() {
            for (a, _) in mesh.format().attributes().iter().enumerate() {
                result
                    .vertex_data
                    .extend_from_slice(&mesh.float_vertex_attribute(v, a));
            }
        }
        for t in 0..mesh.triangle_count() {
            result.index_data.extend_from_slice(&mesh.triangle_indices(t));
        }
        result
    }

    /// The number of floats in one vertex.
    fn float_stride(&self) -> usize {
        self.format.total_component_count()
    }

    /// Removes all vertices and triangles, keeping the format and the
    /// allocated buffers.
    pub fn clear(&mut self) {
        self.vertex_data.clear();
        self.index_data.clear();
    }

    /// Clears the mesh and replaces its format.
    pub fn reset(&mut self, format: MeshFormat) {
        self.clear();
        self.format = format;
    }

    pub fn format(&self) -> &MeshFormat {
        &self.format
    }

    pub fn vertex_count(&self) -> u32 {
        (self.vertex_data.len() / self.float_stride()) as u32
    }

    pub fn triangle_count(&self) -> u32 {
        (self.index_data.len() / 3) as u32
    }

    /// Appends a vertex at `position`; every other attribute of the new
    /// vertex is zero.
    pub fn append_vertex(&mut self, position: Point) {
        self.vertex_data.resize(self.vertex_data.len() + self.float_stride(), 0.0);
        self.set_vertex_position(self.vertex_count() - 1, position);
    }

    fn position_component_index(&self) -> usize {
        self.format
            .first_component_index(self.format.position_attribute_index())
    }

    /// The position of the vertex at `index`. Panics if `index` is out of
    /// range.
    pub fn vertex_position(&self, index: u32) -> Point {
        assert!(
            index < self.vertex_count(),
            "Vertex index {index} is out of range (vertices: {})",
            self.vertex_count()
        );
        let base = index as usize * self.float_stride() + self.position_component_index();
        Point::new(self.vertex_data[base], self.vertex_data[base + 1])
    }

    /// Sets the position of the vertex at `index`. Panics if `index` is out
    /// of range.
    pub fn set_vertex_position(&mut self, index: u32, position: Point) {
        assert!(
            index < self.vertex_count(),
            "Vertex index {index} is out of range (vertices: {})",
            self.vertex_count()
        );
        let base = index as usize * self.float_stride() + self.position_component_index();
        self.vertex_data[base] = position.x;
        self.vertex_data[base + 1] = position.y;
    }

    /// The value of attribute `attribute_index` on vertex `vertex_index`.
    /// Panics if either index is out of range.
    pub fn float_vertex_attribute(
        &self,
        vertex_index: u32,
        attribute_index: usize,
    ) -> SmallVec<[f32; 4]> {
        assert!(
            vertex_index < self.vertex_count(),
            "Vertex index {vertex_index} is out of range (vertices: {})",
            self.vertex_count()
        );
        let attribute = self.attribute(attribute_index);
        let base = vertex_index as usize * self.float_stride()
            + self.format.first_component_index(attribute_index);
        self.vertex_data[base..base + attribute.attribute_type.component_count()]
            .iter()
            .copied()
            .collect()
    }

    /// Sets the value of attribute `attribute_index` on vertex
    /// `vertex_index`. Panics if either index is out of range, or if
    /// `value` has the wrong number of components.
    pub fn set_float_vertex_attribute(
        &mut self,
        vertex_index: u32,
        attribute_index: usize,
        value: &[f32],
    ) {
        assert!(
            vertex_index < self.vertex_count(),
            "Vertex index {vertex_index} is out of range (vertices: {})",
            self.vertex_count()
        );
        let attribute = self.attribute(attribute_index);
        let count = attribute.attribute_type.component_count();
        assert!(
            value.len() == count,
            "Attribute {attribute_index} has {count} components; got {}",
            value.len()
        );
        let base = vertex_index as usize * self.float_stride()
            + self.format.first_component_index(attribute_index);
        self.vertex_data[base..base + count].copy_from_slice(value);
    }

    fn attribute(&self, attribute_index: usize) -> super::format::MeshAttribute {
        assert!(
            attribute_index < self.format.attributes().len(),
            "Attribute index {attribute_index} is out of range (attributes: {})",
            self.format.attributes().len()
        );
        self.format.attributes()[attribute_index]
    }

    fn assert_indices_representable(&self, vertex_indices: [u32; 3]) {
        let max = self.format.index_format().max_unpacked_index();
        assert!(
            vertex_indices.iter().all(|&i| i <= max),
            "Triangle indices {vertex_indices:?} exceed the index format's range"
        );
    }

    /// Appends a triangle. The indices are not checked against the current
    /// vertex count (see [`MutableMesh::validate_triangles`]); they must be
    /// representable in the format's index format, or this panics.
    pub fn append_triangle_indices(&mut self, vertex_indices: [u32; 3]) {
        self.assert_indices_representable(vertex_indices);
        self.index_data.extend_from_slice(&vertex_indices);
    }

    /// The vertex indices of the triangle at `index`. Panics if `index` is
    /// out of range.
    pub fn triangle_indices(&self, index: u32) -> [u32; 3] {
        assert!(
            index < self.triangle_count(),
            "Triangle index {index} is out of range (triangles: {})",
            self.triangle_count()
        );
        let base = index as usize * 3;
        [
            self.index_data[base],
            self.index_data[base + 1],
            self.index_data[base + 2],
        ]
    }

    /// Replaces the triangle at `index`. Panics if `index` is out of range
    /// or the indices are not representable. As with
    /// `append_triangle_indices`, the indices are not checked against the
    /// vertex count.
    pub fn set_triangle_indices(&mut self, index: u32, vertex_indices: [u32; 3]) {
        assert!(
            index < self.triangle_count(),
            "Triangle index {index} is out of range (triangles: {})",
            self.triangle_count()
        );
        self.assert_indices_representable(vertex_indices);
        let base = index as usize * 3;
        self.index_data[base..base + 3].copy_from_slice(&vertex_indices);
    }

    /// Inserts a triangle at `index`, shifting later triangles back. Panics
    /// if `index` > `triangle_count()` or the indices are not representable.
    pub fn insert_triangle_indices(&mut self, index: u32, vertex_indices: [u32; 3]) {
        assert!(
            index <= self.triangle_count(),
            "Cannot insert a triangle at {index} (triangles: {})",
            self.triangle_count()
        );
        self.assert_indices_representable(vertex_indices);
        let base = index as usize * 3;
        self.index_data.splice(base..base, vertex_indices);
    }

    /// Resizes to the given vertex and triangle counts. Shrinking truncates;
    /// growing appends zeroed vertices and triangles.
    pub fn resize(&mut self, new_vertex_count: u32, new_triangle_count: u32) {
        self.vertex_data
            .resize(new_vertex_count as usize * self.float_stride(), 0.0);
        self.index_data.resize(new_triangle_count as usize * 3, 0);
    }

    /// Checks that every triangle refers to three distinct, existing
    /// vertices.
    pub fn validate_triangles(&self) -> GeometryResult<()> {
        let vertex_count = self.vertex_count();
        for t in 0..self.triangle_count() {
            let indices = self.triangle_indices(t);
            if indices.iter().any(|&i| i >= vertex_count) {
                return Err(GeometryError::invalid_argument(format!(
                    "Triangle {t} refers to a non-existent vertex \
                     (indices: {indices:?}, vertices: {vertex_count})"
                )));
            }
            if indices[0] == indices[1] || indices[0] == indices[2] || indices[1] == indices[2]
            {
                return Err(GeometryError::invalid_argument(format!(
                    "Triangle {t} repeats a vertex (indices: {indices:?})"
                )));
            }
        }
        Ok(())
    }

    /// The position-only triangle at `index`. Panics if `index` is out of
    /// range, or if the triangle refers to a non-existent vertex.
    pub fn get_triangle(&self, index: u32) -> Triangle {
        let [i0, i1, i2] = self.triangle_indices(index);
        Triangle::new(
            self.vertex_position(i0),
            self.vertex_position(i1),
            self.vertex_position(i2),
        )
    }

    /// Converts to one or more immutable [`Mesh`]es.
    ///
    /// The triangles are partitioned so that every output mesh references at
    /// most 2^16 distinct vertices; vertices are renumbered in first-use
    /// order within each partition, and vertices referenced by no triangle
    /// are dropped. `omit_attributes` names attributes to strip from the
    /// output; it must not contain `Position` or attributes missing from the
    /// format. `packing_params` is indexed against this mesh's format and is
    /// interpreted as in [`Mesh::create`].
    ///
    /// When the format packs positions and every triangle here has
    /// non-negative signed area, triangles whose area would flip sign under
    /// quantization are detected and repaired where possible by nudging
    /// vertex positions by up to roughly twice the quantization step. The
    /// repair can fail for some triangles; those are kept as-is and the
    /// conversion still succeeds.
    ///
    /// Returns `InvalidArgument` for invalid triangles, bad
    /// `omit_attributes`, or bad `packing_params`, and `FailedPrecondition`
    /// for non-finite attribute values or attribute ranges wider than
    /// `f32::MAX`.
    pub fn as_meshes(
        &self,
        packing_params: &[Option<MeshAttributeCodingParams>],
        omit_attributes: &[AttributeId],
    ) -> GeometryResult<Vec<Mesh>> {
        self.validate_triangles()?;

        if omit_attributes.contains(&AttributeId::Position) {
            return Err(GeometryError::invalid_argument(
                "Cannot omit the position attribute",
            ));
        }
        for id in omit_attributes {
            if !self.format.attributes().iter().any(|a| a.id == *id) {
                return Err(GeometryError::invalid_argument(format!(
                    "Cannot omit attribute {id:?}: not present in the format"
                )));
            }
        }
        if !packing_params.is_empty() && packing_params.len() != self.format.attributes().len() {
            return Err(GeometryError::invalid_argument(format!(
                "Expected {} packing params, got {}",
                self.format.attributes().len(),
                packing_params.len()
            )));
        }

        // Indices of the attributes that survive into the output format.
        let kept: Vec<usize> = (0..self.format.attributes().len())
            .filter(|&i| !omit_attributes.contains(&self.format.attributes()[i].id))
            .collect();
        let output_format = MeshFormat::new(
            &kept
                .iter()
                .map(|&i| {
                    let a = self.format.attributes()[i];
                    (a.attribute_type, a.id)
                })
                .collect::<Vec<_>>(),
            self.format.index_format(),
        )?;
        for &i in &kept {
            let attribute = self.format.attributes()[i];
            if !attribute.attribute_type.is_packed()
                && packing_params.get(i).is_some_and(|p| p.is_some())
            {
                return Err(GeometryError::invalid_argument(format!(
                    "Packing params were supplied for unpacked attribute {i}"
                )));
            }
        }

        let triangles: Vec<[u32; 3]> =
            (0..self.triangle_count()).map(|t| self.triangle_indices(t)).collect();
        let partitions = packing::partition_triangles(&triangles, MAX_VERTICES_PER_MESH);
        if partitions.is_empty() {
            let empty_columns: Vec<&[f32]> =
                vec![&[]; output_format.total_component_count()];
            return Ok(vec![Mesh::create(&output_format, &empty_columns, &[], &[])?]);
        }

        let all_non_negative = (0..self.triangle_count())
            .all(|t| self.get_triangle(t).signed_area() >= 0.0);

        let mut meshes = Vec::with_capacity(partitions.len());
        for partition in &partitions {
            meshes.push(self.build_partition_mesh(
                partition,
                &output_format,
                &kept,
                packing_params,
                all_non_negative,
            )?);
        }
        Ok(meshes)
    }

    fn build_partition_mesh(
        &self,
        partition: &packing::Partition,
        output_format: &MeshFormat,
        kept: &[usize],
        packing_params: &[Option<MeshAttributeCodingParams>],
        repair_windings: bool,
    ) -> GeometryResult<Mesh> {
        let vertex_count = partition.vertex_indices.len();

        // Gather the partition's attribute values column-by-column, checking
        // the numeric preconditions as we go.
        let mut columns: Vec<Vec<f32>> = Vec::with_capacity(output_format.total_component_count());
        let mut bounds: Vec<MeshAttributeBounds> = Vec::with_capacity(kept.len());
        for &i in kept {
            let attribute = self.format.attributes()[i];
            let first = self.format.first_component_index(i);
            let mut attribute_bounds = MeshAttributeBounds::default();
            for c in 0..attribute.attribute_type.component_count() {
                let mut column = Vec::with_capacity(vertex_count);
                let mut minimum = f32::INFINITY;
                let mut maximum = f32::NEG_INFINITY;
                for &original in &partition.vertex_indices {
                    let value =
                        self.vertex_data[original as usize * self.float_stride() + first + c];
                    if !value.is_finite() {
                        return Err(GeometryError::failed_precondition(format!(
                            "Attribute {i} component {c} contains a non-finite value"
                        )));
                    }
                    minimum = minimum.min(value);
                    maximum = maximum.max(value);
                    column.push(value);
                }
                if maximum as f64 - minimum as f64 > f32::MAX as f64 {
                    return Err(GeometryError::failed_precondition(format!(
                        "The value range of attribute {i} component {c} exceeds the \
                         maximum representable float"
                    )));
                }
                attribute_bounds.minimum.push(minimum);
                attribute_bounds.maximum.push(maximum);
                columns.push(column);
            }
            bounds.push(attribute_bounds);
        }

        // Resolve the coding params for each output attribute.
        let mut params = Vec::with_capacity(kept.len());
        for (out_index, &i) in kept.iter().enumerate() {
            let attribute = self.format.attributes()[i];
            if !attribute.attribute_type.is_packed() {
                params.push(MeshAttributeCodingParams::identity(
                    attribute.attribute_type.component_count(),
                ));
                continue;
            }
            match packing_params.get(i).and_then(|p| p.as_ref()) {
                Some(given) => {
                    packing::validate_coding_params(
                        i,
                        attribute.attribute_type,
                        given,
                        &bounds[out_index],
                    )?;
                    params.push(given.clone());
                }
                None => params.push(packing::default_coding_params(
                    attribute.attribute_type,
                    &bounds[out_index],
                )),
            }
        }

        // Quantize positions first so flipped windings can be repaired
        // before the bytes are laid down.
        let position_out_index = output_format.position_attribute_index();
        let position_attribute = output_format.attributes()[position_out_index];
        let mut repaired_positions: Option<Vec<[u32; 2]>> = None;
        if let Some(max_int) = position_attribute.attribute_type.max_packed_integer() {
            let first = output_format.first_component_index(position_out_index);
            let position_params = &params[position_out_index];
            let mut quantized: Vec<[u32; 2]> = (0..vertex_count)
                .map(|v| {
                    [
                        packing::quantize_component(
                            columns[first][v],
                            &position_params.components[0],
                            max_int,
                        ),
                        packing::quantize_component(
                            columns[first + 1][v],
                            &position_params.components[1],
                            max_int,
                        ),
                    ]
                })
                .collect();
            if repair_windings {
                let unrepaired = packing::repair_flipped_triangles(
                    &mut quantized,
                    &partition.triangles,
                    max_int,
                );
                if unrepaired > 0 {
                    warn!(
                        "{unrepaired} triangle(s) kept a negative winding after \
                         quantization repair"
                    );
                }
            }
            repaired_positions = Some(quantized);
        }

        // Lay down the packed vertex buffer.
        let mut vertex_data =
            Vec::with_capacity(vertex_count * output_format.packed_vertex_stride());
        for v in 0..vertex_count {
            for (out_index, attribute) in output_format.attributes().iter().enumerate() {
                let first = output_format.first_component_index(out_index);
                let count = attribute.attribute_type.component_count();
                if let Some(max_int) = attribute.attribute_type.max_packed_integer() {
                    let integers: SmallVec<[u32; 4]> = if out_index == position_out_index {
                        repaired_positions.as_ref().unwrap()[v].iter().copied().collect()
                    } else {
                        (0..count)
                            .map(|c| {
                                packing::quantize_component(
                                    columns[first + c][v],
                                    &params[out_index].components[c],
                                    max_int,
                                )
                            })
                            .collect()
                    };
                    packing::pack_integers(attribute.attribute_type, &integers, &mut vertex_data);
                } else {
                    for c in 0..count {
                        vertex_data.extend_from_slice(&columns[first + c][v].to_le_bytes());
                    }
                }
            }
        }

        let mut index_data = Vec::with_capacity(partition.triangles.len() * 6);
        for triangle in &partition.triangles {
            for &index in triangle {
                index_data.extend_from_slice(&(index as u16).to_le_bytes());
            }
        }

        Ok(Mesh::from_parts(
            output_format.clone(),
            params,
            Some(bounds),
            vertex_data,
            index_data,
        ))
    }
}
