//! Read-only packed meshes.

use smallvec::SmallVec;
use std::sync::Arc;

use super::format::{MeshAttributeBounds, MeshAttributeCodingParams, MeshFormat};
use super::packing;
use crate::errors::{GeometryError, GeometryResult};
use crate::geometry::{Envelope, Point, Triangle};

/// The maximum number of vertices a `Mesh` may hold.
pub const MAX_VERTICES_PER_MESH: usize = 1 << 16;

/// A read-only mesh of vertices and triangles. Vertices carry attributes as
/// specified by the [`MeshFormat`]; a position attribute is always present,
/// and packed attributes are stored quantized (see `MeshFormat`). Triangle
/// indices are always stored 16-bit.
///
/// A `Mesh` keeps its data behind an [`Arc`], so cloning is cheap and clones
/// share the same immutable buffers.
#[derive(Clone, Debug)]
pub struct Mesh {
    data: Arc<MeshData>,
}

#[derive(Debug)]
struct MeshData {
    format: MeshFormat,
    unpacking_params: Vec<MeshAttributeCodingParams>,
    attribute_bounds: Option<Vec<MeshAttributeBounds>>,
    vertex_data: Vec<u8>,
    index_data: Vec<u8>,
    vertex_count: u32,
    triangle_count: u32,
}

const BYTES_PER_INDEX: usize = 2;

impl Default for Mesh {
    /// An empty mesh with the default format. A read-only empty mesh is of
    /// limited use; see [`Mesh::create`] and
    /// [`MutableMesh::as_meshes`](super::MutableMesh::as_meshes) for
    /// creating non-empty ones.
    fn default() -> Self {
        let format = MeshFormat::default();
        let unpacking_params = format
            .attributes()
            .iter()
            .map(|a| MeshAttributeCodingParams::identity(a.attribute_type.component_count()))
            .collect();
        Mesh {
            data: Arc::new(MeshData {
                format,
                unpacking_params,
                attribute_bounds: None,
                vertex_data: Vec::new(),
                index_data: Vec::new(),
                vertex_count: 0,
                triangle_count: 0,
            }),
        }
    }
}

impl Mesh {
    /// Constructs a mesh from unpacked attribute values. `vertex_attributes`
    /// holds one span per attribute component, in attribute order; e.g. for
    /// a format with a `Float2Unpacked` and a `Float4PackedInTwoFloats`
    /// attribute, the first two spans feed the first attribute and the next
    /// four feed the second. `triangle_indices` holds the three vertex
    /// indices of each triangle, flattened.
    ///
    /// `packing_params` may be empty (every attribute uses the default
    /// packing computed from its observed bounds), or must hold one entry
    /// per attribute, where `None` selects the default packing. Entries
    /// must be `None` for unpacked attributes.
    ///
    /// Returns an `InvalidArgument` error if:
    /// - the number of component spans disagrees with the format
    /// - the component spans differ in length
    /// - any attribute value is non-finite
    /// - any attribute's value range exceeds `f32::MAX`
    /// - more than 2^16 vertices are given
    /// - `triangle_indices.len()` is not divisible by 3
    /// - any index is ≥ the vertex count, or not representable in the
    ///   format's index format
    /// - `packing_params` is non-empty with the wrong length, names an
    ///   unpacked attribute, or cannot represent an attribute's bounds
    pub fn create(
        format: &MeshFormat,
        vertex_attributes: &[&[f32]],
        triangle_indices: &[u32],
        packing_params: &[Option<MeshAttributeCodingParams>],
    ) -> GeometryResult<Mesh> {
        let component_count = format.total_component_count();
        if vertex_attributes.len() != component_count {
            return Err(GeometryError::invalid_argument(format!(
                "Expected {component_count} attribute component spans, got {}",
                vertex_attributes.len()
            )));
        }
        let vertex_count = vertex_attributes.first().map_or(0, |span| span.len());
        if vertex_attributes.iter().any(|span| span.len() != vertex_count) {
            return Err(GeometryError::invalid_argument(
                "All attribute component spans must have the same length",
            ));
        }
        if vertex_count > MAX_VERTICES_PER_MESH {
            return Err(GeometryError::invalid_argument(format!(
                "A mesh supports at most 2^16 (65536) vertices; {vertex_count} given"
            )));
        }
        for (c, span) in vertex_attributes.iter().enumerate() {
            if span.iter().any(|v| !v.is_finite()) {
                return Err(GeometryError::invalid_argument(format!(
                    "Attribute component {c} contains a non-finite value"
                )));
            }
        }
        Self::validate_indices(format, triangle_indices, vertex_count)?;

        if !packing_params.is_empty() && packing_params.len() != format.attributes().len() {
            return Err(GeometryError::invalid_argument(format!(
                "Expected {} packing params, got {}",
                format.attributes().len(),
                packing_params.len()
            )));
        }

        let bounds = compute_attribute_bounds(format, vertex_attributes)?;

        let mut unpacking_params = Vec::with_capacity(format.attributes().len());
        for (i, attribute) in format.attributes().iter().enumerate() {
            let given = packing_params.get(i).and_then(|p| p.as_ref());
            if !attribute.attribute_type.is_packed() {
                if given.is_some() {
                    return Err(GeometryError::invalid_argument(format!(
                        "Packing params were supplied for unpacked attribute {i}"
                    )));
                }
                unpacking_params.push(MeshAttributeCodingParams::identity(
                    attribute.attribute_type.component_count(),
                ));
                continue;
            }
            let attribute_bounds = bounds.get(i).cloned().unwrap_or_default();
            let params = match given {
                Some(params) => {
                    if vertex_count > 0 {
                        packing::validate_coding_params(
                            i,
                            attribute.attribute_type,
                            params,
                            &attribute_bounds,
                        )?;
                    }
                    params.clone()
                }
                None => packing::default_coding_params(
                    attribute.attribute_type,
                    &attribute_bounds,
                ),
            };
            unpacking_params.push(params);
        }

        let vertex_data =
            pack_vertex_data(format, vertex_attributes, &unpacking_params, vertex_count);
        let index_data = pack_index_data(triangle_indices);
        let attribute_bounds = if vertex_count > 0 { Some(bounds) } else { None };

        Ok(Mesh::from_parts(
            format.clone(),
            unpacking_params,
            attribute_bounds,
            vertex_data,
            index_data,
        ))
    }

    /// Constructs a mesh from attribute values that are already quantized
    /// under `coding_params`. All attributes in `format` must be packed, and
    /// `coding_params` must hold exactly one valid entry per attribute.
    /// Beyond that, the preconditions of [`Mesh::create`] apply, except that
    /// value-range validation is skipped.
    pub fn create_from_quantized_data(
        format: &MeshFormat,
        vertex_attributes: &[&[u32]],
        triangle_indices: &[u32],
        coding_params: &[MeshAttributeCodingParams],
    ) -> GeometryResult<Mesh> {
        if let Some(unpacked) = format
            .attributes()
            .iter()
            .position(|a| !a.attribute_type.is_packed())
        {
            return Err(GeometryError::invalid_argument(format!(
                "Cannot create a mesh from quantized data: attribute {unpacked} is unpacked"
            )));
        }
        let component_count = format.total_component_count();
        if vertex_attributes.len() != component_count {
            return Err(GeometryError::invalid_argument(format!(
                "Expected {component_count} attribute component spans, got {}",
                vertex_attributes.len()
            )));
        }
        let vertex_count = vertex_attributes.first().map_or(0, |span| span.len());
        if vertex_attributes.iter().any(|span| span.len() != vertex_count) {
            return Err(GeometryError::invalid_argument(
                "All attribute component spans must have the same length",
            ));
        }
        if vertex_count > MAX_VERTICES_PER_MESH {
            return Err(GeometryError::invalid_argument(format!(
                "A mesh supports at most 2^16 (65536) vertices; {vertex_count} given"
            )));
        }
        Self::validate_indices(format, triangle_indices, vertex_count)?;
        if coding_params.len() != format.attributes().len() {
            return Err(GeometryError::invalid_argument(format!(
                "Expected {} coding params, got {}",
                format.attributes().len(),
                coding_params.len()
            )));
        }

        let mut vertex_data =
            Vec::with_capacity(vertex_count * format.packed_vertex_stride());
        let mut bounds: Vec<MeshAttributeBounds> = Vec::with_capacity(format.attributes().len());
        for (i, attribute) in format.attributes().iter().enumerate() {
            let count = attribute.attribute_type.component_count();
            let max_int = attribute
                .attribute_type
                .max_packed_integer()
                .expect("all attributes are packed");
            let params = &coding_params[i];
            if params.components.len() != count {
                return Err(GeometryError::invalid_argument(format!(
                    "Coding params for attribute {i} have {} components; expected {count}",
                    params.components.len()
                )));
            }
            let first = format.first_component_index(i);
            let mut attribute_bounds = MeshAttributeBounds::default();
            for c in 0..count {
                let span = vertex_attributes[first + c];
                if let Some(&too_big) = span.iter().find(|&&v| v > max_int) {
                    return Err(GeometryError::invalid_argument(format!(
                        "Quantized value {too_big} for attribute {i} exceeds the \
                         {}-bit component width",
                        attribute.attribute_type.bits_per_component().unwrap()
                    )));
                }
                let mut minimum = f32::INFINITY;
                let mut maximum = f32::NEG_INFINITY;
                for &packed in span {
                    let value = packing::dequantize_component(packed, &params.components[c]);
                    minimum = minimum.min(value);
                    maximum = maximum.max(value);
                }
                attribute_bounds.minimum.push(minimum);
                attribute_bounds.maximum.push(maximum);
            }
            bounds.push(attribute_bounds);
        }
        for v in 0..vertex_count {
            for (i, attribute) in format.attributes().iter().enumerate() {
                let count = attribute.attribute_type.component_count();
                let first = format.first_component_index(i);
                let integers: SmallVec<[u32; 4]> =
                    (0..count).map(|c| vertex_attributes[first + c][v]).collect();
                packing::pack_integers(attribute.attribute_type, &integers, &mut vertex_data);
            }
        }

        let attribute_bounds = if vertex_count > 0 { Some(bounds) } else { None };
        Ok(Mesh::from_parts(
            format.clone(),
            coding_params.to_vec(),
            attribute_bounds,
            vertex_data,
            pack_index_data(triangle_indices),
        ))
    }

    fn validate_indices(
        format: &MeshFormat,
        triangle_indices: &[u32],
        vertex_count: usize,
    ) -> GeometryResult<()> {
        if triangle_indices.len() % 3 != 0 {
            return Err(GeometryError::invalid_argument(format!(
                "The number of triangle indices must be divisible by 3; got {}",
                triangle_indices.len()
            )));
        }
        let max_representable = format.index_format().max_unpacked_index();
        for &index in triangle_indices {
            if index as usize >= vertex_count {
                return Err(GeometryError::invalid_argument(format!(
                    "Triangle index {index} refers to a non-existent vertex \
                     (vertices: {vertex_count})"
                )));
            }
            if index > max_representable {
                return Err(GeometryError::invalid_argument(format!(
                    "Triangle index {index} is not representable in the index format"
                )));
            }
        }
        Ok(())
    }

    /// Assembles a mesh from already-packed buffers. Used by `create` and by
    /// `MutableMesh::as_meshes`, which packs (and possibly repairs)
    /// partitions itself.
    pub(crate) fn from_parts(
        format: MeshFormat,
        unpacking_params: Vec<MeshAttributeCodingParams>,
        attribute_bounds: Option<Vec<MeshAttributeBounds>>,
        vertex_data: Vec<u8>,
        index_data: Vec<u8>,
    ) -> Mesh {
        let vertex_count = if format.packed_vertex_stride() == 0 {
            0
        } else {
            (vertex_data.len() / format.packed_vertex_stride()) as u32
        };
        let triangle_count = (index_data.len() / (3 * BYTES_PER_INDEX)) as u32;
        Mesh {
            data: Arc::new(MeshData {
                format,
                unpacking_params,
                attribute_bounds,
                vertex_data,
                index_data,
                vertex_count,
                triangle_count,
            }),
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.data.vertex_count
    }

    pub fn triangle_count(&self) -> u32 {
        self.data.triangle_count
    }

    pub fn format(&self) -> &MeshFormat {
        &self.data.format
    }

    /// The index of the attribute holding vertex positions.
    pub fn vertex_position_attribute_index(&self) -> usize {
        self.data.format.position_attribute_index()
    }

    /// The position of the vertex at `index`. Panics if `index` is out of
    /// range.
    pub fn vertex_position(&self, index: u32) -> Point {
        let value =
            self.float_vertex_attribute(index, self.vertex_position_attribute_index());
        Point::new(value[0], value[1])
    }

    /// The unpacked value of attribute `attribute_index` on vertex
    /// `vertex_index`. Panics if either index is out of range.
    pub fn float_vertex_attribute(
        &self,
        vertex_index: u32,
        attribute_index: usize,
    ) -> SmallVec<[f32; 4]> {
        let bytes = self.packed_attribute_bytes(vertex_index, attribute_index);
        let attribute = self.data.format.attributes()[attribute_index];
        if attribute.attribute_type.is_packed() {
            let params = &self.data.unpacking_params[attribute_index];
            packing::unpack_integers(attribute.attribute_type, bytes)
                .iter()
                .zip(&params.components)
                .map(|(&packed, component)| packing::dequantize_component(packed, component))
                .collect()
        } else {
            bytes
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
                .collect()
        }
    }

    /// The quantized integer values of the packed attribute
    /// `attribute_index` on vertex `vertex_index`. Panics if either index is
    /// out of range, or if the attribute is unpacked.
    pub fn packed_integers_for_float_vertex_attribute(
        &self,
        vertex_index: u32,
        attribute_index: usize,
    ) -> SmallVec<[u32; 4]> {
        let bytes = self.packed_attribute_bytes(vertex_index, attribute_index);
        let attribute = self.data.format.attributes()[attribute_index];
        assert!(
            attribute.attribute_type.is_packed(),
            "Attribute {attribute_index} is not packed"
        );
        packing::unpack_integers(attribute.attribute_type, bytes)
    }

    fn packed_attribute_bytes(&self, vertex_index: u32, attribute_index: usize) -> &[u8] {
        assert!(
            vertex_index < self.vertex_count(),
            "Vertex index {vertex_index} is out of range (vertices: {})",
            self.vertex_count()
        );
        let attributes = self.data.format.attributes();
        assert!(
            attribute_index < attributes.len(),
            "Attribute index {attribute_index} is out of range (attributes: {})",
            attributes.len()
        );
        let attribute = attributes[attribute_index];
        let start = vertex_index as usize * self.data.format.packed_vertex_stride()
            + attribute.packed_offset;
        &self.data.vertex_data[start..start + attribute.attribute_type.packed_stride()]
    }

    /// The vertex indices of the triangle at `index`. Panics if `index` is
    /// out of range.
    pub fn triangle_indices(&self, index: u32) -> [u32; 3] {
        assert!(
            index < self.triangle_count(),
            "Triangle index {index} is out of range (triangles: {})",
            self.triangle_count()
        );
        let start = index as usize * 3 * BYTES_PER_INDEX;
        let read = |offset: usize| {
            u16::from_le_bytes(
                self.data.index_data[start + offset..start + offset + 2]
                    .try_into()
                    .unwrap(),
            ) as u32
        };
        [read(0), read(2), read(4)]
    }

    /// The position-only triangle at `index`. Panics if `index` is out of
    /// range.
    pub fn get_triangle(&self, index: u32) -> Triangle {
        let [i0, i1, i2] = self.triangle_indices(index);
        Triangle::new(
            self.vertex_position(i0),
            self.vertex_position(i1),
            self.vertex_position(i2),
        )
    }

    /// The bounds of the vertex positions; empty when the mesh has no
    /// vertices.
    pub fn bounds(&self) -> Envelope {
        let mut envelope = Envelope::new();
        if let Some(bounds) = self.attribute_bounds(self.vertex_position_attribute_index()) {
            envelope.add_point(Point::new(bounds.minimum[0], bounds.minimum[1]));
            envelope.add_point(Point::new(bounds.maximum[0], bounds.maximum[1]));
        }
        envelope
    }

    /// The `[min, max]` bounds of attribute `attribute_index`, or `None`
    /// when the mesh has no vertices. Panics if `attribute_index` is out of
    /// range.
    pub fn attribute_bounds(&self, attribute_index: usize) -> Option<&MeshAttributeBounds> {
        assert!(
            attribute_index < self.data.format.attributes().len(),
            "Attribute index {attribute_index} is out of range (attributes: {})",
            self.data.format.attributes().len()
        );
        self.data
            .attribute_bounds
            .as_ref()
            .map(|bounds| &bounds[attribute_index])
    }

    /// The params that unpack attribute `attribute_index`. Panics if
    /// `attribute_index` is out of range.
    pub fn vertex_attribute_unpacking_params(
        &self,
        attribute_index: usize,
    ) -> &MeshAttributeCodingParams {
        assert!(
            attribute_index < self.data.format.attributes().len(),
            "Attribute index {attribute_index} is out of range (attributes: {})",
            self.data.format.attributes().len()
        );
        &self.data.unpacking_params[attribute_index]
    }

    /// The raw packed vertex buffer.
    pub fn raw_vertex_data(&self) -> &[u8] {
        &self.data.vertex_data
    }

    /// The byte width of one packed vertex; equals
    /// `format().packed_vertex_stride()`.
    pub fn vertex_stride(&self) -> usize {
        self.data.format.packed_vertex_stride()
    }

    /// The raw index buffer; unsigned 16-bit little-endian indices.
    pub fn raw_index_data(&self) -> &[u8] {
        &self.data.index_data
    }

    /// The byte width of one index; always 2.
    pub fn index_stride(&self) -> usize {
        BYTES_PER_INDEX
    }
}

/// Computes per-attribute component bounds, rejecting ranges wider than
/// `f32::MAX`.
fn compute_attribute_bounds(
    format: &MeshFormat,
    vertex_attributes: &[&[f32]],
) -> GeometryResult<Vec<MeshAttributeBounds>> {
    let mut all = Vec::with_capacity(format.attributes().len());
    for (i, attribute) in format.attributes().iter().enumerate() {
        let first = format.first_component_index(i);
        let mut bounds = MeshAttributeBounds::default();
        for c in 0..attribute.attribute_type.component_count() {
            let span = vertex_attributes[first + c];
            let mut minimum = f32::INFINITY;
            let mut maximum = f32::NEG_INFINITY;
            for &value in span {
                minimum = minimum.min(value);
                maximum = maximum.max(value);
            }
            if !span.is_empty() && maximum as f64 - minimum as f64 > f32::MAX as f64 {
                return Err(GeometryError::invalid_argument(format!(
                    "The value range of attribute {i} component {c} exceeds the \
                     maximum representable float"
                )));
            }
            if span.is_empty() {
                minimum = 0.0;
                maximum = 0.0;
            }
            bounds.minimum.push(minimum);
            bounds.maximum.push(maximum);
        }
        all.push(bounds);
    }
    Ok(all)
}

fn pack_vertex_data(
    format: &MeshFormat,
    vertex_attributes: &[&[f32]],
    params: &[MeshAttributeCodingParams],
    vertex_count: usize,
) -> Vec<u8> {
    let mut data = Vec::with_capacity(vertex_count * format.packed_vertex_stride());
    for v in 0..vertex_count {
        for (i, attribute) in format.attributes().iter().enumerate() {
            let first = format.first_component_index(i);
            let count = attribute.attribute_type.component_count();
            if let Some(max_int) = attribute.attribute_type.max_packed_integer() {
                let integers: SmallVec<[u32; 4]> = (0..count)
                    .map(|c| {
                        packing::quantize_component(
                            vertex_attributes[first + c][v],
                            &params[i].components[c],
                            max_int,
                        )
                    })
                    .collect();
                packing::pack_integers(attribute.attribute_type, &integers, &mut data);
            } else {
                for c in 0..count {
                    data.extend_from_slice(&vertex_attributes[first + c][v].to_le_bytes());
                }
            }
        }
    }
    data
}

fn pack_index_data(triangle_indices: &[u32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(triangle_indices.len() * BYTES_PER_INDEX);
    for &index in triangle_indices {
        data.extend_from_slice(&(index as u16).to_le_bytes());
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::mesh::format::{AttributeId, AttributeType, ComponentCodingParams, IndexFormat};

    fn unit_triangle_mesh() -> Mesh {
        Mesh::create(
            &MeshFormat::default(),
            &[&[0.0, 10.0, 0.0], &[0.0, 0.0, 10.0]],
            &[0, 1, 2],
            &[],
        )
        .unwrap()
    }

    #[test]
    fn test_create_default_format() {
        let mesh = unit_triangle_mesh();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertex_stride(), 8);
        assert_eq!(mesh.index_stride(), 2);
        assert_eq!(mesh.vertex_position_attribute_index(), 0);
        assert_eq!(mesh.vertex_position(1), Point::new(10.0, 0.0));
        assert_eq!(mesh.triangle_indices(0), [0, 1, 2]);
        assert_eq!(
            mesh.get_triangle(0),
            Triangle::new(
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 10.0)
            )
        );
        // Unpacked attributes carry identity unpacking params.
        assert_eq!(
            mesh.vertex_attribute_unpacking_params(0),
            &MeshAttributeCodingParams::identity(2)
        );
        assert_eq!(mesh.raw_vertex_data().len(), 24);
        assert_eq!(mesh.raw_index_data(), &[0u8, 0, 1, 0, 2, 0]);
    }

    #[test]
    fn test_bounds_enclose_positions() {
        let mesh = unit_triangle_mesh();
        let rect = mesh.bounds().as_rect().unwrap();
        assert_eq!(rect.x_min(), 0.0);
        assert_eq!(rect.y_min(), 0.0);
        assert_eq!(rect.x_max(), 10.0);
        assert_eq!(rect.y_max(), 10.0);

        let empty = Mesh::default();
        assert!(empty.bounds().is_empty());
    }

    #[test]
    fn test_packed_position_round_trips_within_precision() {
        let format = MeshFormat::new(
            &[(AttributeType::Float2PackedInOneFloat, AttributeId::Position)],
            IndexFormat::Unpacked16Packed16,
        )
        .unwrap();
        let xs = [0.0f32, 4.0, 7.25, 10.0];
        let ys = [-5.0f32, 0.0, 2.5, 5.0];
        let mesh = Mesh::create(&format, &[&xs, &ys], &[0, 1, 2, 1, 3, 2], &[]).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_stride(), 4);
        // 12-bit components over a range of 10 and 10: step ~0.0024.
        let step = 10.0 / 4095.0;
        for i in 0..4 {
            let p = mesh.vertex_position(i);
            assert!((p.x - xs[i as usize]).abs() <= step);
            assert!((p.y - ys[i as usize]).abs() <= step);
        }
        // The minimum is the offset, so it reproduces exactly.
        assert_eq!(mesh.vertex_position(0).x, 0.0);
        let ints = mesh.packed_integers_for_float_vertex_attribute(3, 0);
        assert_eq!(ints[0], 4095);
        assert_eq!(ints[1], 4095);
    }

    #[test]
    fn test_create_rejects_bad_inputs() {
        let format = MeshFormat::default();
        // Wrong span count.
        assert_eq!(
            Mesh::create(&format, &[&[0.0]], &[], &[]).unwrap_err().code,
            ErrorCode::InvalidArgument
        );
        // Mismatched span lengths.
        assert!(Mesh::create(&format, &[&[0.0, 1.0], &[0.0]], &[], &[]).is_err());
        // Non-finite value.
        assert!(Mesh::create(
            &format,
            &[&[0.0, f32::NAN, 1.0], &[0.0, 0.0, 1.0]],
            &[0, 1, 2],
            &[]
        )
        .is_err());
        // Range wider than f32::MAX.
        assert!(Mesh::create(
            &format,
            &[&[-f32::MAX, f32::MAX, 0.0], &[0.0, 0.0, 1.0]],
            &[0, 1, 2],
            &[]
        )
        .is_err());
        // Index count not divisible by 3.
        assert!(Mesh::create(&format, &[&[0.0, 1.0], &[0.0, 1.0]], &[0, 1], &[]).is_err());
        // Out-of-range index.
        assert!(Mesh::create(&format, &[&[0.0, 1.0], &[0.0, 1.0]], &[0, 1, 2], &[]).is_err());
        // Params for an unpacked attribute.
        assert!(Mesh::create(
            &format,
            &[&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]],
            &[0, 1, 2],
            &[Some(MeshAttributeCodingParams::identity(2))]
        )
        .is_err());
        // Wrong params length.
        assert!(Mesh::create(
            &format,
            &[&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]],
            &[0, 1, 2],
            &[None, None]
        )
        .is_err());
    }

    #[test]
    fn test_create_rejects_unrepresentable_explicit_params() {
        let format = MeshFormat::new(
            &[(AttributeType::Float2PackedInOneFloat, AttributeId::Position)],
            IndexFormat::Unpacked16Packed16,
        )
        .unwrap();
        let params = MeshAttributeCodingParams {
            components: smallvec::smallvec![
                ComponentCodingParams { offset: 5.0, scale: 1.0 },
                ComponentCodingParams { offset: 0.0, scale: 1.0 },
            ],
        };
        // The offset of 5 cannot represent the observed minimum of 0.
        assert!(Mesh::create(
            &format,
            &[&[0.0, 10.0, 0.0], &[0.0, 0.0, 10.0]],
            &[0, 1, 2],
            &[Some(params)]
        )
        .is_err());
    }

    #[test]
    fn test_create_from_quantized_data() {
        let format = MeshFormat::new(
            &[(AttributeType::Float2PackedInOneFloat, AttributeId::Position)],
            IndexFormat::Unpacked16Packed16,
        )
        .unwrap();
        let params = MeshAttributeCodingParams {
            components: smallvec::smallvec![
                ComponentCodingParams { offset: 0.0, scale: 0.5 },
                ComponentCodingParams { offset: -1.0, scale: 0.25 },
            ],
        };
        let mesh = Mesh::create_from_quantized_data(
            &format,
            &[&[0, 2, 4], &[0, 4, 8]],
            &[0, 1, 2],
            &[params],
        )
        .unwrap();
        assert_eq!(mesh.vertex_position(0), Point::new(0.0, -1.0));
        assert_eq!(mesh.vertex_position(1), Point::new(1.0, 0.0));
        assert_eq!(mesh.vertex_position(2), Point::new(2.0, 1.0));
        let bounds = mesh.attribute_bounds(0).unwrap();
        assert_eq!(bounds.minimum.as_slice(), &[0.0, -1.0]);
        assert_eq!(bounds.maximum.as_slice(), &[2.0, 1.0]);
    }

    #[test]
    fn test_create_from_quantized_data_rejects_unpacked_formats() {
        let format = MeshFormat::default();
        assert!(Mesh::create_from_quantized_data(
            &format,
            &[&[0, 1], &[0, 1]],
            &[],
            &[MeshAttributeCodingParams::identity(2)]
        )
        .is_err());
    }

    #[test]
    fn test_create_from_quantized_data_rejects_overwide_integers() {
        let format = MeshFormat::new(
            &[(AttributeType::Float2PackedInOneFloat, AttributeId::Position)],
            IndexFormat::Unpacked16Packed16,
        )
        .unwrap();
        let params = MeshAttributeCodingParams::identity(2);
        // 4096 does not fit in 12 bits.
        assert!(Mesh::create_from_quantized_data(
            &format,
            &[&[0, 4096, 0], &[0, 0, 1]],
            &[0, 1, 2],
            &[params]
        )
        .is_err());
    }

    #[test]
    fn test_clones_share_data() {
        let mesh = unit_triangle_mesh();
        let copy = mesh.clone();
        assert!(std::ptr::eq(mesh.raw_vertex_data(), copy.raw_vertex_data()));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_vertex_position_out_of_range_panics() {
        let _ = unit_triangle_mesh().vertex_position(3);
    }

    #[test]
    #[should_panic(expected = "not packed")]
    fn test_packed_integers_for_unpacked_attribute_panics() {
        let _ = unit_triangle_mesh().packed_integers_for_float_vertex_attribute(0, 0);
    }
}
