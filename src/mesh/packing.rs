//! Quantization and partitioning internals shared by `Mesh` and
//! `MutableMesh`.

use log::debug;
use smallvec::SmallVec;
use std::collections::HashMap;

use super::format::{
    AttributeType, ComponentCodingParams, MeshAttributeBounds, MeshAttributeCodingParams,
    BITS_PER_PACKED_FLOAT,
};
use crate::errors::{GeometryError, GeometryResult};

/// Computes the default coding params for an attribute from its observed
/// bounds, spreading the full integer range uniformly across `[min, max]`.
pub(crate) fn default_coding_params(
    attribute_type: AttributeType,
    bounds: &MeshAttributeBounds,
) -> MeshAttributeCodingParams {
    let Some(max_int) = attribute_type.max_packed_integer() else {
        return MeshAttributeCodingParams::identity(attribute_type.component_count());
    };
    let components = bounds
        .minimum
        .iter()
        .zip(&bounds.maximum)
        .map(|(&min, &max)| {
            let scale = if max > min {
                ((max as f64 - min as f64) / max_int as f64) as f32
            } else {
                1.0
            };
            ComponentCodingParams { offset: min, scale }
        })
        .collect();
    MeshAttributeCodingParams { components }
}

/// Checks that `params` is well-formed for `attribute_type` and can
/// represent every value in `bounds`.
pub(crate) fn validate_coding_params(
    attribute_index: usize,
    attribute_type: AttributeType,
    params: &MeshAttributeCodingParams,
    bounds: &MeshAttributeBounds,
) -> GeometryResult<()> {
    if params.components.len() != attribute_type.component_count() {
        return Err(GeometryError::invalid_argument(format!(
            "Coding params for attribute {attribute_index} have {} components; \
             {attribute_type:?} has {}",
            params.components.len(),
            attribute_type.component_count()
        )));
    }
    let Some(max_int) = attribute_type.max_packed_integer() else {
        // Unpacked attributes take no params; the caller rejects them before
        // getting here.
        return Ok(());
    };
    for (c, component) in params.components.iter().enumerate() {
        if !component.offset.is_finite() || !component.scale.is_finite() {
            return Err(GeometryError::invalid_argument(format!(
                "Coding params for attribute {attribute_index} component {c} \
                 are non-finite"
            )));
        }
        if component.scale <= 0.0 {
            return Err(GeometryError::invalid_argument(format!(
                "Coding params for attribute {attribute_index} component {c} \
                 have non-positive scale {}",
                component.scale
            )));
        }
        let lo = (bounds.minimum[c] as f64 - component.offset as f64) / component.scale as f64;
        let hi = (bounds.maximum[c] as f64 - component.offset as f64) / component.scale as f64;
        if lo.round() < 0.0 || hi.round() > max_int as f64 {
            return Err(GeometryError::invalid_argument(format!(
                "Coding params for attribute {attribute_index} component {c} cannot \
                 represent the value range [{}, {}]",
                bounds.minimum[c], bounds.maximum[c]
            )));
        }
    }
    Ok(())
}

/// Quantizes one component value, clamped into the representable range.
pub(crate) fn quantize_component(
    value: f32,
    params: &ComponentCodingParams,
    max_int: u32,
) -> u32 {
    let quantized = ((value as f64 - params.offset as f64) / params.scale as f64).round();
    quantized.clamp(0.0, max_int as f64) as u32
}

/// Reconstructs the unpacked value of one component.
pub(crate) fn dequantize_component(packed: u32, params: &ComponentCodingParams) -> f32 {
    params.offset + params.scale * packed as f32
}

/// Appends the packed byte encoding of one attribute's quantized integers.
/// The component bits are concatenated, first component most significant,
/// and emitted as 24-bit payload floats.
pub(crate) fn pack_integers(attribute_type: AttributeType, integers: &[u32], out: &mut Vec<u8>) {
    let bits = attribute_type
        .bits_per_component()
        .expect("only packed attributes have integer encodings");
    let mut acc: u128 = 0;
    for &int in integers {
        acc = (acc << bits) | int as u128;
    }
    let float_count = attribute_type.packed_float_count();
    let payload_mask = (1u128 << BITS_PER_PACKED_FLOAT) - 1;
    for i in 0..float_count {
        let shift = BITS_PER_PACKED_FLOAT * (float_count - 1 - i) as u32;
        let payload = ((acc >> shift) & payload_mask) as u32;
        out.extend_from_slice(&(payload as f32).to_le_bytes());
    }
}

/// Reads back the quantized integers of one attribute from its packed bytes.
pub(crate) fn unpack_integers(
    attribute_type: AttributeType,
    bytes: &[u8],
) -> SmallVec<[u32; 4]> {
    let bits = attribute_type
        .bits_per_component()
        .expect("only packed attributes have integer encodings");
    let float_count = attribute_type.packed_float_count();
    let mut acc: u128 = 0;
    for i in 0..float_count {
        let word = f32::from_le_bytes(bytes[4 * i..4 * i + 4].try_into().unwrap());
        acc = (acc << BITS_PER_PACKED_FLOAT) | word as u128;
    }
    let count = attribute_type.component_count();
    let mask = (1u128 << bits) - 1;
    (0..count)
        .map(|c| ((acc >> (bits * (count - 1 - c) as u32)) & mask) as u32)
        .collect()
}

/// One partition of a triangle list, with vertices remapped to a local,
/// first-use-ordered index space.
#[derive(Debug, Default)]
pub(crate) struct Partition {
    /// Triangles with local vertex indices.
    pub triangles: Vec<[u32; 3]>,
    /// The original vertex index for each local index.
    pub vertex_indices: Vec<u32>,
}

/// Splits `triangles` into partitions that each reference at most
/// `max_vertices_per_partition` distinct vertices. Triangles keep their
/// relative order; vertices are numbered in order of first use within each
/// partition. Returns an empty list when there are no triangles.
pub(crate) fn partition_triangles(
    triangles: &[[u32; 3]],
    max_vertices_per_partition: usize,
) -> Vec<Partition> {
    let mut partitions: Vec<Partition> = Vec::new();
    let mut current = Partition::default();
    let mut local_indices: HashMap<u32, u32> = HashMap::new();

    for triangle in triangles {
        let new_vertices = triangle
            .iter()
            .filter(|&&v| !local_indices.contains_key(&v))
            .collect::<std::collections::HashSet<_>>()
            .len();
        if !current.triangles.is_empty()
            && local_indices.len() + new_vertices > max_vertices_per_partition
        {
            partitions.push(std::mem::take(&mut current));
            local_indices.clear();
        }
        let mut local = [0u32; 3];
        for (slot, &vertex) in local.iter_mut().zip(triangle) {
            let next = local_indices.len() as u32;
            let index = *local_indices.entry(vertex).or_insert(next);
            if index == next {
                current.vertex_indices.push(vertex);
            }
            *slot = index;
        }
        current.triangles.push(local);
    }
    if !current.triangles.is_empty() {
        partitions.push(current);
    }
    if partitions.len() > 1 {
        debug!(
            "partitioned {} triangles into {} meshes",
            triangles.len(),
            partitions.len()
        );
    }
    partitions
}

/// Candidate integer nudges for winding repair, ordered by distance; each
/// coordinate moves by at most two quantization steps.
const REPAIR_NUDGES: [(i64, i64); 24] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
    (2, 0),
    (-2, 0),
    (0, 2),
    (0, -2),
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
    (2, 2),
    (2, -2),
    (-2, 2),
    (-2, -2),
];

fn quantized_determinant(positions: &[[u32; 2]], triangle: &[u32; 3]) -> i64 {
    let a = positions[triangle[0] as usize];
    let b = positions[triangle[1] as usize];
    let c = positions[triangle[2] as usize];
    let ab_x = b[0] as i64 - a[0] as i64;
    let ab_y = b[1] as i64 - a[1] as i64;
    let ac_x = c[0] as i64 - a[0] as i64;
    let ac_y = c[1] as i64 - a[1] as i64;
    ab_x * ac_y - ab_y * ac_x
}

/// Attempts to restore a non-negative winding to triangles whose signed
/// area flipped under quantization, by nudging single vertices by up to two
/// quantization steps per coordinate. A nudge is accepted only if it fixes
/// the triangle without flipping any currently-non-negative triangle that
/// shares the vertex. Returns the number of triangles left unrepaired.
pub(crate) fn repair_flipped_triangles(
    positions: &mut [[u32; 2]],
    triangles: &[[u32; 3]],
    max_int: u32,
) -> usize {
    let mut adjacency: HashMap<u32, Vec<usize>> = HashMap::new();
    for (t, triangle) in triangles.iter().enumerate() {
        for &v in triangle {
            adjacency.entry(v).or_default().push(t);
        }
    }

    let mut unrepaired = 0;
    for t in 0..triangles.len() {
        if quantized_determinant(positions, &triangles[t]) >= 0 {
            continue;
        }
        let mut fixed = false;
        'candidates: for &v in &triangles[t] {
            let neighbors = &adjacency[&v];
            for (dx, dy) in REPAIR_NUDGES {
                let original = positions[v as usize];
                let nx = original[0] as i64 + dx;
                let ny = original[1] as i64 + dy;
                if nx < 0 || ny < 0 || nx > max_int as i64 || ny > max_int as i64 {
                    continue;
                }
                let previously_non_negative: Vec<usize> = neighbors
                    .iter()
                    .copied()
                    .filter(|&n| n != t && quantized_determinant(positions, &triangles[n]) >= 0)
                    .collect();
                positions[v as usize] = [nx as u32, ny as u32];
                let repaired = quantized_determinant(positions, &triangles[t]) >= 0
                    && previously_non_negative
                        .iter()
                        .all(|&n| quantized_determinant(positions, &triangles[n]) >= 0);
                if repaired {
                    fixed = true;
                    break 'candidates;
                }
                positions[v as usize] = original;
            }
        }
        if !fixed {
            unrepaired += 1;
        }
    }
    unrepaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::format::AttributeId;
    use crate::mesh::format::MeshFormat;

    #[test]
    fn test_pack_unpack_round_trip() {
        for (attribute_type, ints) in [
            (AttributeType::Float2PackedInOneFloat, vec![4095u32, 17]),
            (AttributeType::Float3PackedInOneFloat, vec![255, 0, 128]),
            (AttributeType::Float3PackedInTwoFloats, vec![65535, 1, 40000]),
            (AttributeType::Float4PackedInOneFloat, vec![63, 0, 31, 1]),
            (AttributeType::Float4PackedInTwoFloats, vec![4095, 0, 2048, 9]),
            (
                AttributeType::Float4PackedInThreeFloats,
                vec![262143, 0, 131072, 5],
            ),
        ] {
            let mut bytes = Vec::new();
            pack_integers(attribute_type, &ints, &mut bytes);
            assert_eq!(bytes.len(), attribute_type.packed_stride());
            let unpacked = unpack_integers(attribute_type, &bytes);
            assert_eq!(unpacked.as_slice(), ints.as_slice());
        }
    }

    #[test]
    fn test_packed_floats_hold_integral_payloads() {
        let mut bytes = Vec::new();
        pack_integers(AttributeType::Float2PackedInOneFloat, &[4095, 4095], &mut bytes);
        let word = f32::from_le_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(word, word.trunc());
        assert!(word < (1 << 24) as f32);
    }

    #[test]
    fn test_default_params_cover_range() {
        let bounds = MeshAttributeBounds {
            minimum: smallvec::smallvec![-10.0, 0.0],
            maximum: smallvec::smallvec![10.0, 0.0],
        };
        let params = default_coding_params(AttributeType::Float2PackedInOneFloat, &bounds);
        assert_eq!(params.components[0].offset, -10.0);
        // A zero-extent component falls back to unit scale.
        assert_eq!(params.components[1].scale, 1.0);
        assert!(
            validate_coding_params(0, AttributeType::Float2PackedInOneFloat, &params, &bounds)
                .is_ok()
        );
        let max = quantize_component(10.0, &params.components[0], 4095);
        assert_eq!(max, 4095);
        let restored = dequantize_component(max, &params.components[0]);
        assert!((restored - 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_validate_rejects_unrepresentable_params() {
        let bounds = MeshAttributeBounds {
            minimum: smallvec::smallvec![0.0, 0.0],
            maximum: smallvec::smallvec![100.0, 1.0],
        };
        // Offset above the minimum makes the minimum unrepresentable.
        let params = MeshAttributeCodingParams {
            components: smallvec::smallvec![
                ComponentCodingParams { offset: 50.0, scale: 1.0 },
                ComponentCodingParams::IDENTITY,
            ],
        };
        assert!(
            validate_coding_params(0, AttributeType::Float2PackedInOneFloat, &params, &bounds)
                .is_err()
        );
        // Tiny scale overflows the integer range.
        let params = MeshAttributeCodingParams {
            components: smallvec::smallvec![
                ComponentCodingParams { offset: 0.0, scale: 1e-3 },
                ComponentCodingParams::IDENTITY,
            ],
        };
        assert!(
            validate_coding_params(0, AttributeType::Float2PackedInOneFloat, &params, &bounds)
                .is_err()
        );
    }

    #[test]
    fn test_partition_respects_vertex_limit() {
        // A strip of 6 triangles over 8 vertices, limited to 4 vertices per
        // partition.
        let triangles: Vec<[u32; 3]> = (0..6u32)
            .map(|i| {
                if i % 2 == 0 {
                    [i, i + 1, i + 2]
                } else {
                    [i, i + 2, i + 1]
                }
            })
            .collect();
        let partitions = partition_triangles(&triangles, 4);
        assert!(partitions.len() > 1);
        let mut total_triangles = 0;
        for partition in &partitions {
            assert!(partition.vertex_indices.len() <= 4);
            total_triangles += partition.triangles.len();
            for triangle in &partition.triangles {
                for &local in triangle {
                    assert!((local as usize) < partition.vertex_indices.len());
                }
            }
        }
        assert_eq!(total_triangles, 6);
        // First-use ordering within the first partition.
        assert_eq!(partitions[0].vertex_indices[0], 0);
        assert_eq!(partitions[0].triangles[0], [0, 1, 2]);
    }

    #[test]
    fn test_partition_of_empty_list_is_empty() {
        assert!(partition_triangles(&[], 4).is_empty());
    }

    #[test]
    fn test_repair_fixes_flipped_triangle() {
        // The third vertex is one step below the base line, giving the
        // triangle a slightly negative winding that one nudge can fix.
        let mut positions = vec![[0u32, 10], [100, 10], [50, 9]];
        let triangles = vec![[0u32, 1, 2]];
        assert!(quantized_determinant(&positions, &triangles[0]) < 0);
        let unrepaired = repair_flipped_triangles(&mut positions, &triangles, 4095);
        assert_eq!(unrepaired, 0);
        assert!(quantized_determinant(&positions, &triangles[0]) >= 0);
    }

    #[test]
    fn test_repair_does_not_flip_neighbors() {
        // Two triangles sharing an edge; the second starts barely positive.
        let mut positions = vec![[0u32, 10], [10, 10], [5, 9], [5, 12]];
        let triangles = vec![[0u32, 1, 2], [0, 1, 3]];
        assert!(quantized_determinant(&positions, &triangles[0]) < 0);
        assert!(quantized_determinant(&positions, &triangles[1]) >= 0);
        repair_flipped_triangles(&mut positions, &triangles, 4095);
        assert!(quantized_determinant(&positions, &triangles[1]) >= 0);
    }

    #[test]
    fn test_identity_params_for_unpacked() {
        let format = MeshFormat::default();
        let attribute = format.attributes()[format.position_attribute_index()];
        assert_eq!(attribute.id, AttributeId::Position);
        let bounds = MeshAttributeBounds {
            minimum: smallvec::smallvec![0.0, 0.0],
            maximum: smallvec::smallvec![1.0, 1.0],
        };
        let params = default_coding_params(attribute.attribute_type, &bounds);
        assert_eq!(params, MeshAttributeCodingParams::identity(2));
    }
}
