//! Vertex attribute schemas for meshes.
//!
//! A [`MeshFormat`] is a declarative description of the attributes stored on
//! each vertex of a mesh, and of the width of triangle indices. Each
//! attribute has a type, which fixes its component count and its packed
//! representation, and an id, which gives it a semantic role. Exactly one
//! attribute must have the [`AttributeId::Position`] role.
//!
//! Packed attribute types quantize their components into 24-bit payload
//! floats: each packed float stores an integer below 2^24, which an `f32`
//! represents exactly, and the components' bits are concatenated across
//! those floats. For example `Float2PackedInOneFloat` stores two 12-bit
//! integers in a single float, and `Float4PackedInThreeFloats` stores four
//! 18-bit integers across three floats.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::errors::{GeometryError, GeometryResult};

/// The number of payload bits carried by each packed float.
pub(crate) const BITS_PER_PACKED_FLOAT: u32 = 24;

/// The type of a vertex attribute, fixing its component count and packed
/// byte representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    Float1Unpacked,
    Float2Unpacked,
    Float3Unpacked,
    Float4Unpacked,
    Float2PackedInOneFloat,
    Float3PackedInOneFloat,
    Float3PackedInTwoFloats,
    Float4PackedInOneFloat,
    Float4PackedInTwoFloats,
    Float4PackedInThreeFloats,
}

impl AttributeType {
    /// The number of logical float components.
    pub const fn component_count(self) -> usize {
        match self {
            AttributeType::Float1Unpacked => 1,
            AttributeType::Float2Unpacked | AttributeType::Float2PackedInOneFloat => 2,
            AttributeType::Float3Unpacked
            | AttributeType::Float3PackedInOneFloat
            | AttributeType::Float3PackedInTwoFloats => 3,
            AttributeType::Float4Unpacked
            | AttributeType::Float4PackedInOneFloat
            | AttributeType::Float4PackedInTwoFloats
            | AttributeType::Float4PackedInThreeFloats => 4,
        }
    }

    pub const fn is_packed(self) -> bool {
        self.bits_per_component().is_some()
    }

    /// The quantization width of each component, or `None` for unpacked
    /// types.
    pub const fn bits_per_component(self) -> Option<u32> {
        match self {
            AttributeType::Float1Unpacked
            | AttributeType::Float2Unpacked
            | AttributeType::Float3Unpacked
            | AttributeType::Float4Unpacked => None,
            AttributeType::Float2PackedInOneFloat => Some(12),
            AttributeType::Float3PackedInOneFloat => Some(8),
            AttributeType::Float3PackedInTwoFloats => Some(16),
            AttributeType::Float4PackedInOneFloat => Some(6),
            AttributeType::Float4PackedInTwoFloats => Some(12),
            AttributeType::Float4PackedInThreeFloats => Some(18),
        }
    }

    /// The number of floats an attribute of this type occupies in packed
    /// form.
    pub const fn packed_float_count(self) -> usize {
        match self {
            AttributeType::Float1Unpacked => 1,
            AttributeType::Float2Unpacked => 2,
            AttributeType::Float3Unpacked => 3,
            AttributeType::Float4Unpacked => 4,
            AttributeType::Float2PackedInOneFloat
            | AttributeType::Float3PackedInOneFloat
            | AttributeType::Float4PackedInOneFloat => 1,
            AttributeType::Float3PackedInTwoFloats
            | AttributeType::Float4PackedInTwoFloats => 2,
            AttributeType::Float4PackedInThreeFloats => 3,
        }
    }

    /// The byte width of this attribute in a packed vertex.
    pub const fn packed_stride(self) -> usize {
        self.packed_float_count() * 4
    }

    /// The byte width of this attribute in an unpacked vertex.
    pub const fn unpacked_stride(self) -> usize {
        self.component_count() * 4
    }

    /// The largest packed integer a component can hold, for packed types.
    pub(crate) const fn max_packed_integer(self) -> Option<u32> {
        match self.bits_per_component() {
            Some(bits) => Some((1u32 << bits) - 1),
            None => None,
        }
    }
}

/// The semantic role of a vertex attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeId {
    /// The vertex position; required, exactly once, with a two-component
    /// type.
    Position,
    ColorShiftHsl,
    OpacityShift,
    Texture,
    SideDerivative,
    Custom0,
    Custom1,
    Custom2,
    Custom3,
    Custom4,
}

/// The width of triangle indices. The unpacked width applies to
/// [`MutableMesh`](crate::mesh::MutableMesh) storage; packed [`Mesh`]
/// indices are always 16-bit.
///
/// [`Mesh`]: crate::mesh::Mesh
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexFormat {
    /// 16-bit unpacked indices, 16-bit packed indices.
    Unpacked16Packed16,
    /// 32-bit unpacked indices, 16-bit packed indices.
    Unpacked32Packed16,
}

impl IndexFormat {
    /// The byte width of an unpacked index: 2 or 4.
    pub const fn unpacked_stride(self) -> usize {
        match self {
            IndexFormat::Unpacked16Packed16 => 2,
            IndexFormat::Unpacked32Packed16 => 4,
        }
    }

    /// The byte width of a packed index; always 2.
    pub const fn packed_stride(self) -> usize {
        2
    }

    /// The largest vertex index representable in unpacked form.
    pub const fn max_unpacked_index(self) -> u32 {
        match self {
            IndexFormat::Unpacked16Packed16 => u16::MAX as u32,
            IndexFormat::Unpacked32Packed16 => u32::MAX,
        }
    }
}

/// One attribute of a [`MeshFormat`], with its byte offsets into the
/// unpacked and packed vertex layouts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshAttribute {
    pub attribute_type: AttributeType,
    pub id: AttributeId,
    /// Byte offset of this attribute within an unpacked vertex.
    pub unpacked_offset: usize,
    /// Byte offset of this attribute within a packed vertex.
    pub packed_offset: usize,
}

/// A validated vertex schema: an ordered list of attributes plus an index
/// format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshFormat {
    attributes: Vec<MeshAttribute>,
    index_format: IndexFormat,
    position_attribute_index: usize,
    unpacked_vertex_stride: usize,
    packed_vertex_stride: usize,
}

impl Default for MeshFormat {
    /// A position-only format with unpacked float2 positions and 32-bit
    /// unpacked indices.
    fn default() -> Self {
        MeshFormat::new(
            &[(AttributeType::Float2Unpacked, AttributeId::Position)],
            IndexFormat::Unpacked32Packed16,
        )
        .expect("the default format is valid")
    }
}

impl MeshFormat {
    /// Constructs a format from `(type, id)` pairs. Returns an error if
    /// there is not exactly one `Position` attribute, if the position is not
    /// a two-component type, or if any id repeats.
    pub fn new(
        attributes: &[(AttributeType, AttributeId)],
        index_format: IndexFormat,
    ) -> GeometryResult<MeshFormat> {
        let mut built = Vec::with_capacity(attributes.len());
        let mut unpacked_offset = 0;
        let mut packed_offset = 0;
        let mut position_attribute_index = None;
        for (i, &(attribute_type, id)) in attributes.iter().enumerate() {
            if built.iter().any(|a: &MeshAttribute| a.id == id) {
                return Err(GeometryError::invalid_argument(format!(
                    "Attribute id {id:?} appears more than once"
                )));
            }
            if id == AttributeId::Position {
                if attribute_type.component_count() != 2 {
                    return Err(GeometryError::invalid_argument(format!(
                        "The position attribute must have two components; \
                         {attribute_type:?} has {}",
                        attribute_type.component_count()
                    )));
                }
                position_attribute_index = Some(i);
            }
            built.push(MeshAttribute {
                attribute_type,
                id,
                unpacked_offset,
                packed_offset,
            });
            unpacked_offset += attribute_type.unpacked_stride();
            packed_offset += attribute_type.packed_stride();
        }
        let Some(position_attribute_index) = position_attribute_index else {
            return Err(GeometryError::invalid_argument(
                "A mesh format must contain a position attribute",
            ));
        };
        Ok(MeshFormat {
            attributes: built,
            index_format,
            position_attribute_index,
            unpacked_vertex_stride: unpacked_offset,
            packed_vertex_stride: packed_offset,
        })
    }

    pub fn attributes(&self) -> &[MeshAttribute] {
        &self.attributes
    }

    pub fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    /// The index of the attribute with the `Position` role.
    pub fn position_attribute_index(&self) -> usize {
        self.position_attribute_index
    }

    /// The byte width of a full unpacked vertex.
    pub fn unpacked_vertex_stride(&self) -> usize {
        self.unpacked_vertex_stride
    }

    /// The byte width of a full packed vertex.
    pub fn packed_vertex_stride(&self) -> usize {
        self.packed_vertex_stride
    }

    pub fn unpacked_index_stride(&self) -> usize {
        self.index_format.unpacked_stride()
    }

    pub fn packed_index_stride(&self) -> usize {
        self.index_format.packed_stride()
    }

    /// The total number of float components across all attributes.
    pub fn total_component_count(&self) -> usize {
        self.attributes
            .iter()
            .map(|a| a.attribute_type.component_count())
            .sum()
    }

    /// The index of attribute `attribute_index`'s first component in the
    /// flat per-component ordering.
    pub fn first_component_index(&self, attribute_index: usize) -> usize {
        self.attributes[..attribute_index]
            .iter()
            .map(|a| a.attribute_type.component_count())
            .sum()
    }
}

/// The `{offset, scale}` linear map for one component of a packed attribute:
/// `unpacked = offset + scale · packed_integer`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentCodingParams {
    pub offset: f32,
    pub scale: f32,
}

impl ComponentCodingParams {
    pub const IDENTITY: ComponentCodingParams = ComponentCodingParams {
        offset: 0.0,
        scale: 1.0,
    };
}

/// Per-component coding params for one attribute.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshAttributeCodingParams {
    pub components: SmallVec<[ComponentCodingParams; 4]>,
}

impl MeshAttributeCodingParams {
    /// Identity params (`offset = 0`, `scale = 1`) for `component_count`
    /// components; used for unpacked attributes.
    pub fn identity(component_count: usize) -> Self {
        MeshAttributeCodingParams {
            components: (0..component_count)
                .map(|_| ComponentCodingParams::IDENTITY)
                .collect(),
        }
    }
}

/// The observed per-component `[minimum, maximum]` values of an attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshAttributeBounds {
    pub minimum: SmallVec<[f32; 4]>,
    pub maximum: SmallVec<[f32; 4]>,
}
