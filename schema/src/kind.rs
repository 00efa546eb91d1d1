//! Closed enumerations of RPC parameter and attribute value kinds.

use std::fmt;

use crate::error::{SchemaError, SchemaResult};

/// Wire kind of one RPC parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ParamKind {
    Uint32 = 0,
    Int32 = 1,
    Float = 2,
    String = 3,
    Uint64 = 4,
    Int64 = 5,
    Uint16 = 6,
    Int16 = 7,
    Uint8 = 8,
    Int8 = 9,
    VectorUint8 = 10,
    CompressedString = 11,
}

impl ParamKind {
    /// Parses a parameter kind from its 1-byte tag.
    pub const fn parse(tag: u8) -> SchemaResult<Self> {
        Ok(match tag {
            0 => Self::Uint32,
            1 => Self::Int32,
            2 => Self::Float,
            3 => Self::String,
            4 => Self::Uint64,
            5 => Self::Int64,
            6 => Self::Uint16,
            7 => Self::Int16,
            8 => Self::Uint8,
            9 => Self::Int8,
            10 => Self::VectorUint8,
            11 => Self::CompressedString,
            _ => return Err(SchemaError::UnknownParameterKind { tag }),
        })
    }

    /// Returns the raw tag.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Numeric bit width, or `None` for variable-length and pair kinds.
    #[must_use]
    pub const fn bit_width(self) -> Option<u32> {
        match self {
            Self::Uint32 | Self::Int32 | Self::Float => Some(32),
            Self::Uint64 | Self::Int64 => Some(64),
            Self::Uint16 | Self::Int16 => Some(16),
            Self::Uint8 | Self::Int8 => Some(8),
            Self::String | Self::VectorUint8 | Self::CompressedString => None,
        }
    }

    /// All-ones mask of [`bit_width`](Self::bit_width) bits.
    #[must_use]
    pub const fn mask(self) -> Option<u64> {
        match self.bit_width() {
            Some(64) => Some(u64::MAX),
            Some(bits) => Some((1u64 << bits) - 1),
            None => None,
        }
    }

    /// Bytes a value of this kind occupies, when fixed.
    #[must_use]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::VectorUint8 => Some(2),
            _ => match self.bit_width() {
                Some(bits) => Some(bits as usize / 8),
                None => None,
            },
        }
    }

    /// Returns `true` for kinds that carry a single integer or float.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.bit_width().is_some()
    }

    /// Canonical kind name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint32 => "Uint32",
            Self::Int32 => "Int32",
            Self::Float => "Float",
            Self::String => "String",
            Self::Uint64 => "Uint64",
            Self::Int64 => "Int64",
            Self::Uint16 => "Uint16",
            Self::Int16 => "Int16",
            Self::Uint8 => "Uint8",
            Self::Int8 => "Int8",
            Self::VectorUint8 => "VectorUint8",
            Self::CompressedString => "CompressedString",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire kind of one entity-map attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum AttributeKind {
    Uninitialized = 0,
    Uint32 = 1,
    Int32 = 2,
    Float = 3,
    String = 4,
    Vector2 = 5,
    EntityType = 6,
    ArrayVector2 = 7,
    ArrayUint32 = 8,
    Uint16 = 9,
    Uint8 = 10,
    Int16 = 11,
    Int8 = 12,
    Uint64 = 13,
    Int64 = 14,
    Double = 15,
    ArrayInt32 = 16,
    ArrayUint8 = 17,
}

impl AttributeKind {
    /// Parses an attribute kind from its 4-byte tag.
    pub const fn parse(tag: u32) -> SchemaResult<Self> {
        Ok(match tag {
            0 => Self::Uninitialized,
            1 => Self::Uint32,
            2 => Self::Int32,
            3 => Self::Float,
            4 => Self::String,
            5 => Self::Vector2,
            6 => Self::EntityType,
            7 => Self::ArrayVector2,
            8 => Self::ArrayUint32,
            9 => Self::Uint16,
            10 => Self::Uint8,
            11 => Self::Int16,
            12 => Self::Int8,
            13 => Self::Uint64,
            14 => Self::Int64,
            15 => Self::Double,
            16 => Self::ArrayInt32,
            17 => Self::ArrayUint8,
            _ => return Err(SchemaError::UnknownAttributeKind { tag }),
        })
    }

    /// Returns the raw tag.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Kinds the server declares but never puts bytes on the wire for.
    #[must_use]
    pub const fn is_zero_width(self) -> bool {
        matches!(
            self,
            Self::Uninitialized | Self::EntityType | Self::Uint64 | Self::Int64 | Self::Double
        )
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
