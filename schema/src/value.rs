//! Decoded attribute and RPC parameter values.

use std::fmt;

use crate::kind::AttributeKind;

/// A 2D position with both axes already scaled to world units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One decoded value.
///
/// `Unset` stands for attributes whose kind carries no bytes on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    #[default]
    Unset,
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Float(f64),
    String(String),
    Vector2(Vector2),
    VectorU8 { x: u8, y: u8 },
    ArrayVector2(Vec<Vector2>),
    ArrayU32(Vec<u32>),
    ArrayI32(Vec<i32>),
    ArrayU8(Vec<u8>),
}

impl Value {
    /// The value an attribute of `kind` takes when nothing else is known.
    #[must_use]
    pub const fn zero_for(kind: AttributeKind) -> Self {
        match kind {
            AttributeKind::Uint32 => Self::U32(0),
            AttributeKind::Int32 => Self::I32(0),
            AttributeKind::Float => Self::Float(0.0),
            AttributeKind::String => Self::String(String::new()),
            AttributeKind::Vector2 => Self::Vector2(Vector2::new(0.0, 0.0)),
            AttributeKind::ArrayVector2 => Self::ArrayVector2(Vec::new()),
            AttributeKind::ArrayUint32 => Self::ArrayU32(Vec::new()),
            AttributeKind::Uint16 => Self::U16(0),
            AttributeKind::Uint8 => Self::U8(0),
            AttributeKind::Int16 => Self::I16(0),
            AttributeKind::Int8 => Self::I8(0),
            AttributeKind::ArrayInt32 => Self::ArrayI32(Vec::new()),
            AttributeKind::ArrayUint8 => Self::ArrayU8(Vec::new()),
            AttributeKind::Uninitialized
            | AttributeKind::EntityType
            | AttributeKind::Uint64
            | AttributeKind::Int64
            | AttributeKind::Double => Self::Unset,
        }
    }

    /// Short name of the variant, used in type-mismatch errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::U8(_) => "u8",
            Self::I8(_) => "i8",
            Self::U16(_) => "u16",
            Self::I16(_) => "i16",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::U64(_) => "u64",
            Self::I64(_) => "i64",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Vector2(_) => "vector2",
            Self::VectorU8 { .. } => "vector_u8",
            Self::ArrayVector2(_) => "array_vector2",
            Self::ArrayU32(_) => "array_u32",
            Self::ArrayI32(_) => "array_i32",
            Self::ArrayU8(_) => "array_u8",
        }
    }

    /// Integer payload of any integer variant.
    #[must_use]
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::U8(v) => Some(v.into()),
            Self::I8(v) => Some(v.into()),
            Self::U16(v) => Some(v.into()),
            Self::I16(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::U64(v) => Some(v.into()),
            Self::I64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Numeric payload of any integer or float variant.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            _ => self.as_integer().map(|v| v as f64),
        }
    }

    /// String payload.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("-"),
            Self::U8(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Vector2(v) => write!(f, "({}, {})", v.x, v.y),
            Self::VectorU8 { x, y } => write!(f, "({x}, {y})"),
            Self::ArrayVector2(items) => write!(f, "{items:?}"),
            Self::ArrayU32(items) => write!(f, "{items:?}"),
            Self::ArrayI32(items) => write!(f, "{items:?}"),
            Self::ArrayU8(items) => write!(f, "{items:?}"),
        }
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::U32(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vector2> for Value {
    fn from(value: Vector2) -> Self {
        Self::Vector2(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values() {
        assert_eq!(Value::zero_for(AttributeKind::Uint32), Value::U32(0));
        assert_eq!(
            Value::zero_for(AttributeKind::Vector2),
            Value::Vector2(Vector2::default())
        );
        assert_eq!(Value::zero_for(AttributeKind::Double), Value::Unset);
    }

    #[test]
    fn integer_views() {
        assert_eq!(Value::I8(-3).as_integer(), Some(-3));
        assert_eq!(Value::U64(u64::MAX).as_integer(), Some(i128::from(u64::MAX)));
        assert_eq!(Value::Float(1.5).as_integer(), None);
        assert_eq!(Value::U16(7).as_f64(), Some(7.0));
        assert_eq!(Value::from("x").as_str(), Some("x"));
    }

    #[test]
    fn display() {
        assert_eq!(Value::U32(5).to_string(), "5");
        assert_eq!(Value::from(Vector2::new(1.5, -2.0)).to_string(), "(1.5, -2)");
        assert_eq!(Value::Unset.to_string(), "-");
    }
}
