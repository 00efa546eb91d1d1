//! Entity-map attribute value codec.
//!
//! Shared by handshake default values and entity-update diffs. Floats are
//! fixed-point hundredths; Vector2 Y is additionally sign-inverted on the
//! wire.

use bitstream::{ByteReader, ByteWriter};
use schema::{AttributeKind, Value, Vector2};

use crate::error::{CodecError, CodecResult};

const FIXED_SCALE: f64 = 100.0;

/// Decodes one value of `kind`.
///
/// Zero-width kinds consume nothing and yield [`Value::Unset`].
pub fn decode_attribute(reader: &mut ByteReader<'_>, kind: AttributeKind) -> CodecResult<Value> {
    Ok(match kind {
        AttributeKind::Uint32 => Value::U32(reader.read_u32()?),
        AttributeKind::Int32 => Value::I32(reader.read_i32()?),
        AttributeKind::Float => Value::Float(f64::from(reader.read_i32()?) / FIXED_SCALE),
        AttributeKind::String => Value::String(reader.read_string()?),
        AttributeKind::Vector2 => {
            let (x, y) = reader.read_i32_vector2()?;
            Value::Vector2(vector_from_wire(x, y))
        }
        AttributeKind::ArrayVector2 => Value::ArrayVector2(
            reader
                .read_array_i32_vector2()?
                .into_iter()
                .map(|(x, y)| vector_from_wire(x, y))
                .collect(),
        ),
        AttributeKind::ArrayUint32 => Value::ArrayU32(reader.read_array_u32()?),
        AttributeKind::Uint16 => Value::U16(reader.read_u16()?),
        AttributeKind::Uint8 => Value::U8(reader.read_u8()?),
        AttributeKind::Int16 => Value::I16(reader.read_i16()?),
        AttributeKind::Int8 => Value::I8(reader.read_i8()?),
        AttributeKind::ArrayInt32 => Value::ArrayI32(reader.read_array_i32()?),
        AttributeKind::ArrayUint8 => Value::ArrayU8(reader.read_array_u8()?),
        AttributeKind::Uninitialized
        | AttributeKind::EntityType
        | AttributeKind::Uint64
        | AttributeKind::Int64
        | AttributeKind::Double => Value::Unset,
    })
}

/// Encodes one value of `kind`.
///
/// `None` and [`Value::Unset`] encode as the kind's zero value.
pub fn encode_attribute(
    writer: &mut ByteWriter,
    kind: AttributeKind,
    value: Option<&Value>,
    field: &str,
) -> CodecResult<()> {
    let zero;
    let value = match value {
        Some(value) if !value.is_unset() => value,
        _ => {
            zero = Value::zero_for(kind);
            &zero
        }
    };

    match (kind, value) {
        (AttributeKind::Uint32, Value::U32(v)) => writer.write_u32(*v),
        (AttributeKind::Int32, Value::I32(v)) => writer.write_i32(*v),
        (AttributeKind::Float, Value::Float(v)) => writer.write_i32(to_fixed(*v)),
        (AttributeKind::String, Value::String(s)) => writer.write_string(s)?,
        (AttributeKind::Vector2, Value::Vector2(v)) => {
            let (x, y) = vector_to_wire(*v);
            writer.write_i32_vector2(x, y);
        }
        (AttributeKind::ArrayVector2, Value::ArrayVector2(items)) => {
            let raw: Vec<(i32, i32)> = items.iter().copied().map(vector_to_wire).collect();
            writer.write_array_i32_vector2(&raw)?;
        }
        (AttributeKind::ArrayUint32, Value::ArrayU32(items)) => writer.write_array_u32(items)?,
        (AttributeKind::Uint16, Value::U16(v)) => writer.write_u16(*v),
        (AttributeKind::Uint8, Value::U8(v)) => writer.write_u8(*v),
        (AttributeKind::Int16, Value::I16(v)) => writer.write_i16(*v),
        (AttributeKind::Int8, Value::I8(v)) => writer.write_i8(*v),
        (AttributeKind::ArrayInt32, Value::ArrayI32(items)) => writer.write_array_i32(items)?,
        (AttributeKind::ArrayUint8, Value::ArrayU8(items)) => writer.write_array_u8(items)?,
        (kind, _) if kind.is_zero_width() => {}
        (kind, value) => {
            return Err(CodecError::ValueTypeMismatch {
                field: field.to_string(),
                expected: Value::zero_for(kind).type_name(),
                found: value.type_name(),
            })
        }
    }
    Ok(())
}

/// Converts a world-unit float to wire hundredths, rounding to nearest.
pub(crate) fn to_fixed(value: f64) -> i32 {
    (value * FIXED_SCALE).round() as i32
}

fn vector_from_wire(x: i32, y: i32) -> Vector2 {
    // 0.0 - y keeps a zero Y positive
    Vector2::new(f64::from(x) / FIXED_SCALE, (0.0 - f64::from(y)) / FIXED_SCALE)
}

fn vector_to_wire(v: Vector2) -> (i32, i32) {
    (to_fixed(v.x), to_fixed(-v.y))
}
