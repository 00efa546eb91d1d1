//! RPC parameter codec.
//!
//! An [`RpcDef`] lists the parameters in wire order. Callers describe the
//! fields they care about with a match list of [`ParamMatch`] entries. A
//! wire parameter binds to the first entry whose `id` equals the
//! parameter's id, or, for entries without an id, whose `kind` equals the
//! parameter's kind.
//!
//! Frames passed to and returned from this module are plaintext; the
//! stream cipher is applied by the caller (see [`crate::Session`]).

use std::collections::BTreeMap;

use bitstream::{ByteReader, ByteWriter};
use schema::{ParamDef, ParamKind, RpcDef, Value};
use wire::{expect_frame, write_rpc_header, PacketTag, RPC_ARRAY_HEADER_SIZE, RPC_HEADER_SIZE};

use crate::attribute::to_fixed;
use crate::error::{CodecError, CodecResult, CountKind, LimitKind};
use crate::limits::CodecLimits;

/// Decoded RPC fields keyed by match name.
pub type RpcValues = BTreeMap<String, Value>;

/// One semantic field the caller wants bound to a wire parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMatch {
    /// Exact parameter id; when absent the first parameter of `kind` binds.
    pub id: Option<u32>,
    pub kind: ParamKind,
    pub name: String,
    /// XOR obfuscation key for numeric parameters.
    pub key: Option<u32>,
}

impl ParamMatch {
    /// Matches the parameter with this exact id.
    #[must_use]
    pub fn by_id(id: u32, kind: ParamKind, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            kind,
            name: name.into(),
            key: None,
        }
    }

    /// Matches the first parameter of this kind.
    #[must_use]
    pub fn by_kind(kind: ParamKind, name: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            name: name.into(),
            key: None,
        }
    }

    /// Sets the XOR key.
    #[must_use]
    pub const fn with_key(mut self, key: u32) -> Self {
        self.key = Some(key);
        self
    }

    fn binds(&self, param: &ParamDef) -> bool {
        self.id == Some(param.id) || (self.id.is_none() && self.kind == param.kind)
    }
}

fn find_match<'m>(matches: &'m [ParamMatch], param: &ParamDef) -> Option<&'m ParamMatch> {
    matches.iter().find(|m| m.binds(param))
}

/// How many bytes an unmatched parameter occupies when decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedSkip {
    /// One byte, mirroring the placeholder the encoder writes.
    #[default]
    SingleByte,
    /// The full width of the parameter's declared kind.
    DeclaredWidth,
}

/// Options for RPC decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RpcDecodeOptions {
    pub unmatched: UnmatchedSkip,
}

/// Decodes a plaintext scalar RPC frame.
pub fn decode_rpc(def: &RpcDef, matches: &[ParamMatch], frame: &[u8]) -> CodecResult<RpcValues> {
    decode_rpc_with(
        def,
        matches,
        frame,
        &RpcDecodeOptions::default(),
        &wire::Limits::default(),
    )
}

/// [`decode_rpc`] with explicit options and frame limits.
pub fn decode_rpc_with(
    def: &RpcDef,
    matches: &[ParamMatch],
    frame: &[u8],
    options: &RpcDecodeOptions,
    wire_limits: &wire::Limits,
) -> CodecResult<RpcValues> {
    expect_mode(def, false)?;
    let mut reader = open_frame(def, frame, wire_limits)?;
    decode_block(&mut reader, def, matches, options)
}

/// Decodes a plaintext array-mode RPC frame into one map per repeat.
pub fn decode_rpc_array(
    def: &RpcDef,
    matches: &[ParamMatch],
    frame: &[u8],
    options: &RpcDecodeOptions,
    wire_limits: &wire::Limits,
    limits: &CodecLimits,
) -> CodecResult<Vec<RpcValues>> {
    expect_mode(def, true)?;
    let mut reader = open_frame(def, frame, wire_limits)?;
    let repeat = usize::from(reader.read_u16()?);
    debug_assert_eq!(reader.position(), RPC_ARRAY_HEADER_SIZE);
    limits.check(LimitKind::ArrayRepeat, repeat)?;
    (0..repeat)
        .map(|_| decode_block(&mut reader, def, matches, options))
        .collect()
}

/// Builds a match list naming every non-`Uint8` parameter `<Kind>_<id hex>`.
#[must_use]
pub fn auto_matches(def: &RpcDef) -> Vec<ParamMatch> {
    def.parameters
        .iter()
        .filter(|param| param.kind != ParamKind::Uint8)
        .map(|param| {
            ParamMatch::by_id(
                param.id,
                param.kind,
                format!("{}_{:x}", param.kind.name(), param.id),
            )
        })
        .collect()
}

/// Decodes a scalar RPC without a known match list, see [`auto_matches`].
pub fn auto_decode_rpc(def: &RpcDef, frame: &[u8]) -> CodecResult<RpcValues> {
    decode_rpc(def, &auto_matches(def), frame)
}

/// Encodes a plaintext scalar RPC frame.
///
/// Unmatched parameters are written as a single zero byte.
pub fn encode_rpc(def: &RpcDef, matches: &[ParamMatch], values: &RpcValues) -> CodecResult<Vec<u8>> {
    expect_mode(def, false)?;
    let mut writer = ByteWriter::new();
    write_rpc_header(&mut writer, def.wire_index);
    encode_block(&mut writer, def, matches, values)?;
    Ok(writer.finish())
}

/// Encodes a plaintext array-mode RPC frame.
pub fn encode_rpc_array(
    def: &RpcDef,
    matches: &[ParamMatch],
    items: &[RpcValues],
) -> CodecResult<Vec<u8>> {
    expect_mode(def, true)?;
    let repeat = u16::try_from(items.len()).map_err(|_| CodecError::CountOverflow {
        what: CountKind::ArrayRepeat,
        count: items.len(),
        max: usize::from(u16::MAX),
    })?;
    let mut writer = ByteWriter::new();
    write_rpc_header(&mut writer, def.wire_index);
    writer.write_u16(repeat);
    for values in items {
        encode_block(&mut writer, def, matches, values)?;
    }
    Ok(writer.finish())
}

fn expect_mode(def: &RpcDef, is_array: bool) -> CodecResult<()> {
    if def.is_array != is_array {
        return Err(CodecError::RpcModeMismatch {
            internal_id: def.internal_id,
            is_array: def.is_array,
        });
    }
    Ok(())
}

fn open_frame<'a>(
    def: &RpcDef,
    frame: &'a [u8],
    wire_limits: &wire::Limits,
) -> CodecResult<ByteReader<'a>> {
    expect_frame(frame, PacketTag::Rpc, wire_limits)?;
    let mut reader =
        ByteReader::new(frame).with_max_decompressed(wire_limits.max_decompressed_bytes);
    reader.skip(1)?;
    let index = reader.read_u32()?;
    if index != def.wire_index {
        return Err(CodecError::RpcIndexMismatch {
            expected: def.wire_index,
            found: index,
        });
    }
    debug_assert_eq!(reader.position(), RPC_HEADER_SIZE);
    Ok(reader)
}

fn decode_block(
    reader: &mut ByteReader<'_>,
    def: &RpcDef,
    matches: &[ParamMatch],
    options: &RpcDecodeOptions,
) -> CodecResult<RpcValues> {
    let mut values = RpcValues::new();
    for param in &def.parameters {
        match find_match(matches, param) {
            Some(m) => {
                let value = decode_param(reader, param.kind, m)?;
                values.insert(m.name.clone(), value);
            }
            None => skip_param(reader, param.kind, options.unmatched)?,
        }
    }
    Ok(values)
}

fn skip_param(reader: &mut ByteReader<'_>, kind: ParamKind, policy: UnmatchedSkip) -> CodecResult<()> {
    match policy {
        UnmatchedSkip::SingleByte => reader.skip(1)?,
        UnmatchedSkip::DeclaredWidth => match kind {
            ParamKind::String => {
                reader.read_string()?;
            }
            ParamKind::CompressedString => {
                let len = reader.read_u32()? as usize;
                reader.skip(len)?;
            }
            _ => reader.skip(kind.fixed_size().unwrap_or(1))?,
        },
    }
    Ok(())
}

fn decode_param(reader: &mut ByteReader<'_>, kind: ParamKind, m: &ParamMatch) -> CodecResult<Value> {
    let bits = match kind {
        ParamKind::String => return Ok(Value::String(reader.read_string()?)),
        ParamKind::CompressedString => return Ok(Value::String(reader.read_compressed_string()?)),
        ParamKind::VectorUint8 => {
            let (x, y) = reader.read_u8_vector2()?;
            return Ok(Value::VectorU8 { x, y });
        }
        ParamKind::Uint32 | ParamKind::Int32 | ParamKind::Float => u64::from(reader.read_u32()?),
        ParamKind::Uint64 | ParamKind::Int64 => reader.read_u64()?,
        ParamKind::Uint16 | ParamKind::Int16 => u64::from(reader.read_u16()?),
        ParamKind::Uint8 | ParamKind::Int8 => u64::from(reader.read_u8()?),
    };

    // The key is masked to the match's width, the value is shaped by the wire's kind
    let bits = match (m.key, m.kind.mask()) {
        (Some(key), Some(mask)) => (bits ^ u64::from(key)) & mask,
        _ => bits,
    };
    Ok(numeric_from_bits(kind, bits))
}

fn numeric_from_bits(kind: ParamKind, bits: u64) -> Value {
    match kind {
        ParamKind::Uint32 => Value::U32(bits as u32),
        ParamKind::Int32 => Value::I32(bits as u32 as i32),
        ParamKind::Float => Value::Float(f64::from(bits as u32 as i32) / 100.0),
        ParamKind::Uint64 => Value::U64(bits),
        ParamKind::Int64 => Value::I64(bits as i64),
        ParamKind::Uint16 => Value::U16(bits as u16),
        ParamKind::Int16 => Value::I16(bits as u16 as i16),
        ParamKind::Uint8 => Value::U8(bits as u8),
        ParamKind::Int8 => Value::I8(bits as u8 as i8),
        ParamKind::String | ParamKind::CompressedString | ParamKind::VectorUint8 => Value::Unset,
    }
}

fn encode_block(
    writer: &mut ByteWriter,
    def: &RpcDef,
    matches: &[ParamMatch],
    values: &RpcValues,
) -> CodecResult<()> {
    for param in &def.parameters {
        let Some(m) = find_match(matches, param) else {
            writer.write_u8(0);
            continue;
        };
        let value = values
            .get(&m.name)
            .ok_or_else(|| CodecError::MissingRpcValue {
                name: m.name.clone(),
            })?;
        encode_param(writer, param.kind, m, value)?;
    }
    Ok(())
}

fn encode_param(
    writer: &mut ByteWriter,
    kind: ParamKind,
    m: &ParamMatch,
    value: &Value,
) -> CodecResult<()> {
    let mismatch = |expected: &'static str| CodecError::ValueTypeMismatch {
        field: m.name.clone(),
        expected,
        found: value.type_name(),
    };

    match kind {
        ParamKind::String => {
            let text = value.as_str().ok_or_else(|| mismatch("string"))?;
            writer.write_string(text)?;
            return Ok(());
        }
        ParamKind::CompressedString => {
            let text = value.as_str().ok_or_else(|| mismatch("string"))?;
            writer.write_compressed_string(text)?;
            return Ok(());
        }
        ParamKind::VectorUint8 => {
            let Value::VectorU8 { x, y } = value else {
                return Err(mismatch("vector_u8"));
            };
            writer.write_u8_vector2(*x, *y);
            return Ok(());
        }
        _ => {}
    }

    let raw: i128 = if kind == ParamKind::Float {
        let v = value.as_f64().ok_or_else(|| mismatch("float"))?;
        i128::from(to_fixed(v))
    } else {
        match value.as_integer() {
            Some(v) => v,
            None => value
                .as_f64()
                .map(|v| v.round() as i128)
                .ok_or_else(|| mismatch("integer"))?,
        }
    };

    // Two's complement truncation biases negatives into the unsigned range
    let mut bits = raw as u64;
    if let Some(key) = m.key {
        bits ^= u64::from(key);
    }
    bits &= kind.mask().unwrap_or(u64::MAX);

    match kind {
        ParamKind::Uint32 | ParamKind::Int32 | ParamKind::Float => writer.write_u32(bits as u32),
        ParamKind::Uint64 | ParamKind::Int64 => writer.write_u64(bits),
        ParamKind::Uint16 | ParamKind::Int16 => writer.write_u16(bits as u16),
        ParamKind::Uint8 | ParamKind::Int8 => writer.write_u8(bits as u8),
        ParamKind::String | ParamKind::CompressedString | ParamKind::VectorUint8 => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: u32, body: &[u8]) -> Vec<u8> {
        let mut out = vec![PacketTag::Rpc.as_u8()];
        out.extend_from_slice(&index.to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn keyed_uint32_decodes_xor() {
        let def = RpcDef::new(0, 1).param(10, ParamKind::Uint32);
        let matches = [ParamMatch::by_id(10, ParamKind::Uint32, "uid").with_key(0xABCD)];
        let bytes = frame(0, &0x1234_5678u32.to_le_bytes());
        let values = decode_rpc(&def, &matches, &bytes).unwrap();
        assert_eq!(values["uid"], Value::U32(0x1234_5678 ^ 0xABCD));
    }

    #[test]
    fn id_match_beats_kind_order() {
        let def = RpcDef::new(0, 1)
            .param(1, ParamKind::Uint32)
            .param(2, ParamKind::Uint32);
        let matches = [
            ParamMatch::by_id(2, ParamKind::Uint32, "second"),
            ParamMatch::by_kind(ParamKind::Uint32, "first"),
        ];
        let mut body = 7u32.to_le_bytes().to_vec();
        body.extend_from_slice(&8u32.to_le_bytes());
        let values = decode_rpc(&def, &matches, &frame(0, &body)).unwrap();
        assert_eq!(values["first"], Value::U32(7));
        assert_eq!(values["second"], Value::U32(8));
    }

    #[test]
    fn unmatched_parameter_skips_one_byte() {
        let def = RpcDef::new(0, 1)
            .param(1, ParamKind::Uint8)
            .param(2, ParamKind::String);
        let matches = [ParamMatch::by_kind(ParamKind::String, "text")];
        let values = decode_rpc(&def, &matches, &frame(0, &[0xEE, 2, b'h', b'i'])).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["text"], Value::from("hi"));
    }

    #[test]
    fn unmatched_declared_width_skip() {
        let def = RpcDef::new(0, 1)
            .param(1, ParamKind::Uint32)
            .param(2, ParamKind::Uint8);
        let matches = [ParamMatch::by_id(2, ParamKind::Uint8, "flag")];
        let options = RpcDecodeOptions {
            unmatched: UnmatchedSkip::DeclaredWidth,
        };
        let bytes = frame(0, &[1, 2, 3, 4, 9]);
        let values =
            decode_rpc_with(&def, &matches, &bytes, &options, &wire::Limits::default()).unwrap();
        assert_eq!(values["flag"], Value::U8(9));
    }

    #[test]
    fn signed_and_float_transforms() {
        let def = RpcDef::new(0, 1)
            .param(1, ParamKind::Float)
            .param(2, ParamKind::Int16)
            .param(3, ParamKind::Int8);
        let matches = [
            ParamMatch::by_id(1, ParamKind::Float, "f"),
            ParamMatch::by_id(2, ParamKind::Int16, "s"),
            ParamMatch::by_id(3, ParamKind::Int8, "b"),
        ];
        let mut body = (-250i32).to_le_bytes().to_vec();
        body.extend_from_slice(&[0xFF, 0xFE, 0x80]);
        let values = decode_rpc(&def, &matches, &frame(0, &body)).unwrap();
        assert_eq!(values["f"], Value::Float(-2.5));
        assert_eq!(values["s"], Value::I16(-2));
        assert_eq!(values["b"], Value::I8(-128));
    }

    #[test]
    fn encode_writes_placeholder_and_header() {
        let def = RpcDef::new(3, 1)
            .param(1, ParamKind::Uint32)
            .param(2, ParamKind::Uint16);
        let matches = [ParamMatch::by_id(2, ParamKind::Uint16, "n")];
        let mut values = RpcValues::new();
        values.insert("n".to_string(), Value::U16(0x0102));
        let bytes = encode_rpc(&def, &matches, &values).unwrap();
        assert_eq!(bytes, vec![9, 3, 0, 0, 0, 0, 0x01, 0x02]);
    }

    #[test]
    fn encode_missing_value() {
        let def = RpcDef::new(0, 1).param(1, ParamKind::Uint32);
        let matches = [ParamMatch::by_id(1, ParamKind::Uint32, "x")];
        let err = encode_rpc(&def, &matches, &RpcValues::new()).unwrap_err();
        assert_eq!(
            err,
            CodecError::MissingRpcValue {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn encode_keyed_negative_roundtrip() {
        let def = RpcDef::new(0, 1).param(1, ParamKind::Int16);
        let matches = [ParamMatch::by_id(1, ParamKind::Int16, "x").with_key(0x1234_5678)];
        let mut values = RpcValues::new();
        values.insert("x".to_string(), Value::I16(-300));
        let bytes = encode_rpc(&def, &matches, &values).unwrap();
        assert_eq!(decode_rpc(&def, &matches, &bytes).unwrap(), values);
    }

    #[test]
    fn mode_mismatch() {
        let def = RpcDef::new(0, 0x55).array();
        let err = decode_rpc(&def, &[], &frame(0, &[])).unwrap_err();
        assert_eq!(
            err,
            CodecError::RpcModeMismatch {
                internal_id: 0x55,
                is_array: true
            }
        );
    }

    #[test]
    fn index_mismatch() {
        let def = RpcDef::new(2, 1);
        let err = decode_rpc(&def, &[], &frame(5, &[])).unwrap_err();
        assert_eq!(
            err,
            CodecError::RpcIndexMismatch {
                expected: 2,
                found: 5
            }
        );
    }

    #[test]
    fn array_roundtrip() {
        let def = RpcDef::new(1, 7)
            .array()
            .param(1, ParamKind::Uint32)
            .param(2, ParamKind::String);
        let matches = [
            ParamMatch::by_kind(ParamKind::Uint32, "id"),
            ParamMatch::by_kind(ParamKind::String, "name"),
        ];
        let items: Vec<RpcValues> = (0..3u32)
            .map(|i| {
                let mut values = RpcValues::new();
                values.insert("id".to_string(), Value::U32(i));
                values.insert("name".to_string(), Value::String(format!("n{i}")));
                values
            })
            .collect();
        let bytes = encode_rpc_array(&def, &matches, &items).unwrap();
        assert_eq!(&bytes[5..7], &[0, 3]);
        let decoded = decode_rpc_array(
            &def,
            &matches,
            &bytes,
            &RpcDecodeOptions::default(),
            &wire::Limits::default(),
            &CodecLimits::default(),
        )
        .unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn compressed_param_respects_decompressed_limit() {
        let def = RpcDef::new(0, 1).param(1, ParamKind::CompressedString);
        let matches = [ParamMatch::by_kind(ParamKind::CompressedString, "blob")];
        let mut values = RpcValues::new();
        values.insert("blob".to_string(), Value::String("x".repeat(4096)));
        let bytes = encode_rpc(&def, &matches, &values).unwrap();

        let tight = wire::Limits {
            max_decompressed_bytes: 16,
            ..wire::Limits::default()
        };
        let options = RpcDecodeOptions::default();
        let err = decode_rpc_with(&def, &matches, &bytes, &options, &tight).unwrap_err();
        assert_eq!(
            err,
            CodecError::Cursor(bitstream::CursorError::DecompressedTooLarge { limit: 16 })
        );

        let open = wire::Limits::unlimited();
        let decoded = decode_rpc_with(&def, &matches, &bytes, &options, &open).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn oversized_frame_rejected() {
        let def = RpcDef::new(0, 1).param(1, ParamKind::Uint8);
        let bytes = frame(0, &[0; 64]);
        let limits = wire::Limits {
            max_frame_bytes: 32,
            ..wire::Limits::default()
        };
        let err = decode_rpc_with(&def, &[], &bytes, &RpcDecodeOptions::default(), &limits)
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Wire(wire::DecodeError::LimitsExceeded {
                kind: wire::LimitKind::FrameBytes,
                limit: 32,
                actual: 69,
            })
        ));
    }

    #[test]
    fn array_repeat_limit() {
        let def = RpcDef::new(0, 7).array();
        let mut bytes = frame(0, &[]);
        bytes.extend_from_slice(&100u16.to_be_bytes());
        let err = decode_rpc_array(
            &def,
            &[],
            &bytes,
            &RpcDecodeOptions::default(),
            &wire::Limits::default(),
            &CodecLimits::for_testing(),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::LimitsExceeded { .. }));
    }

    #[test]
    fn auto_decode_names_by_kind_and_hex_id() {
        let def = RpcDef::new(0, 1)
            .param(0xBEEF, ParamKind::Uint32)
            .param(0x10, ParamKind::Uint8)
            .param(0xAB, ParamKind::Int8);
        let mut body = 5u32.to_le_bytes().to_vec();
        body.extend_from_slice(&[1, 0xFF]);
        let values = auto_decode_rpc(&def, &frame(0, &body)).unwrap();
        assert_eq!(values["Uint32_beef"], Value::U32(5));
        assert_eq!(values["Int8_ab"], Value::I8(-1));
        assert!(!values.contains_key("Uint8_10"));
    }
}
