//! `EnterWorld` response (session handshake) codec.
//!
//! The response is decoded once per session into a [`SessionSchema`]. Field
//! order is fixed; the four trailing fields are optional and are read only
//! while bytes remain.

use bitstream::{ByteReader, ByteWriter};
use schema::{
    AttributeDef, AttributeKind, EntityMapDef, ParamDef, ParamKind, RpcDef, SessionSchema, Tick,
    WorldBounds,
};
use wire::{expect_frame, PacketTag};

use crate::attribute::{decode_attribute, encode_attribute};
use crate::error::{CodecError, CodecResult, CountKind, LimitKind};
use crate::limits::CodecLimits;

/// Decodes an `EnterWorld` response frame, tag byte included.
pub fn decode_handshake(
    frame: &[u8],
    wire_limits: &wire::Limits,
    limits: &CodecLimits,
) -> CodecResult<SessionSchema> {
    let body = expect_frame(frame, PacketTag::EnterWorld, wire_limits)?;
    let mut reader = ByteReader::new(body);

    let mut schema = SessionSchema {
        version: reader.read_u32()?,
        allowed: reader.read_u32()?,
        uid: reader.read_u32()?,
        starting_tick: reader.read_u32()?,
        tick_rate: reader.read_u32()?,
        effective_tick_rate: reader.read_u32()?,
        players: reader.read_u32()?,
        max_players: reader.read_u32()?,
        chat_channel: reader.read_u32()?,
        effective_display_name: reader.read_string()?,
        bounds: WorldBounds {
            x1: reader.read_i32()?,
            y1: reader.read_i32()?,
            x2: reader.read_i32()?,
            y2: reader.read_i32()?,
        },
        ..SessionSchema::default()
    };

    let map_count = reader.read_u32()? as usize;
    limits.check(LimitKind::EntityMaps, map_count)?;
    for _ in 0..map_count {
        schema
            .entity_maps
            .push(decode_entity_map(&mut reader, limits)?);
    }

    let rpc_count = reader.read_u32()? as usize;
    limits.check(LimitKind::Rpcs, rpc_count)?;
    for wire_index in 0..rpc_count {
        schema
            .rpcs
            .push(decode_rpc_def(&mut reader, wire_index as u32, limits)?);
    }

    if reader.can_read(1) {
        schema.mode = Some(reader.read_string()?);
    }
    if reader.can_read(1) {
        schema.map = Some(reader.read_string()?);
    }
    if reader.can_read(1) {
        schema.udp_cookie = Some(reader.read_u32()?);
    }
    if reader.can_read(1) {
        schema.udp_port = Some(reader.read_u32()?);
    }

    schema.validate()?;
    Ok(schema)
}

fn decode_entity_map(reader: &mut ByteReader<'_>, limits: &CodecLimits) -> CodecResult<EntityMapDef> {
    let id = reader.read_u32()?;
    let attribute_count = reader.read_u32()? as usize;
    limits.check(LimitKind::AttributesPerMap, attribute_count)?;

    let mut attributes = Vec::with_capacity(attribute_count);
    let mut default_tick = Tick::new();
    for _ in 0..attribute_count {
        let name_hash = reader.read_u32()?;
        let kind = AttributeKind::parse(reader.read_u32()?)?;
        let attr = AttributeDef::new(name_hash, kind);
        let default = decode_attribute(reader, kind)?;
        default_tick.insert(attr.field_name(), default);
        attributes.push(attr);
    }

    Ok(EntityMapDef {
        id,
        attributes,
        default_tick,
    })
}

fn decode_rpc_def(
    reader: &mut ByteReader<'_>,
    wire_index: u32,
    limits: &CodecLimits,
) -> CodecResult<RpcDef> {
    let internal_id = reader.read_u32()?;
    let param_count = usize::from(reader.read_u8()?);
    limits.check(LimitKind::ParametersPerRpc, param_count)?;
    let is_array = reader.read_u8()? != 0;

    let mut parameters = Vec::with_capacity(param_count);
    for _ in 0..param_count {
        let id = reader.read_u32()?;
        let kind = ParamKind::parse(reader.read_u8()?)?;
        parameters.push(ParamDef::new(id, kind));
    }

    Ok(RpcDef {
        wire_index,
        internal_id,
        is_array,
        parameters,
    })
}

/// Encodes a schema as an `EnterWorld` response frame.
///
/// Default values are written from each map's `default_tick`; missing or
/// unset entries are written as the kind's zero value.
pub fn encode_handshake(schema: &SessionSchema) -> CodecResult<Vec<u8>> {
    schema.validate()?;

    let mut writer = ByteWriter::new();
    writer.write_u8(PacketTag::EnterWorld.as_u8());
    writer.write_u32(schema.version);
    writer.write_u32(schema.allowed);
    writer.write_u32(schema.uid);
    writer.write_u32(schema.starting_tick);
    writer.write_u32(schema.tick_rate);
    writer.write_u32(schema.effective_tick_rate);
    writer.write_u32(schema.players);
    writer.write_u32(schema.max_players);
    writer.write_u32(schema.chat_channel);
    writer.write_string(&schema.effective_display_name)?;
    writer.write_i32(schema.bounds.x1);
    writer.write_i32(schema.bounds.y1);
    writer.write_i32(schema.bounds.x2);
    writer.write_i32(schema.bounds.y2);

    writer.write_u32(schema.entity_maps.len() as u32);
    for map in &schema.entity_maps {
        writer.write_u32(map.id);
        writer.write_u32(map.attributes.len() as u32);
        for attr in &map.attributes {
            writer.write_u32(attr.name_hash);
            writer.write_u32(attr.kind.as_u32());
            let name = attr.field_name();
            encode_attribute(&mut writer, attr.kind, map.default_tick.get(&name), &name)?;
        }
    }

    writer.write_u32(schema.rpcs.len() as u32);
    for rpc in &schema.rpcs {
        let count = u8::try_from(rpc.parameters.len()).map_err(|_| CodecError::CountOverflow {
            what: CountKind::Parameters,
            count: rpc.parameters.len(),
            max: usize::from(u8::MAX),
        })?;
        writer.write_u32(rpc.internal_id);
        writer.write_u8(count);
        writer.write_u8(u8::from(rpc.is_array));
        for param in &rpc.parameters {
            writer.write_u32(param.id);
            writer.write_u8(param.kind.as_u8());
        }
    }

    if let Some(mode) = &schema.mode {
        writer.write_string(mode)?;
    }
    if let Some(map) = &schema.map {
        writer.write_string(map)?;
    }
    if let Some(cookie) = schema.udp_cookie {
        writer.write_u32(cookie);
    }
    if let Some(port) = schema.udp_port {
        writer.write_u32(port);
    }

    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::CursorError;
    use schema::{name_hash, SchemaError, Value, Vector2};

    fn decode(frame: &[u8]) -> CodecResult<SessionSchema> {
        decode_handshake(frame, &wire::Limits::default(), &CodecLimits::default())
    }

    fn sample() -> SessionSchema {
        SessionSchema::builder()
            .header(SessionSchema {
                version: 27,
                allowed: 1,
                uid: 9001,
                starting_tick: 100,
                tick_rate: 20,
                effective_tick_rate: 20,
                players: 3,
                max_players: 50,
                chat_channel: 2,
                effective_display_name: "bot".to_string(),
                bounds: WorldBounds {
                    x1: -100,
                    y1: -100,
                    x2: 100,
                    y2: 100,
                },
                mode: Some("solo".to_string()),
                ..SessionSchema::default()
            })
            .entity_map(
                EntityMapDef::new(1)
                    .attribute(
                        name_hash("Health").unwrap(),
                        AttributeKind::Uint32,
                        Value::U32(100),
                    )
                    .attribute(
                        name_hash("Position").unwrap(),
                        AttributeKind::Vector2,
                        Value::Vector2(Vector2::default()),
                    ),
            )
            .rpc(
                RpcDef::new(0, 0x3e54_6767)
                    .param(10, ParamKind::Uint32)
                    .param(11, ParamKind::String),
            )
            .rpc(RpcDef::new(0, 0x1111).array().param(1, ParamKind::Uint8))
            .build()
            .unwrap()
    }

    #[test]
    fn roundtrip_sample() {
        let bytes = encode_handshake(&sample()).unwrap();
        assert_eq!(bytes[0], 4);
        assert_eq!(decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn trailer_fields_are_optional() {
        let mut schema = sample();
        schema.mode = None;
        let bytes = encode_handshake(&schema).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.mode, None);
        assert_eq!(decoded.udp_port, None);

        schema.mode = Some("duo".to_string());
        schema.map = Some("forest".to_string());
        schema.udp_cookie = Some(7);
        schema.udp_port = Some(9000);
        let decoded = decode(&encode_handshake(&schema).unwrap()).unwrap();
        assert_eq!(decoded.udp_port, Some(9000));
        assert_eq!(decoded.map.as_deref(), Some("forest"));
    }

    #[test]
    fn rpc_wire_index_is_positional() {
        let decoded = decode(&encode_handshake(&sample()).unwrap()).unwrap();
        assert_eq!(decoded.rpcs[1].wire_index, 1);
        assert!(decoded.rpcs[1].is_array);
    }

    #[test]
    fn unknown_attribute_kind_is_fatal() {
        let mut bytes = encode_handshake(&sample()).unwrap();
        // header: tag + 9 u32 + name (1 + 3) + 4 i32 + map count + map id + attr count + hash
        let kind_offset = 1 + 36 + 4 + 16 + 4 + 4 + 4 + 4;
        bytes[kind_offset] = 99;
        assert_eq!(
            decode(&bytes),
            Err(CodecError::Schema(SchemaError::UnknownAttributeKind { tag: 99 }))
        );
    }

    #[test]
    fn truncated_frame_is_underflow() {
        let bytes = encode_handshake(&sample()).unwrap();
        // Cut inside the RPC table, before the optional trailer
        let err = decode(&bytes[..bytes.len() - 10]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Cursor(CursorError::BufferUnderflow { .. })
        ));
    }

    #[test]
    fn wrong_tag_is_rejected() {
        let mut bytes = encode_handshake(&sample()).unwrap();
        bytes[0] = 9;
        assert!(matches!(decode(&bytes), Err(CodecError::Wire(_))));
    }

    #[test]
    fn entity_map_limit_enforced() {
        let bytes = encode_handshake(&sample()).unwrap();
        let limits = CodecLimits {
            max_entity_maps: 0,
            ..CodecLimits::default()
        };
        let err = decode_handshake(&bytes, &wire::Limits::default(), &limits).unwrap_err();
        assert!(matches!(err, CodecError::LimitsExceeded { .. }));
    }

    #[test]
    fn unresolved_default_uses_decimal_name() {
        let schema = SessionSchema::builder()
            .entity_map(EntityMapDef::new(5).attribute(12_345, AttributeKind::Int8, Value::I8(-4)))
            .build()
            .unwrap();
        let decoded = decode(&encode_handshake(&schema).unwrap()).unwrap();
        assert_eq!(
            decoded.entity_maps[0].default_tick.get("12345"),
            Some(&Value::I8(-4))
        );
    }
}
