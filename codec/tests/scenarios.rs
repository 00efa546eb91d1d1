use bitstream::ByteWriter;
use codec::{
    decode_rpc, encode_entity_update, encode_handshake, CodecLimits, EntityTable, ParamMatch,
    Session, WireLimits,
};
use schema::{
    bitmask_len, name_hash, AttributeKind, EntityMapDef, ParamKind, RpcDef, SessionSchema, Value,
    Vector2,
};
use wire::{EnterWorldRequest, Keystream};

fn health_position_handshake() -> Vec<u8> {
    let schema = SessionSchema::builder()
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
        .build()
        .unwrap();
    encode_handshake(&schema).unwrap()
}

fn update_frame(tick: u32, deleted: &[u32], created: &[(u32, &[u32])]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.write_u8(0);
    w.write_u32(tick);
    w.write_i8(deleted.len() as i8);
    for uid in deleted {
        w.write_u32(*uid);
    }
    w.write_i8(created.len() as i8);
    for (map, uids) in created {
        w.write_i8(uids.len() as i8);
        w.write_u32(*map);
        for uid in *uids {
            w.write_u32(*uid);
        }
    }
    w.finish()
}

fn session_from(frame: &[u8]) -> Session {
    let request = EnterWorldRequest {
        display_name: "bot".to_string(),
        version: 27,
        proof_of_work: vec![1, 2, 3, 4],
    };
    Session::from_handshake(
        frame,
        request.keystream_for("/"),
        WireLimits::default(),
        CodecLimits::default(),
    )
    .unwrap()
}

#[test]
fn handshake_then_create_uid_42() {
    let mut session = session_from(&health_position_handshake());
    let default_tick = &session.schema().entity_map(1).unwrap().default_tick;
    assert_eq!(default_tick.len(), 2);
    assert_eq!(default_tick["Health"], Value::U32(100));
    assert_eq!(default_tick["Position"], Value::Vector2(Vector2::new(0.0, 0.0)));

    session
        .apply_entity_update(&update_frame(1, &[], &[(1, &[42])]))
        .unwrap();
    let entity = session.entity(42).unwrap();
    assert_eq!(entity.uid, 42);
    assert_eq!(entity.tick.get("Health"), Some(&Value::U32(100)));
    assert_eq!(
        entity.tick.get("Position"),
        Some(&Value::Vector2(Vector2::new(0.0, 0.0)))
    );
}

#[test]
fn delete_uid_42_after_creation() {
    let mut session = session_from(&health_position_handshake());
    session
        .apply_entity_update(&update_frame(1, &[], &[(1, &[42])]))
        .unwrap();
    let summary = session
        .apply_entity_update(&update_frame(2, &[42], &[]))
        .unwrap();

    assert_eq!(summary.deleted, vec![42]);
    assert!(session.entity(42).is_none());
    assert!(session.table().entity_map(1).unwrap().is_empty());
}

#[test]
fn keyed_rpc_scenario() {
    let def = RpcDef::new(0, 0x77).param(10, ParamKind::Uint32);
    let matches = [ParamMatch::by_id(10, ParamKind::Uint32, "value").with_key(0xABCD)];
    let mut frame = vec![9, 0, 0, 0, 0];
    frame.extend_from_slice(&0x1234_5678u32.to_le_bytes());

    let values = decode_rpc(&def, &matches, &frame).unwrap();
    assert_eq!(
        values["value"],
        Value::U32((0x1234_5678u32 ^ 0xABCD) & 0xFFFF_FFFF)
    );
}

#[test]
fn absence_bitmask_sizes_and_positions() {
    let schema = SessionSchema::builder()
        .entity_map(EntityMapDef::new(1).attribute(
            name_hash("Health").unwrap(),
            AttributeKind::Uint8,
            Value::U8(0),
        ))
        .build()
        .unwrap();

    for count in [0u32, 1, 7, 8, 9] {
        let mut session = Session::new(schema.clone(), Keystream::default());
        // Created out of order so bit positions follow ascending uid
        let uids: Vec<u32> = (0..count).rev().map(|i| 1000 + i * 3).collect();
        session
            .apply_entity_update(&update_frame(1, &[], &[(1, &uids)]))
            .unwrap();
        let sorted = session.table().entity_map(1).unwrap().sorted_uids().to_vec();
        assert!(sorted.windows(2).all(|w| w[0] < w[1]));

        let mask_len = bitmask_len(sorted.len());
        assert_eq!(mask_len, (count as usize).div_ceil(8));

        // Update only the last uid in bit order; every other bit marks absence
        let mut frame = update_frame(2, &[], &[]);
        if let Some(&last) = sorted.last() {
            let mut absent = vec![0xFFu8; mask_len];
            let bit = sorted.len() - 1;
            absent[bit / 8] &= !(1 << (bit % 8));
            frame.extend_from_slice(&1u32.to_le_bytes());
            frame.extend_from_slice(&absent);
            frame.push(0b1);
            frame.push(count as u8);

            let summary = session.apply_entity_update(&frame).unwrap();
            assert_eq!(summary.updated.len(), 1);
            assert_eq!(summary.updated[0].uid, last);
            assert_eq!(
                session.entity(last).unwrap().tick["Health"],
                Value::U8(count as u8)
            );
            assert_eq!(session.table().entity_map(1).unwrap().position(last), Some(bit));
        } else {
            assert_eq!(mask_len, 0);
            session.apply_entity_update(&frame).unwrap();
        }
    }
}

#[test]
fn encoded_update_replays_on_fresh_table() {
    let mut server = session_from(&health_position_handshake());
    let create = update_frame(1, &[], &[(1, &[5, 3])]);
    let summary = server.apply_entity_update(&create).unwrap();

    let replay = encode_entity_update(server.table(), server.schema(), &summary).unwrap();
    let mut client = EntityTable::new(server.schema());
    let replayed =
        codec::apply_entity_update(&mut client, server.schema(), &replay).unwrap();

    assert_eq!(replayed, summary);
    assert_eq!(&client, server.table());
}
