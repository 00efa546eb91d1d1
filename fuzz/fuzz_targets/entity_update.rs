#![no_main]

use codec::{apply_entity_update_with_limits, CodecLimits, EntityTable};
use libfuzzer_sys::fuzz_target;
use schema::{name_hash, AttributeKind, EntityMapDef, SessionSchema, Value, Vector2};

fn schema() -> SessionSchema {
    let hash = |name: &str| name_hash(name).unwrap_or_default();
    SessionSchema::builder()
        .entity_map(
            EntityMapDef::new(1)
                .attribute(hash("Health"), AttributeKind::Uint32, Value::U32(100))
                .attribute(
                    hash("Position"),
                    AttributeKind::Vector2,
                    Value::Vector2(Vector2::default()),
                )
                .attribute(hash("Name"), AttributeKind::String, Value::from("")),
        )
        .entity_map(
            EntityMapDef::new(2)
                .attribute(hash("Yaw"), AttributeKind::Uint16, Value::U16(0))
                .attribute(0x5061_7468, AttributeKind::ArrayVector2, Value::Unset),
        )
        .build()
        .unwrap_or_default()
}

fuzz_target!(|data: &[u8]| {
    let schema = schema();
    let mut table = EntityTable::new(&schema);
    let wire_limits = wire::Limits::for_testing();
    let limits = CodecLimits::for_testing();

    // Consecutive frames are separated by 0xFE.
    for chunk in data.split(|&b| b == 0xFE) {
        let mut frame = vec![0u8];
        frame.extend_from_slice(chunk);
        let before = table.clone();
        if apply_entity_update_with_limits(&mut table, &schema, &frame, &wire_limits, &limits)
            .is_err()
        {
            assert_eq!(table, before);
        }
        for map in table.maps() {
            assert!(map.sorted_uids().windows(2).all(|w| w[0] < w[1]));
        }
    }
});
