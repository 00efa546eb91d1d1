//! Deterministic schema fingerprinting.

use blake3::Hasher;

use crate::{EntityMapDef, RpcDef, SessionSchema};

/// Computes a stable 64-bit digest of the entity-map and RPC layouts.
///
/// Header fields (uid, tick, player counts, display name) and default
/// values are excluded, so two sessions against the same server build share
/// a fingerprint.
#[must_use]
pub fn schema_fingerprint(schema: &SessionSchema) -> u64 {
    let mut hasher = Hasher::new();
    write_u32(&mut hasher, schema.version);

    write_u32(&mut hasher, schema.entity_maps.len() as u32);
    for map in &schema.entity_maps {
        write_entity_map(&mut hasher, map);
    }

    write_u32(&mut hasher, schema.rpcs.len() as u32);
    for rpc in &schema.rpcs {
        write_rpc(&mut hasher, rpc);
    }

    let hash = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(out)
}

fn write_entity_map(hasher: &mut Hasher, map: &EntityMapDef) {
    write_u32(hasher, map.id);
    write_u32(hasher, map.attributes.len() as u32);
    for attr in &map.attributes {
        write_u32(hasher, attr.name_hash);
        write_u32(hasher, attr.kind.as_u32());
    }
}

fn write_rpc(hasher: &mut Hasher, rpc: &RpcDef) {
    write_u32(hasher, rpc.internal_id);
    write_u8(hasher, u8::from(rpc.is_array));
    write_u32(hasher, rpc.parameters.len() as u32);
    for param in &rpc.parameters {
        write_u32(hasher, param.id);
        write_u8(hasher, param.kind.as_u8());
    }
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}
