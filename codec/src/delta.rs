//! Entity update (delta) frames.
//!
//! A frame is applied in three phases: deletions, creation blocks, then
//! bitmask-addressed attribute diffs running to the end of the frame. The
//! whole frame is parsed against staged uid lists first; the entity table is
//! only mutated once the frame is known to be well formed.

use std::collections::{BTreeMap, HashMap, HashSet};

use bitstream::{ByteReader, ByteWriter};
use schema::{bitmask_len, field_name, AttributeDef, EntityMapDef, SessionSchema, Value};
use tracing::{debug, trace, warn};
use wire::{expect_frame, PacketTag};

use crate::attribute::{decode_attribute, encode_attribute};
use crate::entity::{EntityTable, NetworkEntity};
use crate::error::{CodecError, CodecResult, CountKind, LimitKind};
use crate::limits::CodecLimits;

/// An entity created by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatedEntity {
    pub uid: u32,
    pub entity_map_id: u32,
}

/// Fields of one entity written by an update, in attribute order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdatedEntity {
    pub uid: u32,
    pub fields: Vec<String>,
}

/// What one entity update frame did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityUpdateSummary {
    pub tick: u32,
    pub created: Vec<CreatedEntity>,
    pub deleted: Vec<u32>,
    pub updated: Vec<UpdatedEntity>,
}

impl EntityUpdateSummary {
    /// Uids created by the update, in frame order.
    #[must_use]
    pub fn created_uids(&self) -> Vec<u32> {
        self.created.iter().map(|c| c.uid).collect()
    }
}

struct FieldWrite {
    uid: u32,
    field: String,
    value: Value,
}

struct StagedUpdate {
    tick: u32,
    deleted: Vec<u32>,
    created: Vec<CreatedEntity>,
    map_uids: Vec<(u32, Vec<u32>)>,
    writes: Vec<FieldWrite>,
}

/// Applies an entity update frame with default limits.
pub fn apply_entity_update(
    table: &mut EntityTable,
    schema: &SessionSchema,
    frame: &[u8],
) -> CodecResult<EntityUpdateSummary> {
    apply_entity_update_with_limits(
        table,
        schema,
        frame,
        &wire::Limits::default(),
        &CodecLimits::default(),
    )
}

/// Applies an entity update frame, tag byte included.
///
/// On error the table is left exactly as it was.
pub fn apply_entity_update_with_limits(
    table: &mut EntityTable,
    schema: &SessionSchema,
    frame: &[u8],
    wire_limits: &wire::Limits,
    limits: &CodecLimits,
) -> CodecResult<EntityUpdateSummary> {
    let body = expect_frame(frame, PacketTag::EntityUpdate, wire_limits)?;
    let mut reader = ByteReader::new(body);
    let staged = stage_update(&mut reader, table, schema, limits)?;
    let summary = commit(table, schema, staged);
    debug!(
        tick = summary.tick,
        created = summary.created.len(),
        deleted = summary.deleted.len(),
        updated = summary.updated.len(),
        live = table.len(),
        "applied entity update"
    );
    Ok(summary)
}

fn stage_update(
    reader: &mut ByteReader<'_>,
    table: &EntityTable,
    schema: &SessionSchema,
    limits: &CodecLimits,
) -> CodecResult<StagedUpdate> {
    let tick = reader.read_u32()?;

    let deleted_count = read_count(reader, CountKind::Deletions)?;
    let mut deleted = Vec::with_capacity(deleted_count);
    for _ in 0..deleted_count {
        deleted.push(reader.read_u32()?);
    }
    let deleted_set: HashSet<u32> = deleted.iter().copied().collect();

    let mut map_uids: Vec<(u32, Vec<u32>)> = schema
        .entity_maps
        .iter()
        .map(|def| {
            let uids = table
                .entity_map(def.id)
                .map(|map| map.sorted_uids().to_vec())
                .unwrap_or_default();
            (def.id, uids)
        })
        .collect();

    let block_count = read_count(reader, CountKind::CreationBlocks)?;
    let mut created = Vec::new();
    let mut created_set = HashSet::new();
    for _ in 0..block_count {
        let count = read_count(reader, CountKind::CreatedEntities)?;
        let entity_map_id = reader.read_u32()?;
        let slot = map_uids
            .iter()
            .position(|(id, _)| *id == entity_map_id)
            .ok_or(CodecError::UnknownEntityMapId { id: entity_map_id })?;

        for _ in 0..count {
            let uid = reader.read_u32()?;
            if table.contains(uid) || created_set.contains(&uid) {
                if !deleted_set.contains(&uid) {
                    warn!(uid, entity_map_id, "re-created live entity, replacing");
                }
                // A uid lives in exactly one list
                for (_, uids) in &mut map_uids {
                    uids.retain(|&other| other != uid);
                }
            }
            map_uids[slot].1.push(uid);
            created.push(CreatedEntity { uid, entity_map_id });
            created_set.insert(uid);
        }
        map_uids[slot].1.sort_unstable();
    }

    if !deleted_set.is_empty() {
        for (_, uids) in &mut map_uids {
            uids.retain(|uid| !deleted_set.contains(uid));
        }
    }
    let live_total = map_uids.iter().map(|(_, uids)| uids.len()).sum();
    limits.check(LimitKind::LiveEntities, live_total)?;

    let mut writes = Vec::new();
    while !reader.is_empty() {
        let entity_map_id = reader.read_u32()?;
        let (def, uids) = schema
            .entity_maps
            .iter()
            .zip(&map_uids)
            .find(|(def, _)| def.id == entity_map_id)
            .map(|(def, (_, uids))| (def, uids))
            .ok_or(CodecError::UnknownEntityMapId { id: entity_map_id })?;

        let absent = reader.read_bytes(bitmask_len(uids.len()))?;
        let names = resolved_names(def);
        trace!(entity_map_id, entities = uids.len(), "diff block");

        for (i, &uid) in uids.iter().enumerate() {
            if bit_is_set(absent, i) {
                continue;
            }
            if !created_set.contains(&uid) && !table.contains(uid) {
                return Err(CodecError::UnknownEntity { uid });
            }
            let present = reader.read_bytes(def.presence_mask_len())?;
            for (j, attr) in def.attributes.iter().enumerate() {
                if bit_is_set(present, j) {
                    writes.push(FieldWrite {
                        uid,
                        field: names[j].clone(),
                        value: decode_attribute(reader, attr.kind)?,
                    });
                }
            }
        }
    }

    Ok(StagedUpdate {
        tick,
        deleted,
        created,
        map_uids,
        writes,
    })
}

fn commit(table: &mut EntityTable, schema: &SessionSchema, staged: StagedUpdate) -> EntityUpdateSummary {
    for &uid in &staged.deleted {
        if table.remove(uid).is_none() {
            trace!(uid, "deleted uid was not live");
        }
    }
    for created in &staged.created {
        if let Some(def) = schema.entity_map(created.entity_map_id) {
            table.insert(NetworkEntity::spawn(created.uid, def));
        }
    }
    // Created and deleted in the same frame
    for &uid in &staged.deleted {
        table.remove(uid);
    }
    for (id, uids) in staged.map_uids {
        table.set_map_uids(id, uids);
    }

    let mut updated: Vec<UpdatedEntity> = Vec::new();
    let mut slots: HashMap<u32, usize> = HashMap::new();
    for write in staged.writes {
        let Some(entity) = table.get_mut(write.uid) else {
            continue;
        };
        let slot = *slots.entry(write.uid).or_insert_with(|| {
            updated.push(UpdatedEntity {
                uid: write.uid,
                fields: Vec::new(),
            });
            updated.len() - 1
        });
        if !updated[slot].fields.contains(&write.field) {
            updated[slot].fields.push(write.field.clone());
        }
        entity.tick.insert(write.field, write.value);
    }

    EntityUpdateSummary {
        tick: staged.tick,
        created: staged.created,
        deleted: staged.deleted,
        updated,
    }
}

/// Encodes an entity update frame.
///
/// `table` is the state the receiver reaches after applying the frame:
/// bitmasks are built from its uid lists and diff values are read from its
/// entities. Creations are grouped into blocks of consecutive entries with
/// the same map id.
pub fn encode_entity_update(
    table: &EntityTable,
    schema: &SessionSchema,
    summary: &EntityUpdateSummary,
) -> CodecResult<Vec<u8>> {
    let mut writer = ByteWriter::new();
    writer.write_u8(PacketTag::EntityUpdate.as_u8());
    writer.write_u32(summary.tick);

    write_count(&mut writer, CountKind::Deletions, summary.deleted.len())?;
    for &uid in &summary.deleted {
        writer.write_u32(uid);
    }

    let blocks = creation_blocks(&summary.created);
    write_count(&mut writer, CountKind::CreationBlocks, blocks.len())?;
    for (entity_map_id, uids) in blocks {
        if schema.entity_map(entity_map_id).is_none() {
            return Err(CodecError::UnknownEntityMapId { id: entity_map_id });
        }
        write_count(&mut writer, CountKind::CreatedEntities, uids.len())?;
        writer.write_u32(entity_map_id);
        for uid in uids {
            writer.write_u32(uid);
        }
    }

    let mut by_map: BTreeMap<u32, HashMap<u32, Vec<&str>>> = BTreeMap::new();
    for update in &summary.updated {
        let entity = table
            .get(update.uid)
            .ok_or(CodecError::UnknownEntity { uid: update.uid })?;
        let fields = by_map
            .entry(entity.model_hash)
            .or_default()
            .entry(update.uid)
            .or_default();
        fields.extend(update.fields.iter().map(String::as_str));
    }

    for def in &schema.entity_maps {
        let Some(updates) = by_map.remove(&def.id) else {
            continue;
        };
        let uids = table
            .entity_map(def.id)
            .map(|map| map.sorted_uids())
            .unwrap_or_default();
        encode_diff_block(&mut writer, table, def, uids, &updates)?;
    }
    if let Some((&id, _)) = by_map.iter().next() {
        return Err(CodecError::UnknownEntityMapId { id });
    }

    Ok(writer.finish())
}

fn encode_diff_block(
    writer: &mut ByteWriter,
    table: &EntityTable,
    def: &EntityMapDef,
    uids: &[u32],
    updates: &HashMap<u32, Vec<&str>>,
) -> CodecResult<()> {
    let mut absent = vec![0u8; bitmask_len(uids.len())];
    let mut present_count = 0;
    for (i, uid) in uids.iter().enumerate() {
        if updates.contains_key(uid) {
            present_count += 1;
        } else {
            set_bit(&mut absent, i);
        }
    }
    if present_count != updates.len() {
        let uid = updates
            .keys()
            .copied()
            .find(|uid| uids.binary_search(uid).is_err())
            .unwrap_or_default();
        return Err(CodecError::UnknownEntity { uid });
    }

    writer.write_u32(def.id);
    writer.write_bytes(&absent);

    let names: Vec<String> = def.attributes.iter().map(AttributeDef::field_name).collect();
    for uid in uids {
        let Some(fields) = updates.get(uid) else {
            continue;
        };
        let entity = table.get(*uid).ok_or(CodecError::UnknownEntity { uid: *uid })?;

        let mut present = vec![0u8; def.presence_mask_len()];
        for field in fields {
            let index = names
                .iter()
                .position(|name| name == field)
                .ok_or_else(|| CodecError::UnknownField {
                    entity_map_id: def.id,
                    field: (*field).to_string(),
                })?;
            set_bit(&mut present, index);
        }
        writer.write_bytes(&present);

        for (j, attr) in def.attributes.iter().enumerate() {
            if bit_is_set(&present, j) {
                encode_attribute(writer, attr.kind, entity.get(&names[j]), &names[j])?;
            }
        }
    }
    Ok(())
}

fn creation_blocks(created: &[CreatedEntity]) -> Vec<(u32, Vec<u32>)> {
    let max = i8::MAX as usize;
    let mut blocks: Vec<(u32, Vec<u32>)> = Vec::new();
    for entry in created {
        match blocks.last_mut() {
            Some((id, uids)) if *id == entry.entity_map_id && uids.len() < max => {
                uids.push(entry.uid);
            }
            _ => blocks.push((entry.entity_map_id, vec![entry.uid])),
        }
    }
    blocks
}

fn resolved_names(def: &EntityMapDef) -> Vec<String> {
    def.attributes
        .iter()
        .map(|attr| {
            if field_name(attr.name_hash).is_none() {
                debug!(
                    entity_map_id = def.id,
                    name_hash = attr.name_hash,
                    "unresolved attribute name"
                );
            }
            attr.field_name()
        })
        .collect()
}

fn read_count(reader: &mut ByteReader<'_>, what: CountKind) -> CodecResult<usize> {
    let count = reader.read_i8()?;
    usize::try_from(count).map_err(|_| CodecError::NegativeCount { what, count })
}

fn write_count(writer: &mut ByteWriter, what: CountKind, count: usize) -> CodecResult<()> {
    let raw = i8::try_from(count).map_err(|_| CodecError::CountOverflow {
        what,
        count,
        max: i8::MAX as usize,
    })?;
    writer.write_i8(raw);
    Ok(())
}

fn bit_is_set(mask: &[u8], index: usize) -> bool {
    mask.get(index / 8)
        .is_some_and(|byte| byte & (1 << (index % 8)) != 0)
}

fn set_bit(mask: &mut [u8], index: usize) {
    if let Some(byte) = mask.get_mut(index / 8) {
        *byte |= 1 << (index % 8);
    }
}
