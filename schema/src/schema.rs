//! Session schema definitions and validation.

use std::collections::{BTreeMap, HashSet};

use crate::error::{SchemaError, SchemaResult};
use crate::kind::{AttributeKind, ParamKind};
use crate::names::resolve_field_name;
use crate::value::Value;

/// Field values of one entity, keyed by resolved field name.
pub type Tick = BTreeMap<String, Value>;

/// Number of bytes in a bitmask covering `count` bits.
#[must_use]
pub const fn bitmask_len(count: usize) -> usize {
    count.div_ceil(8)
}

/// One attribute slot of an entity map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeDef {
    pub name_hash: u32,
    pub kind: AttributeKind,
}

impl AttributeDef {
    #[must_use]
    pub const fn new(name_hash: u32, kind: AttributeKind) -> Self {
        Self { name_hash, kind }
    }

    /// Field name used in entity ticks.
    #[must_use]
    pub fn field_name(&self) -> String {
        resolve_field_name(self.name_hash)
    }
}

/// Attribute layout and default values of one class of entities.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityMapDef {
    pub id: u32,
    pub attributes: Vec<AttributeDef>,
    pub default_tick: Tick,
}

impl EntityMapDef {
    /// Creates an entity map with no attributes.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            attributes: Vec::new(),
            default_tick: Tick::new(),
        }
    }

    /// Adds an attribute together with its default value.
    #[must_use]
    pub fn attribute(mut self, name_hash: u32, kind: AttributeKind, default: Value) -> Self {
        let def = AttributeDef::new(name_hash, kind);
        self.default_tick.insert(def.field_name(), default);
        self.attributes.push(def);
        self
    }

    /// Byte length of the per-entity attribute presence bitmask.
    #[must_use]
    pub fn presence_mask_len(&self) -> usize {
        bitmask_len(self.attributes.len())
    }

    /// Index of the attribute whose resolved field name is `name`.
    #[must_use]
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|attr| attr.field_name() == name)
    }
}

/// One RPC parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamDef {
    pub id: u32,
    pub kind: ParamKind,
}

impl ParamDef {
    #[must_use]
    pub const fn new(id: u32, kind: ParamKind) -> Self {
        Self { id, kind }
    }
}

/// Parameter layout of one RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RpcDef {
    /// Position in the handshake; the value that addresses this RPC in frames.
    pub wire_index: u32,
    pub internal_id: u32,
    pub is_array: bool,
    pub parameters: Vec<ParamDef>,
}

impl RpcDef {
    /// Creates a scalar RPC with no parameters.
    #[must_use]
    pub const fn new(wire_index: u32, internal_id: u32) -> Self {
        Self {
            wire_index,
            internal_id,
            is_array: false,
            parameters: Vec::new(),
        }
    }

    /// Marks the RPC as array-mode.
    #[must_use]
    pub const fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(mut self, id: u32, kind: ParamKind) -> Self {
        self.parameters.push(ParamDef::new(id, kind));
        self
    }
}

/// World rectangle sent in the handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldBounds {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Everything the server declares in its `EnterWorld` response.
///
/// Immutable for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSchema {
    pub version: u32,
    pub allowed: u32,
    pub uid: u32,
    pub starting_tick: u32,
    pub tick_rate: u32,
    pub effective_tick_rate: u32,
    pub players: u32,
    pub max_players: u32,
    pub chat_channel: u32,
    pub effective_display_name: String,
    pub bounds: WorldBounds,
    pub entity_maps: Vec<EntityMapDef>,
    pub rpcs: Vec<RpcDef>,
    pub mode: Option<String>,
    pub map: Option<String>,
    pub udp_cookie: Option<u32>,
    pub udp_port: Option<u32>,
}

impl SessionSchema {
    /// Creates a schema builder.
    #[must_use]
    pub fn builder() -> SessionSchemaBuilder {
        SessionSchemaBuilder::default()
    }

    /// Validates schema invariants.
    pub fn validate(&self) -> SchemaResult<()> {
        let mut ids = HashSet::new();
        for map in &self.entity_maps {
            if !ids.insert(map.id) {
                return Err(SchemaError::DuplicateEntityMapId { id: map.id });
            }
        }

        for (position, rpc) in self.rpcs.iter().enumerate() {
            if rpc.wire_index as usize != position {
                return Err(SchemaError::RpcIndexMismatch {
                    position,
                    wire_index: rpc.wire_index,
                });
            }
        }

        let present = [
            self.mode.is_some(),
            self.map.is_some(),
            self.udp_cookie.is_some(),
            self.udp_port.is_some(),
        ];
        if present.windows(2).any(|pair| !pair[0] && pair[1]) {
            return Err(SchemaError::NonContiguousTrailer);
        }
        Ok(())
    }

    /// Looks up an entity map by id.
    #[must_use]
    pub fn entity_map(&self, id: u32) -> Option<&EntityMapDef> {
        self.entity_maps.iter().find(|map| map.id == id)
    }

    /// Looks up an RPC by its stable internal id.
    #[must_use]
    pub fn rpc_by_internal_id(&self, internal_id: u32) -> Option<&RpcDef> {
        self.rpcs.iter().find(|rpc| rpc.internal_id == internal_id)
    }

    /// Looks up an RPC by the index that addresses it in frames.
    #[must_use]
    pub fn rpc_by_index(&self, wire_index: u32) -> Option<&RpcDef> {
        self.rpcs.get(wire_index as usize)
    }
}

/// Builder for [`SessionSchema`].
///
/// Assigns RPC wire indices by insertion order.
#[derive(Debug, Default)]
pub struct SessionSchemaBuilder {
    schema: SessionSchema,
}

impl SessionSchemaBuilder {
    /// Sets the session header fields from an existing schema value.
    #[must_use]
    pub fn header(mut self, header: SessionSchema) -> Self {
        let entity_maps = std::mem::take(&mut self.schema.entity_maps);
        let rpcs = std::mem::take(&mut self.schema.rpcs);
        self.schema = SessionSchema {
            entity_maps,
            rpcs,
            ..header
        };
        self
    }

    /// Adds an entity map definition.
    #[must_use]
    pub fn entity_map(mut self, map: EntityMapDef) -> Self {
        self.schema.entity_maps.push(map);
        self
    }

    /// Adds an RPC definition, overriding its wire index with its position.
    #[must_use]
    pub fn rpc(mut self, mut rpc: RpcDef) -> Self {
        rpc.wire_index = self.schema.rpcs.len() as u32;
        self.schema.rpcs.push(rpc);
        self
    }

    /// Builds the schema after validation.
    pub fn build(self) -> SchemaResult<SessionSchema> {
        self.schema.validate()?;
        Ok(self.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assigns_wire_indices() {
        let schema = SessionSchema::builder()
            .rpc(RpcDef::new(99, 0xAAAA))
            .rpc(RpcDef::new(99, 0xBBBB).param(1, ParamKind::Uint32))
            .build()
            .unwrap();
        assert_eq!(schema.rpcs[0].wire_index, 0);
        assert_eq!(schema.rpcs[1].wire_index, 1);
        assert_eq!(schema.rpc_by_internal_id(0xBBBB).unwrap().wire_index, 1);
        assert_eq!(schema.rpc_by_index(0).unwrap().internal_id, 0xAAAA);
        assert!(schema.rpc_by_index(2).is_none());
    }

    #[test]
    fn rejects_duplicate_entity_map_ids() {
        let err = SessionSchema::builder()
            .entity_map(EntityMapDef::new(1))
            .entity_map(EntityMapDef::new(1))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateEntityMapId { id: 1 });
    }

    #[test]
    fn rejects_misplaced_rpc() {
        let schema = SessionSchema {
            rpcs: vec![RpcDef::new(1, 5)],
            ..SessionSchema::default()
        };
        assert_eq!(
            schema.validate(),
            Err(SchemaError::RpcIndexMismatch {
                position: 0,
                wire_index: 1
            })
        );
    }

    #[test]
    fn rejects_gapped_trailer() {
        let schema = SessionSchema {
            mode: None,
            map: Some("forest".to_string()),
            ..SessionSchema::default()
        };
        assert_eq!(schema.validate(), Err(SchemaError::NonContiguousTrailer));

        let schema = SessionSchema {
            mode: Some("solo".to_string()),
            map: Some("forest".to_string()),
            ..SessionSchema::default()
        };
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn entity_map_default_tick_uses_field_names() {
        let map = EntityMapDef::new(7)
            .attribute(2_232_061_803, AttributeKind::Uint32, Value::U32(100))
            .attribute(5, AttributeKind::Int8, Value::I8(-1));
        assert_eq!(map.default_tick.get("Health"), Some(&Value::U32(100)));
        assert_eq!(map.default_tick.get("5"), Some(&Value::I8(-1)));
        assert_eq!(map.attribute_index("5"), Some(1));
        assert_eq!(map.presence_mask_len(), 1);
    }

    #[test]
    fn bitmask_lengths() {
        assert_eq!(bitmask_len(0), 0);
        assert_eq!(bitmask_len(1), 1);
        assert_eq!(bitmask_len(7), 1);
        assert_eq!(bitmask_len(8), 1);
        assert_eq!(bitmask_len(9), 2);
    }

    #[test]
    fn header_keeps_definitions() {
        let schema = SessionSchema::builder()
            .entity_map(EntityMapDef::new(3))
            .header(SessionSchema {
                uid: 77,
                ..SessionSchema::default()
            })
            .build()
            .unwrap();
        assert_eq!(schema.uid, 77);
        assert_eq!(schema.entity_maps.len(), 1);
    }
}
