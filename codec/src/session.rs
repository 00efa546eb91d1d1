//! Per-connection codec state.
//!
//! A [`Session`] owns the schema decoded from the handshake, the keystream
//! and the entity table. Sessions share nothing; frames for one session are
//! processed strictly in arrival order.

use schema::{schema_fingerprint, RpcDef, SessionSchema};
use tracing::{debug, info};
use wire::{crypt_rpc_frame, peek_rpc_index, Keystream};

use crate::delta::{apply_entity_update_with_limits, encode_entity_update, EntityUpdateSummary};
use crate::entity::{EntityTable, NetworkEntity};
use crate::error::{CodecError, CodecResult, RpcLookup};
use crate::handshake::decode_handshake;
use crate::limits::CodecLimits;
use crate::rpc::{self, ParamMatch, RpcDecodeOptions, RpcValues};

/// Codec state for one connection.
#[derive(Debug, Clone)]
pub struct Session {
    schema: SessionSchema,
    keystream: Keystream,
    table: EntityTable,
    wire_limits: wire::Limits,
    limits: CodecLimits,
    rpc_options: RpcDecodeOptions,
    last_tick: Option<u32>,
}

impl Session {
    /// Creates a session with default limits.
    #[must_use]
    pub fn new(schema: SessionSchema, keystream: Keystream) -> Self {
        Self::with_limits(
            schema,
            keystream,
            wire::Limits::default(),
            CodecLimits::default(),
        )
    }

    /// Creates a session with explicit limits.
    #[must_use]
    pub fn with_limits(
        schema: SessionSchema,
        keystream: Keystream,
        wire_limits: wire::Limits,
        limits: CodecLimits,
    ) -> Self {
        info!(
            version = schema.version,
            uid = schema.uid,
            entity_maps = schema.entity_maps.len(),
            rpcs = schema.rpcs.len(),
            fingerprint = format_args!("{:016x}", schema_fingerprint(&schema)),
            "session started"
        );
        Self {
            table: EntityTable::new(&schema),
            schema,
            keystream,
            wire_limits,
            limits,
            rpc_options: RpcDecodeOptions::default(),
            last_tick: None,
        }
    }

    /// Decodes an `EnterWorld` response and starts a session from it.
    pub fn from_handshake(
        frame: &[u8],
        keystream: Keystream,
        wire_limits: wire::Limits,
        limits: CodecLimits,
    ) -> CodecResult<Self> {
        let schema = decode_handshake(frame, &wire_limits, &limits)?;
        Ok(Self::with_limits(schema, keystream, wire_limits, limits))
    }

    /// Sets how unmatched RPC parameters are skipped.
    #[must_use]
    pub const fn with_rpc_options(mut self, options: RpcDecodeOptions) -> Self {
        self.rpc_options = options;
        self
    }

    #[must_use]
    pub const fn schema(&self) -> &SessionSchema {
        &self.schema
    }

    #[must_use]
    pub const fn keystream(&self) -> &Keystream {
        &self.keystream
    }

    #[must_use]
    pub const fn table(&self) -> &EntityTable {
        &self.table
    }

    #[must_use]
    pub const fn wire_limits(&self) -> &wire::Limits {
        &self.wire_limits
    }

    #[must_use]
    pub const fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Tick of the last applied entity update.
    #[must_use]
    pub const fn last_tick(&self) -> Option<u32> {
        self.last_tick
    }

    /// Looks up an RPC by internal id.
    pub fn rpc(&self, internal_id: u32) -> CodecResult<&RpcDef> {
        self.schema
            .rpc_by_internal_id(internal_id)
            .ok_or(CodecError::UnknownRpc {
                lookup: RpcLookup::InternalId(internal_id),
            })
    }

    /// Deciphers an incoming RPC frame.
    #[must_use]
    pub fn decrypt_rpc(&self, frame: &[u8]) -> Vec<u8> {
        crypt_rpc_frame(frame, &self.keystream)
    }

    /// Enciphers an outgoing RPC frame.
    #[must_use]
    pub fn encrypt_rpc(&self, frame: &[u8]) -> Vec<u8> {
        crypt_rpc_frame(frame, &self.keystream)
    }

    /// Deciphers an incoming RPC frame and resolves its definition.
    pub fn identify_rpc(&self, frame: &[u8]) -> CodecResult<(&RpcDef, Vec<u8>)> {
        let plain = self.decrypt_rpc(frame);
        let index = peek_rpc_index(&plain, &self.wire_limits)?;
        let def = self
            .schema
            .rpc_by_index(index)
            .ok_or(CodecError::UnknownRpc {
                lookup: RpcLookup::WireIndex(index),
            })?;
        Ok((def, plain))
    }

    /// Deciphers and decodes a scalar RPC frame of the given internal id.
    pub fn decode_rpc(
        &self,
        internal_id: u32,
        matches: &[ParamMatch],
        frame: &[u8],
    ) -> CodecResult<RpcValues> {
        let def = self.rpc(internal_id)?;
        let plain = self.decrypt_rpc(frame);
        rpc::decode_rpc_with(def, matches, &plain, &self.rpc_options, &self.wire_limits)
    }

    /// Deciphers and decodes an array-mode RPC frame of the given internal id.
    pub fn decode_rpc_array(
        &self,
        internal_id: u32,
        matches: &[ParamMatch],
        frame: &[u8],
    ) -> CodecResult<Vec<RpcValues>> {
        let def = self.rpc(internal_id)?;
        let plain = self.decrypt_rpc(frame);
        rpc::decode_rpc_array(
            def,
            matches,
            &plain,
            &self.rpc_options,
            &self.wire_limits,
            &self.limits,
        )
    }

    /// Encodes and enciphers a scalar RPC frame.
    pub fn encode_rpc(
        &self,
        internal_id: u32,
        matches: &[ParamMatch],
        values: &RpcValues,
    ) -> CodecResult<Vec<u8>> {
        let def = self.rpc(internal_id)?;
        let plain = rpc::encode_rpc(def, matches, values)?;
        Ok(self.encrypt_rpc(&plain))
    }

    /// Encodes and enciphers an array-mode RPC frame.
    pub fn encode_rpc_array(
        &self,
        internal_id: u32,
        matches: &[ParamMatch],
        items: &[RpcValues],
    ) -> CodecResult<Vec<u8>> {
        let def = self.rpc(internal_id)?;
        let plain = rpc::encode_rpc_array(def, matches, items)?;
        Ok(self.encrypt_rpc(&plain))
    }

    /// Applies an entity update frame to the session's table.
    pub fn apply_entity_update(&mut self, frame: &[u8]) -> CodecResult<EntityUpdateSummary> {
        let summary = apply_entity_update_with_limits(
            &mut self.table,
            &self.schema,
            frame,
            &self.wire_limits,
            &self.limits,
        )?;
        if let Some(last) = self.last_tick {
            if summary.tick <= last {
                debug!(tick = summary.tick, last, "entity update tick did not advance");
            }
        }
        self.last_tick = Some(summary.tick);
        Ok(summary)
    }

    /// Encodes an entity update frame against the session's table.
    pub fn encode_entity_update(&self, summary: &EntityUpdateSummary) -> CodecResult<Vec<u8>> {
        encode_entity_update(&self.table, &self.schema, summary)
    }

    #[must_use]
    pub fn entity(&self, uid: u32) -> Option<&NetworkEntity> {
        self.table.get(uid)
    }

    /// Iterates live entities in ascending uid order.
    pub fn entities(&self) -> impl Iterator<Item = &NetworkEntity> {
        self.table.iter()
    }

    /// Iterates the live entities of one entity map.
    pub fn entities_in_map(&self, entity_map_id: u32) -> impl Iterator<Item = &NetworkEntity> {
        self.table.entities_in_map(entity_map_id)
    }

    /// Finds an entity by its `Name` field.
    #[must_use]
    pub fn find_entity_by_name(&self, name: &str) -> Option<&NetworkEntity> {
        self.table.find_by_name(name)
    }

    /// Drops all entity state, keeping schema and keystream.
    pub fn reset(&mut self) {
        info!(live = self.table.len(), "session reset");
        self.table.clear();
        self.last_tick = None;
    }
}
