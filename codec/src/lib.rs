//! Handshake, RPC and entity update codecs for the tickwire protocol.
//!
//! This is the main codec crate that ties together bitstream, wire, and
//! schema to decode a session from its handshake, exchange RPC frames and
//! keep a live entity table in sync with the server.
//!
//! # Features
//!
//! - `EnterWorld` response decoding and encoding
//! - RPC parameter matching with per-field XOR keys
//! - Array-mode RPCs and auto-decoding of unknown RPCs
//! - Entity update frames (deletions, creations, bitmask diffs)
//! - A per-connection [`Session`] owning schema, keystream and entity table
//!
//! # Design Principles
//!
//! - **Atomic frames** - A malformed update never leaves a half-applied table.
//! - **Share nothing** - All mutable state is owned by one session.
//! - **Typed failures** - Every fatal condition is a [`CodecError`] variant.

mod attribute;
mod delta;
mod entity;
mod error;
mod handshake;
mod limits;
mod rpc;
mod session;

pub use attribute::{decode_attribute, encode_attribute};
pub use delta::{
    apply_entity_update, apply_entity_update_with_limits, encode_entity_update, CreatedEntity,
    EntityUpdateSummary, UpdatedEntity,
};
pub use entity::{EntityMap, EntityTable, NetworkEntity};
pub use error::{CodecError, CodecResult, CountKind, LimitKind, RpcLookup};
pub use handshake::{decode_handshake, encode_handshake};
pub use limits::CodecLimits;
pub use rpc::{
    auto_decode_rpc, auto_matches, decode_rpc, decode_rpc_array, decode_rpc_with, encode_rpc,
    encode_rpc_array, ParamMatch, RpcDecodeOptions, RpcValues, UnmatchedSkip,
};
pub use session::Session;
pub use wire::Limits as WireLimits;
