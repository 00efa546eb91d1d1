//! Session schema model for the tickwire protocol codec.
//!
//! This crate defines what a server declares at session start:
//! - Entity-map attribute layouts with their default values
//! - RPC parameter layouts, addressed by wire index or internal id
//! - Closed kind enumerations for parameters and attributes
//! - The static attribute-name table
//! - Deterministic schema fingerprinting
//!
//! # Design Principles
//!
//! - **Closed kinds** - Unknown tags are rejected when parsed, never carried along.
//! - **Immutable per session** - A schema is built once from the handshake.
//! - **No wire knowledge** - Decoding and encoding live in the codec crate.

mod error;
mod hash;
mod kind;
mod names;
mod schema;
mod value;

pub use error::{SchemaError, SchemaResult};
pub use hash::schema_fingerprint;
pub use kind::{AttributeKind, ParamKind};
pub use names::{field_name, name_hash, resolve_field_name, FIELD_NAMES};
pub use schema::{
    bitmask_len, AttributeDef, EntityMapDef, ParamDef, RpcDef, SessionSchema,
    SessionSchemaBuilder, Tick, WorldBounds,
};
pub use value::{Value, Vector2};
