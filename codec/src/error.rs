//! Error types for codec operations.

use std::fmt;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding or encoding handshakes, RPCs and
/// entity updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Wire framing error.
    Wire(wire::DecodeError),

    /// Cursor error.
    Cursor(bitstream::CursorError),

    /// Schema error.
    Schema(schema::SchemaError),

    /// An update references an entity map the schema does not declare.
    UnknownEntityMapId { id: u32 },

    /// An update addresses a uid that is not in the entity table.
    UnknownEntity { uid: u32 },

    /// No RPC with the given index or internal id.
    UnknownRpc { lookup: RpcLookup },

    /// RPC frame carries a different wire index than its definition.
    RpcIndexMismatch { expected: u32, found: u32 },

    /// Scalar codec used on an array-mode RPC, or the reverse.
    RpcModeMismatch { internal_id: u32, is_array: bool },

    /// A signed count byte was negative.
    NegativeCount { what: CountKind, count: i8 },

    /// A count does not fit its wire prefix when encoding.
    CountOverflow {
        what: CountKind,
        count: usize,
        max: usize,
    },

    /// An update summary names a field the entity map does not have.
    UnknownField { entity_map_id: u32, field: String },

    /// A matched RPC field has no value to encode.
    MissingRpcValue { name: String },

    /// A value does not have the type its slot requires.
    ValueTypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// How an RPC was looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcLookup {
    WireIndex(u32),
    InternalId(u32),
}

/// Counted sections of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    Deletions,
    CreationBlocks,
    CreatedEntities,
    ArrayRepeat,
    Parameters,
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    EntityMaps,
    AttributesPerMap,
    Rpcs,
    ParametersPerRpc,
    ArrayRepeat,
    LiveEntities,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::Cursor(e) => write!(f, "cursor error: {e}"),
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::UnknownEntityMapId { id } => write!(f, "unknown entity map id {id}"),
            Self::UnknownEntity { uid } => write!(f, "entity {uid} not found"),
            Self::UnknownRpc { lookup } => write!(f, "unknown rpc: {lookup}"),
            Self::RpcIndexMismatch { expected, found } => {
                write!(f, "rpc index mismatch: expected {expected}, found {found}")
            }
            Self::RpcModeMismatch {
                internal_id,
                is_array,
            } => {
                let mode = if *is_array { "array" } else { "scalar" };
                write!(f, "rpc 0x{internal_id:08x} is {mode}-mode")
            }
            Self::NegativeCount { what, count } => write!(f, "negative {what} count {count}"),
            Self::CountOverflow { what, count, max } => {
                write!(f, "{what} count {count} exceeds wire maximum {max}")
            }
            Self::UnknownField {
                entity_map_id,
                field,
            } => write!(f, "entity map {entity_map_id} has no field {field:?}"),
            Self::MissingRpcValue { name } => write!(f, "no value for rpc field {name:?}"),
            Self::ValueTypeMismatch {
                field,
                expected,
                found,
            } => {
                write!(f, "field {field:?}: expected {expected} but got {found}")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for RpcLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WireIndex(index) => write!(f, "wire index {index}"),
            Self::InternalId(id) => write!(f, "internal id 0x{id:08x}"),
        }
    }
}

impl fmt::Display for CountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deletions => "deletion",
            Self::CreationBlocks => "creation block",
            Self::CreatedEntities => "created entity",
            Self::ArrayRepeat => "array repeat",
            Self::Parameters => "parameter",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EntityMaps => "entity maps",
            Self::AttributesPerMap => "attributes per map",
            Self::Rpcs => "rpcs",
            Self::ParametersPerRpc => "parameters per rpc",
            Self::ArrayRepeat => "array repeat",
            Self::LiveEntities => "live entities",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            Self::Cursor(e) => Some(e),
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wire::DecodeError> for CodecError {
    fn from(err: wire::DecodeError) -> Self {
        Self::Wire(err)
    }
}

impl From<wire::EncodeError> for CodecError {
    fn from(err: wire::EncodeError) -> Self {
        match err {
            wire::EncodeError::Cursor(e) => Self::Cursor(e),
        }
    }
}

impl From<bitstream::CursorError> for CodecError {
    fn from(err: bitstream::CursorError) -> Self {
        Self::Cursor(err)
    }
}

impl From<schema::SchemaError> for CodecError {
    fn from(err: schema::SchemaError) -> Self {
        Self::Schema(err)
    }
}
