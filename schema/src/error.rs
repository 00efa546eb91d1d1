//! Schema validation errors.

use std::fmt;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building or validating a session schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// RPC parameter tag outside the closed kind enumeration.
    UnknownParameterKind { tag: u8 },

    /// Attribute tag outside the closed kind enumeration.
    UnknownAttributeKind { tag: u32 },

    /// Two entity maps share an id.
    DuplicateEntityMapId { id: u32 },

    /// An RPC's wire index does not match its position.
    RpcIndexMismatch { position: usize, wire_index: u32 },

    /// A trailing optional field is set while an earlier one is not.
    NonContiguousTrailer,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParameterKind { tag } => write!(f, "unknown parameter kind tag {tag}"),
            Self::UnknownAttributeKind { tag } => write!(f, "unknown attribute kind tag {tag}"),
            Self::DuplicateEntityMapId { id } => write!(f, "duplicate entity map id {id}"),
            Self::RpcIndexMismatch {
                position,
                wire_index,
            } => write!(
                f,
                "rpc at position {position} has wire index {wire_index}"
            ),
            Self::NonContiguousTrailer => {
                write!(f, "optional trailer fields must be set in order")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_tag() {
        assert!(SchemaError::UnknownParameterKind { tag: 42 }
            .to_string()
            .contains("42"));
        assert!(SchemaError::UnknownAttributeKind { tag: 99 }
            .to_string()
            .contains("99"));
    }

    #[test]
    fn display_rpc_index() {
        let msg = SchemaError::RpcIndexMismatch {
            position: 1,
            wire_index: 3,
        }
        .to_string();
        assert!(msg.contains('1'));
        assert!(msg.contains('3'));
    }
}
