//! Limits for codec-level decoding.

use crate::error::{CodecError, CodecResult, LimitKind};

/// Codec-specific limits enforced while decoding handshakes and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum number of entity maps in a handshake.
    pub max_entity_maps: usize,
    /// Maximum number of attributes per entity map.
    pub max_attributes_per_map: usize,
    /// Maximum number of RPC definitions in a handshake.
    pub max_rpcs: usize,
    /// Maximum number of parameters per RPC.
    pub max_params_per_rpc: usize,
    /// Maximum repeat count of an array-mode RPC frame.
    pub max_array_repeat: usize,
    /// Maximum number of live entities after applying an update.
    pub max_live_entities: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_entity_maps: 256,
            max_attributes_per_map: 256,
            max_rpcs: 4096,
            // Parameter count is a single byte on the wire
            max_params_per_rpc: 255,
            max_array_repeat: usize::from(u16::MAX),
            max_live_entities: 65_536,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_entity_maps: 16,
            max_attributes_per_map: 32,
            max_rpcs: 64,
            max_params_per_rpc: 16,
            max_array_repeat: 64,
            max_live_entities: 256,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_entity_maps: usize::MAX,
            max_attributes_per_map: usize::MAX,
            max_rpcs: usize::MAX,
            max_params_per_rpc: usize::MAX,
            max_array_repeat: usize::MAX,
            max_live_entities: usize::MAX,
        }
    }

    pub(crate) fn check(&self, kind: LimitKind, actual: usize) -> CodecResult<()> {
        let limit = match kind {
            LimitKind::EntityMaps => self.max_entity_maps,
            LimitKind::AttributesPerMap => self.max_attributes_per_map,
            LimitKind::Rpcs => self.max_rpcs,
            LimitKind::ParametersPerRpc => self.max_params_per_rpc,
            LimitKind::ArrayRepeat => self.max_array_repeat,
            LimitKind::LiveEntities => self.max_live_entities,
        };
        if actual > limit {
            return Err(CodecError::LimitsExceeded {
                kind,
                limit,
                actual,
            });
        }
        Ok(())
    }
}
