//! Inspection and replay tools for captured tickwire frames.
//!
//! This crate provides utilities for understanding a captured session:
//!
//! - Classify frames by packet tag
//! - Decode an `EnterWorld` response into its schema
//! - Derive session keystreams
//! - Decrypt and auto-decode RPC frames
//! - Replay entity update frames into an entity table
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use codec::{
    auto_matches, decode_rpc_array, decode_rpc_with, CodecLimits, EntityUpdateSummary,
    NetworkEntity, RpcDecodeOptions, RpcValues, Session,
};
use schema::{schema_fingerprint, SessionSchema};
use serde::Serialize;
use tracing::debug;
use wire::{Keystream, PacketTag};

/// Tag and size of one captured frame.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FrameReport {
    pub tag: String,
    pub tag_byte: u8,
    pub len: usize,
    /// Whether the codec decodes this frame kind.
    pub core: bool,
}

/// Classifies a frame by its tag byte.
pub fn classify_frame(frame: &[u8]) -> Result<FrameReport> {
    let tag = PacketTag::of(frame).context("classify frame")?;
    Ok(FrameReport {
        tag: tag.to_string(),
        tag_byte: tag.as_u8(),
        len: frame.len(),
        core: tag.is_core(),
    })
}

/// A decoded handshake with its layout fingerprint.
#[derive(Debug, Clone, Serialize)]
pub struct HandshakeReport {
    pub fingerprint: String,
    pub schema: SessionSchema,
}

/// Decodes an `EnterWorld` response frame.
pub fn inspect_handshake(
    frame: &[u8],
    wire_limits: &wire::Limits,
    limits: &CodecLimits,
) -> Result<HandshakeReport> {
    let schema =
        codec::decode_handshake(frame, wire_limits, limits).context("decode handshake")?;
    Ok(HandshakeReport {
        fingerprint: format!("{:016x}", schema_fingerprint(&schema)),
        schema,
    })
}

/// Parses a keystream from 16 hex digits.
pub fn parse_keystream(text: &str) -> Result<Keystream> {
    let bytes = hex::decode(text.trim()).context("keystream is not hex")?;
    Ok(Keystream::from_slice(&bytes)?)
}

/// Formats a keystream as lowercase hex.
#[must_use]
pub fn keystream_hex(keystream: &Keystream) -> String {
    hex::encode(keystream.as_bytes())
}

/// One decrypted RPC frame.
#[derive(Debug, Clone, Serialize)]
pub struct RpcReport {
    pub wire_index: u32,
    pub internal_id: String,
    pub is_array: bool,
    /// One entry for scalar RPCs, one per repeat for array-mode RPCs.
    pub items: Vec<RpcValues>,
}

/// Decrypts an RPC frame and decodes every non-`Uint8` parameter.
///
/// Unmatched `Uint8` parameters are skipped at their declared width.
pub fn decode_rpc_frame(session: &Session, frame: &[u8]) -> Result<RpcReport> {
    let (def, plain) = session.identify_rpc(frame).context("identify rpc")?;
    let matches = auto_matches(def);
    let options = RpcDecodeOptions {
        unmatched: codec::UnmatchedSkip::DeclaredWidth,
    };
    let items = if def.is_array {
        decode_rpc_array(
            def,
            &matches,
            &plain,
            &options,
            session.wire_limits(),
            session.limits(),
        )?
    } else {
        vec![decode_rpc_with(
            def,
            &matches,
            &plain,
            &options,
            session.wire_limits(),
        )?]
    };
    Ok(RpcReport {
        wire_index: def.wire_index,
        internal_id: format!("{:08x}", def.internal_id),
        is_array: def.is_array,
        items,
    })
}

/// Summary of one replayed frame.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayFrame {
    pub name: String,
    pub summary: EntityUpdateSummary,
}

/// Result of replaying a capture.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub fingerprint: String,
    pub frames: Vec<ReplayFrame>,
    pub skipped: usize,
    pub entities: Vec<NetworkEntity>,
}

/// Applies every entity update frame in order, skipping other frames.
pub fn replay<'a, I>(session: &mut Session, frames: I) -> Result<ReplayReport>
where
    I: IntoIterator<Item = (String, &'a [u8])>,
{
    let mut report = ReplayReport {
        fingerprint: format!("{:016x}", schema_fingerprint(session.schema())),
        frames: Vec::new(),
        skipped: 0,
        entities: Vec::new(),
    };
    for (name, frame) in frames {
        if frame.first() != Some(&PacketTag::EntityUpdate.as_u8()) {
            debug!(frame = %name, "skipping non entity-update frame");
            report.skipped += 1;
            continue;
        }
        let summary = session
            .apply_entity_update(frame)
            .with_context(|| format!("apply {name}"))?;
        report.frames.push(ReplayFrame { name, summary });
    }
    report.entities = session.entities().cloned().collect();
    Ok(report)
}

/// Renders a handshake report as indented text.
#[must_use]
pub fn format_handshake_pretty(report: &HandshakeReport) -> String {
    let schema = &report.schema;
    let mut out = String::new();
    let _ = writeln!(out, "fingerprint: {}", report.fingerprint);
    let _ = writeln!(
        out,
        "version: {} uid: {} tick: {} rate: {}/{}",
        schema.version,
        schema.uid,
        schema.starting_tick,
        schema.tick_rate,
        schema.effective_tick_rate
    );
    let _ = writeln!(
        out,
        "players: {}/{} name: {:?}",
        schema.players, schema.max_players, schema.effective_display_name
    );
    let _ = writeln!(out, "entity maps:");
    for map in &schema.entity_maps {
        let _ = writeln!(out, "  map {} ({} attributes)", map.id, map.attributes.len());
        for attr in &map.attributes {
            let name = attr.field_name();
            let default = map
                .default_tick
                .get(&name)
                .map_or_else(|| "-".to_string(), ToString::to_string);
            let _ = writeln!(out, "    {name}: {} = {default}", attr.kind);
        }
    }
    let _ = writeln!(out, "rpcs:");
    for rpc in &schema.rpcs {
        let kinds: Vec<String> = rpc
            .parameters
            .iter()
            .map(|p| format!("{:x}:{}", p.id, p.kind))
            .collect();
        let mode = if rpc.is_array { " array" } else { "" };
        let _ = writeln!(
            out,
            "  [{}] {:08x}{mode} ({})",
            rpc.wire_index,
            rpc.internal_id,
            kinds.join(", ")
        );
    }
    if let Some(mode) = &schema.mode {
        let _ = writeln!(out, "mode: {mode}");
    }
    if let Some(map) = &schema.map {
        let _ = writeln!(out, "map: {map}");
    }
    out
}

/// Renders a replay report as indented text.
#[must_use]
pub fn format_replay_pretty(report: &ReplayReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "fingerprint: {}", report.fingerprint);
    for frame in &report.frames {
        let s = &frame.summary;
        let _ = writeln!(
            out,
            "{}: tick {} +{} -{} ~{}",
            frame.name,
            s.tick,
            s.created.len(),
            s.deleted.len(),
            s.updated.len()
        );
    }
    let _ = writeln!(out, "skipped: {}", report.skipped);
    let _ = writeln!(out, "entities: {}", report.entities.len());
    for entity in &report.entities {
        let fields: Vec<String> = entity
            .tick
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        let _ = writeln!(
            out,
            "  {} (map {}): {}",
            entity.uid,
            entity.model_hash,
            fields.join(" ")
        );
    }
    out
}

/// Parses a `--pow` argument given as hex.
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        bail!("hex input has odd length {}", text.len());
    }
    Ok(hex::decode(text)?)
}
