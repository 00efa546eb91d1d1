use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::{CodecLimits, Session};
use glob::Pattern;
use serde::Serialize;
use tickwire_tools::{
    classify_frame, decode_rpc_frame, format_handshake_pretty, format_replay_pretty,
    inspect_handshake, keystream_hex, parse_hex_bytes, parse_keystream, replay,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wire::{EnterWorldRequest, Keystream};

#[derive(Parser)]
#[command(
    name = "tickwire-tools",
    version,
    about = "tickwire frame inspection and replay tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the packet tag of a frame, or of every frame in a directory.
    Classify {
        /// Path to a frame file or a directory of frames.
        path: PathBuf,
        /// Optional glob filter when classifying a directory.
        #[arg(long)]
        glob: Option<String>,
    },
    /// Decode an EnterWorld response into its session schema.
    Handshake {
        /// Path to the response frame.
        frame: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Derive a session keystream.
    Keystream {
        /// EnterWorld request frame supplying version and proof of work.
        #[arg(long, conflicts_with_all = ["version", "pow"])]
        request: Option<PathBuf>,
        /// Session version.
        #[arg(long, requires = "pow")]
        version: Option<u32>,
        /// Proof-of-work bytes as hex.
        #[arg(long, requires = "version")]
        pow: Option<String>,
        /// Endpoint URL path, leading slash included.
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Decrypt an RPC frame and decode all of its parameters.
    Rpc {
        /// Path to the EnterWorld response frame of the session.
        handshake: PathBuf,
        /// Path to the enciphered RPC frame.
        frame: PathBuf,
        /// Session keystream as 16 hex digits.
        #[arg(long)]
        keystream: String,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Apply a directory of captured entity update frames in name order.
    Replay {
        /// Path to the EnterWorld response frame of the session.
        handshake: PathBuf,
        /// Directory of captured frames.
        dir: PathBuf,
        /// Optional glob filter on frame file names.
        #[arg(long)]
        glob: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let wire_limits = wire::Limits::default();
    let limits = CodecLimits::default();

    match cli.command {
        Command::Classify { path, glob } => {
            let files = if path.is_dir() {
                collect_frame_files(&path, glob.as_deref())?
            } else {
                vec![path]
            };
            for file in files {
                let bytes = read_frame(&file)?;
                match classify_frame(&bytes) {
                    Ok(report) => println!(
                        "{}: {} ({}) {} bytes{}",
                        file.display(),
                        report.tag,
                        report.tag_byte,
                        report.len,
                        if report.core { "" } else { " [forwarded]" }
                    ),
                    Err(err) => println!("{}: {err:#}", file.display()),
                }
            }
        }
        Command::Handshake { frame, format } => {
            let bytes = read_frame(&frame)?;
            let report = inspect_handshake(&bytes, &wire_limits, &limits)?;
            match format {
                Format::Json => print_json(&report)?,
                Format::Pretty => print!("{}", format_handshake_pretty(&report)),
            }
        }
        Command::Keystream {
            request,
            version,
            pow,
            path,
        } => {
            let keystream = match (request, version, pow) {
                (Some(request), _, _) => {
                    let bytes = read_frame(&request)?;
                    let request = EnterWorldRequest::decode(&bytes, &wire_limits)
                        .context("decode EnterWorld request")?;
                    info!(name = %request.display_name, version = request.version, "request");
                    request.keystream_for(&path)
                }
                (None, Some(version), Some(pow)) => {
                    Keystream::derive(version, path.as_bytes(), &parse_hex_bytes(&pow)?)
                }
                _ => anyhow::bail!("pass --request or both --version and --pow"),
            };
            println!("{}", keystream_hex(&keystream));
        }
        Command::Rpc {
            handshake,
            frame,
            keystream,
            format,
        } => {
            let session = load_session(&handshake, parse_keystream(&keystream)?, &limits)?;
            let bytes = read_frame(&frame)?;
            let report = decode_rpc_frame(&session, &bytes)?;
            match format {
                Format::Json => print_json(&report)?,
                Format::Pretty => {
                    let mode = if report.is_array { " array" } else { "" };
                    println!(
                        "rpc [{}] {}{mode}",
                        report.wire_index, report.internal_id
                    );
                    for (i, item) in report.items.iter().enumerate() {
                        for (name, value) in item {
                            println!("  #{i} {name} = {value}");
                        }
                    }
                }
            }
        }
        Command::Replay {
            handshake,
            dir,
            glob,
            format,
        } => {
            let mut session = load_session(&handshake, Keystream::default(), &limits)?;
            let files = collect_frame_files(&dir, glob.as_deref())?;
            let mut frames = Vec::with_capacity(files.len());
            for file in &files {
                frames.push((file.display().to_string(), read_frame(file)?));
            }
            let report = replay(
                &mut session,
                frames.iter().map(|(name, bytes)| (name.clone(), bytes.as_slice())),
            )?;
            match format {
                Format::Json => print_json(&report)?,
                Format::Pretty => print!("{}", format_replay_pretty(&report)),
            }
        }
    }
    Ok(())
}

fn load_session(handshake: &Path, keystream: Keystream, limits: &CodecLimits) -> Result<Session> {
    let bytes = read_frame(handshake)?;
    Session::from_handshake(&bytes, keystream, wire::Limits::default(), limits.clone())
        .with_context(|| format!("decode handshake {}", handshake.display()))
}

fn read_frame(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read frame {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{json}");
    Ok(())
}

fn collect_frame_files(dir: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        files.push(path);
    }
    // Captures are named in arrival order
    files.sort();
    Ok(files)
}
