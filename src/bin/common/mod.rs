// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use protocodec::{CodecOptions, ProtobufCodec};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the level from `warn`.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the codec, loading options from `config` when given.
pub fn load_codec(config: Option<&Path>) -> Result<ProtobufCodec> {
    let options = match config {
        Some(path) => CodecOptions::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CodecOptions::default(),
    };
    Ok(ProtobufCodec::with_options(options))
}

/// Read message bytes from a file or a hex string.
pub fn read_input(file: Option<&PathBuf>, hex_input: Option<&str>) -> Result<Vec<u8>> {
    match (file, hex_input) {
        (_, Some(text)) => parse_hex(text),
        (Some(path), None) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        (None, None) => Err(anyhow::anyhow!("Provide an input FILE or --hex")),
    }
}

/// Parse hex, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(&cleaned);
    hex::decode(cleaned).with_context(|| format!("Invalid hex input: {text}"))
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
