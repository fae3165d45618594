// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Protocodec CLI
//!
//! Command-line tool for inspecting protobuf wire data.
//!
//! ## Usage
//!
//! ```sh
//! # Schema-less dump
//! protocodec decode-raw --hex 089601
//!
//! # Typed dump with a compiled descriptor set
//! protocodec decode --descriptor-set app.fds --type app.Order order.bin
//!
//! # List frames of a delimited stream
//! protocodec frames --varint orders.stream
//! ```

mod cmd;
mod common;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use cmd::{DecodeCmd, FramesCmd, RawCmd};
use common::{init_logging, load_codec, Result};

/// Protocodec - protobuf wire format toolkit
#[derive(Parser, Clone)]
#[command(name = "protocodec")]
#[command(about = "Inspect and decode protobuf wire data", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Codec options file (TOML)
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Dump a buffer without a schema
    #[command(name = "decode-raw")]
    DecodeRaw(RawCmd),

    /// Decode a buffer as a named message type
    Decode(DecodeCmd),

    /// List frames of a length-prefixed stream
    Frames(FramesCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let codec = load_codec(cli.config.as_deref())?;

    match cli.command {
        Commands::DecodeRaw(cmd) => cmd.run(),
        Commands::Decode(cmd) => cmd.run(&codec),
        Commands::Frames(cmd) => cmd.run(&codec),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        if let Some(codec_error) = e.downcast_ref::<protocodec::CodecError>() {
            tracing::debug!(fields = ?codec_error.log_fields(), "codec error");
        }
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
