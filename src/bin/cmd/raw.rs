// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode-raw command - dump any buffer without a schema.

use std::path::PathBuf;

use clap::Args;
use protocodec::encoding::{decode_raw, format_raw};

use crate::common::{print_json, read_input, Result};

/// Schema-less dump of a protobuf buffer.
#[derive(Args, Clone, Debug)]
pub struct RawCmd {
    /// Input file
    #[arg(value_name = "FILE", required_unless_present = "hex")]
    input: Option<PathBuf>,

    /// Hex-encoded input instead of a file
    #[arg(long, value_name = "HEX", conflicts_with = "input")]
    hex: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

impl RawCmd {
    pub fn run(self) -> Result<()> {
        let bytes = read_input(self.input.as_ref(), self.hex.as_deref())?;
        let fields = decode_raw(&bytes)?;
        tracing::info!(bytes = bytes.len(), fields = fields.len(), "decoded raw buffer");

        if self.json {
            print_json(&fields)
        } else {
            print!("{}", format_raw(&fields));
            Ok(())
        }
    }
}
