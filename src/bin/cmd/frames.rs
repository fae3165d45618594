// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Frames command - list the messages of a length-prefixed stream.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use protocodec::encoding::{decode_raw, split_length_delimited, FrameReader, FRAME_HEADER_LEN};
use protocodec::ProtobufCodec;
use serde::Serialize;

use crate::common::{print_json, Result};

/// List frames in a stream of delimited messages.
#[derive(Args, Clone, Debug)]
pub struct FramesCmd {
    /// Input stream file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Frames use a varint length prefix instead of a 4-byte big-endian header
    #[arg(long)]
    varint: bool,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct FrameInfo {
    index: usize,
    offset: usize,
    length: usize,
    /// Top-level field count, or `None` if the payload is not a valid message
    fields: Option<usize>,
}

impl FrameInfo {
    fn new(index: usize, offset: usize, payload: &[u8]) -> Self {
        Self {
            index,
            offset,
            length: payload.len(),
            fields: decode_raw(payload).ok().map(|f| f.len()),
        }
    }
}

impl FramesCmd {
    pub fn run(self, codec: &ProtobufCodec) -> Result<()> {
        let frames = if self.varint {
            self.varint_frames()?
        } else {
            self.header_frames(codec)?
        };
        tracing::info!(frames = frames.len(), "scanned stream");

        if self.json {
            return print_json(&frames);
        }
        println!("{:>6}  {:>10}  {:>10}  FIELDS", "INDEX", "OFFSET", "LENGTH");
        for frame in &frames {
            let fields = frame
                .fields
                .map_or_else(|| "invalid".to_string(), |n| n.to_string());
            println!(
                "{:>6}  {:>10}  {:>10}  {fields}",
                frame.index, frame.offset, frame.length
            );
        }
        println!("{} frame(s)", frames.len());
        Ok(())
    }

    fn varint_frames(&self) -> Result<Vec<FrameInfo>> {
        let bytes = std::fs::read(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))?;
        let base = bytes.as_ptr() as usize;
        Ok(split_length_delimited(&bytes)?
            .into_iter()
            .enumerate()
            .map(|(index, payload)| FrameInfo::new(index, payload.as_ptr() as usize - base, payload))
            .collect())
    }

    fn header_frames(&self, codec: &ProtobufCodec) -> Result<Vec<FrameInfo>> {
        let file = File::open(&self.input)
            .with_context(|| format!("Failed to open {}", self.input.display()))?;
        let mut reader = FrameReader::with_codec(BufReader::new(file), codec.clone());
        let mut frames = Vec::new();
        loop {
            let offset = reader.offset() + FRAME_HEADER_LEN;
            match reader.read_frame()? {
                Some(payload) => frames.push(FrameInfo::new(frames.len(), offset, &payload)),
                None => break,
            }
        }
        Ok(frames)
    }
}
