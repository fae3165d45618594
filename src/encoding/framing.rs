// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Delimiting several messages in one stream.
//!
//! The wire format has no message boundary of its own. Two common
//! conventions are supported:
//!
//! - varint-delimited: `varint(len) || message`
//! - fixed header: a 4-byte big-endian length ahead of each message, as
//!   used by streaming RPC transports

use std::io::{ErrorKind, Read, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use super::encoder::Encoder;
use super::ProtobufCodec;
use crate::core::{CodecError, Result};
use crate::message::DynamicMessage;
use crate::schema::MessageDescriptor;
use crate::wire::varint::encoded_len;
use crate::wire::{WireReader, WireWriter};

/// Size of the fixed frame header.
pub const FRAME_HEADER_LEN: usize = 4;

/// Encode `message` prefixed with its varint length.
pub fn encode_length_delimited(codec: &ProtobufCodec, message: &DynamicMessage) -> Result<Vec<u8>> {
    let plan = codec.plan(message)?;
    let size = plan.total();
    let prefix_len = encoded_len(size as u64);
    let mut out = vec![0u8; prefix_len + size];
    WireWriter::new(&mut out[..prefix_len]).put_varint(size as u64)?;
    Encoder::new(codec.options(), &plan, &mut out[prefix_len..]).encode(message)?;
    Ok(out)
}

/// Decode one varint-delimited message from the front of `bytes`.
///
/// Returns the message and the number of bytes consumed.
pub fn decode_length_delimited(
    codec: &ProtobufCodec,
    bytes: &[u8],
    descriptor: &MessageDescriptor,
) -> Result<(DynamicMessage, usize)> {
    let mut reader = WireReader::new(bytes);
    let (payload, _) = reader.read_length_delimited()?;
    let message = codec.decode(payload, descriptor)?;
    Ok((message, reader.position()))
}

/// Split a buffer of varint-delimited messages into message slices.
pub fn split_length_delimited(bytes: &[u8]) -> Result<Vec<&[u8]>> {
    let mut reader = WireReader::new(bytes);
    let mut frames = Vec::new();
    while !reader.is_at_end() {
        frames.push(reader.read_length_delimited()?.0);
    }
    Ok(frames)
}

/// Writes messages with a 4-byte big-endian length header.
#[derive(Debug)]
pub struct FrameWriter<W: Write> {
    inner: W,
    codec: ProtobufCodec,
    frames: u64,
}

impl<W: Write> FrameWriter<W> {
    /// Wrap a writer using the default codec.
    pub fn new(inner: W) -> Self {
        Self::with_codec(inner, ProtobufCodec::default())
    }

    /// Wrap a writer using `codec`.
    pub fn with_codec(inner: W, codec: ProtobufCodec) -> Self {
        Self {
            inner,
            codec,
            frames: 0,
        }
    }

    /// Write one message. Returns the frame size including the header.
    pub fn write_message(&mut self, message: &DynamicMessage) -> Result<usize> {
        let payload = self.codec.encode(message)?;
        self.write_frame(&payload)
    }

    /// Write an already encoded payload as one frame.
    pub fn write_frame(&mut self, payload: &[u8]) -> Result<usize> {
        let len = u32::try_from(payload.len()).map_err(|_| CodecError::MessageTooLarge {
            size: payload.len(),
            limit: u32::MAX as usize,
        })?;
        self.inner.write_u32::<BigEndian>(len)?;
        self.inner.write_all(payload)?;
        self.frames += 1;
        Ok(FRAME_HEADER_LEN + payload.len())
    }

    /// Frames written so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads messages written by [`FrameWriter`].
#[derive(Debug)]
pub struct FrameReader<R: Read> {
    inner: R,
    codec: ProtobufCodec,
    offset: usize,
}

impl<R: Read> FrameReader<R> {
    /// Wrap a reader using the default codec.
    pub fn new(inner: R) -> Self {
        Self::with_codec(inner, ProtobufCodec::default())
    }

    /// Wrap a reader using `codec`.
    pub fn with_codec(inner: R, codec: ProtobufCodec) -> Self {
        Self {
            inner,
            codec,
            offset: 0,
        }
    }

    /// Stream offset of the next frame.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Read the next frame payload. `None` at a clean end of stream.
    pub fn read_frame(&mut self) -> Result<Option<Vec<u8>>> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        let got = self.fill(&mut header)?;
        if got == 0 {
            return Ok(None);
        }
        if got < FRAME_HEADER_LEN {
            return Err(CodecError::truncated(FRAME_HEADER_LEN, got, self.offset));
        }
        let len = BigEndian::read_u32(&header) as usize;
        self.codec.options().check_size(len)?;

        let mut payload = vec![0u8; len];
        let got = self.fill(&mut payload)?;
        if got < len {
            return Err(CodecError::truncated(
                len,
                got,
                self.offset + FRAME_HEADER_LEN,
            ));
        }
        self.offset += FRAME_HEADER_LEN + len;
        Ok(Some(payload))
    }

    /// Read and decode the next message. `None` at a clean end of stream.
    pub fn read_message(&mut self, descriptor: &MessageDescriptor) -> Result<Option<DynamicMessage>> {
        match self.read_frame()? {
            Some(payload) => Ok(Some(self.codec.decode(&payload, descriptor)?)),
            None => Ok(None),
        }
    }

    /// Read until `buf` is full or the stream ends; returns bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}
