// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire writer over a pre-sized output slice.
//!
//! The encoder sizes the whole message before writing, so the writer is
//! always handed a slice that is large enough. A write past the end means
//! the size plan and the emitted bytes disagree, which is reported as an
//! invariant violation rather than a capacity problem.

use byteorder::{ByteOrder, LittleEndian};

use super::{Tag, WireType};
use crate::core::{CodecError, Result};

/// Writer for protobuf wire primitives.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use protocodec::wire::{Tag, WireType, WireWriter};
///
/// let mut buf = [0u8; 3];
/// let mut writer = WireWriter::new(&mut buf);
/// writer.put_tag(Tag::new(1, WireType::Varint))?;
/// writer.put_varint(150)?;
/// assert_eq!(writer.position(), 3);
/// assert_eq!(buf, [0x08, 0x96, 0x01]);
/// # Ok(())
/// # }
/// ```
pub struct WireWriter<'a> {
    /// Output buffer
    buffer: &'a mut [u8],
    /// Current write position
    offset: usize,
}

impl<'a> WireWriter<'a> {
    /// Create a writer at the start of `buffer`.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Bytes written so far.
    #[inline]
    pub const fn position(&self) -> usize {
        self.offset
    }

    /// Unused capacity.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    fn claim(&mut self, len: usize) -> Result<&mut [u8]> {
        if len > self.remaining() {
            return Err(CodecError::invariant_violation(format!(
                "write of {len} bytes at offset {} overruns planned size {}",
                self.offset,
                self.buffer.len()
            )));
        }
        let start = self.offset;
        self.offset += len;
        Ok(&mut self.buffer[start..self.offset])
    }

    /// Write a varint.
    pub fn put_varint(&mut self, mut value: u64) -> Result<()> {
        let len = super::varint::encoded_len(value);
        let out = self.claim(len)?;
        for byte in out.iter_mut() {
            *byte = (value as u8 & 0x7F) | 0x80;
            value >>= 7;
        }
        out[len - 1] &= 0x7F;
        Ok(())
    }

    /// Write a field tag.
    pub fn put_tag(&mut self, tag: Tag) -> Result<()> {
        self.put_varint(tag.key())
    }

    /// Write a little-endian 32-bit value.
    pub fn put_fixed32(&mut self, value: u32) -> Result<()> {
        LittleEndian::write_u32(self.claim(4)?, value);
        Ok(())
    }

    /// Write a little-endian 64-bit value.
    pub fn put_fixed64(&mut self, value: u64) -> Result<()> {
        LittleEndian::write_u64(self.claim(8)?, value);
        Ok(())
    }

    /// Write raw bytes verbatim.
    pub fn put_raw(&mut self, data: &[u8]) -> Result<()> {
        self.claim(data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Write `varint(len) || data`.
    pub fn put_length_delimited(&mut self, data: &[u8]) -> Result<()> {
        self.put_varint(data.len() as u64)?;
        self.put_raw(data)
    }

    /// Write a tag followed by a length-delimited payload.
    pub fn put_bytes_field(&mut self, field_number: u32, data: &[u8]) -> Result<()> {
        self.put_tag(Tag::new(field_number, WireType::LengthDelimited))?;
        self.put_length_delimited(data)
    }
}
