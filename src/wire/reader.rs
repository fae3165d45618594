// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire cursor for reading protobuf-encoded data.
//!
//! The cursor borrows the input slice and never copies payloads: strings,
//! bytes and nested messages come back as sub-slices of the input. Every
//! successful read advances the offset by at least one byte, so a loop that
//! reads until [`WireReader::is_at_end`] always terminates.

use byteorder::{ByteOrder, LittleEndian};

use super::varint::{self, VarintScan};
use super::{Tag, WireType};
use crate::core::{CodecError, Result};

/// Cursor over an encoded message.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use protocodec::wire::{WireReader, WireType};
///
/// let data = [0x08, 0x96, 0x01];
/// let mut reader = WireReader::new(&data);
/// let tag = reader.read_tag()?;
/// assert_eq!(tag.field_number, 1);
/// assert_eq!(tag.wire_type, WireType::Varint);
/// assert_eq!(reader.read_varint()?, 150);
/// assert!(reader.is_at_end());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    /// Input slice
    data: &'a [u8],
    /// Current read position
    offset: usize,
    /// Absolute position of `data[0]` in the outermost buffer, for error reporting
    base: usize,
}

impl<'a> WireReader<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
        }
    }

    /// Create a cursor over a nested frame that began at `base` in the outer buffer.
    pub fn nested(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            offset: 0,
            base,
        }
    }

    /// Current position relative to this cursor's slice.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Current position in the outermost buffer.
    #[inline]
    pub fn absolute_position(&self) -> usize {
        self.base + self.offset
    }

    /// Remaining bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if at end of buffer.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Slice between two cursor positions.
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.data[start.min(self.data.len())..end.min(self.data.len())]
    }

    /// Read a varint.
    ///
    /// Running out of input mid-varint is a truncation; an overlong varint is
    /// malformed.
    pub fn read_varint(&mut self) -> Result<u64> {
        match varint::scan(self.data, self.offset) {
            VarintScan::Complete(value, consumed) => {
                self.offset += consumed;
                Ok(value)
            }
            VarintScan::Incomplete => Err(CodecError::truncated(
                self.remaining() + 1,
                self.remaining(),
                self.absolute_position(),
            )),
            VarintScan::Overrun => Err(CodecError::malformed_varint(self.absolute_position())),
        }
    }

    /// Read and validate a field tag.
    pub fn read_tag(&mut self) -> Result<Tag> {
        let position = self.absolute_position();
        let key = self.read_varint()?;
        Tag::from_key(key, position)
    }

    /// Read `len` raw bytes.
    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CodecError::truncated(
                len,
                self.remaining(),
                self.absolute_position(),
            ));
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.data[start..self.offset])
    }

    /// Read a little-endian 32-bit value.
    pub fn read_fixed32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_raw(4)?))
    }

    /// Read a little-endian 64-bit value.
    pub fn read_fixed64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read_raw(8)?))
    }

    /// Read a length-delimited payload, returning the payload and its absolute start.
    pub fn read_length_delimited(&mut self) -> Result<(&'a [u8], usize)> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| {
            CodecError::truncated(usize::MAX, self.remaining(), self.absolute_position())
        })?;
        let start = self.absolute_position();
        Ok((self.read_raw(len)?, start))
    }

    /// Skip over one value of the given wire type.
    pub fn skip_value(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.read_raw(8)?;
            }
            WireType::Fixed32 => {
                self.read_raw(4)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
        }
        Ok(())
    }
}
