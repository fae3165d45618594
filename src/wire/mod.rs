// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf wire primitives.
//!
//! This module provides the leaf layer of the codec:
//! - [`varint`] - LEB128 and zig-zag integer encoding
//! - [`reader`] - Bounds-checked cursor over an input slice
//! - [`writer`] - Writer over a pre-sized output slice
//!
//! Every field on the wire is `varint((field_number << 3) | wire_type)`
//! followed by a payload whose shape is fixed by the wire type.

pub mod reader;
pub mod varint;
pub mod writer;

pub use reader::WireReader;
pub use writer::WireWriter;

use crate::core::{CodecError, Result};

/// Largest legal field number (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// First field number reserved for the protobuf implementation.
pub const RESERVED_RANGE_START: u32 = 19_000;

/// Last field number reserved for the protobuf implementation.
pub const RESERVED_RANGE_END: u32 = 19_999;

/// On-wire payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint
    Varint = 0,
    /// 8 little-endian bytes
    Fixed64 = 1,
    /// `varint(len)` followed by `len` bytes
    LengthDelimited = 2,
    /// 4 little-endian bytes
    Fixed32 = 5,
}

impl WireType {
    /// Decode the low three bits of a tag.
    ///
    /// Group markers (3 and 4) are rejected along with 6 and 7.
    pub fn from_bits(bits: u8, position: usize) -> Result<Self> {
        match bits {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            other => Err(CodecError::invalid_wire_type(other, position)),
        }
    }

    /// Raw three-bit value.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Payload width for fixed-size wire types.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            WireType::Fixed32 => Some(4),
            WireType::Fixed64 => Some(8),
            WireType::Varint | WireType::LengthDelimited => None,
        }
    }

    /// Convert to string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::Fixed32 => "fixed32",
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field key: field number plus wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Field number, `1..=MAX_FIELD_NUMBER`
    pub field_number: u32,
    /// Payload shape
    pub wire_type: WireType,
}

impl Tag {
    /// Create a tag.
    pub const fn new(field_number: u32, wire_type: WireType) -> Self {
        Self {
            field_number,
            wire_type,
        }
    }

    /// Value that is varint-encoded on the wire.
    pub const fn key(self) -> u64 {
        ((self.field_number as u64) << 3) | self.wire_type.bits() as u64
    }

    /// Split a decoded key into field number and wire type.
    pub fn from_key(key: u64, position: usize) -> Result<Self> {
        let wire_type = WireType::from_bits((key & 0x07) as u8, position)?;
        let field_number = key >> 3;
        if field_number == 0 || field_number > MAX_FIELD_NUMBER as u64 {
            return Err(CodecError::field_number_out_of_range(field_number, position));
        }
        Ok(Self {
            field_number: field_number as u32,
            wire_type,
        })
    }

    /// Encoded size of this tag in bytes.
    pub fn encoded_len(self) -> usize {
        varint::encoded_len(self.key())
    }
}

/// Check that a field number may be declared by a schema.
pub fn is_assignable_field_number(field_number: u32) -> bool {
    (1..=MAX_FIELD_NUMBER).contains(&field_number)
        && !(RESERVED_RANGE_START..=RESERVED_RANGE_END).contains(&field_number)
}
