// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-less decoding.
//!
//! Walks a buffer using only the wire rules: each field yields its number,
//! wire type and raw value. Without a schema VARINT payloads cannot be told
//! apart from each other (int32, sint64, bool, enum...), so they are shown
//! as unsigned integers. LENGTH_DELIMITED payloads that parse completely as
//! a message are shown nested, otherwise as bytes.

use serde::{Serialize, Serializer};

use super::options::DEFAULT_RECURSION_LIMIT;
use crate::core::{CodecError, Result};
use crate::wire::{WireReader, WireType};

/// One field as seen on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawField {
    /// Field number
    pub number: u32,
    /// Decoded payload
    #[serde(flatten)]
    pub value: RawValue,
}

/// Payload of a [`RawField`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "wire_type", rename_all = "snake_case")]
pub enum RawValue {
    /// VARINT payload
    Varint { value: u64 },
    /// FIXED64 payload
    Fixed64 { value: u64 },
    /// LENGTH_DELIMITED payload that is not a well-formed message
    Bytes {
        #[serde(serialize_with = "serialize_hex")]
        value: Vec<u8>,
    },
    /// LENGTH_DELIMITED payload that parses as a message
    Message { fields: Vec<RawField> },
    /// FIXED32 payload
    Fixed32 { value: u32 },
}

impl RawValue {
    /// Wire type the payload was read with.
    pub fn wire_type(&self) -> WireType {
        match self {
            RawValue::Varint { .. } => WireType::Varint,
            RawValue::Fixed64 { .. } => WireType::Fixed64,
            RawValue::Bytes { .. } | RawValue::Message { .. } => WireType::LengthDelimited,
            RawValue::Fixed32 { .. } => WireType::Fixed32,
        }
    }
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// Decode `bytes` without a schema.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use protocodec::encoding::raw::{decode_raw, RawValue};
///
/// let fields = decode_raw(&[0x08, 0x96, 0x01])?;
/// assert_eq!(fields[0].number, 1);
/// assert_eq!(fields[0].value, RawValue::Varint { value: 150 });
/// # Ok(())
/// # }
/// ```
pub fn decode_raw(bytes: &[u8]) -> Result<Vec<RawField>> {
    read_fields(&mut WireReader::new(bytes), 0)
}

fn read_fields(reader: &mut WireReader<'_>, depth: u32) -> Result<Vec<RawField>> {
    if depth > DEFAULT_RECURSION_LIMIT {
        return Err(CodecError::RecursionLimitExceeded {
            limit: DEFAULT_RECURSION_LIMIT,
        });
    }
    let mut fields = Vec::new();
    while !reader.is_at_end() {
        let tag = reader.read_tag()?;
        let value = match tag.wire_type {
            WireType::Varint => RawValue::Varint {
                value: reader.read_varint()?,
            },
            WireType::Fixed64 => RawValue::Fixed64 {
                value: reader.read_fixed64()?,
            },
            WireType::Fixed32 => RawValue::Fixed32 {
                value: reader.read_fixed32()?,
            },
            WireType::LengthDelimited => {
                let (payload, base) = reader.read_length_delimited()?;
                match nested(payload, base, depth) {
                    Some(fields) => RawValue::Message { fields },
                    None => RawValue::Bytes {
                        value: payload.to_vec(),
                    },
                }
            }
        };
        fields.push(RawField {
            number: tag.field_number,
            value,
        });
    }
    Ok(fields)
}

fn nested(payload: &[u8], base: usize, depth: u32) -> Option<Vec<RawField>> {
    if payload.is_empty() {
        return None;
    }
    read_fields(&mut WireReader::nested(payload, base), depth + 1).ok()
}

/// Render fields in the indented `number: value` text layout.
pub fn format_raw(fields: &[RawField]) -> String {
    let mut out = String::new();
    write_fields(fields, 0, &mut out);
    out
}

fn write_fields(fields: &[RawField], indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    for field in fields {
        let number = field.number;
        let line = match &field.value {
            RawValue::Varint { value } => format!("{pad}{number}: {value}\n"),
            RawValue::Fixed64 { value } => format!("{pad}{number}: 0x{value:016x}\n"),
            RawValue::Fixed32 { value } => format!("{pad}{number}: 0x{value:08x}\n"),
            RawValue::Bytes { value } => format!("{pad}{number}: \"{}\"\n", value.escape_ascii()),
            RawValue::Message { fields } => {
                out.push_str(&format!("{pad}{number} {{\n"));
                write_fields(fields, indent + 1, out);
                format!("{pad}}}\n")
            }
        };
        out.push_str(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_detection() {
        // 1: 150, 2: "hi!" (not a valid message), 3 { 1: 1 }
        let bytes = [0x08, 0x96, 0x01, 0x12, 0x03, b'h', b'i', b'!', 0x1A, 0x02, 0x08, 0x01];
        let fields = decode_raw(&bytes).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[1].value, RawValue::Bytes { value: b"hi!".to_vec() });
        assert_eq!(
            fields[2].value,
            RawValue::Message {
                fields: vec![RawField {
                    number: 1,
                    value: RawValue::Varint { value: 1 }
                }]
            }
        );
        assert_eq!(format_raw(&fields), "1: 150\n2: \"hi!\"\n3 {\n  1: 1\n}\n");
    }

    #[test]
    fn test_json_shape() {
        let fields = decode_raw(&[0x0D, 1, 0, 0, 0, 0x12, 0x01, 0xFF]).unwrap();
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json[0]["wire_type"], "fixed32");
        assert_eq!(json[0]["value"], 1);
        assert_eq!(json[1]["wire_type"], "bytes");
        assert_eq!(json[1]["value"], "ff");
    }

    #[test]
    fn test_errors_propagate() {
        assert!(matches!(
            decode_raw(&[0x0B]),
            Err(CodecError::InvalidWireType { wire_type: 3, .. })
        ));
        assert!(matches!(
            decode_raw(&[0x12, 0x05, 0x00]),
            Err(CodecError::TruncatedMessage { .. })
        ));
    }
}
