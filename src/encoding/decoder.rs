// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf parse loop.
//!
//! Reads tag after tag until the message slice is exhausted and dispatches
//! on the field number through the descriptor table:
//!
//! - known field, matching wire type: decode and store (singular fields
//!   take the last value, repeated fields append, map entries overwrite by
//!   key)
//! - known repeated scalar carried as LENGTH_DELIMITED: unpack a packed run
//! - known field, other wire type: keep as an unknown field, or fail in
//!   strict mode
//! - unknown field number: keep the exact tag and payload bytes
//!
//! A field value is fully read before it is stored, so a failure never
//! leaves a half-applied field behind.

use super::calculator::map_entry_fields;
use super::options::CodecOptions;
use crate::core::{CodecError, FieldValue, MapEntries, Result, Value};
use crate::message::{DynamicMessage, UnknownField};
use crate::schema::{Cardinality, FieldDescriptor, Kind, MessageDescriptor};
use crate::wire::varint::{zigzag_decode32, zigzag_decode64};
use crate::wire::{Tag, WireReader, WireType};

/// Descriptor-driven protobuf decoder.
pub struct Decoder<'a> {
    options: &'a CodecOptions,
}

impl<'a> Decoder<'a> {
    /// Create a decoder with the given options.
    pub fn new(options: &'a CodecOptions) -> Self {
        Self { options }
    }

    /// Decode `bytes` as a message of type `descriptor`.
    pub fn decode(&self, bytes: &[u8], descriptor: &MessageDescriptor) -> Result<DynamicMessage> {
        let mut message = DynamicMessage::new(descriptor.clone());
        self.merge(bytes, &mut message)?;
        Ok(message)
    }

    /// Decode `bytes` on top of an existing message.
    ///
    /// Equivalent to decoding the concatenation of the message's encoding
    /// and `bytes`.
    pub fn merge(&self, bytes: &[u8], message: &mut DynamicMessage) -> Result<()> {
        self.options.check_size(bytes.len())?;
        let mut reader = WireReader::new(bytes);
        self.read_message(&mut reader, message, 0)
    }

    fn check_depth(&self, depth: u32) -> Result<()> {
        if depth > self.options.recursion_limit {
            tracing::warn!(limit = self.options.recursion_limit, "message nesting too deep");
            return Err(CodecError::RecursionLimitExceeded {
                limit: self.options.recursion_limit,
            });
        }
        Ok(())
    }

    fn read_message(
        &self,
        reader: &mut WireReader<'_>,
        message: &mut DynamicMessage,
        depth: u32,
    ) -> Result<()> {
        self.check_depth(depth)?;
        let descriptor = message.descriptor().clone();

        while !reader.is_at_end() {
            let start = reader.position();
            let tag = reader.read_tag()?;
            match descriptor.field(tag.field_number) {
                Some(field) if accepts(field, tag.wire_type) => {
                    self.read_field(reader, message, &descriptor, field, tag.wire_type, depth)?;
                }
                Some(field) => {
                    if self.options.strict_wire_types {
                        tracing::warn!(
                            message = descriptor.name(),
                            field = field.number,
                            expected = field.wire_type().as_str(),
                            actual = tag.wire_type.as_str(),
                            "rejecting wire type mismatch"
                        );
                        return Err(CodecError::WireTypeMismatch {
                            field_number: field.number,
                            expected: field.wire_type().as_str(),
                            actual: tag.wire_type.as_str(),
                        });
                    }
                    tracing::debug!(
                        message = descriptor.name(),
                        field = field.number,
                        expected = field.wire_type().as_str(),
                        actual = tag.wire_type.as_str(),
                        "wire type mismatch, keeping field as unknown"
                    );
                    self.read_unknown(reader, message, tag, start)?;
                }
                None => {
                    tracing::debug!(
                        message = descriptor.name(),
                        field = tag.field_number,
                        wire_type = tag.wire_type.as_str(),
                        "unknown field"
                    );
                    self.read_unknown(reader, message, tag, start)?;
                }
            }
        }

        tracing::trace!(
            message = descriptor.name(),
            bytes = reader.position(),
            unknown = message.unknown_fields().len(),
            "decoded message"
        );
        Ok(())
    }

    fn read_unknown(
        &self,
        reader: &mut WireReader<'_>,
        message: &mut DynamicMessage,
        tag: Tag,
        start: usize,
    ) -> Result<()> {
        reader.skip_value(tag.wire_type)?;
        if self.options.preserve_unknown_fields {
            let data = reader.slice(start, reader.position()).to_vec();
            message.push_unknown(UnknownField::new(tag.field_number, tag.wire_type, data));
        }
        Ok(())
    }

    fn read_field(
        &self,
        reader: &mut WireReader<'_>,
        message: &mut DynamicMessage,
        descriptor: &MessageDescriptor,
        field: &FieldDescriptor,
        wire_type: WireType,
        depth: u32,
    ) -> Result<()> {
        let number = field.number;
        match field.cardinality {
            Cardinality::Singular => {
                let value = self.read_element(reader, descriptor, field, field.kind, depth)?;
                if !field.has_presence() && value.is_default() {
                    message.remove_slot(number);
                } else {
                    message.put_slot(number, FieldValue::Singular(value));
                    if let Some(oneof) = field.oneof_index {
                        message.select_oneof(oneof, number);
                    }
                }
            }
            Cardinality::Repeated if wire_type == WireType::LengthDelimited && field.kind.is_packable() => {
                let (payload, base) = reader.read_length_delimited()?;
                let mut packed = WireReader::nested(payload, base);
                let mut values = Vec::new();
                while !packed.is_at_end() {
                    values.push(self.read_scalar(&mut packed, field.kind, number)?);
                }
                append(message, number, values);
            }
            Cardinality::Repeated => {
                let value = self.read_element(reader, descriptor, field, field.kind, depth)?;
                append(message, number, vec![value]);
            }
            Cardinality::Map => {
                let entry = descriptor.message_type(field).ok_or_else(|| {
                    CodecError::invariant_violation(format!("map field '{}' has no entry type", field.name))
                })?;
                let (payload, base) = reader.read_length_delimited()?;
                let mut entry_reader = WireReader::nested(payload, base);
                let (key, value) = self.read_map_entry(&mut entry_reader, &entry, depth + 1)?;
                match message.slot_mut(number) {
                    Some(FieldValue::Map(entries)) => entries.upsert(key, value),
                    _ => {
                        let entries = MapEntries::from_iter([(key, value)]);
                        message.put_slot(number, FieldValue::Map(entries));
                    }
                }
            }
        }
        Ok(())
    }

    /// Read one `{key = 1, value = 2}` entry. Missing halves take their defaults.
    fn read_map_entry(
        &self,
        reader: &mut WireReader<'_>,
        entry: &MessageDescriptor,
        depth: u32,
    ) -> Result<(Value, Value)> {
        self.check_depth(depth)?;
        let (key_field, value_field) = map_entry_fields(entry)?;
        let mut key = None;
        let mut value = None;
        while !reader.is_at_end() {
            let tag = reader.read_tag()?;
            if tag.field_number == key_field.number && tag.wire_type == key_field.wire_type() {
                key = Some(self.read_element(reader, entry, key_field, key_field.kind, depth)?);
            } else if tag.field_number == value_field.number && tag.wire_type == value_field.wire_type() {
                value = Some(self.read_element(reader, entry, value_field, value_field.kind, depth)?);
            } else {
                reader.skip_value(tag.wire_type)?;
            }
        }
        let key = match key {
            Some(key) => key,
            None => default_element(entry, key_field)?,
        };
        let value = match value {
            Some(value) => value,
            None => default_element(entry, value_field)?,
        };
        Ok((key, value))
    }

    /// Read one element of `kind`; messages recurse one level deeper.
    fn read_element(
        &self,
        reader: &mut WireReader<'_>,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        kind: Kind,
        depth: u32,
    ) -> Result<Value> {
        if kind != Kind::Message {
            return self.read_scalar(reader, kind, field.number);
        }
        let nested_type = owner.message_type(field).ok_or_else(|| {
            CodecError::invariant_violation(format!("message field '{}' has no type", field.name))
        })?;
        let (payload, base) = reader.read_length_delimited()?;
        let mut nested = DynamicMessage::new(nested_type);
        self.read_message(&mut WireReader::nested(payload, base), &mut nested, depth + 1)?;
        Ok(Value::Message(Box::new(nested)))
    }

    fn read_scalar(&self, reader: &mut WireReader<'_>, kind: Kind, number: u32) -> Result<Value> {
        let value = match kind {
            Kind::Int32 => Value::I32(reader.read_varint()? as i32),
            Kind::Int64 => Value::I64(reader.read_varint()? as i64),
            Kind::UInt32 => Value::U32(reader.read_varint()? as u32),
            Kind::UInt64 => Value::U64(reader.read_varint()?),
            Kind::SInt32 => Value::I32(zigzag_decode32(reader.read_varint()? as u32)),
            Kind::SInt64 => Value::I64(zigzag_decode64(reader.read_varint()?)),
            Kind::Bool => Value::Bool(reader.read_varint()? != 0),
            Kind::Enum => Value::Enum(reader.read_varint()? as i32),
            Kind::Fixed32 => Value::U32(reader.read_fixed32()?),
            Kind::SFixed32 => Value::I32(reader.read_fixed32()? as i32),
            Kind::Float => Value::F32(f32::from_bits(reader.read_fixed32()?)),
            Kind::Fixed64 => Value::U64(reader.read_fixed64()?),
            Kind::SFixed64 => Value::I64(reader.read_fixed64()? as i64),
            Kind::Double => Value::F64(f64::from_bits(reader.read_fixed64()?)),
            Kind::Bytes => Value::Bytes(reader.read_length_delimited()?.0.to_vec()),
            Kind::String => {
                let (payload, position) = reader.read_length_delimited()?;
                match std::str::from_utf8(payload) {
                    Ok(text) => Value::String(text.to_string()),
                    Err(_) if self.options.validate_utf8 => {
                        return Err(CodecError::InvalidUtf8 {
                            field_number: number,
                            position,
                        })
                    }
                    Err(_) => Value::String(String::from_utf8_lossy(payload).into_owned()),
                }
            }
            Kind::Message => {
                return Err(CodecError::invariant_violation(
                    "message kind read as scalar",
                ))
            }
        };
        Ok(value)
    }
}

/// Wire types a field accepts: its own, plus LENGTH_DELIMITED for packed runs.
fn accepts(field: &FieldDescriptor, wire_type: WireType) -> bool {
    wire_type == field.wire_type()
        || (field.cardinality == Cardinality::Repeated
            && field.kind.is_packable()
            && wire_type == WireType::LengthDelimited)
}

fn append(message: &mut DynamicMessage, number: u32, values: Vec<Value>) {
    if values.is_empty() {
        return;
    }
    match message.slot_mut(number) {
        Some(FieldValue::Repeated(existing)) => existing.extend(values),
        _ => message.put_slot(number, FieldValue::Repeated(values)),
    }
}

fn default_element(owner: &MessageDescriptor, field: &FieldDescriptor) -> Result<Value> {
    match owner.message_type(field) {
        Some(nested) => Ok(Value::Message(Box::new(DynamicMessage::new(nested)))),
        None => field
            .default_scalar()
            .ok_or_else(|| CodecError::invariant_violation("scalar kind without default")),
    }
}
