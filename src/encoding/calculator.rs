// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Size pass for protobuf encoding.
//!
//! Every length-delimited frame whose length depends on its contents
//! (embedded messages, map entries, packed runs) needs that length written
//! before the contents. The calculator walks the message tree once and
//! records those lengths in a [`SizePlan`], in exactly the order the
//! encoder will meet the frames. The encoder then emits in one forward
//! pass with no back-patching.

use super::options::CodecOptions;
use crate::core::{CodecError, FieldValue, Result, Value};
use crate::message::DynamicMessage;
use crate::schema::{Cardinality, FieldDescriptor, Kind};
use crate::wire::varint::{encoded_len as varint_len, zigzag_encode32, zigzag_encode64};
use crate::wire::{Tag, WireType};

/// Frame lengths for one message tree, in emission order.
#[derive(Debug, Clone, Default)]
pub struct SizePlan {
    /// Lengths of content-dependent frames, pre-order
    lengths: Vec<usize>,
    /// Encoded size of the root message
    total: usize,
}

impl SizePlan {
    /// Encoded size of the root message.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of planned frames.
    pub fn frame_count(&self) -> usize {
        self.lengths.len()
    }

    pub(crate) fn frame(&self, index: usize) -> Result<usize> {
        self.lengths.get(index).copied().ok_or_else(|| {
            CodecError::invariant_violation(format!("size plan has no frame {index}"))
        })
    }
}

/// Computes the [`SizePlan`] for a message.
pub struct SizeCalculator<'a> {
    options: &'a CodecOptions,
    lengths: Vec<usize>,
}

impl<'a> SizeCalculator<'a> {
    /// Plan the encoding of `message`.
    pub fn plan(options: &'a CodecOptions, message: &DynamicMessage) -> Result<SizePlan> {
        let mut calculator = Self {
            options,
            lengths: Vec::new(),
        };
        let total = calculator.message_len(message, 0)?;
        Ok(SizePlan {
            lengths: calculator.lengths,
            total,
        })
    }

    /// Reserve a frame slot; it is filled once the contents are sized.
    fn open_frame(&mut self) -> usize {
        self.lengths.push(0);
        self.lengths.len() - 1
    }

    fn close_frame(&mut self, slot: usize, len: usize) -> usize {
        self.lengths[slot] = len;
        varint_len(len as u64) + len
    }

    fn message_len(&mut self, message: &DynamicMessage, depth: u32) -> Result<usize> {
        if depth > self.options.recursion_limit {
            return Err(CodecError::RecursionLimitExceeded {
                limit: self.options.recursion_limit,
            });
        }
        let mut len = 0;
        for (field, value) in message.fields() {
            len += self.field_len(message, field, value, depth)?;
        }
        len += message
            .unknown_fields()
            .iter()
            .map(|u| u.data.len())
            .sum::<usize>();
        Ok(len)
    }

    fn field_len(
        &mut self,
        message: &DynamicMessage,
        field: &FieldDescriptor,
        value: &FieldValue,
        depth: u32,
    ) -> Result<usize> {
        match value {
            FieldValue::Singular(v) => {
                if !should_emit(field, v) {
                    return Ok(0);
                }
                self.element_len(field.number, field.kind, v, depth)
            }
            FieldValue::Repeated(values) if packs(field, self.options) => {
                if values.is_empty() {
                    return Ok(0);
                }
                let slot = self.open_frame();
                let mut payload = 0;
                for v in values {
                    payload += scalar_len(field.kind, v)?;
                }
                Ok(tag_len(field.number, WireType::LengthDelimited) + self.close_frame(slot, payload))
            }
            FieldValue::Repeated(values) => {
                let mut len = 0;
                for v in values {
                    len += self.element_len(field.number, field.kind, v, depth)?;
                }
                Ok(len)
            }
            FieldValue::Map(entries) => {
                let entry = message.descriptor().message_type(field).ok_or_else(|| {
                    CodecError::invariant_violation(format!("map field '{}' has no entry type", field.name))
                })?;
                let (key_field, value_field) = map_entry_fields(&entry)?;
                let tag = tag_len(field.number, WireType::LengthDelimited);
                let mut len = 0;
                for (k, v) in entries {
                    let slot = self.open_frame();
                    let body = self.element_len(key_field.number, key_field.kind, k, depth + 1)?
                        + self.element_len(value_field.number, value_field.kind, v, depth + 1)?;
                    len += tag + self.close_frame(slot, body);
                }
                Ok(len)
            }
        }
    }

    /// Tag plus value for one element.
    fn element_len(&mut self, number: u32, kind: Kind, value: &Value, depth: u32) -> Result<usize> {
        let tag = tag_len(number, kind.wire_type());
        match value {
            Value::Message(nested) => {
                let slot = self.open_frame();
                let body = self.message_len(nested, depth + 1)?;
                Ok(tag + self.close_frame(slot, body))
            }
            v => Ok(tag + scalar_len(kind, v)?),
        }
    }
}

fn tag_len(number: u32, wire_type: WireType) -> usize {
    Tag::new(number, wire_type).encoded_len()
}

/// Singular fields without explicit presence are skipped at their zero value.
pub(crate) fn should_emit(field: &FieldDescriptor, value: &Value) -> bool {
    field.has_presence() || !value.is_default()
}

/// Whether a repeated field goes out as one packed frame.
pub(crate) fn packs(field: &FieldDescriptor, options: &CodecOptions) -> bool {
    options.pack_repeated
        && field.packed
        && field.cardinality == Cardinality::Repeated
        && field.kind.is_packable()
}

pub(crate) fn map_entry_fields(
    entry: &crate::schema::MessageDescriptor,
) -> Result<(&FieldDescriptor, &FieldDescriptor)> {
    match entry.fields() {
        [key, value] => Ok((key, value)),
        _ => Err(CodecError::invariant_violation(format!(
            "map entry '{}' must have key and value fields",
            entry.name()
        ))),
    }
}

/// Encoded length of a non-message value, without its tag.
pub(crate) fn scalar_len(kind: Kind, value: &Value) -> Result<usize> {
    let len = match (kind, value) {
        (Kind::Int32, Value::I32(v)) | (Kind::Enum, Value::Enum(v)) => varint_len(*v as i64 as u64),
        (Kind::SInt32, Value::I32(v)) => varint_len(u64::from(zigzag_encode32(*v))),
        (Kind::Int64, Value::I64(v)) => varint_len(*v as u64),
        (Kind::SInt64, Value::I64(v)) => varint_len(zigzag_encode64(*v)),
        (Kind::UInt32, Value::U32(v)) => varint_len(u64::from(*v)),
        (Kind::UInt64, Value::U64(v)) => varint_len(*v),
        (Kind::Bool, Value::Bool(_)) => 1,
        (Kind::Fixed32, Value::U32(_)) | (Kind::SFixed32, Value::I32(_)) | (Kind::Float, Value::F32(_)) => 4,
        (Kind::Fixed64, Value::U64(_)) | (Kind::SFixed64, Value::I64(_)) | (Kind::Double, Value::F64(_)) => 8,
        (Kind::String, Value::String(s)) => varint_len(s.len() as u64) + s.len(),
        (Kind::Bytes, Value::Bytes(b)) => varint_len(b.len() as u64) + b.len(),
        (kind, value) => {
            return Err(CodecError::type_mismatch(
                "<element>",
                kind.as_str(),
                value.type_name(),
            ))
        }
    };
    Ok(len)
}
