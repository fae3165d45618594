// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf emit pass.
//!
//! Writes a message tree into a buffer sized by the [`SizePlan`]. Known
//! fields go out in ascending field-number order, followed by the unknown
//! fields in their original arrival order.

use super::calculator::{map_entry_fields, packs, should_emit, SizePlan};
use super::options::CodecOptions;
use crate::core::{CodecError, FieldValue, Result, Value};
use crate::message::DynamicMessage;
use crate::schema::{FieldDescriptor, Kind};
use crate::wire::varint::{zigzag_encode32, zigzag_encode64};
use crate::wire::{Tag, WireType, WireWriter};

/// Single-pass writer driven by a size plan.
pub struct Encoder<'p, 'b> {
    options: &'p CodecOptions,
    plan: &'p SizePlan,
    next_frame: usize,
    writer: WireWriter<'b>,
}

impl<'p, 'b> Encoder<'p, 'b> {
    /// Create an encoder writing into `buffer`.
    ///
    /// `buffer` must hold at least `plan.total()` bytes.
    pub fn new(options: &'p CodecOptions, plan: &'p SizePlan, buffer: &'b mut [u8]) -> Self {
        Self {
            options,
            plan,
            next_frame: 0,
            writer: WireWriter::new(buffer),
        }
    }

    /// Emit the root message and return the number of bytes written.
    pub fn encode(mut self, message: &DynamicMessage) -> Result<usize> {
        self.write_message(message)?;
        let written = self.writer.position();
        if written != self.plan.total() || self.next_frame != self.plan.frame_count() {
            return Err(CodecError::invariant_violation(format!(
                "emitted {written} bytes over {} frames, planned {} bytes over {} frames",
                self.next_frame,
                self.plan.total(),
                self.plan.frame_count()
            )));
        }
        Ok(written)
    }

    fn begin_frame(&mut self) -> Result<(usize, usize)> {
        let len = self.plan.frame(self.next_frame)?;
        self.next_frame += 1;
        self.writer.put_varint(len as u64)?;
        Ok((self.writer.position(), len))
    }

    fn end_frame(&self, (start, len): (usize, usize)) -> Result<()> {
        let actual = self.writer.position() - start;
        if actual != len {
            return Err(CodecError::invariant_violation(format!(
                "frame at offset {start} planned {len} bytes, wrote {actual}"
            )));
        }
        Ok(())
    }

    fn write_message(&mut self, message: &DynamicMessage) -> Result<()> {
        for (field, value) in message.fields() {
            self.write_field(message, field, value)?;
        }
        for unknown in message.unknown_fields() {
            self.writer.put_raw(&unknown.data)?;
        }
        Ok(())
    }

    fn write_field(
        &mut self,
        message: &DynamicMessage,
        field: &FieldDescriptor,
        value: &FieldValue,
    ) -> Result<()> {
        match value {
            FieldValue::Singular(v) => {
                if should_emit(field, v) {
                    self.write_element(field.number, field.kind, v)?;
                }
            }
            FieldValue::Repeated(values) if packs(field, self.options) => {
                if values.is_empty() {
                    return Ok(());
                }
                self.writer
                    .put_tag(Tag::new(field.number, WireType::LengthDelimited))?;
                let frame = self.begin_frame()?;
                for v in values {
                    self.write_scalar(field.kind, v)?;
                }
                self.end_frame(frame)?;
            }
            FieldValue::Repeated(values) => {
                for v in values {
                    self.write_element(field.number, field.kind, v)?;
                }
            }
            FieldValue::Map(entries) => {
                let entry = message.descriptor().message_type(field).ok_or_else(|| {
                    CodecError::invariant_violation(format!("map field '{}' has no entry type", field.name))
                })?;
                let (key_field, value_field) = map_entry_fields(&entry)?;
                for (k, v) in entries {
                    self.writer
                        .put_tag(Tag::new(field.number, WireType::LengthDelimited))?;
                    let frame = self.begin_frame()?;
                    self.write_element(key_field.number, key_field.kind, k)?;
                    self.write_element(value_field.number, value_field.kind, v)?;
                    self.end_frame(frame)?;
                }
            }
        }
        Ok(())
    }

    fn write_element(&mut self, number: u32, kind: Kind, value: &Value) -> Result<()> {
        self.writer.put_tag(Tag::new(number, kind.wire_type()))?;
        match value {
            Value::Message(nested) => {
                let frame = self.begin_frame()?;
                self.write_message(nested)?;
                self.end_frame(frame)
            }
            v => self.write_scalar(kind, v),
        }
    }

    fn write_scalar(&mut self, kind: Kind, value: &Value) -> Result<()> {
        let w = &mut self.writer;
        match (kind, value) {
            (Kind::Int32, Value::I32(v)) | (Kind::Enum, Value::Enum(v)) => w.put_varint(*v as i64 as u64),
            (Kind::SInt32, Value::I32(v)) => w.put_varint(u64::from(zigzag_encode32(*v))),
            (Kind::Int64, Value::I64(v)) => w.put_varint(*v as u64),
            (Kind::SInt64, Value::I64(v)) => w.put_varint(zigzag_encode64(*v)),
            (Kind::UInt32, Value::U32(v)) => w.put_varint(u64::from(*v)),
            (Kind::UInt64, Value::U64(v)) => w.put_varint(*v),
            (Kind::Bool, Value::Bool(v)) => w.put_varint(u64::from(*v)),
            (Kind::Fixed32, Value::U32(v)) => w.put_fixed32(*v),
            (Kind::SFixed32, Value::I32(v)) => w.put_fixed32(*v as u32),
            (Kind::Float, Value::F32(v)) => w.put_fixed32(v.to_bits()),
            (Kind::Fixed64, Value::U64(v)) => w.put_fixed64(*v),
            (Kind::SFixed64, Value::I64(v)) => w.put_fixed64(*v as u64),
            (Kind::Double, Value::F64(v)) => w.put_fixed64(v.to_bits()),
            (Kind::String, Value::String(s)) => w.put_length_delimited(s.as_bytes()),
            (Kind::Bytes, Value::Bytes(b)) => w.put_length_delimited(b),
            (kind, value) => Err(CodecError::type_mismatch(
                "<element>",
                kind.as_str(),
                value.type_name(),
            )),
        }
    }
}
