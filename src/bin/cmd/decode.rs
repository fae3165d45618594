// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode command - typed dump using a compiled descriptor set.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Args;
use protocodec::schema::{DescriptorPool, FieldDescriptor, MessageDescriptor};
use protocodec::{DynamicMessage, FieldValue, ProtobufCodec, Value};
use serde_json::{json, Map, Value as Json};

use crate::common::{print_json, read_input, Result};

/// Decode a message with its type from a `FileDescriptorSet`.
#[derive(Args, Clone, Debug)]
pub struct DecodeCmd {
    /// Binary FileDescriptorSet (`protoc --descriptor_set_out`)
    #[arg(long, value_name = "FDS")]
    descriptor_set: PathBuf,

    /// Fully qualified message type
    #[arg(long = "type", value_name = "NAME")]
    type_name: String,

    /// Input file
    #[arg(value_name = "FILE", required_unless_present = "hex")]
    input: Option<PathBuf>,

    /// Hex-encoded input instead of a file
    #[arg(long, value_name = "HEX", conflicts_with = "input")]
    hex: Option<String>,
}

impl DecodeCmd {
    pub fn run(self, codec: &ProtobufCodec) -> Result<()> {
        let descriptor = load_descriptor(&self.descriptor_set, &self.type_name)?;
        let bytes = read_input(self.input.as_ref(), self.hex.as_deref())?;
        let message = codec
            .decode(&bytes, &descriptor)
            .with_context(|| format!("Failed to decode {}", self.type_name))?;

        let unknown = count_unknown(&message);
        if unknown > 0 {
            eprintln!("note: {unknown} unknown field(s) not described by {}", self.type_name);
        }
        print_json(&message_to_json(&message))
    }
}

fn load_descriptor(path: &Path, type_name: &str) -> Result<MessageDescriptor> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let pool = DescriptorPool::decode_file_descriptor_set(&bytes)?;
    Ok(pool.message(type_name)?)
}

fn count_unknown(message: &DynamicMessage) -> usize {
    let nested: usize = message
        .fields()
        .map(|(_, value)| match value {
            FieldValue::Singular(v) => count_in_value(v),
            FieldValue::Repeated(values) => values.iter().map(count_in_value).sum(),
            FieldValue::Map(entries) => entries.iter().map(|(_, v)| count_in_value(v)).sum(),
        })
        .sum();
    message.unknown_fields().len() + nested
}

fn count_in_value(value: &Value) -> usize {
    value.as_message().map_or(0, count_unknown)
}

/// Render a message as a JSON object keyed by field name.
fn message_to_json(message: &DynamicMessage) -> Json {
    let descriptor = message.descriptor();
    let mut object = Map::new();
    for (field, value) in message.fields() {
        let rendered = match value {
            FieldValue::Singular(v) => value_to_json(descriptor, field, v),
            FieldValue::Repeated(values) => Json::Array(
                values
                    .iter()
                    .map(|v| value_to_json(descriptor, field, v))
                    .collect(),
            ),
            FieldValue::Map(entries) => map_to_json(descriptor, field, entries.as_slice()),
        };
        object.insert(field.name.clone(), rendered);
    }
    if !message.unknown_fields().is_empty() {
        let unknown = message
            .unknown_fields()
            .iter()
            .map(|u| {
                json!({
                    "number": u.number,
                    "wire_type": u.wire_type.as_str(),
                    "payload": hex::encode(u.payload()),
                })
            })
            .collect();
        object.insert("_unknown".to_string(), Json::Array(unknown));
    }
    Json::Object(object)
}

fn map_to_json(owner: &MessageDescriptor, field: &FieldDescriptor, entries: &[(Value, Value)]) -> Json {
    let entry = owner.message_type(field);
    let value_field = entry.as_ref().and_then(|e| e.field(2).cloned());
    let mut object = Map::new();
    for (key, value) in entries {
        let key = match key {
            Value::String(s) => s.clone(),
            other => scalar_to_json(other).to_string(),
        };
        let rendered = match (&entry, &value_field) {
            (Some(entry), Some(value_field)) => value_to_json(entry, value_field, value),
            _ => scalar_to_json(value),
        };
        object.insert(key, rendered);
    }
    Json::Object(object)
}

fn value_to_json(owner: &MessageDescriptor, field: &FieldDescriptor, value: &Value) -> Json {
    match value {
        Value::Message(nested) => message_to_json(nested),
        Value::Enum(number) => owner
            .enum_type(field)
            .and_then(|e| e.value_name(*number))
            .map_or_else(|| json!(number), |name| json!(name)),
        other => scalar_to_json(other),
    }
}

fn scalar_to_json(value: &Value) -> Json {
    match value {
        Value::Bool(v) => json!(v),
        Value::I32(v) | Value::Enum(v) => json!(v),
        Value::I64(v) => json!(v),
        Value::U32(v) => json!(v),
        Value::U64(v) => json!(v),
        Value::F32(v) if v.is_finite() => json!(v),
        Value::F64(v) if v.is_finite() => json!(v),
        Value::F32(v) => json!(v.to_string()),
        Value::F64(v) => json!(v.to_string()),
        Value::String(s) => json!(s),
        Value::Bytes(b) => json!(hex::encode(b)),
        Value::Message(m) => message_to_json(m),
    }
}
