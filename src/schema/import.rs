// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Import of compiled `FileDescriptorSet` binaries.
//!
//! Schema compilers (`protoc --descriptor_set_out`, `buf build`) emit the
//! descriptor set as a protobuf message itself. It is decoded here with
//! `prost-types` and flattened into a [`DescriptorPool`]. No `.proto`
//! source is ever parsed.

use std::collections::HashMap;

use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet,
};

use super::descriptor::{EnumDescriptor, FieldDescriptor, MessageDefinition};
use super::pool::{DescriptorPool, DescriptorPoolBuilder};
use super::{Cardinality, Kind};
use crate::core::{CodecError, Result, Value};

impl DescriptorPool {
    /// Build a pool from a binary `FileDescriptorSet`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use protocodec::schema::DescriptorPool;
    ///
    /// let bytes = std::fs::read("descriptors.bin")?;
    /// let pool = DescriptorPool::decode_file_descriptor_set(&bytes)?;
    /// let person = pool.message("example.Person")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn decode_file_descriptor_set(bytes: &[u8]) -> Result<Self> {
        let set = FileDescriptorSet::decode(bytes).map_err(|e| {
            CodecError::invalid_schema(
                "FileDescriptorSet",
                format!("Failed to decode FileDescriptorSet: {e}"),
            )
        })?;
        Self::from_file_descriptor_set(&set)
    }

    /// Build a pool from an already decoded `FileDescriptorSet`.
    pub fn from_file_descriptor_set(set: &FileDescriptorSet) -> Result<Self> {
        // Enum defaults are written by value name, so enums are collected first.
        let mut enums = HashMap::new();
        for file in &set.file {
            let package = file.package();
            for enumeration in &file.enum_type {
                collect_enum(package, enumeration, &mut enums);
            }
            for message in &file.message_type {
                collect_nested_enums(&qualify(package, message.name()), message, &mut enums);
            }
        }

        let mut builder = DescriptorPool::builder();
        for file in &set.file {
            let importer = FileImporter {
                file,
                proto3: file.syntax() == "proto3",
                enums: &enums,
            };
            for message in &file.message_type {
                importer.import_message(file.package(), message, &mut builder)?;
            }
        }
        let mut names: Vec<_> = enums.keys().cloned().collect();
        names.sort();
        for name in names {
            if let Some(enumeration) = enums.remove(&name) {
                builder.add_enum(enumeration);
            }
        }

        tracing::debug!(files = set.file.len(), "imported FileDescriptorSet");
        builder.build()
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

fn collect_enum(
    scope: &str,
    proto: &EnumDescriptorProto,
    out: &mut HashMap<String, EnumDescriptor>,
) {
    let name = qualify(scope, proto.name());
    let enumeration = proto
        .value
        .iter()
        .fold(EnumDescriptor::new(name.clone()), |e, v| {
            e.value(v.name(), v.number())
        });
    out.insert(name, enumeration);
}

fn collect_nested_enums(
    scope: &str,
    message: &DescriptorProto,
    out: &mut HashMap<String, EnumDescriptor>,
) {
    for enumeration in &message.enum_type {
        collect_enum(scope, enumeration, out);
    }
    for nested in &message.nested_type {
        collect_nested_enums(&qualify(scope, nested.name()), nested, out);
    }
}

struct FileImporter<'a> {
    file: &'a FileDescriptorProto,
    proto3: bool,
    enums: &'a HashMap<String, EnumDescriptor>,
}

impl FileImporter<'_> {
    fn import_message(
        &self,
        scope: &str,
        proto: &DescriptorProto,
        builder: &mut DescriptorPoolBuilder,
    ) -> Result<()> {
        let name = qualify(scope, proto.name());
        let mut definition = MessageDefinition::new(name.clone());
        definition.map_entry = proto.options.as_ref().is_some_and(|o| o.map_entry());
        definition.oneofs = proto.oneof_decl.iter().map(|o| o.name().to_string()).collect();

        for field in &proto.field {
            let descriptor = self.import_field(&name, proto, field)?;
            definition.fields.push(descriptor);
        }
        builder.add_message(definition);

        for nested in &proto.nested_type {
            self.import_message(&name, nested, builder)?;
        }
        Ok(())
    }

    fn import_field(
        &self,
        message_name: &str,
        message: &DescriptorProto,
        proto: &FieldDescriptorProto,
    ) -> Result<FieldDescriptor> {
        let invalid = |reason: String| CodecError::invalid_schema(message_name, reason);

        let kind = match proto.r#type() {
            Type::Double => Kind::Double,
            Type::Float => Kind::Float,
            Type::Int64 => Kind::Int64,
            Type::Uint64 => Kind::UInt64,
            Type::Int32 => Kind::Int32,
            Type::Fixed64 => Kind::Fixed64,
            Type::Fixed32 => Kind::Fixed32,
            Type::Bool => Kind::Bool,
            Type::String => Kind::String,
            Type::Bytes => Kind::Bytes,
            Type::Uint32 => Kind::UInt32,
            Type::Sfixed32 => Kind::SFixed32,
            Type::Sfixed64 => Kind::SFixed64,
            Type::Sint32 => Kind::SInt32,
            Type::Sint64 => Kind::SInt64,
            Type::Enum => Kind::Enum,
            Type::Message => Kind::Message,
            Type::Group => {
                return Err(invalid(format!(
                    "field '{}' uses the unsupported group encoding",
                    proto.name()
                )))
            }
        };
        let number = u32::try_from(proto.number())
            .map_err(|_| invalid(format!("field '{}' has negative number", proto.name())))?;

        let type_name = proto
            .type_name
            .as_deref()
            .map(|t| t.trim_start_matches('.').to_string());
        let repeated = proto.label() == Label::Repeated;
        let is_map = repeated
            && kind == Kind::Message
            && type_name
                .as_deref()
                .and_then(|t| find_nested(message_name, message, t))
                .is_some_and(|entry| entry.options.as_ref().is_some_and(|o| o.map_entry()));

        let mut field = FieldDescriptor::scalar(proto.name(), number, kind);
        field.type_name = type_name;
        if is_map {
            field.cardinality = Cardinality::Map;
            field.explicit_presence = false;
            return Ok(field);
        }

        if repeated {
            field = field.repeated();
            let declared = proto.options.as_ref().and_then(|o| o.packed);
            field.packed = kind.is_packable() && declared.unwrap_or(self.proto3);
            return Ok(field);
        }

        let proto3_optional = proto.proto3_optional.unwrap_or(false);
        field.explicit_presence = kind == Kind::Message || proto3_optional || !self.proto3;
        // Synthetic oneofs wrapping proto3 `optional` fields only carry presence.
        if !proto3_optional {
            if let Some(index) = proto.oneof_index {
                let index = u32::try_from(index)
                    .map_err(|_| invalid(format!("field '{}' has bad oneof index", proto.name())))?;
                field = field.in_oneof(index);
            }
        }

        if let Some(text) = proto.default_value.as_deref() {
            field.default_value = Some(self.parse_default(message_name, &field, text)?);
        }
        Ok(field)
    }

    fn parse_default(&self, message_name: &str, field: &FieldDescriptor, text: &str) -> Result<Value> {
        let bad = || {
            CodecError::invalid_schema(
                message_name,
                format!(
                    "field '{}' default '{text}' is not a valid {}",
                    field.name, field.kind
                ),
            )
        };
        let value = match field.kind {
            Kind::Bool => Value::Bool(text.parse().map_err(|_| bad())?),
            Kind::Int32 | Kind::SInt32 | Kind::SFixed32 => Value::I32(text.parse().map_err(|_| bad())?),
            Kind::Int64 | Kind::SInt64 | Kind::SFixed64 => Value::I64(text.parse().map_err(|_| bad())?),
            Kind::UInt32 | Kind::Fixed32 => Value::U32(text.parse().map_err(|_| bad())?),
            Kind::UInt64 | Kind::Fixed64 => Value::U64(text.parse().map_err(|_| bad())?),
            Kind::Float => Value::F32(parse_float(text).ok_or_else(bad)? as f32),
            Kind::Double => Value::F64(parse_float(text).ok_or_else(bad)?),
            Kind::String => Value::String(text.to_string()),
            Kind::Bytes => Value::Bytes(unescape_bytes(text).ok_or_else(bad)?),
            Kind::Enum => {
                let number = field
                    .type_name
                    .as_deref()
                    .and_then(|name| self.enums.get(name))
                    .and_then(|e| e.value_number(text))
                    .ok_or_else(bad)?;
                Value::Enum(number)
            }
            Kind::Message => return Err(bad()),
        };
        tracing::trace!(file = self.file.name(), field = %field.name, "parsed field default");
        Ok(value)
    }
}

fn find_nested<'a>(
    scope: &str,
    message: &'a DescriptorProto,
    type_name: &str,
) -> Option<&'a DescriptorProto> {
    let local = type_name.strip_prefix(scope)?.strip_prefix('.')?;
    message.nested_type.iter().find(|n| n.name() == local)
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => text.parse().ok(),
    }
}

/// Reverse the C-style escaping compilers apply to `bytes` defaults.
fn unescape_bytes(text: &str) -> Option<Vec<u8>> {
    let raw = text.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] != b'\\' {
            out.push(raw[i]);
            i += 1;
            continue;
        }
        let next = *raw.get(i + 1)?;
        i += 2;
        match next {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'\\' | b'\'' | b'"' => out.push(next),
            b'0'..=b'7' => {
                let mut value = u32::from(next - b'0');
                let mut digits = 1;
                while digits < 3 {
                    match raw.get(i) {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            i += 1;
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                out.push(u8::try_from(value).ok()?);
            }
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{
        EnumValueDescriptorProto, FieldOptions, MessageOptions, OneofDescriptorProto,
    };

    fn field(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(label as i32),
            r#type: Some(ty as i32),
            ..Default::default()
        }
    }

    fn typed(mut f: FieldDescriptorProto, type_name: &str) -> FieldDescriptorProto {
        f.type_name = Some(type_name.to_string());
        f
    }

    fn sample_set(syntax: &str) -> FileDescriptorSet {
        let entry = DescriptorProto {
            name: Some("LabelsEntry".to_string()),
            field: vec![
                field("key", 1, Label::Optional, Type::String),
                field("value", 2, Label::Optional, Type::Int64),
            ],
            options: Some(MessageOptions {
                map_entry: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut note = field("note", 6, Label::Optional, Type::String);
        note.proto3_optional = Some(true);
        note.oneof_index = Some(1);
        let mut by_id = field("by_id", 7, Label::Optional, Type::Int32);
        by_id.oneof_index = Some(0);
        let mut unpacked = field("raw", 8, Label::Repeated, Type::Sint32);
        unpacked.options = Some(FieldOptions {
            packed: Some(false),
            ..Default::default()
        });

        let reading = DescriptorProto {
            name: Some("Reading".to_string()),
            field: vec![
                field("value", 1, Label::Optional, Type::Double),
                field("samples", 2, Label::Repeated, Type::Uint32),
                typed(field("labels", 3, Label::Repeated, Type::Message), ".telemetry.Reading.LabelsEntry"),
                typed(field("level", 4, Label::Optional, Type::Enum), ".telemetry.Level"),
                typed(field("next", 5, Label::Optional, Type::Message), ".telemetry.Reading"),
                note,
                by_id,
                unpacked,
            ],
            nested_type: vec![entry],
            oneof_decl: vec![
                OneofDescriptorProto {
                    name: Some("lookup".to_string()),
                    ..Default::default()
                },
                OneofDescriptorProto {
                    name: Some("_note".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let level = EnumDescriptorProto {
            name: Some("Level".to_string()),
            value: vec![
                EnumValueDescriptorProto {
                    name: Some("LOW".to_string()),
                    number: Some(0),
                    ..Default::default()
                },
                EnumValueDescriptorProto {
                    name: Some("HIGH".to_string()),
                    number: Some(1),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some("telemetry.proto".to_string()),
                package: Some("telemetry".to_string()),
                message_type: vec![reading],
                enum_type: vec![level],
                syntax: Some(syntax.to_string()),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_import_proto3() {
        let bytes = sample_set("proto3").encode_to_vec();
        let pool = DescriptorPool::decode_file_descriptor_set(&bytes).unwrap();
        let reading = pool.message("telemetry.Reading").unwrap();

        assert!(!reading.field(1).unwrap().has_presence());
        assert!(reading.field(2).unwrap().packed);
        assert_eq!(reading.field(3).unwrap().cardinality, Cardinality::Map);
        assert!(reading.message_type(reading.field(3).unwrap()).unwrap().is_map_entry());
        assert_eq!(
            reading.enum_type(reading.field(4).unwrap()).unwrap().value_name(1),
            Some("HIGH")
        );
        assert_eq!(reading.message_type(reading.field(5).unwrap()).unwrap(), reading);

        let note = reading.field(6).unwrap();
        assert!(note.has_presence());
        assert_eq!(note.oneof_index, None);
        assert_eq!(reading.field(7).unwrap().oneof_index, Some(0));
        assert!(!reading.field(8).unwrap().packed);
    }

    #[test]
    fn test_import_proto2_presence_and_packing() {
        let pool = DescriptorPool::from_file_descriptor_set(&sample_set("proto2")).unwrap();
        let reading = pool.message("telemetry.Reading").unwrap();
        assert!(reading.field(1).unwrap().has_presence());
        assert!(!reading.field(2).unwrap().packed);
    }

    #[test]
    fn test_import_enum_default() {
        let mut set = sample_set("proto2");
        set.file[0].message_type[0].field[3].default_value = Some("HIGH".to_string());
        let pool = DescriptorPool::from_file_descriptor_set(&set).unwrap();
        let reading = pool.message("telemetry.Reading").unwrap();
        assert_eq!(reading.field(4).unwrap().default_scalar(), Some(Value::Enum(1)));
    }

    #[test]
    fn test_group_rejected() {
        let mut set = sample_set("proto2");
        set.file[0].message_type[0]
            .field
            .push(field("legacy", 9, Label::Optional, Type::Group));
        assert!(matches!(
            DescriptorPool::from_file_descriptor_set(&set),
            Err(CodecError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(DescriptorPool::decode_file_descriptor_set(&[0x0A, 0xFF]).is_err());
    }

    #[test]
    fn test_unescape_bytes() {
        assert_eq!(unescape_bytes(r"a\001\n\\").unwrap(), vec![b'a', 1, b'\n', b'\\']);
        assert!(unescape_bytes(r"\q").is_none());
    }
}
