// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Validated, immutable descriptor pool.
//!
//! The pool owns every message and enum definition. [`MessageDescriptor`]
//! is a cheap handle (shared pool plus index) so nested and even recursive
//! message types refer to each other by index rather than by ownership.
//! Field tables are sorted by field number at build time, which turns tag
//! dispatch into a binary search.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::descriptor::{EnumDescriptor, FieldDescriptor, MessageDefinition};
use super::{Cardinality, Kind};
use crate::core::{CodecError, Result};
use crate::wire::{is_assignable_field_number, MAX_FIELD_NUMBER};

/// Shared, read-only collection of message and enum definitions.
#[derive(Clone)]
pub struct DescriptorPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    messages: Vec<MessageDefinition>,
    enums: Vec<EnumDescriptor>,
    message_index: HashMap<String, usize>,
    enum_index: HashMap<String, usize>,
}

impl DescriptorPool {
    /// Start building a pool.
    pub fn builder() -> DescriptorPoolBuilder {
        DescriptorPoolBuilder::default()
    }

    /// Look up a message type by fully qualified name.
    pub fn message(&self, name: &str) -> Result<MessageDescriptor> {
        self.get_message(name)
            .ok_or_else(|| CodecError::type_not_found(name))
    }

    /// Look up a message type, returning `None` if absent.
    pub fn get_message(&self, name: &str) -> Option<MessageDescriptor> {
        let name = name.strip_prefix('.').unwrap_or(name);
        self.inner
            .message_index
            .get(name)
            .map(|&index| MessageDescriptor {
                pool: self.clone(),
                index,
            })
    }

    /// Look up an enum type by fully qualified name.
    pub fn enumeration(&self, name: &str) -> Option<&EnumDescriptor> {
        let name = name.strip_prefix('.').unwrap_or(name);
        self.inner
            .enum_index
            .get(name)
            .map(|&index| &self.inner.enums[index])
    }

    /// Names of all message types, in registration order.
    pub fn message_names(&self) -> impl Iterator<Item = &str> {
        self.inner.messages.iter().map(|m| m.name.as_str())
    }

    /// Number of message types.
    pub fn message_count(&self) -> usize {
        self.inner.messages.len()
    }
}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorPool")
            .field("messages", &self.inner.messages.len())
            .field("enums", &self.inner.enums.len())
            .finish()
    }
}

/// Collects definitions and validates them into a [`DescriptorPool`].
#[derive(Debug, Default, Clone)]
pub struct DescriptorPoolBuilder {
    messages: Vec<MessageDefinition>,
    enums: Vec<EnumDescriptor>,
}

impl DescriptorPoolBuilder {
    /// Add a message definition.
    #[must_use]
    pub fn message(mut self, message: MessageDefinition) -> Self {
        self.messages.push(message);
        self
    }

    /// Add an enum definition.
    #[must_use]
    pub fn enumeration(mut self, enumeration: EnumDescriptor) -> Self {
        self.enums.push(enumeration);
        self
    }

    /// Add a message definition in place.
    pub fn add_message(&mut self, message: MessageDefinition) {
        self.messages.push(message);
    }

    /// Add an enum definition in place.
    pub fn add_enum(&mut self, enumeration: EnumDescriptor) {
        self.enums.push(enumeration);
    }

    /// Validate all definitions and resolve type links.
    pub fn build(self) -> Result<DescriptorPool> {
        let DescriptorPoolBuilder {
            mut messages,
            enums,
        } = self;

        let mut message_index = HashMap::with_capacity(messages.len());
        let mut enum_index = HashMap::with_capacity(enums.len());
        for (index, message) in messages.iter_mut().enumerate() {
            if let Some(stripped) = message.name.strip_prefix('.') {
                message.name = stripped.to_string();
            }
            if message_index.insert(message.name.clone(), index).is_some() {
                return Err(CodecError::invalid_schema(
                    &message.name,
                    "duplicate message type name",
                ));
            }
        }
        for (index, enumeration) in enums.iter().enumerate() {
            let name = enumeration.name.trim_start_matches('.');
            if message_index.contains_key(name) || enum_index.insert(name.to_string(), index).is_some() {
                return Err(CodecError::invalid_schema(name, "duplicate type name"));
            }
            if enumeration.values.is_empty() {
                return Err(CodecError::invalid_schema(name, "enum declares no values"));
            }
        }

        let map_entries: Vec<bool> = messages.iter().map(|m| m.map_entry).collect();
        for message in &mut messages {
            message.fields.sort_by_key(|f| f.number);
            validate_message(message, &message_index, &enum_index, &map_entries)?;
        }

        tracing::debug!(
            messages = messages.len(),
            enums = enums.len(),
            "built descriptor pool"
        );

        Ok(DescriptorPool {
            inner: Arc::new(PoolInner {
                messages,
                enums,
                message_index,
                enum_index,
            }),
        })
    }
}

fn validate_message(
    message: &mut MessageDefinition,
    message_index: &HashMap<String, usize>,
    enum_index: &HashMap<String, usize>,
    map_entries: &[bool],
) -> Result<()> {
    let invalid = |reason: String| CodecError::invalid_schema(&message.name, reason);

    let mut names = HashSet::new();
    let mut previous: Option<u32> = None;
    for field in &message.fields {
        if field.number == 0 || field.number > MAX_FIELD_NUMBER {
            return Err(invalid(format!(
                "field '{}' number {} out of range 1..={MAX_FIELD_NUMBER}",
                field.name, field.number
            )));
        }
        if !is_assignable_field_number(field.number) {
            return Err(invalid(format!(
                "field '{}' uses reserved number {}",
                field.name, field.number
            )));
        }
        if previous == Some(field.number) {
            return Err(invalid(format!("duplicate field number {}", field.number)));
        }
        previous = Some(field.number);
        if !names.insert(field.name.clone()) {
            return Err(invalid(format!("duplicate field name '{}'", field.name)));
        }
    }

    if message.map_entry {
        let shape_ok = message.fields.len() == 2
            && message.fields[0].number == 1
            && message.fields[1].number == 2
            && message.fields.iter().all(|f| f.cardinality == Cardinality::Singular);
        if !shape_ok {
            return Err(invalid(
                "map entry must declare singular key = 1 and value = 2".to_string(),
            ));
        }
        if !message.fields[0].kind.is_valid_map_key() {
            return Err(invalid(format!(
                "map key kind {} is not allowed",
                message.fields[0].kind
            )));
        }
    }

    let oneof_count = message.oneofs.len();
    let message_name = message.name.clone();
    for field in &mut message.fields {
        let invalid = |reason: String| CodecError::invalid_schema(&message_name, reason);

        field.target = match (field.kind, field.cardinality) {
            (Kind::Enum, Cardinality::Singular | Cardinality::Repeated) => {
                let Some(type_name) = field.type_name.as_deref() else {
                    return Err(invalid(format!("enum field '{}' has no type", field.name)));
                };
                let type_name = type_name.trim_start_matches('.');
                Some(*enum_index.get(type_name).ok_or_else(|| {
                    invalid(format!("field '{}' references unknown enum '{type_name}'", field.name))
                })?)
            }
            (Kind::Message, _) => {
                let Some(type_name) = field.type_name.as_deref() else {
                    return Err(invalid(format!("message field '{}' has no type", field.name)));
                };
                let type_name = type_name.trim_start_matches('.');
                let target = *message_index.get(type_name).ok_or_else(|| {
                    invalid(format!(
                        "field '{}' references unknown message '{type_name}'",
                        field.name
                    ))
                })?;
                let is_map = field.cardinality == Cardinality::Map;
                if is_map != map_entries[target] {
                    return Err(invalid(format!(
                        "field '{}' map cardinality disagrees with entry type '{type_name}'",
                        field.name
                    )));
                }
                Some(target)
            }
            (_, Cardinality::Map) => {
                return Err(invalid(format!("map field '{}' must have MESSAGE kind", field.name)))
            }
            _ => None,
        };

        if field.packed && !(field.cardinality == Cardinality::Repeated && field.kind.is_packable()) {
            return Err(invalid(format!(
                "field '{}' is packed but not a repeated scalar numeric",
                field.name
            )));
        }

        if let Some(oneof) = field.oneof_index {
            if oneof as usize >= oneof_count {
                return Err(invalid(format!(
                    "field '{}' references missing oneof {oneof}",
                    field.name
                )));
            }
            if field.cardinality != Cardinality::Singular {
                return Err(invalid(format!("oneof member '{}' must be singular", field.name)));
            }
            field.explicit_presence = true;
        }

        if let Some(default) = &field.default_value {
            if field.cardinality != Cardinality::Singular
                || field.kind == Kind::Message
                || !default.is_valid_for_kind(field.kind)
            {
                return Err(invalid(format!(
                    "default for field '{}' does not match kind {}",
                    field.name, field.kind
                )));
            }
        }
    }
    Ok(())
}

/// Handle to one message type within a pool.
#[derive(Clone)]
pub struct MessageDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl MessageDescriptor {
    fn definition(&self) -> &MessageDefinition {
        &self.pool.inner.messages[self.index]
    }

    /// Fully qualified name.
    pub fn name(&self) -> &str {
        &self.definition().name
    }

    /// Fields sorted by field number.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.definition().fields
    }

    /// Look up a field by number.
    pub fn field(&self, number: u32) -> Option<&FieldDescriptor> {
        let fields = self.fields();
        fields
            .binary_search_by_key(&number, |f| f.number)
            .ok()
            .map(|i| &fields[i])
    }

    /// Look up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Check if this is a synthetic map entry.
    pub fn is_map_entry(&self) -> bool {
        self.definition().map_entry
    }

    /// Oneof group names.
    pub fn oneofs(&self) -> &[String] {
        &self.definition().oneofs
    }

    /// Message type linked from a MESSAGE or MAP field.
    pub fn message_type(&self, field: &FieldDescriptor) -> Option<MessageDescriptor> {
        match field.kind {
            Kind::Message => field.target.map(|index| MessageDescriptor {
                pool: self.pool.clone(),
                index,
            }),
            _ => None,
        }
    }

    /// Enum type linked from an ENUM field.
    pub fn enum_type(&self, field: &FieldDescriptor) -> Option<&EnumDescriptor> {
        match field.kind {
            Kind::Enum => field.target.map(|index| &self.pool.inner.enums[index]),
            _ => None,
        }
    }

    /// Owning pool.
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool.inner, &other.pool.inner) && self.index == other.index
    }
}

impl Eq for MessageDescriptor {}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor").field(&self.name()).finish()
    }
}
