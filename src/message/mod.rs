// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dynamic message instances.
//!
//! A [`DynamicMessage`] pairs a [`MessageDescriptor`] with the values of
//! its set fields, keyed by field number, and an ordered sideband of
//! [`UnknownField`]s carried over from decoding. Access goes through one
//! generic `get`/`set` pair driven by the descriptor table instead of
//! per-field accessors.
//!
//! Presence is explicit: a field is either absent from the value map
//! ([`Presence::Unset`]) or present ([`Presence::Set`]). Fields with
//! implicit presence (plain proto3 scalars) are removed when set to their
//! zero value, so "present" and "non-default" coincide for them.

pub mod arena;
mod merge;

pub use arena::{MessageArena, MessageHandle};

use std::collections::BTreeMap;

use crate::core::{CodecError, FieldValue, MapEntries, Presence, Result, Value};
use crate::schema::{Cardinality, FieldDescriptor, Kind, MessageDescriptor};
use crate::wire::{Tag, WireType};

/// A field found on the wire that the active descriptor does not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    /// Field number from the tag
    pub number: u32,
    /// Wire type from the tag
    pub wire_type: WireType,
    /// Exact input bytes: tag followed by the payload
    pub data: Vec<u8>,
}

impl UnknownField {
    /// Create an unknown field from its raw tag and payload bytes.
    pub fn new(number: u32, wire_type: WireType, data: Vec<u8>) -> Self {
        Self {
            number,
            wire_type,
            data,
        }
    }

    /// Payload bytes following the tag.
    pub fn payload(&self) -> &[u8] {
        let tag_len = Tag::new(self.number, self.wire_type).encoded_len();
        // Tags are normally minimal; fall back to the full slice otherwise.
        self.data.get(tag_len..).unwrap_or(&self.data[..])
    }
}

/// A message instance driven by a runtime descriptor.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use protocodec::message::DynamicMessage;
/// use protocodec::schema::{DescriptorPool, FieldDescriptor, Kind, MessageDefinition};
/// use protocodec::Value;
///
/// let pool = DescriptorPool::builder()
///     .message(
///         MessageDefinition::new("demo.User")
///             .field(FieldDescriptor::scalar("name", 1, Kind::String))
///             .field(FieldDescriptor::scalar("age", 2, Kind::UInt32)),
///     )
///     .build()?;
/// let mut user = DynamicMessage::new(pool.message("demo.User")?);
/// user.set(1, "ada")?;
/// user.set(2, 0u32)?;
/// assert!(user.has(1));
/// assert!(!user.has(2));
/// assert_eq!(user.get_or_default(2)?, Value::U32(0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    fields: BTreeMap<u32, FieldValue>,
    unknown: Vec<UnknownField>,
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
            && self.fields == other.fields
            && self.unknown == other.unknown
    }
}

impl DynamicMessage {
    /// Create an empty message: every field unset.
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
            unknown: Vec::new(),
        }
    }

    /// Descriptor this message is typed against.
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    fn field_descriptor(&self, number: u32) -> Result<&FieldDescriptor> {
        self.descriptor
            .field(number)
            .ok_or_else(|| CodecError::field_not_found(self.descriptor.name(), number))
    }

    fn number_by_name(&self, name: &str) -> Result<u32> {
        self.descriptor
            .field_by_name(name)
            .map(|f| f.number)
            .ok_or_else(|| CodecError::field_not_found(self.descriptor.name(), name))
    }

    /// Check if a field is present.
    pub fn has(&self, number: u32) -> bool {
        self.fields.contains_key(&number)
    }

    /// Field contents, or `Unset`.
    pub fn get(&self, number: u32) -> Presence<&FieldValue> {
        self.fields.get(&number).into()
    }

    /// Value of a present singular field.
    pub fn get_value(&self, number: u32) -> Option<&Value> {
        self.fields.get(&number).and_then(FieldValue::as_singular)
    }

    /// Value of a singular field, falling back to its declared default.
    ///
    /// An unset MESSAGE field reads as an empty instance of its type.
    pub fn get_or_default(&self, number: u32) -> Result<Value> {
        if let Some(value) = self.get_value(number) {
            return Ok(value.clone());
        }
        let field = self.field_descriptor(number)?;
        if field.cardinality != Cardinality::Singular {
            return Err(CodecError::type_mismatch(
                &field.name,
                "singular field",
                "repeated field",
            ));
        }
        match self.descriptor.message_type(field) {
            Some(nested) => Ok(Value::Message(Box::new(DynamicMessage::new(nested)))),
            None => field
                .default_scalar()
                .ok_or_else(|| CodecError::invariant_violation("scalar kind without default")),
        }
    }

    /// Set a singular field.
    ///
    /// Setting an implicit-presence field to its zero value clears it.
    /// Setting a oneof member clears the other members of its group.
    pub fn set(&mut self, number: u32, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let field = self.field_descriptor(number)?;
        if field.cardinality != Cardinality::Singular {
            return Err(CodecError::type_mismatch(
                &field.name,
                "singular field",
                "repeated or map field",
            ));
        }
        check_value(&self.descriptor, field, field.kind, &value)?;
        let implicit_default = !field.has_presence() && value.is_default();
        let oneof = field.oneof_index;

        if implicit_default {
            self.fields.remove(&number);
        } else {
            self.fields.insert(number, FieldValue::Singular(value));
            if let Some(oneof) = oneof {
                self.clear_oneof_siblings(oneof, number);
            }
        }
        Ok(())
    }

    /// Set a field by name.
    pub fn set_by_name(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let number = self.number_by_name(name)?;
        self.set(number, value)
    }

    /// Read a field by name.
    pub fn get_by_name(&self, name: &str) -> Result<Presence<&FieldValue>> {
        Ok(self.get(self.number_by_name(name)?))
    }

    /// Append to a repeated field.
    pub fn push(&mut self, number: u32, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let field = self.field_descriptor(number)?;
        if field.cardinality != Cardinality::Repeated {
            return Err(CodecError::type_mismatch(&field.name, "repeated field", "other field"));
        }
        check_value(&self.descriptor, field, field.kind, &value)?;
        match self
            .fields
            .entry(number)
            .or_insert_with(|| FieldValue::Repeated(Vec::new()))
        {
            FieldValue::Repeated(values) => values.push(value),
            _ => return Err(CodecError::invariant_violation("repeated slot holds non-list")),
        }
        Ok(())
    }

    /// Replace the contents of a repeated field.
    pub fn set_repeated(&mut self, number: u32, values: Vec<Value>) -> Result<()> {
        let field = self.field_descriptor(number)?;
        if field.cardinality != Cardinality::Repeated {
            return Err(CodecError::type_mismatch(&field.name, "repeated field", "other field"));
        }
        for value in &values {
            check_value(&self.descriptor, field, field.kind, value)?;
        }
        if values.is_empty() {
            self.fields.remove(&number);
        } else {
            self.fields.insert(number, FieldValue::Repeated(values));
        }
        Ok(())
    }

    /// Elements of a repeated field; empty when unset.
    pub fn repeated(&self, number: u32) -> &[Value] {
        self.fields
            .get(&number)
            .and_then(FieldValue::as_repeated)
            .unwrap_or(&[])
    }

    /// Insert a map entry, overwriting any entry with an equal key.
    pub fn insert(&mut self, number: u32, key: impl Into<Value>, value: impl Into<Value>) -> Result<()> {
        let (key, value) = (key.into(), value.into());
        let field = self.field_descriptor(number)?;
        let entry = match (field.cardinality, self.descriptor.message_type(field)) {
            (Cardinality::Map, Some(entry)) => entry,
            _ => return Err(CodecError::type_mismatch(&field.name, "map field", "other field")),
        };
        let (key_field, value_field) = match entry.fields() {
            [k, v] => (k, v),
            _ => return Err(CodecError::invariant_violation("map entry without key and value")),
        };
        check_value(&entry, key_field, key_field.kind, &key)?;
        check_value(&entry, value_field, value_field.kind, &value)?;
        match self
            .fields
            .entry(number)
            .or_insert_with(|| FieldValue::Map(MapEntries::new()))
        {
            FieldValue::Map(entries) => entries.upsert(key, value),
            _ => return Err(CodecError::invariant_violation("map slot holds non-map")),
        }
        Ok(())
    }

    /// Value stored under `key` in a map field.
    pub fn map_get(&self, number: u32, key: &Value) -> Option<&Value> {
        match self.fields.get(&number) {
            Some(FieldValue::Map(entries)) => entries.get(key),
            _ => None,
        }
    }

    /// Entries of a map field in insertion order; empty when unset.
    pub fn map_entries(&self, number: u32) -> &[(Value, Value)] {
        self.fields
            .get(&number)
            .and_then(FieldValue::as_map)
            .unwrap_or(&[])
    }

    /// Nested message of a singular MESSAGE field, created empty if unset.
    pub fn message_mut(&mut self, number: u32) -> Result<&mut DynamicMessage> {
        let field = self.field_descriptor(number)?;
        let nested = match (field.cardinality, self.descriptor.message_type(field)) {
            (Cardinality::Singular, Some(nested)) => nested,
            _ => {
                return Err(CodecError::type_mismatch(
                    &field.name,
                    "singular message field",
                    field.kind.as_str(),
                ))
            }
        };
        if let Some(oneof) = field.oneof_index {
            self.clear_oneof_siblings(oneof, number);
        }
        let slot = self
            .fields
            .entry(number)
            .or_insert_with(|| FieldValue::Singular(Value::Message(Box::new(DynamicMessage::new(nested)))));
        match slot {
            FieldValue::Singular(Value::Message(message)) => Ok(message),
            _ => Err(CodecError::invariant_violation("message slot holds non-message")),
        }
    }

    /// Unset one field.
    pub fn clear_field(&mut self, number: u32) {
        self.fields.remove(&number);
    }

    /// Unset every field and drop unknown fields.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.unknown.clear();
    }

    /// Present fields in ascending field-number order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &FieldValue)> {
        self.fields
            .iter()
            .filter_map(|(number, value)| self.descriptor.field(*number).map(|f| (f, value)))
    }

    /// The member of oneof `index` that is currently set.
    pub fn which_oneof(&self, index: u32) -> Option<&FieldDescriptor> {
        self.fields()
            .map(|(field, _)| field)
            .find(|field| field.oneof_index == Some(index))
    }

    /// Unknown fields in arrival order.
    pub fn unknown_fields(&self) -> &[UnknownField] {
        &self.unknown
    }

    /// Drop all unknown fields.
    pub fn clear_unknown_fields(&mut self) {
        self.unknown.clear();
    }

    fn clear_oneof_siblings(&mut self, oneof: u32, keep: u32) {
        let siblings: Vec<u32> = self
            .descriptor
            .fields()
            .iter()
            .filter(|f| f.oneof_index == Some(oneof) && f.number != keep)
            .map(|f| f.number)
            .collect();
        for number in siblings {
            self.fields.remove(&number);
        }
    }

    pub(crate) fn slot_mut(&mut self, number: u32) -> Option<&mut FieldValue> {
        self.fields.get_mut(&number)
    }

    pub(crate) fn put_slot(&mut self, number: u32, value: FieldValue) {
        self.fields.insert(number, value);
    }

    pub(crate) fn remove_slot(&mut self, number: u32) {
        self.fields.remove(&number);
    }

    pub(crate) fn select_oneof(&mut self, oneof: u32, number: u32) {
        self.clear_oneof_siblings(oneof, number);
    }

    pub(crate) fn push_unknown(&mut self, field: UnknownField) {
        self.unknown.push(field);
    }
}

/// Check that `value` fits a field of `kind`, including the nested type for messages.
fn check_value(
    owner: &MessageDescriptor,
    field: &FieldDescriptor,
    kind: Kind,
    value: &Value,
) -> Result<()> {
    if !value.is_valid_for_kind(kind) {
        return Err(CodecError::type_mismatch(
            &field.name,
            kind.as_str(),
            value.type_name(),
        ));
    }
    if let Value::Message(message) = value {
        let expected = owner.message_type(field);
        if expected.as_ref() != Some(message.descriptor()) {
            return Err(CodecError::type_mismatch(
                &field.name,
                field.type_name.as_deref().unwrap_or("message"),
                message.descriptor().name(),
            ));
        }
    }
    Ok(())
}
