// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field, message and enum definitions.
//!
//! These are plain data records. They become usable for encoding and
//! decoding once collected into a [`DescriptorPool`](super::DescriptorPool),
//! which validates them and resolves type links by name.

use super::{Cardinality, Kind};
use crate::core::Value;
use crate::wire::WireType;

/// Description of one declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Field number, unique within the message
    pub number: u32,
    /// Declared value kind (MESSAGE for map fields)
    pub kind: Kind,
    /// Singular, repeated or map
    pub cardinality: Cardinality,
    /// Fully qualified message, enum or map-entry type for MESSAGE/ENUM/MAP fields
    pub type_name: Option<String>,
    /// Presence is tracked explicitly (proto3 `optional`, proto2, oneof members)
    pub explicit_presence: bool,
    /// Repeated scalars are emitted as one packed frame
    pub packed: bool,
    /// Index into the owning message's oneof list
    pub oneof_index: Option<u32>,
    /// Declared default, used when the field is unset
    pub default_value: Option<Value>,
    /// Index of the linked message or enum in the pool, set by `build()`
    pub(crate) target: Option<usize>,
}

impl FieldDescriptor {
    fn new(name: impl Into<String>, number: u32, kind: Kind, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            number,
            kind,
            cardinality,
            type_name: None,
            explicit_presence: kind == Kind::Message,
            packed: false,
            oneof_index: None,
            default_value: None,
            target: None,
        }
    }

    /// Singular scalar field with implicit presence.
    pub fn scalar(name: impl Into<String>, number: u32, kind: Kind) -> Self {
        Self::new(name, number, kind, Cardinality::Singular)
    }

    /// Singular embedded message field.
    pub fn message(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        let mut field = Self::new(name, number, Kind::Message, Cardinality::Singular);
        field.type_name = Some(type_name.into());
        field
    }

    /// Singular enum field.
    pub fn enumeration(
        name: impl Into<String>,
        number: u32,
        enum_name: impl Into<String>,
    ) -> Self {
        let mut field = Self::new(name, number, Kind::Enum, Cardinality::Singular);
        field.type_name = Some(enum_name.into());
        field
    }

    /// Map field backed by the named map-entry message.
    pub fn map(name: impl Into<String>, number: u32, entry_type: impl Into<String>) -> Self {
        let mut field = Self::new(name, number, Kind::Message, Cardinality::Map);
        field.type_name = Some(entry_type.into());
        field
    }

    /// Make the field repeated. Scalar numerics become packed.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self.packed = self.kind.is_packable();
        self.explicit_presence = false;
        self
    }

    /// Use the legacy one-tag-per-element encoding for a repeated scalar.
    #[must_use]
    pub fn unpacked(mut self) -> Self {
        self.packed = false;
        self
    }

    /// Track presence explicitly.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.explicit_presence = true;
        self
    }

    /// Place the field in the owning message's oneof `index`.
    #[must_use]
    pub fn in_oneof(mut self, index: u32) -> Self {
        self.oneof_index = Some(index);
        self.explicit_presence = true;
        self
    }

    /// Declare a default returned for unset reads.
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Wire type of a single element.
    pub fn wire_type(&self) -> WireType {
        self.kind.wire_type()
    }

    /// Check if the field is repeated or a map.
    pub fn is_list(&self) -> bool {
        self.cardinality != Cardinality::Singular
    }

    /// Check if the field tracks presence explicitly.
    pub fn has_presence(&self) -> bool {
        self.cardinality == Cardinality::Singular && (self.explicit_presence || self.kind == Kind::Message)
    }

    /// Default for unset scalar reads: the declared default, else the kind's zero value.
    pub fn default_scalar(&self) -> Option<Value> {
        self.default_value
            .clone()
            .or_else(|| Value::default_for_kind(self.kind))
    }
}

/// Definition of a message type: an ordered field table plus oneof names.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDefinition {
    /// Fully qualified name (e.g., "example.v1.Person")
    pub name: String,
    /// Declared fields
    pub fields: Vec<FieldDescriptor>,
    /// Oneof group names, indexed by `FieldDescriptor::oneof_index`
    pub oneofs: Vec<String>,
    /// Synthetic `{key, value}` message backing a map field
    pub map_entry: bool,
}

impl MessageDefinition {
    /// Create an empty message definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            oneofs: Vec::new(),
            map_entry: false,
        }
    }

    /// Create a map-entry definition with `key = 1` and `value = 2`.
    ///
    /// `value_type` names the message or enum for MESSAGE/ENUM values.
    pub fn map_entry(
        name: impl Into<String>,
        key: Kind,
        value: Kind,
        value_type: Option<&str>,
    ) -> Self {
        let mut value_field = FieldDescriptor::scalar("value", 2, value);
        value_field.type_name = value_type.map(str::to_string);
        Self {
            name: name.into(),
            fields: vec![FieldDescriptor::scalar("key", 1, key), value_field],
            oneofs: Vec::new(),
            map_entry: true,
        }
    }

    /// Add a field.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a oneof group; members refer to it by position.
    #[must_use]
    pub fn oneof(mut self, name: impl Into<String>) -> Self {
        self.oneofs.push(name.into());
        self
    }
}

/// Definition of an enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Fully qualified name
    pub name: String,
    /// `(name, number)` pairs in declaration order
    pub values: Vec<(String, i32)>,
}

impl EnumDescriptor {
    /// Create an enum definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Add a value.
    #[must_use]
    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push((name.into(), number));
        self
    }

    /// Name of the first value with this number.
    pub fn value_name(&self, number: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, n)| *n == number)
            .map(|(name, _)| name.as_str())
    }

    /// Number of the named value.
    pub fn value_number(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, number)| *number)
    }
}
