// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema descriptors for the codec.
//!
//! Descriptor tables are supplied by an external schema compiler, either
//! built programmatically through [`DescriptorPoolBuilder`] or imported
//! from a binary `FileDescriptorSet` (see [`import`]). Once built, a
//! [`DescriptorPool`] is immutable and can be shared across threads.
//!
//! ## Example
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use protocodec::schema::{DescriptorPool, FieldDescriptor, Kind, MessageDefinition};
//!
//! let pool = DescriptorPool::builder()
//!     .message(
//!         MessageDefinition::new("demo.Point")
//!             .field(FieldDescriptor::scalar("x", 1, Kind::SInt32))
//!             .field(FieldDescriptor::scalar("y", 2, Kind::SInt32)),
//!     )
//!     .build()?;
//! let point = pool.message("demo.Point")?;
//! assert_eq!(point.fields().len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod descriptor;
pub mod import;
pub mod pool;

pub use descriptor::{EnumDescriptor, FieldDescriptor, MessageDefinition};
pub use pool::{DescriptorPool, DescriptorPoolBuilder, MessageDescriptor};

use crate::wire::WireType;

/// Declared value kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    SInt32,
    SInt64,
    Fixed32,
    Fixed64,
    SFixed32,
    SFixed64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Message,
    Enum,
}

impl Kind {
    /// Wire type used for a single value of this kind.
    pub const fn wire_type(self) -> WireType {
        match self {
            Kind::Int32
            | Kind::Int64
            | Kind::UInt32
            | Kind::UInt64
            | Kind::SInt32
            | Kind::SInt64
            | Kind::Bool
            | Kind::Enum => WireType::Varint,
            Kind::Fixed64 | Kind::SFixed64 | Kind::Double => WireType::Fixed64,
            Kind::Fixed32 | Kind::SFixed32 | Kind::Float => WireType::Fixed32,
            Kind::String | Kind::Bytes | Kind::Message => WireType::LengthDelimited,
        }
    }

    /// Scalar numeric kinds, which may use packed encoding when repeated.
    pub const fn is_packable(self) -> bool {
        !matches!(self, Kind::String | Kind::Bytes | Kind::Message)
    }

    /// Kinds allowed as map keys: integral, bool and string.
    pub const fn is_valid_map_key(self) -> bool {
        !matches!(
            self,
            Kind::Float | Kind::Double | Kind::Bytes | Kind::Message | Kind::Enum
        )
    }

    /// Convert to the schema-language spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::UInt32 => "uint32",
            Kind::UInt64 => "uint64",
            Kind::SInt32 => "sint32",
            Kind::SInt64 => "sint64",
            Kind::Fixed32 => "fixed32",
            Kind::Fixed64 => "fixed64",
            Kind::SFixed32 => "sfixed32",
            Kind::SFixed64 => "sfixed64",
            Kind::Float => "float",
            Kind::Double => "double",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Message => "message",
            Kind::Enum => "enum",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Zero or one value
    Singular,
    /// Ordered sequence of values
    Repeated,
    /// Repeated synthetic `{key = 1, value = 2}` entries, unique by key
    Map,
}
