// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Protocodec
//!
//! Schema-driven codec for the protobuf binary wire format.
//!
//! Message types are described at runtime by descriptor tables. The codec
//! turns a message instance plus its descriptor into bytes and back,
//! deterministically and size-exactly, while keeping fields it does not
//! understand so that older and newer schemas interoperate.
//!
//! ## Architecture
//!
//! - `wire/` - varint and zig-zag codec, tags, bounds-checked reader and writer
//! - `schema/` - field/message/enum descriptors, the validated [`DescriptorPool`]
//!   and import from compiled `FileDescriptorSet`s
//! - `message/` - [`DynamicMessage`] instances, merge, arena ownership
//! - `encoding/` - size pass, encoder, decoder, schema-less decoding, framing
//! - `core/` - error taxonomy and the value model
//!
//! ## Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use protocodec::schema::{DescriptorPool, FieldDescriptor, Kind, MessageDefinition};
//! use protocodec::{decode, encode, DynamicMessage, Value};
//!
//! let pool = DescriptorPool::builder()
//!     .message(
//!         MessageDefinition::new("demo.Reading")
//!             .field(FieldDescriptor::scalar("sensor", 1, Kind::String))
//!             .field(FieldDescriptor::scalar("celsius", 2, Kind::Double))
//!             .field(FieldDescriptor::scalar("samples", 3, Kind::SInt32).repeated()),
//!     )
//!     .build()?;
//! let reading = pool.message("demo.Reading")?;
//!
//! let mut message = DynamicMessage::new(reading.clone());
//! message.set(1, "sensor-7")?;
//! message.set(2, 21.5)?;
//! message.push(3, -1)?;
//!
//! let bytes = encode(&message)?;
//! let decoded = decode(&bytes, &reading)?;
//! assert_eq!(decoded.get_value(2), Some(&Value::F64(21.5)));
//! assert_eq!(decoded, message);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{CodecError, FieldValue, MapEntries, Presence, Result, Value};

// Wire primitives
pub mod wire;

// Descriptors
pub mod schema;

pub use schema::{DescriptorPool, MessageDescriptor};

// Message instances
pub mod message;

pub use message::{DynamicMessage, MessageArena, MessageHandle, UnknownField};

// Encoding/decoding
pub mod encoding;

pub use encoding::{
    computed_size, decode, decode_raw, encode, encode_to_slice, CodecOptions, ProtobufCodec,
};
