// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf message encoding and decoding.
//!
//! - [`calculator`] - size pass producing a [`SizePlan`]
//! - [`encoder`] - emit pass into a pre-sized buffer
//! - [`decoder`] - descriptor-driven parse loop
//! - [`raw`] - schema-less decoding for diagnostics
//! - [`framing`] - delimiting messages in a stream
//! - [`options`] - [`CodecOptions`]
//!
//! [`ProtobufCodec`] ties these together; the free functions [`encode`],
//! [`decode`], [`computed_size`] and [`encode_to_slice`] use default options.

pub mod calculator;
pub mod decoder;
pub mod encoder;
pub mod framing;
pub mod options;
pub mod raw;

pub use calculator::{SizeCalculator, SizePlan};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use framing::{
    decode_length_delimited, encode_length_delimited, split_length_delimited, FrameReader,
    FrameWriter, FRAME_HEADER_LEN,
};
pub use options::CodecOptions;
pub use raw::{decode_raw, format_raw, RawField, RawValue};

use crate::core::{CodecError, Result};
use crate::message::DynamicMessage;
use crate::schema::MessageDescriptor;

/// Protobuf codec configured by [`CodecOptions`].
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use protocodec::encoding::ProtobufCodec;
/// use protocodec::message::DynamicMessage;
/// use protocodec::schema::{DescriptorPool, FieldDescriptor, Kind, MessageDefinition};
///
/// let pool = DescriptorPool::builder()
///     .message(MessageDefinition::new("demo.Test1").field(FieldDescriptor::scalar("a", 1, Kind::Int32)))
///     .build()?;
/// let descriptor = pool.message("demo.Test1")?;
///
/// let mut message = DynamicMessage::new(descriptor.clone());
/// message.set(1, 150)?;
///
/// let codec = ProtobufCodec::new();
/// let bytes = codec.encode(&message)?;
/// assert_eq!(bytes, vec![0x08, 0x96, 0x01]);
/// assert_eq!(codec.decode(&bytes, &descriptor)?, message);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProtobufCodec {
    options: CodecOptions,
}

impl ProtobufCodec {
    /// Create a codec with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with the given options.
    pub fn with_options(options: CodecOptions) -> Self {
        Self { options }
    }

    /// Active options.
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Run the size pass.
    pub fn plan(&self, message: &DynamicMessage) -> Result<SizePlan> {
        let plan = SizeCalculator::plan(&self.options, message)?;
        self.options.check_size(plan.total())?;
        Ok(plan)
    }

    /// Exact encoded size of `message`.
    pub fn computed_size(&self, message: &DynamicMessage) -> Result<usize> {
        Ok(self.plan(message)?.total())
    }

    /// Encode `message` into a new buffer.
    pub fn encode(&self, message: &DynamicMessage) -> Result<Vec<u8>> {
        let plan = self.plan(message)?;
        let mut buffer = vec![0u8; plan.total()];
        Encoder::new(&self.options, &plan, &mut buffer).encode(message)?;
        Ok(buffer)
    }

    /// Encode `message` into `buffer`, returning the number of bytes written.
    ///
    /// Fails with [`CodecError::BufferTooSmall`] before writing anything if
    /// `buffer` cannot hold the whole message.
    pub fn encode_to_slice(&self, message: &DynamicMessage, buffer: &mut [u8]) -> Result<usize> {
        let plan = self.plan(message)?;
        if buffer.len() < plan.total() {
            return Err(CodecError::buffer_too_small(plan.total(), buffer.len()));
        }
        Encoder::new(&self.options, &plan, &mut buffer[..plan.total()]).encode(message)
    }

    /// Decode `bytes` as a message of type `descriptor`.
    pub fn decode(&self, bytes: &[u8], descriptor: &MessageDescriptor) -> Result<DynamicMessage> {
        Decoder::new(&self.options).decode(bytes, descriptor)
    }

    /// Decode `bytes` on top of `message`, merging into its fields.
    pub fn merge(&self, bytes: &[u8], message: &mut DynamicMessage) -> Result<()> {
        Decoder::new(&self.options).merge(bytes, message)
    }
}

/// Encode with default options.
pub fn encode(message: &DynamicMessage) -> Result<Vec<u8>> {
    ProtobufCodec::default().encode(message)
}

/// Decode with default options.
pub fn decode(bytes: &[u8], descriptor: &MessageDescriptor) -> Result<DynamicMessage> {
    ProtobufCodec::default().decode(bytes, descriptor)
}

/// Exact encoded size with default options.
pub fn computed_size(message: &DynamicMessage) -> Result<usize> {
    ProtobufCodec::default().computed_size(message)
}

/// Encode into a caller-provided buffer with default options.
pub fn encode_to_slice(message: &DynamicMessage, buffer: &mut [u8]) -> Result<usize> {
    ProtobufCodec::default().encode_to_slice(message, buffer)
}
