// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for protocodec.
//!
//! Provides error types for every stage of the codec:
//! - Wire primitives (varints, tags, length-delimited frames)
//! - Schema construction and validation
//! - Value model mutation
//! - Encoding into caller-provided buffers

use thiserror::Error;

/// Errors that can occur while encoding, decoding or building schemas.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Varint ran past 10 bytes or the input ended mid-varint
    #[error("Malformed varint at position {position}")]
    MalformedVarint {
        /// Offset of the first byte of the varint
        position: usize,
    },

    /// A declared length (or fixed-width value) exceeds the remaining bytes
    #[error("Truncated message: needed {needed} bytes at position {position}, but only {available} bytes available")]
    TruncatedMessage {
        /// Bytes required
        needed: usize,
        /// Bytes remaining
        available: usize,
        /// Cursor position when the error occurred
        position: usize,
    },

    /// Low three bits of a tag are not VARINT, FIXED64, LENGTH_DELIMITED or FIXED32
    #[error("Invalid wire type {wire_type} at position {position}")]
    InvalidWireType {
        /// Raw wire type bits
        wire_type: u8,
        /// Offset of the tag
        position: usize,
    },

    /// Field number is zero or above 2^29-1
    #[error("Field number {field_number} out of range at position {position}")]
    FieldNumberOutOfRange {
        /// Offending field number
        field_number: u64,
        /// Offset of the tag
        position: usize,
    },

    /// Tag's wire type disagrees with the schema (only raised in strict mode)
    #[error("Wire type mismatch for field {field_number}: expected {expected}, found {actual}")]
    WireTypeMismatch {
        /// Field number
        field_number: u32,
        /// Wire type declared by the schema
        expected: &'static str,
        /// Wire type found on the wire
        actual: &'static str,
    },

    /// Destination buffer cannot hold the encoded message
    #[error("Buffer too small: message needs {required} bytes, buffer holds {capacity}")]
    BufferTooSmall {
        /// Exact encoded size
        required: usize,
        /// Destination capacity
        capacity: usize,
    },

    /// Input or output exceeds the configured size limit
    #[error("Message of {size} bytes exceeds limit of {limit} bytes")]
    MessageTooLarge {
        /// Message size
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Nesting deeper than the configured recursion limit
    #[error("Recursion limit of {limit} exceeded")]
    RecursionLimitExceeded {
        /// Configured limit
        limit: u32,
    },

    /// STRING payload is not valid UTF-8
    #[error("Invalid UTF-8 in string field {field_number} at position {position}")]
    InvalidUtf8 {
        /// Field number
        field_number: u32,
        /// Offset of the payload
        position: usize,
    },

    /// Invalid schema definition
    #[error("Invalid schema '{schema_name}': {reason}")]
    InvalidSchema {
        /// Message or enum name
        schema_name: String,
        /// Validation error message
        reason: String,
    },

    /// Type not found in the descriptor pool
    #[error("Type not found: '{type_name}'")]
    TypeNotFound {
        /// Type name that was not found
        type_name: String,
    },

    /// Field not declared by the message descriptor
    #[error("Field {field} not found in '{message}'")]
    FieldNotFound {
        /// Message type name
        message: String,
        /// Field number or name
        field: String,
    },

    /// Value does not match the field's declared kind or cardinality
    #[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Expected kind
        expected: String,
        /// Actual value kind
        actual: String,
    },

    /// Handle used with an arena that did not allocate it
    #[error("Arena mismatch: handle from arena {handle_arena} used with arena {arena}")]
    ArenaMismatch {
        /// Arena that issued the handle
        handle_arena: u64,
        /// Arena the handle was presented to
        arena: u64,
    },

    /// Internal invariant violation
    #[error("Invariant violation: {invariant}")]
    InvariantViolation {
        /// Description of the invariant that was violated
        invariant: String,
    },

    /// I/O failure in framing or file helpers
    #[error("IO error: {0}")]
    Io(String),

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

impl CodecError {
    /// Create a malformed varint error.
    pub fn malformed_varint(position: usize) -> Self {
        CodecError::MalformedVarint { position }
    }

    /// Create a truncated message error.
    pub fn truncated(needed: usize, available: usize, position: usize) -> Self {
        CodecError::TruncatedMessage {
            needed,
            available,
            position,
        }
    }

    /// Create an invalid wire type error.
    pub fn invalid_wire_type(wire_type: u8, position: usize) -> Self {
        CodecError::InvalidWireType {
            wire_type,
            position,
        }
    }

    /// Create a field number out of range error.
    pub fn field_number_out_of_range(field_number: u64, position: usize) -> Self {
        CodecError::FieldNumberOutOfRange {
            field_number,
            position,
        }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(required: usize, capacity: usize) -> Self {
        CodecError::BufferTooSmall { required, capacity }
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidSchema {
            schema_name: schema_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        CodecError::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create a "field not found" error.
    pub fn field_not_found(message: impl Into<String>, field: impl ToString) -> Self {
        CodecError::FieldNotFound {
            message: message.into(),
            field: field.to_string(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        CodecError::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invariant violation error.
    pub fn invariant_violation(invariant: impl Into<String>) -> Self {
        CodecError::InvariantViolation {
            invariant: invariant.into(),
        }
    }

    /// True for errors caused by malformed input bytes (as opposed to schema or API misuse).
    pub fn is_wire_error(&self) -> bool {
        matches!(
            self,
            CodecError::MalformedVarint { .. }
                | CodecError::TruncatedMessage { .. }
                | CodecError::InvalidWireType { .. }
                | CodecError::FieldNumberOutOfRange { .. }
                | CodecError::WireTypeMismatch { .. }
                | CodecError::InvalidUtf8 { .. }
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::MalformedVarint { position } => vec![("position", position.to_string())],
            CodecError::TruncatedMessage {
                needed,
                available,
                position,
            } => vec![
                ("needed", needed.to_string()),
                ("available", available.to_string()),
                ("position", position.to_string()),
            ],
            CodecError::InvalidWireType {
                wire_type,
                position,
            } => vec![
                ("wire_type", wire_type.to_string()),
                ("position", position.to_string()),
            ],
            CodecError::FieldNumberOutOfRange {
                field_number,
                position,
            } => vec![
                ("field_number", field_number.to_string()),
                ("position", position.to_string()),
            ],
            CodecError::WireTypeMismatch {
                field_number,
                expected,
                actual,
            } => vec![
                ("field_number", field_number.to_string()),
                ("expected", expected.to_string()),
                ("actual", actual.to_string()),
            ],
            CodecError::BufferTooSmall { required, capacity } => vec![
                ("required", required.to_string()),
                ("capacity", capacity.to_string()),
            ],
            CodecError::MessageTooLarge { size, limit } => {
                vec![("size", size.to_string()), ("limit", limit.to_string())]
            }
            CodecError::RecursionLimitExceeded { limit } => vec![("limit", limit.to_string())],
            CodecError::InvalidUtf8 {
                field_number,
                position,
            } => vec![
                ("field_number", field_number.to_string()),
                ("position", position.to_string()),
            ],
            CodecError::InvalidSchema {
                schema_name,
                reason,
            } => vec![("schema", schema_name.clone()), ("reason", reason.clone())],
            CodecError::TypeNotFound { type_name } => vec![("type", type_name.clone())],
            CodecError::FieldNotFound { message, field } => {
                vec![("message", message.clone()), ("field", field.clone())]
            }
            CodecError::TypeMismatch {
                field,
                expected,
                actual,
            } => vec![
                ("field", field.clone()),
                ("expected", expected.clone()),
                ("actual", actual.clone()),
            ],
            CodecError::ArenaMismatch {
                handle_arena,
                arena,
            } => vec![
                ("handle_arena", handle_arena.to_string()),
                ("arena", arena.to_string()),
            ],
            CodecError::InvariantViolation { invariant } => {
                vec![("invariant", invariant.clone())]
            }
            CodecError::Io(msg) | CodecError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}

/// Result type for protocodec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
