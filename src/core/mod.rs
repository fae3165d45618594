// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout protocodec.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Error taxonomy for wire, schema and value-model failures
//! - [`Value`] - Tagged union over field value kinds
//! - [`FieldValue`] - Singular, repeated or map contents of one field
//! - [`MapEntries`] - Insertion-ordered map contents with a key index
//! - [`Presence`] - Explicit set/unset state of a field

pub mod error;
pub mod value;

pub use error::{CodecError, Result};
pub use value::{FieldValue, MapEntries, Presence, Value};
