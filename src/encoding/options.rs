// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec configuration.
//!
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! recursion_limit = 64
//! max_message_size = 1048576
//! strict_wire_types = true
//! ```
//!
//! Keys that are omitted keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{CodecError, Result};

/// Default nesting depth bound.
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

/// Default size bound for decoded input and encoded output (64 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Options shared by the encoder and the decoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecOptions {
    /// Maximum message nesting depth for encode and decode
    pub recursion_limit: u32,

    /// Maximum accepted input size and emitted output size in bytes
    pub max_message_size: usize,

    /// Emit repeated scalar numerics as one packed frame when the field allows it
    pub pack_repeated: bool,

    /// Keep unrecognized fields for re-encoding; when off they are skipped
    pub preserve_unknown_fields: bool,

    /// Fail on a wire-type mismatch for a known field instead of keeping it as unknown
    pub strict_wire_types: bool,

    /// Reject STRING payloads that are not UTF-8; when off they decode lossily
    pub validate_utf8: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            pack_repeated: true,
            preserve_unknown_fields: true,
            strict_wire_types: false,
            validate_utf8: true,
        }
    }
}

impl CodecOptions {
    /// Parse options from a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CodecError::Other(format!("Invalid codec options: {e}")))
    }

    /// Load options from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let options = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?options, "loaded codec options");
        Ok(options)
    }

    /// Set the nesting depth bound.
    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Set the message size bound.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Turn strict wire-type checking on or off.
    pub fn with_strict_wire_types(mut self, strict: bool) -> Self {
        self.strict_wire_types = strict;
        self
    }

    /// Keep or drop unknown fields while decoding.
    pub fn with_unknown_fields(mut self, preserve: bool) -> Self {
        self.preserve_unknown_fields = preserve;
        self
    }

    /// Pack or expand repeated scalars while encoding.
    pub fn with_packing(mut self, pack: bool) -> Self {
        self.pack_repeated = pack;
        self
    }

    /// Validate STRING payloads while decoding.
    pub fn with_utf8_validation(mut self, validate: bool) -> Self {
        self.validate_utf8 = validate;
        self
    }

    pub(crate) fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_message_size {
            return Err(CodecError::MessageTooLarge {
                size,
                limit: self.max_message_size,
            });
        }
        Ok(())
    }
}
