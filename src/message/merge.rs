// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Merge of one message into another of the same type.

use super::DynamicMessage;
use crate::core::{CodecError, FieldValue, Result, Value};

impl DynamicMessage {
    /// Merge `other` into `self`.
    ///
    /// - singular message fields merge recursively
    /// - other singular fields present in `other` overwrite
    /// - repeated fields are concatenated
    /// - map entries overwrite by key
    /// - unknown fields are appended
    ///
    /// A oneof member set in `other` replaces whichever member `self` had.
    ///
    /// This differs from decoding the concatenation of both encodings in
    /// one place: the decoder keeps the last occurrence of a singular
    /// message field whole, while `merge_from` merges the two nested
    /// messages field by field.
    pub fn merge_from(&mut self, other: &DynamicMessage) -> Result<()> {
        if self.descriptor() != other.descriptor() {
            return Err(CodecError::type_mismatch(
                "<message>",
                self.descriptor().name(),
                other.descriptor().name(),
            ));
        }

        for (field, source) in other.fields() {
            let number = field.number;
            if let Some(oneof) = field.oneof_index {
                self.select_oneof(oneof, number);
            }
            match (self.slot_mut(number), source) {
                (
                    Some(FieldValue::Singular(Value::Message(target))),
                    FieldValue::Singular(Value::Message(source)),
                ) => target.merge_from(source)?,
                (Some(FieldValue::Repeated(target)), FieldValue::Repeated(source)) => {
                    target.extend(source.iter().cloned());
                }
                (Some(FieldValue::Map(target)), FieldValue::Map(source)) => {
                    for (key, value) in source {
                        target.upsert(key.clone(), value.clone());
                    }
                }
                _ => self.put_slot(number, source.clone()),
            }
        }

        for unknown in other.unknown_fields() {
            self.push_unknown(unknown.clone());
        }
        Ok(())
    }
}
