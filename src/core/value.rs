// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec value type system.
//!
//! [`Value`] is a tagged union over every scalar kind a protobuf field can
//! hold, plus nested messages. Several wire kinds share one variant: INT32,
//! SINT32 and SFIXED32 all hold an `i32`, the field descriptor decides how
//! it is put on the wire.
//!
//! Equality on floating point variants compares bit patterns, so a NaN with
//! a payload equals itself and `-0.0` differs from `0.0`. That is the
//! equality the wire round trip preserves.

use std::collections::HashMap;

use crate::message::DynamicMessage;
use crate::schema::Kind;

/// A single field value.
#[derive(Debug, Clone)]
pub enum Value {
    // Boolean
    Bool(bool),

    // INT32, SINT32, SFIXED32
    I32(i32),
    // INT64, SINT64, SFIXED64
    I64(i64),
    // UINT32, FIXED32
    U32(u32),
    // UINT64, FIXED64
    U64(u64),

    // Floating point
    F32(f32),
    F64(f64),

    // UTF-8 text
    String(String),

    // Opaque bytes
    Bytes(Vec<u8>),

    /// Enum number; enums are open, unrecognized numbers are kept
    Enum(i32),

    // Embedded message
    Message(Box<DynamicMessage>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Message(a), Value::Message(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Zero value for a scalar kind. `None` for MESSAGE, whose default
    /// depends on the nested descriptor.
    pub fn default_for_kind(kind: Kind) -> Option<Value> {
        Some(match kind {
            Kind::Bool => Value::Bool(false),
            Kind::Int32 | Kind::SInt32 | Kind::SFixed32 => Value::I32(0),
            Kind::Int64 | Kind::SInt64 | Kind::SFixed64 => Value::I64(0),
            Kind::UInt32 | Kind::Fixed32 => Value::U32(0),
            Kind::UInt64 | Kind::Fixed64 => Value::U64(0),
            Kind::Float => Value::F32(0.0),
            Kind::Double => Value::F64(0.0),
            Kind::String => Value::String(String::new()),
            Kind::Bytes => Value::Bytes(Vec::new()),
            Kind::Enum => Value::Enum(0),
            Kind::Message => return None,
        })
    }

    /// Check if this value can be stored in a field of `kind`.
    pub fn is_valid_for_kind(&self, kind: Kind) -> bool {
        matches!(
            (self, kind),
            (Value::Bool(_), Kind::Bool)
                | (Value::I32(_), Kind::Int32 | Kind::SInt32 | Kind::SFixed32)
                | (Value::I64(_), Kind::Int64 | Kind::SInt64 | Kind::SFixed64)
                | (Value::U32(_), Kind::UInt32 | Kind::Fixed32)
                | (Value::U64(_), Kind::UInt64 | Kind::Fixed64)
                | (Value::F32(_), Kind::Float)
                | (Value::F64(_), Kind::Double)
                | (Value::String(_), Kind::String)
                | (Value::Bytes(_), Kind::Bytes)
                | (Value::Enum(_), Kind::Enum)
                | (Value::Message(_), Kind::Message)
        )
    }

    /// True when this is the zero value of its type.
    ///
    /// Floats are zero only as `+0.0`; `-0.0` has a set sign bit and is kept
    /// on the wire. Messages are never considered default.
    pub fn is_default(&self) -> bool {
        match self {
            Value::Bool(v) => !v,
            Value::I32(v) | Value::Enum(v) => *v == 0,
            Value::I64(v) => *v == 0,
            Value::U32(v) => *v == 0,
            Value::U64(v) => *v == 0,
            Value::F32(v) => v.to_bits() == 0,
            Value::F64(v) => v.to_bits() == 0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Message(_) => false,
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Message(_) => "message",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum_number(&self) -> Option<i32> {
        match self {
            Value::Enum(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get the nested message.
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get a mutable reference to the nested message.
    pub fn as_message_mut(&mut self) -> Option<&mut DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }
}

macro_rules! impl_from_scalar {
    ($type:ty, $variant:ident) => {
        impl From<$type> for Value {
            fn from(v: $type) -> Self {
                Value::$variant(v)
            }
        }
    };
}
impl_from_scalar!(bool, Bool);
impl_from_scalar!(i32, I32);
impl_from_scalar!(i64, I64);
impl_from_scalar!(u32, U32);
impl_from_scalar!(u64, U64);
impl_from_scalar!(f32, F32);
impl_from_scalar!(f64, F64);
impl_from_scalar!(String, String);
impl_from_scalar!(Vec<u8>, Bytes);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DynamicMessage> for Value {
    fn from(m: DynamicMessage) -> Self {
        Value::Message(Box::new(m))
    }
}

/// Contents of one declared field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Single value
    Singular(Value),
    /// Values in arrival order
    Repeated(Vec<Value>),
    /// Key/value entries in insertion order; keys are unique
    Map(MapEntries),
}

/// Hashable form of a map key. Keys are limited to integral, bool and
/// string kinds, none of which carry floating point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MapKey {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(String),
}

impl MapKey {
    fn of(value: &Value) -> Option<MapKey> {
        Some(match value {
            Value::Bool(v) => MapKey::Bool(*v),
            Value::I32(v) => MapKey::I32(*v),
            Value::I64(v) => MapKey::I64(*v),
            Value::U32(v) => MapKey::U32(*v),
            Value::U64(v) => MapKey::U64(*v),
            Value::String(v) => MapKey::String(v.clone()),
            _ => return None,
        })
    }
}

/// Map field contents: entries in insertion order plus a key index.
///
/// Upsert and lookup are constant time per entry, so decoding a map is
/// linear in the number of entries on the wire.
#[derive(Debug, Clone, Default)]
pub struct MapEntries {
    entries: Vec<(Value, Value)>,
    index: HashMap<MapKey, usize>,
}

impl MapEntries {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, overwriting the value of an equal key in place.
    pub fn upsert(&mut self, key: Value, value: Value) {
        match MapKey::of(&key) {
            Some(hashed) => match self.index.get(&hashed) {
                Some(&slot) => self.entries[slot].1 = value,
                None => {
                    self.index.insert(hashed, self.entries.len());
                    self.entries.push((key, value));
                }
            },
            // Not a legal key kind; keep the entry without indexing it.
            None => match self.entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => self.entries.push((key, value)),
            },
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match MapKey::of(key) {
            Some(hashed) => self.index.get(&hashed).map(|&slot| &self.entries[slot].1),
            None => self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
        }
    }

    /// Entries in insertion order.
    pub fn as_slice(&self) -> &[(Value, Value)] {
        &self.entries
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (Value, Value)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for MapEntries {
    /// Maps compare as sets of entries; encoding order is not part of a
    /// map's logical contents.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v == value))
    }
}

impl FromIterator<(Value, Value)> for MapEntries {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = MapEntries::new();
        for (key, value) in iter {
            map.upsert(key, value);
        }
        map
    }
}

impl<'a> IntoIterator for &'a MapEntries {
    type Item = &'a (Value, Value);
    type IntoIter = std::slice::Iter<'a, (Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FieldValue {
    /// Borrow the single value, if singular.
    pub fn as_singular(&self) -> Option<&Value> {
        match self {
            FieldValue::Singular(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the value list, if repeated.
    pub fn as_repeated(&self) -> Option<&[Value]> {
        match self {
            FieldValue::Repeated(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the entries, if a map.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            FieldValue::Map(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Number of values held.
    pub fn len(&self) -> usize {
        match self {
            FieldValue::Singular(_) => 1,
            FieldValue::Repeated(v) => v.len(),
            FieldValue::Map(v) => v.len(),
        }
    }

    /// Check if no values are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Singular(a), FieldValue::Singular(b)) => a == b,
            (FieldValue::Repeated(a), FieldValue::Repeated(b)) => a == b,
            (FieldValue::Map(a), FieldValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Explicit presence of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence<T> {
    /// Not set; reads return the declared default
    Unset,
    /// Set to a value
    Set(T),
}

impl<T> Presence<T> {
    /// Check if set.
    pub fn is_set(&self) -> bool {
        matches!(self, Presence::Set(_))
    }

    /// Convert to an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Presence::Set(v) => Some(v),
            Presence::Unset => None,
        }
    }
}

impl<T> From<Option<T>> for Presence<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Presence::Set(v),
            None => Presence::Unset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_equality_is_bitwise() {
        let nan_a = f64::from_bits(0x7FF8_0000_0000_0001);
        assert_eq!(Value::F64(nan_a), Value::F64(nan_a));
        assert_ne!(Value::F64(nan_a), Value::F64(f64::NAN));
        assert_ne!(Value::F32(-0.0), Value::F32(0.0));
    }

    #[test]
    fn test_is_default() {
        assert!(Value::I32(0).is_default());
        assert!(!Value::I32(-1).is_default());
        assert!(Value::F64(0.0).is_default());
        assert!(!Value::F64(-0.0).is_default());
        assert!(Value::String(String::new()).is_default());
        assert!(!Value::Bytes(vec![0]).is_default());
        assert!(Value::Enum(0).is_default());
    }

    #[test]
    fn test_kind_compatibility() {
        assert!(Value::I32(5).is_valid_for_kind(Kind::SInt32));
        assert!(Value::I32(5).is_valid_for_kind(Kind::SFixed32));
        assert!(!Value::I32(5).is_valid_for_kind(Kind::Int64));
        assert!(Value::U32(5).is_valid_for_kind(Kind::Fixed32));
        assert!(!Value::String("x".into()).is_valid_for_kind(Kind::Bytes));
    }

    #[test]
    fn test_default_for_kind() {
        assert_eq!(Value::default_for_kind(Kind::Fixed64), Some(Value::U64(0)));
        assert_eq!(Value::default_for_kind(Kind::Enum), Some(Value::Enum(0)));
        assert_eq!(Value::default_for_kind(Kind::Message), None);
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let a = FieldValue::Map(MapEntries::from_iter([
            (Value::from("a"), Value::I32(1)),
            (Value::from("b"), Value::I32(2)),
        ]));
        let b = FieldValue::Map(MapEntries::from_iter([
            (Value::from("b"), Value::I32(2)),
            (Value::from("a"), Value::I32(1)),
        ]));
        let c = FieldValue::Map(MapEntries::from_iter([
            (Value::from("b"), Value::I32(3)),
            (Value::from("a"), Value::I32(1)),
        ]));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_map_upsert_keeps_first_position() {
        let mut map = MapEntries::new();
        map.upsert(Value::U32(7), Value::from("x"));
        map.upsert(Value::U32(3), Value::from("y"));
        map.upsert(Value::U32(7), Value::from("z"));
        assert_eq!(map.len(), 2);
        assert_eq!(map.as_slice()[0], (Value::U32(7), Value::from("z")));
        assert_eq!(map.get(&Value::U32(3)), Some(&Value::from("y")));
        // Keys of different kinds never collide.
        assert_eq!(map.get(&Value::I32(7)), None);
    }

    #[test]
    fn test_presence() {
        let set: Presence<i32> = Some(3).into();
        assert!(set.is_set());
        assert_eq!(set.into_option(), Some(3));
        assert!(!Presence::<i32>::Unset.is_set());
    }
}
