// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use protocodec::schema::{EnumDescriptor, FieldDescriptor, Kind, MessageDefinition};
use protocodec::{DescriptorPool, DynamicMessage, MessageDescriptor};

// ============================================================================
// Field Numbers
// ============================================================================

pub mod order {
    pub const ID: u32 = 1;
    pub const CUSTOMER: u32 = 2;
    pub const ITEMS: u32 = 3;
    pub const TAGS: u32 = 4;
    pub const SCORES: u32 = 5;
    pub const LEGACY: u32 = 6;
    pub const NOTE: u32 = 7;
    pub const CARD: u32 = 8;
    pub const CASH_CENTS: u32 = 9;
    pub const STATUS: u32 = 10;
}

pub mod scalars {
    pub const INT32: u32 = 1;
    pub const INT64: u32 = 2;
    pub const UINT32: u32 = 3;
    pub const UINT64: u32 = 4;
    pub const SINT32: u32 = 5;
    pub const SINT64: u32 = 6;
    pub const FIXED32: u32 = 7;
    pub const FIXED64: u32 = 8;
    pub const SFIXED32: u32 = 9;
    pub const SFIXED64: u32 = 10;
    pub const FLOAT: u32 = 11;
    pub const DOUBLE: u32 = 12;
    pub const BOOL: u32 = 13;
    pub const STRING: u32 = 14;
    pub const BYTES: u32 = 15;
    pub const STATUS: u32 = 16;
}

// ============================================================================
// Descriptor Pool
// ============================================================================

/// Pool with a small order-processing schema.
///
/// ```text
/// enum Status { UNKNOWN = 0; ACTIVE = 1; SUSPENDED = 2; }
/// message Address  { string city = 1; string zip = 2; }
/// message Customer { string name = 1; Address address = 2; }
/// message Item     { string sku = 1; uint32 quantity = 2; double price = 3; }
/// message Order {
///   uint64 id = 1;
///   Customer customer = 2;
///   repeated Item items = 3;
///   map<string, int32> tags = 4;
///   repeated int32 scores = 5;
///   repeated int32 legacy = 6 [packed = false];
///   optional string note = 7;
///   oneof payment { string card = 8; int64 cash_cents = 9; }
///   Status status = 10;
/// }
/// message Scalars { ... one field of every scalar kind ... }
/// message Node { int32 value = 1; Node child = 2; }
/// ```
pub fn demo_pool() -> DescriptorPool {
    DescriptorPool::builder()
        .enumeration(
            EnumDescriptor::new("demo.Status")
                .value("UNKNOWN", 0)
                .value("ACTIVE", 1)
                .value("SUSPENDED", 2),
        )
        .message(
            MessageDefinition::new("demo.Address")
                .field(FieldDescriptor::scalar("city", 1, Kind::String))
                .field(FieldDescriptor::scalar("zip", 2, Kind::String)),
        )
        .message(
            MessageDefinition::new("demo.Customer")
                .field(FieldDescriptor::scalar("name", 1, Kind::String))
                .field(FieldDescriptor::message("address", 2, "demo.Address")),
        )
        .message(
            MessageDefinition::new("demo.Item")
                .field(FieldDescriptor::scalar("sku", 1, Kind::String))
                .field(FieldDescriptor::scalar("quantity", 2, Kind::UInt32))
                .field(FieldDescriptor::scalar("price", 3, Kind::Double)),
        )
        .message(MessageDefinition::map_entry(
            "demo.Order.TagsEntry",
            Kind::String,
            Kind::Int32,
            None,
        ))
        .message(
            MessageDefinition::new("demo.Order")
                .oneof("payment")
                .field(FieldDescriptor::scalar("id", order::ID, Kind::UInt64))
                .field(FieldDescriptor::message("customer", order::CUSTOMER, "demo.Customer"))
                .field(FieldDescriptor::message("items", order::ITEMS, "demo.Item").repeated())
                .field(FieldDescriptor::map("tags", order::TAGS, "demo.Order.TagsEntry"))
                .field(FieldDescriptor::scalar("scores", order::SCORES, Kind::Int32).repeated())
                .field(
                    FieldDescriptor::scalar("legacy", order::LEGACY, Kind::Int32)
                        .repeated()
                        .unpacked(),
                )
                .field(FieldDescriptor::scalar("note", order::NOTE, Kind::String).optional())
                .field(FieldDescriptor::scalar("card", order::CARD, Kind::String).in_oneof(0))
                .field(
                    FieldDescriptor::scalar("cash_cents", order::CASH_CENTS, Kind::Int64).in_oneof(0),
                )
                .field(FieldDescriptor::enumeration("status", order::STATUS, "demo.Status")),
        )
        .message(
            MessageDefinition::new("demo.Scalars")
                .field(FieldDescriptor::scalar("int32", scalars::INT32, Kind::Int32))
                .field(FieldDescriptor::scalar("int64", scalars::INT64, Kind::Int64))
                .field(FieldDescriptor::scalar("uint32", scalars::UINT32, Kind::UInt32))
                .field(FieldDescriptor::scalar("uint64", scalars::UINT64, Kind::UInt64))
                .field(FieldDescriptor::scalar("sint32", scalars::SINT32, Kind::SInt32))
                .field(FieldDescriptor::scalar("sint64", scalars::SINT64, Kind::SInt64))
                .field(FieldDescriptor::scalar("fixed32", scalars::FIXED32, Kind::Fixed32))
                .field(FieldDescriptor::scalar("fixed64", scalars::FIXED64, Kind::Fixed64))
                .field(FieldDescriptor::scalar("sfixed32", scalars::SFIXED32, Kind::SFixed32))
                .field(FieldDescriptor::scalar("sfixed64", scalars::SFIXED64, Kind::SFixed64))
                .field(FieldDescriptor::scalar("float", scalars::FLOAT, Kind::Float))
                .field(FieldDescriptor::scalar("double", scalars::DOUBLE, Kind::Double))
                .field(FieldDescriptor::scalar("bool", scalars::BOOL, Kind::Bool))
                .field(FieldDescriptor::scalar("string", scalars::STRING, Kind::String))
                .field(FieldDescriptor::scalar("bytes", scalars::BYTES, Kind::Bytes))
                .field(FieldDescriptor::enumeration("status", scalars::STATUS, "demo.Status")),
        )
        .message(
            MessageDefinition::new("demo.Node")
                .field(FieldDescriptor::scalar("value", 1, Kind::Int32))
                .field(FieldDescriptor::message("child", 2, "demo.Node")),
        )
        .build()
        .expect("demo schema should build")
}

/// Look up a message type in the demo pool.
pub fn descriptor(name: &str) -> MessageDescriptor {
    demo_pool()
        .message(name)
        .unwrap_or_else(|e| panic!("{name} should exist: {e}"))
}

// ============================================================================
// Sample Messages
// ============================================================================

/// An item with all three fields set.
pub fn item(pool: &DescriptorPool, sku: &str, quantity: u32, price: f64) -> DynamicMessage {
    let mut item = DynamicMessage::new(pool.message("demo.Item").expect("demo.Item"));
    item.set(1, sku).expect("set sku");
    item.set(2, quantity).expect("set quantity");
    item.set(3, price).expect("set price");
    item
}

/// An order exercising every field shape in the schema.
pub fn sample_order(pool: &DescriptorPool) -> DynamicMessage {
    let mut order_msg = DynamicMessage::new(pool.message("demo.Order").expect("demo.Order"));
    order_msg.set(order::ID, 42u64).expect("set id");

    let customer = order_msg.message_mut(order::CUSTOMER).expect("customer");
    customer.set(1, "Ada").expect("set name");
    let address = customer.message_mut(2).expect("address");
    address.set(1, "Hangzhou").expect("set city");
    address.set(2, "310000").expect("set zip");

    order_msg
        .push(order::ITEMS, item(pool, "A-1", 2, 9.5))
        .expect("push item");
    order_msg
        .push(order::ITEMS, item(pool, "B-7", 1, 120.0))
        .expect("push item");
    order_msg.insert(order::TAGS, "priority", 3).expect("insert tag");
    order_msg.insert(order::TAGS, "gift", 1).expect("insert tag");
    for score in [1, -2, 300] {
        order_msg.push(order::SCORES, score).expect("push score");
    }
    for value in [7, 8] {
        order_msg.push(order::LEGACY, value).expect("push legacy");
    }
    order_msg.set(order::NOTE, "leave at door").expect("set note");
    order_msg.set(order::CARD, "4111").expect("set card");
    order_msg
        .set(order::STATUS, protocodec::Value::Enum(1))
        .expect("set status");
    order_msg
}

// ============================================================================
// Temporary Files
// ============================================================================

/// Create a temporary file path with cleanup guard.
pub fn temp_path(name: &str) -> (PathBuf, CleanupGuard) {
    let random = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!(
        "protocodec_test_{}_{}_{}",
        std::process::id(),
        name.replace('.', "_"),
        random
    ));
    fs::create_dir_all(&dir).ok();
    let path = dir.join(name);
    (path, CleanupGuard(dir))
}

/// Removes a temporary directory on drop.
pub struct CleanupGuard(PathBuf);

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}
