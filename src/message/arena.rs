// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Arena ownership for message trees.
//!
//! A [`MessageArena`] owns a set of messages that share one lifetime: they
//! are released together when the arena is dropped or reset. Callers hold
//! [`MessageHandle`]s, which are plain indices tagged with the id of the
//! arena that issued them. A handle can only be dereferenced through that
//! arena, so no message outlives its arena, and using a handle on another
//! arena fails with [`CodecError::ArenaMismatch`]. Moving a message between
//! arenas is an explicit deep copy ([`MessageArena::import`]).

use std::sync::atomic::{AtomicU64, Ordering};

use super::DynamicMessage;
use crate::core::{CodecError, Result, Value};
use crate::encoding::ProtobufCodec;
use crate::schema::MessageDescriptor;

/// Source of process-unique arena ids.
static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

fn next_arena_id() -> u64 {
    NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed)
}

/// Reference to a message owned by a [`MessageArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    arena: u64,
    index: usize,
}

impl MessageHandle {
    /// Id of the arena that issued this handle.
    pub fn arena_id(&self) -> u64 {
        self.arena
    }
}

/// Bulk owner of message instances.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use protocodec::message::MessageArena;
/// use protocodec::schema::{DescriptorPool, FieldDescriptor, Kind, MessageDefinition};
///
/// let pool = DescriptorPool::builder()
///     .message(MessageDefinition::new("demo.Ping").field(FieldDescriptor::scalar("seq", 1, Kind::UInt64)))
///     .build()?;
/// let mut arena = MessageArena::new();
/// let ping = arena.decode_into(&pool.message("demo.Ping")?, &[0x08, 0x2A])?;
/// assert_eq!(arena.encode(ping)?, vec![0x08, 0x2A]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MessageArena {
    id: u64,
    slots: Vec<DynamicMessage>,
    codec: ProtobufCodec,
}

impl Default for MessageArena {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageArena {
    /// Create an empty arena using the default codec options.
    pub fn new() -> Self {
        Self::with_codec(ProtobufCodec::default())
    }

    /// Create an empty arena that encodes and decodes with `codec`.
    pub fn with_codec(codec: ProtobufCodec) -> Self {
        Self {
            id: next_arena_id(),
            slots: Vec::new(),
            codec,
        }
    }

    /// Unique id of this arena.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of messages owned.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the arena owns no messages.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn check(&self, handle: MessageHandle) -> Result<usize> {
        if handle.arena != self.id || handle.index >= self.slots.len() {
            return Err(CodecError::ArenaMismatch {
                handle_arena: handle.arena,
                arena: self.id,
            });
        }
        Ok(handle.index)
    }

    /// Take ownership of a message.
    pub fn insert(&mut self, message: DynamicMessage) -> MessageHandle {
        self.slots.push(message);
        MessageHandle {
            arena: self.id,
            index: self.slots.len() - 1,
        }
    }

    /// Allocate an empty message of the given type.
    pub fn alloc(&mut self, descriptor: &MessageDescriptor) -> MessageHandle {
        self.insert(DynamicMessage::new(descriptor.clone()))
    }

    /// Decode `bytes` into a new arena-owned message.
    pub fn decode_into(&mut self, descriptor: &MessageDescriptor, bytes: &[u8]) -> Result<MessageHandle> {
        let message = self.codec.decode(bytes, descriptor)?;
        Ok(self.insert(message))
    }

    /// Borrow a message.
    pub fn get(&self, handle: MessageHandle) -> Result<&DynamicMessage> {
        let index = self.check(handle)?;
        Ok(&self.slots[index])
    }

    /// Mutably borrow a message.
    pub fn get_mut(&mut self, handle: MessageHandle) -> Result<&mut DynamicMessage> {
        let index = self.check(handle)?;
        Ok(&mut self.slots[index])
    }

    /// Encode a message.
    pub fn encode(&self, handle: MessageHandle) -> Result<Vec<u8>> {
        self.codec.encode(self.get(handle)?)
    }

    /// Store a copy of message `from` into MESSAGE field `number` of `target`.
    ///
    /// Both handles must belong to this arena.
    pub fn set_message(&mut self, target: MessageHandle, number: u32, from: MessageHandle) -> Result<()> {
        let source = self.get(from)?.clone();
        self.get_mut(target)?.set(number, Value::Message(Box::new(source)))
    }

    /// Deep-copy a message owned by `other` into this arena.
    pub fn import(&mut self, other: &MessageArena, handle: MessageHandle) -> Result<MessageHandle> {
        let copy = other.get(handle)?.clone();
        Ok(self.insert(copy))
    }

    /// Release every message. Outstanding handles become invalid.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.id = next_arena_id();
    }
}
