use std::{collections::VecDeque, time::Duration};

use thiserror::Error;

use crate::item::{Class, PacketItem};

/// Returned when a dequeue or peek finds nothing to serve. This is a normal condition, callers
/// are expected to try again later (or try the other sub-queue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is empty")]
pub struct EmptyQueue;

/// The unit in which limits and thresholds are expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QueueMode {
    /// Limits count packets.
    #[default]
    Packets,
    /// Limits count bytes.
    Bytes,
}

impl QueueMode {
    /// The amount of occupancy `item` accounts for in this mode.
    #[inline]
    pub fn units(self, item: &PacketItem) -> u64 {
        match self {
            Self::Packets => 1,
            Self::Bytes => u64::from(item.size()),
        }
    }
}

/// A FIFO holding area for a single traffic class.
#[derive(Debug)]
pub struct SubQueue {
    class: Class,
    items: VecDeque<PacketItem>,
    /// Sum of the sizes of all queued items.
    bytes: u64,
}

impl SubQueue {
    /// Creates an empty sub-queue for `class`.
    pub fn new(class: Class) -> Self {
        Self { class, items: VecDeque::new(), bytes: 0 }
    }

    #[inline]
    pub fn class(&self) -> Class {
        self.class
    }

    /// Appends `item` at the tail, stamping it with the enqueue time `now`.
    pub fn push(&mut self, mut item: PacketItem, now: Duration) {
        debug_assert_eq!(item.class(), self.class, "packet pushed onto the wrong sub-queue");

        item.stamp(now);
        self.bytes += u64::from(item.size());
        self.items.push_back(item);
    }

    /// Removes and returns the head item.
    pub fn pop(&mut self) -> Result<PacketItem, EmptyQueue> {
        let item = self.items.pop_front().ok_or(EmptyQueue)?;
        self.bytes -= u64::from(item.size());
        Ok(item)
    }

    /// Returns a reference to the head item without removing it.
    pub fn peek(&self) -> Result<&PacketItem, EmptyQueue> {
        self.items.front().ok_or(EmptyQueue)
    }

    /// Current occupancy in the given unit.
    #[inline]
    pub fn occupancy(&self, mode: QueueMode) -> u64 {
        match mode {
            QueueMode::Packets => self.items.len() as u64,
            QueueMode::Bytes => self.bytes,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn byte_len(&self) -> u64 {
        self.bytes
    }

    /// How long the head item has been waiting at `now`. Zero when empty.
    pub fn head_sojourn(&self, now: Duration) -> Duration {
        self.items
            .front()
            .and_then(PacketItem::enqueued_at)
            .map_or(Duration::ZERO, |at| now.saturating_sub(at))
    }

    /// Drops every queued item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.bytes = 0;
    }
}
