//! Fixed-capacity FIFO of messages with overrun accounting.
//!
//! Pushing into a full queue is rejected, never blocks and never evicts;
//! each rejection bumps the overrun counter so drops stay visible.

use crate::error::{QueueError, Result};
use crate::message::Message;
use ringbuf::{traits::*, HeapRb};

/// Queue depth at the USB-facing layer.
pub const USB_BUFFER_SIZE: usize = 64;

pub struct MessageQueue {
    rb: HeapRb<Message>,
    overruns: u32,
}

impl MessageQueue {
    /// A zero capacity is rounded up to one slot.
    pub fn new(capacity: usize) -> Self {
        Self {
            rb: HeapRb::new(capacity.max(1)),
            overruns: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, message: Message) -> Result<()> {
        if self.rb.try_push(message).is_err() {
            self.overruns = self.overruns.wrapping_add(1);
            return Err(QueueError::Full {
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Message> {
        self.rb.try_pop().ok_or(QueueError::Empty)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rb.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rb.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.rb.is_full()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.rb.capacity().get()
    }

    /// Pushes rejected because the queue was full.
    #[inline]
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    pub fn reset_overruns(&mut self) {
        self.overruns = 0;
    }

    /// Drops every queued message. The overrun counter is kept.
    pub fn clear(&mut self) -> usize {
        let mut dropped = 0;
        while self.rb.try_pop().is_some() {
            dropped += 1;
        }
        dropped
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new(USB_BUFFER_SIZE)
    }
}

impl std::fmt::Debug for MessageQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("overruns", &self.overruns)
            .finish()
    }
}
