//! Error types for message queues.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("Message queue full (capacity {capacity})")]
    Full { capacity: usize },

    #[error("Message queue empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, QueueError>;
