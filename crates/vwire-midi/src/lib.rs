//! MIDI primitives for the virtual wire hub.
//!
//! Provides the parsed `Message` value type, category classification,
//! connection filter masks and the fixed-capacity `MessageQueue`.

pub mod error;
pub use error::{QueueError, Result};

pub mod message;
pub use message::{
    is_valid_channel_selector, message_length, status, Message, MessageKind, ANY_CHANNEL,
    MAX_CHANNEL,
};

mod filter;
pub use filter::FilterMask;

mod queue;
pub use queue::{MessageQueue, USB_BUFFER_SIZE};
