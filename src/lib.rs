//! # vwire - Virtual MIDI Wire Hub
//!
//! Software-defined routing between logical MIDI devices attached to one
//! USB-MIDI endpoint.
//!
//! ## Architecture
//!
//! vwire is an umbrella crate that coordinates:
//! - **vwire-midi** - MIDI messages, category filters, fixed-capacity queues
//! - **vwire-router** - Device registry, connection table, fan-out router, statistics
//!
//! ## Quick Start
//!
//! ```ignore
//! use vwire::prelude::*;
//!
//! let mut wire = VirtualWire::builder().start(true).build()?;
//!
//! let keys = wire.register_device("Keys", true, false)?;
//! let synth = wire.register_device("Synth", false, true)?;
//! wire.create_connection(keys, synth, ANY_CHANNEL, 5, FilterMask::SYSEX)?;
//!
//! wire.inject(keys, Message::note_on(0, 60, 100))?;
//! wire.process()?;
//!
//! while let Ok(message) = wire.receive(synth) {
//!     // hand to the USB endpoint
//! }
//! ```

/// Re-export of vwire-midi for direct access
pub use vwire_midi as midi;

/// Re-export of vwire-router for direct access
pub use vwire_router as router;

// Message types
pub use vwire_midi::{
    message_length, status, FilterMask, Message, MessageKind, MessageQueue, ANY_CHANNEL,
    MAX_CHANNEL, USB_BUFFER_SIZE,
};

// Hub
pub use vwire_router::{
    event_channel, event_channel_bounded, ChannelEvents, Connection, ConnectionId, DeviceId,
    DeviceInfo, DeviceState, NoopEvents, SharedWire, Statistics, VirtualWire,
    VirtualWireBuilder, WireEvent, WireEvents, WireSnapshot,
};

// Capacities
pub use vwire_router::{DEVICE_BUFFER_SIZE, DEVICE_NAME_LENGTH, MAX_CONNECTIONS, MAX_DEVICES};

mod error;
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Error, Result};

    pub use crate::{
        status, ChannelEvents, DeviceId, DeviceInfo, DeviceState, FilterMask, Message,
        MessageKind, NoopEvents, SharedWire, Statistics, VirtualWire, WireEvent, WireEvents,
        ANY_CHANNEL,
    };

    pub use crate::event_channel;
}
