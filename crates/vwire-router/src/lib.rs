//! Routing engine of the virtual wire hub.
//!
//! Keeps a fixed-capacity registry of virtual MIDI devices, a table of directed
//! connections between them, and fans messages out over those connections with
//! per-connection channel selection, channel remapping and category filtering.
//!
//! Everything is owned by one [`VirtualWire`] context and runs synchronously on
//! the caller's thread; [`SharedWire`] serializes access from several threads.

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{DEVICE_BUFFER_SIZE, DEVICE_NAME_LENGTH, MAX_CONNECTIONS, MAX_DEVICES};

pub mod registry;
pub use registry::{DeviceId, DeviceInfo, DeviceRegistry, DeviceState, Port};

pub mod connection;
pub use connection::{Connection, ConnectionId, ConnectionTable};

pub mod events;
pub use events::{
    event_channel, event_channel_bounded, ChannelEvents, NoopEvents, WireEvent, WireEvents,
};

pub mod stats;
pub use stats::{Statistics, WireSnapshot};

mod wire;
pub use wire::{VirtualWire, VirtualWireBuilder};

mod handle;
pub use handle::SharedWire;

pub use vwire_midi::{status, FilterMask, Message, MessageKind, ANY_CHANNEL, MAX_CHANNEL};
