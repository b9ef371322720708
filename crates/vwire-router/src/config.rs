//! Compile-time capacities of the hub.

/// Registered devices at any one time.
pub const MAX_DEVICES: usize = 8;

/// Connections in the table at any one time.
pub const MAX_CONNECTIONS: usize = 16;

/// Depth of each device's inbound and outbound queue.
pub const DEVICE_BUFFER_SIZE: usize = 128;

/// Name storage in bytes, terminator included (names keep at most 31 bytes).
pub const DEVICE_NAME_LENGTH: usize = 32;
