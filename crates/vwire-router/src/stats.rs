//! Hub-wide counters and status snapshots.

use crate::connection::Connection;
use crate::registry::DeviceInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Routing attempts, counted once per injected or forwarded message
    /// whether or not any connection matched.
    pub total_messages: u32,
    /// Deliveries that failed at routing time (missing, inactive or
    /// wrong-direction destination, full mailbox).
    pub total_errors: u32,
    /// Deliveries suppressed by a built-in filter or the veto hook.
    pub total_filtered: u32,
}

impl Statistics {
    #[inline]
    pub(crate) fn record_message(&mut self) {
        self.total_messages = self.total_messages.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_error(&mut self) {
        self.total_errors = self.total_errors.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_filtered(&mut self) {
        self.total_filtered = self.total_filtered.wrapping_add(1);
    }
}

/// Point-in-time view of the whole hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSnapshot {
    pub clock: u32,
    pub running: bool,
    pub statistics: Statistics,
    pub devices: Vec<DeviceInfo>,
    pub connections: Vec<Connection>,
}

impl fmt::Display for WireSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Devices: {}, Connections: {}, Tick: {}{}",
            self.devices.len(),
            self.connections.len(),
            self.clock,
            if self.running { "" } else { " (stopped)" }
        )?;
        for device in &self.devices {
            writeln!(
                f,
                "  Device {}: '{}' {:?} - RX:{} TX:{} Errors:{}",
                device.id,
                device.name,
                device.state,
                device.messages_received,
                device.messages_sent,
                device.errors
            )?;
        }
        for conn in &self.connections {
            writeln!(
                f,
                "  Connection {}: {} -> {}{} - Routed:{} Filtered:{}",
                conn.id,
                conn.source,
                conn.dest,
                if conn.enabled { "" } else { " (disabled)" },
                conn.messages_routed,
                conn.messages_filtered
            )?;
        }
        write!(
            f,
            "Total messages: {}, Errors: {}, Filtered: {}",
            self.statistics.total_messages, self.statistics.total_errors, self.statistics.total_filtered
        )
    }
}
