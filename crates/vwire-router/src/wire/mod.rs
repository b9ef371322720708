//! The virtual wire hub: device registry, connection table and fan-out router
//! behind one owned context.
//!
//! ## Quick Start
//!
//! ```ignore
//! use vwire_router::{FilterMask, Message, VirtualWire, ANY_CHANNEL};
//!
//! let mut wire = VirtualWire::builder().start(true).build()?;
//!
//! let keys = wire.register_device("Keys", true, false)?;
//! let synth = wire.register_device("Synth", false, true)?;
//! wire.create_connection(keys, synth, ANY_CHANNEL, ANY_CHANNEL, FilterMask::NONE)?;
//!
//! wire.inject(keys, Message::note_on(0, 60, 100))?;
//! wire.process()?;
//!
//! let delivered = wire.receive(synth)?;
//! ```
//!
//! ## Processing model
//!
//! `inject()` fans a message out immediately into the destination mailboxes.
//! `process()` advances the logical clock, then walks the devices in slot
//! order and drains each routable device's mailbox: the device is credited
//! with the receipt, the message hook fires, output-capable devices get a copy
//! in their outbound queue, and input-capable devices forward the message
//! along their own connections. A device drains only what was waiting when
//! its turn began, so chains towards later devices resolve in one pass while
//! routing cycles advance one lap per pass. Cycles are not detected; they keep
//! circulating until the mailboxes overflow.

mod builder;

pub use builder::VirtualWireBuilder;

use crate::config::MAX_DEVICES;
use crate::connection::{Connection, ConnectionId, ConnectionTable};
use crate::error::{Error, Result};
use crate::events::{NoopEvents, WireEvents};
use crate::registry::{DeviceId, DeviceInfo, DeviceRegistry, DeviceState};
use crate::stats::{Statistics, WireSnapshot};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};
use vwire_midi::{FilterMask, Message, ANY_CHANNEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Stopped,
    Running,
}

/// Owned routing context. All operations run to completion on the caller's
/// thread; wrap it in [`crate::SharedWire`] to use it from several threads.
pub struct VirtualWire {
    lifecycle: Lifecycle,
    devices: DeviceRegistry,
    connections: ConnectionTable,
    events: Box<dyn WireEvents>,
    stats: Statistics,
    clock: u32,
    auto_connect: bool,
}

impl VirtualWire {
    pub fn builder() -> VirtualWireBuilder {
        VirtualWireBuilder::default()
    }

    /// Initialized, stopped, no hooks.
    pub fn new() -> Self {
        Self::from_parts(Box::new(NoopEvents), false)
    }

    pub(crate) fn from_parts(events: Box<dyn WireEvents>, auto_connect: bool) -> Self {
        Self {
            lifecycle: Lifecycle::Stopped,
            devices: DeviceRegistry::new(),
            connections: ConnectionTable::new(),
            events,
            stats: Statistics::default(),
            clock: 0,
            auto_connect,
        }
    }

    // ==================== Lifecycle ====================

    #[inline]
    fn ensure_initialized(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Uninitialized => Err(Error::NotInitialized),
            _ => Ok(()),
        }
    }

    #[inline]
    fn ensure_running(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Uninitialized => Err(Error::NotInitialized),
            Lifecycle::Stopped => Err(Error::NotRunning),
            Lifecycle::Running => Ok(()),
        }
    }

    /// Brings a torn-down hub back to a fresh, stopped state. Ids restart at 1.
    pub fn init(&mut self) -> Result<()> {
        if self.lifecycle != Lifecycle::Uninitialized {
            return Err(Error::AlreadyInitialized);
        }
        self.clear_state();
        self.lifecycle = Lifecycle::Stopped;
        debug!("Virtual wire initialized");
        Ok(())
    }

    /// Stops and discards every device, connection and counter. No device
    /// hooks fire.
    pub fn deinit(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.clear_state();
        self.lifecycle = Lifecycle::Uninitialized;
        debug!("Virtual wire deinitialized");
        Ok(())
    }

    fn clear_state(&mut self) {
        self.devices.clear();
        self.connections.reset();
        self.stats = Statistics::default();
        self.clock = 0;
    }

    /// Starts routing and resets the logical clock.
    pub fn start(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.lifecycle = Lifecycle::Running;
        self.clock = 0;
        debug!("Virtual wire started");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.lifecycle = Lifecycle::Stopped;
        debug!("Virtual wire stopped");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle != Lifecycle::Uninitialized
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// Logical clock, advanced once per `process()` call.
    pub fn clock(&self) -> u32 {
        self.clock
    }

    /// Replaces the notification hooks.
    pub fn set_events(&mut self, events: impl WireEvents + 'static) {
        self.events = Box::new(events);
    }

    // ==================== Devices ====================

    pub fn register_device(
        &mut self,
        name: &str,
        is_input: bool,
        is_output: bool,
    ) -> Result<DeviceId> {
        self.ensure_initialized()?;
        let id = self
            .devices
            .register(name, is_input, is_output, self.clock)?;
        debug!(
            "Registered device {}: {} (input: {}, output: {})",
            id, name, is_input, is_output
        );
        self.events.on_device_state(id, DeviceState::Connected);

        if self.auto_connect {
            self.auto_wire(id);
        }
        Ok(id)
    }

    /// Removes a device after removing every connection that touches it.
    pub fn unregister_device(&mut self, id: DeviceId) -> Result<()> {
        self.ensure_initialized()?;
        if !self.devices.contains(id) {
            return Err(Error::DeviceNotFound(id));
        }

        let removed = self.connections.remove_touching(id);
        self.events.on_device_state(id, DeviceState::Disconnected);
        self.devices.remove(id)?;
        debug!(
            "Unregistered device {} ({} connections removed)",
            id, removed
        );
        Ok(())
    }

    pub fn device_info(&self, id: DeviceId) -> Result<DeviceInfo> {
        self.ensure_initialized()?;
        self.devices
            .get(id)
            .map(|port| port.info())
            .ok_or(Error::DeviceNotFound(id))
    }

    /// Sets the state and fires the device hook, even when the state is unchanged.
    pub fn set_device_state(&mut self, id: DeviceId, state: DeviceState) -> Result<()> {
        self.ensure_initialized()?;
        let port = self.devices.get_mut(id).ok_or(Error::DeviceNotFound(id))?;
        port.set_state(state);
        self.events.on_device_state(id, state);
        Ok(())
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Up to `max` device ids in slot order.
    pub fn list_devices(&self, max: usize) -> Vec<DeviceId> {
        self.devices.list(max)
    }

    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    // ==================== Connections ====================

    pub fn create_connection(
        &mut self,
        source: DeviceId,
        dest: DeviceId,
        source_channel: u8,
        dest_channel: u8,
        filter: FilterMask,
    ) -> Result<ConnectionId> {
        self.ensure_initialized()?;
        let id = self.connections.create(
            &self.devices,
            source,
            dest,
            source_channel,
            dest_channel,
            filter,
        )?;
        debug!(
            "Created connection {}: {} -> {} (channels {:#04x} -> {:#04x}, filter {:#04x})",
            id,
            source,
            dest,
            source_channel,
            dest_channel,
            filter.bits()
        );
        Ok(id)
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> Result<()> {
        self.ensure_initialized()?;
        self.connections.remove(id)?;
        debug!("Removed connection {}", id);
        Ok(())
    }

    /// Toggles routing over a connection; its counters are kept.
    pub fn enable_connection(&mut self, id: ConnectionId, enabled: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.connections.set_enabled(id, enabled)
    }

    pub fn connection_info(&self, id: ConnectionId) -> Result<Connection> {
        self.ensure_initialized()?;
        self.connections
            .get(id)
            .copied()
            .ok_or(Error::ConnectionNotFound(id))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Up to `max` connection ids in creation order.
    pub fn list_connections(&self, max: usize) -> Vec<ConnectionId> {
        self.connections.list(max)
    }

    pub fn connections(&self) -> &ConnectionTable {
        &self.connections
    }

    /// Unfiltered, unmapped edge `source -> dest` when the directions allow it.
    ///
    /// Returns whether a connection was created; an existing identical edge is
    /// not an error.
    fn link(&mut self, source: DeviceId, dest: DeviceId) -> Result<bool> {
        let allowed = match (self.devices.get(source), self.devices.get(dest)) {
            (Some(src), Some(dst)) => src.is_input() && dst.is_output(),
            (None, _) => return Err(Error::DeviceNotFound(source)),
            (_, None) => return Err(Error::DeviceNotFound(dest)),
        };
        if !allowed {
            return Ok(false);
        }
        match self.create_connection(source, dest, ANY_CHANNEL, ANY_CHANNEL, FilterMask::NONE) {
            Ok(_) => Ok(true),
            Err(Error::DuplicateConnection { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Connects every input-capable device to every other output-capable device.
    ///
    /// Existing identical edges are skipped. Returns how many were created;
    /// stops with `ConnectionCapacityExceeded` when the table fills up.
    pub fn connect_all_to_all(&mut self) -> Result<usize> {
        self.ensure_initialized()?;
        let ids: SmallVec<[DeviceId; MAX_DEVICES]> = self.devices.ids().collect();
        let mut created = 0;
        for &source in &ids {
            for &dest in &ids {
                if source != dest && self.link(source, dest)? {
                    created += 1;
                }
            }
        }
        debug!("Connected all to all ({} new connections)", created);
        Ok(created)
    }

    /// Connects `a -> b` and `b -> a`, each where the directions allow it.
    pub fn connect_bidirectional(&mut self, a: DeviceId, b: DeviceId) -> Result<usize> {
        self.ensure_initialized()?;
        let mut created = 0;
        for (source, dest) in [(a, b), (b, a)] {
            if self.link(source, dest)? {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Hot-plug wiring of a freshly registered device. Failures are logged,
    /// never returned.
    fn auto_wire(&mut self, id: DeviceId) {
        let others: SmallVec<[DeviceId; MAX_DEVICES]> =
            self.devices.ids().filter(|&other| other != id).collect();
        for other in others {
            if let Err(e) = self.connect_bidirectional(id, other) {
                warn!("Auto-connect of device {} with {} failed: {}", id, other, e);
                if e.is_capacity_exceeded() {
                    break;
                }
            }
        }
    }

    /// Removes every connection and its counters.
    pub fn disconnect_all(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        let dropped = self.connections.len();
        self.connections.clear();
        debug!("Disconnected all ({} connections removed)", dropped);
        Ok(())
    }

    // ==================== Messages ====================

    /// Puts a message straight into an output-capable device's mailbox.
    pub fn send(&mut self, id: DeviceId, message: Message) -> Result<()> {
        self.ensure_initialized()?;
        let now = self.clock;
        let port = self.devices.get_mut(id).ok_or(Error::DeviceNotFound(id))?;
        if !port.is_output() {
            return Err(Error::InvalidParam(format!(
                "device {id} is not output-capable"
            )));
        }
        port.deliver(message, now)
    }

    /// Takes the next message handed to a device by `process()`.
    pub fn receive(&mut self, id: DeviceId) -> Result<Message> {
        self.ensure_initialized()?;
        self.devices
            .get_mut(id)
            .ok_or(Error::DeviceNotFound(id))?
            .take_outbound()
    }

    /// Stamps `message` with the logical clock and fans it out from `source`.
    ///
    /// Per-destination failures are counted in the statistics, never returned.
    pub fn inject(&mut self, source: DeviceId, mut message: Message) -> Result<()> {
        self.ensure_running()?;
        message.timestamp = self.clock;
        self.route(source, &message);
        Ok(())
    }

    /// One processing pass over every device mailbox.
    pub fn process(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.clock = self.clock.wrapping_add(1);
        let now = self.clock;

        let ids: SmallVec<[DeviceId; MAX_DEVICES]> = self.devices.ids().collect();
        for id in ids {
            let (pending, forwards) = match self.devices.get(id) {
                Some(port) if port.is_routable() => (port.pending(), port.is_input()),
                _ => continue,
            };
            for _ in 0..pending {
                let Some(mut message) = self.devices.get_mut(id).and_then(|p| p.drain_one(now))
                else {
                    break;
                };
                self.events.on_message(id, &message);
                if forwards {
                    message.timestamp = now;
                    self.route(id, &message);
                }
            }
        }
        Ok(())
    }

    /// Fan-out of one message over every enabled connection from `source`,
    /// in creation order.
    fn route(&mut self, source: DeviceId, message: &Message) {
        let now = self.clock;
        let Self {
            devices,
            connections,
            events,
            stats,
            ..
        } = self;

        stats.record_message();

        for connection in connections.iter_mut() {
            if !connection.enabled || connection.source != source {
                continue;
            }
            let dest = connection.dest;

            if connection.blocks(message) {
                connection.messages_filtered = connection.messages_filtered.wrapping_add(1);
                stats.record_filtered();
                trace!("Connection {} filtered status {:#04x}", connection.id, message.status);
                continue;
            }

            if !events.on_filter_decision(source, dest, message) {
                connection.messages_filtered = connection.messages_filtered.wrapping_add(1);
                stats.record_filtered();
                trace!("Connection {} vetoed status {:#04x}", connection.id, message.status);
                continue;
            }

            // Unregistering cascades to connections, so a missing destination
            // means the table was corrupted.
            let Some(port) = devices.get_mut(dest) else {
                warn!(
                    "Connection {} points at missing device {}",
                    connection.id, dest
                );
                stats.record_error();
                continue;
            };

            if !port.is_output() || !port.is_routable() {
                warn!(
                    "Connection {}: device {} cannot take messages (state {:?})",
                    connection.id,
                    dest,
                    port.state()
                );
                stats.record_error();
                continue;
            }

            match port.deliver(connection.remap(message), now) {
                Ok(()) => {
                    connection.messages_routed = connection.messages_routed.wrapping_add(1);
                    trace!("Connection {} routed {} -> {}", connection.id, source, dest);
                }
                Err(_) => {
                    warn!("Mailbox of device {} full, message dropped", dest);
                    stats.record_error();
                }
            }
        }
    }

    /// Inbound mailbox occupancy; unknown devices have nothing pending.
    pub fn has_pending(&self, id: DeviceId) -> bool {
        self.pending_count(id) > 0
    }

    pub fn pending_count(&self, id: DeviceId) -> usize {
        self.devices.get(id).map_or(0, |port| port.pending())
    }

    // ==================== Statistics ====================

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    /// Zeroes global, device, queue-overrun and connection counters.
    pub fn reset_statistics(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.stats = Statistics::default();
        for port in self.devices.iter_mut() {
            port.reset_counters();
        }
        for connection in self.connections.iter_mut() {
            connection.messages_routed = 0;
            connection.messages_filtered = 0;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> WireSnapshot {
        WireSnapshot {
            clock: self.clock,
            running: self.is_running(),
            statistics: self.stats,
            devices: self.devices.iter().map(|port| port.info()).collect(),
            connections: self.connections.iter().copied().collect(),
        }
    }
}

impl Default for VirtualWire {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VirtualWire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualWire")
            .field("lifecycle", &self.lifecycle)
            .field("devices", &self.devices.len())
            .field("connections", &self.connections.len())
            .field("clock", &self.clock)
            .field("statistics", &self.stats)
            .finish()
    }
}
