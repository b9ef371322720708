//! Device registry.
//!
//! Devices live in a dense `Vec` in registration order with an id -> slot
//! index on the side. Removal keeps the survivors' relative order and
//! re-indexes only the slots that moved.

use crate::config::{DEVICE_BUFFER_SIZE, DEVICE_NAME_LENGTH, MAX_DEVICES};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vwire_midi::{Message, MessageQueue};

pub type DeviceId = u8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceState {
    #[default]
    Disconnected,
    Connected,
    Active,
    Error,
}

impl DeviceState {
    /// Whether a device in this state takes part in routing.
    #[inline]
    pub fn is_routable(self) -> bool {
        matches!(self, DeviceState::Connected | DeviceState::Active)
    }
}

/// Copy of a device's identity and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub name: String,
    pub is_input: bool,
    pub is_output: bool,
    pub state: DeviceState,
    pub last_activity: u32,
    pub messages_received: u32,
    pub messages_sent: u32,
    pub errors: u32,
    /// Messages waiting in the inbound mailbox.
    pub pending: usize,
    pub inbound_overruns: u32,
    pub outbound_overruns: u32,
}

/// Truncates to the storable name length on a char boundary.
fn bounded_name(name: &str) -> String {
    let max = DEVICE_NAME_LENGTH - 1;
    if name.len() <= max {
        return name.to_owned();
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_owned()
}

#[inline]
fn bump(counter: &mut u32) {
    *counter = counter.wrapping_add(1);
}

/// A registered device and its two queues.
///
/// The inbound queue is the delivery mailbox for routed traffic; `process()`
/// drains it. The outbound queue holds what the device has been handed, for
/// the external endpoint to read.
pub struct Port {
    id: DeviceId,
    name: String,
    is_input: bool,
    is_output: bool,
    state: DeviceState,
    last_activity: u32,
    messages_received: u32,
    messages_sent: u32,
    errors: u32,
    inbound: MessageQueue,
    outbound: MessageQueue,
}

impl Port {
    fn new(id: DeviceId, name: &str, is_input: bool, is_output: bool, now: u32) -> Self {
        Self {
            id,
            name: bounded_name(name),
            is_input,
            is_output,
            state: DeviceState::Connected,
            last_activity: now,
            messages_received: 0,
            messages_sent: 0,
            errors: 0,
            inbound: MessageQueue::new(DEVICE_BUFFER_SIZE),
            outbound: MessageQueue::new(DEVICE_BUFFER_SIZE),
        }
    }

    #[inline]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_input(&self) -> bool {
        self.is_input
    }

    #[inline]
    pub fn is_output(&self) -> bool {
        self.is_output
    }

    #[inline]
    pub fn state(&self) -> DeviceState {
        self.state
    }

    #[inline]
    pub fn is_routable(&self) -> bool {
        self.state.is_routable()
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    pub fn info(&self) -> DeviceInfo {
        DeviceInfo {
            id: self.id,
            name: self.name.clone(),
            is_input: self.is_input,
            is_output: self.is_output,
            state: self.state,
            last_activity: self.last_activity,
            messages_received: self.messages_received,
            messages_sent: self.messages_sent,
            errors: self.errors,
            pending: self.inbound.len(),
            inbound_overruns: self.inbound.overruns(),
            outbound_overruns: self.outbound.overruns(),
        }
    }

    pub(crate) fn set_state(&mut self, state: DeviceState) {
        self.state = state;
    }

    /// Puts a message in the mailbox, crediting the send on success.
    pub(crate) fn deliver(&mut self, message: Message, now: u32) -> Result<()> {
        match self.inbound.push(message) {
            Ok(()) => {
                bump(&mut self.messages_sent);
                self.last_activity = now;
                Ok(())
            }
            Err(e) => {
                bump(&mut self.errors);
                Err(e.into())
            }
        }
    }

    /// Takes the oldest mailbox message, crediting the receipt and handing
    /// a copy to the outbound queue when the device can output.
    pub(crate) fn drain_one(&mut self, now: u32) -> Option<Message> {
        let message = self.inbound.pop().ok()?;
        bump(&mut self.messages_received);
        self.last_activity = now;
        if self.is_output && self.outbound.push(message).is_err() {
            bump(&mut self.errors);
            tracing::warn!("Outbound queue of device {} full, message dropped", self.id);
        }
        Some(message)
    }

    pub(crate) fn take_outbound(&mut self) -> Result<Message> {
        Ok(self.outbound.pop()?)
    }

    pub(crate) fn reset_counters(&mut self) {
        self.messages_received = 0;
        self.messages_sent = 0;
        self.errors = 0;
        self.inbound.reset_overruns();
        self.outbound.reset_overruns();
    }
}

impl std::fmt::Debug for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Port")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("inbound", &self.inbound)
            .field("outbound", &self.outbound)
            .finish()
    }
}

#[derive(Debug)]
pub struct DeviceRegistry {
    ports: Vec<Port>,
    index: HashMap<DeviceId, usize>,
    next_id: DeviceId,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            ports: Vec::with_capacity(MAX_DEVICES),
            index: HashMap::with_capacity(MAX_DEVICES),
            next_id: 1,
        }
    }

    /// Next free id, skipping 0 and ids still registered after wrap-around.
    fn allocate_id(&mut self) -> DeviceId {
        loop {
            let id = self.next_id;
            self.next_id = self.next_id.checked_add(1).unwrap_or(1);
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn register(
        &mut self,
        name: &str,
        is_input: bool,
        is_output: bool,
        now: u32,
    ) -> Result<DeviceId> {
        if self.ports.len() >= MAX_DEVICES {
            return Err(Error::DeviceCapacityExceeded { max: MAX_DEVICES });
        }

        let id = self.allocate_id();
        self.index.insert(id, self.ports.len());
        self.ports
            .push(Port::new(id, name, is_input, is_output, now));
        Ok(id)
    }

    /// Removes a device, shifting later devices down by one slot.
    pub fn remove(&mut self, id: DeviceId) -> Result<Port> {
        let slot = self.index.remove(&id).ok_or(Error::DeviceNotFound(id))?;
        let port = self.ports.remove(slot);
        for (i, moved) in self.ports.iter().enumerate().skip(slot) {
            self.index.insert(moved.id, i);
        }
        Ok(port)
    }

    #[inline]
    pub fn get(&self, id: DeviceId) -> Option<&Port> {
        self.index.get(&id).map(|&slot| &self.ports[slot])
    }

    #[inline]
    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Port> {
        match self.index.get(&id) {
            Some(&slot) => self.ports.get_mut(slot),
            None => None,
        }
    }

    #[inline]
    pub fn contains(&self, id: DeviceId) -> bool {
        self.index.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Port> {
        self.ports.iter_mut()
    }

    /// Ids in slot order.
    pub fn ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.ports.iter().map(|port| port.id)
    }

    /// Up to `max` ids in slot order.
    pub fn list(&self, max: usize) -> Vec<DeviceId> {
        self.ids().take(max).collect()
    }

    /// Drops every device and restarts ids at 1.
    pub fn clear(&mut self) {
        self.ports.clear();
        self.index.clear();
        self.next_id = 1;
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
