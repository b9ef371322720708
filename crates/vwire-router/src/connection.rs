//! Connection table: directed, filterable, channel-remapping edges between devices.

use crate::config::MAX_CONNECTIONS;
use crate::error::{Error, Result};
use crate::registry::{DeviceId, DeviceRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vwire_midi::{is_valid_channel_selector, FilterMask, Message, ANY_CHANNEL};

pub type ConnectionId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: DeviceId,
    pub dest: DeviceId,
    /// 0-15, or `ANY_CHANNEL`.
    pub source_channel: u8,
    /// 0-15, or `ANY_CHANNEL` to keep the incoming channel.
    pub dest_channel: u8,
    pub filter: FilterMask,
    pub enabled: bool,
    pub messages_routed: u32,
    pub messages_filtered: u32,
}

impl Connection {
    #[inline]
    fn same_route(&self, source: DeviceId, dest: DeviceId, src_ch: u8, dst_ch: u8) -> bool {
        self.source == source
            && self.dest == dest
            && self.source_channel == src_ch
            && self.dest_channel == dst_ch
    }

    #[inline]
    pub fn touches(&self, device: DeviceId) -> bool {
        self.source == device || self.dest == device
    }

    /// Built-in filter.
    ///
    /// With no filter bits set nothing is blocked, not even a channel
    /// mismatch. Otherwise a source channel mismatch blocks regardless of
    /// category, then the category bit decides.
    pub fn blocks(&self, message: &Message) -> bool {
        if self.filter.is_none() {
            return false;
        }
        if self.source_channel != ANY_CHANNEL && message.channel_nibble() != self.source_channel {
            return true;
        }
        self.filter.blocks(message)
    }

    /// Copy of `message` as delivered over this edge.
    #[inline]
    pub fn remap(&self, message: &Message) -> Message {
        if self.dest_channel == ANY_CHANNEL {
            *message
        } else {
            message.with_channel(self.dest_channel)
        }
    }
}

#[derive(Debug)]
pub struct ConnectionTable {
    connections: Vec<Connection>,
    index: HashMap<ConnectionId, usize>,
    next_id: ConnectionId,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self {
            connections: Vec::with_capacity(MAX_CONNECTIONS),
            index: HashMap::with_capacity(MAX_CONNECTIONS),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> ConnectionId {
        loop {
            let id = self.next_id;
            self.next_id = self.next_id.checked_add(1).unwrap_or(1);
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    fn reindex_from(&mut self, slot: usize) {
        for (i, moved) in self.connections.iter().enumerate().skip(slot) {
            self.index.insert(moved.id, i);
        }
    }

    /// Both endpoints must be registered now; they are not tracked afterwards.
    pub fn create(
        &mut self,
        devices: &DeviceRegistry,
        source: DeviceId,
        dest: DeviceId,
        source_channel: u8,
        dest_channel: u8,
        filter: FilterMask,
    ) -> Result<ConnectionId> {
        if !is_valid_channel_selector(source_channel) {
            return Err(Error::InvalidParam(format!(
                "source channel {source_channel} out of range"
            )));
        }
        if !is_valid_channel_selector(dest_channel) {
            return Err(Error::InvalidParam(format!(
                "destination channel {dest_channel} out of range"
            )));
        }
        if self.connections.len() >= MAX_CONNECTIONS {
            return Err(Error::ConnectionCapacityExceeded {
                max: MAX_CONNECTIONS,
            });
        }
        for id in [source, dest] {
            if !devices.contains(id) {
                return Err(Error::DeviceNotFound(id));
            }
        }
        if let Some(existing) = self
            .connections
            .iter()
            .find(|c| c.same_route(source, dest, source_channel, dest_channel))
        {
            return Err(Error::DuplicateConnection {
                source_id: source,
                dest_id: dest,
                existing: existing.id,
            });
        }

        let id = self.allocate_id();
        self.index.insert(id, self.connections.len());
        self.connections.push(Connection {
            id,
            source,
            dest,
            source_channel,
            dest_channel,
            filter,
            enabled: true,
            messages_routed: 0,
            messages_filtered: 0,
        });
        Ok(id)
    }

    /// Removes a connection, keeping the creation order of the rest.
    pub fn remove(&mut self, id: ConnectionId) -> Result<Connection> {
        let slot = self
            .index
            .remove(&id)
            .ok_or(Error::ConnectionNotFound(id))?;
        let connection = self.connections.remove(slot);
        self.reindex_from(slot);
        Ok(connection)
    }

    /// Removes every connection from or to `device`, returning how many went.
    pub fn remove_touching(&mut self, device: DeviceId) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(device));
        let removed = before - self.connections.len();
        if removed > 0 {
            self.index.clear();
            self.reindex_from(0);
        }
        removed
    }

    pub fn set_enabled(&mut self, id: ConnectionId, enabled: bool) -> Result<()> {
        let connection = self.get_mut(id).ok_or(Error::ConnectionNotFound(id))?;
        connection.enabled = enabled;
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.index.get(&id).map(|&slot| &self.connections[slot])
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        match self.index.get(&id) {
            Some(&slot) => self.connections.get_mut(slot),
            None => None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Connections in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Connection> {
        self.connections.iter_mut()
    }

    pub fn list(&self, max: usize) -> Vec<ConnectionId> {
        self.connections.iter().take(max).map(|c| c.id).collect()
    }

    /// Drops every connection and its counters. Ids keep counting.
    pub fn clear(&mut self) {
        self.connections.clear();
        self.index.clear();
    }

    /// Like `clear`, but ids restart at 1.
    pub(crate) fn reset(&mut self) {
        self.clear();
        self.next_id = 1;
    }
}

impl Default for ConnectionTable {
    fn default() -> Self {
        Self::new()
    }
}
