//! VirtualWire builder for configuring hooks and hot-plug wiring.

use crate::error::Result;
use crate::events::{NoopEvents, WireEvents};

use super::VirtualWire;

pub struct VirtualWireBuilder {
    pub(super) events: Option<Box<dyn WireEvents>>,
    pub(super) auto_connect: bool,
    pub(super) start: bool,
}

#[allow(clippy::derivable_impls)]
impl Default for VirtualWireBuilder {
    fn default() -> Self {
        Self {
            events: None,
            auto_connect: false,
            start: false,
        }
    }
}

impl VirtualWireBuilder {
    pub fn events(mut self, events: impl WireEvents + 'static) -> Self {
        self.events = Some(Box::new(events));
        self
    }

    /// Wires every newly registered device both ways with the devices already
    /// present.
    pub fn auto_connect(mut self, enabled: bool) -> Self {
        self.auto_connect = enabled;
        self
    }

    /// Starts routing right after construction.
    pub fn start(mut self, enabled: bool) -> Self {
        self.start = enabled;
        self
    }

    pub fn build(self) -> Result<VirtualWire> {
        let events = self.events.unwrap_or_else(|| Box::new(NoopEvents));
        let mut wire = VirtualWire::from_parts(events, self.auto_connect);
        if self.start {
            wire.start()?;
        }
        Ok(wire)
    }
}
