//! Notification hooks invoked by the hub.
//!
//! Hooks run inline on the caller's thread in the middle of routing. They
//! must not block and cannot reach back into the hub.

use crate::registry::{DeviceId, DeviceState};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use vwire_midi::Message;

const DEFAULT_EVENT_CAPACITY: usize = 1024;

pub trait WireEvents: Send {
    /// Fired on register, unregister and every explicit state change.
    fn on_device_state(&mut self, _device: DeviceId, _state: DeviceState) {}

    /// Fired once per message drained from a device mailbox by `process()`,
    /// before the message is forwarded.
    fn on_message(&mut self, _device: DeviceId, _message: &Message) {}

    /// Consulted after the built-in filter passed. `false` suppresses delivery
    /// and counts as filtered.
    fn on_filter_decision(&mut self, _source: DeviceId, _dest: DeviceId, _message: &Message) -> bool {
        true
    }
}

/// No hooks registered.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl WireEvents for NoopEvents {}

/// Hub notification forwarded by [`ChannelEvents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    DeviceState { device: DeviceId, state: DeviceState },
    Message { device: DeviceId, message: Message },
}

/// Forwards device-state and message notifications over a channel.
///
/// Sends never block: when the channel is full or the receiver is gone the
/// notification is dropped and counted. Every routing attempt is allowed.
#[derive(Debug)]
pub struct ChannelEvents {
    sender: Sender<WireEvent>,
    dropped: u64,
}

impl ChannelEvents {
    pub fn new(sender: Sender<WireEvent>) -> Self {
        Self { sender, dropped: 0 }
    }

    /// Notifications lost to a full or disconnected channel.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn forward(&mut self, event: WireEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
            }
        }
    }
}

impl WireEvents for ChannelEvents {
    fn on_device_state(&mut self, device: DeviceId, state: DeviceState) {
        self.forward(WireEvent::DeviceState { device, state });
    }

    fn on_message(&mut self, device: DeviceId, message: &Message) {
        self.forward(WireEvent::Message {
            device,
            message: *message,
        });
    }
}

pub fn event_channel() -> (ChannelEvents, Receiver<WireEvent>) {
    event_channel_bounded(DEFAULT_EVENT_CAPACITY)
}

pub fn event_channel_bounded(capacity: usize) -> (ChannelEvents, Receiver<WireEvent>) {
    let (sender, receiver) = crossbeam_channel::bounded(capacity);
    (ChannelEvents::new(sender), receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_allows_everything() {
        let mut events = NoopEvents;
        assert!(events.on_filter_decision(1, 2, &Message::note_on(0, 60, 100)));
    }

    #[test]
    fn test_channel_forwarding() {
        let (mut events, rx) = event_channel();
        events.on_device_state(1, DeviceState::Connected);
        events.on_message(1, &Message::control_change(0, 7, 100));
        assert!(events.on_filter_decision(1, 2, &Message::note_on(0, 60, 100)));

        assert_eq!(
            rx.try_recv().unwrap(),
            WireEvent::DeviceState {
                device: 1,
                state: DeviceState::Connected
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            WireEvent::Message {
                device: 1,
                message: Message::control_change(0, 7, 100)
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_full_channel_drops() {
        let (mut events, rx) = event_channel_bounded(1);
        events.on_device_state(1, DeviceState::Connected);
        events.on_device_state(1, DeviceState::Active);
        assert_eq!(events.dropped(), 1);
        assert_eq!(rx.len(), 1);

        drop(rx);
        events.on_device_state(1, DeviceState::Error);
        assert_eq!(events.dropped(), 2);
    }
}
