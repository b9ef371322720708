//! Thread-shareable handle around one [`VirtualWire`].

use crate::error::Result;
use crate::registry::DeviceId;
use crate::stats::{Statistics, WireSnapshot};
use crate::wire::VirtualWire;
use parking_lot::Mutex;
use std::sync::Arc;
use vwire_midi::Message;

/// Serializes every hub operation behind one lock. Clone is cheap (Arc internally).
///
/// Hooks run while the lock is held, so they must not call back into the handle.
#[derive(Clone)]
pub struct SharedWire {
    inner: Arc<Mutex<VirtualWire>>,
}

impl SharedWire {
    pub fn new(wire: VirtualWire) -> Self {
        Self {
            inner: Arc::new(Mutex::new(wire)),
        }
    }

    /// Runs `f` with exclusive access to the hub.
    pub fn with<R>(&self, f: impl FnOnce(&mut VirtualWire) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn inject(&self, source: DeviceId, message: Message) -> Result<()> {
        self.inner.lock().inject(source, message)
    }

    pub fn process(&self) -> Result<()> {
        self.inner.lock().process()
    }

    pub fn send(&self, device: DeviceId, message: Message) -> Result<()> {
        self.inner.lock().send(device, message)
    }

    pub fn receive(&self, device: DeviceId) -> Result<Message> {
        self.inner.lock().receive(device)
    }

    pub fn statistics(&self) -> Statistics {
        self.inner.lock().statistics()
    }

    pub fn snapshot(&self) -> WireSnapshot {
        self.inner.lock().snapshot()
    }
}

impl From<VirtualWire> for SharedWire {
    fn from(wire: VirtualWire) -> Self {
        Self::new(wire)
    }
}

impl std::fmt::Debug for SharedWire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never block: the lock may already be held by this thread.
        match self.inner.try_lock() {
            Some(wire) => f.debug_tuple("SharedWire").field(&*wire).finish(),
            None => f.debug_tuple("SharedWire").field(&"<locked>").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::thread;
    use vwire_midi::{FilterMask, ANY_CHANNEL};

    fn wired() -> (SharedWire, DeviceId, DeviceId) {
        let mut wire = VirtualWire::builder().start(true).build().unwrap();
        let a = wire.register_device("Keys", true, false).unwrap();
        let b = wire.register_device("Synth", false, true).unwrap();
        wire.create_connection(a, b, ANY_CHANNEL, ANY_CHANNEL, FilterMask::NONE)
            .unwrap();
        (SharedWire::new(wire), a, b)
    }

    #[test]
    fn test_round_trip_through_handle() {
        let (shared, a, b) = wired();
        shared.inject(a, Message::note_on(0, 60, 100)).unwrap();
        shared.process().unwrap();

        assert_eq!(shared.receive(b).unwrap().status, 0x90);
        assert_eq!(shared.receive(b), Err(Error::NoData));
        assert_eq!(shared.statistics().total_messages, 1);
        assert_eq!(shared.snapshot().devices.len(), 2);
    }

    #[test]
    fn test_with_exposes_hub() {
        let (shared, a, _) = wired();
        let count = shared.with(|wire| {
            wire.unregister_device(a).unwrap();
            wire.connection_count()
        });
        assert_eq!(count, 0);
    }

    #[test]
    fn test_debug_while_locked() {
        let (shared, _, _) = wired();
        assert!(format!("{shared:?}").contains("VirtualWire"));

        let handle = shared.clone();
        let text = shared.with(|_| format!("{handle:?}"));
        assert_eq!(text, "SharedWire(\"<locked>\")");
    }

    #[test]
    fn test_concurrent_injection() {
        let (shared, a, b) = wired();
        let producers: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for note in 0..16 {
                        shared.inject(a, Message::note_on(0, i * 16 + note, 100)).unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        assert_eq!(shared.statistics().total_messages, 64);
        assert_eq!(shared.with(|wire| wire.pending_count(b)), 64);
        assert_eq!(shared.statistics().total_errors, 0);
    }
}
