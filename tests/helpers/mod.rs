//! Test helpers and fixtures for vwire integration tests

#![allow(dead_code)]

use vwire::prelude::*;

/// Route tracing output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A started hub with no hooks.
pub fn test_wire() -> VirtualWire {
    init_tracing();
    VirtualWire::builder()
        .start(true)
        .build()
        .expect("Failed to create test virtual wire")
}

/// Input-only keyboard wired unfiltered into an output-only synth.
pub fn keys_to_synth() -> (VirtualWire, DeviceId, DeviceId) {
    let mut wire = test_wire();
    let keys = wire.register_device("Keys", true, false).unwrap();
    let synth = wire.register_device("Synth", false, true).unwrap();
    wire.create_connection(keys, synth, ANY_CHANNEL, ANY_CHANNEL, FilterMask::NONE)
        .unwrap();
    (wire, keys, synth)
}

/// Everything currently waiting in a device's outbound queue.
pub fn drain(wire: &mut VirtualWire, device: DeviceId) -> Vec<Message> {
    std::iter::from_fn(|| wire.receive(device).ok()).collect()
}
