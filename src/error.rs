//! Centralized error type for the vwire umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Router(#[from] vwire_router::Error),

    #[error("Queue: {0}")]
    Queue(#[from] vwire_midi::QueueError),
}

pub type Result<T> = std::result::Result<T, Error>;
