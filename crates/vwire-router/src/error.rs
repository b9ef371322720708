//! Error types for the routing engine.

use crate::connection::ConnectionId;
use crate::registry::DeviceId;
use thiserror::Error;
use vwire_midi::QueueError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Virtual wire not initialized")]
    NotInitialized,

    #[error("Virtual wire already initialized")]
    AlreadyInitialized,

    #[error("Virtual wire not running")]
    NotRunning,

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Device {0} not found")]
    DeviceNotFound(DeviceId),

    #[error("Connection {0} not found")]
    ConnectionNotFound(ConnectionId),

    #[error("Device table full ({max} devices)")]
    DeviceCapacityExceeded { max: usize },

    #[error("Connection table full ({max} connections)")]
    ConnectionCapacityExceeded { max: usize },

    #[error("Connection {source_id} -> {dest_id} already exists as connection {existing}")]
    DuplicateConnection {
        source_id: DeviceId,
        dest_id: DeviceId,
        existing: ConnectionId,
    },

    #[error("Message buffer full")]
    BufferFull,

    #[error("No message available")]
    NoData,
}

impl Error {
    /// Either table is at capacity.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(
            self,
            Error::DeviceCapacityExceeded { .. } | Error::ConnectionCapacityExceeded { .. }
        )
    }
}

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        match e {
            QueueError::Full { .. } => Error::BufferFull,
            QueueError::Empty => Error::NoData,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
