//! Error types for the IMU serial stream

use thiserror::Error;

/// Error type for serialization, transport and capture operations
#[derive(Error, Debug)]
pub enum StreamError {
    /// Serializer output buffer cannot hold the record plus terminator
    #[error("Buffer too small: record needs {required} bytes, buffer holds {capacity}")]
    BufferTooSmall { required: usize, capacity: usize },

    /// Serial port could not be opened or configured
    #[error("Transport unavailable: {path}: {source}")]
    TransportUnavailable {
        path: String,
        #[source]
        source: serialport::Error,
    },

    /// Read or write failure on an open transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Accepted record is not a decodable IMU sample
    #[error("Record decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// HDF5 capture error
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;
