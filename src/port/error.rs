//! Port-specific error types.
//!
//! Every failure a port operation can report maps onto exactly one variant
//! here. The transient "would block" condition is absorbed by the reader and
//! writer and never shows up as a `PortError`.

use thiserror::Error;

/// Errors that can occur during serial port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// Attempted to use a port that's not open.
    #[error("Serial port not open")]
    NotOpen,

    /// Attempted to open a port that's already open.
    #[error("Serial port already open")]
    AlreadyOpen,

    /// Acquiring or initialising the device failed while opening.
    #[error("Failed to open serial port: {0}")]
    OpenFailed(#[source] std::io::Error),

    /// The requested baud rate was rejected.
    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaudRate(String),

    /// A line parameter was out of range or rejected by the device.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A read did not collect the requested number of bytes in time.
    #[error("Read timed out")]
    ReadTimeout,

    /// A line read hit its length limit before the terminator arrived.
    #[error("Line exceeded {0} bytes without a terminator")]
    LineTooLong(usize),

    /// A hard I/O error from the device.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PortError {
    /// Create an InvalidArgument error from a message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an UnsupportedBaudRate error from a message.
    pub fn unsupported_baud(message: impl Into<String>) -> Self {
        Self::UnsupportedBaudRate(message.into())
    }

    /// True for the soft timeout outcome, as opposed to a broken device.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ReadTimeout)
    }
}

/// Result type for port operations.
pub type PortResult<T> = Result<T, PortError>;
