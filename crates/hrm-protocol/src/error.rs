//! Error types for the heart-rate monitor link.
//!
//! The framing and decoding path never fails. These errors belong to the
//! collaborators around it: device lookup and connection setup.

use thiserror::Error;

/// Errors that can occur while locating or connecting to a monitor.
#[derive(Debug, Error)]
pub enum HrmError {
    /// No paired device carries the requested name.
    #[error("could not find paired device: {0}")]
    DeviceNotFound(String),

    /// Every connection attempt failed.
    #[error("failed to connect to {device} after {attempts} attempts")]
    ConnectionFailed {
        /// Device name or link address.
        device: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// I/O error on the underlying link.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for link operations.
pub type HrmResult<T> = Result<T, HrmError>;
