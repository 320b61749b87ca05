//! Error types for bpmon-core.
//!
//! Every failure the monitor can hit maps to one variant here. The supervisor
//! is the only place that handles them exhaustively; everything below it
//! propagates with `?`.
//!
//! Recovery policy:
//!
//! | Error | Handling |
//! |-------|----------|
//! | [`Error::MalformedPacket`] | Contained in the dispatcher: logged, packet dropped |
//! | [`Error::DeviceNotFound`] | Normal retry signal, logged at info |
//! | everything else | Logged by the supervisor, short backoff, fresh scan |
//!
//! Nothing is fatal; the process is designed to run unattended indefinitely.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while locating, connecting to, or reading from the
/// blood pressure meter.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bluetooth Low Energy error from the underlying stack.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// The scan pass itself failed (adapter gone, stack error).
    #[error("scan failed: {0}")]
    ScanFailed(String),

    /// No device advertising the target name was seen during a scan pass.
    ///
    /// This is a retry signal, not a fault: the meter only advertises for a
    /// short window after a measurement.
    #[error("device '{identifier}' not found")]
    DeviceNotFound {
        /// The advertised name that was searched for.
        identifier: String,
    },

    /// The transport did not establish a link within the configured window.
    #[error("connection attempt timed out after {duration:?}")]
    ConnectTimeout {
        /// The timeout that elapsed.
        duration: Duration,
    },

    /// The transport failed to establish a link for a non-timeout reason.
    #[error("connection failed: {reason}")]
    ConnectFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The target characteristic was not present in the device's service tree.
    #[error("characteristic {uuid} not found (searched {service_count} services)")]
    CharacteristicNotFound {
        /// The UUID that was searched for.
        uuid: String,
        /// Number of services that were searched.
        service_count: usize,
    },

    /// Enabling notifications on the characteristic failed.
    #[error("subscribe to {uuid} failed: {reason}")]
    SubscribeFailed {
        /// The characteristic UUID.
        uuid: String,
        /// Description of the failure.
        reason: String,
    },

    /// The link dropped while the session was monitoring it.
    #[error("connection to device lost")]
    Disconnected,

    /// A notification payload was too short to decode.
    #[error("malformed packet: need at least {expected} bytes, got {actual}")]
    MalformedPacket {
        /// Minimum packet length the decoder requires.
        expected: usize,
        /// Actual payload length received.
        actual: usize,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a device not found error for a specific identifier.
    pub fn device_not_found(identifier: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            identifier: identifier.into(),
        }
    }

    /// Create a connection failure with a reason.
    pub fn connect_failed(reason: impl Into<String>) -> Self {
        Self::ConnectFailed {
            reason: reason.into(),
        }
    }

    /// Create a characteristic not found error.
    pub fn characteristic_not_found(uuid: impl Into<String>, service_count: usize) -> Self {
        Self::CharacteristicNotFound {
            uuid: uuid.into(),
            service_count,
        }
    }

    /// Create a subscribe failure for a characteristic.
    pub fn subscribe_failed(uuid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SubscribeFailed {
            uuid: uuid.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed packet error.
    pub fn malformed_packet(expected: usize, actual: usize) -> Self {
        Self::MalformedPacket { expected, actual }
    }
}

/// Result type alias using bpmon-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
