//! Monitor configuration.
//!
//! The device name and characteristic UUID are process-wide constants; the
//! timing knobs exist so tests and unusual RF environments can tune them.
//! None of this is read from files or flags by the core itself.

use std::time::Duration;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::uuid::BLOOD_PRESSURE_MEASUREMENT;

/// Advertised name of the blood pressure meter.
pub const DEVICE_NAME: &str = "BLESmart_00000287F348F8657214";

/// Default duration of one scan pass.
const DEFAULT_SCAN_DURATION: Duration = Duration::from_secs(5);

/// Default timeout for establishing a connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default interval between liveness checks while monitoring.
const DEFAULT_LIVENESS_INTERVAL: Duration = Duration::from_secs(1);

/// Default delay before restarting the pipeline after a failure.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Configuration for the monitor pipeline.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use bpmon_core::config::MonitorConfig;
///
/// let config = MonitorConfig::default()
///     .scan_duration(Duration::from_secs(10))
///     .connect_timeout(Duration::from_secs(20));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Advertised device name to match exactly during scans.
    pub device_name: String,
    /// UUID of the measurement characteristic to subscribe to.
    pub characteristic: Uuid,
    /// Duration of one scan pass.
    pub scan_duration: Duration,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Interval between connection liveness checks.
    pub liveness_interval: Duration,
    /// Delay before restarting after a recoverable failure.
    pub retry_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            device_name: DEVICE_NAME.to_string(),
            characteristic: BLOOD_PRESSURE_MEASUREMENT,
            scan_duration: DEFAULT_SCAN_DURATION,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            liveness_interval: DEFAULT_LIVENESS_INTERVAL,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl MonitorConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the advertised device name to look for.
    #[must_use]
    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Set the measurement characteristic UUID.
    #[must_use]
    pub fn characteristic(mut self, uuid: Uuid) -> Self {
        self.characteristic = uuid;
        self
    }

    /// Set the scan pass duration.
    #[must_use]
    pub fn scan_duration(mut self, duration: Duration) -> Self {
        self.scan_duration = duration;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the liveness check interval.
    #[must_use]
    pub fn liveness_interval(mut self, interval: Duration) -> Self {
        self.liveness_interval = interval;
        self
    }

    /// Set the delay before restarting after a failure.
    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Validate the configuration.
    ///
    /// Checks that the device name is non-empty and that no timing value is
    /// zero (a zero liveness interval would busy-spin the monitor loop).
    pub fn validate(&self) -> Result<()> {
        if self.device_name.is_empty() {
            return Err(Error::InvalidConfig("device_name must not be empty".to_string()));
        }
        if self.scan_duration.is_zero() {
            return Err(Error::InvalidConfig("scan_duration must be > 0".to_string()));
        }
        if self.connect_timeout.is_zero() {
            return Err(Error::InvalidConfig("connect_timeout must be > 0".to_string()));
        }
        if self.liveness_interval.is_zero() {
            return Err(Error::InvalidConfig("liveness_interval must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.device_name, DEVICE_NAME);
        assert_eq!(config.characteristic, BLOOD_PRESSURE_MEASUREMENT);
        assert_eq!(config.scan_duration, Duration::from_secs(5));
        assert_eq!(config.liveness_interval, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = MonitorConfig::default()
            .device_name("Other Meter")
            .scan_duration(Duration::from_secs(10))
            .retry_delay(Duration::from_secs(2));

        assert_eq!(config.device_name, "Other Meter");
        assert_eq!(config.scan_duration, Duration::from_secs(10));
        assert_eq!(config.retry_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let config = MonitorConfig::default().device_name("");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_intervals() {
        let config = MonitorConfig::default().liveness_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = MonitorConfig::default().scan_duration(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
