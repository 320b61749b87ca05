//! Core library for monitoring a BLE blood pressure meter.
//!
//! Locates an OMRON-style blood pressure meter by its advertised name,
//! subscribes to its measurement characteristic, and delivers decoded
//! readings to a pluggable consumer. The meter only advertises for a short
//! window after a cuff measurement, so the whole pipeline is built to run
//! unattended and recover from anything: failed scans, dropped links, and
//! vanished devices all lead back to a fresh scan.
//!
//! # Architecture
//!
//! - [`transport`]: the `Transport`/`Connection` seam over the radio; the
//!   btleplug implementation lives in [`ble`], a test double in [`mock`]
//! - [`scan`]: one scan pass, exact advertised-name match
//! - [`session`]: the connect → discover → subscribe → monitor → teardown
//!   state machine for one connection
//! - [`dispatch`]: decodes notification payloads and forwards readings
//! - [`supervisor`]: the endless recovery loop around all of the above
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bpmon_core::{BleTransport, ConsoleReporter, MonitorConfig, Supervisor};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = BleTransport::new().await?;
//!     let config = MonitorConfig::default();
//!     config.validate()?;
//!
//!     let supervisor = Supervisor::new(transport, config, Arc::new(ConsoleReporter::new()));
//!     supervisor.run(CancellationToken::new()).await;
//!     Ok(())
//! }
//! ```

pub mod ble;
pub mod config;
pub mod consumer;
pub mod dispatch;
pub mod error;
pub mod mock;
pub mod reading;
pub mod scan;
pub mod session;
pub mod supervisor;
pub mod transport;
pub mod uuid;

// Core exports
pub use ble::{BleConnection, BleTransport};
pub use config::{DEVICE_NAME, MonitorConfig};
pub use consumer::{ConsoleReporter, ReadingConsumer};
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use reading::BloodPressureReading;
pub use scan::locate;
pub use session::{Session, SessionState};
pub use supervisor::Supervisor;
pub use transport::{Connection, DiscoveredDevice, Transport};
