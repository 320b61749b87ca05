//! Trait abstractions over the radio transport.
//!
//! The session manager and supervisor are written against these traits so the
//! same state machine runs over real Bluetooth hardware ([`crate::ble`]) and
//! over the mock transport used in tests ([`crate::mock`]).

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

/// Callback invoked by the transport for each inbound notification payload.
///
/// The payload slice is only valid for the duration of the call.
pub type NotificationHandler = Box<dyn Fn(&[u8]) + Send + Sync + 'static>;

/// A device observed during a scan pass.
///
/// Ephemeral: valid only for the scan cycle that produced it. A later scan
/// must produce a fresh value before connecting again.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// Transport address used for connecting.
    pub address: String,
    /// Advertised device name, if the advertisement carried one.
    pub name: Option<String>,
    /// RSSI signal strength at scan time.
    pub rssi: Option<i16>,
}

/// A characteristic within a service, in the order the device reported it.
#[derive(Debug, Clone)]
pub struct GattCharacteristic {
    /// The characteristic UUID.
    pub uuid: Uuid,
}

/// A service exposed by a connected device.
#[derive(Debug, Clone)]
pub struct GattService {
    /// The service UUID.
    pub uuid: Uuid,
    /// Characteristics in the order the device reported them.
    pub characteristics: Vec<GattCharacteristic>,
}

/// One live connection to a peripheral.
///
/// The session manager owns the connection for its lifetime and releases it
/// through [`close`](Connection::close); a dropped link invalidates the
/// connection permanently.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Enumerate the device's service tree in its reported order.
    async fn services(&self) -> Result<Vec<GattService>>;

    /// Enable notifications on a characteristic, routing each payload to the
    /// handler. Idempotent from the caller's perspective.
    async fn subscribe(&self, characteristic: Uuid, handler: NotificationHandler) -> Result<()>;

    /// Cancel an active subscription. Safe to call on a dead link.
    async fn unsubscribe(&self, characteristic: Uuid) -> Result<()>;

    /// Whether the underlying link is still up.
    async fn is_connected(&self) -> bool;

    /// Release the connection. Safe to call on a dead link.
    async fn close(&self) -> Result<()>;
}

/// The radio transport: scanning plus connection establishment.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The connection type this transport produces.
    type Conn: Connection + Send + 'static;

    /// Perform one scan pass and return every device observed during it.
    ///
    /// An empty list means no devices were seen; that is not an error.
    async fn scan(&self, duration: Duration) -> Result<Vec<DiscoveredDevice>>;

    /// Establish a connection to a previously discovered device.
    ///
    /// Callers bound this with a timeout; the transport itself applies none.
    async fn connect(&self, device: &DiscoveredDevice) -> Result<Self::Conn>;
}
