//! Mock transport for testing.
//!
//! Implements [`Transport`]/[`Connection`] without BLE hardware so the
//! session state machine and supervisor can be exercised deterministically.
//!
//! # Features
//!
//! - **Failure injection**: scan failures, connect failures, subscribe
//!   failures, and connect latency (for timeout tests)
//! - **Scripted advertisements**: control which devices a scan pass observes
//! - **Service tree control**: make the target characteristic present or absent
//! - **Notification push**: deliver raw packets to the subscribed handler
//! - **Call recording**: tests can assert operation ordering, e.g. that
//!   unsubscribe happens before close during teardown

use std::sync::Arc;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::transport::{
    Connection, DiscoveredDevice, GattCharacteristic, GattService, NotificationHandler, Transport,
};
use crate::uuid::{BLOOD_PRESSURE_MEASUREMENT, BLOOD_PRESSURE_SERVICE, DEVICE_INFO_SERVICE, GAP_SERVICE};

/// Lock a mutex, recovering the data if a test thread panicked while
/// holding it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared state behind both the transport and its connections.
///
/// Locks are never held across an await point.
struct MockState {
    devices: Mutex<Vec<DiscoveredDevice>>,
    services: Mutex<Vec<GattService>>,
    connected: AtomicBool,
    subscribed: AtomicBool,
    scan_count: AtomicU32,
    connect_count: AtomicU32,
    established_count: AtomicU32,
    unsubscribe_count: AtomicU32,
    close_count: AtomicU32,
    scan_should_fail: AtomicBool,
    connect_should_fail: AtomicBool,
    subscribe_should_fail: AtomicBool,
    connect_latency_ms: AtomicU64,
    unsubscribed_while_down: AtomicBool,
    handler: Mutex<Option<NotificationHandler>>,
    calls: Mutex<Vec<&'static str>>,
    connect_addresses: Mutex<Vec<String>>,
}

impl MockState {
    fn record(&self, call: &'static str) {
        lock(&self.calls).push(call);
    }
}

/// A mock radio transport for tests.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("connected", &self.state.connected.load(Ordering::Relaxed))
            .field("subscribed", &self.state.subscribed.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create an empty mock transport: nothing advertised, no services.
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState {
                devices: Mutex::new(Vec::new()),
                services: Mutex::new(Vec::new()),
                connected: AtomicBool::new(false),
                subscribed: AtomicBool::new(false),
                scan_count: AtomicU32::new(0),
                connect_count: AtomicU32::new(0),
                established_count: AtomicU32::new(0),
                unsubscribe_count: AtomicU32::new(0),
                close_count: AtomicU32::new(0),
                scan_should_fail: AtomicBool::new(false),
                connect_should_fail: AtomicBool::new(false),
                subscribe_should_fail: AtomicBool::new(false),
                connect_latency_ms: AtomicU64::new(0),
                unsubscribed_while_down: AtomicBool::new(false),
                handler: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
                connect_addresses: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a mock advertising `name` and exposing the standard blood
    /// pressure service tree.
    pub fn with_target(name: &str) -> Self {
        let transport = Self::new();
        let address = format!("MOCK-{:06X}", rand::random::<u32>() % 0xFF_FFFF);
        transport.advertise(name, &address);
        transport.set_services(Self::blood_pressure_tree());
        transport
    }

    /// The service tree of a typical blood pressure meter: the measurement
    /// characteristic sits behind two standard services.
    pub fn blood_pressure_tree() -> Vec<GattService> {
        vec![
            GattService {
                uuid: GAP_SERVICE,
                characteristics: vec![GattCharacteristic {
                    uuid: Uuid::from_u128(0x2a00),
                }],
            },
            GattService {
                uuid: DEVICE_INFO_SERVICE,
                characteristics: vec![GattCharacteristic {
                    uuid: Uuid::from_u128(0x2a29),
                }],
            },
            GattService {
                uuid: BLOOD_PRESSURE_SERVICE,
                characteristics: vec![GattCharacteristic {
                    uuid: BLOOD_PRESSURE_MEASUREMENT,
                }],
            },
        ]
    }

    // --- Test control methods ---

    /// Add a device to the advertised set.
    pub fn advertise(&self, name: &str, address: &str) {
        lock(&self.state.devices).push(DiscoveredDevice {
            address: address.to_string(),
            name: Some(name.to_string()),
            rssi: Some(-50),
        });
    }

    /// Remove every advertised device, so later scan passes see nothing
    /// until `advertise` is called again.
    pub fn clear_advertisements(&self) {
        lock(&self.state.devices).clear();
    }

    /// Replace the service tree the connection will report.
    pub fn set_services(&self, services: Vec<GattService>) {
        *lock(&self.state.services) = services;
    }

    /// Make the next scan passes fail.
    pub fn set_scan_failure(&self, fail: bool) {
        self.state.scan_should_fail.store(fail, Ordering::Relaxed);
    }

    /// Make connection attempts fail.
    pub fn set_connect_failure(&self, fail: bool) {
        self.state.connect_should_fail.store(fail, Ordering::Relaxed);
    }

    /// Make subscribe attempts fail.
    pub fn set_subscribe_failure(&self, fail: bool) {
        self.state.subscribe_should_fail.store(fail, Ordering::Relaxed);
    }

    /// Delay connection establishment, for timeout tests.
    pub fn set_connect_latency(&self, latency: Duration) {
        self.state
            .connect_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Simulate the link dropping out from under the session.
    pub fn drop_link(&self) {
        self.state.connected.store(false, Ordering::Relaxed);
    }

    /// Deliver a raw packet to the subscribed handler.
    ///
    /// Returns `false` when no handler is subscribed.
    pub fn push_notification(&self, data: &[u8]) -> bool {
        let handler = lock(&self.state.handler);
        match handler.as_ref() {
            Some(handler) => {
                handler(data);
                true
            }
            None => false,
        }
    }

    // --- Observation methods ---

    /// Whether a connection is currently established.
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::Relaxed)
    }

    /// Whether a subscription is currently active.
    pub fn is_subscribed(&self) -> bool {
        self.state.subscribed.load(Ordering::Relaxed)
    }

    /// Number of scan passes started.
    pub fn scan_count(&self) -> u32 {
        self.state.scan_count.load(Ordering::Relaxed)
    }

    /// Number of connect attempts made.
    pub fn connect_count(&self) -> u32 {
        self.state.connect_count.load(Ordering::Relaxed)
    }

    /// Number of connections that were fully established.
    pub fn established_count(&self) -> u32 {
        self.state.established_count.load(Ordering::Relaxed)
    }

    /// Number of unsubscribe calls.
    pub fn unsubscribe_count(&self) -> u32 {
        self.state.unsubscribe_count.load(Ordering::Relaxed)
    }

    /// Number of close calls.
    pub fn close_count(&self) -> u32 {
        self.state.close_count.load(Ordering::Relaxed)
    }

    /// Whether an unsubscribe was issued while the link was already down.
    pub fn unsubscribed_while_down(&self) -> bool {
        self.state.unsubscribed_while_down.load(Ordering::Relaxed)
    }

    /// The recorded operation log, in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.state.calls).clone()
    }

    /// Addresses passed to connect, in call order.
    pub fn connect_addresses(&self) -> Vec<String> {
        lock(&self.state.connect_addresses).clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Conn = MockConnection;

    async fn scan(&self, duration: Duration) -> Result<Vec<DiscoveredDevice>> {
        self.state.record("scan");
        self.state.scan_count.fetch_add(1, Ordering::Relaxed);

        sleep(duration).await;

        if self.state.scan_should_fail.load(Ordering::Relaxed) {
            return Err(Error::ScanFailed("injected scan failure".to_string()));
        }
        Ok(lock(&self.state.devices).clone())
    }

    async fn connect(&self, device: &DiscoveredDevice) -> Result<Self::Conn> {
        self.state.record("connect");
        self.state.connect_count.fetch_add(1, Ordering::Relaxed);
        lock(&self.state.connect_addresses).push(device.address.clone());

        let latency = self.state.connect_latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            sleep(Duration::from_millis(latency)).await;
        }

        if self.state.connect_should_fail.load(Ordering::Relaxed) {
            return Err(Error::connect_failed("injected connect failure"));
        }

        self.state.connected.store(true, Ordering::Relaxed);
        self.state.established_count.fetch_add(1, Ordering::Relaxed);
        Ok(MockConnection {
            state: Arc::clone(&self.state),
        })
    }
}

/// A connection produced by [`MockTransport`].
pub struct MockConnection {
    state: Arc<MockState>,
}

impl std::fmt::Debug for MockConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConnection")
            .field("connected", &self.state.connected.load(Ordering::Relaxed))
            .finish()
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn services(&self) -> Result<Vec<GattService>> {
        Ok(lock(&self.state.services).clone())
    }

    async fn subscribe(&self, characteristic: Uuid, handler: NotificationHandler) -> Result<()> {
        self.state.record("subscribe");
        if self.state.subscribe_should_fail.load(Ordering::Relaxed) {
            return Err(Error::subscribe_failed(
                characteristic.to_string(),
                "injected subscribe failure",
            ));
        }
        *lock(&self.state.handler) = Some(handler);
        self.state.subscribed.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn unsubscribe(&self, _characteristic: Uuid) -> Result<()> {
        self.state.record("unsubscribe");
        self.state.unsubscribe_count.fetch_add(1, Ordering::Relaxed);
        if !self.state.connected.load(Ordering::Relaxed) {
            self.state
                .unsubscribed_while_down
                .store(true, Ordering::Relaxed);
        }
        self.state.subscribed.store(false, Ordering::Relaxed);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::Relaxed)
    }

    async fn close(&self) -> Result<()> {
        self.state.record("close");
        self.state.close_count.fetch_add(1, Ordering::Relaxed);
        self.state.connected.store(false, Ordering::Relaxed);
        *lock(&self.state.handler) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scan_returns_advertised_devices() {
        let transport = MockTransport::new();
        transport.advertise("Meter", "AA:BB:CC:DD:EE:FF");

        let devices = transport.scan(Duration::from_millis(1)).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name.as_deref(), Some("Meter"));
        assert_eq!(transport.scan_count(), 1);
    }

    #[tokio::test]
    async fn test_scan_failure_injection() {
        let transport = MockTransport::new();
        transport.set_scan_failure(true);

        let result = transport.scan(Duration::from_millis(1)).await;
        assert!(matches!(result, Err(Error::ScanFailed(_))));
    }

    #[tokio::test]
    async fn test_connect_lifecycle() {
        let transport = MockTransport::with_target("Meter");
        let devices = transport.scan(Duration::from_millis(1)).await.unwrap();

        let connection = transport.connect(&devices[0]).await.unwrap();
        assert!(transport.is_connected());
        assert_eq!(transport.established_count(), 1);

        connection.close().await.unwrap();
        assert!(!transport.is_connected());
        assert_eq!(transport.close_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_leaves_disconnected() {
        let transport = MockTransport::with_target("Meter");
        transport.set_connect_failure(true);
        let devices = transport.scan(Duration::from_millis(1)).await.unwrap();

        let result = transport.connect(&devices[0]).await;
        assert!(matches!(result, Err(Error::ConnectFailed { .. })));
        assert!(!transport.is_connected());
        assert_eq!(transport.established_count(), 0);
    }

    #[tokio::test]
    async fn test_push_without_subscriber_is_dropped() {
        let transport = MockTransport::with_target("Meter");
        assert!(!transport.push_notification(&[0u8; 15]));
    }

    #[tokio::test]
    async fn test_notification_reaches_handler() {
        let transport = MockTransport::with_target("Meter");
        let devices = transport.scan(Duration::from_millis(1)).await.unwrap();
        let connection = transport.connect(&devices[0]).await.unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        connection
            .subscribe(
                BLOOD_PRESSURE_MEASUREMENT,
                Box::new(move |data| sink.lock().unwrap().push(data.to_vec())),
            )
            .await
            .unwrap();

        assert!(transport.push_notification(&[1, 2, 3]));
        assert_eq!(received.lock().unwrap().as_slice(), &[vec![1, 2, 3]]);
    }
}
