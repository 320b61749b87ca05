//! btleplug-backed implementation of the transport traits.
//!
//! This is the only module that touches the OS Bluetooth stack. Everything
//! above it goes through [`Transport`]/[`Connection`].

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::transport::{
    Connection, DiscoveredDevice, GattCharacteristic, GattService, NotificationHandler, Transport,
};

/// Transport backed by the first available Bluetooth adapter.
pub struct BleTransport {
    adapter: Adapter,
}

impl BleTransport {
    /// Create a transport on the first available Bluetooth adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScanFailed`] if no adapter is present.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = adapters
            .into_iter()
            .next()
            .ok_or_else(|| Error::ScanFailed("no Bluetooth adapter available".to_string()))?;
        Ok(Self { adapter })
    }

    /// Create a transport on a specific adapter.
    pub fn with_adapter(adapter: Adapter) -> Self {
        Self { adapter }
    }

    /// Find a known peripheral whose address matches the discovered device.
    async fn peripheral_for(&self, device: &DiscoveredDevice) -> Result<Peripheral> {
        let peripherals = self.adapter.peripherals().await?;
        for peripheral in peripherals {
            if let Ok(Some(props)) = peripheral.properties().await
                && props.address.to_string() == device.address
            {
                return Ok(peripheral);
            }
        }
        Err(Error::connect_failed(format!(
            "peripheral {} no longer known to the adapter",
            device.address
        )))
    }
}

#[async_trait]
impl Transport for BleTransport {
    type Conn = BleConnection;

    async fn scan(&self, duration: Duration) -> Result<Vec<DiscoveredDevice>> {
        debug!("starting BLE scan pass ({}s)", duration.as_secs());

        self.adapter.start_scan(ScanFilter::default()).await?;
        sleep(duration).await;
        self.adapter.stop_scan().await?;

        let peripherals = self.adapter.peripherals().await?;
        let mut discovered = Vec::new();

        for peripheral in peripherals {
            match peripheral.properties().await {
                Ok(Some(props)) => discovered.push(DiscoveredDevice {
                    address: props.address.to_string(),
                    name: props.local_name,
                    rssi: props.rssi,
                }),
                Ok(None) => {}
                Err(e) => debug!("skipping peripheral with unreadable properties: {}", e),
            }
        }

        debug!("scan pass complete, {} device(s) observed", discovered.len());
        Ok(discovered)
    }

    async fn connect(&self, device: &DiscoveredDevice) -> Result<Self::Conn> {
        let peripheral = self.peripheral_for(device).await?;

        info!("connecting to {}...", device.address);
        peripheral
            .connect()
            .await
            .map_err(|e| Error::connect_failed(e.to_string()))?;
        info!("connected");

        peripheral.discover_services().await?;

        Ok(BleConnection {
            peripheral,
            notify_tasks: tokio::sync::Mutex::new(Vec::new()),
        })
    }
}

/// A live btleplug connection.
pub struct BleConnection {
    peripheral: Peripheral,
    /// Handles for spawned notification routing tasks, aborted on close.
    notify_tasks: tokio::sync::Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl BleConnection {
    /// Find a characteristic by UUID in the discovered service tree.
    fn find_characteristic(&self, uuid: Uuid) -> Result<btleplug::api::Characteristic> {
        let services = self.peripheral.services();
        let service_count = services.len();
        for service in &services {
            for characteristic in &service.characteristics {
                if characteristic.uuid == uuid {
                    return Ok(characteristic.clone());
                }
            }
        }
        Err(Error::characteristic_not_found(uuid.to_string(), service_count))
    }
}

#[async_trait]
impl Connection for BleConnection {
    async fn services(&self) -> Result<Vec<GattService>> {
        let services = self
            .peripheral
            .services()
            .into_iter()
            .map(|service| GattService {
                uuid: service.uuid,
                characteristics: service
                    .characteristics
                    .into_iter()
                    .map(|characteristic| GattCharacteristic {
                        uuid: characteristic.uuid,
                    })
                    .collect(),
            })
            .collect();
        Ok(services)
    }

    async fn subscribe(&self, characteristic: Uuid, handler: NotificationHandler) -> Result<()> {
        let target = self.find_characteristic(characteristic)?;

        self.peripheral
            .subscribe(&target)
            .await
            .map_err(|e| Error::subscribe_failed(characteristic.to_string(), e.to_string()))?;

        let mut stream = self
            .peripheral
            .notifications()
            .await
            .map_err(|e| Error::subscribe_failed(characteristic.to_string(), e.to_string()))?;

        let handle = tokio::spawn(async move {
            use futures::StreamExt;
            while let Some(notification) = stream.next().await {
                if notification.uuid == characteristic {
                    handler(&notification.value);
                }
            }
        });

        self.notify_tasks.lock().await.push(handle);
        Ok(())
    }

    async fn unsubscribe(&self, characteristic: Uuid) -> Result<()> {
        let target = self.find_characteristic(characteristic)?;
        self.peripheral.unsubscribe(&target).await?;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn close(&self) -> Result<()> {
        {
            let mut tasks = self.notify_tasks.lock().await;
            for task in tasks.drain(..) {
                task.abort();
            }
        }

        if let Err(e) = self.peripheral.disconnect().await {
            // The link is often already gone by the time we get here.
            warn!("disconnect failed (link may already be down): {}", e);
        }
        Ok(())
    }
}
