//! One connected session with the meter.
//!
//! A session owns a single connection from establishment through teardown.
//! It never retries anything: every failure ends the session, and the
//! supervisor decides what happens next.

use tokio::time::{interval, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::transport::{Connection, DiscoveredDevice, Transport};

/// Lifecycle states of a session.
///
/// The connecting phase precedes session construction: [`Session::establish`]
/// is the connection attempt, and a failed attempt never produces a session.
/// A session therefore starts life in [`Discovering`](Self::Discovering).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection held.
    Disconnected,
    /// Connected, walking the service tree.
    Discovering,
    /// Notifications enabled on the measurement characteristic.
    Subscribed,
    /// Steady state, watching link liveness.
    Monitoring,
    /// Releasing the subscription and the link.
    Teardown,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Discovering => "discovering",
            SessionState::Subscribed => "subscribed",
            SessionState::Monitoring => "monitoring",
            SessionState::Teardown => "teardown",
        };
        f.write_str(name)
    }
}

/// A single connect → discover → subscribe → monitor → teardown pass.
#[derive(Debug)]
pub struct Session<C: Connection> {
    connection: C,
    /// Set once discovery succeeds; teardown only unsubscribes when set.
    characteristic: Option<Uuid>,
    state: SessionState,
}

impl<C: Connection> Session<C> {
    /// Connect to a discovered device, bounded by the configured timeout.
    ///
    /// On timeout the connect future is dropped before a connection handle
    /// ever exists, so there is nothing to tear down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectTimeout`] when the attempt outlives
    /// `config.connect_timeout`, or the transport's error otherwise.
    pub async fn establish<T>(
        transport: &T,
        device: &DiscoveredDevice,
        config: &MonitorConfig,
    ) -> Result<Self>
    where
        T: Transport<Conn = C>,
    {
        info!(
            "connecting to {} ({})",
            device.name.as_deref().unwrap_or("<unnamed>"),
            device.address
        );

        let connection = match timeout(config.connect_timeout, transport.connect(device)).await {
            Ok(Ok(connection)) => connection,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                warn!("connect attempt timed out after {:?}", config.connect_timeout);
                return Err(Error::ConnectTimeout {
                    duration: config.connect_timeout,
                });
            }
        };

        Ok(Self {
            connection,
            characteristic: None,
            state: SessionState::Discovering,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion.
    ///
    /// Returns `Ok(())` only when `cancel` requested shutdown; any failure is
    /// returned as the error that ended the session. Teardown runs on every
    /// exit path once a connection exists.
    pub async fn run(
        mut self,
        config: &MonitorConfig,
        dispatcher: Dispatcher,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let characteristic = match self.discover(config).await {
            Ok(characteristic) => characteristic,
            Err(e) => {
                self.teardown().await;
                return Err(e);
            }
        };

        if let Err(e) = self.subscribe(characteristic, dispatcher).await {
            self.teardown().await;
            return Err(e);
        }

        let outcome = self.monitor(config, cancel).await;
        self.teardown().await;
        outcome
    }

    /// Walk the service tree looking for the measurement characteristic.
    async fn discover(&mut self, config: &MonitorConfig) -> Result<Uuid> {
        self.state = SessionState::Discovering;

        let services = self.connection.services().await?;
        let service_count = services.len();

        for service in &services {
            for characteristic in &service.characteristics {
                if characteristic.uuid == config.characteristic {
                    debug!(
                        "found characteristic {} under service {}",
                        characteristic.uuid, service.uuid
                    );
                    self.characteristic = Some(characteristic.uuid);
                    return Ok(characteristic.uuid);
                }
            }
        }

        Err(Error::characteristic_not_found(
            config.characteristic.to_string(),
            service_count,
        ))
    }

    /// Enable notifications, wiring the dispatcher in as the handler.
    async fn subscribe(&mut self, characteristic: Uuid, dispatcher: Dispatcher) -> Result<()> {
        info!("enabling notifications on {}", characteristic);
        self.connection
            .subscribe(characteristic, dispatcher.into_handler())
            .await?;
        self.state = SessionState::Subscribed;
        Ok(())
    }

    /// Steady state: notifications flow through the dispatcher while this
    /// loop only watches link liveness and the shutdown signal.
    async fn monitor(&mut self, config: &MonitorConfig, cancel: &CancellationToken) -> Result<()> {
        self.state = SessionState::Monitoring;
        info!("waiting for measurements...");

        let mut tick = interval(config.liveness_interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown requested, ending session");
                    return Ok(());
                }
                _ = tick.tick() => {
                    if !self.connection.is_connected().await {
                        warn!("connection lost");
                        return Err(Error::Disconnected);
                    }
                }
            }
        }
    }

    /// Release the subscription, then the link.
    ///
    /// Both steps are attempted even when the link is already down; failures
    /// are logged, never propagated.
    async fn teardown(&mut self) {
        self.state = SessionState::Teardown;

        if let Some(characteristic) = self.characteristic {
            if let Err(e) = self.connection.unsubscribe(characteristic).await {
                warn!("unsubscribe during teardown failed: {}", e);
            }
        }

        if let Err(e) = self.connection.close().await {
            warn!("close during teardown failed: {}", e);
        }

        self.state = SessionState::Disconnected;
    }
}
