//! The outer recovery loop.
//!
//! Wraps the locate → connect → discover → subscribe → monitor pipeline in an
//! endless loop. No failure is fatal: whatever ends a cycle, the supervisor
//! waits out the retry delay and starts over from a fresh scan. Only
//! cancellation stops it.

use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::consumer::ReadingConsumer;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::scan::locate;
use crate::session::Session;
use crate::transport::Transport;

/// Drives monitoring cycles until cancelled.
pub struct Supervisor<T: Transport> {
    transport: T,
    config: MonitorConfig,
    dispatcher: Dispatcher,
}

impl<T: Transport> std::fmt::Debug for Supervisor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Supervisor<T> {
    /// Create a supervisor delivering readings to `consumer`.
    pub fn new(transport: T, config: MonitorConfig, consumer: Arc<dyn ReadingConsumer>) -> Self {
        Self {
            transport,
            config,
            dispatcher: Dispatcher::new(consumer),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run monitoring cycles until `cancel` requests shutdown.
    ///
    /// Every failure is logged and absorbed; after the retry delay the next
    /// cycle starts from scratch with a fresh scan.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("monitoring '{}'", self.config.device_name);

        loop {
            if cancel.is_cancelled() {
                break;
            }

            match self.cycle(&cancel).await {
                // A cycle only completes cleanly when shutdown was requested.
                Ok(()) => break,
                Err(Error::DeviceNotFound { identifier }) => {
                    info!(
                        "'{}' not advertising, scanning again in {:?}",
                        identifier, self.config.retry_delay
                    );
                }
                Err(e) => {
                    warn!("{}; restarting in {:?}", e, self.config.retry_delay);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.config.retry_delay) => {}
            }
        }

        info!("monitor stopped");
    }

    /// One full cycle: locate, connect, then hand off to the session.
    ///
    /// Always starts with a fresh scan; nothing from an earlier cycle is
    /// reused.
    async fn cycle(&self, cancel: &CancellationToken) -> Result<()> {
        let device = locate(
            &self.transport,
            &self.config.device_name,
            self.config.scan_duration,
        )
        .await?
        .ok_or_else(|| Error::device_not_found(&self.config.device_name))?;

        let session = Session::establish(&self.transport, &device, &self.config).await?;
        session.run(&self.config, self.dispatcher.clone(), cancel).await
    }
}
