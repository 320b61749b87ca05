//! Routing raw notification payloads to the reading consumer.
//!
//! The transport invokes the dispatcher once per inbound packet, on its own
//! delivery task. Decode failures are contained here: a malformed packet is
//! logged and dropped, never surfaced to the session.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::consumer::ReadingConsumer;
use crate::reading::BloodPressureReading;
use crate::transport::NotificationHandler;

/// Decodes inbound packets and forwards readings to the consumer.
#[derive(Clone)]
pub struct Dispatcher {
    consumer: Arc<dyn ReadingConsumer>,
}

impl Dispatcher {
    /// Create a dispatcher forwarding to the given consumer.
    pub fn new(consumer: Arc<dyn ReadingConsumer>) -> Self {
        Self { consumer }
    }

    /// Handle one raw notification payload.
    ///
    /// Decodes and forwards on success; logs and drops on failure. Must stay
    /// cheap: this runs on the transport's delivery path.
    pub fn handle_notification(&self, data: &[u8]) {
        match BloodPressureReading::from_bytes(data) {
            Ok(reading) => {
                debug!(
                    systolic = reading.systolic,
                    diastolic = reading.diastolic,
                    pulse = reading.pulse,
                    "decoded measurement"
                );
                self.consumer.on_reading(&reading, data);
            }
            Err(e) => warn!("dropping packet: {}", e),
        }
    }

    /// Package the dispatcher as a transport notification handler.
    pub fn into_handler(self) -> NotificationHandler {
        Box::new(move |data| self.handle_notification(data))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
