//! Reading consumer boundary.
//!
//! The dispatcher hands every decoded reading to a [`ReadingConsumer`]. The
//! default consumer prints to the console; forwarding to a remote fitness
//! service is just another impl of this trait, injected by the caller, and the
//! core never depends on one.

use crate::reading::BloodPressureReading;

/// Receives decoded readings from the dispatcher.
///
/// Implementations must not block: they run on the notification delivery path
/// and anything slow should be handed off to a channel or task.
pub trait ReadingConsumer: Send + Sync {
    /// Called once per decoded measurement, with the raw packet it was
    /// decoded from for diagnostic display.
    fn on_reading(&self, reading: &BloodPressureReading, raw: &[u8]);
}

/// Default consumer: prints the raw byte listing and the formatted reading.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Create a new console reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ReadingConsumer for ConsoleReporter {
    fn on_reading(&self, reading: &BloodPressureReading, raw: &[u8]) {
        println!("Packet bytes: {:?}", raw);
        println!("{}", reading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_reporter_does_not_panic() {
        let reporter = ConsoleReporter::new();
        let reading = BloodPressureReading {
            systolic: 120,
            diastolic: 80,
            pulse: 70,
        };
        reporter.on_reading(&reading, &[0u8; 15]);
    }
}
