//! Locating the meter by its advertised name.
//!
//! One call performs one scan pass; retry policy lives in the supervisor.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::Result;
use crate::transport::{DiscoveredDevice, Transport};

/// Perform one scan pass and return the first device whose advertised name
/// exactly equals `identifier`.
///
/// Returns `Ok(None)` when no match was observed during the pass; the caller
/// decides whether and when to scan again.
pub async fn locate<T: Transport>(
    transport: &T,
    identifier: &str,
    duration: Duration,
) -> Result<Option<DiscoveredDevice>> {
    debug!("scanning for '{}'", identifier);
    let devices = transport.scan(duration).await?;

    let found = devices
        .into_iter()
        .find(|device| device.name.as_deref() == Some(identifier));

    match &found {
        Some(device) => info!("found {} - {}", identifier, device.address),
        None => debug!("'{}' not observed this pass", identifier),
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[tokio::test]
    async fn test_locate_finds_match_among_distractors() {
        // The target should be found regardless of its position in the scan
        // result set.
        for position in 0..4 {
            let transport = MockTransport::new();
            for i in 0..4 {
                if i == position {
                    transport.advertise("Target", &format!("AA:00:00:00:00:{:02X}", i));
                } else {
                    transport.advertise(&format!("Distractor {}", i), &format!("BB:00:00:00:00:{:02X}", i));
                }
            }

            let found = locate(&transport, "Target", Duration::from_millis(10))
                .await
                .unwrap()
                .expect("target should be found");
            assert_eq!(found.name.as_deref(), Some("Target"));
            assert_eq!(found.address, format!("AA:00:00:00:00:{:02X}", position));
        }
    }

    #[tokio::test]
    async fn test_locate_requires_exact_name() {
        let transport = MockTransport::new();
        transport.advertise("Target Plus Suffix", "AA:BB:CC:DD:EE:01");
        transport.advertise("target", "AA:BB:CC:DD:EE:02");

        let found = locate(&transport, "Target", Duration::from_millis(10))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_locate_returns_none_when_absent() {
        let transport = MockTransport::new();
        transport.advertise("Something Else", "AA:BB:CC:DD:EE:03");

        let found = locate(&transport, "Target", Duration::from_millis(10))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_locate_propagates_scan_failure() {
        let transport = MockTransport::new();
        transport.set_scan_failure(true);

        let result = locate(&transport, "Target", Duration::from_millis(10)).await;
        assert!(result.is_err());
    }
}
