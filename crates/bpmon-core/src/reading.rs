//! Decoding blood pressure measurement packets.
//!
//! The meter pushes a fixed-layout packet with every notification. Only three
//! fields are of interest here; the flag byte and timestamp fields that make
//! up the rest of the packet are ignored.
//!
//! Packet layout (15+ bytes):
//! - byte 0: flags
//! - bytes 1-2: systolic pressure (u16 LE, mmHg)
//! - bytes 3-4: diastolic pressure (u16 LE, mmHg)
//! - bytes 5-13: mean arterial pressure and timestamp (unused)
//! - byte 14: pulse rate (u8, bpm)

use bytes::Buf;
use serde::Serialize;

use crate::error::{Error, Result};

/// A decoded blood pressure measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BloodPressureReading {
    /// Systolic pressure in mmHg.
    pub systolic: u16,
    /// Diastolic pressure in mmHg.
    pub diastolic: u16,
    /// Pulse rate in beats per minute.
    pub pulse: u8,
}

impl BloodPressureReading {
    /// Minimum packet length the decoder accepts.
    pub const MIN_PACKET_LEN: usize = 15;

    /// Decode a measurement from a raw notification payload.
    ///
    /// Fails with [`Error::MalformedPacket`] when the payload is shorter than
    /// [`MIN_PACKET_LEN`](Self::MIN_PACKET_LEN) bytes. No plausibility bounds
    /// are applied to the decoded values; out-of-range readings pass through
    /// unchanged.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MIN_PACKET_LEN {
            return Err(Error::malformed_packet(Self::MIN_PACKET_LEN, data.len()));
        }

        let mut buf = &data[1..5];
        let systolic = buf.get_u16_le();
        let diastolic = buf.get_u16_le();
        let pulse = data[14];

        Ok(Self {
            systolic,
            diastolic,
            pulse,
        })
    }
}

impl std::fmt::Display for BloodPressureReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Systolic: {} mmHg, Diastolic: {} mmHg, Pulse: {} bpm",
            self.systolic, self.diastolic, self.pulse
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// A packet with systolic 120, diastolic 80, pulse 70.
    fn sample_packet() -> [u8; 15] {
        let mut data = [0u8; 15];
        data[1] = 0x78; // systolic = 0x0078 = 120
        data[2] = 0x00;
        data[3] = 0x50; // diastolic = 0x0050 = 80
        data[4] = 0x00;
        data[14] = 0x46; // pulse = 70
        data
    }

    #[test]
    fn test_decode_known_packet() {
        let reading = BloodPressureReading::from_bytes(&sample_packet()).unwrap();
        assert_eq!(reading.systolic, 120);
        assert_eq!(reading.diastolic, 80);
        assert_eq!(reading.pulse, 70);
    }

    #[test]
    fn test_decode_every_short_length_fails() {
        for len in 0..BloodPressureReading::MIN_PACKET_LEN {
            let data = vec![0u8; len];
            let result = BloodPressureReading::from_bytes(&data);
            assert!(
                matches!(result, Err(Error::MalformedPacket { expected: 15, actual }) if actual == len),
                "length {} should be rejected",
                len
            );
        }
    }

    #[test]
    fn test_decode_trailing_bytes_ignored() {
        let mut data = sample_packet().to_vec();
        data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let reading = BloodPressureReading::from_bytes(&data).unwrap();
        assert_eq!(reading.systolic, 120);
        assert_eq!(reading.diastolic, 80);
        assert_eq!(reading.pulse, 70);
    }

    #[test]
    fn test_decode_no_range_validation() {
        // Values far outside physiological range still decode; the decoder
        // deliberately applies no plausibility bounds.
        let mut data = [0xFFu8; 15];
        data[0] = 0x00;
        let reading = BloodPressureReading::from_bytes(&data).unwrap();
        assert_eq!(reading.systolic, 65535);
        assert_eq!(reading.diastolic, 65535);
        assert_eq!(reading.pulse, 255);
    }

    #[test]
    fn test_display_format() {
        let reading = BloodPressureReading {
            systolic: 120,
            diastolic: 80,
            pulse: 70,
        };
        assert_eq!(
            reading.to_string(),
            "Systolic: 120 mmHg, Diastolic: 80 mmHg, Pulse: 70 bpm"
        );
    }

    proptest! {
        #[test]
        fn prop_decode_is_deterministic(data in proptest::collection::vec(any::<u8>(), 15..64)) {
            let first = BloodPressureReading::from_bytes(&data).unwrap();
            let second = BloodPressureReading::from_bytes(&data).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_decode_matches_layout(data in proptest::collection::vec(any::<u8>(), 15..64)) {
            let reading = BloodPressureReading::from_bytes(&data).unwrap();
            prop_assert_eq!(reading.systolic, u16::from_le_bytes([data[1], data[2]]));
            prop_assert_eq!(reading.diastolic, u16::from_le_bytes([data[3], data[4]]));
            prop_assert_eq!(reading.pulse, data[14]);
        }
    }
}
