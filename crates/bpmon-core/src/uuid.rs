//! Bluetooth UUIDs for the blood pressure profile.
//!
//! These are the standard Bluetooth SIG assigned numbers; the meter exposes
//! the stock Blood Pressure service rather than a vendor-specific one.

use uuid::{Uuid, uuid};

/// Blood Pressure service.
pub const BLOOD_PRESSURE_SERVICE: Uuid = uuid!("00001810-0000-1000-8000-00805f9b34fb");

/// Blood Pressure Measurement characteristic (indicate/notify).
pub const BLOOD_PRESSURE_MEASUREMENT: Uuid = uuid!("00002a35-0000-1000-8000-00805f9b34fb");

/// Generic Access Profile (GAP) service.
pub const GAP_SERVICE: Uuid = uuid!("00001800-0000-1000-8000-00805f9b34fb");

/// Device Information service.
pub const DEVICE_INFO_SERVICE: Uuid = uuid!("0000180a-0000-1000-8000-00805f9b34fb");
