// Telemetry data domain models
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BatteryReading {
    pub soc_percent: f64,
    pub voltage_v: f64,
    pub current_a: f64,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Indicators {
    pub left_turn: bool,
    pub right_turn: bool,
    pub headlight_high: bool,
    pub headlight_low: bool,
    pub smoke_detected: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Safety {
    pub accident_alert: bool,
}

/// One complete reading from the bike. A new snapshot replaces the previous
/// one wholesale; fields are never merged across snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub timestamp: DateTime<Utc>,
    pub speed_kmh: f64,
    pub battery: BatteryReading,
    pub indicators: Indicators,
    pub safety: Safety,
    pub odometer_km: f64,
}

impl TelemetrySnapshot {
    /// All-zero snapshot stamped at `timestamp`
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }
}
