// Mapper from the flat wire record to the telemetry snapshot
use crate::domain::telemetry::{BatteryReading, Indicators, Safety, TelemetrySnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Record as the bike writes it. Every field is optional; absent, null or
/// wrongly typed fields decode to the type's zero value.
///
/// `HeadlightHigh`, `AccidentAlert` and `Timestamp` are only written by the
/// mock feed; the bike firmware omits them.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct WireRecord {
    #[serde(rename = "Speedometer", default, deserialize_with = "lenient_f64")]
    pub speedometer: f64,
    #[serde(rename = "Current", default, deserialize_with = "lenient_f64")]
    pub current: f64,
    #[serde(rename = "Odometer", default, deserialize_with = "lenient_f64")]
    pub odometer: f64,
    #[serde(rename = "Voltage", default, deserialize_with = "lenient_f64")]
    pub voltage: f64,
    #[serde(rename = "BatteryTemp", default, deserialize_with = "lenient_f64")]
    pub battery_temp: f64,
    #[serde(rename = "Battery", default, deserialize_with = "lenient_f64")]
    pub battery: f64,
    #[serde(rename = "SmokeIndicator", default, deserialize_with = "lenient_bool")]
    pub smoke_indicator: bool,
    #[serde(rename = "LeftIndicator", default, deserialize_with = "lenient_bool")]
    pub left_indicator: bool,
    #[serde(rename = "RightIndicator", default, deserialize_with = "lenient_bool")]
    pub right_indicator: bool,
    #[serde(rename = "Headlight", default, deserialize_with = "lenient_bool")]
    pub headlight: bool,
    #[serde(rename = "HeadlightHigh", default, deserialize_with = "lenient_bool")]
    pub headlight_high: bool,
    #[serde(rename = "AccidentAlert", default, deserialize_with = "lenient_bool")]
    pub accident_alert: bool,
    #[serde(rename = "Timestamp", default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl WireRecord {
    pub fn into_snapshot(self, received_at: DateTime<Utc>) -> TelemetrySnapshot {
        TelemetrySnapshot {
            timestamp: self.timestamp.unwrap_or(received_at),
            speed_kmh: self.speedometer,
            battery: BatteryReading {
                soc_percent: self.battery,
                voltage_v: self.voltage,
                current_a: self.current,
                temperature_c: self.battery_temp,
            },
            indicators: Indicators {
                left_turn: self.left_indicator,
                right_turn: self.right_indicator,
                headlight_high: self.headlight_high,
                headlight_low: self.headlight,
                smoke_detected: self.smoke_indicator,
            },
            safety: Safety {
                accident_alert: self.accident_alert,
            },
            odometer_km: self.odometer,
        }
    }
}

/// Decode a raw store value into a snapshot. Never fails: a value that is
/// not a record at all yields the all-zero snapshot.
pub fn normalize(raw: &Value, received_at: DateTime<Utc>) -> TelemetrySnapshot {
    if !raw.is_object() {
        tracing::debug!("Telemetry value is not a record, using defaults: {}", raw);
        return TelemetrySnapshot::empty(received_at);
    }
    let record = match WireRecord::deserialize(raw) {
        Ok(record) => record,
        Err(e) => {
            tracing::debug!("Telemetry record could not be decoded, using defaults: {}", e);
            WireRecord::default()
        }
    };
    record.into_snapshot(received_at)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(0.0))
}

// Firmware writes indicators as either booleans or 0/1
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_record_defaults_everything_else() {
        let now = Utc::now();
        let snapshot = normalize(&json!({"Speedometer": 42.3}), now);

        assert_eq!(snapshot.speed_kmh, 42.3);
        assert_eq!(snapshot.timestamp, now);
        assert_eq!(snapshot.battery, BatteryReading::default());
        assert_eq!(snapshot.indicators, Indicators::default());
        assert_eq!(snapshot.safety, Safety::default());
        assert_eq!(snapshot.odometer_km, 0.0);
    }

    #[test]
    fn test_full_record_maps_every_field() {
        let raw = json!({
            "Speedometer": 25.5,
            "Current": 7.2,
            "Odometer": 3748.1,
            "Voltage": 51.3,
            "BatteryTemp": 31.0,
            "Battery": 64,
            "SmokeIndicator": false,
            "LeftIndicator": true,
            "RightIndicator": false,
            "Headlight": true
        });
        let snapshot = normalize(&raw, Utc::now());

        assert_eq!(snapshot.speed_kmh, 25.5);
        assert_eq!(snapshot.battery.current_a, 7.2);
        assert_eq!(snapshot.odometer_km, 3748.1);
        assert_eq!(snapshot.battery.voltage_v, 51.3);
        assert_eq!(snapshot.battery.temperature_c, 31.0);
        assert_eq!(snapshot.battery.soc_percent, 64.0);
        assert!(snapshot.indicators.left_turn);
        assert!(!snapshot.indicators.right_turn);
        assert!(snapshot.indicators.headlight_low);
        assert!(!snapshot.indicators.headlight_high);
    }

    #[test]
    fn test_wrong_types_and_nulls_fall_back() {
        let raw = json!({
            "Speedometer": "fast",
            "Battery": null,
            "SmokeIndicator": 1,
            "LeftIndicator": 0,
            "RightIndicator": "yes"
        });
        let snapshot = normalize(&raw, Utc::now());

        assert_eq!(snapshot.speed_kmh, 0.0);
        assert_eq!(snapshot.battery.soc_percent, 0.0);
        assert!(snapshot.indicators.smoke_detected);
        assert!(!snapshot.indicators.left_turn);
        assert!(!snapshot.indicators.right_turn);
    }

    #[test]
    fn test_non_record_value_yields_zero_snapshot() {
        let now = Utc::now();
        assert_eq!(normalize(&json!(17), now), TelemetrySnapshot::empty(now));
        assert_eq!(normalize(&json!([1, 2]), now), TelemetrySnapshot::empty(now));
    }

    #[test]
    fn test_out_of_range_soc_is_kept() {
        let snapshot = normalize(&json!({"Battery": 140}), Utc::now());
        assert_eq!(snapshot.battery.soc_percent, 140.0);
    }

    #[test]
    fn test_record_timestamp_wins() {
        let snapshot = normalize(
            &json!({"Timestamp": "2026-03-01T10:00:00Z", "AccidentAlert": true}),
            Utc::now(),
        );
        assert_eq!(snapshot.timestamp.to_rfc3339(), "2026-03-01T10:00:00+00:00");
        assert!(snapshot.safety.accident_alert);
    }
}
