//! Synthetic telemetry for demos without a bike attached
//!
//! Produces wire-shaped records so generated data goes through exactly the
//! same normalization as live data.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

pub struct MockTelemetryGenerator {
    rng: StdRng,
}

impl MockTelemetryGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sequence for tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_record(&mut self) -> Value {
        let rng = &mut self.rng;
        json!({
            "Timestamp": Utc::now().to_rfc3339(),
            "Speedometer": rng.gen_range(15.0..60.0),
            "Battery": rng.gen_range(0..100),
            "Voltage": rng.gen_range(48.0..54.0),
            "Current": rng.gen_range(0.0..15.0),
            "BatteryTemp": rng.gen_range(20.0..40.0),
            "LeftIndicator": rng.gen_bool(0.15),
            "RightIndicator": rng.gen_bool(0.15),
            "HeadlightHigh": rng.gen_bool(0.15),
            "Headlight": rng.gen_bool(0.4),
            "SmokeIndicator": rng.gen_bool(0.03),
            "AccidentAlert": rng.gen_bool(0.015),
            "Odometer": rng.gen_range(3747.5..3757.5),
        })
    }
}

impl Default for MockTelemetryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::wire_record::normalize;

    #[test]
    fn test_generated_values_stay_in_range() {
        let mut generator = MockTelemetryGenerator::with_seed(7);
        for _ in 0..500 {
            let snapshot = normalize(&generator.next_record(), Utc::now());

            assert!((15.0..60.0).contains(&snapshot.speed_kmh));
            assert!((0.0..100.0).contains(&snapshot.battery.soc_percent));
            assert_eq!(snapshot.battery.soc_percent.fract(), 0.0);
            assert!((48.0..54.0).contains(&snapshot.battery.voltage_v));
            assert!((0.0..15.0).contains(&snapshot.battery.current_a));
            assert!((20.0..40.0).contains(&snapshot.battery.temperature_c));
            assert!((3747.5..3757.5).contains(&snapshot.odometer_km));
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = MockTelemetryGenerator::with_seed(42);
        let mut b = MockTelemetryGenerator::with_seed(42);
        let (ra, rb) = (a.next_record(), b.next_record());

        assert_eq!(ra["Speedometer"], rb["Speedometer"]);
        assert_eq!(ra["Battery"], rb["Battery"]);
    }

    #[test]
    fn test_flags_eventually_raise() {
        let mut generator = MockTelemetryGenerator::with_seed(3);
        let smoke = (0..2000)
            .map(|_| generator.next_record())
            .filter(|r| r["SmokeIndicator"] == json!(true))
            .count();

        assert!(smoke > 0);
        assert!(smoke < 200);
    }
}
