// Dashboard domain model - display-ready view of the latest telemetry
use super::alert::{AlertBoard, AlertKind, AlertState};
use super::display::{
    battery_bars, battery_tier, clamp, normalize_for_chart, temperature_tier, BatteryTier,
    ChartPlot, TemperatureTier,
};
use super::history::TelemetryHistory;
use super::telemetry::TelemetrySnapshot;
use serde::Serialize;

pub const CHART_WIDTH: f64 = 320.0;
pub const CHART_HEIGHT: f64 = 90.0;
pub const BATTERY_BARS: u32 = 5;

/// Freshness of the snapshot being shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Nothing received yet
    #[default]
    Connecting,
    Live,
    /// The remote key holds no value
    NoData,
    /// Connection lost; the last snapshot is still displayed
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryGauge {
    pub soc_percent: f64,
    pub tier: BatteryTier,
    pub label: &'static str,
    pub bars: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureBadge {
    pub celsius: f64,
    pub tier: TemperatureTier,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSummary {
    pub smoke: AlertState,
    pub accident: AlertState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub link: LinkStatus,
    pub snapshot: Option<TelemetrySnapshot>,
    pub battery: Option<BatteryGauge>,
    pub temperature: Option<TemperatureBadge>,
    pub speed_history: Vec<f64>,
    pub soc_history: Vec<f64>,
    pub speed_chart: ChartPlot,
    pub soc_chart: ChartPlot,
    pub alerts: AlertSummary,
}

impl DashboardView {
    pub fn build(
        snapshot: Option<&TelemetrySnapshot>,
        link: LinkStatus,
        history: &TelemetryHistory,
        alerts: &AlertBoard,
    ) -> Self {
        // Range clamping happens here, at display time; the snapshot keeps
        // whatever the source reported.
        let battery = snapshot.map(|s| {
            let soc = clamp(s.battery.soc_percent, 0.0, 100.0);
            let tier = battery_tier(soc);
            BatteryGauge {
                soc_percent: soc,
                tier,
                label: tier.label(),
                bars: battery_bars(soc, BATTERY_BARS),
            }
        });

        let temperature = snapshot.map(|s| {
            let tier = temperature_tier(s.battery.temperature_c);
            TemperatureBadge {
                celsius: s.battery.temperature_c,
                tier,
                label: tier.label(),
            }
        });

        let speed_history = history.speed.to_vec();
        let soc_history = history.soc.to_vec();

        Self {
            link,
            snapshot: snapshot.cloned(),
            battery,
            temperature,
            speed_chart: normalize_for_chart(&speed_history, CHART_WIDTH, CHART_HEIGHT),
            soc_chart: normalize_for_chart(&soc_history, CHART_WIDTH, CHART_HEIGHT),
            speed_history,
            soc_history,
            alerts: AlertSummary {
                smoke: alerts.state(AlertKind::Smoke),
                accident: alerts.state(AlertKind::Accident),
            },
        }
    }
}
