// Derived display values - clamps, severity tiers and chart geometry
use serde::Serialize;

const CHART_PAD_X: f64 = 5.0;
const CHART_PAD_Y: f64 = 10.0;

/// Clamp `value` into `[lo, hi]`. NaN collapses to `lo`.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryTier {
    Critical,
    Low,
    Medium,
    High,
}

impl BatteryTier {
    pub fn label(self) -> &'static str {
        match self {
            BatteryTier::Critical => "Critical",
            BatteryTier::Low => "Low",
            BatteryTier::Medium => "Medium",
            BatteryTier::High => "High",
        }
    }
}

/// Boundary values fall into the more urgent tier.
pub fn battery_tier(percent: f64) -> BatteryTier {
    if percent.is_nan() || percent <= 15.0 {
        BatteryTier::Critical
    } else if percent <= 40.0 {
        BatteryTier::Low
    } else if percent <= 70.0 {
        BatteryTier::Medium
    } else {
        BatteryTier::High
    }
}

/// Number of lit segments on a `bars`-segment battery icon
pub fn battery_bars(percent: f64, bars: u32) -> u32 {
    let pct = clamp(percent, 0.0, 100.0);
    ((pct / 100.0) * f64::from(bars)).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureTier {
    Cold,
    Normal,
    Warm,
    Hot,
    Critical,
}

impl TemperatureTier {
    pub fn label(self) -> &'static str {
        match self {
            TemperatureTier::Cold => "Cold",
            TemperatureTier::Normal => "Normal",
            TemperatureTier::Warm => "Warm",
            TemperatureTier::Hot => "Hot",
            TemperatureTier::Critical => "Critical",
        }
    }
}

/// Upper bound of each step is exclusive. NaN fails every comparison and
/// lands in `Critical`.
pub fn temperature_tier(celsius: f64) -> TemperatureTier {
    if celsius < 10.0 {
        TemperatureTier::Cold
    } else if celsius < 35.0 {
        TemperatureTier::Normal
    } else if celsius < 45.0 {
        TemperatureTier::Warm
    } else if celsius < 55.0 {
        TemperatureTier::Hot
    } else {
        TemperatureTier::Critical
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "points", rename_all = "snake_case")]
pub enum ChartPlot {
    NoData,
    Points(Vec<ChartPoint>),
}

impl ChartPlot {
    pub fn points(&self) -> &[ChartPoint] {
        match self {
            ChartPlot::NoData => &[],
            ChartPlot::Points(points) => points,
        }
    }
}

/// Map a sample series onto a `width` x `height` canvas, scaled to the
/// series' own min/max. Non-finite samples are dropped first; fewer than two
/// remaining samples is `NoData`. Every returned coordinate is finite.
pub fn normalize_for_chart(samples: &[f64], width: f64, height: f64) -> ChartPlot {
    let clean: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if clean.len() < 2 {
        return ChartPlot::NoData;
    }

    // Halved so that `max - min` cannot overflow for any finite pair
    let min = clean.iter().copied().fold(f64::INFINITY, f64::min) / 2.0;
    let max = clean.iter().copied().fold(f64::NEG_INFINITY, f64::max) / 2.0;
    let range = if max > min { max - min } else { 1.0 };
    let last = (clean.len() - 1) as f64;

    let points = clean
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = (i as f64 / last) * (width - 2.0 * CHART_PAD_X) + CHART_PAD_X;
            let y = height - ((v / 2.0 - min) / range) * (height - 2.0 * CHART_PAD_Y) - CHART_PAD_Y;
            ChartPoint {
                x: if x.is_finite() { x } else { 0.0 },
                y: if y.is_finite() { y } else { height / 2.0 },
            }
        })
        .collect();

    ChartPlot::Points(points)
}
