// Alert modal state - opens on a raised flag, closes only on dismissal
use crate::domain::telemetry::TelemetrySnapshot;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Smoke,
    Accident,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::Smoke => f.write_str("smoke"),
            AlertKind::Accident => f.write_str("accident"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown alert kind: {0}")]
pub struct UnknownAlertKind(pub String);

impl FromStr for AlertKind {
    type Err = UnknownAlertKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smoke" => Ok(AlertKind::Smoke),
            "accident" => Ok(AlertKind::Accident),
            other => Err(UnknownAlertKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertTrigger {
    state: AlertState,
}

impl AlertTrigger {
    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == AlertState::Open
    }

    /// Feed the flag from a new snapshot. Returns true when this observation
    /// opened the alert. A lowered flag never closes it.
    pub fn observe(&mut self, flag: bool) -> bool {
        if flag && self.state == AlertState::Closed {
            self.state = AlertState::Open;
            return true;
        }
        false
    }

    /// Returns true if the alert was open
    pub fn dismiss(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = AlertState::Closed;
        was_open
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertBoard {
    smoke: AlertTrigger,
    accident: AlertTrigger,
}

impl AlertBoard {
    /// Kinds opened by this snapshot
    pub fn observe(&mut self, snapshot: &TelemetrySnapshot) -> Vec<AlertKind> {
        let mut opened = Vec::new();
        if self.smoke.observe(snapshot.indicators.smoke_detected) {
            opened.push(AlertKind::Smoke);
        }
        if self.accident.observe(snapshot.safety.accident_alert) {
            opened.push(AlertKind::Accident);
        }
        opened
    }

    pub fn dismiss(&mut self, kind: AlertKind) -> bool {
        self.trigger_mut(kind).dismiss()
    }

    pub fn state(&self, kind: AlertKind) -> AlertState {
        match kind {
            AlertKind::Smoke => self.smoke.state(),
            AlertKind::Accident => self.accident.state(),
        }
    }

    fn trigger_mut(&mut self, kind: AlertKind) -> &mut AlertTrigger {
        match kind {
            AlertKind::Smoke => &mut self.smoke,
            AlertKind::Accident => &mut self.accident,
        }
    }
}
