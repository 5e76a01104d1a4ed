// Domain layer - Telemetry models and pure display derivations
pub mod alert;
pub mod dashboard;
pub mod display;
pub mod history;
pub mod telemetry;
