use crate::application::store_key::normalize_path;
use crate::domain::history::DEFAULT_HISTORY_CAPACITY;
use anyhow::Context;
use serde::Deserialize;

/// Upper bound for `sync.history_capacity`
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    /// Base URL of the realtime database, e.g. https://<project>.firebaseio.com
    #[serde(default)]
    pub database_url: String,
    pub auth_token: Option<String>,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Serve generated telemetry instead of connecting to the database
    #[serde(default)]
    pub mock: bool,
    #[serde(default = "default_mock_interval_ms")]
    pub mock_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncSettings {
    #[serde(default)]
    pub telemetry_path: String,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_reconnect_delay_ms() -> u64 {
    2000
}

fn default_mock_interval_ms() -> u64 {
    1500
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            auth_token: None,
            reconnect_delay_ms: default_reconnect_delay_ms(),
            mock: false,
            mock_interval_ms: default_mock_interval_ms(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            telemetry_path: String::new(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.store.mock && self.store.database_url.trim().is_empty() {
            anyhow::bail!("store.database_url is required unless store.mock is enabled");
        }
        normalize_path(&self.sync.telemetry_path)
            .context("sync.telemetry_path is not a valid store path")?;
        if self.sync.history_capacity > MAX_HISTORY_CAPACITY {
            anyhow::bail!(
                "sync.history_capacity must be at most {} (got {})",
                MAX_HISTORY_CAPACITY,
                self.sync.history_capacity
            );
        }
        if self.store.mock_interval_ms == 0 {
            anyhow::bail!("store.mock_interval_ms must be greater than zero");
        }
        Ok(())
    }
}

/// Load `config/dashboard.*` (optional) overlaid with `DASHBOARD__*`
/// environment variables, e.g. `DASHBOARD__STORE__MOCK=true`.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
