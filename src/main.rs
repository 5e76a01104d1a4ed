// Main entry point - Dependency injection and server setup
use std::{sync::Arc, time::Duration};

use anyhow::Context;
use bike_telemetry::application::dashboard_service::DashboardService;
use bike_telemetry::application::profile_service::ProfileService;
use bike_telemetry::application::realtime_store::RealtimeStore;
use bike_telemetry::application::sync_service::TelemetrySyncService;
use bike_telemetry::infrastructure::config::{load_dashboard_config, StoreSettings};
use bike_telemetry::infrastructure::mock_store::MockStore;
use bike_telemetry::infrastructure::rtdb_client::RtdbClient;
use bike_telemetry::presentation::app_state::AppState;
use bike_telemetry::presentation::router::create_router;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create store client (infrastructure layer)
    let store = open_store(&config.store, &config.sync.telemetry_path)?;

    // Create services (application layer)
    let shutdown = CancellationToken::new();
    let sync = Arc::new(TelemetrySyncService::new(
        store.clone(),
        &config.sync.telemetry_path,
        config.sync.history_capacity,
    ));
    let dashboard_service = DashboardService::new(sync.clone(), shutdown.clone());
    let profile_service = ProfileService::new(store.clone());

    let sync_task = tokio::spawn({
        let sync = sync.clone();
        let shutdown = shutdown.clone();
        async move { sync.run(shutdown).await }
    });

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        profile_service,
    });

    // Build router (presentation layer)
    let router = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!("Starting bike-telemetry dashboard on {}", config.server.bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_shutdown(shutdown.clone()))
        .await?;

    shutdown.cancel();
    let sync_result = sync_task.await.context("Telemetry sync task panicked")?;
    store.close().await;
    sync_result
}

fn open_store(settings: &StoreSettings, telemetry_path: &str) -> anyhow::Result<Arc<dyn RealtimeStore>> {
    if settings.mock {
        let interval = Duration::from_millis(settings.mock_interval_ms);
        tracing::info!("Using mock telemetry store");
        return Ok(Arc::new(MockStore::new(telemetry_path, interval)?));
    }
    Ok(Arc::new(RtdbClient::open(settings)?))
}

async fn wait_for_shutdown(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => {
                tracing::info!("Shutdown requested");
                shutdown.cancel();
            }
            Err(e) => {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                shutdown.cancelled().await;
            }
        },
        _ = shutdown.cancelled() => {}
    }
}
