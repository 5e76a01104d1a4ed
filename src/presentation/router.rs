// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dismiss_alert, get_dashboard, health_check, put_profile, stream_dashboard,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/alerts/:kind/dismiss", post(dismiss_alert))
        .route("/profile", put(put_profile))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
