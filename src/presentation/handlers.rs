// HTTP request handlers
use crate::application::realtime_store::StoreError;
use crate::domain::alert::AlertKind;
use crate::domain::dashboard::DashboardView;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ProfileRequest {
    pub username: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct DismissResponse {
    pub alert: AlertKind,
    pub dismissed: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest dashboard view
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.dashboard_service.get_dashboard())
}

/// Live dashboard updates as server-sent events
pub async fn stream_dashboard(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = state
        .dashboard_service
        .stream_dashboard()
        .filter_map(|view| async move {
            match Event::default().event("dashboard").json_data(&view) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    tracing::error!("Failed to serialize dashboard view: {}", e);
                    None
                }
            }
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Close an alert modal
pub async fn dismiss_alert(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let Ok(alert) = kind.parse::<AlertKind>() else {
        return (StatusCode::NOT_FOUND, format!("unknown alert kind: {}", kind)).into_response();
    };

    let dismissed = state.dashboard_service.dismiss_alert(alert);
    Json(DismissResponse { alert, dismissed }).into_response()
}

/// Demo write path: push a user profile upstream
pub async fn put_profile(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProfileRequest>,
) -> impl IntoResponse {
    match state
        .profile_service
        .save(&request.username, &request.email)
    {
        Ok(true) => StatusCode::ACCEPTED.into_response(),
        Ok(false) => (StatusCode::BAD_REQUEST, "email is required").into_response(),
        Err(StoreError::Closed) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        Err(e) => {
            tracing::warn!("Profile write rejected: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}
