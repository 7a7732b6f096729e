//! Health check routes.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};

use crate::api::models::HealthResponse;
use crate::api::server::AppState;
use crate::scheduler::SchedulerState;

/// Create the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let scheduler = state.scheduler.state();
    let status = match scheduler {
        SchedulerState::Running | SchedulerState::Launching => "healthy",
        SchedulerState::Stopped => "starting",
        SchedulerState::Terminated => "stopped",
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        scheduler,
    })
}

/// Readiness check - is the scheduler up?
/// Returns HTTP 200 while launching or running, HTTP 503 otherwise.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.scheduler.state() {
        SchedulerState::Running | SchedulerState::Launching => (StatusCode::OK, "ready"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "not ready"),
    }
}

/// Liveness check - is the service alive?
async fn liveness_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "alive",
            "uptime_secs": uptime
        })),
    )
}
