//! Alert settings, analyze-now and scheduler status routes.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{AnalyzeQuery, AnalyzeResponse, SettingsUpdateResponse, SettingsView};
use crate::api::server::AppState;
use crate::config::{SettingsUpdate, mask_token};
use crate::scheduler::SchedulerStatus;

/// Create the alerts router.
///
/// - `GET /config` - effective settings with a masked token
/// - `POST /config` - apply a partial settings update
/// - `POST /analyze` - run one analysis (`?notify=true` for a full cycle)
/// - `GET /status` - scheduler status
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", get(get_settings).post(update_settings))
        .route("/analyze", post(analyze))
        .route("/status", get(status))
}

async fn get_settings(State(state): State<AppState>) -> Json<SettingsView> {
    let snapshot = state.scheduler.cycle().settings().snapshot();
    Json(SettingsView::from(snapshot))
}

async fn update_settings(
    State(state): State<AppState>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> ApiResult<Json<SettingsUpdateResponse>> {
    let Json(update) =
        payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    if !update.is_effective() {
        return Err(ApiError::bad_request(
            "At least one of token, checkInterval, chatIDs or responseStyle must be specified",
        ));
    }

    let settings = state.scheduler.cycle().settings();
    let before = settings.snapshot();
    let changed = settings.apply_update(&update);
    let after = settings.snapshot();

    info!(
        changed,
        token_updated = update.token_supplied(),
        old_token = %mask_token(&before.token),
        new_token = %mask_token(&after.token),
        old_interval = before.check_interval.as_secs(),
        new_interval = after.check_interval.as_secs(),
        old_chat_ids = ?before.chat_ids,
        new_chat_ids = ?after.chat_ids,
        "Alert settings update"
    );

    Ok(Json(SettingsUpdateResponse::new(&update, changed, &after)))
}

async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let cycle = state.scheduler.cycle();
    let response = if query.notify {
        AnalyzeResponse::Cycle(cycle.run().await?)
    } else {
        AnalyzeResponse::Recommendation(cycle.analyze().await?)
    };
    Ok(Json(response))
}

async fn status(State(state): State<AppState>) -> Json<SchedulerStatus> {
    Json(state.scheduler.status())
}
