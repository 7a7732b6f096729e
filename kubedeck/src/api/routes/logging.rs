//! Logging API routes.
//!
//! Provides endpoints to view and modify the log filter at runtime.

use axum::{Json, Router, extract::State, routing::get};

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{LoggingConfigResponse, ModuleInfo, UpdateLogFilterRequest};
use crate::api::server::AppState;
use crate::logging::{LoggingConfig, available_modules};

/// Create the logging router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_logging_config).put(update_logging_config))
}

fn logging_config(state: &AppState) -> ApiResult<&LoggingConfig> {
    state
        .logging_config
        .as_deref()
        .ok_or_else(|| ApiError::internal("Logging configuration not available"))
}

fn response(config: &LoggingConfig) -> LoggingConfigResponse {
    let modules = available_modules()
        .into_iter()
        .map(|(name, desc)| ModuleInfo {
            name: name.to_string(),
            description: desc.to_string(),
        })
        .collect();

    LoggingConfigResponse {
        filter: config.get_filter(),
        available_modules: modules,
    }
}

pub async fn get_logging_config(
    State(state): State<AppState>,
) -> ApiResult<Json<LoggingConfigResponse>> {
    let config = logging_config(&state)?;
    Ok(Json(response(config)))
}

pub async fn update_logging_config(
    State(state): State<AppState>,
    Json(request): Json<UpdateLogFilterRequest>,
) -> ApiResult<Json<LoggingConfigResponse>> {
    let config = logging_config(&state)?;
    config.set_filter(&request.filter)?;
    Ok(Json(response(config)))
}
