//! API request and response models.

use serde::{Deserialize, Serialize};

use crate::alert::CycleRun;
use crate::config::{SettingsSnapshot, SettingsUpdate};
use crate::domain::Recommendation;
use crate::scheduler::SchedulerState;

// ============================================================================
// Alert settings
// ============================================================================

/// Which fields of a settings update were supplied, plus the effective values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedSettings {
    pub token_updated: bool,
    pub interval_updated: bool,
    #[serde(rename = "chatIDsUpdated")]
    pub chat_ids_updated: bool,
    pub style_updated: bool,
    /// Effective check interval in seconds.
    pub current_interval: u64,
    #[serde(rename = "currentChatIDs")]
    pub current_chat_ids: Vec<i64>,
}

/// Response to `POST /api/alerts/config`. The bot token is never echoed.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsUpdateResponse {
    pub success: bool,
    pub message: String,
    pub changed: bool,
    pub settings: UpdatedSettings,
}

impl SettingsUpdateResponse {
    pub fn new(update: &SettingsUpdate, changed: bool, current: &SettingsSnapshot) -> Self {
        Self {
            success: true,
            message: "Alert settings updated successfully".to_string(),
            changed,
            settings: UpdatedSettings {
                token_updated: update.token_supplied(),
                interval_updated: update.interval_supplied(),
                chat_ids_updated: update.chat_ids_supplied(),
                style_updated: update.style_supplied(),
                current_interval: current.check_interval.as_secs(),
                current_chat_ids: current.chat_ids.clone(),
            },
        }
    }
}

/// Effective settings as returned by `GET /api/alerts/config`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    /// Masked bot token.
    pub token: String,
    pub check_interval: u64,
    #[serde(rename = "chatIDs")]
    pub chat_ids: Vec<i64>,
    pub response_style: String,
    pub running: bool,
}

impl From<SettingsSnapshot> for SettingsView {
    fn from(snapshot: SettingsSnapshot) -> Self {
        Self {
            token: snapshot.masked_token(),
            check_interval: snapshot.check_interval.as_secs(),
            chat_ids: snapshot.chat_ids,
            response_style: snapshot.response_style,
            running: snapshot.running,
        }
    }
}

// ============================================================================
// Analyze now
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeQuery {
    /// Run the full cycle, including delivery.
    #[serde(default)]
    pub notify: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Recommendation(Recommendation),
    Cycle(CycleRun),
}

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub scheduler: SchedulerState,
}

// ============================================================================
// Logging
// ============================================================================

/// Request to update the log filter.
#[derive(Debug, Deserialize)]
pub struct UpdateLogFilterRequest {
    pub filter: String,
}

#[derive(Debug, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub description: String,
}

/// Response for logging configuration.
#[derive(Debug, Serialize)]
pub struct LoggingConfigResponse {
    pub filter: String,
    pub available_modules: Vec<ModuleInfo>,
}
