//! Configuration module.
//!
//! [`AppConfig`] is read once from the environment at startup. The
//! [`SettingsStore`] holds the subset that can change while the service runs.

pub mod app;
pub mod settings;

pub use app::{AppConfig, LlmConfig};
pub use settings::{
    AlertSettings, MAX_CHECK_INTERVAL, SettingsSnapshot, SettingsStore, SettingsUpdate, mask_token,
};
