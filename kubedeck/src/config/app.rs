//! Process-level configuration loaded from environment variables.
//!
//! | Variable                    | Required | Default                      |
//! |-----------------------------|----------|------------------------------|
//! | `COLLECTOR_URL`             | yes      |                              |
//! | `LLM_API_URL`               | yes      |                              |
//! | `LLM_MODEL`                 | yes      |                              |
//! | `LLM_API_KEY`               | no       |                              |
//! | `TELEGRAM_BOT_TOKEN`        | no       | empty                        |
//! | `TELEGRAM_API_BASE`         | no       | `https://api.telegram.org`   |
//! | `ALERT_CHECK_INTERVAL_SECS` | no       | `2700`                       |
//! | `ALERT_CHAT_IDS`            | no       | built-in default chat        |
//! | `ALERT_RESPONSE_STYLE`      | no       | technical report             |
//! | `ALERT_DEDUP_ENABLED`       | no       | `true`                       |
//! | `DASHBOARD_URL`             | no       | `http://localhost:3000`      |
//! | `LOG_DIR`                   | no       | console logging only         |

use std::time::Duration;

use url::Url;

use super::settings::{AlertSettings, DEFAULT_RESPONSE_STYLE, MAX_CHECK_INTERVAL};
use crate::{Error, Result};

const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_DASHBOARD_URL: &str = "http://localhost:3000";

/// Timeout for a single recommendation request.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(45);

/// Settings of the hosted recommendation model.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Initial values for the live settings store.
    pub alert: AlertSettings,
    /// Whether flagged workloads pass through the dedup tracker.
    pub dedup_enabled: bool,
    pub telegram_api_base: String,
    /// Dashboard link attached to every notification.
    pub dashboard_url: String,
    pub collector_url: String,
    pub llm: LlmConfig,
    pub log_dir: Option<String>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| Error::config(format!("{key} must be set")))
        };

        let mut alert = AlertSettings::default();
        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            alert.token = token;
        }
        if let Some(raw) = get("ALERT_CHECK_INTERVAL_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                Error::config(format!("ALERT_CHECK_INTERVAL_SECS is not a number: {raw}"))
            })?;
            if secs == 0 {
                return Err(Error::config("ALERT_CHECK_INTERVAL_SECS must be positive"));
            }
            if secs > MAX_CHECK_INTERVAL.as_secs() {
                return Err(Error::config(format!(
                    "ALERT_CHECK_INTERVAL_SECS must be at most {}",
                    MAX_CHECK_INTERVAL.as_secs()
                )));
            }
            alert.check_interval = Duration::from_secs(secs);
        }
        if let Some(raw) = get("ALERT_CHAT_IDS") {
            alert.chat_ids = parse_chat_ids(&raw)?;
        }
        alert.response_style =
            get("ALERT_RESPONSE_STYLE").unwrap_or_else(|| DEFAULT_RESPONSE_STYLE.to_string());

        let dedup_enabled = match get("ALERT_DEDUP_ENABLED") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| Error::config(format!("ALERT_DEDUP_ENABLED is not a bool: {raw}")))?,
            None => true,
        };

        let telegram_api_base = validated_url(
            "TELEGRAM_API_BASE",
            get("TELEGRAM_API_BASE").unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
        )?;
        let dashboard_url = validated_url(
            "DASHBOARD_URL",
            get("DASHBOARD_URL").unwrap_or_else(|| DEFAULT_DASHBOARD_URL.to_string()),
        )?;
        let collector_url = validated_url("COLLECTOR_URL", require("COLLECTOR_URL")?)?;

        let llm = LlmConfig {
            api_url: validated_url("LLM_API_URL", require("LLM_API_URL")?)?,
            api_key: get("LLM_API_KEY"),
            model: require("LLM_MODEL")?,
            timeout: DEFAULT_LLM_TIMEOUT,
        };

        Ok(Self {
            alert,
            dedup_enabled,
            telegram_api_base: telegram_api_base.trim_end_matches('/').to_string(),
            dashboard_url,
            collector_url,
            llm,
            log_dir: get("LOG_DIR"),
        })
    }
}

/// Parse a comma separated list of chat ids.
pub fn parse_chat_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| Error::config(format!("Invalid chat id: {part}")))
        })
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn validated_url(key: &str, value: String) -> Result<String> {
    let parsed =
        Url::parse(&value).map_err(|e| Error::config(format!("{key} is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(value),
        scheme => Err(Error::config(format!(
            "{key} must use http or https, got {scheme}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("COLLECTOR_URL", "http://exporter:9100/pods"),
        ("LLM_API_URL", "https://llm.example.com/api/chat/completions"),
        ("LLM_MODEL", "test-model"),
    ];

    #[test]
    fn test_defaults_with_required_vars() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.alert.check_interval, Duration::from_secs(2700));
        assert!(config.alert.token.is_empty());
        assert!(config.dedup_enabled);
        assert_eq!(config.telegram_api_base, "https://api.telegram.org");
        assert_eq!(config.llm.timeout, Duration::from_secs(45));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("ALERT_CHECK_INTERVAL_SECS", "60"),
            ("ALERT_CHAT_IDS", "111, -222,"),
            ("ALERT_DEDUP_ENABLED", "off"),
            ("TELEGRAM_API_BASE", "http://127.0.0.1:8081/"),
            ("LOG_DIR", "/var/log/kubedeck"),
        ]);
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.alert.token, "123:abc");
        assert_eq!(config.alert.check_interval, Duration::from_secs(60));
        assert_eq!(config.alert.chat_ids, vec![111, -222]);
        assert!(!config.dedup_enabled);
        assert_eq!(config.telegram_api_base, "http://127.0.0.1:8081");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/kubedeck"));
    }

    #[test]
    fn test_missing_required_var() {
        let err = AppConfig::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(err.to_string().contains("LLM_MODEL must be set"));
    }

    #[test]
    fn test_rejects_zero_interval_and_bad_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ALERT_CHECK_INTERVAL_SECS", "0"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ALERT_CHECK_INTERVAL_SECS", "18446744073709551615"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("at most"));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ALERT_CHAT_IDS", "12,abc"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DASHBOARD_URL", "ftp://example.com"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }
}
