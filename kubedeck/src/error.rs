//! Application-wide error types.

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Resource collection failed: {0}")]
    Collector(String),

    #[error("Recommendation failed: {0}")]
    Recommendation(String),

    /// The messaging API answered with a non-success status.
    #[error("{}", transport_message(.status, .detail))]
    Transport {
        status: u16,
        detail: Option<serde_json::Value>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

fn transport_message(status: &u16, detail: &Option<serde_json::Value>) -> String {
    match detail {
        Some(detail) => format!("Telegram API error: status code {status}: {detail}"),
        None => format!("Telegram API error: status code {status}"),
    }
}

impl Error {
    pub fn collector(msg: impl Into<String>) -> Self {
        Self::Collector(msg.into())
    }

    pub fn recommendation(msg: impl Into<String>) -> Self {
        Self::Recommendation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether the error came from an external collaborator call.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Collector(_) | Self::Recommendation(_) | Self::Transport { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_with_detail() {
        let err = Error::Transport {
            status: 400,
            detail: Some(serde_json::json!({"ok": false, "description": "chat not found"})),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Telegram API error: status code 400"));
        assert!(msg.contains("chat not found"));
    }

    #[test]
    fn test_transport_error_bare_status() {
        let err = Error::Transport {
            status: 502,
            detail: None,
        };
        assert_eq!(err.to_string(), "Telegram API error: status code 502");
    }

    #[test]
    fn test_upstream_classification() {
        assert!(Error::collector("down").is_upstream());
        assert!(Error::recommendation("timeout").is_upstream());
        assert!(!Error::validation("empty").is_upstream());
        assert!(!Error::config("bad url").is_upstream());
    }
}
