//! Telegram Bot API notification channel.
//!
//! Sends messages via the Telegram Bot API (`POST /bot<token>/sendMessage`)
//! with Markdown formatting and a single inline button linking to the
//! dashboard.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use super::NotificationSink;
use crate::utils::http_client::build_client;
use crate::{Error, Result};

/// Telegram `sendMessage` text limit (UTF-8 characters).
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Deadline for a single `sendMessage` request.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(15);

const PARSE_MODE: &str = "Markdown";
const BUTTON_TEXT: &str = "Open kubedeck";

/// Telegram notification sink.
pub struct TelegramSink {
    client: Client,
    api_base: String,
    dashboard_url: String,
}

impl TelegramSink {
    /// Create a sink posting to `api_base` (normally `https://api.telegram.org`).
    pub fn new(api_base: impl Into<String>, dashboard_url: impl Into<String>) -> Self {
        Self::with_client(build_client(SEND_TIMEOUT), api_base, dashboard_url)
    }

    pub fn with_client(
        client: Client,
        api_base: impl Into<String>,
        dashboard_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            dashboard_url: dashboard_url.into(),
        }
    }

    fn endpoint(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, token)
    }

    /// Build the `sendMessage` request body.
    fn build_payload(&self, chat_id: i64, text: &str) -> serde_json::Value {
        json!({
            "chat_id": chat_id,
            "text": truncate_message(text, TELEGRAM_MESSAGE_LIMIT),
            "parse_mode": PARSE_MODE,
            "reply_markup": {
                "inline_keyboard": [[
                    { "text": BUTTON_TEXT, "url": self.dashboard_url }
                ]]
            }
        })
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    fn channel_type(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, recipient: i64, text: &str, credential: &str) -> Result<()> {
        let payload = self.build_payload(recipient, text);

        let response = self
            .client
            .post(self.endpoint(credential))
            .json(&payload)
            .send()
            .await
            // The request URL embeds the bot token.
            .map_err(|e| Error::Http(e.without_url()))?;

        let status = response.status();
        if status.is_success() {
            debug!(chat_id = recipient, "Telegram message sent");
            return Ok(());
        }

        // A body that is not JSON degrades to a status-only error.
        let detail = response.json::<serde_json::Value>().await.ok();
        warn!(chat_id = recipient, status = status.as_u16(), "Telegram sendMessage failed");
        Err(Error::Transport {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Truncate a message to fit within the Telegram character limit.
///
/// Cuts at the last line break that fits so Markdown entities, which never
/// span lines in our messages, stay balanced.
pub fn truncate_message(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let suffix = "\n\n[truncated]";
    let budget = limit.saturating_sub(suffix.chars().count());
    let head: String = text.chars().take(budget).collect();
    let kept = match head.rfind('\n') {
        Some(end) => head[..end].trim_end(),
        None => head.as_str(),
    };
    format!("{kept}{suffix}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;

    use super::*;

    fn sink(base: &str) -> TelegramSink {
        TelegramSink::new(base, "https://dash.example.com")
    }

    /// Serve a single `sendMessage` route and count hits.
    async fn serve(status: StatusCode, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/{bot}/sendMessage",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, body)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), hits)
    }

    #[test]
    fn test_payload_shape() {
        let payload = sink("https://api.telegram.org").build_payload(-42, "*hello*");
        assert_eq!(payload["chat_id"], -42);
        assert_eq!(payload["text"], "*hello*");
        assert_eq!(payload["parse_mode"], "Markdown");
        let buttons = payload["reply_markup"]["inline_keyboard"].as_array().unwrap();
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0][0]["url"], "https://dash.example.com");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let sink = sink("http://localhost:8081/");
        assert_eq!(
            sink.endpoint("123:abc"),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_truncate_message() {
        let short = "hello";
        assert_eq!(truncate_message(short, 100), "hello");

        let long: String = "a".repeat(5000);
        let truncated = truncate_message(&long, TELEGRAM_MESSAGE_LIMIT);
        assert!(truncated.chars().count() <= TELEGRAM_MESSAGE_LIMIT);
        assert!(truncated.ends_with("[truncated]"));
    }

    #[test]
    fn test_truncate_keeps_whole_lines() {
        let text: String = (0..400)
            .map(|i| format!("- `workload-{i}` *critical*\n"))
            .collect();

        let truncated = truncate_message(&text, TELEGRAM_MESSAGE_LIMIT);
        let body = truncated.strip_suffix("\n\n[truncated]").unwrap();

        assert!(truncated.chars().count() <= TELEGRAM_MESSAGE_LIMIT);
        assert!(body.ends_with("*critical*"));
        assert_eq!(body.matches('`').count() % 2, 0);
        assert_eq!(body.matches('*').count() % 2, 0);
    }

    #[tokio::test]
    async fn test_send_success_posts_once() {
        let (base, hits) = serve(StatusCode::OK, r#"{"ok": true}"#).await;
        sink(&base).send(1, "hi", "tok").await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_body_is_attached() {
        let (base, hits) = serve(
            StatusCode::BAD_REQUEST,
            r#"{"ok": false, "description": "chat not found"}"#,
        )
        .await;

        let err = sink(&base).send(1, "hi", "tok").await.unwrap_err();
        match err {
            Error::Transport { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail.unwrap()["description"], "chat not found");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_error_body_degrades_to_status() {
        let (base, hits) = serve(StatusCode::TOO_MANY_REQUESTS, "slow down").await;

        let err = sink(&base).send(1, "hi", "tok").await.unwrap_err();
        assert!(matches!(err, Error::Transport { status: 429, detail: None }));
        assert_eq!(err.to_string(), "Telegram API error: status code 429");
        // No retry on rate limiting.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connection_error_hides_token() {
        let token = "123456:SECRETTOKEN";
        let err = sink("http://127.0.0.1:1")
            .send(111, "alert", token)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http(_)));
        assert!(!err.to_string().contains("SECRETTOKEN"));
        assert!(!format!("{err:?}").contains("SECRETTOKEN"));
    }

    #[tokio::test]
    async fn test_hung_request_times_out() {
        let app = Router::new().route(
            "/{bot}/sendMessage",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "late"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let sink = TelegramSink::with_client(
            build_client(Duration::from_millis(200)),
            format!("http://{addr}"),
            "https://dash.example.com",
        );
        let err = sink.send(1, "hi", "tok").await.unwrap_err();

        match err {
            Error::Http(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
