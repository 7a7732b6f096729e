//! Notification channels.

mod telegram;

pub use telegram::{TELEGRAM_MESSAGE_LIMIT, TelegramSink, truncate_message};

use async_trait::async_trait;

use crate::Result;

/// A messaging transport that can deliver text to a chat recipient.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Get the channel type name.
    fn channel_type(&self) -> &'static str;

    /// Send `text` to `recipient` authenticated with `credential`.
    ///
    /// Issues exactly one request; failures are not retried.
    async fn send(&self, recipient: i64, text: &str, credential: &str) -> Result<()>;
}
