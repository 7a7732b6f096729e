//! Fan-out of one alert message to every recipient.

use serde::Serialize;
use tracing::{info, warn};

use super::NotificationSink;

/// A recipient whose delivery failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientFailure {
    pub recipient: i64,
    pub error: String,
}

/// Per-recipient outcome of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    pub delivered: Vec<i64>,
    pub failed: Vec<RecipientFailure>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Send `text` to every recipient in order.
///
/// A failure for one recipient is logged and does not stop delivery to the
/// others.
pub async fn dispatch(
    sink: &dyn NotificationSink,
    recipients: &[i64],
    text: &str,
    credential: &str,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for &recipient in recipients {
        match sink.send(recipient, text, credential).await {
            Ok(()) => {
                info!(
                    channel = sink.channel_type(),
                    chat_id = recipient,
                    "Sent alert summary"
                );
                report.delivered.push(recipient);
            }
            Err(e) => {
                warn!(
                    channel = sink.channel_type(),
                    chat_id = recipient,
                    error = %e,
                    "Failed to send alert summary"
                );
                report.failed.push(RecipientFailure {
                    recipient,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
