//! Alert delivery.
//!
//! [`NotificationSink`] posts one message to one recipient. [`dispatch`] fans a
//! message out to every recipient and reports per-recipient outcomes.

pub mod channels;
mod dispatch;

pub use channels::{NotificationSink, TelegramSink};
pub use dispatch::{DispatchReport, RecipientFailure, dispatch};
