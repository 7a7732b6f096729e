//! kubedeck alerting library crate.
//!
//! Periodically collects Kubernetes workload usage, asks a recommendation
//! engine which workloads need attention and notifies Telegram chats.

pub mod alert;
pub mod api;
pub mod collector;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod notification;
pub mod recommendation;
pub mod scheduler;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
