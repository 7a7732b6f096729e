//! REST API server module.
//!
//! Provides HTTP endpoints for the alert settings, on-demand analysis,
//! scheduler status, runtime log filters and health probes.

pub mod error;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{ApiServer, ApiServerConfig, AppState};
