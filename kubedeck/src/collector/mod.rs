//! Resource usage collection.
//!
//! The check cycle only depends on [`ResourceCollector`]. [`HttpResourceCollector`]
//! reads raw pod samples from an exporter endpoint.

mod http;
pub mod quantity;

pub use http::{HttpResourceCollector, PodSample, aggregate_samples};

use async_trait::async_trait;

use crate::Result;
use crate::domain::UsageByNamespace;

/// Source of per-namespace workload usage.
#[async_trait]
pub trait ResourceCollector: Send + Sync {
    /// Collect usage for all running workloads.
    async fn collect(&self) -> Result<UsageByNamespace>;
}
