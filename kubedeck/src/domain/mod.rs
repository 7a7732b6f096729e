//! Domain types shared by the collector, the recommendation engine and the
//! alerting core.

pub mod recommendation;
pub mod usage;

pub use recommendation::{FlaggedWorkload, Recommendation, Severity};
pub use usage::{UsageByNamespace, WorkloadUsage};
