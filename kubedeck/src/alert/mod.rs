//! Alerting core: deduplication, message formatting and the check cycle.

mod cycle;
pub mod dedup;
pub mod report;

pub use cycle::{CheckCycle, CycleOutcome, CycleRun};
pub use dedup::{AlertTracker, DEDUP_WINDOW_HOURS};
pub use report::format_alert_message;
