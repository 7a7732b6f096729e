//! Scheduler module for the periodic alert check.
//!
//! The [`AlertScheduler`] is a supervisor loop. Each launch:
//! - marks the settings store running and takes the current generation token
//! - spawns a check task (immediate cycle, then one per tick) and an hourly
//!   dedup eviction task
//! - waits for shutdown or the generation token, then joins both tasks
//!
//! A generation change relaunches after [`RESTART_DELAY`]; shutdown terminates.

mod service;

pub use service::{
    AlertScheduler, EVICTION_INTERVAL, RESTART_DELAY, SchedulerState, SchedulerStatus,
};
