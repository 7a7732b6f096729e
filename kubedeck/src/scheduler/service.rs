//! Alert scheduler service implementation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::alert::{AlertTracker, CheckCycle, CycleRun};
use crate::config::{MAX_CHECK_INTERVAL, mask_token};

/// Pause between a restart signal and the relaunch.
pub const RESTART_DELAY: Duration = Duration::from_secs(1);

/// Period of the dedup eviction task.
pub const EVICTION_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Stopped,
    Launching,
    Running,
    Terminated,
}

/// Point-in-time view of the scheduler for the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub state: SchedulerState,
    pub launches: u64,
    pub generation: u64,
    pub cycles: u64,
    pub check_interval_secs: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<String>,
    pub last_error: Option<String>,
    pub tracked_alerts: usize,
}

#[derive(Debug)]
struct StatusInner {
    state: SchedulerState,
    launches: u64,
    cycles: u64,
    last_cycle_at: Option<DateTime<Utc>>,
    last_outcome: Option<String>,
    last_error: Option<String>,
}

impl StatusInner {
    fn record(&mut self, result: &crate::Result<CycleRun>) {
        self.cycles += 1;
        self.last_cycle_at = Some(Utc::now());
        match result {
            Ok(run) => {
                self.last_outcome = Some(run.outcome.label().to_string());
                self.last_error = None;
            }
            Err(e) => {
                self.last_outcome = None;
                self.last_error = Some(e.to_string());
            }
        }
    }
}

/// Drives the check cycle on a timer and relaunches itself whenever the
/// settings generation is cancelled.
pub struct AlertScheduler {
    cycle: Arc<CheckCycle>,
    status: Arc<Mutex<StatusInner>>,
    restart_delay: Duration,
    eviction_interval: Duration,
}

impl AlertScheduler {
    pub fn new(cycle: Arc<CheckCycle>) -> Self {
        Self {
            cycle,
            status: Arc::new(Mutex::new(StatusInner {
                state: SchedulerState::Stopped,
                launches: 0,
                cycles: 0,
                last_cycle_at: None,
                last_outcome: None,
                last_error: None,
            })),
            restart_delay: RESTART_DELAY,
            eviction_interval: EVICTION_INTERVAL,
        }
    }

    pub fn cycle(&self) -> &Arc<CheckCycle> {
        &self.cycle
    }

    pub fn state(&self) -> SchedulerState {
        self.status.lock().state
    }

    pub fn status(&self) -> SchedulerStatus {
        let settings = self.cycle.settings();
        let inner = self.status.lock();
        SchedulerStatus {
            state: inner.state,
            launches: inner.launches,
            generation: settings.generation_count(),
            cycles: inner.cycles,
            check_interval_secs: settings.check_interval().as_secs(),
            last_cycle_at: inner.last_cycle_at,
            last_outcome: inner.last_outcome.clone(),
            last_error: inner.last_error.clone(),
            tracked_alerts: self.cycle.tracker().len(),
        }
    }

    fn set_state(&self, state: SchedulerState) {
        self.status.lock().state = state;
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// Each launch watches the generation token current at launch. When it
    /// fires, both worker tasks are joined before the relaunch, so two
    /// generations never run cycles at the same time.
    pub async fn run(&self, shutdown: CancellationToken) {
        let settings = self.cycle.settings().clone();

        loop {
            self.set_state(SchedulerState::Launching);
            let generation = settings.mark_running();
            self.status.lock().launches += 1;

            let snapshot = settings.snapshot();
            info!(
                token = %snapshot.masked_token(),
                interval_secs = snapshot.check_interval.as_secs(),
                chat_ids = ?snapshot.chat_ids,
                "Starting alert scheduler"
            );

            let eviction = tokio::spawn(eviction_loop(
                self.cycle.tracker().clone(),
                self.eviction_interval,
                generation.clone(),
                shutdown.clone(),
            ));
            let checker = tokio::spawn(check_loop(
                self.cycle.clone(),
                self.status.clone(),
                generation.clone(),
                shutdown.clone(),
            ));
            self.set_state(SchedulerState::Running);

            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = generation.cancelled() => {}
            }

            for (task, handle) in [("eviction", eviction), ("check", checker)] {
                if let Err(e) = handle.await {
                    error!(task, error = %e, "Alert scheduler task panicked");
                }
            }

            if shutdown.is_cancelled() {
                break;
            }

            info!("Restarting alert scheduler with new settings");
            self.set_state(SchedulerState::Launching);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.restart_delay) => {}
            }
        }

        settings.mark_stopped();
        self.set_state(SchedulerState::Terminated);
        info!(token = %mask_token(&settings.token()), "Alert scheduler stopped");
    }
}

/// Ticker whose first tick is one `period` from now.
///
/// Periods are capped at [`MAX_CHECK_INTERVAL`]; if the first deadline still
/// does not fit in an `Instant`, the ticker fires immediately.
fn new_ticker(period: Duration) -> Interval {
    let period = period.clamp(Duration::from_millis(1), MAX_CHECK_INTERVAL);
    let now = Instant::now();
    let start = now.checked_add(period).unwrap_or(now);
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn eviction_loop(
    tracker: Arc<AlertTracker>,
    period: Duration,
    generation: CancellationToken,
    shutdown: CancellationToken,
) {
    let mut ticker = new_ticker(period);
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = generation.cancelled() => break,
            _ = ticker.tick() => {
                tracker.evict_expired();
            }
        }
    }
    debug!("Alert tracker eviction stopped");
}

async fn check_loop(
    cycle: Arc<CheckCycle>,
    status: Arc<Mutex<StatusInner>>,
    generation: CancellationToken,
    shutdown: CancellationToken,
) {
    let mut period = cycle.settings().check_interval();
    let mut ticker = new_ticker(period);

    if generation.is_cancelled() || !run_cycle(&cycle, &status, &shutdown).await {
        return;
    }

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = generation.cancelled() => break,
            _ = ticker.tick() => {
                let current = cycle.settings().check_interval();
                if current != period {
                    period = current;
                    ticker = new_ticker(period);
                    info!(interval_secs = period.as_secs(), "Updated check interval");
                }
                if !run_cycle(&cycle, &status, &shutdown).await {
                    break;
                }
            }
        }
    }
    debug!("Resource checker stopped");
}

/// Run one cycle unless shutdown interrupts it. Returns `false` on shutdown.
///
/// A generation change does not interrupt a running cycle.
async fn run_cycle(
    cycle: &CheckCycle,
    status: &Mutex<StatusInner>,
    shutdown: &CancellationToken,
) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => false,
        result = cycle.run() => {
            if let Err(e) = &result {
                error!(error = %e, "Alert check cycle failed");
            }
            status.lock().record(&result);
            true
        }
    }
}
