//! One collect, recommend, decide, format and dispatch pass.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::dedup::AlertTracker;
use super::report::format_alert_message;
use crate::Result;
use crate::collector::ResourceCollector;
use crate::config::SettingsStore;
use crate::domain::Recommendation;
use crate::notification::{DispatchReport, NotificationSink, dispatch};
use crate::recommendation::RecommendationEngine;

/// How a completed check cycle ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The engine flagged nothing.
    NothingToReport,
    /// Every flagged workload was announced within the dedup window.
    Suppressed { flagged: usize },
    /// A message was sent to the recipients.
    Dispatched {
        flagged: usize,
        announced: usize,
        report: DispatchReport,
    },
}

impl CycleOutcome {
    /// Short label for status reporting.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NothingToReport => "nothing_to_report",
            Self::Suppressed { .. } => "suppressed",
            Self::Dispatched { .. } => "dispatched",
        }
    }
}

/// Result of a full cycle: the engine's unfiltered answer and the outcome.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRun {
    pub recommendation: Recommendation,
    #[serde(flatten)]
    pub outcome: CycleOutcome,
}

/// The check cycle and its collaborators.
pub struct CheckCycle {
    collector: Arc<dyn ResourceCollector>,
    engine: Arc<dyn RecommendationEngine>,
    sink: Arc<dyn NotificationSink>,
    settings: Arc<SettingsStore>,
    tracker: Arc<AlertTracker>,
    dedup_enabled: bool,
}

impl CheckCycle {
    pub fn new(
        collector: Arc<dyn ResourceCollector>,
        engine: Arc<dyn RecommendationEngine>,
        sink: Arc<dyn NotificationSink>,
        settings: Arc<SettingsStore>,
        tracker: Arc<AlertTracker>,
    ) -> Self {
        Self {
            collector,
            engine,
            sink,
            settings,
            tracker,
            dedup_enabled: true,
        }
    }

    /// Enable or disable per-workload deduplication.
    pub fn with_dedup(mut self, enabled: bool) -> Self {
        self.dedup_enabled = enabled;
        self
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn tracker(&self) -> &Arc<AlertTracker> {
        &self.tracker
    }

    /// Collect usage and ask the engine for recommendations, without
    /// notifying anyone.
    pub async fn analyze(&self) -> Result<Recommendation> {
        let usage = self.collector.collect().await?;
        debug!(namespaces = usage.len(), "Collected workload usage");

        let style = self.settings.response_style();
        self.engine.recommend(&usage, &style).await
    }

    /// Run one full cycle.
    ///
    /// Collector and engine failures abort the cycle before anything is sent.
    /// Delivery failures are reported per recipient in the outcome.
    pub async fn run(&self) -> Result<CycleRun> {
        let recommendation = self.analyze().await?;

        let flagged = recommendation.flagged_count();
        if flagged == 0 {
            info!("No flagged workloads found");
            return Ok(CycleRun {
                recommendation,
                outcome: CycleOutcome::NothingToReport,
            });
        }

        let mut to_announce = recommendation.clone();
        if self.dedup_enabled {
            to_announce.retain_flagged(|namespace, workload| {
                self.tracker
                    .should_announce(&AlertTracker::identity(namespace, &workload.name))
            });
        }

        let announced = to_announce.flagged_count();
        if announced == 0 {
            info!(flagged, "All flagged workloads were announced recently");
            return Ok(CycleRun {
                recommendation,
                outcome: CycleOutcome::Suppressed { flagged },
            });
        }

        let message = format_alert_message(&to_announce, Utc::now());
        let recipients = self.settings.chat_ids();
        let token = self.settings.token();
        if token.is_empty() {
            warn!("Bot token is not configured; delivery will fail");
        }

        let report = dispatch(self.sink.as_ref(), &recipients, &message, &token).await;
        info!(
            flagged,
            announced,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Alert cycle dispatched"
        );

        Ok(CycleRun {
            recommendation,
            outcome: CycleOutcome::Dispatched {
                flagged,
                announced,
                report,
            },
        })
    }
}
