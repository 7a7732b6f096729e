//! In-memory collaborators shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::collector::ResourceCollector;
use crate::domain::{FlaggedWorkload, Recommendation, Severity, UsageByNamespace, WorkloadUsage};
use crate::notification::NotificationSink;
use crate::recommendation::RecommendationEngine;
use crate::{Error, Result};

pub fn recommendation(entries: &[(&str, &str, Severity)]) -> Recommendation {
    let mut rec = Recommendation {
        message: "test analysis".to_string(),
        ..Default::default()
    };
    for (ns, name, severity) in entries {
        rec.namespaces
            .entry(ns.to_string())
            .or_default()
            .push(FlaggedWorkload::new(*name, *severity));
    }
    rec
}

#[derive(Default)]
pub struct StaticCollector {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StaticCollector {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceCollector for StaticCollector {
    async fn collect(&self) -> Result<UsageByNamespace> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::collector("metrics unavailable"));
        }
        let mut usage = UsageByNamespace::new();
        usage.insert(
            "prod".to_string(),
            vec![WorkloadUsage::new("api-0", 500, 256).with_usage(Some(450), Some(200))],
        );
        Ok(usage)
    }
}

#[derive(Default)]
pub struct StaticEngine {
    pub recommendation: Mutex<Recommendation>,
    pub fail: bool,
    pub styles: Mutex<Vec<String>>,
}

impl StaticEngine {
    pub fn returning(recommendation: Recommendation) -> Self {
        Self {
            recommendation: Mutex::new(recommendation),
            ..Default::default()
        }
    }
}

#[async_trait]
impl RecommendationEngine for StaticEngine {
    async fn recommend(&self, _usage: &UsageByNamespace, style: &str) -> Result<Recommendation> {
        self.styles.lock().push(style.to_string());
        if self.fail {
            return Err(Error::recommendation("model API returned status 500"));
        }
        Ok(self.recommendation.lock().clone())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub failing: Vec<i64>,
    pub sent: Mutex<Vec<(i64, String)>>,
    pub credentials: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn failing(recipients: &[i64]) -> Self {
        Self {
            failing: recipients.to_vec(),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().clone()
    }

    pub fn credentials(&self) -> Vec<String> {
        self.credentials.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn channel_type(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, recipient: i64, text: &str, credential: &str) -> Result<()> {
        self.sent.lock().push((recipient, text.to_string()));
        self.credentials.lock().push(credential.to_string());
        if self.failing.contains(&recipient) {
            return Err(Error::Transport {
                status: 400,
                detail: Some(serde_json::json!({"description": "chat not found"})),
            });
        }
        Ok(())
    }
}
