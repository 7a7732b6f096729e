//! Time-windowed alert deduplication.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tracing::debug;

/// How long an announced workload stays suppressed.
pub const DEDUP_WINDOW_HOURS: i64 = 4;

pub fn dedup_window() -> TimeDelta {
    TimeDelta::hours(DEDUP_WINDOW_HOURS)
}

/// Remembers when each `namespace/workload` identity was last announced.
#[derive(Debug, Default)]
pub struct AlertTracker {
    alerts: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl AlertTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable identity of a flagged workload.
    pub fn identity(namespace: &str, workload: &str) -> String {
        format!("{namespace}/{workload}")
    }

    /// Whether `identity` should be announced now. Records the announcement
    /// when it returns `true`.
    pub fn should_announce(&self, identity: &str) -> bool {
        self.should_announce_at(identity, Utc::now())
    }

    pub fn should_announce_at(&self, identity: &str, now: DateTime<Utc>) -> bool {
        let mut alerts = self.alerts.lock();
        match alerts.get(identity) {
            Some(last) if now - *last < dedup_window() => false,
            _ => {
                alerts.insert(identity.to_string(), now);
                true
            }
        }
    }

    /// Record an announcement at `at`, replacing any earlier record.
    pub fn record_at(&self, identity: &str, at: DateTime<Utc>) {
        self.alerts.lock().insert(identity.to_string(), at);
    }

    /// Drop records older than the dedup window.
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Utc::now())
    }

    pub fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let threshold = now - dedup_window();
        let mut alerts = self.alerts.lock();
        let before = alerts.len();
        alerts.retain(|_, last| *last >= threshold);
        let evicted = before - alerts.len();
        if evicted > 0 {
            debug!(evicted, remaining = alerts.len(), "Evicted expired alert records");
        }
        evicted
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.alerts.lock().contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_announcement_then_suppressed() {
        let tracker = AlertTracker::new();
        let t0 = Utc::now();
        let id = AlertTracker::identity("prod", "api-0");

        assert!(tracker.should_announce_at(&id, t0));
        assert!(!tracker.should_announce_at(&id, t0 + TimeDelta::minutes(1)));
        assert!(!tracker.should_announce_at(&id, t0 + dedup_window() - TimeDelta::seconds(1)));
    }

    #[test]
    fn test_announces_again_after_window() {
        let tracker = AlertTracker::new();
        let t0 = Utc::now();
        let id = AlertTracker::identity("prod", "api-0");

        assert!(tracker.should_announce_at(&id, t0));
        let t1 = t0 + dedup_window();
        assert!(tracker.should_announce_at(&id, t1));
        // The repeat refreshed the record.
        assert!(!tracker.should_announce_at(&id, t1 + TimeDelta::hours(1)));
    }

    #[test]
    fn test_identities_are_independent() {
        let tracker = AlertTracker::new();
        let t0 = Utc::now();
        assert!(tracker.should_announce_at("prod/api-0", t0));
        assert!(tracker.should_announce_at("dev/api-0", t0));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_evict_expired() {
        let tracker = AlertTracker::new();
        let now = Utc::now();
        tracker.record_at("ns/old", now - dedup_window() - TimeDelta::seconds(1));
        tracker.record_at("ns/recent", now - dedup_window() / 2);

        assert_eq!(tracker.evict_expired_at(now), 1);
        assert!(!tracker.contains("ns/old"));
        assert!(tracker.contains("ns/recent"));
        assert!(!tracker.is_empty());
    }
}
