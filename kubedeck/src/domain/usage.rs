//! Per-workload resource usage as produced by a resource collector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Workload usage grouped by namespace.
///
/// A `BTreeMap` keeps namespace iteration deterministic, which matters for
/// prompts and formatted reports.
pub type UsageByNamespace = BTreeMap<String, Vec<WorkloadUsage>>;

/// Resource requests, limits and observed usage of one workload.
///
/// CPU values are in millicores, memory values in mebibytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadUsage {
    /// Pod name.
    pub name: String,
    /// Name of the owning controller (deployment, statefulset, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    /// Kind of the owning controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_kind: Option<String>,
    pub cpu_request_millicores: u64,
    pub cpu_limit_millicores: u64,
    pub memory_request_mib: u64,
    pub memory_limit_mib: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_usage_millicores: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage_mib: Option<u64>,
    /// Observed CPU usage as a percentage of the limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    /// Observed memory usage as a percentage of the limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_percent: Option<f64>,
    /// Suggested replica count; `None` means no replica change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
}

impl WorkloadUsage {
    /// Create an entry with only limits set.
    pub fn new(name: impl Into<String>, cpu_limit_millicores: u64, memory_limit_mib: u64) -> Self {
        Self {
            name: name.into(),
            cpu_limit_millicores,
            memory_limit_mib,
            ..Default::default()
        }
    }

    /// Attach observed usage and derive percentages against the limits.
    ///
    /// A zero limit leaves the corresponding percentage unset.
    pub fn with_usage(mut self, cpu_millicores: Option<u64>, memory_mib: Option<u64>) -> Self {
        self.cpu_usage_millicores = cpu_millicores;
        self.memory_usage_mib = memory_mib;
        self.cpu_percent = percent_of(cpu_millicores, self.cpu_limit_millicores);
        self.memory_percent = percent_of(memory_mib, self.memory_limit_mib);
        self
    }
}

fn percent_of(used: Option<u64>, limit: u64) -> Option<f64> {
    match used {
        Some(used) if limit > 0 => Some(used as f64 / limit as f64 * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_usage_computes_percentages() {
        let usage = WorkloadUsage::new("api-0", 500, 256).with_usage(Some(400), Some(64));
        assert_eq!(usage.cpu_percent, Some(80.0));
        assert_eq!(usage.memory_percent, Some(25.0));
    }

    #[test]
    fn test_zero_limit_leaves_percent_unset() {
        let usage = WorkloadUsage::new("batch-0", 0, 0).with_usage(Some(100), Some(10));
        assert_eq!(usage.cpu_usage_millicores, Some(100));
        assert!(usage.cpu_percent.is_none());
        assert!(usage.memory_percent.is_none());
    }

    #[test]
    fn test_serializes_camel_case_without_empty_fields() {
        let json = serde_json::to_value(WorkloadUsage::new("web-0", 250, 128)).unwrap();
        assert_eq!(json["cpuLimitMillicores"], 250);
        assert!(json.get("cpuPercent").is_none());
        assert!(json.get("replicas").is_none());
    }
}
