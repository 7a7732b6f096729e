//! Recommendation returned by the recommendation engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Severity tier of a flagged workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Parse a severity label, mapping anything unrecognised to `Info`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "warning" | "warn" => Self::Warning,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map(Severity::from_label).unwrap_or_default())
    }
}

/// A workload the engine flagged for attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedWorkload {
    pub name: String,
    /// The engine reports this as `status`.
    #[serde(alias = "status", default)]
    pub severity: Severity,
    /// Suggested CPU in millicores; `None` means no change.
    #[serde(
        default,
        deserialize_with = "deserialize_suggestion",
        skip_serializing_if = "Option::is_none"
    )]
    pub cpu: Option<u64>,
    /// Suggested memory in MiB; `None` means no change.
    #[serde(
        default,
        deserialize_with = "deserialize_suggestion",
        skip_serializing_if = "Option::is_none"
    )]
    pub memory: Option<u64>,
    /// Suggested replica count; `None` means no change.
    #[serde(
        default,
        deserialize_with = "deserialize_suggestion",
        skip_serializing_if = "Option::is_none"
    )]
    pub replicas: Option<u64>,
}

impl FlaggedWorkload {
    pub fn new(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            severity,
            cpu: None,
            memory: None,
            replicas: None,
        }
    }
}

/// Negative numbers (the engine uses `-1`) and nulls mean "no change".
fn deserialize_suggestion<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite() && *v >= 0.0).map(|v| v.round() as u64))
}

/// Output of one recommendation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "deserialize_namespaces")]
    pub namespaces: BTreeMap<String, Vec<FlaggedWorkload>>,
}

fn deserialize_namespaces<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<FlaggedWorkload>>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = Option::<BTreeMap<String, Option<Vec<FlaggedWorkload>>>>::deserialize(deserializer)?;
    Ok(map
        .unwrap_or_default()
        .into_iter()
        .map(|(ns, workloads)| (ns, workloads.unwrap_or_default()))
        .collect())
}

impl Recommendation {
    /// Total number of flagged workloads across all namespaces.
    pub fn flagged_count(&self) -> usize {
        self.namespaces.values().map(Vec::len).sum()
    }

    pub fn has_flagged(&self) -> bool {
        self.flagged_count() > 0
    }

    /// Keep only the workloads for which `keep(namespace, workload)` holds.
    ///
    /// Namespaces left without workloads are removed.
    pub fn retain_flagged<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &FlaggedWorkload) -> bool,
    {
        for (namespace, workloads) in self.namespaces.iter_mut() {
            workloads.retain(|w| keep(namespace, w));
        }
        self.namespaces.retain(|_, workloads| !workloads.is_empty());
    }
}
