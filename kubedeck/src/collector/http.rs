use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::ResourceCollector;
use super::quantity::{cpu_millicores, memory_mib};
use crate::domain::{UsageByNamespace, WorkloadUsage};
use crate::utils::http_client::build_client;
use crate::{Error, Result};

const COLLECT_TIMEOUT: Duration = Duration::from_secs(30);

/// One pod as reported by the exporter. Resource fields are quantity strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodSample {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub owner_kind: Option<String>,
    #[serde(default)]
    pub cpu_request: Option<String>,
    #[serde(default)]
    pub cpu_limit: Option<String>,
    #[serde(default)]
    pub memory_request: Option<String>,
    #[serde(default)]
    pub memory_limit: Option<String>,
    #[serde(default)]
    pub cpu_usage: Option<String>,
    #[serde(default)]
    pub memory_usage: Option<String>,
}

/// Collector backed by an HTTP endpoint returning a JSON array of [`PodSample`].
pub struct HttpResourceCollector {
    client: reqwest::Client,
    url: String,
}

impl HttpResourceCollector {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(build_client(COLLECT_TIMEOUT), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ResourceCollector for HttpResourceCollector {
    async fn collect(&self) -> Result<UsageByNamespace> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::collector(format!(
                "exporter returned status {}",
                status.as_u16()
            )));
        }

        let samples: Vec<PodSample> = response.json().await?;
        debug!(samples = samples.len(), "Fetched pod samples");
        Ok(aggregate_samples(samples))
    }
}

/// Keep running pods, normalize their quantities and group them by namespace.
///
/// Unparseable quantities are logged and treated as absent.
pub fn aggregate_samples(samples: Vec<PodSample>) -> UsageByNamespace {
    let mut grouped = UsageByNamespace::new();

    for sample in samples {
        if !sample.phase.eq_ignore_ascii_case("running") {
            continue;
        }

        let cpu = |value: &Option<String>| quantity(value, &sample, cpu_millicores);
        let mem = |value: &Option<String>| quantity(value, &sample, memory_mib);

        let mut usage = WorkloadUsage::new(
            sample.name.clone(),
            cpu(&sample.cpu_limit).unwrap_or(0),
            mem(&sample.memory_limit).unwrap_or(0),
        );
        usage.cpu_request_millicores = cpu(&sample.cpu_request).unwrap_or(0);
        usage.memory_request_mib = mem(&sample.memory_request).unwrap_or(0);
        usage.owner_name = sample.owner_name.clone();
        usage.owner_kind = sample.owner_kind.clone();
        let usage = usage.with_usage(cpu(&sample.cpu_usage), mem(&sample.memory_usage));

        grouped.entry(sample.namespace).or_default().push(usage);
    }

    for workloads in grouped.values_mut() {
        workloads.sort_by(|a, b| a.name.cmp(&b.name));
    }

    grouped
}

fn quantity(
    value: &Option<String>,
    sample: &PodSample,
    parse: fn(&str) -> Result<u64>,
) -> Option<u64> {
    let raw = value.as_deref()?;
    match parse(raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(
                namespace = %sample.namespace,
                pod = %sample.name,
                error = %e,
                "Ignoring unparseable quantity"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(namespace: &str, name: &str, phase: &str) -> PodSample {
        PodSample {
            namespace: namespace.to_string(),
            name: name.to_string(),
            phase: phase.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_aggregate_keeps_running_pods_grouped() {
        let mut api = sample("prod", "api-1", "Running");
        api.cpu_limit = Some("500m".to_string());
        api.cpu_request = Some("250m".to_string());
        api.memory_limit = Some("1Gi".to_string());
        api.memory_request = Some("512Mi".to_string());
        api.cpu_usage = Some("400m".to_string());
        api.memory_usage = Some("256Mi".to_string());
        api.owner_name = Some("api".to_string());
        api.owner_kind = Some("ReplicaSet".to_string());

        let samples = vec![
            api,
            sample("prod", "api-0", "Running"),
            sample("prod", "job-0", "Succeeded"),
            sample("dev", "web-0", "Pending"),
        ];

        let grouped = aggregate_samples(samples);

        assert_eq!(grouped.len(), 1);
        let prod = &grouped["prod"];
        assert_eq!(prod.len(), 2);
        assert_eq!(prod[0].name, "api-0");
        let api = &prod[1];
        assert_eq!(api.cpu_limit_millicores, 500);
        assert_eq!(api.cpu_request_millicores, 250);
        assert_eq!(api.memory_limit_mib, 1024);
        assert_eq!(api.memory_request_mib, 512);
        assert_eq!(api.cpu_percent, Some(80.0));
        assert_eq!(api.memory_percent, Some(25.0));
        assert_eq!(api.owner_kind.as_deref(), Some("ReplicaSet"));
    }

    #[test]
    fn test_bad_quantity_is_treated_as_absent() {
        let mut pod = sample("prod", "api-0", "Running");
        pod.cpu_limit = Some("lots".to_string());
        pod.cpu_usage = Some("100m".to_string());

        let grouped = aggregate_samples(vec![pod]);
        let api = &grouped["prod"][0];
        assert_eq!(api.cpu_limit_millicores, 0);
        assert_eq!(api.cpu_usage_millicores, Some(100));
        assert!(api.cpu_percent.is_none());
    }

    #[test]
    fn test_sample_deserializes_with_missing_fields() {
        let samples: Vec<PodSample> = serde_json::from_str(
            r#"[{"namespace": "prod", "name": "api-0", "phase": "Running", "cpu_limit": "1"}]"#,
        )
        .unwrap();
        assert_eq!(samples[0].cpu_limit.as_deref(), Some("1"));
        assert!(samples[0].memory_limit.is_none());
    }
}
