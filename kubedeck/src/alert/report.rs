//! Formatting of the consolidated alert message.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::domain::{FlaggedWorkload, Recommendation, Severity};

/// Maximum workload names listed per namespace.
pub const MAX_LISTED_WORKLOADS: usize = 5;

/// Render one Markdown message covering every flagged workload in
/// `recommendation`. Namespaces appear in sorted order.
pub fn format_alert_message(recommendation: &Recommendation, scanned_at: DateTime<Utc>) -> String {
    let mut out = String::new();

    out.push_str("*Kubernetes resource report*\n\n");
    let _ = writeln!(
        out,
        "*Detected:* {} workloads need attention",
        recommendation.flagged_count()
    );
    let _ = writeln!(
        out,
        "*Scan time:* {}\n",
        scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for (namespace, workloads) in &recommendation.namespaces {
        if workloads.is_empty() {
            continue;
        }
        write_namespace(&mut out, namespace, workloads);
    }

    out
}

fn write_namespace(out: &mut String, namespace: &str, workloads: &[FlaggedWorkload]) {
    let count = |severity: Severity| workloads.iter().filter(|w| w.severity == severity).count();
    let critical = count(Severity::Critical);
    let warning = count(Severity::Warning);
    let info = count(Severity::Info);

    let _ = writeln!(out, "*Namespace:* `{namespace}`");
    let _ = writeln!(out, "*Flagged workloads:* {}", workloads.len());
    if critical > 0 {
        let _ = writeln!(out, "*Critical (immediate action):* {critical}");
    }
    if warning > 0 {
        let _ = writeln!(out, "*Warnings (need attention):* {warning}");
    }
    if info > 0 {
        let _ = writeln!(out, "*Informational:* {info}");
    }

    let listed = if critical > 0 {
        Some(("Critical workloads", Severity::Critical))
    } else if warning > 0 {
        Some(("Workloads with warnings", Severity::Warning))
    } else {
        None
    };

    if let Some((title, severity)) = listed {
        let _ = writeln!(out, "\n*{title}:*");
        for w in workloads
            .iter()
            .filter(|w| w.severity == severity)
            .take(MAX_LISTED_WORKLOADS)
        {
            let _ = writeln!(out, "- `{}`", w.name);
        }
    }

    out.push('\n');
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn recommendation(entries: &[(&str, &str, Severity)]) -> Recommendation {
        let mut rec = Recommendation::default();
        for (ns, name, severity) in entries {
            rec.namespaces
                .entry(ns.to_string())
                .or_default()
                .push(FlaggedWorkload::new(*name, *severity));
        }
        rec
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_header_and_breakdown() {
        let rec = recommendation(&[
            ("prod", "api-0", Severity::Critical),
            ("prod", "api-1", Severity::Warning),
            ("prod", "api-2", Severity::Info),
        ]);

        let msg = format_alert_message(&rec, at());

        assert!(msg.contains("*Detected:* 3 workloads"));
        assert!(msg.contains("2024-05-01 12:30:00 UTC"));
        assert!(msg.contains("*Namespace:* `prod`"));
        assert!(msg.contains("*Critical (immediate action):* 1"));
        assert!(msg.contains("*Warnings (need attention):* 1"));
        assert!(msg.contains("*Informational:* 1"));
        assert!(msg.contains("*Critical workloads:*\n- `api-0`"));
        assert!(!msg.contains("- `api-1`"));
    }

    #[test]
    fn test_lists_warnings_when_no_critical() {
        let rec = recommendation(&[
            ("dev", "web-0", Severity::Warning),
            ("dev", "web-1", Severity::Info),
        ]);
        let msg = format_alert_message(&rec, at());
        assert!(msg.contains("*Workloads with warnings:*\n- `web-0`"));
        assert!(!msg.contains("- `web-1`"));
    }

    #[test]
    fn test_caps_listed_names_and_sorts_namespaces() {
        let names: Vec<String> = (0..7).map(|i| format!("pod-{i}")).collect();
        let mut entries: Vec<(&str, &str, Severity)> = names
            .iter()
            .map(|n| ("zeta", n.as_str(), Severity::Critical))
            .collect();
        entries.push(("alpha", "a-0", Severity::Warning));
        let rec = recommendation(&entries);

        let msg = format_alert_message(&rec, at());

        assert!(msg.contains("- `pod-4`"));
        assert!(!msg.contains("- `pod-5`"));
        let alpha = msg.find("`alpha`").unwrap();
        let zeta = msg.find("`zeta`").unwrap();
        assert!(alpha < zeta);
    }
}
