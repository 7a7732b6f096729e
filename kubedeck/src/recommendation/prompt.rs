use std::fmt::Write;

use crate::domain::UsageByNamespace;

const INSTRUCTIONS: &str = r#"Analyze the following Kubernetes pod resource usage and recommend resource adjustments.
Identify pods that are over- or under-provisioned based on their usage.
Respond ONLY with JSON in the following shape, without any other text:

{
  "message": "overall analysis and recommendations",
  "namespaces": {
    "namespace-name": [
      {
        "name": "pod-name",
        "cpu": 500,
        "memory": 128,
        "status": "warning"
      }
    ]
  }
}

Rules:
1. "cpu" is the recommended CPU limit in millicores and "memory" the recommended memory limit in Mi. Use -1 when no change is needed.
2. CPU usage consistently below 30% of the limit: suggest lowering the CPU limit (status=warning).
3. CPU usage consistently above 80% of the limit: suggest raising the CPU limit (status=critical).
4. Memory usage consistently below 40% of the limit: suggest lowering the memory limit (status=warning).
5. Memory usage consistently above 75% of the limit: suggest raising the memory limit (status=critical).
6. Only include pods that need at least one adjustment.
7. "status" is one of "info", "warning" or "critical".
"#;

/// Build the prompt sent to the recommendation model.
pub fn build_prompt(usage: &UsageByNamespace, style: &str) -> String {
    let mut prompt = String::from(INSTRUCTIONS);

    let style = style.trim();
    if !style.is_empty() {
        let _ = writeln!(prompt, "\nWrite the \"message\" field in this style: {style}");
    }

    prompt.push_str("\nCurrent resource data by namespace:\n\n");

    for (namespace, workloads) in usage {
        let _ = writeln!(prompt, "Namespace: {namespace}");
        for w in workloads {
            let _ = writeln!(prompt, "- Pod: {}", w.name);
            match (w.cpu_usage_millicores, w.cpu_percent) {
                (Some(used), Some(pct)) => {
                    let _ = writeln!(
                        prompt,
                        "  CPU limit: {}m, usage: {}m ({:.1}%)",
                        w.cpu_limit_millicores, used, pct
                    );
                }
                _ => {
                    let _ = writeln!(
                        prompt,
                        "  CPU limit: {}m, usage: unknown",
                        w.cpu_limit_millicores
                    );
                }
            }
            match (w.memory_usage_mib, w.memory_percent) {
                (Some(used), Some(pct)) => {
                    let _ = writeln!(
                        prompt,
                        "  Memory limit: {}Mi, usage: {}Mi ({:.1}%)",
                        w.memory_limit_mib, used, pct
                    );
                }
                _ => {
                    let _ = writeln!(
                        prompt,
                        "  Memory limit: {}Mi, usage: unknown",
                        w.memory_limit_mib
                    );
                }
            }
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "Return ONLY the JSON object described above, without Markdown fences or any text before or after it.",
    );
    prompt
}
