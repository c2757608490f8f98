use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::HealthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodHealth {
    pub namespace: String,
    pub name: String,
    pub healthy: bool,
    /// The failing condition's `type` (e.g. `Ready`), when unhealthy.
    pub condition_type: Option<String>,
    /// The failing condition's `status` (e.g. `"False"`), when unhealthy.
    pub condition_status: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PodHealthSummary {
    pub pods: Vec<PodHealth>,
    pub healthy_count: usize,
    pub total_count: usize,
}

/// Walks every `core_v1_pods.json` under `resources/ns/` and derives
/// per-pod health: a pod is healthy iff its phase is `Running` or
/// `Succeeded`; otherwise the first non-`True` condition's type, status,
/// reason, and message are recorded (§4.8, §8 scenario 8).
pub fn summarize_pod_health(run_root: &Path) -> Result<PodHealthSummary, HealthError> {
    let ns_root = run_root.join("resources").join("ns");
    if !ns_root.exists() {
        return Ok(PodHealthSummary::default());
    }

    let mut pods = Vec::new();
    for entry in WalkDir::new(&ns_root).into_iter().filter_map(Result::ok) {
        if entry.file_name() != "core_v1_pods.json" {
            continue;
        }
        let body = std::fs::read_to_string(entry.path()).map_err(|e| HealthError::Io {
            path: entry.path().display().to_string(),
            source: e,
        })?;
        let list: Value = serde_json::from_str(&body)?;
        for item in list.get("items").and_then(Value::as_array).into_iter().flatten() {
            pods.push(pod_health_from(item));
        }
    }

    let healthy_count = pods.iter().filter(|p| p.healthy).count();
    let total_count = pods.len();
    Ok(PodHealthSummary {
        pods,
        healthy_count,
        total_count,
    })
}

fn pod_health_from(pod: &Value) -> PodHealth {
    let namespace = pod
        .pointer("/metadata/namespace")
        .and_then(Value::as_str)
        .unwrap_or("default")
        .to_string();
    let name = pod
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let phase = pod.pointer("/status/phase").and_then(Value::as_str).unwrap_or("");
    let healthy = phase == "Running" || phase == "Succeeded";

    let (condition_type, condition_status, reason, message) = if healthy {
        (None, None, None, None)
    } else {
        first_unhealthy_condition(pod)
    };

    PodHealth {
        namespace,
        name,
        healthy,
        condition_type,
        condition_status,
        reason,
        message,
    }
}

type ConditionDetail = (Option<String>, Option<String>, Option<String>, Option<String>);

fn first_unhealthy_condition(pod: &Value) -> ConditionDetail {
    pod.pointer("/status/conditions")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|c| c.get("status").and_then(Value::as_str) != Some("True"))
        .map(|c| {
            (
                c.get("type").and_then(Value::as_str).map(str::to_string),
                c.get("status").and_then(Value::as_str).map(str::to_string),
                c.get("reason").and_then(Value::as_str).map(str::to_string),
                c.get("message").and_then(Value::as_str).map(str::to_string),
            )
        })
        .unwrap_or((None, None, None, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_pods(dir: &Path, namespace: &str, pods: Value) {
        let ns_dir = dir.path_join(namespace);
        std::fs::create_dir_all(&ns_dir).unwrap();
        std::fs::write(ns_dir.join("core_v1_pods.json"), pods.to_string()).unwrap();
    }

    trait DirExt {
        fn path_join(&self, namespace: &str) -> std::path::PathBuf;
    }
    impl DirExt for tempfile::TempDir {
        fn path_join(&self, namespace: &str) -> std::path::PathBuf {
            self.path().join("resources").join("ns").join(namespace)
        }
    }

    #[test]
    fn running_and_succeeded_count_as_healthy() {
        let dir = tempdir().unwrap();
        write_pods(
            &dir,
            "default",
            json!({"items": [
                {"metadata": {"namespace": "default", "name": "a"}, "status": {"phase": "Running"}},
                {"metadata": {"namespace": "default", "name": "b"}, "status": {"phase": "Succeeded"}},
                {"metadata": {"namespace": "default", "name": "c"}, "status": {"phase": "Pending"}},
            ]}),
        );

        let summary = summarize_pod_health(dir.path()).unwrap();
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.healthy_count, 2);
    }

    #[test]
    fn unhealthy_pod_records_first_non_true_condition() {
        let dir = tempdir().unwrap();
        write_pods(
            &dir,
            "kube-system",
            json!({"items": [
                {"metadata": {"namespace": "kube-system", "name": "broken"}, "status": {
                    "phase": "Pending",
                    "conditions": [
                        {"type": "Ready", "status": "False", "reason": "Unschedulable", "message": "no nodes available"},
                    ],
                }},
            ]}),
        );

        let summary = summarize_pod_health(dir.path()).unwrap();
        assert_eq!(summary.pods[0].condition_type.as_deref(), Some("Ready"));
        assert_eq!(summary.pods[0].condition_status.as_deref(), Some("False"));
        assert_eq!(summary.pods[0].reason.as_deref(), Some("Unschedulable"));
        assert_eq!(summary.pods[0].message.as_deref(), Some("no nodes available"));
    }

    #[test]
    fn aggregates_across_multiple_namespace_files() {
        let dir = tempdir().unwrap();
        write_pods(&dir, "ns-a", json!({"items": [{"metadata": {"namespace": "ns-a", "name": "a"}, "status": {"phase": "Running"}}]}));
        write_pods(&dir, "ns-b", json!({"items": [{"metadata": {"namespace": "ns-b", "name": "b"}, "status": {"phase": "Running"}}]}));

        let summary = summarize_pod_health(dir.path()).unwrap();
        assert_eq!(summary.total_count, 2);
    }
}
