use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::client::{ClusterClient, LogOptions};
use crate::error::ClusterError;

const NODE_ENDPOINT_DEADLINE: Duration = Duration::from_secs(30);

/// Sequential, dedup-aware pod-log collector (§4.7, §5). `seen` carries pod
/// UIDs already collected across calls so overlapping namespace-regex and
/// field-selector passes don't duplicate work.
pub struct LogCollector {
    seen: HashSet<String>,
}

impl LogCollector {
    pub fn new() -> Self {
        LogCollector { seen: HashSet::new() }
    }

    /// Collects logs for every container of every pod in `namespace`,
    /// writing `podlogs/<ns>/<pod>/logs/<container>.txt`. Pods already seen
    /// (by UID) or evicted are skipped. Individual container failures are
    /// logged and counted but never abort the namespace pass.
    pub async fn collect_namespace(
        &mut self,
        client: &dyn ClusterClient,
        run_root: &Path,
        namespace: &str,
        opts: &LogOptions,
    ) -> Result<usize, ClusterError> {
        let pods = client.list_pods(namespace).await?;
        let mut errors = 0usize;

        for pod in pods {
            if !self.seen.insert(pod.uid.clone()) {
                debug!(pod = %pod.name, uid = %pod.uid, "pod already collected, skipping");
                continue;
            }
            if pod.is_evicted() {
                debug!(pod = %pod.name, "pod evicted, skipping log collection");
                continue;
            }

            for container in &pod.containers {
                match client.pod_logs(namespace, &pod.name, container, opts).await {
                    Ok(body) => {
                        if let Err(e) = write_log(run_root, namespace, &pod.name, container, &body) {
                            warn!(pod = %pod.name, container, error = %e, "failed writing pod log");
                            errors += 1;
                        }
                    }
                    Err(e) => {
                        warn!(pod = %pod.name, container, error = %e, "failed fetching pod log");
                        errors += 1;
                    }
                }
            }
        }

        Ok(errors)
    }
}

impl Default for LogCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn write_log(run_root: &Path, namespace: &str, pod: &str, container: &str, body: &str) -> Result<(), ClusterError> {
    let dir = run_root.join("podlogs").join(namespace).join(pod).join("logs");
    std::fs::create_dir_all(&dir).map_err(|e| ClusterError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    let path = dir.join(format!("{container}.txt"));
    std::fs::write(&path, body).map_err(|e| ClusterError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Fetches `configz` and `healthz` from every node, writing
/// `hosts/<node>/{configz,healthz}.json`. A timeout or other failure on one
/// endpoint does not prevent collection of the rest (§4.7, §5).
pub async fn collect_node_endpoints(client: &dyn ClusterClient, run_root: &Path, nodes: &[String]) -> usize {
    let mut errors = 0usize;

    for node in nodes {
        for endpoint in ["configz", "healthz"] {
            match tokio::time::timeout(NODE_ENDPOINT_DEADLINE, client.node_endpoint(node, endpoint)).await {
                Ok(Ok(value)) => {
                    if let Err(e) = write_node_endpoint(run_root, node, endpoint, &value) {
                        warn!(node, endpoint, error = %e, "failed writing node endpoint result");
                        errors += 1;
                    }
                }
                Ok(Err(e)) => {
                    warn!(node, endpoint, error = %e, "node endpoint fetch failed");
                    errors += 1;
                }
                Err(_) => {
                    warn!(node, endpoint, "node endpoint fetch timed out");
                    errors += 1;
                }
            }
        }
    }

    errors
}

fn write_node_endpoint(run_root: &Path, node: &str, endpoint: &str, value: &serde_json::Value) -> Result<(), ClusterError> {
    let dir = run_root.join("hosts").join(node);
    std::fs::create_dir_all(&dir).map_err(|e| ClusterError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    let path = dir.join(format!("{endpoint}.json"));
    let body = serde_json::to_vec_pretty(value)?;
    std::fs::write(&path, body).map_err(|e| ClusterError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PodSummary;
    use crate::local::LocalClusterClient;
    use serde_json::json;
    use tempfile::tempdir;

    fn pod(uid: &str, name: &str, phase: &str, reason: Option<&str>) -> PodSummary {
        PodSummary {
            uid: uid.to_string(),
            namespace: "default".to_string(),
            name: name.to_string(),
            phase: phase.to_string(),
            reason: reason.map(str::to_string),
            containers: vec!["app".to_string()],
        }
    }

    #[tokio::test]
    async fn collect_namespace_writes_one_file_per_container() {
        let mut client = LocalClusterClient::new();
        client.pods.insert("default".to_string(), vec![pod("uid-1", "web-0", "Running", None)]);
        client
            .logs
            .insert(("default".to_string(), "web-0".to_string(), "app".to_string()), "hello\n".to_string());

        let dir = tempdir().unwrap();
        let mut collector = LogCollector::new();
        let errors = collector
            .collect_namespace(&client, dir.path(), "default", &LogOptions::default())
            .await
            .unwrap();

        assert_eq!(errors, 0);
        let contents = std::fs::read_to_string(dir.path().join("podlogs/default/web-0/logs/app.txt")).unwrap();
        assert_eq!(contents, "hello\n");
    }

    #[tokio::test]
    async fn collect_namespace_skips_evicted_pods() {
        let mut client = LocalClusterClient::new();
        client
            .pods
            .insert("default".to_string(), vec![pod("uid-2", "evicted-pod", "Failed", Some("Evicted"))]);

        let dir = tempdir().unwrap();
        let mut collector = LogCollector::new();
        collector
            .collect_namespace(&client, dir.path(), "default", &LogOptions::default())
            .await
            .unwrap();

        assert!(!dir.path().join("podlogs/default/evicted-pod").exists());
    }

    #[tokio::test]
    async fn collect_namespace_dedups_by_uid_across_calls() {
        let mut client = LocalClusterClient::new();
        client.pods.insert("default".to_string(), vec![pod("uid-3", "web-1", "Running", None)]);
        client
            .logs
            .insert(("default".to_string(), "web-1".to_string(), "app".to_string()), "one\n".to_string());

        let dir = tempdir().unwrap();
        let mut collector = LogCollector::new();
        collector
            .collect_namespace(&client, dir.path(), "default", &LogOptions::default())
            .await
            .unwrap();
        // second pass should skip silently since the uid was already seen
        let errors = collector
            .collect_namespace(&client, dir.path(), "default", &LogOptions::default())
            .await
            .unwrap();

        assert_eq!(errors, 0);
    }

    #[tokio::test]
    async fn collect_node_endpoints_writes_both_files_and_survives_partial_failure() {
        let mut client = LocalClusterClient::new();
        client
            .node_endpoints
            .insert(("node-a".to_string(), "configz".to_string()), json!({"ok": true}));
        // healthz intentionally left unset so that fetch fails for it.

        let dir = tempdir().unwrap();
        let errors = collect_node_endpoints(&client, dir.path(), &["node-a".to_string()]).await;

        assert_eq!(errors, 1);
        assert!(dir.path().join("hosts/node-a/configz.json").exists());
        assert!(!dir.path().join("hosts/node-a/healthz.json").exists());
    }
}
