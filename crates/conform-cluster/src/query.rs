use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use regex::Regex;
use tracing::{debug, warn};

use crate::client::{ClusterClient, ResourceDescriptor};
use crate::error::ClusterError;
use crate::recorder::QueryRecorder;

const DEFAULT_EXCLUDED_RESOURCE: &str = "secrets";

/// Caller-supplied knobs for a single C6 discovery pass (§4.6).
pub struct QueryOptions {
    /// Regex matched against each namespace name; only matching namespaces
    /// are queried for namespaced resources.
    pub namespace_regex: Regex,
    /// Consulted when `list_namespaces` itself fails, so at least the
    /// aggregator's own namespace is recoverable.
    pub default_namespace: String,
    /// When non-empty, only these resource (plural) names are queried.
    /// `secrets` is included only if named explicitly here.
    pub resource_allowlist: Vec<String>,
}

/// Drops duplicate resource names (first group wins, per discovery order),
/// resources without the `list` verb, and applies the allow-list / default
/// secrets exclusion (§4.6).
pub fn select_resources(discovered: Vec<ResourceDescriptor>, opts: &QueryOptions) -> Vec<ResourceDescriptor> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for res in discovered {
        if !res.has_verb("list") {
            continue;
        }
        if !seen.insert(res.resource.clone()) {
            continue;
        }
        out.push(res);
    }

    if !opts.resource_allowlist.is_empty() {
        let allow: HashSet<&str> = opts.resource_allowlist.iter().map(|s| s.as_str()).collect();
        out.retain(|r| allow.contains(r.resource.as_str()));
    } else {
        out.retain(|r| r.resource != DEFAULT_EXCLUDED_RESOURCE);
    }

    out
}

/// Namespaces to query: the full list filtered by `namespace_regex`, falling
/// back to just `default_namespace` when the listing call itself fails.
pub async fn select_namespaces(client: &dyn ClusterClient, opts: &QueryOptions) -> Vec<String> {
    match client.list_namespaces().await {
        Ok(all) => all.into_iter().filter(|ns| opts.namespace_regex.is_match(ns)).collect(),
        Err(e) => {
            warn!(error = %e, "listing namespaces failed, falling back to default namespace");
            vec![opts.default_namespace.clone()]
        }
    }
}

/// Runs the full C6 discovery + query pass, writing `resources/cluster/…`
/// and `resources/ns/<ns>/…` under `run_root` and timing every query into
/// `recorder`. Per-query failures are logged and recorded, never fatal.
pub async fn run_discovery(
    client: &dyn ClusterClient,
    run_root: &Path,
    opts: &QueryOptions,
    recorder: &QueryRecorder,
) -> Result<(), ClusterError> {
    let discovered = client.discover_resources().await?;
    let resources = select_resources(discovered, opts);
    let namespaces = select_namespaces(client, opts).await;

    for res in &resources {
        if res.namespaced {
            for ns in &namespaces {
                query_namespaced(client, run_root, res, ns, recorder).await;
            }
        } else {
            query_cluster_scoped(client, run_root, res, recorder).await;
        }
    }

    Ok(())
}

async fn query_namespaced(client: &dyn ClusterClient, run_root: &Path, res: &ResourceDescriptor, ns: &str, recorder: &QueryRecorder) {
    let start = Instant::now();
    let result = client.list_namespaced(res, ns).await;
    let elapsed = start.elapsed();

    match result {
        Ok(value) => {
            recorder.record(res.resource.clone(), ns.to_string(), elapsed, None);
            let dir = run_root.join("resources").join("ns").join(ns);
            if let Err(e) = write_json(&dir, &res.file_stem(), &value) {
                warn!(resource = %res.resource, namespace = ns, error = %e, "failed writing resource query result");
            }
        }
        Err(e) => {
            debug!(resource = %res.resource, namespace = ns, error = %e, "namespaced query failed");
            recorder.record(res.resource.clone(), ns.to_string(), elapsed, Some(e.to_string()));
        }
    }
}

async fn query_cluster_scoped(client: &dyn ClusterClient, run_root: &Path, res: &ResourceDescriptor, recorder: &QueryRecorder) {
    let start = Instant::now();
    let result = client.list_cluster_scoped(res).await;
    let elapsed = start.elapsed();

    match result {
        Ok(value) => {
            recorder.record(res.resource.clone(), String::new(), elapsed, None);
            let dir = run_root.join("resources").join("cluster");
            if let Err(e) = write_json(&dir, &res.file_stem(), &value) {
                warn!(resource = %res.resource, error = %e, "failed writing resource query result");
            }
        }
        Err(e) => {
            debug!(resource = %res.resource, error = %e, "cluster-scoped query failed");
            recorder.record(res.resource.clone(), String::new(), elapsed, Some(e.to_string()));
        }
    }
}

fn write_json(dir: &Path, stem: &str, value: &serde_json::Value) -> Result<(), ClusterError> {
    std::fs::create_dir_all(dir).map_err(|e| ClusterError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    let path = dir.join(format!("{stem}.json"));
    let body = serde_json::to_vec_pretty(value)?;
    std::fs::write(&path, body).map_err(|e| ClusterError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalClusterClient;
    use serde_json::json;
    use tempfile::tempdir;

    fn descriptor(group: &str, resource: &str, namespaced: bool) -> ResourceDescriptor {
        ResourceDescriptor {
            group: group.to_string(),
            version: "v1".to_string(),
            resource: resource.to_string(),
            namespaced,
            verbs: vec!["list".to_string()],
        }
    }

    #[test]
    fn select_resources_keeps_first_group_on_name_clash() {
        let discovered = vec![descriptor("", "ingresses", true), descriptor("networking.k8s.io", "ingresses", true)];
        let opts = QueryOptions {
            namespace_regex: Regex::new(".*").unwrap(),
            default_namespace: "default".to_string(),
            resource_allowlist: Vec::new(),
        };
        let selected = select_resources(discovered, &opts);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].group, "");
    }

    #[test]
    fn select_resources_drops_resources_without_list_verb() {
        let mut no_list = descriptor("", "events", true);
        no_list.verbs = vec!["watch".to_string()];
        let opts = QueryOptions {
            namespace_regex: Regex::new(".*").unwrap(),
            default_namespace: "default".to_string(),
            resource_allowlist: Vec::new(),
        };
        let selected = select_resources(vec![no_list], &opts);
        assert!(selected.is_empty());
    }

    #[test]
    fn select_resources_drops_secrets_by_default() {
        let opts = QueryOptions {
            namespace_regex: Regex::new(".*").unwrap(),
            default_namespace: "default".to_string(),
            resource_allowlist: Vec::new(),
        };
        let selected = select_resources(vec![descriptor("", "secrets", true), descriptor("", "pods", true)], &opts);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].resource, "pods");
    }

    #[test]
    fn select_resources_allows_secrets_when_explicitly_listed() {
        let opts = QueryOptions {
            namespace_regex: Regex::new(".*").unwrap(),
            default_namespace: "default".to_string(),
            resource_allowlist: vec!["secrets".to_string()],
        };
        let selected = select_resources(vec![descriptor("", "secrets", true)], &opts);
        assert_eq!(selected.len(), 1);
    }

    #[tokio::test]
    async fn select_namespaces_falls_back_to_default_on_list_failure() {
        let client = LocalClusterClient::new();
        let opts = QueryOptions {
            namespace_regex: Regex::new(".*").unwrap(),
            default_namespace: "sonobuoy".to_string(),
            resource_allowlist: Vec::new(),
        };
        let namespaces = select_namespaces(&client, &opts).await;
        assert_eq!(namespaces, vec!["sonobuoy".to_string()]);
    }

    #[tokio::test]
    async fn run_discovery_writes_namespaced_and_cluster_scoped_files() {
        let mut client = LocalClusterClient::new();
        client.namespaces = vec!["default".to_string()];
        client.resources = vec![descriptor("", "pods", true), descriptor("", "nodes", false)];
        client
            .namespaced_data
            .insert(("pods".to_string(), "default".to_string()), json!({"items": []}));
        client.cluster_data.insert("nodes".to_string(), json!({"items": []}));

        let dir = tempdir().unwrap();
        let opts = QueryOptions {
            namespace_regex: Regex::new(".*").unwrap(),
            default_namespace: "default".to_string(),
            resource_allowlist: Vec::new(),
        };
        let recorder = QueryRecorder::new();
        run_discovery(&client, dir.path(), &opts, &recorder).await.unwrap();

        assert!(dir.path().join("resources/ns/default/core_v1_pods.json").exists());
        assert!(dir.path().join("resources/cluster/core_v1_nodes.json").exists());
        assert_eq!(recorder.records().len(), 2);
    }
}
