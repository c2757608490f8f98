use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HealthError;
use crate::log_patterns::{tally_log_patterns, LogPatternTally};
use crate::node_health::{summarize_node_health, NodeHealthSummary};
use crate::pod_health::{summarize_pod_health, PodHealthSummary};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClusterHealthSummary {
    pub api_version: Option<String>,
    pub nodes: NodeHealthSummary,
    pub pods: PodHealthSummary,
    pub log_patterns: LogPatternTally,
}

/// Reads `serverversion.json` at the run root and extracts `gitVersion`.
/// Absence is not an error — the collaborator that writes this file may run
/// independently of the health pass.
fn read_api_version(run_root: &Path) -> Result<Option<String>, HealthError> {
    let path = run_root.join("serverversion.json");
    if !path.exists() {
        return Ok(None);
    }
    let body = std::fs::read_to_string(&path).map_err(|e| HealthError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let value: Value = serde_json::from_str(&body)?;
    Ok(value.get("gitVersion").and_then(Value::as_str).map(str::to_string))
}

/// Computes the full C8 health summary from the in-flight snapshot
/// directory (not the tarball).
pub fn compute_cluster_health(
    run_root: &Path,
    log_categories: Option<&HashMap<String, Vec<String>>>,
) -> Result<ClusterHealthSummary, HealthError> {
    Ok(ClusterHealthSummary {
        api_version: read_api_version(run_root)?,
        nodes: summarize_node_health(run_root)?,
        pods: summarize_pod_health(run_root)?,
        log_patterns: tally_log_patterns(run_root, log_categories)?,
    })
}

/// Serializes `summary` to `meta/cluster_health.json`, creating the `meta`
/// directory if needed (§5 filesystem discipline).
pub fn write_cluster_health(run_root: &Path, summary: &ClusterHealthSummary) -> Result<(), HealthError> {
    let meta_dir = run_root.join("meta");
    std::fs::create_dir_all(&meta_dir).map_err(|e| HealthError::Io {
        path: meta_dir.display().to_string(),
        source: e,
    })?;
    let path = meta_dir.join("cluster_health.json");
    let body = serde_json::to_vec_pretty(summary)?;
    std::fs::write(&path, body).map_err(|e| HealthError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
