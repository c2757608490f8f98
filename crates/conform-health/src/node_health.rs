use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HealthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeHealth {
    pub name: String,
    pub healthy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeHealthSummary {
    pub nodes: Vec<NodeHealth>,
    pub healthy_count: usize,
    pub total_count: usize,
}

/// Reads `resources/cluster/core_v1_nodes.json` and derives per-node health
/// from the `Ready` condition (§4.8). A node is healthy iff that condition's
/// `status` is the literal string `"True"`. Missing the file yields an empty
/// summary rather than an error — discovery may not have run yet.
pub fn summarize_node_health(run_root: &Path) -> Result<NodeHealthSummary, HealthError> {
    let path = run_root.join("resources").join("cluster").join("core_v1_nodes.json");
    if !path.exists() {
        return Ok(NodeHealthSummary::default());
    }

    let body = std::fs::read_to_string(&path).map_err(|e| HealthError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let list: Value = serde_json::from_str(&body)?;

    let mut nodes = Vec::new();
    for item in list.get("items").and_then(Value::as_array).into_iter().flatten() {
        let name = item
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let healthy = ready_condition_is_true(item);
        nodes.push(NodeHealth { name, healthy });
    }

    let healthy_count = nodes.iter().filter(|n| n.healthy).count();
    let total_count = nodes.len();
    Ok(NodeHealthSummary {
        nodes,
        healthy_count,
        total_count,
    })
}

fn ready_condition_is_true(node: &Value) -> bool {
    node.pointer("/status/conditions")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|c| c.get("type").and_then(Value::as_str) == Some("Ready"))
        .and_then(|c| c.get("status"))
        .and_then(Value::as_str)
        == Some("True")
}
