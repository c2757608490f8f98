use conform_domain::PluginExpectation;
use serde::{Deserialize, Serialize};

/// A single run's wiring config (§10.3): the aggregator's own bootstrap
/// record, not the user-facing plugin-definition schema (out of scope, §1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub run_id: Option<String>,
    pub pod_name: String,
    pub pod_namespace: String,
    pub namespaces: Vec<String>,
    pub plugins: Vec<PluginExpectation>,
}
