use serde::{Deserialize, Serialize};

/// On-disk shape of a run's wiring config (§10.3). This is the aggregator's
/// own bootstrap record, distinct from (and far smaller than) the user-facing
/// plugin-definition schema, which is out of scope for this core.
#[derive(Debug, Deserialize, Serialize)]
pub struct RawRunConfig {
    #[serde(default)]
    pub run_id: Option<String>,
    pub pod_name: String,
    pub pod_namespace: String,
    #[serde(default)]
    pub namespaces: Vec<String>,
    #[serde(default)]
    pub plugins: Vec<RawPluginExpectation>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RawPluginExpectation {
    pub plugin: String,
    /// Absent means a cluster-scoped plugin (node = "global").
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub result_format: Option<String>,
    #[serde(default)]
    pub result_files: Option<Vec<String>>,
}
