use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{NodeName, PluginName};
use crate::status::RunPhase;

/// Which format processor a plugin's results are parsed with (§4.4).
/// Defaults to `Raw` when a plugin declares none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    Junit,
    E2e,
    Gojson,
    Raw,
    Manual,
}

impl Default for ResultFormat {
    fn default() -> Self {
        ResultFormat::Raw
    }
}

impl std::fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResultFormat::Junit => "junit",
            ResultFormat::E2e => "e2e",
            ResultFormat::Gojson => "gojson",
            ResultFormat::Raw => "raw",
            ResultFormat::Manual => "manual",
        };
        write!(f, "{}", s)
    }
}

/// A predeclared `(plugin, node)` pair the run will track status for (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginExpectation {
    pub plugin: PluginName,
    pub node: NodeName,
    #[serde(default)]
    pub result_format: ResultFormat,
    /// Explicit basename allowlist; `None` means "accept by extension".
    #[serde(default)]
    pub result_files: Option<Vec<String>>,
}

impl PluginExpectation {
    pub fn is_per_node(&self) -> bool {
        !self.node.is_global()
    }
}

/// Per-`(plugin, node)` status record (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginStatus {
    pub plugin: PluginName,
    pub node: NodeName,
    pub status: RunPhase,
    #[serde(default)]
    pub result_status: String,
    #[serde(default)]
    pub result_counts: HashMap<String, u64>,
}

/// Descriptor for the archive produced by the tarball writer (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TarballInfo {
    pub name: String,
    pub size_bytes: u64,
    pub sha256: String,
}

/// Run-level status (§3), published on the pod annotation. `status` is
/// always derived from `plugins` via [`crate::status::roll_up_status`],
/// never set directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatus {
    pub status: RunPhase,
    pub plugins: Vec<PluginStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tarball: Option<TarballInfo>,
}

impl RunStatus {
    pub fn new(expected: &[PluginExpectation]) -> Self {
        let plugins = expected
            .iter()
            .map(|e| PluginStatus {
                plugin: e.plugin.clone(),
                node: e.node.clone(),
                status: RunPhase::Running,
                result_status: String::new(),
                result_counts: HashMap::new(),
            })
            .collect();

        RunStatus {
            status: RunPhase::Running,
            plugins,
            tarball: None,
        }
    }
}
