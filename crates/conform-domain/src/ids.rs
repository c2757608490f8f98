use serde::{Deserialize, Serialize};

/// The literal node name used for cluster-scoped (non-per-node) plugins.
pub const GLOBAL_NODE: &str = "global";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginName(pub String);

impl PluginName {
    pub fn new(s: impl Into<String>) -> Self {
        PluginName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PluginName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeName(pub String);

impl NodeName {
    pub fn new(s: impl Into<String>) -> Self {
        NodeName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A node name standing in for "no particular node" (cluster-scoped plugins).
    pub fn global() -> Self {
        NodeName(GLOBAL_NODE.to_string())
    }

    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_NODE
    }
}

impl std::fmt::Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
