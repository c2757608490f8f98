use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("list failed for {resource}: {message}")]
    List { resource: String, message: String },

    #[error("discovery failed: {0}")]
    Discovery(String),

    #[error("pod logs failed for {namespace}/{pod}/{container}: {message}")]
    PodLogs {
        namespace: String,
        pod: String,
        container: String,
        message: String,
    },

    #[error("node endpoint '{endpoint}' failed for node {node}: {message}")]
    NodeEndpoint {
        node: String,
        endpoint: String,
        message: String,
    },

    #[error("node endpoint '{endpoint}' on node {node} timed out")]
    NodeEndpointTimeout { node: String, endpoint: String },

    #[error("patch failed for pod {namespace}/{pod}: {message}")]
    PatchPod {
        namespace: String,
        pod: String,
        message: String,
    },

    #[error("io error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClusterError {
    /// Whether this failure represents a timeout — promoted upstream (§7)
    /// to a distinctive log line rather than aborting the run.
    pub fn timeout(&self) -> bool {
        matches!(self, ClusterError::NodeEndpointTimeout { .. })
    }
}
