use thiserror::Error;

/// Top-level orchestrator error. Composes every collaborator crate's error
/// type via `#[from]` (§10.2). Only [`PipelineError::RunDirCreation`] and
/// [`PipelineError::ClientConstruction`] are fatal — every other step
/// accumulates its error into the run report instead of propagating here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to create run directory {path}: {source}")]
    RunDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to construct cluster API client: {0}")]
    ClientConstruction(String),

    #[error(transparent)]
    Config(#[from] conform_config::ConfigError),

    #[error(transparent)]
    Store(#[from] conform_store::StoreError),

    #[error(transparent)]
    Format(#[from] conform_format::FormatError),

    #[error(transparent)]
    Cluster(#[from] conform_cluster::ClusterError),

    #[error(transparent)]
    Health(#[from] conform_health::HealthError),

    #[error(transparent)]
    Archive(#[from] conform_archive::ArchiveError),

    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml serialization error: {0}")]
    YamlSerialization(#[from] serde_yaml::Error),
}

impl PipelineError {
    /// Whether this failure represents a timeout from the underlying
    /// aggregation driver (§7, §10.2) — promoted to a distinctive log line
    /// rather than aborting the run.
    pub fn timeout(&self) -> bool {
        matches!(self, PipelineError::Cluster(e) if e.timeout())
    }
}

/// The plugin-aggregation subsystem's own failure type (§4.10 step 4). Kept
/// separate from [`PipelineError`] since it originates outside this core's
/// boundary (§1 Non-goals) — the orchestrator only needs to know whether it
/// timed out.
#[derive(Debug, Error)]
#[error("plugin aggregation failed: {message}")]
pub struct AggregationError {
    pub message: String,
    pub timeout: bool,
}

impl AggregationError {
    pub fn timeout(&self) -> bool {
        self.timeout
    }
}
