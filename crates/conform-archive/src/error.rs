use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("archive has no recognizable config file at meta/config.json or config.json")]
    UnknownVersion,

    /// Signals an early exit from a walk (e.g. a single-file lookup found
    /// its target). Callers of `walk` never see this — it is swallowed at
    /// the walk boundary, never surfaced as a genuine failure.
    #[error("stop walk")]
    StopWalk,
}
