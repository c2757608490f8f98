use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown plugin/node key: plugin={plugin} node={node}")]
    UnknownKey { plugin: String, node: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to patch pod annotation: {0}")]
    Annotate(String),
}
