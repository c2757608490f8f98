use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("unknown status value: {0}")]
    UnknownStatus(String),

    #[error("unknown plugin/node key: plugin={plugin} node={node}")]
    UnknownKey { plugin: String, node: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
