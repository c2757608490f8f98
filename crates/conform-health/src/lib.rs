pub mod error;
pub mod log_patterns;
pub mod node_health;
pub mod pod_health;
pub mod summary;

pub use error::HealthError;
pub use log_patterns::{tally_log_patterns, LogPatternTally};
pub use node_health::{summarize_node_health, NodeHealth, NodeHealthSummary};
pub use pod_health::{summarize_pod_health, PodHealth, PodHealthSummary};
pub use summary::{compute_cluster_health, write_cluster_health, ClusterHealthSummary};
