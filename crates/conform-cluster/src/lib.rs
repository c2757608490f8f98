pub mod client;
pub mod error;
pub mod kube_client;
pub mod local;
pub mod logs;
pub mod query;
pub mod recorder;

pub use client::{ClusterClient, LogOptions, PodSummary, ResourceDescriptor};
pub use error::ClusterError;
pub use kube_client::KubeClusterClient;
pub use local::LocalClusterClient;
pub use logs::{collect_node_endpoints, LogCollector};
pub use query::{run_discovery, select_namespaces, select_resources, QueryOptions};
pub use recorder::{QueryRecord, QueryRecorder};
