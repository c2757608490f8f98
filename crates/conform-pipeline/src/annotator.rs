use std::sync::Arc;

use async_trait::async_trait;
use conform_cluster::ClusterClient;
use conform_store::{PodAnnotator, StoreError};

/// Bridges the cluster crate's [`ClusterClient::patch_pod_annotation`] to
/// the status store's narrower [`PodAnnotator`] capability, so the
/// orchestrator only has to hand the store one pod identity and one client.
pub struct ClusterPodAnnotator {
    client: Arc<dyn ClusterClient>,
    namespace: String,
    pod_name: String,
}

impl ClusterPodAnnotator {
    pub fn new(client: Arc<dyn ClusterClient>, namespace: impl Into<String>, pod_name: impl Into<String>) -> Self {
        ClusterPodAnnotator {
            client,
            namespace: namespace.into(),
            pod_name: pod_name.into(),
        }
    }
}

#[async_trait]
impl PodAnnotator for ClusterPodAnnotator {
    async fn patch_annotation(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.client
            .patch_pod_annotation(&self.namespace, &self.pod_name, key, value)
            .await
            .map_err(|e| StoreError::Annotate(e.to_string()))
    }
}
