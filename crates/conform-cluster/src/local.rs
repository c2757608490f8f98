use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{ClusterClient, LogOptions, PodSummary, ResourceDescriptor};
use crate::error::ClusterError;

/// An in-memory [`ClusterClient`] that performs no I/O — the cluster
/// equivalent of the provisioning driver's `LocalDriver` stub. Used by
/// tests and by callers that want to exercise C6/C7's directory-writing
/// and error-accounting logic without a live API server.
#[derive(Default)]
pub struct LocalClusterClient {
    pub namespaces: Vec<String>,
    pub node_names: Vec<String>,
    pub resources: Vec<ResourceDescriptor>,
    pub namespaced_data: HashMap<(String, String), Value>,
    pub cluster_data: HashMap<String, Value>,
    pub pods: HashMap<String, Vec<PodSummary>>,
    pub logs: HashMap<(String, String, String), String>,
    pub node_endpoints: HashMap<(String, String), Value>,
    patches: RwLock<Vec<(String, String, String, String)>>,
}

impl LocalClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patches(&self) -> Vec<(String, String, String, String)> {
        self.patches.read().unwrap().clone()
    }
}

#[async_trait]
impl ClusterClient for LocalClusterClient {
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError> {
        Ok(self.namespaces.clone())
    }

    async fn discover_resources(&self) -> Result<Vec<ResourceDescriptor>, ClusterError> {
        Ok(self.resources.clone())
    }

    async fn list_namespaced(&self, res: &ResourceDescriptor, namespace: &str) -> Result<Value, ClusterError> {
        self.namespaced_data
            .get(&(res.resource.clone(), namespace.to_string()))
            .cloned()
            .ok_or_else(|| ClusterError::List {
                resource: res.resource.clone(),
                message: format!("no fixture data for namespace {}", namespace),
            })
    }

    async fn list_cluster_scoped(&self, res: &ResourceDescriptor) -> Result<Value, ClusterError> {
        self.cluster_data
            .get(&res.resource)
            .cloned()
            .ok_or_else(|| ClusterError::List {
                resource: res.resource.clone(),
                message: "no fixture data".to_string(),
            })
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>, ClusterError> {
        Ok(self.pods.get(namespace).cloned().unwrap_or_default())
    }

    async fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        _opts: &LogOptions,
    ) -> Result<String, ClusterError> {
        self.logs
            .get(&(namespace.to_string(), pod.to_string(), container.to_string()))
            .cloned()
            .ok_or_else(|| ClusterError::PodLogs {
                namespace: namespace.to_string(),
                pod: pod.to_string(),
                container: container.to_string(),
                message: "no fixture logs".to_string(),
            })
    }

    async fn patch_pod_annotation(
        &self,
        namespace: &str,
        pod: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ClusterError> {
        self.patches.write().unwrap().push((
            namespace.to_string(),
            pod.to_string(),
            key.to_string(),
            value.to_string(),
        ));
        Ok(())
    }

    async fn node_endpoint(&self, node: &str, endpoint: &str) -> Result<Value, ClusterError> {
        self.node_endpoints
            .get(&(node.to_string(), endpoint.to_string()))
            .cloned()
            .ok_or_else(|| ClusterError::NodeEndpoint {
                node: node.to_string(),
                endpoint: endpoint.to_string(),
                message: "no fixture data".to_string(),
            })
    }

    async fn list_node_names(&self) -> Result<Vec<String>, ClusterError> {
        Ok(self.node_names.clone())
    }
}
