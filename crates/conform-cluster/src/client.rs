use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClusterError;

/// A server-preferred resource as returned by discovery (§4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Empty string for the core group.
    pub group: String,
    pub version: String,
    /// Plural resource name, e.g. `pods`.
    pub resource: String,
    pub namespaced: bool,
    pub verbs: Vec<String>,
}

impl ResourceDescriptor {
    pub fn has_verb(&self, verb: &str) -> bool {
        self.verbs.iter().any(|v| v == verb)
    }

    /// `<group>_<version>_<resource>.json` file stem (§6); the empty group
    /// is written as `core`.
    pub fn file_stem(&self) -> String {
        let group = if self.group.is_empty() { "core" } else { &self.group };
        format!("{}_{}_{}", group, self.version, self.resource)
    }
}

/// Caller-supplied options for a single pod-log fetch (§4.7).
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub previous: bool,
    pub since_seconds: Option<i64>,
    pub tail_lines: Option<i64>,
    pub limit_bytes: Option<i64>,
    pub timestamps: bool,
}

/// Enough of a pod's status to drive dedup and the Evicted skip rule (§4.7).
#[derive(Debug, Clone)]
pub struct PodSummary {
    pub uid: String,
    pub namespace: String,
    pub name: String,
    pub phase: String,
    pub reason: Option<String>,
    pub containers: Vec<String>,
}

impl PodSummary {
    pub fn is_evicted(&self) -> bool {
        self.phase == "Failed" && self.reason.as_deref() == Some("Evicted")
    }
}

/// The capability the query runner, log collector, and status updater
/// consume (§1 Non-goals, §6 "Collaborator capabilities consumed"):
/// typed/dynamic listers, pod patch, pod logs, node-proxy, discovery.
/// Modeled as a trait, not a base class (§9), so both a real `kube`-backed
/// implementation and an in-memory fake for tests satisfy it.
#[async_trait]
pub trait ClusterClient: Send + Sync + 'static {
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError>;

    async fn discover_resources(&self) -> Result<Vec<ResourceDescriptor>, ClusterError>;

    async fn list_namespaced(&self, res: &ResourceDescriptor, namespace: &str) -> Result<Value, ClusterError>;

    async fn list_cluster_scoped(&self, res: &ResourceDescriptor) -> Result<Value, ClusterError>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>, ClusterError>;

    async fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        opts: &LogOptions,
    ) -> Result<String, ClusterError>;

    async fn patch_pod_annotation(
        &self,
        namespace: &str,
        pod: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ClusterError>;

    /// Fetch `configz` or `healthz` from a node via the API server's
    /// node-proxy subresource (§4.7). Callers impose the 30-second deadline.
    async fn node_endpoint(&self, node: &str, endpoint: &str) -> Result<Value, ClusterError>;

    async fn list_node_names(&self) -> Result<Vec<String>, ClusterError>;
}
