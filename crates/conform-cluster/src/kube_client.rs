use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
use kube::api::{Api, DynamicObject, ListParams, LogParams, Patch, PatchParams};
use kube::discovery::{verbs, Discovery};
use kube::{Client, ResourceExt};
use serde_json::{json, Value};
use tracing::debug;

use crate::client::{ClusterClient, LogOptions, PodSummary, ResourceDescriptor};
use crate::error::ClusterError;

/// Real [`ClusterClient`] backed by a live `kube::Client`. Dynamic listing
/// goes through server discovery; pod logs, annotation patches, and node
/// endpoints go through the typed/subresource APIs (§6).
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        KubeClusterClient { client }
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ClusterError::List {
                resource: "namespaces".into(),
                message: e.to_string(),
            })?;
        Ok(list.items.into_iter().map(|ns| ns.name_any()).collect())
    }

    async fn discover_resources(&self) -> Result<Vec<ResourceDescriptor>, ClusterError> {
        let discovery = Discovery::new(self.client.clone())
            .run()
            .await
            .map_err(|e| ClusterError::Discovery(e.to_string()))?;

        let mut out = Vec::new();
        for group in discovery.groups() {
            for (ar, caps) in group.recommended_resources() {
                if !caps.supports_operation(verbs::LIST) {
                    continue;
                }
                out.push(ResourceDescriptor {
                    group: ar.group.clone(),
                    version: ar.version.clone(),
                    resource: ar.plural.clone(),
                    namespaced: ar.namespaced,
                    verbs: caps.operations.iter().map(|o| o.to_string()).collect(),
                });
            }
        }
        Ok(out)
    }

    async fn list_namespaced(&self, res: &ResourceDescriptor, namespace: &str) -> Result<Value, ClusterError> {
        let ar = kube::discovery::ApiResource {
            group: res.group.clone(),
            version: res.version.clone(),
            api_version: if res.group.is_empty() {
                res.version.clone()
            } else {
                format!("{}/{}", res.group, res.version)
            },
            kind: res.resource.clone(),
            plural: res.resource.clone(),
        };
        let api: Api<DynamicObject> = Api::namespaced_with(self.client.clone(), namespace, &ar);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ClusterError::List {
                resource: res.resource.clone(),
                message: e.to_string(),
            })?;
        serde_json::to_value(list).map_err(ClusterError::from)
    }

    async fn list_cluster_scoped(&self, res: &ResourceDescriptor) -> Result<Value, ClusterError> {
        let ar = kube::discovery::ApiResource {
            group: res.group.clone(),
            version: res.version.clone(),
            api_version: if res.group.is_empty() {
                res.version.clone()
            } else {
                format!("{}/{}", res.group, res.version)
            },
            kind: res.resource.clone(),
            plural: res.resource.clone(),
        };
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &ar);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ClusterError::List {
                resource: res.resource.clone(),
                message: e.to_string(),
            })?;
        serde_json::to_value(list).map_err(ClusterError::from)
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>, ClusterError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await.map_err(|e| ClusterError::List {
            resource: "pods".into(),
            message: e.to_string(),
        })?;

        Ok(list
            .items
            .into_iter()
            .map(|pod| {
                let status = pod.status.clone().unwrap_or_default();
                let containers = pod
                    .spec
                    .as_ref()
                    .map(|s| s.containers.iter().map(|c| c.name.clone()).collect())
                    .unwrap_or_default();
                PodSummary {
                    uid: pod.uid().unwrap_or_default(),
                    namespace: namespace.to_string(),
                    name: pod.name_any(),
                    phase: status.phase.unwrap_or_default(),
                    reason: status.reason,
                    containers,
                }
            })
            .collect())
    }

    async fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        opts: &LogOptions,
    ) -> Result<String, ClusterError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            container: Some(container.to_string()),
            previous: opts.previous,
            since_seconds: opts.since_seconds,
            tail_lines: opts.tail_lines,
            limit_bytes: opts.limit_bytes,
            timestamps: opts.timestamps,
            ..Default::default()
        };
        api.logs(pod, &params).await.map_err(|e| ClusterError::PodLogs {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            container: container.to_string(),
            message: e.to_string(),
        })
    }

    async fn patch_pod_annotation(
        &self,
        namespace: &str,
        pod: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ClusterError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let patch = json!({ "metadata": { "annotations": { (key): value } } });
        api.patch(pod, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| ClusterError::PatchPod {
                namespace: namespace.to_string(),
                pod: pod.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn node_endpoint(&self, node: &str, endpoint: &str) -> Result<Value, ClusterError> {
        let path = format!("/api/v1/nodes/{node}/proxy/{endpoint}");
        debug!(node, endpoint, "fetching node endpoint");
        let request = http::Request::get(&path)
            .body(Vec::new())
            .map_err(|e| ClusterError::NodeEndpoint {
                node: node.to_string(),
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;
        let timeout = tokio::time::timeout(Duration::from_secs(30), self.client.request_text(request));
        match timeout.await {
            Ok(Ok(body)) => serde_json::from_str(&body).or_else(|_| Ok(json!({ "raw": body }))),
            Ok(Err(e)) => Err(ClusterError::NodeEndpoint {
                node: node.to_string(),
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(ClusterError::NodeEndpointTimeout {
                node: node.to_string(),
                endpoint: endpoint.to_string(),
            }),
        }
    }

    async fn list_node_names(&self) -> Result<Vec<String>, ClusterError> {
        let api: Api<Node> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await.map_err(|e| ClusterError::List {
            resource: "nodes".into(),
            message: e.to_string(),
        })?;
        Ok(list.items.into_iter().map(|n| n.name_any()).collect())
    }
}
