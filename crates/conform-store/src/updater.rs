use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use conform_domain::{
    roll_up_status, NodeName, PluginExpectation, PluginName, PluginStatus, RunPhase, RunStatus,
    TarballInfo,
};
use tracing::{debug, info};

use crate::error::StoreError;

/// The pod annotation key the aggregator publishes run status under (§6).
pub const STATUS_ANNOTATION_KEY: &str = "sonobuoy.hept.io/status";

/// A status delta delivered by the plugin-aggregation subsystem (§3, §4.2).
#[derive(Debug, Clone)]
pub struct PluginUpdate {
    pub plugin: PluginName,
    pub node: NodeName,
    pub status: RunPhase,
    pub result_status: String,
    pub result_counts: HashMap<String, u64>,
}

/// Capability for patching the owning pod's status annotation (§6). Kept as
/// a trait so the updater is testable without a live API server — the same
/// split the cluster crate uses for its client capability.
#[async_trait]
pub trait PodAnnotator: Send + Sync + 'static {
    async fn patch_annotation(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// A [`PodAnnotator`] that records patches in memory instead of calling a
/// cluster. Used by tests and by callers that only care about `serialize()`.
#[derive(Debug, Default)]
pub struct RecordingAnnotator {
    patches: RwLock<Vec<String>>,
}

impl RecordingAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.patches.read().unwrap().last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.patches.read().unwrap().clone()
    }
}

#[async_trait]
impl PodAnnotator for RecordingAnnotator {
    async fn patch_annotation(&self, _key: &str, value: &str) -> Result<(), StoreError> {
        self.patches.write().unwrap().push(value.to_string());
        Ok(())
    }
}

struct Inner {
    records: Vec<PluginStatus>,
    index: HashMap<(PluginName, NodeName), usize>,
    tarball: Option<TarballInfo>,
}

/// Concurrent per-`(node,plugin)` status store (C2, §4.2, §5).
///
/// A single `RwLock` protects the record slice and its index; `receive`
/// takes the write side, `serialize`/`annotate` the read side. Keys are
/// fixed at construction — no entry is ever added or removed, so record
/// positions never move for the life of the store.
pub struct StatusUpdater {
    pod_id: String,
    inner: RwLock<Inner>,
    annotator: Arc<dyn PodAnnotator>,
}

impl StatusUpdater {
    pub fn new(expected: &[PluginExpectation], pod_id: impl Into<String>, annotator: Arc<dyn PodAnnotator>) -> Self {
        let run = RunStatus::new(expected);
        let mut index = HashMap::with_capacity(run.plugins.len());
        for (i, rec) in run.plugins.iter().enumerate() {
            index.insert((rec.plugin.clone(), rec.node.clone()), i);
        }

        StatusUpdater {
            pod_id: pod_id.into(),
            inner: RwLock::new(Inner {
                records: run.plugins,
                index,
                tarball: None,
            }),
            annotator,
        }
    }

    /// Apply a status delta. Fails with [`StoreError::UnknownKey`] if no
    /// expectation was registered for `(plugin, node)` (§4.2). The last
    /// writer for a given key wins; there is no cross-call ordering (§5).
    pub fn receive(&self, update: PluginUpdate) -> Result<(), StoreError> {
        let mut guard = self.inner.write().unwrap();
        let key = (update.plugin.clone(), update.node.clone());
        let idx = *guard.index.get(&key).ok_or_else(|| StoreError::UnknownKey {
            plugin: update.plugin.as_str().to_string(),
            node: update.node.as_str().to_string(),
        })?;

        let rec = &mut guard.records[idx];
        rec.status = update.status;
        rec.result_status = update.result_status;
        rec.result_counts = update.result_counts;
        debug!(plugin = %key.0, node = %key.1, status = %rec.status, "status update received");
        Ok(())
    }

    /// Fold a per-plugin summary status back into every node record for
    /// that plugin (C10 step 5: "fold the summary into C2").
    pub fn fold_plugin_summary(&self, plugin: &PluginName, result_status: &str) {
        let mut guard = self.inner.write().unwrap();
        for rec in guard.records.iter_mut().filter(|r| &r.plugin == plugin) {
            rec.result_status = result_status.to_string();
        }
    }

    /// Record the tarball descriptor once the archive is written (C10 step 9).
    pub fn set_tarball(&self, info: TarballInfo) {
        self.inner.write().unwrap().tarball = Some(info);
    }

    /// Transition every non-`Failed` record to `Complete` (C10 step 10, §2:
    /// "the Orchestrator marks the annotation `complete`"). A record already
    /// `Failed` is left untouched — failure is sticky (§4.1, IV1) — so a run
    /// with any failed member still rolls up to `failed` after this call.
    pub fn mark_complete(&self) {
        let mut guard = self.inner.write().unwrap();
        for rec in guard.records.iter_mut() {
            if rec.status != RunPhase::Failed {
                rec.status = RunPhase::Complete;
            }
        }
    }

    fn snapshot(&self) -> RunStatus {
        let guard = self.inner.read().unwrap();
        let phases: Vec<RunPhase> = guard.records.iter().map(|r| r.status).collect();
        RunStatus {
            status: roll_up_status(&phases),
            plugins: guard.records.clone(),
            tarball: guard.tarball.clone(),
        }
    }

    /// Serialize the current store under a read lock (§4.2).
    pub fn serialize(&self) -> Result<String, StoreError> {
        let status = self.snapshot();
        Ok(serde_json::to_string(&status)?)
    }

    /// Serialize and patch the owning pod's annotation (§4.2, §6).
    pub async fn annotate(&self) -> Result<(), StoreError> {
        let body = self.serialize()?;
        info!(pod = %self.pod_id, "patching status annotation");
        self.annotator
            .patch_annotation(STATUS_ANNOTATION_KEY, &body)
            .await
            .map_err(|e| StoreError::Annotate(e.to_string()))
    }

    pub fn current_status(&self) -> RunPhase {
        self.snapshot().status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_domain::ResultFormat;

    fn expectation(plugin: &str, node: &str) -> PluginExpectation {
        PluginExpectation {
            plugin: PluginName::new(plugin),
            node: NodeName::new(node),
            result_format: ResultFormat::Raw,
            result_files: None,
        }
    }

    fn updater() -> StatusUpdater {
        let expected = vec![expectation("e2e", "global"), expectation("systemd-logs", "n1")];
        StatusUpdater::new(&expected, "sonobuoy/pod-1", Arc::new(RecordingAnnotator::new()))
    }

    #[test]
    fn starts_all_running() {
        let u = updater();
        assert_eq!(u.current_status(), RunPhase::Running);
    }

    #[test]
    fn receive_unknown_key_fails() {
        let u = updater();
        let err = u
            .receive(PluginUpdate {
                plugin: PluginName::new("nope"),
                node: NodeName::new("n1"),
                status: RunPhase::Complete,
                result_status: String::new(),
                result_counts: HashMap::new(),
            })
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn one_failed_member_makes_run_failed() {
        let u = updater();
        u.receive(PluginUpdate {
            plugin: PluginName::new("e2e"),
            node: NodeName::global(),
            status: RunPhase::Complete,
            result_status: "passed".into(),
            result_counts: HashMap::new(),
        })
        .unwrap();
        u.receive(PluginUpdate {
            plugin: PluginName::new("systemd-logs"),
            node: NodeName::new("n1"),
            status: RunPhase::Failed,
            result_status: "failed".into(),
            result_counts: HashMap::new(),
        })
        .unwrap();
        assert_eq!(u.current_status(), RunPhase::Failed);
    }

    #[test]
    fn failed_status_stays_failed_after_later_roll_up() {
        let u = updater();
        u.receive(PluginUpdate {
            plugin: PluginName::new("e2e"),
            node: NodeName::global(),
            status: RunPhase::Failed,
            result_status: "failed".into(),
            result_counts: HashMap::new(),
        })
        .unwrap();
        // A second, unrelated record finishing "complete" cannot un-fail the run (IV1).
        u.receive(PluginUpdate {
            plugin: PluginName::new("systemd-logs"),
            node: NodeName::new("n1"),
            status: RunPhase::Complete,
            result_status: "passed".into(),
            result_counts: HashMap::new(),
        })
        .unwrap();
        assert_eq!(u.current_status(), RunPhase::Failed);
    }

    #[tokio::test]
    async fn annotate_writes_serialized_snapshot() {
        let annotator = Arc::new(RecordingAnnotator::new());
        let expected = vec![expectation("e2e", "global")];
        let u = StatusUpdater::new(&expected, "sonobuoy/pod-1", annotator.clone());
        u.annotate().await.unwrap();
        let body = annotator.last().expect("a patch was recorded");
        assert!(body.contains("\"running\""));
    }

    #[test]
    fn serialize_reflects_fold_plugin_summary() {
        let u = updater();
        u.fold_plugin_summary(&PluginName::new("e2e"), "passed");
        let body = u.serialize().unwrap();
        assert!(body.contains("\"result_status\":\"passed\""));
    }

    #[test]
    fn mark_complete_transitions_running_records_to_complete() {
        let u = updater();
        u.mark_complete();
        assert_eq!(u.current_status(), RunPhase::Complete);
    }

    #[test]
    fn mark_complete_does_not_clear_a_failed_record() {
        let u = updater();
        u.receive(PluginUpdate {
            plugin: PluginName::new("e2e"),
            node: NodeName::global(),
            status: RunPhase::Failed,
            result_status: "failed".into(),
            result_counts: HashMap::new(),
        })
        .unwrap();
        u.mark_complete();
        assert_eq!(u.current_status(), RunPhase::Failed);
    }
}
