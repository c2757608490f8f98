use conform_archive::TarballDescriptor;
use conform_domain::RunPhase;
use serde::{Deserialize, Serialize};

/// What the Orchestrator hands back to its caller (§4.10, §7): the final
/// derived status, the accumulated best-effort error count, and the
/// tarball descriptor if step 9 succeeded. `errCount` is "the only overall
/// pass/fail signal" a caller outside the annotation needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub status: RunPhase,
    pub error_count: usize,
    pub errors: Vec<String>,
    pub tarball: Option<TarballDescriptor>,
}

impl RunReport {
    pub fn new() -> Self {
        RunReport {
            status: RunPhase::Running,
            error_count: 0,
            errors: Vec::new(),
            tarball: None,
        }
    }

    pub fn record_error(&mut self, context: &str, message: impl std::fmt::Display) {
        self.error_count += 1;
        self.errors.push(format!("{context}: {message}"));
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
