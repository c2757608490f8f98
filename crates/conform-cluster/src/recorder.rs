use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One timed query, matching the `meta/query-time.json` wire shape (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub queryobj: String,
    pub namespace: String,
    /// Elapsed wall time in seconds.
    pub time: f64,
    pub error: Option<String>,
}

/// Accumulates [`QueryRecord`]s across the C6 discovery pass and serializes
/// them to `meta/query-time.json` at the end of the run. A single mutex
/// guards the backing vector; queries may be timed from either sequential
/// or concurrent call sites.
#[derive(Default)]
pub struct QueryRecorder {
    records: Mutex<Vec<QueryRecord>>,
}

impl QueryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, queryobj: impl Into<String>, namespace: impl Into<String>, elapsed: Duration, error: Option<String>) {
        self.records.lock().unwrap().push(QueryRecord {
            queryobj: queryobj.into(),
            namespace: namespace.into(),
            time: elapsed.as_secs_f64(),
            error,
        });
    }

    pub fn records(&self) -> Vec<QueryRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records())
    }
}
