use std::path::Path;

use conform_domain::{Item, META_FILE, META_TYPE, TYPE_FILE};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GoTestRecord {
    action: String,
    test: Option<String>,
}

/// Parse a Go-test JSON event stream into an Item tree (§4.4). `run`,
/// `pause`, `cont`, `output`, `bench` actions are skipped, as are records
/// with no `test` field. Test items are appended in stream order; there is
/// no in-processor aggregation, so the returned items carry leaf statuses
/// only — the parent's status is left for the aggregation engine.
pub fn process(plugin_dir: &Path, file_path: &Path) -> Item {
    let relpath = super::relpath(plugin_dir, file_path);
    let basename = super::basename(file_path);
    let mut item = Item::new(&basename, "");
    item.set_meta(META_TYPE, TYPE_FILE);
    item.set_meta(META_FILE, &relpath);

    let content = match std::fs::read_to_string(file_path) {
        Ok(c) => c,
        Err(e) => {
            item.mark_error(format!("reading {}: {}", relpath, e));
            return item;
        }
    };

    let mut any_record = false;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: GoTestRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(_) => continue, // malformed lines are skipped, not fatal
        };
        any_record = true;

        let test = match &record.test {
            Some(t) => t,
            None => continue,
        };

        let status = match record.action.as_str() {
            "run" | "pause" | "cont" | "output" | "bench" => continue,
            "pass" => "passed",
            "fail" => "failed",
            "skip" => "skipped",
            _ => "unknown",
        };

        item.items.push(Item::new(test, status));
    }

    if !any_record && item.items.is_empty() {
        // An empty or entirely-malformed stream is still a best-effort leaf.
        item.status = "unknown".to_string();
    }

    item
}
