use std::path::Path;

use conform_domain::{Item, META_FILE, META_TYPE, TYPE_FILE};

/// Reads an `errors/<file>` entry as a JSON object and copies its fields
/// into `details` (§4.4). `status=failed` by default, promoted to
/// `timeout` when `details["error"]` contains the substring `timeout`
/// (case-sensitive). When `details["error"]` is non-empty the Item's
/// `name` is overwritten with that string (IV6).
pub fn process(plugin_dir: &Path, file_path: &Path) -> Item {
    let relpath = super::relpath(plugin_dir, file_path);
    let basename = super::basename(file_path);
    let mut item = Item::new(&basename, "failed");
    item.set_meta(META_TYPE, TYPE_FILE);
    item.set_meta(META_FILE, &relpath);

    let content = match std::fs::read_to_string(file_path) {
        Ok(c) => c,
        Err(e) => {
            item.mark_error(format!("reading {}: {}", relpath, e));
            return item;
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            item.mark_error(format!("parsing error artifact: {}", e));
            return item;
        }
    };

    if let serde_json::Value::Object(map) = value {
        for (k, v) in map {
            item.details.insert(k, v);
        }
    }

    let error_text = item
        .details
        .get("error")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    if !error_text.is_empty() {
        item.name = error_text.clone();
        if error_text.contains("timeout") {
            item.status = "timeout".to_string();
        }
    }

    item
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_text_becomes_item_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.json");
        std::fs::write(&path, r#"{"error":"timeout waiting for plugin"}"#).unwrap();
        let item = process(dir.path(), &path);
        assert_eq!(item.name, "timeout waiting for plugin");
        assert_eq!(item.status, "timeout");
    }

    #[test]
    fn non_timeout_error_stays_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.json");
        std::fs::write(&path, r#"{"error":"plugin crashed"}"#).unwrap();
        let item = process(dir.path(), &path);
        assert_eq!(item.status, "failed");
        assert_eq!(item.name, "plugin crashed");
    }

    #[test]
    fn missing_error_field_keeps_basename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.json");
        std::fs::write(&path, r#"{"detail":"something"}"#).unwrap();
        let item = process(dir.path(), &path);
        assert_eq!(item.name, "error.json");
        assert_eq!(item.status, "failed");
    }
}
