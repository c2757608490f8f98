use std::path::Path;

use conform_domain::{Item, META_FILE, META_TYPE, TYPE_FILE};

/// One leaf Item per matched file (§4.4). `status=passed` if the file is
/// stat-able, otherwise `failed` with `metadata[error]` set.
pub fn process(plugin_dir: &Path, file_path: &Path) -> Item {
    let relpath = super::relpath(plugin_dir, file_path);
    let basename = super::basename(file_path);
    let mut item = Item::new(&basename, "passed");
    item.set_meta(META_TYPE, TYPE_FILE);
    item.set_meta(META_FILE, &relpath);

    if let Err(e) = std::fs::metadata(file_path) {
        item.status = "failed".to_string();
        item.set_meta(conform_domain::META_ERROR, format!("stat {}: {}", relpath, e));
    }

    item
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_is_passed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        std::fs::write(&path, b"hello").unwrap();
        let item = process(dir.path(), &path);
        assert_eq!(item.status, "passed");
    }

    #[test]
    fn missing_file_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.log");
        let item = process(dir.path(), &path);
        assert_eq!(item.status, "failed");
        assert!(item.meta(conform_domain::META_ERROR).is_some());
    }
}
