use std::path::Path;

use conform_domain::{Item, META_FILE, META_TYPE, TYPE_FILE};

/// Parse a single YAML document directly into the Item schema (§4.4).
/// User-supplied `status` values are preserved verbatim — this is how
/// custom-tally mode (§4.5) gets triggered downstream.
pub fn process(plugin_dir: &Path, file_path: &Path) -> Item {
    let relpath = super::relpath(plugin_dir, file_path);
    let basename = super::basename(file_path);

    let content = match std::fs::read_to_string(file_path) {
        Ok(c) => c,
        Err(e) => {
            let mut item = Item::new(&basename, "");
            item.set_meta(META_TYPE, TYPE_FILE);
            item.set_meta(META_FILE, &relpath);
            item.mark_error(format!("reading {}: {}", relpath, e));
            return item;
        }
    };

    match serde_yaml::from_str::<Item>(&content) {
        Ok(mut item) => {
            if item.name.is_empty() {
                item.name = basename;
            }
            item.set_meta(META_TYPE, TYPE_FILE);
            item.set_meta(META_FILE, &relpath);
            item
        }
        Err(e) => {
            let mut item = Item::new(&basename, "");
            item.set_meta(META_TYPE, TYPE_FILE);
            item.set_meta(META_FILE, &relpath);
            item.mark_error(format!("parsing manual yaml: {}", e));
            item
        }
    }
}
