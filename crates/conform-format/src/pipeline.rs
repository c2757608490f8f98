use std::path::Path;

use conform_domain::{Item, ResultFormat, META_TYPE, TYPE_NODE, TYPE_SUMMARY};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::aggregate;
use crate::error_artifact;
use crate::selector::{error_selector, file_or_extension, Selector};

type ProcessFn = fn(&Path, &Path) -> Item;

fn dispatch(format: ResultFormat) -> ProcessFn {
    match format {
        ResultFormat::Junit | ResultFormat::E2e => crate::junit::process,
        ResultFormat::Gojson => crate::gojson::process,
        ResultFormat::Raw => crate::raw::process,
        ResultFormat::Manual => crate::manual::process,
    }
}

fn extensions(format: ResultFormat) -> &'static [&'static str] {
    match format {
        ResultFormat::Junit | ResultFormat::E2e => &[".xml"],
        ResultFormat::Gojson => &[".json"],
        ResultFormat::Raw => &["*"],
        ResultFormat::Manual => &[".yaml", ".yml"],
    }
}

/// Recursively collect matched files under `dir`, sorted for deterministic
/// output, each run through `process` (with paths relative to `plugin_root`
/// for `metadata[file]`).
fn collect(dir: &Path, plugin_root: &Path, selector: &dyn Selector, process: ProcessFn) -> (Vec<Item>, Vec<String>) {
    let mut paths = Vec::new();
    let mut errors = Vec::new();

    if !dir.exists() {
        return (Vec::new(), Vec::new());
    }

    for entry in WalkDir::new(dir).into_iter() {
        match entry {
            Ok(e) => {
                if selector.accepts(e.path(), e.file_type().is_file()) {
                    paths.push(e.path().to_path_buf());
                }
            }
            Err(e) => errors.push(format!("walking {}: {}", dir.display(), e)),
        }
    }
    paths.sort();

    let items = paths
        .into_iter()
        .map(|p| process(plugin_root, &p))
        .collect();
    (items, errors)
}

/// Per-plugin pipeline (C5, §4.5): walks `results/` (fanning out per node
/// when `is_per_node`) and `errors/`, dispatches the format-specific
/// processor, and folds everything into a `summary` Item named after the
/// plugin. Errors from the walk itself (not missing directories, not
/// per-artifact parse failures) are returned alongside the best-effort
/// tree — the run is never aborted because one plugin's post-processing
/// failed (§4.5 closing paragraph).
pub fn process_plugin(
    plugin_name: &str,
    plugin_dir: &Path,
    is_per_node: bool,
    result_format: ResultFormat,
    result_files: Option<&[String]>,
) -> (Item, Vec<String>) {
    let mut errors = Vec::new();
    let results_dir = plugin_dir.join("results");
    let errors_dir = plugin_dir.join("errors");
    let exts = extensions(result_format);
    let selector = file_or_extension(result_files, exts);
    let process = dispatch(result_format);

    let mut result_items = Vec::new();

    let per_node_subdirs: Vec<std::path::PathBuf> = if results_dir.exists() {
        let mut dirs: Vec<_> = std::fs::read_dir(&results_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.is_dir())
                    .collect()
            })
            .unwrap_or_default();
        dirs.sort();
        dirs
    } else {
        Vec::new()
    };

    if is_per_node && !per_node_subdirs.is_empty() {
        for node_dir in per_node_subdirs {
            let node_name = node_dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();
            let (files, mut errs) = collect(&node_dir, plugin_dir, &selector, process);
            errors.append(&mut errs);

            let mut node_item = Item::new(node_name, "");
            node_item.set_meta(META_TYPE, TYPE_NODE);
            node_item.items = files;
            result_items.push(node_item);
        }
    } else {
        if is_per_node {
            // §9 open question: legacy archives can omit the <node> level
            // entirely. Fall back to a single cluster-scoped tree rather
            // than guessing a synthetic node name.
            debug!(plugin = plugin_name, "per-node plugin has no node subdirectories, falling back to cluster-scoped layout");
        }
        let (files, mut errs) = collect(&results_dir, plugin_dir, &selector, process);
        errors.append(&mut errs);
        result_items.extend(files);
    }

    let (error_items, mut errs) = collect(&errors_dir, plugin_dir, &error_selector(), error_artifact::process);
    errors.append(&mut errs);

    let mut summary = Item::new(plugin_name, "");
    summary.set_meta(META_TYPE, TYPE_SUMMARY);
    summary.items.extend(result_items);
    summary.items.extend(error_items);

    aggregate::aggregate(&mut summary);

    if !errors.is_empty() {
        warn!(plugin = plugin_name, count = errors.len(), "plugin post-processing collected directory errors");
    }

    (summary, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn cluster_scoped_junit_plugin() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "results/junit.xml",
            r#"<testsuites><testsuite name="s"><testcase name="t1"/></testsuite></testsuites>"#,
        );
        let (summary, errors) = process_plugin("e2e", dir.path(), false, ResultFormat::Junit, None);
        assert!(errors.is_empty());
        assert_eq!(summary.status, "passed");
        assert_eq!(summary.items.len(), 1);
    }

    #[test]
    fn per_node_plugin_fans_out_by_node() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "results/node-1/out.log", "hi");
        write(dir.path(), "results/node-2/out.log", "hi");
        let (summary, _) = process_plugin("systemd-logs", dir.path(), true, ResultFormat::Raw, None);
        assert_eq!(summary.items.len(), 2);
        assert_eq!(summary.items[0].meta(conform_domain::META_TYPE), Some("node"));
    }

    #[test]
    fn per_node_plugin_without_node_dirs_falls_back_to_cluster_scoped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "results/out.log", "hi");
        let (summary, _) = process_plugin("systemd-logs", dir.path(), true, ResultFormat::Raw, None);
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.items[0].meta(conform_domain::META_TYPE), Some("file"));
    }

    #[test]
    fn errors_directory_folds_into_summary() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "results/junit.xml", "<testsuites></testsuites>");
        write(dir.path(), "errors/error.json", r#"{"error":"boom"}"#);
        let (summary, _) = process_plugin("e2e", dir.path(), false, ResultFormat::Junit, None);
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.items[0].name, "boom");
    }

    #[test]
    fn missing_directories_are_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (summary, errors) = process_plugin("e2e", dir.path(), false, ResultFormat::Junit, None);
        assert!(errors.is_empty());
        assert_eq!(summary.status, "unknown");
    }
}
