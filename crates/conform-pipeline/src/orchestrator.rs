use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use conform_archive::write_tarball;
use conform_cluster::{collect_node_endpoints, run_discovery, ClusterClient, LogCollector, LogOptions, QueryOptions, QueryRecorder};
use conform_config::RunConfig;
use conform_domain::{PluginExpectation, PluginName, TarballInfo};
use conform_health::{compute_cluster_health, write_cluster_health};
use conform_store::{PodAnnotator, StatusUpdater};
use regex::Regex;
use tracing::{error, info, info_span, warn, Instrument};

use crate::annotator::ClusterPodAnnotator;
use crate::driver::AggregationDriver;
use crate::error::PipelineError;
use crate::report::RunReport;

/// Everything a single run needs: the wiring config, the cluster
/// capability, the plugin-aggregation capability, and where to stage and
/// archive the run directory (§3, §4.10).
pub struct RunInputs {
    pub config: RunConfig,
    pub client: Arc<dyn ClusterClient>,
    pub driver: Arc<dyn AggregationDriver>,
    pub run_root: PathBuf,
    pub archive_dest: PathBuf,
    pub namespace_regex: Regex,
}

/// Runs the deterministic ten-step pipeline (§4.10). Steps 1 and the
/// caller's own client construction are the only fatal failures (§7); every
/// other step folds its error into the returned [`RunReport`] and the run
/// continues to packaging.
///
/// The returned future holds a thread-local tracing subscriber guard for
/// the run's `meta/run.log` sink and so is not `Send`; await it directly
/// (e.g. from `#[tokio::main]`) rather than `tokio::spawn`ing it — in
/// keeping with the orchestrator being single-threaded and sequential (§5).
pub async fn run(inputs: RunInputs) -> Result<RunReport, PipelineError> {
    let run_span = info_span!("run", run_id = inputs.config.run_id.clone().unwrap_or_else(|| "unknown".to_string()));
    run_inner(inputs).instrument(run_span).await
}

async fn run_inner(inputs: RunInputs) -> Result<RunReport, PipelineError> {
    let mut report = RunReport::new();

    // Step 1: create <run> and <run>/meta/. Fatal (§7).
    let meta_dir = inputs.run_root.join("meta");
    std::fs::create_dir_all(&meta_dir).map_err(|e| PipelineError::RunDirCreation {
        path: meta_dir.display().to_string(),
        source: e,
    })?;

    let _log_guards = match crate::logging::attach_run_log_sink(&meta_dir) {
        Ok(guards) => Some(guards),
        Err(e) => {
            warn!(error = %e, "failed to attach run log file sink, continuing with the default subscriber");
            None
        }
    };

    // Step 2: initialize the Status Updater with `running`; patch the annotation.
    let annotator: Arc<dyn PodAnnotator> = Arc::new(ClusterPodAnnotator::new(
        inputs.client.clone(),
        inputs.config.pod_namespace.clone(),
        inputs.config.pod_name.clone(),
    ));
    let updater = StatusUpdater::new(&inputs.config.plugins, format!("{}/{}", inputs.config.pod_namespace, inputs.config.pod_name), annotator);
    if let Err(e) = updater.annotate().await {
        report.record_error("initial annotate", e);
    }

    // Step 3: serialize configuration into meta/config.json.
    if let Err(e) = write_config(&inputs.run_root, &inputs.config) {
        report.record_error("serialize config", e);
    }

    // Step 4: drive plugin aggregation (external), then cleanup.
    if let Err(e) = inputs.driver.run(&inputs.config).await {
        if e.timeout() {
            error!(error = %e, "plugin aggregation timed out");
        }
        report.record_error("plugin aggregation", e);
    }

    // Step 5: per-plugin post-process, persist, fold, annotate.
    for plugin in distinct_plugins(&inputs.config.plugins) {
        let plugin_span = info_span!("plugin", name = plugin.plugin.as_str());
        let result = process_one_plugin(&inputs.run_root, &plugin, &updater).instrument(plugin_span).await;
        if let Err(e) = result {
            report.record_error(&format!("plugin {}", plugin.plugin), e);
        }
    }

    // Step 6: serialize plugin manifests into plugins/<name>/definition.json, plus meta/info.json.
    if let Err(e) = write_plugin_manifests(&inputs.run_root, &inputs.config.plugins) {
        report.record_error("serialize plugin manifests", e);
    }

    // Step 7: discovery queries (C6, C7).
    let recorder = QueryRecorder::new();
    let query_opts = QueryOptions {
        namespace_regex: inputs.namespace_regex.clone(),
        default_namespace: inputs.config.pod_namespace.clone(),
        resource_allowlist: Vec::new(),
    };
    if let Err(e) = run_discovery(inputs.client.as_ref(), &inputs.run_root, &query_opts, &recorder).await {
        report.record_error("discovery query pass", e);
    }
    if let Err(e) = write_query_time(&inputs.run_root, &recorder) {
        report.record_error("serialize query-time.json", e);
    }

    let namespaces = conform_cluster::select_namespaces(inputs.client.as_ref(), &query_opts).await;
    let mut collector = LogCollector::new();
    for ns in &namespaces {
        if let Err(e) = collector.collect_namespace(inputs.client.as_ref(), &inputs.run_root, ns, &LogOptions::default()).await {
            report.record_error(&format!("pod log collection for namespace {ns}"), e);
        }
    }
    match inputs.client.list_node_names().await {
        Ok(nodes) => {
            collect_node_endpoints(inputs.client.as_ref(), &inputs.run_root, &nodes).await;
        }
        Err(e) => report.record_error("listing node names", e),
    }

    // Step 8: health summary (C8).
    match compute_cluster_health(&inputs.run_root, None) {
        Ok(summary) => {
            if let Err(e) = write_cluster_health(&inputs.run_root, &summary) {
                report.record_error("write cluster_health.json", e);
            }
        }
        Err(e) => report.record_error("compute cluster health", e),
    }

    // Step 9: produce the tarball; stat size + sha256; remove the staging dir.
    match write_tarball(&inputs.run_root, &inputs.archive_dest) {
        Ok(descriptor) => {
            updater.set_tarball(TarballInfo {
                name: descriptor.path.file_name().unwrap_or_default().to_string_lossy().to_string(),
                size_bytes: descriptor.size_bytes,
                sha256: descriptor.sha256.clone(),
            });
            report.tarball = Some(descriptor);
        }
        Err(e) => report.record_error("write tarball", e),
    }

    // Step 10: mark every non-failed record complete (§2, §4.10 step 10),
    // then patch the annotation to its final, derived status. A record
    // already failed stays failed — failure is sticky (§4.1).
    updater.mark_complete();
    if let Err(e) = updater.annotate().await {
        report.record_error("final annotate", e);
    }

    report.status = updater.current_status();
    info!(status = %report.status, errors = report.error_count, "run complete");
    Ok(report)
}

fn distinct_plugins(expected: &[PluginExpectation]) -> Vec<PluginSpec> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for e in expected {
        if seen.insert(e.plugin.as_str().to_string()) {
            out.push(PluginSpec {
                plugin: e.plugin.clone(),
                is_per_node: expected.iter().any(|o| o.plugin == e.plugin && o.is_per_node()),
                result_format: e.result_format,
                result_files: e.result_files.clone(),
            });
        }
    }
    out
}

struct PluginSpec {
    plugin: PluginName,
    is_per_node: bool,
    result_format: conform_domain::ResultFormat,
    result_files: Option<Vec<String>>,
}

async fn process_one_plugin(run_root: &Path, spec: &PluginSpec, updater: &StatusUpdater) -> Result<(), PipelineError> {
    let plugin_dir = run_root.join("plugins").join(spec.plugin.as_str());
    let (summary, walk_errors) = conform_format::process_plugin(
        spec.plugin.as_str(),
        &plugin_dir,
        spec.is_per_node,
        spec.result_format,
        spec.result_files.as_deref(),
    );
    for e in &walk_errors {
        warn!(plugin = spec.plugin.as_str(), error = %e, "plugin post-processing directory error");
    }

    std::fs::create_dir_all(&plugin_dir).map_err(|e| PipelineError::Io {
        path: plugin_dir.display().to_string(),
        source: e,
    })?;
    let yaml = serde_yaml::to_string(&summary)?;
    std::fs::write(plugin_dir.join("sonobuoy_results.yaml"), yaml).map_err(|e| PipelineError::Io {
        path: plugin_dir.display().to_string(),
        source: e,
    })?;

    updater.fold_plugin_summary(&spec.plugin, &summary.status);
    updater.annotate().await?;
    Ok(())
}

fn write_config(run_root: &Path, config: &RunConfig) -> Result<(), PipelineError> {
    let meta_dir = run_root.join("meta");
    std::fs::create_dir_all(&meta_dir).map_err(|e| PipelineError::Io {
        path: meta_dir.display().to_string(),
        source: e,
    })?;
    let body = serde_json::to_vec_pretty(config)?;
    std::fs::write(meta_dir.join("config.json"), body).map_err(|e| PipelineError::Io {
        path: meta_dir.display().to_string(),
        source: e,
    })
}

#[derive(serde::Serialize)]
struct PluginManifest<'a> {
    plugin: &'a str,
    node: &'a str,
    result_format: String,
    result_files: &'a Option<Vec<String>>,
}

fn write_plugin_manifests(run_root: &Path, expected: &[PluginExpectation]) -> Result<(), PipelineError> {
    let mut names = Vec::new();
    for e in expected {
        names.push(e.plugin.as_str().to_string());
        let dir = run_root.join("plugins").join(e.plugin.as_str());
        std::fs::create_dir_all(&dir).map_err(|io| PipelineError::Io {
            path: dir.display().to_string(),
            source: io,
        })?;
        let manifest = PluginManifest {
            plugin: e.plugin.as_str(),
            node: e.node.as_str(),
            result_format: e.result_format.to_string(),
            result_files: &e.result_files,
        };
        let body = serde_json::to_vec_pretty(&manifest)?;
        std::fs::write(dir.join("definition.json"), body).map_err(|io| PipelineError::Io {
            path: dir.display().to_string(),
            source: io,
        })?;
    }

    names.sort();
    names.dedup();
    let meta_dir = run_root.join("meta");
    let info = serde_json::json!({ "plugins": names });
    std::fs::write(meta_dir.join("info.json"), serde_json::to_vec_pretty(&info)?).map_err(|io| PipelineError::Io {
        path: meta_dir.display().to_string(),
        source: io,
    })
}

fn write_query_time(run_root: &Path, recorder: &QueryRecorder) -> Result<(), PipelineError> {
    let meta_dir = run_root.join("meta");
    std::fs::create_dir_all(&meta_dir).map_err(|e| PipelineError::Io {
        path: meta_dir.display().to_string(),
        source: e,
    })?;
    let body = recorder.serialize()?;
    std::fs::write(meta_dir.join("query-time.json"), body).map_err(|e| PipelineError::Io {
        path: meta_dir.display().to_string(),
        source: e,
    })
}
