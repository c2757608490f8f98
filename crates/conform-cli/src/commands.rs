use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use conform_cluster::KubeClusterClient;
use conform_config::load_run_config;
use conform_pipeline::{LocalAggregationDriver, RunInputs};
use regex::Regex;
use tracing::info;

use crate::output::render_report;

pub async fn run(config_path: PathBuf, run_dir: PathBuf, archive_dir: PathBuf, namespace_regex: String) -> Result<()> {
    let config = load_run_config(&config_path).with_context(|| format!("loading run config from {}", config_path.display()))?;

    let client = kube::Client::try_default()
        .await
        .context("failed to construct cluster API client")?;

    let inputs = RunInputs {
        config,
        client: Arc::new(KubeClusterClient::new(client)),
        // The plugin-aggregation subsystem itself is a capability this core
        // consumes, not implements (§1 Non-goals) — wiring in the real
        // driver is left to the caller that owns plugin scheduling.
        driver: Arc::new(LocalAggregationDriver),
        run_root: run_dir,
        archive_dest: archive_dir,
        namespace_regex: Regex::new(&namespace_regex).context("invalid namespace regex")?,
    };

    info!("starting aggregator run");
    let report = conform_pipeline::run(inputs).await?;
    println!("{}", render_report(&report));

    Ok(())
}
