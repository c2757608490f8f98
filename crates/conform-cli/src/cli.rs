use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "conform", about = "Kubernetes conformance/diagnostic run aggregator", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute a single aggregator run against a live cluster.
    Run {
        /// Path to the run's wiring config (YAML or JSON).
        config: PathBuf,

        /// Directory the run is staged in before archival.
        #[arg(long, default_value = "./run")]
        run_dir: PathBuf,

        /// Directory the final tarball is written into.
        #[arg(long, default_value = ".")]
        archive_dir: PathBuf,

        /// Regex selecting which namespaces are queried in the discovery pass.
        #[arg(long, default_value = ".*")]
        namespace_regex: String,
    },
}
