use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Adds `meta/run.log` as a second, line-delimited-JSON `tracing` layer for
/// the duration of the returned guard's lifetime (§10.1) — a file sink
/// layered alongside whatever subscriber the binary entrypoint already
/// installed, not a bespoke writer. The caller must keep both the guard and
/// the dispatcher-scope guard alive until the run completes.
pub fn attach_run_log_sink(meta_dir: &Path) -> std::io::Result<(tracing::subscriber::DefaultGuard, WorkerGuard)> {
    let file_appender = tracing_appender::rolling::never(meta_dir, "run.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking));

    let scope_guard = tracing::subscriber::set_default(subscriber);
    Ok((scope_guard, guard))
}
