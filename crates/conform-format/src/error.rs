use thiserror::Error;

/// Directory-walk level failures (§4.5, §7 "per-plugin aggregation
/// failures"). Per-artifact parse failures never surface here — they are
/// folded into the offending [`conform_domain::Item`] via `mark_error`
/// instead, so the run is never aborted because one file failed to parse.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("io error walking {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
