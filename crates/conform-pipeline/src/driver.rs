use async_trait::async_trait;
use conform_config::RunConfig;

use crate::error::AggregationError;

/// The plugin-aggregation subsystem (§3, §4.10 step 4), consumed as a
/// capability rather than implemented here — launching test containers and
/// delivering per-unit status deltas is explicitly out of scope (§1
/// Non-goals).
#[async_trait]
pub trait AggregationDriver: Send + Sync {
    async fn run(&self, config: &RunConfig) -> Result<(), AggregationError>;
}

/// A driver that completes instantly and reports nothing running. Used by
/// tests and local dry-runs the same way the cluster crate's
/// `LocalClusterClient` stands in for a live API server.
pub struct LocalAggregationDriver;

#[async_trait]
impl AggregationDriver for LocalAggregationDriver {
    async fn run(&self, _config: &RunConfig) -> Result<(), AggregationError> {
        Ok(())
    }
}
