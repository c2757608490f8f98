pub mod annotator;
pub mod driver;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod report;

pub use driver::{AggregationDriver, LocalAggregationDriver};
pub use error::{AggregationError, PipelineError};
pub use orchestrator::{run, RunInputs};
pub use report::RunReport;
