pub mod error;
pub mod ids;
pub mod item;
pub mod plugin;
pub mod status;

pub use error::DomainError;
pub use ids::{NodeName, PluginName, GLOBAL_NODE};
pub use item::{Item, META_ERROR, META_FILE, META_TYPE, TYPE_FILE, TYPE_NODE, TYPE_SUMMARY};
pub use plugin::{PluginExpectation, PluginStatus, ResultFormat, RunStatus, TarballInfo};
pub use status::{roll_up_status, RunPhase};
