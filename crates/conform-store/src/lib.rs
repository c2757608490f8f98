pub mod error;
pub mod updater;

pub use error::StoreError;
pub use updater::{PluginUpdate, PodAnnotator, RecordingAnnotator, StatusUpdater, STATUS_ANNOTATION_KEY};
