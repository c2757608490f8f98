pub mod error;
pub mod reader;
pub mod writer;

pub use error::ArchiveError;
pub use reader::{ArchiveReader, ArchiveVersion};
pub use writer::{write_tarball, TarballDescriptor};
