use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tar::Builder;
use uuid::Uuid;

use crate::error::ArchiveError;

/// Everything the Orchestrator needs to attach to the completion annotation
/// (§4.10 step 9, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TarballDescriptor {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
}

/// Packages `run_dir` into `<timestamp>_sonobuoy_<uuid>.tar.gz` in
/// `dest_dir`, then removes `run_dir`. File ordering within the tarball is
/// unspecified; readers must use path lookups (§4.9).
pub fn write_tarball(run_dir: &Path, dest_dir: &Path) -> Result<TarballDescriptor, ArchiveError> {
    std::fs::create_dir_all(dest_dir).map_err(|e| io_err(dest_dir, e))?;

    let name = format!("{}_sonobuoy_{}.tar.gz", Utc::now().format("%Y%m%d%H%M"), Uuid::new_v4());
    let tarball_path = dest_dir.join(&name);

    {
        let file = File::create(&tarball_path).map_err(|e| io_err(&tarball_path, e))?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);
        builder.append_dir_all(".", run_dir).map_err(|e| io_err(run_dir, e))?;
        builder
            .into_inner()
            .map_err(|e| io_err(&tarball_path, e))?
            .finish()
            .map_err(|e| io_err(&tarball_path, e))?;
    }

    let size_bytes = std::fs::metadata(&tarball_path).map_err(|e| io_err(&tarball_path, e))?.len();
    let sha256 = sha256_of(&tarball_path)?;

    std::fs::remove_dir_all(run_dir).map_err(|e| io_err(run_dir, e))?;

    Ok(TarballDescriptor {
        path: tarball_path,
        size_bytes,
        sha256,
    })
}

fn sha256_of(path: &Path) -> Result<String, ArchiveError> {
    let mut file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| io_err(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}

fn io_err(path: &Path, source: std::io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: path.display().to_string(),
        source,
    }
}
