use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde_json::Value;
use tar::Archive;

use crate::error::ArchiveError;

/// On-disk archive layout generations (§4.9). Path resolution for `nodes`,
/// `server version`, `non-namespaced resources`, and `config` differs by
/// version; `V15Plus` also covers the layout this crate's own writer
/// produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveVersion {
    V08,
    V09,
    V10,
    V15Plus,
}

impl ArchiveVersion {
    fn from_config_value(value: &Value) -> Self {
        match value.get("version").and_then(Value::as_str) {
            Some("v0.8") => ArchiveVersion::V08,
            Some("v0.9") => ArchiveVersion::V09,
            Some("v0.10") => ArchiveVersion::V10,
            _ => ArchiveVersion::V15Plus,
        }
    }

    pub fn config_path(self) -> &'static str {
        match self {
            ArchiveVersion::V08 => "config.json",
            _ => "meta/config.json",
        }
    }

    pub fn server_version_path(self) -> &'static str {
        match self {
            ArchiveVersion::V08 | ArchiveVersion::V09 => "serverversion.json",
            _ => "serverversion.json",
        }
    }

    pub fn nodes_path(self) -> &'static str {
        match self {
            ArchiveVersion::V08 => "nodes.json",
            ArchiveVersion::V09 | ArchiveVersion::V10 => "resources/non-ns/core_v1_nodes.json",
            ArchiveVersion::V15Plus => "resources/cluster/core_v1_nodes.json",
        }
    }

    pub fn non_namespaced_resources_dir(self) -> &'static str {
        match self {
            ArchiveVersion::V08 | ArchiveVersion::V09 | ArchiveVersion::V10 => "resources/non-ns",
            ArchiveVersion::V15Plus => "resources/cluster",
        }
    }
}

/// Forward-only, single-pass reader over a `.tar.gz` archive produced by
/// [`crate::writer::write_tarball`] or an earlier-generation Sonobuoy-style
/// writer (§4.9, §5). Each call that needs to walk the stream reopens the
/// underlying file from the start, since the tar/gzip decoder itself can
/// only move forward.
pub struct ArchiveReader {
    path: PathBuf,
    version: ArchiveVersion,
}

impl ArchiveReader {
    /// Opens `path`, performing one pass to locate the config file and
    /// determine the layout version.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let path = path.into();
        let mut found: Option<Value> = None;

        walk_archive(&path, |entry_path, body| {
            if entry_path == "meta/config.json" || entry_path == "config.json" {
                let value: Value = serde_json::from_slice(body)?;
                found = Some(value);
                return Err(ArchiveError::StopWalk);
            }
            Ok(())
        })?;

        let config = found.ok_or(ArchiveError::UnknownVersion)?;
        Ok(ArchiveReader {
            path,
            version: ArchiveVersion::from_config_value(&config),
        })
    }

    pub fn version(&self) -> ArchiveVersion {
        self.version
    }

    /// Calls `visitor` with `(path, body)` for every regular file in the
    /// archive, in tar order. Returning [`ArchiveError::StopWalk`] from
    /// `visitor` ends the walk early without surfacing as an error.
    pub fn walk<F>(&self, mut visitor: F) -> Result<(), ArchiveError>
    where
        F: FnMut(&str, &[u8]) -> Result<(), ArchiveError>,
    {
        walk_archive(&self.path, &mut visitor)
    }

    /// Reads a single file's full body by path, short-circuiting the walk
    /// once found.
    pub fn read_file(&self, target: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let mut found = None;
        self.walk(|entry_path, body| {
            if entry_path == target {
                found = Some(body.to_vec());
                return Err(ArchiveError::StopWalk);
            }
            Ok(())
        })?;
        Ok(found)
    }
}

fn walk_archive<F>(path: &Path, mut visitor: F) -> Result<(), ArchiveError>
where
    F: FnMut(&str, &[u8]) -> Result<(), ArchiveError>,
{
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    let entries = archive.entries().map_err(|e| io_err(path, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| io_err(path, e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let entry_path = entry.path().map_err(|e| io_err(path, e))?.to_string_lossy().replace('\\', "/");
        let mut body = Vec::new();
        entry.read_to_end(&mut body).map_err(|e| io_err(path, e))?;

        match visitor(&entry_path, &body) {
            Ok(()) => {}
            Err(ArchiveError::StopWalk) => return Ok(()),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn io_err(path: &Path, source: std::io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_tarball;
    use tempfile::tempdir;

    fn make_archive() -> (tempfile::TempDir, PathBuf) {
        let staging = tempdir().unwrap();
        std::fs::create_dir_all(staging.path().join("meta")).unwrap();
        std::fs::write(staging.path().join("meta").join("config.json"), r#"{"version":"v0.15"}"#).unwrap();
        std::fs::create_dir_all(staging.path().join("resources").join("cluster")).unwrap();
        std::fs::write(
            staging.path().join("resources").join("cluster").join("core_v1_nodes.json"),
            r#"{"items":[]}"#,
        )
        .unwrap();

        let dest = tempdir().unwrap();
        let descriptor = write_tarball(staging.path(), dest.path()).unwrap();
        (dest, descriptor.path)
    }

    #[test]
    fn open_detects_v15_plus_from_config() {
        let (_dest, path) = make_archive();
        let reader = ArchiveReader::open(&path).unwrap();
        assert_eq!(reader.version(), ArchiveVersion::V15Plus);
    }

    #[test]
    fn read_file_returns_body_for_known_path() {
        let (_dest, path) = make_archive();
        let reader = ArchiveReader::open(&path).unwrap();
        let body = reader.read_file("resources/cluster/core_v1_nodes.json").unwrap().unwrap();
        assert_eq!(body, br#"{"items":[]}"#);
    }

    #[test]
    fn read_file_returns_none_for_missing_path() {
        let (_dest, path) = make_archive();
        let reader = ArchiveReader::open(&path).unwrap();
        assert!(reader.read_file("does/not/exist.json").unwrap().is_none());
    }

    #[test]
    fn walk_visits_every_file_when_never_asked_to_stop() {
        let (_dest, path) = make_archive();
        let reader = ArchiveReader::open(&path).unwrap();
        let mut count = 0;
        reader
            .walk(|_p, _b| {
                count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(count, 2);
    }
}
