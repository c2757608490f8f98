use std::path::Path;

/// A predicate on `(path, is_file)` deciding which files a processor sees
/// (§4.4 "File selection"). Directories are always rejected by the two
/// built-in policies below.
pub trait Selector: Send + Sync {
    fn accepts(&self, path: &Path, is_file: bool) -> bool;
}

/// `file_or_extension(files, exts…)`: if `files` is non-empty, the basename
/// must be in the allowlist; otherwise the path must end in one of `exts`.
/// `"*"` in `exts` matches any extension.
pub struct FileOrExtension {
    files: Vec<String>,
    exts: Vec<String>,
}

impl FileOrExtension {
    pub fn new(files: Option<&[String]>, exts: &[&str]) -> Self {
        FileOrExtension {
            files: files.map(|f| f.to_vec()).unwrap_or_default(),
            exts: exts.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Selector for FileOrExtension {
    fn accepts(&self, path: &Path, is_file: bool) -> bool {
        if !is_file {
            return false;
        }
        let basename = match path.file_name().and_then(|n| n.to_str()) {
            Some(b) => b,
            None => return false,
        };

        if !self.files.is_empty() {
            return self.files.iter().any(|f| f == basename);
        }

        if self.exts.iter().any(|e| e == "*") {
            return true;
        }
        self.exts
            .iter()
            .any(|ext| basename.ends_with(ext.as_str()))
    }
}

/// `file_or_any(files)` = `file_or_extension(files, "*")`.
pub fn file_or_any(files: Option<&[String]>) -> FileOrExtension {
    FileOrExtension::new(files, &["*"])
}

pub fn file_or_extension(files: Option<&[String]>, exts: &[&str]) -> FileOrExtension {
    FileOrExtension::new(files, exts)
}

/// The selector used against `errors/`: only the single basename `error.json`.
pub fn error_selector() -> FileOrExtension {
    FileOrExtension::new(Some(&["error.json".to_string()]), &[])
}
