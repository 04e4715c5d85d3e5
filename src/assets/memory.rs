use super::AssetBundle;
use crate::error::ConfigError;
use hyper::body::Bytes;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct Entry {
    data: Bytes,
    modified: SystemTime,
}

/// In-memory bundle, filled once from a build directory or by hand.
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    files: HashMap<String, Entry>,
    source: Option<PathBuf>,
}

impl MemoryBundle {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; `path` is relative and slash-separated.
    #[cfg(test)]
    #[must_use]
    pub fn with_file(
        mut self,
        path: &str,
        data: impl Into<Bytes>,
        modified: SystemTime,
    ) -> Self {
        self.files.insert(
            path.trim_start_matches('/').to_string(),
            Entry {
                data: data.into(),
                modified,
            },
        );
        self
    }

    /// Read every regular file below `root` into memory.
    pub fn load_dir(root: &Path) -> Result<Self, ConfigError> {
        let mut bundle = Self {
            source: Some(root.to_path_buf()),
            ..Self::default()
        };
        bundle
            .load_recursive(root, "")
            .map_err(|source| ConfigError::Assets {
                path: root.to_path_buf(),
                source,
            })?;
        Ok(bundle)
    }

    fn load_recursive(&mut self, dir: &Path, prefix: &str) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let key = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };
            let metadata = entry.metadata()?;
            if metadata.is_dir() {
                self.load_recursive(&entry.path(), &key)?;
            } else if metadata.is_file() {
                let data = fs::read(entry.path())?;
                let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
                self.files.insert(
                    key,
                    Entry {
                        data: Bytes::from(data),
                        modified,
                    },
                );
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetBundle for MemoryBundle {
    fn read(&self, path: &str) -> Option<Bytes> {
        self.files.get(path).map(|e| e.data.clone())
    }

    fn modified(&self, path: &str) -> Option<SystemTime> {
        self.files.get(path).map(|e| e.modified)
    }

    fn describe(&self) -> String {
        match &self.source {
            Some(dir) => format!("{} ({} files)", dir.display(), self.files.len()),
            None => format!("in-memory ({} files)", self.files.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dir_walks_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir_all(dir.path().join("assets/img")).unwrap();
        fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
        fs::write(dir.path().join("assets/img/logo.svg"), "<svg/>").unwrap();

        let bundle = MemoryBundle::load_dir(dir.path()).unwrap();

        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.read("assets/app.js").unwrap(), "console.log(1)");
        assert_eq!(bundle.read("assets/img/logo.svg").unwrap(), "<svg/>");
        assert!(bundle.modified("index.html").is_some());
        assert!(bundle.read("assets").is_none());
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = MemoryBundle::load_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::Assets { .. }));
    }

    #[test]
    fn test_with_file_strips_leading_slash() {
        let bundle = MemoryBundle::new().with_file("/a.css", "x", SystemTime::UNIX_EPOCH);
        assert_eq!(bundle.read("a.css").unwrap(), "x");
        assert_eq!(bundle.modified("a.css"), Some(SystemTime::UNIX_EPOCH));
    }
}
