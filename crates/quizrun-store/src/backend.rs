//! Key-value backends for the history store.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// String values stored under string keys.
///
/// `get` reports unreadable entries as `None`; only writes can fail.
pub trait KvBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Volatile backend, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `{key}.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable history entry");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        // Readers only ever see a complete file.
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_round_trip() {
        let mut kv = MemoryBackend::new();
        assert_eq!(kv.get("k"), None);
        kv.set("k", "v").unwrap();
        assert_eq!(kv.get("k").as_deref(), Some("v"));
        kv.remove("k").unwrap();
        assert_eq!(kv.get("k"), None);
    }

    #[test]
    fn file_backend_creates_directory_lazily() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("history");
        let mut kv = FileBackend::new(&dir);

        assert_eq!(kv.get("k"), None);
        assert!(!dir.exists());

        kv.set("k", "[1,2]").unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("k.json")).unwrap(), "[1,2]");
        assert_eq!(kv.get("k").as_deref(), Some("[1,2]"));

        kv.set("k", "[]").unwrap();
        assert_eq!(kv.get("k").as_deref(), Some("[]"));
    }

    #[test]
    fn removing_missing_file_is_fine() {
        let root = tempfile::tempdir().unwrap();
        let mut kv = FileBackend::new(root.path());
        kv.remove("never-written").unwrap();
    }

    #[test]
    fn write_into_a_file_path_fails() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let mut kv = FileBackend::new(&blocker);
        let err = kv.set("k", "v").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
