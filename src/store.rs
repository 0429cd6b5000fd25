//! Persisted key-value store for user preferences.
//!
//! Reference and define lists are written through a [`ConfigStore`] under
//! fixed keys. The store only moves opaque strings; payload encoding belongs
//! to the callers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Store key holding the reference path list.
pub const REFERENCES_KEY: &str = "references";

/// Store key holding the define list.
pub const DEFINES_KEY: &str = "defines";

/// Persistence failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Backing file could not be read or written
    #[error("preference store unavailable at {}: {source}", .path.display())]
    Unavailable {
        /// Location of the backing file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// Backing file exists but is not a valid store document
    #[error("preference store at {} is corrupt: {source}", .path.display())]
    Corrupt {
        /// Location of the backing file
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
    /// Payload could not be encoded
    #[error("failed to encode preference payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A key-value blob store.
///
/// Implementations use interior mutability so one store can be shared by
/// several owners.
pub trait ConfigStore: Send + Sync {
    /// Read the payload stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the payload stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object file mapping keys to payload strings.
///
/// A missing file reads as empty. Writes rewrite the whole file and create
/// parent directories as needed.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store over `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Unavailable { path: self.path.clone(), source })
            }
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents)
            .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Unavailable {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)
            .map_err(|source| StoreError::Unavailable { path: self.path.clone(), source })
    }
}

impl ConfigStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!("replacing corrupt store {}: {}", path.display(), source);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

/// Read a payload, treating any failure as "nothing stored".
///
/// Read failures fall back to defaults; they are logged, not returned.
pub(crate) fn get_or_empty(store: &dyn ConfigStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(Some(value)) if !value.trim().is_empty() => Some(value),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(key, "falling back to defaults: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("defines").unwrap(), None);

        store.set("defines", "{\"list\":[]}").unwrap();
        assert_eq!(store.get("defines").unwrap().as_deref(), Some("{\"list\":[]}"));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("prefs.json"));
        assert_eq!(store.get(REFERENCES_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/prefs.json");
        let store = FileStore::new(&path);

        store.set(REFERENCES_KEY, "refs").unwrap();
        store.set(DEFINES_KEY, "defs").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(REFERENCES_KEY).unwrap().as_deref(), Some("refs"));
        assert_eq!(reopened.get(DEFINES_KEY).unwrap().as_deref(), Some("defs"));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prefs.json");
        fs::write(&path, "not json {{").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get(DEFINES_KEY), Err(StoreError::Corrupt { .. })));
        assert_eq!(get_or_empty(&store, DEFINES_KEY), None);
    }

    #[test]
    fn test_file_store_set_replaces_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prefs.json");
        fs::write(&path, "not json {{").unwrap();

        let store = FileStore::new(&path);
        store.set(DEFINES_KEY, "defs").unwrap();

        assert_eq!(store.get(DEFINES_KEY).unwrap().as_deref(), Some("defs"));
        assert_eq!(store.get(REFERENCES_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_write_failure_is_surfaced() {
        let temp = TempDir::new().unwrap();
        // a regular file where the parent directory should be
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let store = FileStore::new(blocker.join("prefs.json"));
        assert!(matches!(store.set(DEFINES_KEY, "x"), Err(StoreError::Unavailable { .. })));
    }

    #[test]
    fn test_get_or_empty_ignores_blank_payloads() {
        let store = MemoryStore::new();
        store.set(DEFINES_KEY, "   ").unwrap();
        assert_eq!(get_or_empty(&store, DEFINES_KEY), None);
    }
}
