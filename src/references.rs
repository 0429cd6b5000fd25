//! Reference artifacts the build links against.
//!
//! Paths are kept in insertion order and never duplicated. Only the path list
//! is persisted; inclusion flags start out true on every load.

use crate::build::scope::is_editor_scoped;
use crate::store::{get_or_empty, ConfigStore, StoreError, REFERENCES_KEY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default references, relative to the host install's contents directory.
pub const DEFAULT_REFERENCES: [&str; 3] = [
    "Managed/UnityEngine.dll",
    "Managed/UnityEditor.dll",
    "UnityExtensions/Unity/GUISystem/UnityEngine.UI.dll",
];

/// A single reference artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Path as entered; compared as an exact string
    pub path: String,
    /// Whether the entry is passed to the compiler
    pub include: bool,
}

impl ReferenceEntry {
    fn new(path: String) -> Self {
        Self { path, include: true }
    }

    /// File name of the artifact.
    pub fn name(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.clone())
    }

    /// Whether this reference is only valid for editor builds.
    pub fn is_editor_only(&self) -> bool {
        is_editor_scoped(Path::new(&self.path))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReferencesBlob {
    #[serde(default)]
    paths: Vec<String>,
}

/// Ordered, de-duplicated set of reference artifacts.
pub struct ReferenceSet {
    entries: Vec<ReferenceEntry>,
    store: Arc<dyn ConfigStore>,
    host_contents: Option<PathBuf>,
}

impl std::fmt::Debug for ReferenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceSet")
            .field("entries", &self.entries)
            .field("host_contents", &self.host_contents)
            .finish()
    }
}

impl ReferenceSet {
    /// Create an empty set writing through `store`.
    ///
    /// `host_contents` is the host install directory the defaults are
    /// resolved against. Without it no defaults are seeded.
    pub fn new(store: Arc<dyn ConfigStore>, host_contents: Option<PathBuf>) -> Self {
        Self { entries: Vec::new(), store, host_contents }
    }

    /// Default reference paths for the configured host, if any.
    pub fn default_paths(&self) -> Vec<String> {
        match &self.host_contents {
            Some(base) => DEFAULT_REFERENCES
                .iter()
                .map(|rel| base.join(rel).to_string_lossy().into_owned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Seed the defaults, then merge the persisted list.
    ///
    /// Never fails: unreadable or malformed state is treated as empty and
    /// write failures are logged.
    pub fn load(&mut self) {
        // Read before seeding; seeding writes the same key.
        let persisted = self.read_persisted();

        for path in self.default_paths() {
            if let Err(e) = self.add(&path) {
                tracing::warn!(path = %path, "could not persist default reference: {}", e);
            }
        }

        let mut merged = 0usize;
        for path in persisted {
            if path.is_empty() || self.contains(&path) {
                continue;
            }
            self.entries.push(ReferenceEntry::new(path));
            merged += 1;
        }

        if merged > 0 {
            if let Err(e) = self.save() {
                tracing::warn!("could not persist merged references: {}", e);
            }
        }

        tracing::debug!(count = self.entries.len(), merged, "loaded references");
    }

    fn read_persisted(&self) -> Vec<String> {
        let Some(json) = get_or_empty(self.store.as_ref(), REFERENCES_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str::<ReferencesBlob>(&json) {
            Ok(blob) => blob.paths,
            Err(e) => {
                tracing::warn!("ignoring malformed reference list: {}", e);
                Vec::new()
            }
        }
    }

    /// Append `path` and persist.
    ///
    /// Returns `Ok(false)` without touching the store when the path is empty
    /// or already present.
    pub fn add(&mut self, path: &str) -> Result<bool, StoreError> {
        if path.is_empty() || self.contains(path) {
            return Ok(false);
        }
        self.entries.push(ReferenceEntry::new(path.to_string()));
        self.save()?;
        Ok(true)
    }

    /// Remove the entry at `index` and persist.
    ///
    /// Returns `Ok(None)` when the index is out of range.
    pub fn remove(&mut self, index: usize) -> Result<Option<ReferenceEntry>, StoreError> {
        if index >= self.entries.len() {
            return Ok(None);
        }
        let removed = self.entries.remove(index);
        self.save()?;
        Ok(Some(removed))
    }

    /// Persist the path list.
    pub fn save(&self) -> Result<(), StoreError> {
        let blob = ReferencesBlob { paths: self.entries.iter().map(|e| e.path.clone()).collect() };
        let json = serde_json::to_string(&blob)?;
        self.store.set(REFERENCES_KEY, &json)
    }

    /// Whether `path` is already in the set.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    /// Toggle inclusion of the entry at `index`. Returns false when out of range.
    pub fn set_included(&mut self, index: usize, include: bool) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.include = include;
                true
            }
            None => false,
        }
    }

    /// All entries in order.
    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Included reference paths for a build, in order.
    ///
    /// Editor-only references are dropped unless `editor` is set.
    pub fn paths_for(&self, editor: bool) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|e| e.include)
            .filter(|e| editor || !e.is_editor_only())
            .map(|e| PathBuf::from(&e.path))
            .collect()
    }
}
