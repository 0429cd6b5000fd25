//! Conditional-compilation symbols passed to the compiler.

use crate::build::scope::EDITOR_DEFINE;
use crate::store::{get_or_empty, ConfigStore, StoreError, DEFINES_KEY};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Serialize, Deserialize)]
struct DefinesBlob {
    #[serde(default)]
    list: Vec<String>,
}

/// Ordered list of distinct define symbols.
pub struct DefineSet {
    list: Vec<String>,
    store: Arc<dyn ConfigStore>,
}

impl std::fmt::Debug for DefineSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefineSet").field("list", &self.list).finish()
    }
}

impl DefineSet {
    /// Create a set holding only the editor symbol.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { list: default_defines(), store }
    }

    /// Replace the list with the persisted one, if any.
    ///
    /// An absent, blank or malformed payload keeps the defaults. A stored
    /// empty list is kept as is.
    pub fn load(&mut self) {
        let Some(json) = get_or_empty(self.store.as_ref(), DEFINES_KEY) else {
            return;
        };
        match serde_json::from_str::<DefinesBlob>(&json) {
            Ok(blob) => {
                let mut list: Vec<String> = Vec::with_capacity(blob.list.len());
                for symbol in blob.list {
                    if !symbol.is_empty() && !list.contains(&symbol) {
                        list.push(symbol);
                    }
                }
                self.list = list;
            }
            Err(e) => tracing::warn!("ignoring malformed define list: {}", e),
        }
    }

    /// Persist the list.
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&DefinesBlob { list: self.list.clone() })?;
        self.store.set(DEFINES_KEY, &json)
    }

    /// Append `symbol` and persist. Empty or duplicate symbols are ignored.
    pub fn add(&mut self, symbol: &str) -> Result<bool, StoreError> {
        let symbol = symbol.trim();
        if symbol.is_empty() || self.contains(symbol) {
            return Ok(false);
        }
        self.list.push(symbol.to_string());
        self.save()?;
        Ok(true)
    }

    /// Remove the symbol at `index` and persist.
    pub fn remove(&mut self, index: usize) -> Result<Option<String>, StoreError> {
        if index >= self.list.len() {
            return Ok(None);
        }
        let removed = self.list.remove(index);
        self.save()?;
        Ok(Some(removed))
    }

    /// Whether `symbol` is in the set.
    pub fn contains(&self, symbol: &str) -> bool {
        self.list.iter().any(|s| s == symbol)
    }

    /// Symbols in order.
    pub fn list(&self) -> &[String] {
        &self.list
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// True when the set is empty.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Symbols to pass for one build.
    ///
    /// Editor builds always carry the editor symbol, appended if missing.
    pub fn active_for(&self, editor: bool) -> Vec<String> {
        let mut active = self.list.clone();
        if editor && !self.contains(EDITOR_DEFINE) {
            active.push(EDITOR_DEFINE.to_string());
        }
        active
    }
}

fn default_defines() -> Vec<String> {
    vec![EDITOR_DEFINE.to_string()]
}
