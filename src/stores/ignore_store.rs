use crate::stores::document::JsonDocument;
use anyhow::{Context, Result};
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{info, warn};

/// Manual ignore flags, keyed by torrent identifier.
///
/// Absent identifiers are not ignored.
pub struct IgnoreStore {
    states: DashMap<String, bool>,
    document: JsonDocument,
}

impl IgnoreStore {
    /// Open the ignore document, creating an empty one if missing
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let document = JsonDocument::new(path);
        let states = DashMap::new();

        let stored = document
            .load()
            .context("Failed to load ignore-state document")?
            .unwrap_or_default();

        for (id, value) in stored {
            match value.as_bool() {
                Some(flag) => {
                    states.insert(id, flag);
                }
                None => {
                    warn!(torrent_id = %id, value = %value, "Ignore flag is not a boolean, dropping entry");
                }
            }
        }

        let store = Self { states, document };
        store.save()?;

        info!(
            path = %store.document.path().display(),
            entries = store.len(),
            "Ignore state loaded"
        );

        Ok(store)
    }

    pub fn is_ignored(&self, id: &str) -> bool {
        self.states.get(id).map(|entry| *entry.value()).unwrap_or(false)
    }

    pub fn get_many(&self, ids: &[String]) -> Vec<bool> {
        ids.iter().map(|id| self.is_ignored(id)).collect()
    }

    /// Set the flag on every id, then persist once
    pub fn set_many(&self, ids: &[String], ignore: bool) -> Result<()> {
        for id in ids {
            self.states.insert(id.clone(), ignore);
        }
        self.save()
    }

    /// Drop an entry. Returns true if one existed. Does not persist.
    pub fn remove(&self, id: &str) -> bool {
        self.states.remove(id).is_some()
    }

    pub fn save(&self) -> Result<()> {
        let map: Map<String, Value> = self
            .states
            .iter()
            .map(|entry| (entry.key().clone(), Value::Bool(*entry.value())))
            .collect();

        self.document.save(&map).context("Failed to save ignore-state document")
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
