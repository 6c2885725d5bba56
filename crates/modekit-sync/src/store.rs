//! Key-value persistence abstraction
//!
//! The editor's durable state (edit buffer, slot selection) goes through a
//! small string key-value contract so the storage backend stays swappable.
//! Quota and availability failures are a real condition; callers that
//! autosave absorb a [`StoreError`], callers acting on an explicit user
//! request report it.

use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Storage failure; autosave paths log and continue, explicit paths report
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage write failed: {0}")]
    Write(String),

    #[error("storage remove failed: {0}")]
    Remove(String),
}

/// Synchronous string key-value store
pub trait KeyValueStore {
    /// Read a value; `None` when absent or the backend is unavailable
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Write("store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Remove("store lock poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON object per file, rewritten on every change
///
/// Writes are small (a mode plus a couple of scalars), so whole-file
/// rewrite keeps the format trivially recoverable. A corrupt or missing
/// file degrades to an empty store with a warning, never an error.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: Arc<Mutex<HashMap<String, String>>>,
}

/// Default on-disk location for the editor's state file
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("modekit")
        .join("state.json")
}

impl FileStore {
    /// Open (or start empty at) the given path
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read_entries(&path);
        Self {
            path,
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    fn read_entries(path: &Path) -> HashMap<String, String> {
        if !path.exists() {
            log::info!("FileStore: no state file at {:?}, starting empty", path);
            return HashMap::new();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<HashMap<String, String>>(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("FileStore: corrupt state file {:?}: {}", path, e);
                    HashMap::new()
                }
            },
            Err(e) => {
                log::warn!("FileStore: failed to read {:?}: {}", path, e);
                HashMap::new()
            }
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(entries).context("Failed to serialize state")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write state file {:?}", self.path))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Write("store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
            .map_err(|e| StoreError::Write(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Remove("store lock poisoned".into()))?;
        entries.remove(key);
        self.flush(&entries)
            .map_err(|e| StoreError::Remove(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Some("v".to_string()));

        // Clones share state
        let clone = store.clone();
        clone.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStore::open(&path);
        store.set("slot", "3").unwrap();
        store.set("name", "Studio").unwrap();
        store.remove("name").unwrap();

        // Reopen from disk
        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("slot"), Some("3".to_string()));
        assert_eq!(reopened.get("name"), None);
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("slot"), None);
    }
}
