//! Persistent key/value stores for the lookup cache.
//!
//! The cache needs two operations: get-by-key (with a default) and
//! set-by-key.  [`MemoryStore`] keeps values in process (tests, embedding
//! hosts that persist elsewhere); [`JsonFileStore`] keeps one JSON object
//! file in the platform config directory:
//!
//! | Platform | Path |
//! |----------|------|
//! | Windows  | `%APPDATA%\hanzi-ruby\store.json` |
//! | macOS    | `~/Library/Application Support/hanzi-ruby/store.json` |
//! | Linux    | `~/.config/hanzi-ruby/store.json` |

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not a JSON object of strings: {0}")]
    Format(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

// ---------------------------------------------------------------------------
// KeyValueStore trait
// ---------------------------------------------------------------------------

/// String key/value persistence.
pub trait KeyValueStore: Send {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Value under `key`, or `default` when nothing is stored.
    fn get_or(&self, key: &str, default: &str) -> Result<String, StoreError> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store.  Clones share the same map, so a host can keep a
/// handle and inspect what the session persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `key = value`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// File-backed store: the whole file is one JSON object of string values.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at the platform-appropriate default path.
    pub fn open_default() -> Self {
        Self::new(AppPaths::new().store_file)
    }

    /// Store at an explicit path (useful for tests).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&data)?)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    /// Read-modify-write of the whole file.
    ///
    /// A corrupt file is replaced rather than blocking every later write.
    /// The new content goes to a sibling temp file first and is renamed over
    /// the old one, so an interrupted write leaves the previous file intact.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(StoreError::Format(e)) => {
                log::warn!(
                    "store: {} is corrupt ({e}); starting from an empty object",
                    self.path.display()
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_store_get_or_default() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        assert_eq!(store.get_or("k", "fallback").unwrap(), "fallback");

        store.set("k", "v").unwrap();
        assert_eq!(store.get_or("k", "fallback").unwrap(), "v");
    }

    #[test]
    fn memory_store_clones_share_values() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.set("shared", "yes").unwrap();
        assert_eq!(store.get("shared").unwrap().as_deref(), Some("yes"));
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempdir().expect("temp dir");
        let store = JsonFileStore::new(dir.path().join("none.json"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn file_store_persists_and_reloads() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("store.json");

        {
            let mut store = JsonFileStore::new(&path);
            store.set("a", "1").unwrap();
            store.set("b", "{\n    \"你\": \"nǐ\"\n}").unwrap();
            store.set("a", "2").unwrap();
        }

        let reloaded = JsonFileStore::new(&path);
        assert_eq!(reloaded.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(
            reloaded.get("b").unwrap().as_deref(),
            Some("{\n    \"你\": \"nǐ\"\n}")
        );
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get("a"), Err(StoreError::Format(_))));
    }

    #[test]
    fn file_store_overwrites_corrupt_file_on_set() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ truncated").unwrap();

        let mut store = JsonFileStore::new(&path);
        store.set("hanzi-ruby-caches", "{}").unwrap();
        store.set("other", "1").unwrap();

        let reloaded = JsonFileStore::new(&path);
        assert_eq!(
            reloaded.get("hanzi-ruby-caches").unwrap().as_deref(),
            Some("{}")
        );
        assert_eq!(reloaded.get("other").unwrap().as_deref(), Some("1"));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
