//! Bounded, persisted run → transcription cache.
//!
//! The cache is stored as a JSON object (four-space indent) under one key of
//! a [`KeyValueStore`].  Size is bounded by a ceiling checked at save time:
//! once the cache holds `ceiling` entries or more it is dropped wholesale,
//! both in memory and in the store, instead of evicting individual entries.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::resolve::store::{KeyValueStore, StoreError};

/// Default ceiling on distinct cached runs.
pub const DEFAULT_CACHE_CEILING: usize = 500;

/// Default store key.
pub const DEFAULT_STORAGE_KEY: &str = "hanzi-ruby-caches";

/// Persisted form of an empty cache.
const EMPTY_CACHE: &str = "{}";

// ---------------------------------------------------------------------------
// SaveOutcome
// ---------------------------------------------------------------------------

/// What [`LookupCache::save`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// All entries were persisted.
    Written(usize),
    /// The ceiling was reached; this many entries were discarded.
    Cleared(usize),
}

// ---------------------------------------------------------------------------
// LookupCache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LookupCache {
    entries: BTreeMap<String, String>,
    key: String,
    ceiling: usize,
}

impl LookupCache {
    /// Empty cache persisted under `key`.
    pub fn new(key: impl Into<String>, ceiling: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            key: key.into(),
            ceiling,
        }
    }

    /// Load the cache persisted under `key`.
    ///
    /// Never fails: an unreadable store or a malformed value is logged and
    /// yields an empty cache.
    pub fn load(store: &dyn KeyValueStore, key: &str, ceiling: usize) -> Self {
        let mut cache = Self::new(key, ceiling);
        let raw = match store.get_or(key, "{}") {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("cache: could not read '{key}': {e}");
                return cache;
            }
        };
        if raw.trim().is_empty() {
            return cache;
        }

        match parse_entries(&raw) {
            Ok(entries) => {
                log::debug!("cache: loaded {} entries from '{key}'", entries.len());
                cache.entries = entries;
            }
            Err(e) => log::error!("cache: discarding malformed value under '{key}': {e}"),
        }
        cache
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    pub fn get(&self, run: &str) -> Option<&str> {
        self.entries.get(run).map(String::as_str)
    }

    pub fn contains(&self, run: &str) -> bool {
        self.entries.contains_key(run)
    }

    pub fn insert(&mut self, run: impl Into<String>, transcription: impl Into<String>) {
        self.entries.insert(run.into(), transcription.into());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Persist the cache, or drop it entirely once it reaches the ceiling.
    pub fn save(&mut self, store: &mut dyn KeyValueStore) -> Result<SaveOutcome, StoreError> {
        if self.entries.len() >= self.ceiling {
            let dropped = self.entries.len();
            store.set(&self.key, EMPTY_CACHE)?;
            self.entries.clear();
            log::debug!("cache: {dropped} entries reached ceiling {}, cleared", self.ceiling);
            return Ok(SaveOutcome::Cleared(dropped));
        }

        store.set(&self.key, &self.to_json()?)?;
        Ok(SaveOutcome::Written(self.entries.len()))
    }

    /// Serialize as a JSON object indented with four spaces.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.entries.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Parse a persisted cache object, skipping non-string values.
fn parse_entries(raw: &str) -> Result<BTreeMap<String, String>, serde_json::Error> {
    let object: serde_json::Map<String, Value> = serde_json::from_str(raw)?;
    let mut entries = BTreeMap::new();
    for (run, value) in object {
        match value {
            Value::String(transcription) => {
                entries.insert(run, transcription);
            }
            other => log::warn!("cache: skipping non-string entry for '{run}': {other}"),
        }
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
