//! Transcription resolution for queued runs.
//!
//! This module provides:
//! * [`Converter`] — trait for the external run → transcription function.
//! * [`PinyinConverter`] — tone-marked pinyin via the `pinyin` crate.
//! * [`LookupCache`] — bounded run → transcription cache with JSON persistence.
//! * [`KeyValueStore`] / [`MemoryStore`] / [`JsonFileStore`] — where the
//!   cache is persisted.
//! * [`Resolver`] / [`CycleReport`] — one batched resolution cycle.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use hanzi_ruby::annotate::{scan, AnnotationQueue, SLOT_ATTRIBUTE};
//! use hanzi_ruby::dom::Document;
//! use hanzi_ruby::resolve::{LookupCache, MemoryStore, PinyinConverter, Resolver};
//!
//! let mut doc = Document::new(Some("zh-CN"));
//! let p = doc.append_element(doc.body(), "p").unwrap();
//! doc.append_text(p, "你好world").unwrap();
//!
//! let mut queue = AnnotationQueue::new();
//! let body = doc.body();
//! scan(&mut doc, &mut queue, body);
//! let slot = queue.slots("你好")[0];
//!
//! let mut store = MemoryStore::new();
//! let mut cache = LookupCache::load(&store, "hanzi-ruby-caches", 500);
//! let resolver = Resolver::new(Arc::new(PinyinConverter::new()), 200);
//! resolver.run_cycle(&mut doc, &mut queue, &mut cache);
//! cache.save(&mut store).unwrap();
//!
//! assert_eq!(doc.attribute(slot, SLOT_ATTRIBUTE), Some("nǐ hǎo"));
//! ```

pub mod cache;
pub mod converter;
pub mod resolver;
pub mod store;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use cache::{LookupCache, SaveOutcome, DEFAULT_CACHE_CEILING, DEFAULT_STORAGE_KEY};
pub use converter::{Converter, PinyinConverter};
pub use resolver::{propagate, CycleReport, Resolver, DEFAULT_BATCH_SIZE};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};

#[cfg(test)]
pub use converter::MockConverter;
