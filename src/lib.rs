//! Pinyin ruby annotation for Simplified-Chinese documents.
//!
//! Every run of Han characters in a document's body is wrapped in a
//! `<ruby>` placeholder whose `<rt>` slot is later filled with the run's
//! Hanyu Pinyin, resolved in debounced batches through a persisted cache.
//!
//! - [`dom`]: arena document tree with mutation records
//! - [`annotate`]: run detection, scanner and annotation queue
//! - [`resolve`]: converter, lookup cache, key/value store and resolver
//! - [`session`]: page-session context, mutation watcher and async runner
//! - [`config`]: TOML settings and platform paths

pub mod annotate;
pub mod config;
pub mod dom;
pub mod resolve;
pub mod session;
