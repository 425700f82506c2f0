//! Run detection, DOM scanning and the pending-run queue.
//!
//! This module provides:
//! * [`find_run`] / [`runs`] — locate maximal Han-character runs in text.
//! * [`scan`] — walk a subtree and replace each run with a ruby placeholder.
//! * [`AnnotationQueue`] — runs awaiting transcription and their slots.
//!
//! # Quick start
//!
//! ```rust
//! use hanzi_ruby::annotate::{scan, AnnotationQueue};
//! use hanzi_ruby::dom::Document;
//!
//! let mut doc = Document::new(Some("zh-CN"));
//! let p = doc.append_element(doc.body(), "p").unwrap();
//! doc.append_text(p, "你好world").unwrap();
//!
//! let mut queue = AnnotationQueue::new();
//! let body = doc.body();
//! assert_eq!(scan(&mut doc, &mut queue, body), 1);
//! assert_eq!(queue.runs(), vec!["你好"]);
//! ```

pub mod queue;
pub mod runs;
pub mod scanner;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use queue::AnnotationQueue;
pub use runs::{find_run, is_han, runs, HAN_RANGES};
pub use scanner::{annotate_text, is_excluded, scan, SLOT_ATTRIBUTE, SLOT_CLASS, SLOT_STYLE};
