//! In-process host document for the annotator.
//!
//! The annotator only needs a small slice of the DOM: element and text nodes,
//! attributes, `splitText`, `insertBefore`, `contains` and a mutation log.
//! [`Document`] provides exactly that as an arena tree so the whole pipeline
//! can run (and be tested) without a browser.
//!
//! # Architecture
//!
//! ```text
//! Document
//!   ├─ nodes: Vec<Node>          ← arena, NodeId = index, never freed
//!   ├─ #document
//!   │    └─ <html lang="…">
//!   │          ├─ <head>  ← <style> rules registered via add_style()
//!   │          └─ <body>
//!   └─ records: Vec<MutationRecord>  ← drained by the mutation watcher
//! ```
//!
//! Removed nodes stay in the arena as detached subtrees, the same way a
//! browser keeps a removed node alive while script still holds a reference.
//!
//! # Quick start
//!
//! ```rust
//! use hanzi_ruby::dom::{to_html, Document};
//!
//! let mut doc = Document::new(Some("zh-CN"));
//! let p = doc.append_element(doc.body(), "p").unwrap();
//! doc.append_text(p, "你好world").unwrap();
//!
//! assert_eq!(doc.lang(), Some("zh-CN"));
//! assert_eq!(to_html(&doc, p), "<p>你好world</p>");
//! ```

pub mod html;
pub mod mutation;
pub mod node;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use html::to_html;
pub use mutation::MutationRecord;
pub use node::{Document, DomError, NodeId, NodeKind, SharedDocument};
