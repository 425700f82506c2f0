//! Page-session orchestration for the annotator.
//!
//! Ties the scanner, queue, resolver and cache together for one document and
//! drives them from host events.
//!
//! # Architecture
//!
//! ```text
//! PageEvent (mpsc)
//!        │
//!        ▼
//! SessionRunner::run()  ← async tokio task
//!        │
//!        ├─ start()             language gate → style → scan <body>
//!        │
//!        ├─ MutationsPending    → scan added nodes → Debouncer::trigger
//!        │
//!        └─ deadline reached    → Resolver::run_cycle → LookupCache::save
//!
//! SharedDocument (Arc<Mutex<Document>>) ←─── mutated by the host between turns
//! ```

pub mod context;
pub mod debounce;
pub mod runner;
pub mod watcher;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use context::SessionContext;
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use runner::{PageEvent, RunSummary, SessionRunner};
pub use watcher::added_nodes;
