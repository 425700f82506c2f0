//! Session runner: the async event loop of one page session.
//!
//! [`SessionRunner`] owns the [`SessionContext`] and reacts to [`PageEvent`]s
//! received over a `tokio::sync::mpsc` channel, racing each receive against
//! the debounce deadline.
//!
//! # Flow
//!
//! ```text
//! run()
//!   └─▶ start()                        language gate, style, initial scan
//!
//! PageEvent::MutationsPending
//!   └─▶ drain records → handle_mutations() → trigger debounce
//!
//! PageEvent::ResolveNow
//!   └─▶ resolve()                      cancels the pending deadline
//!
//! debounce deadline reached
//!   └─▶ poll_resolve() → Resolver cycle → cache persisted
//!
//! channel closed
//!   └─▶ pending deadline honored once, then shutdown
//! ```
//!
//! The document lock is taken only for the duration of one event or timer
//! turn and is never held across an `.await`.

use std::sync::MutexGuard;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::dom::{Document, SharedDocument};
use crate::resolve::CycleReport;
use crate::session::context::SessionContext;

// ---------------------------------------------------------------------------
// PageEvent
// ---------------------------------------------------------------------------

/// Notifications the host sends to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// The host changed the document; its mutation records are ready to be
    /// drained.
    MutationsPending,
    /// Run a resolution cycle now instead of waiting for the quiet window.
    ResolveNow,
}

/// What a finished [`SessionRunner::run`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// `false` when the document language was not allowed.
    pub started: bool,
    /// Resolution cycles executed.
    pub cycles: usize,
}

// ---------------------------------------------------------------------------
// SessionRunner
// ---------------------------------------------------------------------------

/// Drives one page session.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use hanzi_ruby::config::AppConfig;
/// use hanzi_ruby::dom::Document;
/// use hanzi_ruby::resolve::{MemoryStore, PinyinConverter};
/// use hanzi_ruby::session::{PageEvent, SessionContext, SessionRunner};
///
/// # async fn example() {
/// let doc = Document::new(Some("zh-CN")).into_shared();
/// let session = SessionContext::new(
///     &AppConfig::default(),
///     Arc::new(PinyinConverter::new()),
///     Box::new(MemoryStore::new()),
/// );
///
/// let (events_tx, events_rx) = tokio::sync::mpsc::channel(16);
/// let task = tokio::spawn(SessionRunner::new(doc.clone(), session).run(events_rx));
/// events_tx.send(PageEvent::MutationsPending).await.ok();
/// drop(events_tx);
/// task.await.ok();
/// # }
/// ```
pub struct SessionRunner {
    doc: SharedDocument,
    session: SessionContext,
    cycles: usize,
}

impl SessionRunner {
    pub fn new(doc: SharedDocument, session: SessionContext) -> Self {
        Self {
            doc,
            session,
            cycles: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the session until `events` is closed.
    ///
    /// Returns immediately when the document language is not allowed.
    pub async fn run(mut self, mut events: mpsc::Receiver<PageEvent>) -> RunSummary {
        if !self.start() {
            return RunSummary::default();
        }

        loop {
            let deadline = self.session.debouncer().deadline();
            tokio::select! {
                event = events.recv() => match event {
                    Some(PageEvent::MutationsPending) => self.handle_mutations(),
                    Some(PageEvent::ResolveNow) => self.resolve_now(),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.handle_deadline();
                }
            }
        }

        if let Some(deadline) = self.session.debouncer().deadline() {
            log::debug!("session: event channel closed, waiting for the pending cycle");
            sleep_until(deadline).await;
            self.handle_deadline();
        }

        log::info!(
            "session: event channel closed, runner shutting down after {} cycles",
            self.cycles
        );
        RunSummary {
            started: true,
            cycles: self.cycles,
        }
    }

    // -----------------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------------

    fn start(&mut self) -> bool {
        let mut doc = lock(&self.doc);
        self.session.start(&mut doc)
    }

    fn handle_mutations(&mut self) {
        let mut doc = lock(&self.doc);
        let inserted = self.session.observe(&mut doc);
        log::trace!("session: mutations handled, {inserted} placeholders");
    }

    fn resolve_now(&mut self) {
        let report = {
            let mut doc = lock(&self.doc);
            self.session.resolve(&mut doc)
        };
        self.finish_cycle(&report);
    }

    fn handle_deadline(&mut self) {
        let report = {
            let mut doc = lock(&self.doc);
            self.session.poll_resolve(&mut doc, Instant::now())
        };
        if let Some(report) = report {
            self.finish_cycle(&report);
        }
    }

    fn finish_cycle(&mut self, report: &CycleReport) {
        self.cycles += 1;
        if report.pending > 0 {
            log::debug!("session: {} runs still unresolved", report.pending);
        }
    }
}

/// Lock the document, recovering the guard if a previous holder panicked.
fn lock(doc: &SharedDocument) -> MutexGuard<'_, Document> {
    doc.lock().unwrap_or_else(|poisoned| {
        log::warn!("session: document lock poisoned, continuing with inner value");
        poisoned.into_inner()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
