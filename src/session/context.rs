//! Page-session context: every piece of mutable annotator state for one page.
//!
//! [`SessionContext`] owns the annotation queue, the lookup cache, the
//! debouncer, the resolver and the persistent store.  Nothing else writes
//! them; the document is passed in by reference for each turn.
//!
//! ```text
//! start()            language gate → style rule → scan <body> → trigger
//! handle_mutations() scan added nodes → trigger          (see watcher.rs)
//! poll_resolve()     debounce due? → resolve()
//! resolve()          Resolver::run_cycle → LookupCache::save
//! ```

use std::sync::Arc;

use tokio::time::Instant;

use crate::annotate::{self, AnnotationQueue, SLOT_STYLE};
use crate::config::AppConfig;
use crate::dom::{Document, NodeId};
use crate::resolve::{Converter, CycleReport, KeyValueStore, LookupCache, Resolver, SaveOutcome};
use crate::session::debounce::Debouncer;

pub struct SessionContext {
    config: AppConfig,
    queue: AnnotationQueue,
    cache: LookupCache,
    resolver: Resolver,
    store: Box<dyn KeyValueStore>,
    debounce: Debouncer,
    started: bool,
}

impl SessionContext {
    /// Build a session, loading the persisted cache from `store`.
    pub fn new(
        config: &AppConfig,
        converter: Arc<dyn Converter>,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        let cache = LookupCache::load(
            &*store,
            &config.cache.storage_key,
            config.cache.ceiling,
        );
        Self {
            config: config.clone(),
            queue: AnnotationQueue::new(),
            cache,
            resolver: Resolver::new(converter, config.resolver.batch_size),
            store,
            debounce: Debouncer::new(config.resolver.debounce()),
            started: false,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Whether `doc` declares one of the configured languages.
    pub fn language_allowed(&self, doc: &Document) -> bool {
        self.config.document.allows(doc.lang())
    }

    /// Initialise annotation of `doc`.
    ///
    /// Returns `false`, without touching the document, when its language is
    /// not allowed.  Otherwise registers the slot style rule, scans `<body>`
    /// and schedules the first resolution cycle.  Calling it again on a
    /// started session is a no-op returning `true`.
    pub fn start(&mut self, doc: &mut Document) -> bool {
        if self.started {
            return true;
        }
        if !self.language_allowed(doc) {
            log::info!(
                "session: document language {:?} not in {:?}, staying idle",
                doc.lang(),
                self.config.document.languages
            );
            return false;
        }

        if let Err(e) = doc.add_style(SLOT_STYLE) {
            log::warn!("session: could not register slot style: {e}");
        }
        let body = doc.body();
        let inserted = self.scan(doc, body);
        doc.take_records();
        self.started = true;

        log::info!("session: initial scan inserted {inserted} placeholders");
        self.debounce.trigger();
        true
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    // -----------------------------------------------------------------------
    // Scanning & resolution
    // -----------------------------------------------------------------------

    /// Scan the subtree at `root` into the queue.
    pub fn scan(&mut self, doc: &mut Document, root: NodeId) -> usize {
        annotate::scan(doc, &mut self.queue, root)
    }

    /// Schedule a resolution cycle after the quiet window.
    pub fn trigger_resolve(&mut self) {
        self.debounce.trigger();
    }

    /// Run the scheduled cycle if its deadline has passed at `now`.
    pub fn poll_resolve(&mut self, doc: &mut Document, now: Instant) -> Option<CycleReport> {
        if self.debounce.fire_if_due(now) {
            Some(self.resolve(doc))
        } else {
            None
        }
    }

    /// Run one resolution cycle immediately, then persist the cache.
    ///
    /// Cancels any scheduled cycle; a store failure is logged and the cycle
    /// result still returned.
    pub fn resolve(&mut self, doc: &mut Document) -> CycleReport {
        self.debounce.cancel();
        let report = self
            .resolver
            .run_cycle(doc, &mut self.queue, &mut self.cache);

        match self.cache.save(&mut *self.store) {
            Ok(SaveOutcome::Written(n)) => log::trace!("session: persisted {n} cache entries"),
            Ok(SaveOutcome::Cleared(n)) => {
                log::info!("session: cache reached {n} entries, cleared")
            }
            Err(e) => log::warn!("session: could not persist cache: {e}"),
        }
        report
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn queue(&self) -> &AnnotationQueue {
        &self.queue
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debounce
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
