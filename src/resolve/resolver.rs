//! Resolution cycle: drain the annotation queue through cache and converter.
//!
//! # Cycle flow
//!
//! ```text
//! for run in queue (first-seen order)
//!   ├─ cached   → fill every waiting slot, drop run from queue
//!   └─ miss     → push to batch
//!                   └─ batch full (200) → flush
//! flush remaining partial batch
//!
//! flush: converter.convert_batch(batch)
//!          └─ for each result: cache.insert, fill slots
//! ```
//!
//! A run whose transcription is empty stays queued; its cache entry is kept
//! (and counts towards the cache ceiling) but is never propagated.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::annotate::{AnnotationQueue, SLOT_ATTRIBUTE};
use crate::dom::Document;
use crate::resolve::cache::LookupCache;
use crate::resolve::converter::Converter;

/// Default number of runs handed to the converter per flush.
pub const DEFAULT_BATCH_SIZE: usize = 200;

// ---------------------------------------------------------------------------
// CycleReport
// ---------------------------------------------------------------------------

/// Counters for one resolution cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Distinct runs walked.
    pub runs_seen: usize,
    /// Runs answered from the cache without calling the converter.
    pub cache_hits: usize,
    /// Runs sent to the converter.
    pub converted: usize,
    /// Size of each flushed batch, in flush order.
    pub flushes: Vec<usize>,
    /// Runs still queued after the cycle.
    pub pending: usize,
    /// Wall time spent in the cycle.
    pub elapsed: Duration,
}

impl CycleReport {
    /// Number of converter round trips.
    pub fn requests(&self) -> usize {
        self.flushes.len()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

pub struct Resolver {
    converter: Arc<dyn Converter>,
    batch_size: usize,
}

impl Resolver {
    /// `batch_size` is clamped to at least 1.
    pub fn new(converter: Arc<dyn Converter>, batch_size: usize) -> Self {
        Self {
            converter,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run one full cycle over `queue`.  Persisting the cache afterwards is
    /// the caller's job.
    pub fn run_cycle(
        &self,
        doc: &mut Document,
        queue: &mut AnnotationQueue,
        cache: &mut LookupCache,
    ) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::default();
        let mut batch: Vec<String> = Vec::with_capacity(self.batch_size);

        for run in queue.runs() {
            report.runs_seen += 1;
            if cache.contains(&run) {
                report.cache_hits += 1;
                propagate(doc, queue, cache, &run);
                continue;
            }

            batch.push(run);
            if batch.len() >= self.batch_size {
                self.flush(doc, queue, cache, &mut batch, &mut report);
            }
        }

        if !batch.is_empty() {
            self.flush(doc, queue, cache, &mut batch, &mut report);
        }

        report.pending = queue.len();
        report.elapsed = started.elapsed();

        if report.runs_seen > 0 {
            log::debug!(
                "{} ms: {} runs converted in {} requests ({} cached, {} pending), page {}",
                report.elapsed.as_millis(),
                report.runs_seen,
                report.requests(),
                report.cache_hits,
                report.pending,
                doc.url()
            );
        }

        report
    }

    fn flush(
        &self,
        doc: &mut Document,
        queue: &mut AnnotationQueue,
        cache: &mut LookupCache,
        batch: &mut Vec<String>,
        report: &mut CycleReport,
    ) {
        let results = self.converter.convert_batch(batch);
        report.flushes.push(batch.len());

        for (run, result) in batch.drain(..).zip(results) {
            report.converted += 1;
            cache.insert(run.as_str(), result.unwrap_or_default());
            propagate(doc, queue, cache, &run);
        }
    }
}

/// Write the cached transcription of `run` into every slot waiting for it
/// and remove the run from the queue.
///
/// Returns `false`, leaving the queue untouched, when the run has no
/// non-empty cached transcription.
pub fn propagate(
    doc: &mut Document,
    queue: &mut AnnotationQueue,
    cache: &LookupCache,
    run: &str,
) -> bool {
    let Some(transcription) = cache.get(run).filter(|t| !t.is_empty()) else {
        return false;
    };

    for slot in queue.take(run).unwrap_or_default() {
        if let Err(e) = doc.set_attribute(slot, SLOT_ATTRIBUTE, transcription) {
            log::warn!("resolver: could not fill slot {slot:?} for '{run}': {e}");
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
