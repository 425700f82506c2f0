//! Mutation watcher: annotate content the host adds after the initial scan.
//!
//! The host drains [`MutationRecord`]s from the document (the equivalent of a
//! `MutationObserver` callback firing) and hands them to
//! [`SessionContext::handle_mutations`].  Every added node is scanned on its
//! own, so dynamically loaded content never forces a full-page rescan.  The
//! resolution cycle is then (re)scheduled through the debouncer.

use crate::dom::{Document, MutationRecord, NodeId};
use crate::session::context::SessionContext;

/// Added nodes of a record batch, in delivery order.
pub fn added_nodes(records: &[MutationRecord]) -> Vec<NodeId> {
    records
        .iter()
        .flat_map(|r| r.added_nodes.iter().copied())
        .collect()
}

impl SessionContext {
    /// Scan every node added in `records`, then schedule resolution.
    ///
    /// Records generated by the scan's own edits are drained and dropped:
    /// they only describe placeholders (excluded from scanning) and run-free
    /// text remainders.  Ignored entirely until [`start`](Self::start) has
    /// succeeded.
    pub fn handle_mutations(&mut self, doc: &mut Document, records: Vec<MutationRecord>) -> usize {
        if !self.is_started() {
            return 0;
        }

        let mut inserted = 0;
        for node in added_nodes(&records) {
            inserted += self.scan(doc, node);
        }
        let own = doc.take_records();
        log::trace!(
            "watcher: {} records, {inserted} placeholders, {} own records dropped",
            records.len(),
            own.len()
        );

        self.trigger_resolve();
        inserted
    }

    /// Drain pending records from `doc` and handle them.
    pub fn observe(&mut self, doc: &mut Document) -> usize {
        let records = doc.take_records();
        if records.is_empty() {
            return 0;
        }
        self.handle_mutations(doc, records)
    }
}
