//! Pending-run queue.
//!
//! [`AnnotationQueue`] maps each unresolved run to the annotation slots
//! (`<rt>` nodes) waiting for its transcription.  Runs keep the order in
//! which they were first seen; a run removed by [`take`](AnnotationQueue::take)
//! and registered again later goes to the back.

use std::collections::{BTreeMap, HashMap};

use crate::dom::NodeId;

#[derive(Debug, Default)]
pub struct AnnotationQueue {
    entries: HashMap<String, Entry>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

#[derive(Debug)]
struct Entry {
    seq: u64,
    slots: Vec<NodeId>,
}

impl AnnotationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `slot` is waiting for `run`.
    pub fn register(&mut self, run: &str, slot: NodeId) {
        if let Some(entry) = self.entries.get_mut(run) {
            entry.slots.push(slot);
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, run.to_string());
        self.entries.insert(
            run.to_string(),
            Entry {
                seq,
                slots: vec![slot],
            },
        );
    }

    /// Snapshot of the queued runs in first-seen order.
    pub fn runs(&self) -> Vec<String> {
        self.order.values().cloned().collect()
    }

    /// Slots waiting for `run` (empty when the run is not queued).
    pub fn slots(&self, run: &str) -> &[NodeId] {
        self.entries
            .get(run)
            .map(|e| e.slots.as_slice())
            .unwrap_or(&[])
    }

    /// Remove `run` from the queue and hand back its slots.
    pub fn take(&mut self, run: &str) -> Option<Vec<NodeId>> {
        let entry = self.entries.remove(run)?;
        self.order.remove(&entry.seq);
        Some(entry.slots)
    }

    pub fn contains(&self, run: &str) -> bool {
        self.entries.contains_key(run)
    }

    /// Number of distinct runs queued.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of slots waiting across all runs.
    pub fn pending_slots(&self) -> usize {
        self.entries.values().map(|e| e.slots.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn slots(n: usize) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new(None);
        let ids = (0..n).map(|_| doc.create_element("rt")).collect();
        (doc, ids)
    }

    #[test]
    fn same_run_collects_all_slots() {
        let (_doc, ids) = slots(3);
        let mut queue = AnnotationQueue::new();
        queue.register("你好", ids[0]);
        queue.register("世界", ids[1]);
        queue.register("你好", ids[2]);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pending_slots(), 3);
        assert_eq!(queue.slots("你好"), &[ids[0], ids[2]]);
    }

    #[test]
    fn runs_keep_first_seen_order() {
        let (_doc, ids) = slots(4);
        let mut queue = AnnotationQueue::new();
        queue.register("三", ids[0]);
        queue.register("一", ids[1]);
        queue.register("二", ids[2]);
        queue.register("一", ids[3]);
        assert_eq!(queue.runs(), vec!["三", "一", "二"]);
    }

    #[test]
    fn take_removes_and_reregister_goes_last() {
        let (_doc, ids) = slots(3);
        let mut queue = AnnotationQueue::new();
        queue.register("甲", ids[0]);
        queue.register("乙", ids[1]);

        assert_eq!(queue.take("甲"), Some(vec![ids[0]]));
        assert!(!queue.contains("甲"));
        assert_eq!(queue.take("甲"), None);

        queue.register("甲", ids[2]);
        assert_eq!(queue.runs(), vec!["乙", "甲"]);
        assert_eq!(queue.slots("甲"), &[ids[2]]);
    }

    #[test]
    fn unknown_run_has_no_slots() {
        let queue = AnnotationQueue::new();
        assert!(queue.is_empty());
        assert!(queue.slots("无").is_empty());
    }
}
