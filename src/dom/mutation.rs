//! Mutation records emitted by [`Document`](crate::dom::Document).

use crate::dom::node::NodeId;

/// One `childList` change under the document.
///
/// Mirrors the subset of the browser `MutationRecord` the watcher reads:
/// the parent that changed and the nodes added to / removed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The parent whose child list changed.
    pub target: NodeId,
    /// Nodes inserted under `target`.
    pub added_nodes: Vec<NodeId>,
    /// Nodes removed from `target`.
    pub removed_nodes: Vec<NodeId>,
}

impl MutationRecord {
    pub(crate) fn added(target: NodeId, node: NodeId) -> Self {
        Self {
            target,
            added_nodes: vec![node],
            removed_nodes: Vec::new(),
        }
    }

    pub(crate) fn removed(target: NodeId, node: NodeId) -> Self {
        Self {
            target,
            added_nodes: Vec::new(),
            removed_nodes: vec![node],
        }
    }
}
