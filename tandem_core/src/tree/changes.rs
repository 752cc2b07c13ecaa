// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change collection.
//!
//! Mutators only *mark*; nothing is recomputed inside the tree. The embedder
//! drains the marks once per frame with [`SceneTree::take_changes`] and
//! re-evaluates whatever it caches per node (draw properties, raster tiles,
//! occlusion) for the reported ids:
//!
//! 1. **PROPERTY** — drained in dependency order, so owners come before the
//!    nodes they own. Subtree-scoped changes were propagated eagerly at mark
//!    time.
//! 2. **TOPOLOGY** — drained to a flag; any structural edit means traversal
//!    orders must be rebuilt.
//! 3. **Lifecycle** — ids created or destroyed since the last drain.

use alloc::vec::Vec;

use super::id::NodeId;
use super::store::SceneTree;
use crate::dirty;

/// Per-node changes collected since the last drain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeChanges {
    /// Nodes whose content changed, owners before owned.
    pub property_changed: Vec<NodeId>,
    /// Nodes added since the last drain.
    pub added: Vec<NodeId>,
    /// Nodes removed since the last drain.
    pub removed: Vec<NodeId>,
    /// Whether any parent, child, mask, or replica link changed.
    pub topology_changed: bool,
}

impl TreeChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.property_changed.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.property_changed.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl SceneTree {
    /// Drains every pending mark and returns the changes.
    pub fn take_changes(&mut self) -> TreeChanges {
        let mut changes = TreeChanges::default();
        self.take_changes_into(&mut changes);
        changes
    }

    /// Like [`take_changes`](Self::take_changes), but reuses a caller-provided
    /// buffer to avoid allocation.
    pub fn take_changes_into(&mut self, changes: &mut TreeChanges) {
        changes.clear();

        let marked: Vec<u32> = self
            .dirty
            .drain(dirty::PROPERTY)
            .deterministic()
            .run()
            .collect();
        changes.property_changed.extend(
            marked
                .into_iter()
                .filter_map(NodeId::new)
                .filter(|id| self.nodes.contains_key(id)),
        );

        let topology = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .count();
        changes.topology_changed = topology > 0;

        changes.added.append(&mut self.pending_added);
        changes.removed.append(&mut self.pending_removed);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;

    #[test]
    fn fresh_nodes_are_reported_as_added() {
        let mut tree = SceneTree::producer();
        let a = tree.create_node();
        let b = tree.create_node();
        let changes = tree.take_changes();
        assert_eq!(changes.added, &[a, b]);
        assert!(changes.topology_changed);
        assert!(tree.take_changes().is_empty());
    }

    #[test]
    fn owners_precede_owned() {
        let mut tree = SceneTree::producer();
        let root = tree.create_node();
        let a = tree.create_node();
        let b = tree.create_node();
        tree.add_child(root, a);
        tree.add_child(a, b);
        let _ = tree.take_changes();

        tree.set_masks_to_bounds(root, true);
        let changes = tree.take_changes();
        assert_eq!(changes.property_changed, &[root, a, b]);
        assert!(!changes.topology_changed);
    }

    #[test]
    fn destroyed_nodes_are_reported_once() {
        let mut tree = SceneTree::producer();
        let a = tree.create_node();
        tree.set_bounds(a, Size::new(1.0, 1.0));
        let _ = tree.take_changes();

        tree.set_bounds(a, Size::new(2.0, 2.0));
        let _ = tree.destroy_node(a);
        let changes = tree.take_changes();
        assert_eq!(changes.removed, &[a]);
        assert!(changes.property_changed.is_empty());
    }

    #[test]
    fn take_changes_into_reuses_buffer() {
        let mut tree = SceneTree::producer();
        let a = tree.create_node();
        let mut changes = TreeChanges::default();
        tree.take_changes_into(&mut changes);
        assert_eq!(changes.added, &[a]);
        tree.take_changes_into(&mut changes);
        assert!(changes.is_empty());
    }
}
