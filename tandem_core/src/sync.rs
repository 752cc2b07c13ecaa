// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Producer-to-consumer tree synchronization.
//!
//! A commit runs in two passes:
//!
//! 1. [`synchronize_trees`] reconciles structure. Consumer nodes are reused
//!    by id so that consumer-only state (scroll deltas, animators, draw
//!    properties) survives; producer nodes the consumer has not seen are
//!    created, sharing the producer's scroll offset. Scrollbars are rebound
//!    by id once the new structure is complete.
//! 2. [`push_properties`] walks both trees in lockstep and copies properties
//!    only where the producer marked a node, or a node below it, for push.
//!
//! Between commits the producer collects what the consumer scrolled with
//! [`pull_scroll_deltas`]. If the producer then drops the commit, the
//! consumer calls [`abort_commit`] so the reported deltas are not lost.
//!
//! ```rust,ignore
//! let deltas = pull_scroll_deltas(&mut producer);
//! // ... producer runs layout with the new offsets ...
//! let report = synchronize_trees(&mut producer, &mut consumer, &mut tracer);
//! push_properties(&mut producer, &mut consumer, &mut tracer);
//! ```

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use kurbo::Vec2;

use crate::dirty;
use crate::trace::{PushEvent, SyncEvent, Tracer};
use crate::tree::{CopyOutputRequest, DirtyScope, NodeId, SceneNode, SceneTree, TreeRole};

/// Outcome of one [`synchronize_trees`] pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncReport {
    /// Pass counter of the consumer after this pass.
    pub pass: u64,
    /// Consumer nodes kept from the previous pass.
    pub reused: u32,
    /// Consumer nodes created for producer ids seen for the first time.
    pub added: Vec<NodeId>,
    /// Consumer nodes dropped because the producer no longer reaches them.
    pub removed: Vec<NodeId>,
    /// Scrollbar nodes rebound against the new structure.
    pub scrollbars_bound: u32,
    /// Copy requests that were pending on dropped nodes.
    pub abandoned_copy_requests: Vec<(NodeId, CopyOutputRequest)>,
}

/// Outcome of one [`push_properties`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PushReport {
    /// Node pairs the walk visited.
    pub visited: u32,
    /// Node pairs whose properties were copied.
    pub pushed: u32,
}

/// Reconciles the structure of `consumer` with `producer`.
///
/// The consumer ends up with exactly the nodes reachable from the producer's
/// root, linked the same way. Nodes are matched by id; a node that is new to
/// the consumer shares the producer node's scroll offset and forces that
/// producer node to push.
///
/// # Panics
///
/// Panics if the trees do not have the producer and consumer roles, or if a
/// scroll or clip relation names a node the producer's root no longer
/// reaches.
pub fn synchronize_trees(
    producer: &mut SceneTree,
    consumer: &mut SceneTree,
    tracer: &mut Tracer<'_>,
) -> SyncReport {
    assert!(
        producer.role() == TreeRole::Producer && consumer.role() == TreeRole::Consumer,
        "trees are synchronized from a producer to a consumer"
    );
    let mut report = SyncReport::default();

    // -- Step 1: detach everything into a scratch map --

    let mut scratch = mem::take(&mut consumer.nodes);
    for node in scratch.values_mut() {
        if let Some(parent) = node.parent {
            consumer
                .dirty
                .remove_dependency(node.id.get(), parent.get(), dirty::PROPERTY);
        }
        node.scrollbars.clear();
    }

    // -- Step 2: reuse or create along the producer's structure --

    let old_root = consumer.root;
    consumer.root = producer.root();
    if let Some(root) = consumer.root {
        if old_root != Some(root) {
            consumer.dirty.mark(root.get(), dirty::TOPOLOGY);
        }
        assemble(producer, consumer, &mut scratch, root, &mut report);
    }

    // -- Step 3: drop leftovers, then rebind scrollbars --

    for (id, node) in scratch {
        consumer.dirty.remove_key(id.get());
        consumer.animators.remove(&id);
        if consumer.page_scale_node == Some(id) {
            consumer.page_scale_node = None;
        }
        report
            .abandoned_copy_requests
            .extend(node.copy_requests.into_iter().map(|r| (id, r)));
        consumer.pending_removed.push(id);
        report.removed.push(id);
    }
    assert_relations_resolve(producer, consumer);

    let scrollbars: Vec<NodeId> = consumer
        .nodes
        .keys()
        .copied()
        .filter(|id| producer.node(*id).scrollbar().is_some())
        .collect();
    for id in scrollbars {
        if let Some(sb) = producer.node(id).scrollbar() {
            consumer.bind_scrollbar(id, sb.orientation, sb.is_overlay, sb.scroll_node, sb.clip_node);
            report.scrollbars_bound += 1;
        }
    }

    consumer.pass += 1;
    consumer.needs_full_tree_sync = false;
    producer.needs_full_tree_sync = false;
    report.pass = consumer.pass;

    tracer.sync(&SyncEvent {
        pass: report.pass,
        reused: report.reused,
        created: count(&report.added),
        dropped: count(&report.removed),
        scrollbars_bound: report.scrollbars_bound,
    });
    report
}

/// Mirrors the subtree of `root` into `consumer`, taking nodes out of
/// `scratch` where they exist.
fn assemble(
    producer: &mut SceneTree,
    consumer: &mut SceneTree,
    scratch: &mut BTreeMap<NodeId, SceneNode>,
    root: NodeId,
    report: &mut SyncReport,
) {
    // Children, then mask, then replica; the stack holds them reversed.
    let mut stack = alloc::vec![(root, None)];
    while let Some((id, parent)) = stack.pop() {
        let src = producer.node(id);
        let children = src.children().to_vec();
        let (mask, replica) = (src.mask(), src.replica());

        let node = match scratch.remove(&id) {
            Some(mut node) => {
                report.reused += 1;
                let relinked = node.parent != parent
                    || node.children != children
                    || node.mask != mask
                    || node.replica != replica;
                if relinked {
                    consumer.dirty.mark(id.get(), dirty::TOPOLOGY);
                }
                node.parent = parent;
                node.children = children;
                node.mask = mask;
                node.replica = replica;
                node
            }
            None => {
                let mut node = SceneNode::new(id, Arc::clone(src.scroll_offset()));
                node.parent = parent;
                node.children = children;
                node.mask = mask;
                node.replica = replica;
                producer.set_needs_push(id);
                consumer.dirty.mark(id.get(), dirty::TOPOLOGY);
                consumer.pending_added.push(id);
                report.added.push(id);
                node
            }
        };

        if let Some(p) = parent {
            let _ = consumer
                .dirty
                .add_dependency(id.get(), p.get(), dirty::PROPERTY);
        }
        let dependents: Vec<NodeId> = node.dependents().collect();
        stack.extend(dependents.into_iter().rev().map(|d| (d, Some(id))));
        consumer.nodes.insert(id, node);
    }
}

/// Panics unless every scroll and clip relation the consumer will hold once
/// the next push lands names a node the consumer has.
///
/// A node marked for push takes its relations from the producer; any other
/// node keeps its own.
fn assert_relations_resolve(producer: &SceneTree, consumer: &SceneTree) {
    for (id, node) in &consumer.nodes {
        let src = producer.node(*id);
        let held = if src.needs_push() { src } else { node };
        let related = held
            .scroll_parent
            .iter()
            .chain(&held.scroll_children)
            .chain(held.clip_parent.iter())
            .chain(&held.clip_children);
        for r in related {
            assert!(
                consumer.nodes.contains_key(r),
                "{id:?} is scrolled or clipped by {r:?}, which the consumer tree no longer has"
            );
        }
    }
}

/// Copies dirty properties from `producer` to `consumer`.
///
/// Visits the two trees in lockstep from the root, pushing nodes that need a
/// push and descending only into nodes with dependents that need one.
/// Afterwards every visited producer node's dependent counter is recomputed
/// from its dependents. The page-scale node and factor are copied first.
///
/// # Panics
///
/// Panics if the consumer's structure does not match the producer's, which
/// means [`synchronize_trees`] was skipped after a structural change.
pub fn push_properties(
    producer: &mut SceneTree,
    consumer: &mut SceneTree,
    tracer: &mut Tracer<'_>,
) -> PushReport {
    let page_scale_node = producer.page_scale_node().filter(|n| consumer.contains(*n));
    let factor = producer.page_scale_factor();
    if consumer.page_scale_node != page_scale_node || consumer.page_scale_factor != factor {
        consumer.page_scale_node = page_scale_node;
        consumer.page_scale_factor = factor;
        if let Some(n) = page_scale_node {
            consumer.note_changed(n, DirtyScope::Subtree);
        }
    }

    let mut report = PushReport::default();
    if let Some(root) = producer.root() {
        push_subtree(producer, consumer, root, &mut report);
    }
    tracer.push_properties(&PushEvent {
        pass: consumer.pass,
        visited: report.visited,
        pushed: report.pushed,
    });
    report
}

fn push_subtree(
    producer: &mut SceneTree,
    consumer: &mut SceneTree,
    id: NodeId,
    report: &mut PushReport,
) {
    assert!(consumer.contains(id), "consumer tree is missing {id:?}");
    report.visited += 1;

    if producer.node(id).needs_push() {
        producer.push_properties_to(id, consumer);
        report.pushed += 1;
    }
    if producer.node(id).num_dependents_need_push() == 0 {
        return;
    }

    let src = producer.node(id);
    let twin = consumer.node(id);
    assert!(
        src.children().len() == twin.children().len()
            && src.mask().is_some() == twin.mask().is_some()
            && src.replica().is_some() == twin.replica().is_some(),
        "child count mismatch at {id:?}"
    );
    let dependents: Vec<NodeId> = src.dependents().collect();
    for &d in &dependents {
        if producer.node(d).parent_should_know_need_push() {
            push_subtree(producer, consumer, d, report);
        }
    }

    let remaining = dependents
        .iter()
        .filter(|d| producer.node(**d).parent_should_know_need_push())
        .count();
    producer.node_mut(id).num_dependents_need_push = count_to_u32(remaining);
}

/// Collects what the consumer scrolled since the last push and applies it to
/// the producer's offsets.
///
/// Each node with a non-zero delta is marked for push, so the next
/// [`push_properties`] confirms the new value to the consumer. Returns the
/// pulled deltas in id order.
pub fn pull_scroll_deltas(producer: &mut SceneTree) -> Vec<(NodeId, Vec2)> {
    assert!(
        producer.role() == TreeRole::Producer,
        "scroll deltas are pulled by the producer"
    );
    let ids: Vec<NodeId> = producer.nodes.keys().copied().collect();
    let mut pulled = Vec::new();
    for id in ids {
        let delta = producer.pull_delta_for_main_thread(id);
        if delta == Vec2::ZERO {
            continue;
        }
        let offset = producer.current_scroll_offset(id) + delta;
        producer.set_scroll_offset(id, offset);
        pulled.push((id, delta));
    }
    pulled
}

/// Folds every delta reported by [`pull_scroll_deltas`] back into the
/// consumer's active offsets after the producer dropped its commit.
pub fn abort_commit(consumer: &mut SceneTree) {
    let ids: Vec<NodeId> = consumer.nodes.keys().copied().collect();
    for id in ids {
        consumer.apply_sent_scroll_deltas_from_aborted_commit(id);
    }
}

fn count(ids: &[NodeId]) -> u32 {
    count_to_u32(ids.len())
}

fn count_to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
