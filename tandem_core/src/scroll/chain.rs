// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll delta distribution along a chain of scrollable nodes.

use alloc::collections::VecDeque;
use core::fmt;

use kurbo::{Point, Vec2};

use crate::client::FrameClient;
use crate::trace::{ScrollAppliedEvent, Tracer};
use crate::tree::{NodeId, SceneTree};

/// Movements at or below this magnitude do not count as scrolling.
const SCROLL_EPSILON: f64 = 0.1;

/// Remaining delta and gesture flags threaded through one distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollChainState {
    /// Delta not consumed yet.
    pub delta: Vec2,
    /// Screen position the gesture started at.
    pub start_position: Point,
    /// Whether delta may bubble past the node currently scrolling.
    pub should_propagate: bool,
    /// Whether the input maps one-to-one to content movement (touch).
    pub is_direct_manipulation: bool,
    /// Whether any node consumed delta earlier in this gesture.
    pub delta_consumed_for_scroll_sequence: bool,
    /// Node the gesture is currently locked to, if any.
    pub current_native_scrolling_node: Option<NodeId>,
    /// Whether some node moved horizontally.
    pub caused_scroll_x: bool,
    /// Whether some node moved vertically.
    pub caused_scroll_y: bool,
    /// Pending nodes, outermost at the front.
    chain: VecDeque<NodeId>,
}

impl ScrollChainState {
    /// Creates the state for one distribution of `delta`.
    ///
    /// `chain` lists candidate nodes innermost first, as returned by
    /// [`SceneTree::scroll_chain`].
    #[must_use]
    pub fn new(delta: Vec2, start_position: Point, chain: impl IntoIterator<Item = NodeId>) -> Self {
        let mut nodes: VecDeque<NodeId> = chain.into_iter().collect();
        nodes.make_contiguous().reverse();
        Self {
            delta,
            start_position,
            should_propagate: true,
            is_direct_manipulation: false,
            delta_consumed_for_scroll_sequence: false,
            current_native_scrolling_node: None,
            caused_scroll_x: false,
            caused_scroll_y: false,
            chain: nodes,
        }
    }

    /// Whether nothing is left to distribute.
    #[must_use]
    pub fn fully_consumed(&self) -> bool {
        self.delta == Vec2::ZERO
    }

    /// Removes `amount` from the remaining delta.
    ///
    /// Any non-zero amount marks the gesture as having consumed delta.
    pub fn consume_delta(&mut self, amount: Vec2) {
        self.delta -= amount;
        if amount != Vec2::ZERO {
            self.delta_consumed_for_scroll_sequence = true;
        }
    }

    /// Number of nodes not yet reached.
    #[must_use]
    pub fn remaining_nodes(&self) -> usize {
        self.chain.len()
    }
}

/// Moves one node by (part of) the remaining delta.
///
/// Implementations decide how much of [`ScrollChainState::delta`] the node
/// absorbs and record it through [`ScrollChainState::consume_delta`];
/// whatever is left when distribution ends is overscroll.
pub trait ScrollApplier {
    /// Applies the remaining delta of `state` to `node`.
    fn apply_scroll(&mut self, tree: &mut SceneTree, node: NodeId, state: &mut ScrollChainState);
}

/// Applier that scrolls each node within its extent.
///
/// A node that moves more than a tenth of a unit on either axis consumes
/// exactly what it moved and becomes the gesture's native scrolling node.
/// Scrollbars bound to a node that moved are updated through the client.
pub struct ClampingScrollApplier<'a> {
    client: &'a mut dyn FrameClient,
}

impl fmt::Debug for ClampingScrollApplier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClampingScrollApplier").finish_non_exhaustive()
    }
}

impl<'a> ClampingScrollApplier<'a> {
    /// Creates an applier reporting scrollbar changes to `client`.
    #[must_use]
    pub fn new(client: &'a mut dyn FrameClient) -> Self {
        Self { client }
    }
}

impl ScrollApplier for ClampingScrollApplier<'_> {
    fn apply_scroll(&mut self, tree: &mut SceneTree, node: NodeId, state: &mut ScrollChainState) {
        let unused = tree.scroll_by(node, state.delta);
        let applied = state.delta - unused;
        if applied != Vec2::ZERO {
            tree.update_scrollbar_positions(node, false, self.client);
        }

        let moved_x = applied.x.abs() > SCROLL_EPSILON;
        let moved_y = applied.y.abs() > SCROLL_EPSILON;
        if !(moved_x || moved_y) {
            return;
        }
        state.caused_scroll_x |= moved_x;
        state.caused_scroll_y |= moved_y;
        state.consume_delta(applied);
        state.current_native_scrolling_node = Some(node);
    }
}

/// Distributes the remaining delta of `state` over its chain.
///
/// The outermost node is taken first and hands the rest of the chain on
/// before applying anything itself, so deltas land innermost first. A
/// gesture that must not propagate stops at the node it is locked to once
/// it has consumed delta.
pub fn distribute_scroll(
    tree: &mut SceneTree,
    state: &mut ScrollChainState,
    applier: &mut dyn ScrollApplier,
    tracer: &mut Tracer<'_>,
) {
    if state.fully_consumed() {
        return;
    }
    if let Some(next) = state.chain.pop_front() {
        distribute_to(tree, next, state, applier, tracer);
    }
}

fn distribute_to(
    tree: &mut SceneTree,
    node: NodeId,
    state: &mut ScrollChainState,
    applier: &mut dyn ScrollApplier,
    tracer: &mut Tracer<'_>,
) {
    if state.fully_consumed() {
        return;
    }
    distribute_scroll(tree, state, applier, tracer);

    let offered = state.delta;
    let locked_elsewhere = !state.should_propagate
        && state.delta_consumed_for_scroll_sequence
        && state.current_native_scrolling_node != Some(node);
    if locked_elsewhere {
        tracer.scroll_applied(&ScrollAppliedEvent {
            node,
            offered,
            consumed: Vec2::ZERO,
            skipped: true,
        });
        return;
    }

    applier.apply_scroll(tree, node, state);
    tracer.scroll_applied(&ScrollAppliedEvent {
        node,
        offered,
        consumed: offered - state.delta,
        skipped: false,
    });
}
