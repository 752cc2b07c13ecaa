// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node scroll offsets, extents, and clamped scrolling.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Size, Vec2};

use crate::tree::{DirtyScope, NodeId, SceneTree, TreeRole};

impl SceneTree {
    // -- Offsets --

    /// The node's current scroll offset as seen from this tree.
    ///
    /// A producer reports the value it last set or received from
    /// [`pull_scroll_deltas`](crate::sync::pull_scroll_deltas); a consumer
    /// reports the active value of the shared offset.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    #[must_use]
    pub fn current_scroll_offset(&self, id: NodeId) -> Vec2 {
        let node = self.node(id);
        match self.role {
            TreeRole::Producer => node.main_scroll_offset,
            TreeRole::Consumer => node.scroll_offset.current(true),
        }
    }

    /// Moves the node to `offset` without clamping.
    ///
    /// On a consumer this adjusts the active delta of the shared offset, so
    /// the movement is later reported to the producer.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn set_current_scroll_offset(&mut self, id: NodeId, offset: Vec2) {
        match self.role {
            TreeRole::Producer => self.set_scroll_offset(id, offset),
            TreeRole::Consumer => {
                if self.node(id).scroll_offset.set_current(offset) {
                    self.note_changed(id, DirtyScope::Subtree);
                }
            }
        }
    }

    /// Sets the producer-side scroll offset that the next push delivers.
    ///
    /// # Panics
    ///
    /// Panics on a consumer tree or if `id` is unknown.
    pub fn set_scroll_offset(&mut self, id: NodeId, offset: Vec2) {
        assert!(
            self.role == TreeRole::Producer,
            "producer scroll offsets cannot be set on a consumer tree"
        );
        let node = self.node_mut(id);
        if node.main_scroll_offset == offset {
            return;
        }
        node.main_scroll_offset = offset;
        self.note_changed(id, DirtyScope::Subtree);
    }

    /// Like [`set_scroll_offset`](Self::set_scroll_offset), but the next push
    /// discards any delta the consumer has not reported yet.
    ///
    /// # Panics
    ///
    /// Panics on a consumer tree or if `id` is unknown.
    pub fn set_scroll_offset_and_clobber_active_value(&mut self, id: NodeId, offset: Vec2) {
        self.set_scroll_offset(id, offset);
        self.node_mut(id).clobber_active_scroll_offset = true;
        self.set_needs_push(id);
    }

    /// Delivers the producer's value for `id` and activates it.
    ///
    /// Delta the consumer scrolled since its last report survives.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn push_scroll_offset_from_main_thread(&mut self, id: NodeId, offset: Vec2) {
        let handle = &self.node(id).scroll_offset;
        handle.push_from_main_thread(offset);
        if handle.push_pending_to_active() {
            self.note_changed(id, DirtyScope::Subtree);
        }
    }

    /// Delivers the producer's value for `id` and activates it, discarding
    /// any unreported consumer delta.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn push_scroll_offset_from_main_thread_and_clobber_active_value(
        &mut self,
        id: NodeId,
        offset: Vec2,
    ) {
        self.node(id).scroll_offset.set_clobber_active_value();
        self.push_scroll_offset_from_main_thread(id, offset);
    }

    /// Reports the delta the consumer scrolled since the last push.
    ///
    /// Pulling twice without an intervening push returns the same delta.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn pull_delta_for_main_thread(&mut self, id: NodeId) -> Vec2 {
        self.node(id).scroll_offset.pull_delta_for_main_thread()
    }

    /// Folds a reported delta back into the active base after the producer
    /// dropped the commit that would have echoed it.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn apply_sent_scroll_deltas_from_aborted_commit(&mut self, id: NodeId) {
        self.node(id).scroll_offset.abort_commit();
    }

    // -- Extents --

    /// Largest offset `id` can scroll to, in unscaled content coordinates.
    ///
    /// Zero when the node is not scrollable, its clip node is missing, or
    /// its bounds are empty. If the page-scale node lies between the node and
    /// its clip node's parent, the content is measured at the page scale.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    #[must_use]
    pub fn max_scroll_offset(&self, id: NodeId) -> Vec2 {
        let node = self.node(id);
        let Some(clip) = node.scroll_clip.and_then(|c| self.get(c)) else {
            return Vec2::ZERO;
        };
        if node.bounds.is_zero_area() {
            return Vec2::ZERO;
        }

        let stop = clip.parent;
        let mut scale = 1.0;
        let mut cur = Some(id);
        while let Some(n) = cur {
            if Some(n) == stop {
                break;
            }
            if Some(n) == self.page_scale_node {
                scale = self.page_scale_factor;
            }
            cur = self.get(n).and_then(|x| x.parent);
        }

        let scaled = node.bounds * scale;
        let floored = Size::new(scaled.width.floor(), scaled.height.floor());
        let max = Vec2::new(
            floored.width - clip.bounds.width,
            floored.height - clip.bounds.height,
        ) / scale;
        Vec2::new(max.x.max(0.0), max.y.max(0.0))
    }

    /// Clamps `offset` into `[0, max_scroll_offset(id)]` per axis.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    #[must_use]
    pub fn clamp_scroll_offset_to_limits(&self, id: NodeId, offset: Vec2) -> Vec2 {
        let max = self.max_scroll_offset(id);
        Vec2::new(offset.x.clamp(0.0, max.x), offset.y.clamp(0.0, max.y))
    }

    /// Pulls the current offset back into range after bounds shrank.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn clamp_scroll_offset(&mut self, id: NodeId) {
        let old = self.current_scroll_offset(id);
        let clamped = self.clamp_scroll_offset_to_limits(id, old);
        if clamped != old {
            self.set_current_scroll_offset(id, clamped);
        }
    }

    /// Scrolls by `delta`, clamped to the node's extent, and returns the part
    /// of `delta` that could not be applied.
    ///
    /// Axes the user may not scroll along consume nothing.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn scroll_by(&mut self, id: NodeId, delta: Vec2) -> Vec2 {
        let node = self.node(id);
        let adjusted = Vec2::new(
            if node.user_scrollable_horizontal { delta.x } else { 0.0 },
            if node.user_scrollable_vertical { delta.y } else { 0.0 },
        );
        let old = self.current_scroll_offset(id);
        let new = self.clamp_scroll_offset_to_limits(id, old + adjusted);
        self.set_current_scroll_offset(id, new);
        old + delta - new
    }
}
