// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scrollbar bindings, geometry feedback, and animator hosting.
//!
//! A scrollbar node names the scroll node it reflects and the clip node that
//! bounds it. Binding registers the scrollbar on every node from the scroll
//! node up to, but excluding, the clip node's parent, so a scroll anywhere in
//! that range can find the scrollbars to update.
//!
//! Animators are owned by the tree, keyed by scroll node. While an animator
//! runs it is taken out of the map so it can mutate the tree it lives in.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Vec2;

use super::id::NodeId;
use super::node::{ScrollbarOrientation, ScrollbarState};
use super::store::{DirtyScope, SceneTree};
use crate::animation::ScrollbarAnimator;
use crate::client::FrameClient;
use crate::time::Duration;
use crate::trace::{ScrollbarFrameEvent, Tracer};

impl SceneTree {
    // -- Binding --

    /// Gives `id` the scrollbar role, or updates its orientation and overlay
    /// flag.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn set_scrollbar_role(
        &mut self,
        id: NodeId,
        orientation: ScrollbarOrientation,
        is_overlay: bool,
    ) {
        let node = self.node_mut(id);
        match &mut node.scrollbar {
            Some(s) if s.orientation == orientation && s.is_overlay == is_overlay => return,
            Some(s) => {
                s.orientation = orientation;
                s.is_overlay = is_overlay;
            }
            None => node.scrollbar = Some(ScrollbarState::new(orientation, is_overlay)),
        }
        self.note_changed(id, DirtyScope::SelfOnly);
    }

    /// Points a scrollbar at the scroll node it reflects and the clip node
    /// bounding it, and re-registers it.
    ///
    /// # Panics
    ///
    /// Panics if an id is unknown or `id` is not a scrollbar.
    pub fn set_scrollbar_targets(
        &mut self,
        id: NodeId,
        scroll_node: Option<NodeId>,
        clip_node: Option<NodeId>,
    ) {
        for target in scroll_node.iter().chain(clip_node.iter()) {
            self.validate(*target);
        }
        if self.retarget_scrollbar(id, scroll_node, clip_node) {
            self.note_changed(id, DirtyScope::SelfOnly);
        }
    }

    /// Rebinds a scrollbar from its twin's state.
    ///
    /// Targets that are not (yet) part of this tree are recorded but not
    /// registered on.
    pub(crate) fn bind_scrollbar(
        &mut self,
        id: NodeId,
        orientation: ScrollbarOrientation,
        is_overlay: bool,
        scroll_node: Option<NodeId>,
        clip_node: Option<NodeId>,
    ) {
        self.set_scrollbar_role(id, orientation, is_overlay);
        if self.retarget_scrollbar(id, scroll_node, clip_node) {
            self.note_changed(id, DirtyScope::SelfOnly);
        }
    }

    /// Sets the targets and re-registers; returns whether they changed.
    fn retarget_scrollbar(
        &mut self,
        id: NodeId,
        scroll_node: Option<NodeId>,
        clip_node: Option<NodeId>,
    ) -> bool {
        let state = self.scrollbar_state_mut(id);
        let changed = state.scroll_node != scroll_node || state.clip_node != clip_node;
        state.scroll_node = scroll_node;
        state.clip_node = clip_node;
        self.unregister_scrollbar(id);
        self.register_scrollbar(id);
        changed
    }

    fn register_scrollbar(&mut self, id: NodeId) {
        let Some(state) = self.node(id).scrollbar else {
            return;
        };
        let (Some(scroll), Some(clip)) = (state.scroll_node, state.clip_node) else {
            return;
        };
        let Some(clip) = self.nodes.get(&clip) else {
            return;
        };
        let stop = clip.parent;
        let mut cur = Some(scroll);
        while let Some(n) = cur {
            if Some(n) == stop {
                break;
            }
            let Some(node) = self.nodes.get_mut(&n) else {
                break;
            };
            node.scrollbars.insert(id);
            cur = node.parent;
        }
    }

    pub(crate) fn unregister_scrollbar(&mut self, id: NodeId) {
        for node in self.nodes.values_mut() {
            node.scrollbars.remove(&id);
        }
    }

    fn scrollbar_state_mut(&mut self, id: NodeId) -> &mut ScrollbarState {
        self.node_mut(id)
            .scrollbar
            .as_mut()
            .unwrap_or_else(|| panic!("{id:?} is not a scrollbar"))
    }

    /// Sets the thumb thickness scale of a scrollbar.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown or not a scrollbar.
    pub fn set_thumb_thickness_scale_factor(&mut self, id: NodeId, factor: f32) {
        let state = self.scrollbar_state_mut(id);
        if state.thumb_thickness_scale_factor == factor {
            return;
        }
        state.thumb_thickness_scale_factor = factor;
        self.note_changed(id, DirtyScope::SelfOnly);
    }

    /// Whether the axis a scrollbar tracks can scroll at all: the user may
    /// scroll along it and there is room to.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    #[must_use]
    pub fn scrollbar_can_scroll(&self, id: NodeId) -> bool {
        let Some(state) = self.node(id).scrollbar else {
            return false;
        };
        let Some(scroll) = state.scroll_node.filter(|s| self.contains(*s)) else {
            return false;
        };
        self.node(scroll).user_scrollable(state.orientation)
            && state.orientation.component(self.max_scroll_offset(scroll)) > 0.0
    }

    // -- Geometry feedback --

    /// Recomputes the geometry of every scrollbar registered on
    /// `scroll_node`.
    ///
    /// Any change requests a draw-property update and a redraw. Overlay
    /// scrollbars that changed notify the animator of the scroll node they
    /// reflect. `on_resize` is forwarded only to scrollbars that reflect
    /// `scroll_node` itself.
    ///
    /// # Panics
    ///
    /// Panics if `scroll_node` is unknown.
    pub fn update_scrollbar_positions(
        &mut self,
        scroll_node: NodeId,
        on_resize: bool,
        client: &mut dyn FrameClient,
    ) {
        let scrollbars: Vec<NodeId> = self.node(scroll_node).scrollbars.iter().copied().collect();
        for sb in scrollbars {
            let Some(target) = self.get(sb).and_then(|n| n.scrollbar).and_then(|s| s.scroll_node)
            else {
                continue;
            };
            self.set_scrollbar_position(sb, on_resize && target == scroll_node, client);
        }
    }

    fn set_scrollbar_position(&mut self, sb: NodeId, on_resize: bool, client: &mut dyn FrameClient) {
        let Some(state) = self.node(sb).scrollbar else {
            return;
        };
        let (Some(scroll), Some(clip)) = (state.scroll_node, state.clip_node) else {
            return;
        };
        let (Some(scroll_n), Some(clip_n)) = (self.get(scroll), self.get(clip)) else {
            return;
        };
        let mut scroll_size = scroll_n.bounds;
        if scroll_size.is_zero_area() {
            return;
        }
        let clip_size = clip_n.bounds;
        let stop = clip_n.parent;

        let mut offset = Vec2::ZERO;
        let mut cur = Some(scroll);
        while let Some(n) = cur {
            if Some(n) == stop {
                break;
            }
            let Some(node) = self.get(n) else {
                break;
            };
            offset += self.current_scroll_offset(n);
            if Some(n) == self.page_scale_node {
                offset *= self.page_scale_factor;
                scroll_size = scroll_size * self.page_scale_factor;
            }
            cur = node.parent;
        }

        let axis = state.orientation;
        let visible = axis.length(clip_size);
        let total = axis.length(scroll_size);
        let ratio = visible / total;
        let maximum = total - visible;
        let current_pos = axis.component(offset);

        let state = self.scrollbar_state_mut(sb);
        let changed = state.current_pos != current_pos
            || state.maximum != maximum
            || state.visible_to_total_length_ratio != ratio;
        if !changed {
            return;
        }
        state.current_pos = current_pos;
        state.maximum = maximum;
        state.visible_to_total_length_ratio = ratio;
        let is_overlay = state.is_overlay;
        self.note_changed(sb, DirtyScope::SelfOnly);

        client.set_needs_update_draw_properties();
        client.set_needs_redraw();
        if is_overlay {
            self.with_scrollbar_animator(scroll, |animator, tree| {
                animator.did_scroll_update(on_resize, tree, client);
            });
        }
    }

    // -- Animator hosting --

    /// Installs or removes the scrollbar animator of `scroll_node`.
    ///
    /// # Panics
    ///
    /// Panics if `scroll_node` is unknown.
    pub fn set_scrollbar_animator(
        &mut self,
        scroll_node: NodeId,
        animator: Option<Box<dyn ScrollbarAnimator>>,
    ) {
        self.validate(scroll_node);
        match animator {
            Some(a) => {
                self.animators.insert(scroll_node, a);
            }
            None => {
                self.animators.remove(&scroll_node);
            }
        }
    }

    /// The scrollbar animator of `scroll_node`, if installed.
    #[must_use]
    pub fn scrollbar_animator(&self, scroll_node: NodeId) -> Option<&dyn ScrollbarAnimator> {
        self.animators.get(&scroll_node).map(|a| a.as_ref())
    }

    /// Runs `f` with the animator taken out of the map.
    fn with_scrollbar_animator<R>(
        &mut self,
        scroll_node: NodeId,
        f: impl FnOnce(&mut dyn ScrollbarAnimator, &mut Self) -> R,
    ) -> Option<R> {
        let mut animator = self.animators.remove(&scroll_node)?;
        let result = f(animator.as_mut(), self);
        if self.nodes.contains_key(&scroll_node) {
            self.animators.entry(scroll_node).or_insert(animator);
        }
        Some(result)
    }

    /// Forwards the start of a scroll gesture to the animator.
    pub fn did_scroll_begin(&mut self, scroll_node: NodeId) {
        self.with_scrollbar_animator(scroll_node, |a, _| a.did_scroll_begin());
    }

    /// Forwards the end of a scroll gesture to the animator.
    pub fn did_scroll_end(&mut self, scroll_node: NodeId, client: &mut dyn FrameClient) {
        self.with_scrollbar_animator(scroll_node, |a, _| a.did_scroll_end(client));
    }

    /// Forwards the pointer's distance from the scrollbars to the animator.
    pub fn did_mouse_move_near(
        &mut self,
        scroll_node: NodeId,
        distance: f64,
        client: &mut dyn FrameClient,
    ) {
        self.with_scrollbar_animator(scroll_node, |a, _| a.did_mouse_move_near(distance, client));
    }

    /// Forwards the pointer leaving the scrollbars to the animator.
    pub fn did_mouse_move_off_scrollbar(&mut self, scroll_node: NodeId, client: &mut dyn FrameClient) {
        self.with_scrollbar_animator(scroll_node, |a, _| a.did_mouse_move_off_scrollbar(client));
    }

    /// Forwards a button press to the animator.
    pub fn did_mouse_down(&mut self, scroll_node: NodeId) {
        self.with_scrollbar_animator(scroll_node, |a, _| a.did_mouse_down());
    }

    /// Forwards a button release to the animator.
    pub fn did_mouse_up(&mut self, scroll_node: NodeId, client: &mut dyn FrameClient) {
        self.with_scrollbar_animator(scroll_node, |a, _| a.did_mouse_up(client));
    }

    /// Called by the embedder when a delay posted through
    /// [`FrameClient::post_delayed_scrollbar_animation`] elapses.
    ///
    /// Returns whether an animation started. A delay that was superseded by
    /// later input is ignored.
    pub fn delayed_scrollbar_animation_fired(
        &mut self,
        scroll_node: NodeId,
        client: &mut dyn FrameClient,
    ) -> bool {
        self.with_scrollbar_animator(scroll_node, |a, _| a.delayed_start_fired(client))
            .unwrap_or(false)
    }

    /// Applies one animation frame at `progress` to the scrollbars of
    /// `scroll_node`.
    pub fn run_scrollbar_animation_frame(
        &mut self,
        scroll_node: NodeId,
        progress: f32,
        client: &mut dyn FrameClient,
        tracer: &mut Tracer<'_>,
    ) {
        self.with_scrollbar_animator(scroll_node, |a, tree| {
            a.run_animation_frame(progress, tree, client);
            tracer.scrollbar_frame(&ScrollbarFrameEvent {
                scroll_node,
                progress,
                still_animating: a.is_animating(),
            });
        });
    }

    /// Drives the running animation of `scroll_node` to `elapsed` since it
    /// started.
    ///
    /// Returns whether it is still running; if so, another frame has been
    /// requested from `client`.
    pub fn animate_scrollbars(
        &mut self,
        scroll_node: NodeId,
        elapsed: Duration,
        client: &mut dyn FrameClient,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        self.with_scrollbar_animator(scroll_node, |a, tree| {
            if !a.is_animating() {
                return false;
            }
            let progress = a.driver().progress_at(elapsed);
            a.run_animation_frame(progress, tree, client);
            let still_animating = a.is_animating();
            if still_animating {
                client.set_needs_animate_for_scrollbar_animation(scroll_node);
            }
            tracer.scrollbar_frame(&ScrollbarFrameEvent {
                scroll_node,
                progress,
                still_animating,
            });
            still_animating
        })
        .unwrap_or(false)
    }
}
