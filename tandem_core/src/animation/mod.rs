// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scrollbar fade and thinning animators.
//!
//! An animator belongs to one scroll node and drives the opacity (and, for
//! [`ThinningAnimator`], the thumb thickness) of the overlay scrollbars
//! registered on it. Animators never read a clock. They go through two
//! phases, both paced by the embedder via [`FrameClient`]:
//!
//! ```text
//!   did_scroll_update ──► post_delayed_scrollbar_animation(delay)
//!                                   │
//!                                   ▼ (embedder timer)
//!   delayed_scrollbar_animation_fired ──► set_needs_animate_for_scrollbar_animation
//!                                                   │
//!                                                   ▼ (every frame)
//!   animate_scrollbars(elapsed) ──► run_animation_frame(progress 0 → 1)
//! ```
//!
//! A delay superseded by newer input is ignored when it fires. Mouse input
//! on [`ThinningAnimator`] starts an animation without a delay.
//!
//! The shared start/stop and gesture bookkeeping lives in
//! [`AnimationDriver`]; variants embed one and implement
//! [`ScrollbarAnimator`].

mod fade;
mod thinning;

use core::fmt;

pub use fade::FadeAnimator;
pub use thinning::{AnimationChange, ThinningAnimator};

use crate::client::FrameClient;
use crate::time::Duration;
use crate::tree::{NodeId, SceneTree};

/// Timing and appearance parameters for scrollbar animators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollbarAnimatorConfig {
    /// Delay between the last scroll update and the start of the fade.
    pub fade_delay: Duration,
    /// Delay used instead of `fade_delay` when the update came from a resize.
    pub resize_fade_delay: Duration,
    /// Length of one animation from progress 0 to 1.
    pub fade_duration: Duration,
    /// Opacity of a thinning scrollbar the pointer is not over.
    pub idle_opacity: f32,
    /// Thumb thickness scale of a thinning scrollbar the pointer is not near.
    pub idle_thickness_scale: f32,
    /// Pointer distance below which a thinning scrollbar counts as near.
    pub mouse_move_distance_to_trigger_animation: f64,
}

impl ScrollbarAnimatorConfig {
    /// Linear fade to fully transparent.
    #[must_use]
    pub const fn fade() -> Self {
        Self {
            fade_delay: Duration::from_millis(300),
            resize_fade_delay: Duration::from_millis(2000),
            fade_duration: Duration::from_millis(300),
            idle_opacity: 0.0,
            idle_thickness_scale: 1.0,
            mouse_move_distance_to_trigger_animation: 0.0,
        }
    }

    /// Thinning scrollbars that stay visible and widen under the pointer.
    #[must_use]
    pub const fn thinning() -> Self {
        Self {
            fade_delay: Duration::from_millis(500),
            resize_fade_delay: Duration::from_millis(2000),
            fade_duration: Duration::from_millis(300),
            idle_opacity: 0.7,
            idle_thickness_scale: 0.4,
            mouse_move_distance_to_trigger_animation: 25.0,
        }
    }
}

/// Start/stop state shared by every animator variant.
#[derive(Clone, Debug)]
pub struct AnimationDriver {
    scroll_node: NodeId,
    config: ScrollbarAnimatorConfig,
    is_animating: bool,
    delayed_start_pending: bool,
    currently_scrolling: bool,
    scroll_gesture_has_scrolled: bool,
}

impl AnimationDriver {
    /// Creates an idle driver for the scrollbars of `scroll_node`.
    #[must_use]
    pub fn new(scroll_node: NodeId, config: ScrollbarAnimatorConfig) -> Self {
        Self {
            scroll_node,
            config,
            is_animating: false,
            delayed_start_pending: false,
            currently_scrolling: false,
            scroll_gesture_has_scrolled: false,
        }
    }

    /// The scroll node whose scrollbars are animated.
    #[must_use]
    pub fn scroll_node(&self) -> NodeId {
        self.scroll_node
    }

    /// The animator's parameters.
    #[must_use]
    pub fn config(&self) -> &ScrollbarAnimatorConfig {
        &self.config
    }

    /// Whether frames are being driven.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    /// Whether a delayed start has been posted and not yet fired or
    /// superseded.
    #[must_use]
    pub fn delayed_start_pending(&self) -> bool {
        self.delayed_start_pending
    }

    /// Whether a scroll gesture is in progress.
    #[must_use]
    pub fn currently_scrolling(&self) -> bool {
        self.currently_scrolling
    }

    /// Marks the start of a scroll gesture.
    pub fn did_scroll_begin(&mut self) {
        self.currently_scrolling = true;
    }

    /// Stops any running animation and, outside a gesture, posts a delayed
    /// start if `schedule` is set.
    ///
    /// Inside a gesture the start is deferred to
    /// [`did_scroll_end`](Self::did_scroll_end).
    pub fn did_scroll_update(
        &mut self,
        on_resize: bool,
        schedule: bool,
        client: &mut dyn FrameClient,
    ) {
        self.stop();
        if self.currently_scrolling {
            self.scroll_gesture_has_scrolled = true;
        } else if schedule {
            self.post_delayed_start(on_resize, client);
        }
    }

    /// Marks the end of a scroll gesture, posting a delayed start if the
    /// gesture scrolled and `schedule` is set.
    pub fn did_scroll_end(&mut self, schedule: bool, client: &mut dyn FrameClient) {
        if self.scroll_gesture_has_scrolled && schedule {
            self.post_delayed_start(false, client);
        }
        self.scroll_gesture_has_scrolled = false;
        self.currently_scrolling = false;
    }

    fn post_delayed_start(&mut self, on_resize: bool, client: &mut dyn FrameClient) {
        self.delayed_start_pending = true;
        let delay = if on_resize {
            self.config.resize_fade_delay
        } else {
            self.config.fade_delay
        };
        client.post_delayed_scrollbar_animation(self.scroll_node, delay);
    }

    /// Starts driving frames immediately.
    pub fn start(&mut self, client: &mut dyn FrameClient) {
        self.delayed_start_pending = false;
        self.is_animating = true;
        client.set_needs_animate_for_scrollbar_animation(self.scroll_node);
    }

    /// Stops driving frames and cancels any pending delayed start.
    pub fn stop(&mut self) {
        self.delayed_start_pending = false;
        self.is_animating = false;
    }

    /// Starts the animation if a delayed start is still pending.
    ///
    /// Returns whether it started.
    pub fn delayed_start_fired(&mut self, client: &mut dyn FrameClient) -> bool {
        if !self.delayed_start_pending {
            return false;
        }
        self.start(client);
        true
    }

    /// Progress in `[0, 1]` after `elapsed` since the animation started.
    #[must_use]
    pub fn progress_at(&self, elapsed: Duration) -> f32 {
        let total = self.config.fade_duration.as_nanos();
        if total == 0 {
            return 1.0;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "f32 precision is enough for an animation progress"
        )]
        let ratio = (elapsed.as_nanos() as f64 / total as f64) as f32;
        ratio.min(1.0)
    }
}

/// Drives the opacity and thickness of the scrollbars of one scroll node.
///
/// Implementations embed an [`AnimationDriver`] and expose it through
/// [`driver`](Self::driver) and [`driver_mut`](Self::driver_mut); the
/// provided methods forward gesture and timer events to it. Pointer events
/// default to no-ops.
pub trait ScrollbarAnimator: fmt::Debug + Send {
    /// The shared start/stop state.
    fn driver(&self) -> &AnimationDriver;

    /// The shared start/stop state, mutably.
    fn driver_mut(&mut self) -> &mut AnimationDriver;

    /// Scrollbar geometry changed because the node scrolled or resized.
    ///
    /// Shows the scrollbars at once and schedules the delayed animation.
    fn did_scroll_update(
        &mut self,
        on_resize: bool,
        tree: &mut SceneTree,
        client: &mut dyn FrameClient,
    );

    /// Applies the animated values for `progress` in `[0, 1]`.
    ///
    /// Progress 1 ends the animation.
    fn run_animation_frame(
        &mut self,
        progress: f32,
        tree: &mut SceneTree,
        client: &mut dyn FrameClient,
    );

    /// A scroll gesture began.
    fn did_scroll_begin(&mut self) {
        self.driver_mut().did_scroll_begin();
    }

    /// A scroll gesture ended.
    fn did_scroll_end(&mut self, client: &mut dyn FrameClient) {
        self.driver_mut().did_scroll_end(true, client);
    }

    /// The pointer moved to `distance` from the scrollbars; 0 means over.
    fn did_mouse_move_near(&mut self, distance: f64, client: &mut dyn FrameClient) {
        _ = (distance, client);
    }

    /// The pointer left the scrollbars and their proximity zone.
    fn did_mouse_move_off_scrollbar(&mut self, client: &mut dyn FrameClient) {
        _ = client;
    }

    /// A mouse button was pressed.
    fn did_mouse_down(&mut self) {}

    /// A mouse button was released.
    fn did_mouse_up(&mut self, client: &mut dyn FrameClient) {
        _ = client;
    }

    /// Starts driving frames without a delay.
    fn start_animation(&mut self, client: &mut dyn FrameClient) {
        self.driver_mut().start(client);
    }

    /// Whether frames are being driven.
    fn is_animating(&self) -> bool {
        self.driver().is_animating()
    }

    /// A posted delay elapsed; returns whether the animation started.
    fn delayed_start_fired(&mut self, client: &mut dyn FrameClient) -> bool {
        self.driver_mut().delayed_start_fired(client)
    }
}
