// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract with the embedder's frame scheduler.
//!
//! The core never owns timers, never draws, and never reads a clock. Anything
//! that must happen *later* (a redraw, a recomputation of draw properties, the
//! delayed start of a scrollbar fade) is requested through [`FrameClient`].
//!
//! # Scrollbar animation loop
//!
//! ```rust,ignore
//! // Input thread: a scroll landed on `node`.
//! consumer.update_scrollbar_positions(node, false, &mut client);
//!
//! // Scheduler: the delay posted by `post_delayed_scrollbar_animation` elapsed.
//! consumer.delayed_scrollbar_animation_fired(node, &mut client);
//!
//! // Scheduler: every frame after `set_needs_animate_for_scrollbar_animation`.
//! consumer.animate_scrollbars(node, elapsed_since_start, &mut client, &mut tracer);
//! ```

use crate::time::Duration;
use crate::tree::NodeId;

/// Receives redraw and animation requests from the consumer tree.
///
/// Implemented by the embedder's scheduler; tests use a recording double.
pub trait FrameClient {
    /// Something visible changed; draw another frame.
    fn set_needs_redraw(&mut self);

    /// Draw properties (scrollbar geometry, copy-output targets) must be
    /// recomputed before the next draw.
    fn set_needs_update_draw_properties(&mut self);

    /// Schedules a call to
    /// [`SceneTree::delayed_scrollbar_animation_fired`](crate::tree::SceneTree::delayed_scrollbar_animation_fired)
    /// for `scroll_node` after `delay`.
    ///
    /// A later request for the same node replaces the earlier one.
    fn post_delayed_scrollbar_animation(&mut self, scroll_node: NodeId, delay: Duration);

    /// Requests that the scrollbar animation of `scroll_node` be driven on the
    /// next frame.
    fn set_needs_animate_for_scrollbar_animation(&mut self, scroll_node: NodeId);
}

#[cfg(test)]
pub(crate) mod testing {
    use alloc::vec::Vec;

    use super::FrameClient;
    use crate::time::Duration;
    use crate::tree::NodeId;

    /// Records every request for later inspection.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingClient {
        pub(crate) redraws: u32,
        pub(crate) draw_property_updates: u32,
        pub(crate) delayed: Vec<(NodeId, Duration)>,
        pub(crate) animate_requests: Vec<NodeId>,
    }

    impl FrameClient for RecordingClient {
        fn set_needs_redraw(&mut self) {
            self.redraws += 1;
        }

        fn set_needs_update_draw_properties(&mut self) {
            self.draw_property_updates += 1;
        }

        fn post_delayed_scrollbar_animation(&mut self, scroll_node: NodeId, delay: Duration) {
            self.delayed.push((scroll_node, delay));
        }

        fn set_needs_animate_for_scrollbar_animation(&mut self, scroll_node: NodeId) {
            self.animate_requests.push(scroll_node);
        }
    }
}
