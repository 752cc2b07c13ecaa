// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll input resolution against the consumer tree.
//!
//! Resolution runs in three steps, all on the consumer thread:
//!
//! 1. **Hit decision** — [`SceneTree::try_scroll`] decides for one node
//!   whether a scroll at a screen point can start here, must go to the
//!   producer thread, or should be ignored.
//!   [`SceneTree::find_scrolling_node`] applies it along scroll order.
//! 2. **Chain construction** — [`SceneTree::scroll_chain`] lists the
//!   scrollable nodes from the hit node outward, and [`ScrollChainState`]
//!   carries the remaining delta and gesture flags.
//! 3. **Distribution** — [`distribute_scroll`] walks the chain and hands
//!   each node to a [`ScrollApplier`]. Deltas are applied innermost-first;
//!   whatever is left at the end is overscroll.
//!
//! [`SceneTree::max_scroll_offset`] and [`SceneTree::scroll_by`] provide
//! the per-node extent and clamping that appliers build on.
//!
//! [`SceneTree::try_scroll`]: crate::tree::SceneTree::try_scroll
//! [`SceneTree::find_scrolling_node`]: crate::tree::SceneTree::find_scrolling_node
//! [`SceneTree::scroll_chain`]: crate::tree::SceneTree::scroll_chain
//! [`SceneTree::max_scroll_offset`]: crate::tree::SceneTree::max_scroll_offset
//! [`SceneTree::scroll_by`]: crate::tree::SceneTree::scroll_by

mod chain;
mod extent;
mod hit;

use core::ops::{BitOr, BitOrAssign};

pub use chain::{ClampingScrollApplier, ScrollApplier, ScrollChainState, distribute_scroll};
pub use hit::ScrollTarget;

/// How a scroll was initiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputType {
    /// Touch or touchpad gesture.
    Gesture,
    /// Mouse wheel tick applied directly.
    Wheel,
    /// Mouse wheel tick applied through a smooth-scroll animation.
    AnimatedWheel,
    /// Gesture that must not bubble to ancestors.
    NonBubblingGesture,
}

impl InputType {
    /// Whether wheel-event handlers can observe this input.
    #[inline]
    #[must_use]
    pub const fn is_wheel(self) -> bool {
        matches!(self, Self::Wheel | Self::AnimatedWheel)
    }
}

/// Outcome of a hit decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollStatus {
    /// The scroll must be handled by the producer thread.
    OnMainThread,
    /// The scroll can start on this node.
    Started,
    /// Nothing here can scroll.
    Ignored,
}

/// Event types for which content asked scrolling to wait on the producer.
///
/// Flags combine with `|`; the effective mask for a node is the union of its
/// own flags and every ancestor's.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScrollBlocksOn {
    /// Block on touch-start handlers.
    pub start_touch: bool,
    /// Block on wheel-event handlers.
    pub wheel_event: bool,
    /// Block on scroll-event handlers.
    pub scroll_event: bool,
}

impl ScrollBlocksOn {
    /// No blocking.
    pub const NONE: Self = Self {
        start_touch: false,
        wheel_event: false,
        scroll_event: false,
    };

    /// Blocks on every event type.
    pub const ALL: Self = Self {
        start_touch: true,
        wheel_event: true,
        scroll_event: true,
    };

    /// Whether no flag is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !(self.start_touch || self.wheel_event || self.scroll_event)
    }
}

impl BitOr for ScrollBlocksOn {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self {
            start_touch: self.start_touch || rhs.start_touch,
            wheel_event: self.wheel_event || rhs.wheel_event,
            scroll_event: self.scroll_event || rhs.scroll_event,
        }
    }
}

impl BitOrAssign for ScrollBlocksOn {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}
