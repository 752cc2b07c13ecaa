// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for synchronization and scrolling.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! synchronizer, the scroll resolver, and the scrollbar animation driver call
//! at each step. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use kurbo::Vec2;

use crate::scroll::{InputType, ScrollStatus};
use crate::tree::NodeId;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a structural synchronization pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncEvent {
    /// Monotonic pass counter of the consumer tree.
    pub pass: u64,
    /// Consumer nodes kept from the previous pass.
    pub reused: u32,
    /// Consumer nodes created for new producer ids.
    pub created: u32,
    /// Consumer nodes whose id the producer no longer references.
    pub dropped: u32,
    /// Scrollbar nodes rebound after assembly.
    pub scrollbars_bound: u32,
}

/// Emitted after a push-properties pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PushEvent {
    /// Monotonic pass counter of the consumer tree.
    pub pass: u64,
    /// Node pairs the walk visited.
    pub visited: u32,
    /// Node pairs whose properties were copied.
    pub pushed: u32,
}

/// Emitted for every hit decision made while searching for a scrolling node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollDecisionEvent {
    /// Node the decision was made for.
    pub node: NodeId,
    /// How the scroll was initiated.
    pub input_type: InputType,
    /// The decision.
    pub status: ScrollStatus,
}

/// Emitted when distribution reaches a node of the scroll chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollAppliedEvent {
    /// Node the delta was offered to.
    pub node: NodeId,
    /// Remaining delta before the node was offered it.
    pub offered: Vec2,
    /// Portion of `offered` the node consumed.
    pub consumed: Vec2,
    /// Whether the node was skipped because the gesture does not bubble.
    pub skipped: bool,
}

/// Emitted for every scrollbar animation frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollbarFrameEvent {
    /// Scroll node whose scrollbars were animated.
    pub scroll_node: NodeId,
    /// Animation progress in `[0, 1]`.
    pub progress: f32,
    /// Whether the animation is still running after this frame.
    pub still_animating: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events.
///
/// All methods have default no-op implementations. Implement only the
/// events you need.
pub trait TraceSink {
    /// Called after each synchronization pass.
    fn on_sync(&mut self, e: &SyncEvent) {
        _ = e;
    }

    /// Called after each push-properties pass.
    fn on_push_properties(&mut self, e: &PushEvent) {
        _ = e;
    }

    /// Called for each hit decision.
    fn on_scroll_decision(&mut self, e: &ScrollDecisionEvent) {
        _ = e;
    }

    /// Called for each node reached by scroll distribution.
    fn on_scroll_applied(&mut self, e: &ScrollAppliedEvent) {
        _ = e;
    }

    /// Called for each scrollbar animation frame.
    fn on_scrollbar_frame(&mut self, e: &ScrollbarFrameEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`SyncEvent`].
    #[inline]
    pub fn sync(&mut self, e: &SyncEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_sync(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PushEvent`].
    #[inline]
    pub fn push_properties(&mut self, e: &PushEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_push_properties(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ScrollDecisionEvent`].
    #[inline]
    pub fn scroll_decision(&mut self, e: &ScrollDecisionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_scroll_decision(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ScrollAppliedEvent`].
    #[inline]
    pub fn scroll_applied(&mut self, e: &ScrollAppliedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_scroll_applied(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ScrollbarFrameEvent`].
    #[inline]
    pub fn scrollbar_frame(&mut self, e: &ScrollbarFrameEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_scrollbar_frame(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn node(raw: u32) -> NodeId {
        NodeId::new(raw).unwrap()
    }

    fn sample_sync() -> SyncEvent {
        SyncEvent {
            pass: 3,
            reused: 10,
            created: 2,
            dropped: 1,
            scrollbars_bound: 0,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_sync(&sample_sync());
        sink.on_scroll_decision(&ScrollDecisionEvent {
            node: node(1),
            input_type: InputType::Wheel,
            status: ScrollStatus::Ignored,
        });
        sink.on_scrollbar_frame(&ScrollbarFrameEvent {
            scroll_node: node(1),
            progress: 0.5,
            still_animating: true,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.sync(&sample_sync());
        tracer.push_properties(&PushEvent {
            pass: 1,
            visited: 0,
            pushed: 0,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            passes: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_sync(&mut self, e: &SyncEvent) {
                self.passes.push(e.pass);
            }
        }

        let mut sink = RecordingSink { passes: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.sync(&sample_sync());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.passes, &[3]);
    }
}
