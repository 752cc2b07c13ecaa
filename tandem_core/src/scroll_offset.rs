// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Double-buffered scroll offset shared between a node and its twin.
//!
//! A producer node and its consumer twin hold the same
//! [`ScrollOffsetHandle`]. The producer pushes a new *pending base* during a
//! synchronization pass; the consumer scrolls by adjusting the *active delta*
//! between passes. Deltas the consumer has produced are *reflected* back to
//! the producer through [`pull_delta_for_main_thread`], and remain counted in
//! the pending view until the producer echoes them back with its next push.
//!
//! ```text
//!   consumer scrolls          producer pulls          producer pushes
//!   active_delta += d  ──►  reflected_main = d  ──►  reflected_pending = d
//!                                                    pending_base = v + d
//!                                   activation: active_base = pending_base,
//!                                               active_delta -= reflected_pending
//! ```
//!
//! Every field is stored in its own atomic so either thread can read its half
//! without locking. Transitions that touch more than one field
//! ([`push_from_main_thread`], [`push_pending_to_active`], [`abort_commit`])
//! run only at the synchronization handoff, which the embedder serializes.
//!
//! [`pull_delta_for_main_thread`]: SyncedScrollOffset::pull_delta_for_main_thread
//! [`push_from_main_thread`]: SyncedScrollOffset::push_from_main_thread
//! [`push_pending_to_active`]: SyncedScrollOffset::push_pending_to_active
//! [`abort_commit`]: SyncedScrollOffset::abort_commit

use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use kurbo::Vec2;

/// Shared handle to a [`SyncedScrollOffset`].
pub type ScrollOffsetHandle = Arc<SyncedScrollOffset>;

/// A `Vec2` stored as two atomically updated `f64` bit patterns.
struct AtomicVec2 {
    x: AtomicU64,
    y: AtomicU64,
}

impl AtomicVec2 {
    fn new(v: Vec2) -> Self {
        Self {
            x: AtomicU64::new(v.x.to_bits()),
            y: AtomicU64::new(v.y.to_bits()),
        }
    }

    fn load(&self) -> Vec2 {
        Vec2::new(
            f64::from_bits(self.x.load(Ordering::Acquire)),
            f64::from_bits(self.y.load(Ordering::Acquire)),
        )
    }

    fn store(&self, v: Vec2) {
        self.x.store(v.x.to_bits(), Ordering::Release);
        self.y.store(v.y.to_bits(), Ordering::Release);
    }
}

/// Scroll offset with independent pending and active views.
///
/// From the consumer side, `current(true) == active_base + active_delta`
/// always holds.
pub struct SyncedScrollOffset {
    pending_base: AtomicVec2,
    active_base: AtomicVec2,
    active_delta: AtomicVec2,
    reflected_delta_in_main_tree: AtomicVec2,
    reflected_delta_in_pending_tree: AtomicVec2,
    clobber_active_value: AtomicBool,
}

impl fmt::Debug for SyncedScrollOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncedScrollOffset")
            .field("pending_base", &self.pending_base())
            .field("active_base", &self.active_base())
            .field("active_delta", &self.active_delta())
            .field("reflected_main", &self.reflected_delta_in_main_tree())
            .field("reflected_pending", &self.reflected_delta_in_pending_tree())
            .field("clobber", &self.clobber_active_value())
            .finish()
    }
}

impl Default for SyncedScrollOffset {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl SyncedScrollOffset {
    /// Creates an offset whose pending and active bases both equal `initial`.
    #[must_use]
    pub fn new(initial: Vec2) -> Self {
        Self {
            pending_base: AtomicVec2::new(initial),
            active_base: AtomicVec2::new(initial),
            active_delta: AtomicVec2::new(Vec2::ZERO),
            reflected_delta_in_main_tree: AtomicVec2::new(Vec2::ZERO),
            reflected_delta_in_pending_tree: AtomicVec2::new(Vec2::ZERO),
            clobber_active_value: AtomicBool::new(false),
        }
    }

    /// Creates a new shared handle.
    #[must_use]
    pub fn shared(initial: Vec2) -> ScrollOffsetHandle {
        Arc::new(Self::new(initial))
    }

    /// The last value pushed by the producer.
    #[must_use]
    pub fn pending_base(&self) -> Vec2 {
        self.pending_base.load()
    }

    /// The base of the value visible to drawing.
    #[must_use]
    pub fn active_base(&self) -> Vec2 {
        self.active_base.load()
    }

    /// Consumer-side adjustment on top of [`active_base`](Self::active_base).
    #[must_use]
    pub fn active_delta(&self) -> Vec2 {
        self.active_delta.load()
    }

    /// Delta handed to the producer and not yet pushed back.
    #[must_use]
    pub fn reflected_delta_in_main_tree(&self) -> Vec2 {
        self.reflected_delta_in_main_tree.load()
    }

    /// Delta pushed back by the producer and not yet activated.
    #[must_use]
    pub fn reflected_delta_in_pending_tree(&self) -> Vec2 {
        self.reflected_delta_in_pending_tree.load()
    }

    /// Whether the next activation discards unreported consumer delta.
    #[must_use]
    pub fn clobber_active_value(&self) -> bool {
        self.clobber_active_value.load(Ordering::Acquire)
    }

    /// The delta the next activation will carry over.
    #[must_use]
    pub fn pending_delta(&self) -> Vec2 {
        if self.clobber_active_value() {
            return Vec2::ZERO;
        }
        self.active_delta() - self.reflected_delta_in_pending_tree()
    }

    /// Returns the active view (`active_base + active_delta`) or the pending
    /// view (`pending_base + pending_delta`).
    #[must_use]
    pub fn current(&self, active: bool) -> Vec2 {
        if active {
            self.active_base() + self.active_delta()
        } else {
            self.pending_base() + self.pending_delta()
        }
    }

    /// Sets the active value by adjusting the active delta.
    ///
    /// Returns `true` if the active value changed.
    pub fn set_current(&self, value: Vec2) -> bool {
        let delta = value - self.active_base();
        if delta == self.active_delta() {
            return false;
        }
        self.active_delta.store(delta);
        true
    }

    /// Returns the consumer delta the producer has not seen yet and records it
    /// as reflected to the producer.
    ///
    /// Pulling twice without an intervening push returns the same delta.
    pub fn pull_delta_for_main_thread(&self) -> Vec2 {
        let delta = self.pending_delta();
        self.reflected_delta_in_main_tree.store(delta);
        delta
    }

    /// Sets the pending base to the producer's value.
    ///
    /// The delta reflected to the producer is assumed to be included in
    /// `value`; it moves to the pending reflection slot so activation does not
    /// apply it twice.
    pub fn push_from_main_thread(&self, value: Vec2) {
        self.reflected_delta_in_pending_tree
            .store(self.reflected_delta_in_main_tree());
        self.reflected_delta_in_main_tree.store(Vec2::ZERO);
        self.pending_base.store(value);
    }

    /// Makes the pending view active.
    ///
    /// Returns `true` if the active value changed.
    pub fn push_pending_to_active(&self) -> bool {
        let before = self.current(true);
        let pending_base = self.pending_base();
        let pending_delta = self.pending_delta();
        self.active_base.store(pending_base);
        self.active_delta.store(pending_delta);
        self.reflected_delta_in_pending_tree.store(Vec2::ZERO);
        self.clobber_active_value.store(false, Ordering::Release);
        self.current(true) != before
    }

    /// Folds the delta already applied by the producer into the active base.
    ///
    /// Used when a synchronization pass was aborted after the producer
    /// consumed the pulled delta; the active value is unchanged.
    pub fn abort_commit(&self) {
        let reflected = self.reflected_delta_in_main_tree();
        self.active_base.store(self.active_base() + reflected);
        self.active_delta.store(self.active_delta() - reflected);
        self.reflected_delta_in_main_tree.store(Vec2::ZERO);
    }

    /// Requests that the next activation discard unreported consumer delta.
    pub fn set_clobber_active_value(&self) {
        self.clobber_active_value.store(true, Ordering::Release);
    }
}
