// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Each [`SceneTree`](crate::tree::SceneTree) owns an
//! [`understory_dirty`] tracker keyed by raw node id. Two channels are used:
//!
//! - **Property** — [`PROPERTY`] records "content changed" for a node. Every
//!   child, mask, and replica has a dependency edge on its owner, so a
//!   subtree-scoped mutator marks with
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and the whole subtree
//!   becomes dirty at once. Self-scoped mutators use the default policy and
//!   only the node itself is marked.
//!
//! - **Structural** — [`TOPOLOGY`] is marked on the owner whenever a child,
//!   mask, or replica is attached or detached. It does not propagate.
//!
//! Push bookkeeping (`needs_push` and the per-node dependent counters) is kept
//! separately on the nodes themselves; the tracker only answers "which nodes
//! need their cached rendering judgments redone".
//!
//! # Consumption
//!
//! [`SceneTree::take_changes`](crate::tree::SceneTree::take_changes) drains
//! both channels and surfaces the result as
//! [`TreeChanges`](crate::tree::TreeChanges).

use understory_dirty::Channel;

/// Node content changed; propagates to descendants for subtree-scoped changes.
pub const PROPERTY: Channel = Channel::new(0);

/// Children, mask, or replica of a node changed.
pub const TOPOLOGY: Channel = Channel::new(1);
