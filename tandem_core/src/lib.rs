// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dual-tree scene graph synchronization and scroll input core.
//!
//! `tandem_core` keeps two copies of a compositing scene graph consistent:
//! a *producer* tree mutated by layout and paint, and a *consumer* tree that
//! is drawn and scrolled on another thread. It resolves scroll input against
//! the consumer tree and animates overlay scrollbars in response. It is
//! `no_std` compatible (with `alloc`) and never reads a clock or blocks.
//!
//! # Architecture
//!
//! ```text
//!   producer SceneTree (layout / paint)
//!       │
//!       ▼
//!   synchronize_trees() ──► push_properties()
//!                                │
//!                 ┌──────────────┘
//!                 ▼
//!   consumer SceneTree ◄── find_scrolling_node() / distribute_scroll()
//!       │                                │
//!       │            shared scroll offset│
//!       ▼                                ▼
//!   update_scrollbar_positions() ──► ScrollbarAnimator ──► FrameClient
//!       │
//!       ▼
//!   pull_scroll_deltas() ──► producer
//! ```
//!
//! **[`tree`]**: Arena of scene nodes keyed by [`NodeId`](tree::NodeId),
//! with change-scoped mutators, needs-push bookkeeping, per-node property
//! push, and scrollbar bindings.
//!
//! **[`scroll_offset`]**: The offset shared by a node's producer and consumer
//! copies, split into pending and active halves so each side writes its own.
//!
//! **[`sync`]**: Structural synchronization with node reuse by id, the
//! lockstep push pass, and the scroll-delta round trip.
//!
//! **[`scroll`]**: Hit decisions, scroll chains, delta distribution, and
//! clamped scrolling.
//!
//! **[`animation`]**: Fade and thinning scrollbar animators sharing one
//! start/stop driver.
//!
//! **[`dirty`]**: Channels of the `understory_dirty` tracker each tree owns.
//!
//! **[`client`]**: [`FrameClient`](client::FrameClient), the narrow
//! interface to the embedder's frame scheduler.
//!
//! **[`transform`]**: 4×4 transform used for hit testing and copy-output
//! targeting.
//!
//! **[`time`]**: Durations for animation delays.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod client;
pub mod dirty;
pub mod scroll;
pub mod scroll_offset;
pub mod sync;
pub mod time;
pub mod trace;
pub mod transform;
pub mod tree;
