// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model.
//!
//! A [`SceneTree`] is an arena of [`SceneNode`]s addressed by [`NodeId`].
//! Two trees exist per scene:
//!
//! - The **producer** tree is mutated by layout and paint. It allocates ids
//!   and tracks which nodes have properties the consumer has not seen yet.
//! - The **consumer** tree is drawn and scrolled. Its structure and
//!   properties are copied from the producer by
//!   [`synchronize_trees`](crate::sync::synchronize_trees) and
//!   [`push_properties`](crate::sync::push_properties).
//!
//! Each node has:
//!
//! - Topology: parent and ordered children, plus the owned mask and replica
//!   sub-nodes.
//! - Non-owning relations: scroll parent, clip parent, and their inverse
//!   sets.
//! - Properties: bounds, position, transform, opacity, filters, scroll
//!   configuration, and damage.
//! - A scroll offset shared between the node's producer and consumer copies
//!   (see [`scroll_offset`](crate::scroll_offset)).
//! - Optionally the scrollbar role ([`ScrollbarState`]).
//!
//! # Dirty tracking
//!
//! Every mutation that changes a value notes a change with one of two
//! scopes. A self-only change marks the node on the
//! [`PROPERTY`](crate::dirty::PROPERTY) channel; a subtree change also marks
//! every node that depends on it (children, mask, replica). Structural
//! changes mark [`TOPOLOGY`](crate::dirty::TOPOLOGY).
//! [`SceneTree::take_changes`] drains both into a [`TreeChanges`].

mod changes;
mod id;
mod node;
mod push;
mod scrollbar;
mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use changes::TreeChanges;
pub use id::NodeId;
pub use node::{
    CopyOutputRequest, DrawProperties, FilterOperation, SceneNode, ScrollbarOrientation,
    ScrollbarState,
};
pub(crate) use store::DirtyScope;
pub use store::{SceneTree, TreeRole};
