// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for tree and scroll tests.

use kurbo::Size;

use super::{NodeId, SceneTree, ScrollbarOrientation};
use crate::sync::{push_properties, synchronize_trees};
use crate::trace::Tracer;

/// A committed producer/consumer pair with one scrollable node.
pub(crate) struct ScrollFixture {
    pub(crate) producer: SceneTree,
    pub(crate) consumer: SceneTree,
    /// 100x100 viewport; not scrollable itself.
    pub(crate) root: NodeId,
    /// 100x300 content clipped by `root`; scrolls up to (0, 200).
    pub(crate) content: NodeId,
    /// Vertical scrollbar reflecting `content`.
    pub(crate) scrollbar: NodeId,
}

/// Synchronizes structure and pushes properties.
pub(crate) fn commit(producer: &mut SceneTree, consumer: &mut SceneTree) {
    synchronize_trees(producer, consumer, &mut Tracer::none());
    push_properties(producer, consumer, &mut Tracer::none());
}

pub(crate) fn scroll_fixture(overlay: bool) -> ScrollFixture {
    let mut producer = SceneTree::producer();
    let mut consumer = SceneTree::consumer();

    let root = producer.create_node();
    producer.set_bounds(root, Size::new(100.0, 100.0));
    producer.set_masks_to_bounds(root, true);
    producer.set_root(Some(root));

    let content = producer.create_node();
    producer.add_child(root, content);
    producer.set_bounds(content, Size::new(100.0, 300.0));
    producer.set_scroll_clip(content, Some(root));

    let scrollbar = producer.create_node();
    producer.add_child(root, scrollbar);
    producer.set_scrollbar_role(scrollbar, ScrollbarOrientation::Vertical, overlay);
    producer.set_scrollbar_targets(scrollbar, Some(content), Some(root));

    commit(&mut producer, &mut consumer);
    ScrollFixture {
        producer,
        consumer,
        root,
        content,
        scrollbar,
    }
}
