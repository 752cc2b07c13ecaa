// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit decisions: may a scroll start on a node, and which node.

use alloc::vec::Vec;

use kurbo::Point;

use super::{InputType, ScrollBlocksOn, ScrollStatus};
use crate::trace::{ScrollDecisionEvent, Tracer};
use crate::tree::{NodeId, SceneTree};

/// Result of searching for the node a scroll should start on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollTarget {
    /// Overall decision.
    pub status: ScrollStatus,
    /// Node that starts the scroll when `status` is
    /// [`Started`](ScrollStatus::Started).
    pub node: Option<NodeId>,
    /// Whether any node visited before the decision listens for scroll
    /// events.
    pub has_ancestor_scroll_handler: bool,
}

impl ScrollTarget {
    const IGNORED: Self = Self {
        status: ScrollStatus::Ignored,
        node: None,
        has_ancestor_scroll_handler: false,
    };
}

impl SceneTree {
    /// Decides whether a scroll at `screen_point` may start on `id`.
    ///
    /// Rules are applied in order, first match wins:
    ///
    /// 1. the node forces scrolling on the producer thread: `OnMainThread`;
    /// 2. its screen-space transform is not invertible: `Ignored`;
    /// 3. the point, projected into node space and rounded, hits the
    ///    non-fast-scrollable region: `OnMainThread`;
    /// 4. scroll-event handlers with `blocks_on.scroll_event`, or wheel input
    ///    with wheel-event handlers and `blocks_on.wheel_event`:
    ///    `OnMainThread`;
    /// 5. the node is not scrollable: `Ignored`;
    /// 6. the maximum offset is not positive on either axis: `Ignored`;
    /// 7. otherwise `Started`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    #[must_use]
    pub fn try_scroll(
        &self,
        id: NodeId,
        screen_point: Point,
        input_type: InputType,
        blocks_on: ScrollBlocksOn,
    ) -> ScrollStatus {
        let node = self.node(id);
        if node.should_scroll_on_main_thread {
            return ScrollStatus::OnMainThread;
        }

        let Some(inverse) = node.draw_properties.screen_space_transform.inverse() else {
            return ScrollStatus::Ignored;
        };

        if !node.non_fast_scrollable_region.is_empty() {
            if let Some(local) = inverse.project_point(screen_point) {
                let local = local.round();
                if node
                    .non_fast_scrollable_region
                    .iter()
                    .any(|r| r.contains(local))
                {
                    return ScrollStatus::OnMainThread;
                }
            }
        }

        if node.have_scroll_event_handlers && blocks_on.scroll_event {
            return ScrollStatus::OnMainThread;
        }
        if input_type.is_wheel() && node.have_wheel_event_handlers && blocks_on.wheel_event {
            return ScrollStatus::OnMainThread;
        }

        if !node.scrollable() {
            return ScrollStatus::Ignored;
        }

        let max = self.max_scroll_offset(id);
        if max.x <= 0.0 && max.y <= 0.0 {
            return ScrollStatus::Ignored;
        }

        ScrollStatus::Started
    }

    /// Union of the blocking flags of `id` and all of its ancestors.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    #[must_use]
    pub fn effective_scroll_blocks_on(&self, id: NodeId) -> ScrollBlocksOn {
        let mut blocks = ScrollBlocksOn::NONE;
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = self.node(n);
            blocks |= node.scroll_blocks_on;
            cur = node.parent;
        }
        blocks
    }

    /// The node a scroll bubbles to from `id`: its scroll parent if set,
    /// otherwise its owner.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    #[must_use]
    pub fn next_node_in_scroll_order(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        node.scroll_parent.or(node.parent)
    }

    /// Scrollable nodes from `id` outward along scroll order, innermost
    /// first.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    #[must_use]
    pub fn scroll_chain(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            if self.node(n).scrollable() {
                chain.push(n);
            }
            cur = self.next_node_in_scroll_order(n);
        }
        chain
    }

    /// Walks scroll order from `start` and picks the node the scroll starts
    /// on.
    ///
    /// Any node demanding the producer thread ends the search with
    /// [`OnMainThread`](ScrollStatus::OnMainThread). Otherwise the first node
    /// that reports [`Started`](ScrollStatus::Started) wins, but the walk
    /// continues so that an outer node can still divert the scroll.
    ///
    /// # Panics
    ///
    /// Panics if `start` is unknown.
    pub fn find_scrolling_node(
        &self,
        start: NodeId,
        screen_point: Point,
        input_type: InputType,
        tracer: &mut Tracer<'_>,
    ) -> ScrollTarget {
        let mut target = ScrollTarget::IGNORED;
        let mut cur = Some(start);
        while let Some(n) = cur {
            let blocks_on = self.effective_scroll_blocks_on(n);
            let status = self.try_scroll(n, screen_point, input_type, blocks_on);
            tracer.scroll_decision(&ScrollDecisionEvent {
                node: n,
                input_type,
                status,
            });
            match status {
                ScrollStatus::OnMainThread => {
                    return ScrollTarget {
                        status,
                        node: None,
                        has_ancestor_scroll_handler: target.has_ancestor_scroll_handler,
                    };
                }
                ScrollStatus::Started if target.node.is_none() => {
                    target.status = status;
                    target.node = Some(n);
                }
                _ => {}
            }
            if self.node(n).scrollable() && self.node(n).have_scroll_event_handlers {
                target.has_ancestor_scroll_handler = true;
            }
            cur = self.next_node_in_scroll_order(n);
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Rect, Size};

    use super::*;
    use crate::transform::Transform3d;
    use crate::tree::DrawProperties;
    use crate::tree::testing::{ScrollFixture, commit, scroll_fixture};

    const HERE: Point = Point::new(10.0, 10.0);

    fn status(f: &ScrollFixture, input: InputType) -> ScrollStatus {
        let blocks = f.consumer.effective_scroll_blocks_on(f.content);
        f.consumer.try_scroll(f.content, HERE, input, blocks)
    }

    #[test]
    fn scrollable_node_starts() {
        let f = scroll_fixture(true);
        assert_eq!(status(&f, InputType::Gesture), ScrollStatus::Started);
    }

    #[test]
    fn main_thread_flag_wins() {
        let mut f = scroll_fixture(true);
        f.producer.set_should_scroll_on_main_thread(f.content, true);
        commit(&mut f.producer, &mut f.consumer);
        assert_eq!(status(&f, InputType::Gesture), ScrollStatus::OnMainThread);
    }

    #[test]
    fn singular_screen_transform_is_ignored() {
        let mut f = scroll_fixture(true);
        f.consumer.set_draw_properties(
            f.content,
            DrawProperties {
                screen_space_transform: Transform3d::from_scale(0.0, 1.0, 1.0),
                ..DrawProperties::default()
            },
        );
        assert_eq!(status(&f, InputType::Gesture), ScrollStatus::Ignored);
    }

    #[test]
    fn non_fast_region_uses_node_space() {
        let mut f = scroll_fixture(true);
        f.producer
            .set_non_fast_scrollable_region(f.content, vec![Rect::new(0.0, 0.0, 20.0, 20.0)]);
        commit(&mut f.producer, &mut f.consumer);
        assert_eq!(status(&f, InputType::Gesture), ScrollStatus::OnMainThread);

        // Translated away, the same screen point misses the region.
        f.consumer.set_draw_properties(
            f.content,
            DrawProperties {
                screen_space_transform: Transform3d::from_translation(50.0, 50.0, 0.0),
                ..DrawProperties::default()
            },
        );
        assert_eq!(status(&f, InputType::Gesture), ScrollStatus::Started);
    }

    #[test]
    fn wheel_handlers_block_only_wheel_input() {
        let mut f = scroll_fixture(true);
        f.producer.set_have_wheel_event_handlers(f.content, true);
        f.producer.set_scroll_blocks_on(
            f.root,
            ScrollBlocksOn {
                wheel_event: true,
                ..ScrollBlocksOn::NONE
            },
        );
        commit(&mut f.producer, &mut f.consumer);
        assert_eq!(status(&f, InputType::Wheel), ScrollStatus::OnMainThread);
        assert_eq!(status(&f, InputType::AnimatedWheel), ScrollStatus::OnMainThread);
        assert_eq!(status(&f, InputType::Gesture), ScrollStatus::Started);
    }

    #[test]
    fn scroll_handlers_block_when_requested() {
        let mut f = scroll_fixture(true);
        f.producer.set_have_scroll_event_handlers(f.content, true);
        commit(&mut f.producer, &mut f.consumer);
        assert_eq!(status(&f, InputType::Gesture), ScrollStatus::Started);

        commit(&mut f.producer, &mut f.consumer);
        assert_eq!(status(&f, InputType::Gesture), ScrollStatus::OnMainThread);
    }

    #[test]
    fn unscrollable_node_is_ignored() {
        let f = scroll_fixture(true);
        let blocks = f.consumer.effective_scroll_blocks_on(f.root);
        let s = f.consumer.try_scroll(f.root, HERE, InputType::Gesture, blocks);
        assert_eq!(s, ScrollStatus::Ignored);
    }

    const ALL_INPUTS: [InputType; 4] = [
        InputType::Gesture,
        InputType::Wheel,
        InputType::AnimatedWheel,
        InputType::NonBubblingGesture,
    ];

    #[test]
    fn zero_extent_is_ignored() {
        let mut f = scroll_fixture(true);
        f.producer.set_bounds(f.content, Size::new(100.0, 100.0));
        commit(&mut f.producer, &mut f.consumer);
        for input in ALL_INPUTS {
            for mask in [ScrollBlocksOn::NONE, ScrollBlocksOn::ALL] {
                assert_eq!(
                    f.consumer.try_scroll(f.content, HERE, input, mask),
                    ScrollStatus::Ignored,
                    "{input:?} with {mask:?}"
                );
            }
        }

        // Blocking handlers are decided before extent.
        f.producer.set_have_wheel_event_handlers(f.content, true);
        f.producer.set_have_scroll_event_handlers(f.content, true);
        commit(&mut f.producer, &mut f.consumer);
        for input in ALL_INPUTS {
            assert_eq!(
                f.consumer
                    .try_scroll(f.content, HERE, input, ScrollBlocksOn::ALL),
                ScrollStatus::OnMainThread,
                "{input:?}"
            );
            assert_eq!(
                f.consumer
                    .try_scroll(f.content, HERE, input, ScrollBlocksOn::NONE),
                ScrollStatus::Ignored,
                "{input:?}"
            );
        }
    }

    #[test]
    fn chain_lists_scrollables_innermost_first() {
        let mut f = scroll_fixture(true);
        let inner = f.producer.create_node();
        f.producer.add_child(f.content, inner);
        f.producer.set_bounds(inner, Size::new(100.0, 500.0));
        f.producer.set_scroll_clip(inner, Some(f.content));
        commit(&mut f.producer, &mut f.consumer);
        assert_eq!(f.consumer.scroll_chain(inner), vec![inner, f.content]);
    }

    #[test]
    fn chain_follows_scroll_parent() {
        let mut f = scroll_fixture(true);
        let other = f.producer.create_node();
        f.producer.add_child(f.root, other);
        f.producer.set_scroll_parent(other, Some(f.content));
        commit(&mut f.producer, &mut f.consumer);
        assert_eq!(f.consumer.next_node_in_scroll_order(other), Some(f.content));
        assert_eq!(f.consumer.scroll_chain(other), vec![f.content]);
    }

    #[test]
    fn search_returns_first_started_node() {
        let mut f = scroll_fixture(true);
        let leaf = f.producer.create_node();
        f.producer.add_child(f.content, leaf);
        commit(&mut f.producer, &mut f.consumer);
        let target =
            f.consumer
                .find_scrolling_node(leaf, HERE, InputType::Gesture, &mut Tracer::none());
        assert_eq!(target.status, ScrollStatus::Started);
        assert_eq!(target.node, Some(f.content));
    }

    #[test]
    fn search_aborts_on_outer_main_thread_demand() {
        let mut f = scroll_fixture(true);
        f.producer.set_should_scroll_on_main_thread(f.root, true);
        commit(&mut f.producer, &mut f.consumer);
        let target = f.consumer.find_scrolling_node(
            f.content,
            HERE,
            InputType::Gesture,
            &mut Tracer::none(),
        );
        assert_eq!(target.status, ScrollStatus::OnMainThread);
        assert_eq!(target.node, None);
    }

    #[test]
    fn search_without_scrollables_is_ignored() {
        let f = scroll_fixture(true);
        let target =
            f.consumer
                .find_scrolling_node(f.root, HERE, InputType::Wheel, &mut Tracer::none());
        assert_eq!(target, ScrollTarget::IGNORED);
    }
}
