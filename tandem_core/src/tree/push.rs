// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node property push and copy-output handling.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::mem;

use kurbo::Rect;

use super::id::NodeId;
use super::node::CopyOutputRequest;
use super::store::{DirtyScope, SceneTree, TreeRole, union_nonempty};
use crate::client::FrameClient;

impl SceneTree {
    /// Copies the properties of `id` onto its twin in `target`.
    ///
    /// Values go through the target's own mutators, so only real changes
    /// mark the target dirty. Scroll and clip relations are re-linked by id,
    /// the scroll offset is pushed (clobbering the consumer's unreported
    /// delta if that was requested), copy requests move over, and the damage
    /// rect is unioned into the target's. Afterwards `id` no longer needs a
    /// push unless it always does.
    ///
    /// # Panics
    ///
    /// Panics if `self` is not a producer, `target` is not a consumer, `id`
    /// is missing from either tree, or a related node is missing from
    /// `target`.
    pub fn push_properties_to(&mut self, id: NodeId, target: &mut Self) {
        assert!(
            self.role == TreeRole::Producer && target.role == TreeRole::Consumer,
            "properties are pushed from a producer to a consumer"
        );
        target.validate(id);

        let src = self.node(id);
        target.set_masks_to_bounds(id, src.masks_to_bounds);
        target.set_bounds(id, src.bounds);
        target.set_position(id, src.position);
        target.set_transform(id, src.transform);
        target.set_opacity(id, src.opacity);
        target.set_contents_opaque(id, src.contents_opaque);
        target.set_draws_content(id, src.draws_content);
        target.set_double_sided(id, src.double_sided);
        target.set_hide_layer_and_subtree(id, src.hide_layer_and_subtree);
        target.set_background_color(id, src.background_color);
        target.set_filters(id, src.filters.clone());
        target.set_scroll_clip(id, src.scroll_clip);
        target.set_user_scrollable_horizontal(id, src.user_scrollable_horizontal);
        target.set_user_scrollable_vertical(id, src.user_scrollable_vertical);
        target.set_should_scroll_on_main_thread(id, src.should_scroll_on_main_thread);
        target.set_have_wheel_event_handlers(id, src.have_wheel_event_handlers);
        target.set_have_scroll_event_handlers(id, src.have_scroll_event_handlers);
        target.set_non_fast_scrollable_region(id, src.non_fast_scrollable_region.clone());
        target.set_scroll_blocks_on(id, src.scroll_blocks_on);

        target.link_relations(
            id,
            Relations {
                scroll_parent: src.scroll_parent,
                scroll_children: src.scroll_children.clone(),
                clip_parent: src.clip_parent,
                clip_children: src.clip_children.clone(),
            },
        );

        if let Some(sb) = src.scrollbar {
            target.bind_scrollbar(id, sb.orientation, sb.is_overlay, sb.scroll_node, sb.clip_node);
        }

        let main_offset = src.main_scroll_offset;
        if src.clobber_active_scroll_offset {
            target.push_scroll_offset_from_main_thread_and_clobber_active_value(id, main_offset);
        } else {
            target.push_scroll_offset_from_main_thread(id, main_offset);
        }

        let node = self.node_mut(id);
        node.clobber_active_scroll_offset = false;
        let requests = mem::take(&mut node.copy_requests);
        let damage = mem::replace(&mut node.update_rect, Rect::ZERO);
        target.pass_copy_requests(id, requests);
        if !damage.is_zero_area() {
            let twin = target.node_mut(id);
            twin.update_rect = union_nonempty(twin.update_rect, damage);
            target.note_changed(id, DirtyScope::SelfOnly);
        }

        self.clear_needs_push(id);
    }

    /// Replaces the scroll and clip relations of `id` wholesale.
    fn link_relations(&mut self, id: NodeId, relations: Relations) {
        let all = relations
            .scroll_parent
            .iter()
            .chain(&relations.scroll_children)
            .chain(relations.clip_parent.iter())
            .chain(&relations.clip_children);
        for related in all {
            assert!(
                self.contains(*related),
                "{related:?} related to {id:?} is missing from the consumer tree"
            );
        }
        let node = self.node_mut(id);
        node.scroll_parent = relations.scroll_parent;
        node.scroll_children = relations.scroll_children;
        node.clip_parent = relations.clip_parent;
        node.clip_children = relations.clip_children;
    }

    /// Appends moved copy requests to the node's own.
    pub(crate) fn pass_copy_requests(&mut self, id: NodeId, requests: Vec<CopyOutputRequest>) {
        if requests.is_empty() {
            return;
        }
        self.node_mut(id).copy_requests.extend(requests);
        self.note_changed(id, DirtyScope::Subtree);
    }

    /// Takes the node's pending copy requests, mapping each area from node
    /// space into render-target space with the node's draw transform.
    ///
    /// Requests draw properties to be recomputed, since the render target
    /// must now exist.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown or has no pending copy requests.
    pub fn take_copy_requests_and_transform_to_target(
        &mut self,
        id: NodeId,
        client: &mut dyn FrameClient,
    ) -> Vec<CopyOutputRequest> {
        let node = self.node_mut(id);
        assert!(
            !node.copy_requests.is_empty(),
            "no copy requests pending on {id:?}"
        );
        let draw_transform = node.draw_properties.draw_transform;
        let mut requests = mem::take(&mut node.copy_requests);
        for request in &mut requests {
            if let Some(area) = request.area {
                request.area = Some(draw_transform.map_rect_bounds(area).expand());
            }
        }
        client.set_needs_update_draw_properties();
        requests
    }
}

/// Scroll and clip relations of one node, by id.
struct Relations {
    scroll_parent: Option<NodeId>,
    scroll_children: BTreeSet<NodeId>,
    clip_parent: Option<NodeId>,
    clip_children: BTreeSet<NodeId>,
}

#[cfg(test)]
mod tests {
    use kurbo::{Size, Vec2};

    use super::*;
    use crate::client::testing::RecordingClient;
    use crate::sync::synchronize_trees;
    use crate::trace::Tracer;
    use crate::transform::Transform3d;
    use crate::tree::DrawProperties;

    fn synced_pair() -> (SceneTree, SceneTree, NodeId, NodeId) {
        let mut producer = SceneTree::producer();
        let root = producer.create_node();
        let child = producer.create_node();
        producer.set_root(Some(root));
        producer.add_child(root, child);
        let mut consumer = SceneTree::consumer();
        let _ = synchronize_trees(&mut producer, &mut consumer, &mut Tracer::none());
        (producer, consumer, root, child)
    }

    #[test]
    fn push_copies_properties_and_clears_flag() {
        let (mut producer, mut consumer, _root, child) = synced_pair();
        producer.set_bounds(child, Size::new(40.0, 30.0));
        producer.set_opacity(child, 0.5);
        producer.push_properties_to(child, &mut consumer);

        assert_eq!(consumer.node(child).bounds(), Size::new(40.0, 30.0));
        assert_eq!(consumer.node(child).opacity(), 0.5);
        assert!(!producer.node(child).needs_push());
    }

    #[test]
    fn push_of_unchanged_values_does_not_mark_target() {
        let (mut producer, mut consumer, _root, child) = synced_pair();
        producer.push_properties_to(child, &mut consumer);
        let _ = consumer.take_changes();

        producer.note_property_changed(child);
        producer.push_properties_to(child, &mut consumer);
        assert!(consumer.take_changes().property_changed.is_empty());
    }

    #[test]
    fn push_unions_damage_and_clears_source() {
        let (mut producer, mut consumer, _root, child) = synced_pair();
        producer.set_needs_display_rect(child, Rect::new(0.0, 0.0, 5.0, 5.0));
        producer.push_properties_to(child, &mut consumer);
        producer.set_needs_display_rect(child, Rect::new(10.0, 10.0, 20.0, 20.0));
        producer.push_properties_to(child, &mut consumer);

        assert_eq!(producer.node(child).update_rect(), Rect::ZERO);
        assert_eq!(
            consumer.node(child).update_rect(),
            Rect::new(0.0, 0.0, 20.0, 20.0)
        );
    }

    #[test]
    fn push_relinks_scroll_parent() {
        let (mut producer, mut consumer, root, child) = synced_pair();
        producer.set_scroll_parent(child, Some(root));
        producer.push_properties_to(child, &mut consumer);
        producer.push_properties_to(root, &mut consumer);

        assert_eq!(consumer.node(child).scroll_parent(), Some(root));
        assert!(consumer.node(root).scroll_children().contains(&child));
    }

    #[test]
    fn push_moves_copy_requests() {
        let (mut producer, mut consumer, _root, child) = synced_pair();
        let request = CopyOutputRequest {
            id: 9,
            area: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
        };
        producer.request_copy_of_output(child, request);
        producer.push_properties_to(child, &mut consumer);

        assert!(producer.node(child).copy_requests().is_empty());
        assert_eq!(consumer.node(child).copy_requests(), &[request]);
    }

    #[test]
    fn taken_copy_requests_map_to_target_space() {
        let (mut producer, mut consumer, _root, child) = synced_pair();
        producer.request_copy_of_output(
            child,
            CopyOutputRequest {
                id: 1,
                area: Some(Rect::new(0.5, 0.0, 10.0, 10.0)),
            },
        );
        producer.push_properties_to(child, &mut consumer);
        consumer.set_draw_properties(
            child,
            DrawProperties {
                draw_transform: Transform3d::from_translation(100.0, 50.0, 0.0),
                ..DrawProperties::default()
            },
        );

        let mut client = RecordingClient::default();
        let taken = consumer.take_copy_requests_and_transform_to_target(child, &mut client);
        assert_eq!(taken[0].area, Some(Rect::new(100.0, 50.0, 110.0, 60.0)));
        assert_eq!(client.draw_property_updates, 1);
        assert!(consumer.node(child).copy_requests().is_empty());
    }

    #[test]
    #[should_panic(expected = "no copy requests pending")]
    fn taking_absent_copy_requests_panics() {
        let (_producer, mut consumer, _root, child) = synced_pair();
        let mut client = RecordingClient::default();
        let _ = consumer.take_copy_requests_and_transform_to_target(child, &mut client);
    }

    #[test]
    fn push_reaches_consumer_offset() {
        let (mut producer, mut consumer, _root, child) = synced_pair();
        producer.set_scroll_offset(child, Vec2::new(0.0, 30.0));
        producer.push_properties_to(child, &mut consumer);
        assert_eq!(consumer.current_scroll_offset(child), Vec2::new(0.0, 30.0));
    }

    #[test]
    fn clobbering_push_discards_consumer_delta() {
        let (mut producer, mut consumer, _root, child) = synced_pair();
        consumer.set_current_scroll_offset(child, Vec2::new(0.0, 12.0));
        producer.set_scroll_offset_and_clobber_active_value(child, Vec2::new(0.0, 40.0));
        producer.push_properties_to(child, &mut consumer);

        assert_eq!(consumer.current_scroll_offset(child), Vec2::new(0.0, 40.0));
        assert!(!producer.node(child).clobber_active_scroll_offset);
    }

    #[test]
    #[should_panic(expected = "properties are pushed from a producer to a consumer")]
    fn push_between_producers_panics() {
        let mut a = SceneTree::producer();
        let mut b = SceneTree::producer();
        let id = a.create_node();
        a.push_properties_to(id, &mut b);
    }
}
