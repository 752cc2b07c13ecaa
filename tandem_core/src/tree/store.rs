// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node arena with allocation, topology, property mutation, and push
//! bookkeeping.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::num::NonZeroU32;

use kurbo::{Point, Rect, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::NodeId;
use super::node::{CopyOutputRequest, DrawProperties, FilterOperation, SceneNode};
use crate::animation::ScrollbarAnimator;
use crate::dirty;
use crate::scroll::ScrollBlocksOn;
use crate::transform::Transform3d;

/// Which side of the handoff a tree lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeRole {
    /// Mutated by upstream layout and paint; allocates node ids and pushes.
    Producer,
    /// Drawn and scrolled; receives structure and properties from the
    /// producer.
    Consumer,
}

/// How far a property change invalidates cached rendering judgments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DirtyScope {
    /// Only the node itself.
    SelfOnly,
    /// The node and every descendant.
    Subtree,
}

/// Which owned slot of a node a sub-node occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OwnedSlot {
    Mask,
    Replica,
}

/// One of the two scene trees.
///
/// Nodes are addressed by [`NodeId`] and read through [`node`](Self::node).
/// All mutation goes through methods on the tree so that every change
/// performs exactly one dirty-scope update and, on the producer, keeps the
/// needs-push counters consistent:
///
/// - a node's `needs_push` flag is set when one of its properties changes;
/// - a node's `num_dependents_need_push` counts direct dependents (children,
///   mask, replica) that need a push or have dependents that do.
///
/// Both are maintained by a single pair of routines
/// ([`set_needs_push`](Self::set_needs_push) and its internal inverse), and
/// recomputed wholesale by
/// [`push_properties`](crate::sync::push_properties).
#[derive(Debug)]
pub struct SceneTree {
    pub(crate) role: TreeRole,
    pub(crate) nodes: BTreeMap<NodeId, SceneNode>,
    pub(crate) root: Option<NodeId>,
    next_id: NonZeroU32,

    // -- Tree-level properties --
    pub(crate) page_scale_node: Option<NodeId>,
    pub(crate) page_scale_factor: f64,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) needs_full_tree_sync: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<NodeId>,
    pub(crate) pending_removed: Vec<NodeId>,
    pub(crate) pass: u64,

    // -- Consumer-side scrollbar animators, keyed by scroll node --
    pub(crate) animators: BTreeMap<NodeId, Box<dyn ScrollbarAnimator>>,
}

impl SceneTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new(role: TreeRole) -> Self {
        Self {
            role,
            nodes: BTreeMap::new(),
            root: None,
            next_id: NonZeroU32::MIN,
            page_scale_node: None,
            page_scale_factor: 1.0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            needs_full_tree_sync: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            pass: 0,
            animators: BTreeMap::new(),
        }
    }

    /// Creates an empty producer tree.
    #[must_use]
    pub fn producer() -> Self {
        Self::new(TreeRole::Producer)
    }

    /// Creates an empty consumer tree.
    #[must_use]
    pub fn consumer() -> Self {
        Self::new(TreeRole::Consumer)
    }

    /// Which side of the handoff this tree lives on.
    #[must_use]
    pub fn role(&self) -> TreeRole {
        self.role
    }

    /// Number of synchronization passes this tree has taken part in.
    #[must_use]
    pub fn pass(&self) -> u64 {
        self.pass
    }

    // -- Allocation API --

    /// Creates a detached node and returns its id.
    ///
    /// The node starts with default properties, no owner, and a fresh scroll
    /// offset, and is marked for push.
    ///
    /// # Panics
    ///
    /// Panics on a consumer tree, or if the id space is exhausted.
    pub fn create_node(&mut self) -> NodeId {
        assert!(
            self.role == TreeRole::Producer,
            "nodes are created on the producer tree"
        );
        let id = NodeId::from_raw(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .unwrap_or_else(|| panic!("node id space exhausted"));

        self.nodes.insert(id, SceneNode::new_producer(id));
        self.pending_added.push(id);
        self.dirty.mark(id.get(), dirty::TOPOLOGY);
        self.needs_full_tree_sync = true;
        id
    }

    /// Destroys a node together with its children, mask, and replica.
    ///
    /// Scroll and clip relations pointing at destroyed nodes are cleared on
    /// the surviving side. Copy requests still pending on the destroyed nodes
    /// are handed back to the caller, tagged with the node they were made on.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn destroy_node(&mut self, id: NodeId) -> Vec<(NodeId, CopyOutputRequest)> {
        self.validate(id);
        self.detach(id);
        if self.root == Some(id) {
            self.root = None;
        }

        let mut touched = Vec::new();
        let mut abandoned = Vec::new();
        let mut stack = alloc::vec![id];
        while let Some(n) = stack.pop() {
            let Some(node) = self.nodes.remove(&n) else {
                continue;
            };
            stack.extend(node.dependents());

            if let Some(sp) = node.scroll_parent {
                if let Some(p) = self.nodes.get_mut(&sp) {
                    p.scroll_children.remove(&n);
                    touched.push(sp);
                }
            }
            for c in &node.scroll_children {
                if let Some(child) = self.nodes.get_mut(c) {
                    child.scroll_parent = None;
                    touched.push(*c);
                }
            }
            if let Some(cp) = node.clip_parent {
                if let Some(p) = self.nodes.get_mut(&cp) {
                    p.clip_children.remove(&n);
                    touched.push(cp);
                }
            }
            for c in &node.clip_children {
                if let Some(child) = self.nodes.get_mut(c) {
                    child.clip_parent = None;
                    touched.push(*c);
                }
            }
            if self.page_scale_node == Some(n) {
                self.page_scale_node = None;
            }
            if node.scrollbar.is_some() {
                self.unregister_scrollbar(n);
            }

            self.dirty.remove_key(n.get());
            self.animators.remove(&n);
            self.pending_removed.push(n);
            abandoned.extend(node.copy_requests.into_iter().map(|r| (n, r)));
        }

        for n in touched {
            if self.nodes.contains_key(&n) {
                self.set_needs_push(n);
            }
        }
        self.needs_full_tree_sync = true;
        abandoned
    }

    /// Returns whether `id` names a node of this tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the node, or `None` if `id` is unknown.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Returns the node.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SceneNode {
        self.nodes
            .get(&id)
            .unwrap_or_else(|| panic!("unknown {id:?}"))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
        self.nodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown {id:?}"))
    }

    /// Number of nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    // -- Topology API --

    /// The root node, if set.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Sets the root node that synchronization mirrors.
    ///
    /// # Panics
    ///
    /// Panics if `root` is unknown or has an owner.
    pub fn set_root(&mut self, root: Option<NodeId>) {
        if let Some(r) = root {
            assert!(self.node(r).parent.is_none(), "root cannot have an owner");
        }
        if self.root != root {
            self.root = root;
            self.needs_full_tree_sync = true;
        }
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either id is unknown, `child` already has an owner, or
    /// `child` precedes `parent` in owner or scroll order.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child(parent, child, usize::MAX);
    }

    /// Inserts `child` at `index` among the children of `parent`, clamping
    /// `index` to the child count.
    ///
    /// # Panics
    ///
    /// Panics if either id is unknown, `child` already has an owner, or
    /// `child` precedes `parent` in owner or scroll order.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.node(child).parent.is_none(),
            "child already has a parent"
        );
        assert!(
            !self.is_ancestor_or_self(child, parent),
            "cannot attach a node below itself"
        );
        self.assert_scroll_order_acyclic(parent, child);
        let p = self.node_mut(parent);
        let at = index.min(p.children.len());
        p.children.insert(at, child);
        self.attach(parent, child);
    }

    /// Detaches `child` from its owner.
    ///
    /// # Panics
    ///
    /// Panics if `child` is unknown or has no owner.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        assert!(self.node(child).parent.is_some(), "node has no parent");
        self.detach(child);
    }

    /// Detaches every child of `parent`, keeping mask and replica.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is unknown.
    pub fn remove_all_children(&mut self, parent: NodeId) {
        let children = self.node(parent).children.clone();
        for child in children {
            self.detach(child);
        }
    }

    /// Sets the mask node of `id`.
    ///
    /// Marks `id`'s subtree changed.
    ///
    /// # Panics
    ///
    /// Panics if an id is unknown or the new mask already has an owner.
    pub fn set_mask(&mut self, id: NodeId, mask: Option<NodeId>) {
        self.set_owned(id, mask, OwnedSlot::Mask);
    }

    /// Sets the replica node of `id`.
    ///
    /// Marks `id`'s subtree changed.
    ///
    /// # Panics
    ///
    /// Panics if an id is unknown or the new replica already has an owner.
    pub fn set_replica(&mut self, id: NodeId, replica: Option<NodeId>) {
        self.set_owned(id, replica, OwnedSlot::Replica);
    }

    /// Whether `ancestor` is `id` or lies on its owner chain.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes.get(&n).and_then(|node| node.parent);
        }
        false
    }

    /// Whether a structural synchronization is due.
    #[must_use]
    pub fn needs_full_tree_sync(&self) -> bool {
        self.needs_full_tree_sync
    }

    // -- Tree-level properties --

    /// The node whose subtree is zoomed by the page scale, if any.
    #[must_use]
    pub fn page_scale_node(&self) -> Option<NodeId> {
        self.page_scale_node
    }

    /// Current page-scale factor.
    #[must_use]
    pub fn page_scale_factor(&self) -> f64 {
        self.page_scale_factor
    }

    /// Sets the page-scale node and factor.
    ///
    /// # Panics
    ///
    /// Panics if `node` is unknown or `factor` is not positive and finite.
    pub fn set_page_scale(&mut self, node: Option<NodeId>, factor: f64) {
        if let Some(n) = node {
            self.validate(n);
        }
        assert!(
            factor.is_finite() && factor > 0.0,
            "page scale factor must be positive and finite, got {factor}"
        );
        self.page_scale_node = node;
        self.page_scale_factor = factor;
    }

    // -- Push bookkeeping --

    /// Marks `id` for push and lets its ancestors know.
    ///
    /// Walks up the owner chain incrementing dependent counters, stopping at
    /// the first ancestor that already needed a push or already had a dirty
    /// dependent. A consumer tree has no twin to push to, so this is a no-op
    /// there.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn set_needs_push(&mut self, id: NodeId) {
        let role = self.role;
        let node = self.node_mut(id);
        if role == TreeRole::Consumer || node.needs_push {
            return;
        }
        let parent_knew = node.parent_should_know_need_push();
        node.needs_push = true;
        if !parent_knew {
            if let Some(p) = node.parent {
                self.add_dependent_needs_push(p);
            }
        }
    }

    /// Keeps `id` marked for push after every push pass.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn set_always_needs_push(&mut self, id: NodeId, always: bool) {
        self.node_mut(id).always_needs_push = always;
        if always {
            self.set_needs_push(id);
        }
    }

    /// Clears `id`'s push flag, unwinding ancestor counters that only knew
    /// about it.
    pub(crate) fn clear_needs_push(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        if !node.needs_push || node.always_needs_push {
            return;
        }
        node.needs_push = false;
        if node.parent_should_know_need_push() {
            return;
        }
        if let Some(p) = node.parent {
            self.remove_dependent_needs_push(p);
        }
    }

    fn add_dependent_needs_push(&mut self, mut id: NodeId) {
        loop {
            let node = self.node_mut(id);
            let knew = node.parent_should_know_need_push();
            node.num_dependents_need_push += 1;
            match (knew, node.parent) {
                (false, Some(p)) => id = p,
                _ => return,
            }
        }
    }

    fn remove_dependent_needs_push(&mut self, mut id: NodeId) {
        loop {
            let node = self.node_mut(id);
            debug_assert!(
                node.num_dependents_need_push > 0,
                "dependent counter underflow on {id:?}"
            );
            node.num_dependents_need_push = node.num_dependents_need_push.saturating_sub(1);
            if node.parent_should_know_need_push() {
                return;
            }
            match node.parent {
                Some(p) => id = p,
                None => return,
            }
        }
    }

    // -- Dirty scopes --

    /// Marks `id` content-changed (self only) and for push.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn note_property_changed(&mut self, id: NodeId) {
        self.validate(id);
        self.note_changed(id, DirtyScope::SelfOnly);
    }

    /// Marks `id` and all of its descendants content-changed, and `id` for
    /// push.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn note_property_changed_for_subtree(&mut self, id: NodeId) {
        self.validate(id);
        self.note_changed(id, DirtyScope::Subtree);
    }

    /// Marks every descendant of `id` content-changed, leaving `id` itself
    /// and all push flags untouched.
    ///
    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn note_property_changed_for_descendants(&mut self, id: NodeId) {
        let dependents: Vec<NodeId> = self.node(id).dependents().collect();
        for d in dependents {
            self.dirty.mark_with(d.get(), dirty::PROPERTY, &EagerPolicy);
        }
    }

    pub(crate) fn note_changed(&mut self, id: NodeId, scope: DirtyScope) {
        match scope {
            DirtyScope::SelfOnly => self.dirty.mark(id.get(), dirty::PROPERTY),
            DirtyScope::Subtree => self.dirty.mark_with(id.get(), dirty::PROPERTY, &EagerPolicy),
        }
        self.set_needs_push(id);
    }

    /// Writes `value` through `field` and applies `scope` if it changed.
    fn update<T: PartialEq>(
        &mut self,
        id: NodeId,
        scope: DirtyScope,
        value: T,
        field: impl FnOnce(&mut SceneNode) -> &mut T,
    ) {
        let slot = field(self.node_mut(id));
        if *slot == value {
            return;
        }
        *slot = value;
        self.note_changed(id, scope);
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the content bounds.
    ///
    /// Invalidates the whole subtree when the node masks to its bounds, since
    /// descendants are clipped by them; otherwise only the node itself.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Size) {
        let scope = if self.node(id).masks_to_bounds {
            DirtyScope::Subtree
        } else {
            DirtyScope::SelfOnly
        };
        self.update(id, scope, bounds, |n| &mut n.bounds);
    }

    /// Sets the position within the parent.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        self.update(id, DirtyScope::Subtree, position, |n| &mut n.position);
    }

    /// Sets the local transform.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform3d) {
        self.update(id, DirtyScope::Subtree, transform, |n| &mut n.transform);
    }

    /// Sets the local opacity.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) {
        self.update(id, DirtyScope::Subtree, opacity, |n| &mut n.opacity);
    }

    /// Sets whether content and descendants clip to the bounds.
    pub fn set_masks_to_bounds(&mut self, id: NodeId, masks: bool) {
        self.update(id, DirtyScope::Subtree, masks, |n| &mut n.masks_to_bounds);
    }

    /// Sets whether the content is fully opaque.
    pub fn set_contents_opaque(&mut self, id: NodeId, opaque: bool) {
        self.update(id, DirtyScope::Subtree, opaque, |n| &mut n.contents_opaque);
    }

    /// Sets whether the node has content of its own.
    pub fn set_draws_content(&mut self, id: NodeId, draws: bool) {
        self.update(id, DirtyScope::SelfOnly, draws, |n| &mut n.draws_content);
    }

    /// Sets whether the back face is visible.
    pub fn set_double_sided(&mut self, id: NodeId, double_sided: bool) {
        self.update(id, DirtyScope::Subtree, double_sided, |n| {
            &mut n.double_sided
        });
    }

    /// Hides or shows the node and its subtree.
    pub fn set_hide_layer_and_subtree(&mut self, id: NodeId, hide: bool) {
        self.update(id, DirtyScope::Subtree, hide, |n| {
            &mut n.hide_layer_and_subtree
        });
    }

    /// Sets the background color.
    pub fn set_background_color(&mut self, id: NodeId, color: [f32; 4]) {
        self.update(id, DirtyScope::SelfOnly, color, |n| &mut n.background_color);
    }

    /// Replaces the content filters.
    pub fn set_filters(&mut self, id: NodeId, filters: Vec<FilterOperation>) {
        self.update(id, DirtyScope::Subtree, filters, |n| &mut n.filters);
    }

    /// Sets the viewport node that makes this node scrollable, or `None` to
    /// make it non-scrollable.
    pub fn set_scroll_clip(&mut self, id: NodeId, clip: Option<NodeId>) {
        self.update(id, DirtyScope::SelfOnly, clip, |n| &mut n.scroll_clip);
    }

    /// Sets whether the user may scroll horizontally.
    pub fn set_user_scrollable_horizontal(&mut self, id: NodeId, scrollable: bool) {
        self.update(id, DirtyScope::SelfOnly, scrollable, |n| {
            &mut n.user_scrollable_horizontal
        });
    }

    /// Sets whether the user may scroll vertically.
    pub fn set_user_scrollable_vertical(&mut self, id: NodeId, scrollable: bool) {
        self.update(id, DirtyScope::SelfOnly, scrollable, |n| {
            &mut n.user_scrollable_vertical
        });
    }

    /// Forces every scroll on this node to the producer thread.
    pub fn set_should_scroll_on_main_thread(&mut self, id: NodeId, main: bool) {
        self.update(id, DirtyScope::SelfOnly, main, |n| {
            &mut n.should_scroll_on_main_thread
        });
    }

    /// Records whether content listens for wheel events.
    pub fn set_have_wheel_event_handlers(&mut self, id: NodeId, have: bool) {
        self.update(id, DirtyScope::SelfOnly, have, |n| {
            &mut n.have_wheel_event_handlers
        });
    }

    /// Records whether content listens for scroll events.
    pub fn set_have_scroll_event_handlers(&mut self, id: NodeId, have: bool) {
        self.update(id, DirtyScope::SelfOnly, have, |n| {
            &mut n.have_scroll_event_handlers
        });
    }

    /// Replaces the node-space region where scrolls must go to the producer.
    pub fn set_non_fast_scrollable_region(&mut self, id: NodeId, region: Vec<Rect>) {
        self.update(id, DirtyScope::SelfOnly, region, |n| {
            &mut n.non_fast_scrollable_region
        });
    }

    /// Sets the blocking flags requested by content on this node.
    pub fn set_scroll_blocks_on(&mut self, id: NodeId, blocks_on: ScrollBlocksOn) {
        self.update(id, DirtyScope::SelfOnly, blocks_on, |n| {
            &mut n.scroll_blocks_on
        });
    }

    /// Adds `rect` to the node's accumulated damage.
    pub fn set_needs_display_rect(&mut self, id: NodeId, rect: Rect) {
        if rect.is_zero_area() {
            self.validate(id);
            return;
        }
        let node = self.node_mut(id);
        node.update_rect = union_nonempty(node.update_rect, rect);
        self.note_changed(id, DirtyScope::SelfOnly);
    }

    /// Clears the accumulated damage, typically after the node was drawn.
    pub fn reset_update_rect(&mut self, id: NodeId) {
        self.node_mut(id).update_rect = Rect::ZERO;
    }

    /// Queues a request to read back this node's rendered output.
    pub fn request_copy_of_output(&mut self, id: NodeId, request: CopyOutputRequest) {
        self.node_mut(id).copy_requests.push(request);
        self.note_changed(id, DirtyScope::SelfOnly);
    }

    /// Stores the embedder's draw properties for the node.
    ///
    /// Draw properties are derived data and never dirty anything.
    pub fn set_draw_properties(&mut self, id: NodeId, properties: DrawProperties) {
        self.node_mut(id).draw_properties = properties;
    }

    /// Sets the node that scrolls `id` in place of its tree parent.
    ///
    /// Maintains the inverse `scroll_children` set on both the old and the
    /// new scroll parent.
    ///
    /// # Panics
    ///
    /// Panics if an id is unknown, or if the change would let scroll order
    /// lead from `id` back to itself.
    pub fn set_scroll_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.validate(id);
        if let Some(p) = parent {
            self.validate(p);
        }
        let old = self.node(id).scroll_parent;
        if old == parent {
            return;
        }
        if let Some(next) = parent.or(self.node(id).parent) {
            assert!(
                !self.scroll_order_reaches(next, id),
                "scroll order of {id:?} would form a cycle"
            );
        }
        if let Some(o) = old {
            self.node_mut(o).scroll_children.remove(&id);
            self.set_needs_push(o);
        }
        if let Some(p) = parent {
            self.node_mut(p).scroll_children.insert(id);
            self.set_needs_push(p);
        }
        self.node_mut(id).scroll_parent = parent;
        self.set_needs_push(id);
    }

    /// Sets the node that clips `id` in place of its tree parent.
    ///
    /// Maintains the inverse `clip_children` set on both the old and the new
    /// clip parent.
    ///
    /// # Panics
    ///
    /// Panics if an id is unknown.
    pub fn set_clip_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.validate(id);
        if let Some(p) = parent {
            self.validate(p);
        }
        let old = self.node(id).clip_parent;
        if old == parent {
            return;
        }
        if let Some(o) = old {
            self.node_mut(o).clip_children.remove(&id);
            self.set_needs_push(o);
        }
        if let Some(p) = parent {
            self.node_mut(p).clip_children.insert(id);
            self.set_needs_push(p);
        }
        self.node_mut(id).clip_parent = parent;
        self.set_needs_push(id);
    }

    // -- Internal helpers --

    /// Panics if `id` is unknown.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(self.nodes.contains_key(&id), "unknown {id:?}");
    }

    /// Whether walking scroll order from `from` reaches `to`.
    ///
    /// The walk is bounded by the node count.
    fn scroll_order_reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut cur = Some(from);
        for _ in 0..=self.nodes.len() {
            match cur {
                Some(n) if n == to => return true,
                Some(n) => cur = self.next_node_in_scroll_order(n),
                None => return false,
            }
        }
        false
    }

    /// Panics if attaching `child` below `owner` would close a loop in
    /// scroll order.
    ///
    /// Only a child without a scroll parent bubbles to its owner.
    fn assert_scroll_order_acyclic(&self, owner: NodeId, child: NodeId) {
        if self.node(child).scroll_parent.is_none() {
            assert!(
                !self.scroll_order_reaches(owner, child),
                "scroll order of {child:?} would form a cycle"
            );
        }
    }

    fn set_owned(&mut self, id: NodeId, new: Option<NodeId>, slot: OwnedSlot) {
        let current = match slot {
            OwnedSlot::Mask => self.node(id).mask,
            OwnedSlot::Replica => self.node(id).replica,
        };
        if current == new {
            return;
        }
        if let Some(n) = new {
            assert!(self.node(n).parent.is_none(), "{slot:?} node already has an owner");
            assert!(
                !self.is_ancestor_or_self(n, id),
                "cannot attach a node below itself"
            );
            self.assert_scroll_order_acyclic(id, n);
        }
        if let Some(old) = current {
            self.detach(old);
        }
        if let Some(n) = new {
            let owner = self.node_mut(id);
            match slot {
                OwnedSlot::Mask => owner.mask = Some(n),
                OwnedSlot::Replica => owner.replica = Some(n),
            }
            self.attach(id, n);
        }
        self.note_changed(id, DirtyScope::Subtree);
    }

    /// Links `child` to `owner` after it was placed in one of the owner's
    /// slots.
    fn attach(&mut self, owner: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(owner);
        // Child depends on owner so subtree marks reach it.
        let _ = self
            .dirty
            .add_dependency(child.get(), owner.get(), dirty::PROPERTY);
        if self.node(child).parent_should_know_need_push() {
            self.add_dependent_needs_push(owner);
        }
        self.dirty
            .mark_with(child.get(), dirty::PROPERTY, &EagerPolicy);
        self.dirty.mark(owner.get(), dirty::TOPOLOGY);
        self.needs_full_tree_sync = true;
    }

    /// Unlinks `child` from whichever slot of its owner holds it.
    fn detach(&mut self, child: NodeId) {
        let Some(owner) = self.node(child).parent else {
            return;
        };
        let o = self.node_mut(owner);
        o.children.retain(|&c| c != child);
        if o.mask == Some(child) {
            o.mask = None;
        }
        if o.replica == Some(child) {
            o.replica = None;
        }
        self.node_mut(child).parent = None;
        self.dirty
            .remove_dependency(child.get(), owner.get(), dirty::PROPERTY);
        if self.node(child).parent_should_know_need_push() {
            self.remove_dependent_needs_push(owner);
        }
        self.dirty
            .mark_with(child.get(), dirty::PROPERTY, &EagerPolicy);
        self.dirty.mark(owner.get(), dirty::TOPOLOGY);
        self.needs_full_tree_sync = true;
    }
}

/// Unions two rectangles, ignoring either one if it has no area.
pub(crate) fn union_nonempty(a: Rect, b: Rect) -> Rect {
    if a.is_zero_area() {
        b
    } else if b.is_zero_area() {
        a
    } else {
        a.union(b)
    }
}
