// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node state.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};

use super::id::NodeId;
use crate::scroll::ScrollBlocksOn;
use crate::scroll_offset::{ScrollOffsetHandle, SyncedScrollOffset};
use crate::transform::Transform3d;

/// A filter applied to a node's rendered content.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterOperation {
    /// Gaussian blur with the given standard deviation.
    Blur(f64),
    /// Multiplies alpha by the given amount.
    Opacity(f32),
    /// Desaturates by the given amount in `[0, 1]`.
    Grayscale(f32),
    /// Scales color channels by the given amount.
    Brightness(f32),
    /// Drop shadow below the content.
    DropShadow {
        /// Shadow offset.
        offset: Vec2,
        /// Blur radius.
        radius: f64,
        /// Shadow color, premultiplied RGBA.
        color: [f32; 4],
    },
}

/// Axis a scrollbar tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollbarOrientation {
    /// Tracks the x offset.
    Horizontal,
    /// Tracks the y offset.
    Vertical,
}

impl ScrollbarOrientation {
    /// Picks this orientation's component of `v`.
    #[inline]
    #[must_use]
    pub fn component(self, v: Vec2) -> f64 {
        match self {
            Self::Horizontal => v.x,
            Self::Vertical => v.y,
        }
    }

    /// Picks this orientation's extent of `s`.
    #[inline]
    #[must_use]
    pub fn length(self, s: Size) -> f64 {
        match self {
            Self::Horizontal => s.width,
            Self::Vertical => s.height,
        }
    }
}

/// State of a scrollbar-role node.
///
/// `orientation`, `is_overlay`, `scroll_node`, and `clip_node` come from the
/// producer. The geometry fields are computed on the consumer by
/// [`SceneTree::update_scrollbar_positions`](super::SceneTree::update_scrollbar_positions)
/// and the thickness is driven by the scrollbar animator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollbarState {
    /// Axis this scrollbar tracks.
    pub orientation: ScrollbarOrientation,
    /// Overlay scrollbars fade; others are always opaque.
    pub is_overlay: bool,
    /// Scrollable node this scrollbar reflects.
    pub scroll_node: Option<NodeId>,
    /// Viewport node bounding `scroll_node`.
    pub clip_node: Option<NodeId>,
    /// Thumb position along the track.
    pub current_pos: f64,
    /// Largest value `current_pos` can take.
    pub maximum: f64,
    /// Viewport length divided by content length.
    pub visible_to_total_length_ratio: f64,
    /// Scale applied to the thumb's thickness.
    pub thumb_thickness_scale_factor: f32,
}

impl ScrollbarState {
    /// Creates an unbound scrollbar.
    #[must_use]
    pub const fn new(orientation: ScrollbarOrientation, is_overlay: bool) -> Self {
        Self {
            orientation,
            is_overlay,
            scroll_node: None,
            clip_node: None,
            current_pos: 0.0,
            maximum: 0.0,
            visible_to_total_length_ratio: 1.0,
            thumb_thickness_scale_factor: 1.0,
        }
    }
}

/// Pending request to read back a node's rendered output.
///
/// The core only moves requests around; servicing them is up to the
/// embedder's renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CopyOutputRequest {
    /// Embedder-assigned identity.
    pub id: u64,
    /// Sub-area in node space, or `None` for the whole node.
    pub area: Option<Rect>,
}

/// Outputs of the embedder's property-tree evaluation.
///
/// The core reads these for hit testing and copy-output targeting but never
/// computes them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawProperties {
    /// Node space to render-target space.
    pub draw_transform: Transform3d,
    /// Node space to screen space.
    pub screen_space_transform: Transform3d,
    /// Clip in render-target space.
    pub clip_rect: Rect,
    /// Visible part of the node in node space.
    pub visible_rect: Rect,
}

impl Default for DrawProperties {
    fn default() -> Self {
        Self {
            draw_transform: Transform3d::IDENTITY,
            screen_space_transform: Transform3d::IDENTITY,
            clip_rect: Rect::ZERO,
            visible_rect: Rect::ZERO,
        }
    }
}

/// One node of a [`SceneTree`](super::SceneTree).
///
/// Nodes are read through this type and mutated through the owning tree, so
/// every change goes through the tree's dirty bookkeeping.
#[derive(Debug)]
pub struct SceneNode {
    pub(crate) id: NodeId,

    // -- Ownership --
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) mask: Option<NodeId>,
    pub(crate) replica: Option<NodeId>,

    // -- Relations --
    pub(crate) scroll_parent: Option<NodeId>,
    pub(crate) scroll_children: BTreeSet<NodeId>,
    pub(crate) clip_parent: Option<NodeId>,
    pub(crate) clip_children: BTreeSet<NodeId>,

    // -- Geometry and appearance --
    pub(crate) bounds: Size,
    pub(crate) position: Point,
    pub(crate) transform: Transform3d,
    pub(crate) opacity: f32,
    pub(crate) masks_to_bounds: bool,
    pub(crate) contents_opaque: bool,
    pub(crate) draws_content: bool,
    pub(crate) double_sided: bool,
    pub(crate) hide_layer_and_subtree: bool,
    pub(crate) background_color: [f32; 4],
    pub(crate) filters: Vec<FilterOperation>,

    // -- Scrolling --
    pub(crate) scroll_clip: Option<NodeId>,
    pub(crate) user_scrollable_horizontal: bool,
    pub(crate) user_scrollable_vertical: bool,
    pub(crate) should_scroll_on_main_thread: bool,
    pub(crate) have_wheel_event_handlers: bool,
    pub(crate) have_scroll_event_handlers: bool,
    pub(crate) non_fast_scrollable_region: Vec<Rect>,
    pub(crate) scroll_blocks_on: ScrollBlocksOn,
    pub(crate) scroll_offset: ScrollOffsetHandle,
    pub(crate) main_scroll_offset: Vec2,
    pub(crate) clobber_active_scroll_offset: bool,

    // -- Scrollbars --
    pub(crate) scrollbars: BTreeSet<NodeId>,
    pub(crate) scrollbar: Option<ScrollbarState>,

    // -- Damage and resources --
    pub(crate) update_rect: Rect,
    pub(crate) copy_requests: Vec<CopyOutputRequest>,

    // -- Push bookkeeping --
    pub(crate) needs_push: bool,
    pub(crate) num_dependents_need_push: u32,
    pub(crate) always_needs_push: bool,

    // -- Written by the embedder --
    pub(crate) draw_properties: DrawProperties,
}

impl SceneNode {
    /// Creates a detached node that shares `scroll_offset` with its twin.
    pub(crate) fn new(id: NodeId, scroll_offset: ScrollOffsetHandle) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            mask: None,
            replica: None,
            scroll_parent: None,
            scroll_children: BTreeSet::new(),
            clip_parent: None,
            clip_children: BTreeSet::new(),
            bounds: Size::ZERO,
            position: Point::ORIGIN,
            transform: Transform3d::IDENTITY,
            opacity: 1.0,
            masks_to_bounds: false,
            contents_opaque: false,
            draws_content: false,
            double_sided: true,
            hide_layer_and_subtree: false,
            background_color: [0.0; 4],
            filters: Vec::new(),
            scroll_clip: None,
            user_scrollable_horizontal: true,
            user_scrollable_vertical: true,
            should_scroll_on_main_thread: false,
            have_wheel_event_handlers: false,
            have_scroll_event_handlers: false,
            non_fast_scrollable_region: Vec::new(),
            scroll_blocks_on: ScrollBlocksOn::NONE,
            scroll_offset,
            main_scroll_offset: Vec2::ZERO,
            clobber_active_scroll_offset: false,
            scrollbars: BTreeSet::new(),
            scrollbar: None,
            update_rect: Rect::ZERO,
            copy_requests: Vec::new(),
            needs_push: false,
            num_dependents_need_push: 0,
            always_needs_push: false,
            draw_properties: DrawProperties::default(),
        }
    }

    /// Creates a producer node with a fresh scroll offset.
    pub(crate) fn new_producer(id: NodeId) -> Self {
        let mut node = Self::new(id, SyncedScrollOffset::shared(Vec2::ZERO));
        // A node the consumer has never seen must be pushed at least once.
        node.needs_push = true;
        node
    }

    /// This node's id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Owner of this node: its parent, or the node it masks or replicates.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Mask node, if any.
    #[must_use]
    pub fn mask(&self) -> Option<NodeId> {
        self.mask
    }

    /// Replica node, if any.
    #[must_use]
    pub fn replica(&self) -> Option<NodeId> {
        self.replica
    }

    /// Node that scrolls this one when it is not its tree parent.
    #[must_use]
    pub fn scroll_parent(&self) -> Option<NodeId> {
        self.scroll_parent
    }

    /// Nodes naming this one as their scroll parent.
    #[must_use]
    pub fn scroll_children(&self) -> &BTreeSet<NodeId> {
        &self.scroll_children
    }

    /// Node that clips this one when it is not its tree parent.
    #[must_use]
    pub fn clip_parent(&self) -> Option<NodeId> {
        self.clip_parent
    }

    /// Nodes naming this one as their clip parent.
    #[must_use]
    pub fn clip_children(&self) -> &BTreeSet<NodeId> {
        &self.clip_children
    }

    /// Content bounds.
    #[must_use]
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Position within the parent.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Local transform.
    #[must_use]
    pub fn transform(&self) -> Transform3d {
        self.transform
    }

    /// Local opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Whether content and descendants are clipped to the bounds.
    #[must_use]
    pub fn masks_to_bounds(&self) -> bool {
        self.masks_to_bounds
    }

    /// Whether every pixel of the content is opaque.
    #[must_use]
    pub fn contents_opaque(&self) -> bool {
        self.contents_opaque
    }

    /// Whether the node has content of its own.
    #[must_use]
    pub fn draws_content(&self) -> bool {
        self.draws_content
    }

    /// Whether the back face is visible.
    #[must_use]
    pub fn double_sided(&self) -> bool {
        self.double_sided
    }

    /// Whether the node and its subtree are hidden.
    #[must_use]
    pub fn hide_layer_and_subtree(&self) -> bool {
        self.hide_layer_and_subtree
    }

    /// Background color, premultiplied RGBA.
    #[must_use]
    pub fn background_color(&self) -> [f32; 4] {
        self.background_color
    }

    /// Content filters.
    #[must_use]
    pub fn filters(&self) -> &[FilterOperation] {
        &self.filters
    }

    /// Viewport node bounding this node's scrolling, if scrollable.
    #[must_use]
    pub fn scroll_clip(&self) -> Option<NodeId> {
        self.scroll_clip
    }

    /// Whether the node scrolls at all.
    #[must_use]
    pub fn scrollable(&self) -> bool {
        self.scroll_clip.is_some()
    }

    /// Whether the user may scroll horizontally.
    #[must_use]
    pub fn user_scrollable_horizontal(&self) -> bool {
        self.user_scrollable_horizontal
    }

    /// Whether the user may scroll vertically.
    #[must_use]
    pub fn user_scrollable_vertical(&self) -> bool {
        self.user_scrollable_vertical
    }

    /// Whether the user may scroll along `orientation`.
    #[must_use]
    pub fn user_scrollable(&self, orientation: ScrollbarOrientation) -> bool {
        match orientation {
            ScrollbarOrientation::Horizontal => self.user_scrollable_horizontal,
            ScrollbarOrientation::Vertical => self.user_scrollable_vertical,
        }
    }

    /// Whether scrolls here always go to the producer thread.
    #[must_use]
    pub fn should_scroll_on_main_thread(&self) -> bool {
        self.should_scroll_on_main_thread
    }

    /// Whether content listens for wheel events.
    #[must_use]
    pub fn have_wheel_event_handlers(&self) -> bool {
        self.have_wheel_event_handlers
    }

    /// Whether content listens for scroll events.
    #[must_use]
    pub fn have_scroll_event_handlers(&self) -> bool {
        self.have_scroll_event_handlers
    }

    /// Node-space rectangles where scrolls go to the producer thread.
    #[must_use]
    pub fn non_fast_scrollable_region(&self) -> &[Rect] {
        &self.non_fast_scrollable_region
    }

    /// Blocking flags set on this node alone.
    #[must_use]
    pub fn scroll_blocks_on(&self) -> ScrollBlocksOn {
        self.scroll_blocks_on
    }

    /// Shared scroll offset.
    #[must_use]
    pub fn scroll_offset(&self) -> &ScrollOffsetHandle {
        &self.scroll_offset
    }

    /// Scrollbar nodes registered on this node.
    #[must_use]
    pub fn scrollbars(&self) -> &BTreeSet<NodeId> {
        &self.scrollbars
    }

    /// Scrollbar state, if this node is a scrollbar.
    #[must_use]
    pub fn scrollbar(&self) -> Option<&ScrollbarState> {
        self.scrollbar.as_ref()
    }

    /// Damage accumulated since the last reset.
    #[must_use]
    pub fn update_rect(&self) -> Rect {
        self.update_rect
    }

    /// Pending copy-output requests.
    #[must_use]
    pub fn copy_requests(&self) -> &[CopyOutputRequest] {
        &self.copy_requests
    }

    /// Whether the node's properties must be pushed to its twin.
    #[must_use]
    pub fn needs_push(&self) -> bool {
        self.needs_push
    }

    /// Number of direct dependents (children, mask, replica) that need a
    /// push themselves or have dependents that do.
    #[must_use]
    pub fn num_dependents_need_push(&self) -> u32 {
        self.num_dependents_need_push
    }

    /// Whether the node stays dirty after every push.
    #[must_use]
    pub fn always_needs_push(&self) -> bool {
        self.always_needs_push
    }

    /// Draw properties last written by the embedder.
    #[must_use]
    pub fn draw_properties(&self) -> &DrawProperties {
        &self.draw_properties
    }

    /// Whether the parent must count this node as a dependent needing push.
    pub(crate) fn parent_should_know_need_push(&self) -> bool {
        self.needs_push || self.num_dependents_need_push > 0
    }

    /// Children, then mask, then replica.
    pub(crate) fn dependents(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children
            .iter()
            .copied()
            .chain(self.mask)
            .chain(self.replica)
    }
}
