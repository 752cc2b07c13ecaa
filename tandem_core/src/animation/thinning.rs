// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thinning scrollbars that react to pointer proximity.

use alloc::vec::Vec;

use super::{AnimationDriver, ScrollbarAnimator, ScrollbarAnimatorConfig};
use crate::client::FrameClient;
use crate::tree::{NodeId, SceneTree};

/// Direction an animated value is heading in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationChange {
    /// Not animating; the value follows the pointer state.
    #[default]
    None,
    /// Heading from the idle value toward 1.
    Increase,
    /// Heading from 1 toward the idle value.
    Decrease,
}

impl AnimationChange {
    /// Picks the value to apply when the animation wants `new_value` and the
    /// node currently shows `current_value`.
    ///
    /// An increase never lowers the visible value and a decrease never
    /// raises it, so restarting an animation mid-flight does not flicker.
    /// The result is clamped to `[min_value, max_value]`.
    #[must_use]
    pub fn adjust_scale(
        self,
        new_value: f32,
        current_value: f32,
        min_value: f32,
        max_value: f32,
    ) -> f32 {
        let value = match self {
            Self::Increase if current_value > new_value => current_value,
            Self::Decrease if current_value < new_value => current_value,
            _ => new_value,
        };
        value.clamp(min_value, max_value)
    }

    /// Value at `progress` between `idle` and 1, or `steady` without a
    /// direction.
    fn interpolate(self, progress: f32, idle: f32, steady: f32) -> f32 {
        let factor = match self {
            Self::None => return steady,
            Self::Increase => progress,
            Self::Decrease => 1.0 - progress,
        };
        (1.0 - idle) * factor + idle
    }
}

/// Overlay scrollbars that dim to an idle opacity and thin to an idle
/// thickness, and come back when the pointer approaches.
///
/// Opacity follows whether the pointer is over a scrollbar; thickness follows
/// whether it is near one. The two animate independently.
#[derive(Clone, Debug)]
pub struct ThinningAnimator {
    driver: AnimationDriver,
    mouse_is_over_scrollbar: bool,
    mouse_is_near_scrollbar: bool,
    captured: bool,
    opacity_change: AnimationChange,
    thickness_change: AnimationChange,
}

impl ThinningAnimator {
    /// Creates an idle animator for the scrollbars of `scroll_node`.
    #[must_use]
    pub fn new(scroll_node: NodeId, config: ScrollbarAnimatorConfig) -> Self {
        Self {
            driver: AnimationDriver::new(scroll_node, config),
            mouse_is_over_scrollbar: false,
            mouse_is_near_scrollbar: false,
            captured: false,
            opacity_change: AnimationChange::None,
            thickness_change: AnimationChange::None,
        }
    }

    /// Direction of the running opacity animation.
    #[must_use]
    pub fn opacity_change(&self) -> AnimationChange {
        self.opacity_change
    }

    /// Direction of the running thickness animation.
    #[must_use]
    pub fn thickness_change(&self) -> AnimationChange {
        self.thickness_change
    }

    /// Whether the pointer is over a scrollbar.
    #[must_use]
    pub fn mouse_is_over_scrollbar(&self) -> bool {
        self.mouse_is_over_scrollbar
    }

    /// Whether the pointer is within the trigger distance of a scrollbar.
    #[must_use]
    pub fn mouse_is_near_scrollbar(&self) -> bool {
        self.mouse_is_near_scrollbar
    }

    /// Whether a button was pressed over a scrollbar and not yet released.
    #[must_use]
    pub fn captured(&self) -> bool {
        self.captured
    }

    fn opacity_at(&self, progress: f32) -> f32 {
        let idle = self.driver.config().idle_opacity;
        let steady = if self.mouse_is_over_scrollbar { 1.0 } else { idle };
        self.opacity_change.interpolate(progress, idle, steady)
    }

    fn thickness_at(&self, progress: f32) -> f32 {
        let idle = self.driver.config().idle_thickness_scale;
        let steady = if self.mouse_is_near_scrollbar { 1.0 } else { idle };
        self.thickness_change.interpolate(progress, idle, steady)
    }

    fn apply(
        &self,
        opacity: f32,
        thickness: f32,
        tree: &mut SceneTree,
        client: &mut dyn FrameClient,
    ) {
        let Some(node) = tree.get(self.driver.scroll_node()) else {
            return;
        };
        let config = *self.driver.config();
        let scrollbars: Vec<NodeId> = node.scrollbars().iter().copied().collect();
        for sb in scrollbars {
            let Some(state) = tree.node(sb).scrollbar().copied() else {
                continue;
            };
            if !state.is_overlay {
                continue;
            }
            let effective_opacity = if tree.scrollbar_can_scroll(sb) {
                self.opacity_change.adjust_scale(
                    opacity,
                    tree.node(sb).opacity(),
                    config.idle_opacity,
                    1.0,
                )
            } else {
                0.0
            };
            tree.set_opacity(sb, effective_opacity);
            tree.set_thumb_thickness_scale_factor(
                sb,
                self.thickness_change.adjust_scale(
                    thickness,
                    state.thumb_thickness_scale_factor,
                    config.idle_thickness_scale,
                    1.0,
                ),
            );
        }
        client.set_needs_redraw();
    }
}

impl ScrollbarAnimator for ThinningAnimator {
    fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    fn driver_mut(&mut self) -> &mut AnimationDriver {
        &mut self.driver
    }

    fn did_scroll_update(
        &mut self,
        on_resize: bool,
        tree: &mut SceneTree,
        client: &mut dyn FrameClient,
    ) {
        let over = self.mouse_is_over_scrollbar;
        self.driver.did_scroll_update(on_resize, !over, client);

        self.opacity_change = AnimationChange::None;
        self.thickness_change = AnimationChange::None;
        let thickness = self.thickness_at(0.0);
        self.apply(1.0, thickness, tree, client);
        if !over {
            self.opacity_change = AnimationChange::Decrease;
        }
    }

    fn run_animation_frame(
        &mut self,
        progress: f32,
        tree: &mut SceneTree,
        client: &mut dyn FrameClient,
    ) {
        let opacity = self.opacity_at(progress);
        let thickness = self.thickness_at(progress);
        self.apply(opacity, thickness, tree, client);
        if progress >= 1.0 {
            self.opacity_change = AnimationChange::None;
            self.thickness_change = AnimationChange::None;
            self.driver.stop();
        }
    }

    fn did_scroll_end(&mut self, client: &mut dyn FrameClient) {
        let schedule = !self.mouse_is_over_scrollbar;
        self.driver.did_scroll_end(schedule, client);
    }

    fn did_mouse_move_near(&mut self, distance: f64, client: &mut dyn FrameClient) {
        let over = distance == 0.0;
        let near = distance < self.driver.config().mouse_move_distance_to_trigger_animation;
        if over == self.mouse_is_over_scrollbar && near == self.mouse_is_near_scrollbar {
            return;
        }
        if self.captured {
            // Released later; did_mouse_up settles the direction.
            self.mouse_is_over_scrollbar = over;
            self.mouse_is_near_scrollbar = near;
            return;
        }
        if over != self.mouse_is_over_scrollbar {
            self.mouse_is_over_scrollbar = over;
            self.opacity_change = if over {
                AnimationChange::Increase
            } else {
                AnimationChange::Decrease
            };
        }
        if near != self.mouse_is_near_scrollbar {
            self.mouse_is_near_scrollbar = near;
            self.thickness_change = if near {
                AnimationChange::Increase
            } else {
                AnimationChange::Decrease
            };
        }
        self.driver.start(client);
    }

    fn did_mouse_move_off_scrollbar(&mut self, client: &mut dyn FrameClient) {
        self.mouse_is_over_scrollbar = false;
        self.mouse_is_near_scrollbar = false;
        if self.captured {
            return;
        }
        self.opacity_change = AnimationChange::Decrease;
        self.thickness_change = AnimationChange::Decrease;
        self.driver.start(client);
    }

    fn did_mouse_down(&mut self) {
        if self.mouse_is_over_scrollbar {
            self.captured = true;
        }
    }

    fn did_mouse_up(&mut self, client: &mut dyn FrameClient) {
        if !self.captured {
            return;
        }
        self.captured = false;
        let mut changed = false;
        if !self.mouse_is_over_scrollbar {
            self.opacity_change = AnimationChange::Decrease;
            changed = true;
        }
        if !self.mouse_is_near_scrollbar {
            self.thickness_change = AnimationChange::Decrease;
            changed = true;
        }
        if changed {
            self.driver.start(client);
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;
    use crate::client::testing::RecordingClient;
    use crate::tree::testing::{ScrollFixture, commit, scroll_fixture};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn thickness(tree: &SceneTree, sb: NodeId) -> f32 {
        tree.node(sb).scrollbar().unwrap().thumb_thickness_scale_factor
    }

    /// Fixture with the thinning scrollbar settled in its idle state.
    fn idle() -> (ScrollFixture, ThinningAnimator, RecordingClient) {
        let mut f = scroll_fixture(true);
        let mut anim = ThinningAnimator::new(f.content, ScrollbarAnimatorConfig::thinning());
        let mut client = RecordingClient::default();
        anim.did_scroll_update(false, &mut f.consumer, &mut client);
        anim.start_animation(&mut client);
        anim.run_animation_frame(1.0, &mut f.consumer, &mut client);
        (f, anim, client)
    }

    #[test]
    fn interpolation_runs_between_idle_and_one() {
        let c = AnimationChange::Increase;
        assert!(close(c.interpolate(0.0, 0.4, 9.0), 0.4));
        assert!(close(c.interpolate(0.5, 0.4, 9.0), 0.7));
        assert!(close(c.interpolate(1.0, 0.4, 9.0), 1.0));
        let c = AnimationChange::Decrease;
        assert!(close(c.interpolate(0.0, 0.4, 9.0), 1.0));
        assert!(close(c.interpolate(1.0, 0.4, 9.0), 0.4));
        assert_eq!(AnimationChange::None.interpolate(0.3, 0.4, 9.0), 9.0);
    }

    #[test]
    fn adjust_scale_respects_direction() {
        let (min, max) = (0.4, 1.0);
        let steps = [0.4_f32, 0.5, 0.55, 0.7, 0.85, 0.9, 1.0];
        for &current in &steps {
            for &new in &steps {
                let up = AnimationChange::Increase.adjust_scale(new, current, min, max);
                assert!(up >= current, "increase lowered {current} to {up}");
                let down = AnimationChange::Decrease.adjust_scale(new, current, min, max);
                assert!(down <= current, "decrease raised {current} to {down}");
                let free = AnimationChange::None.adjust_scale(new, current, min, max);
                assert_eq!(free, new);
            }
        }
        assert_eq!(AnimationChange::None.adjust_scale(1.5, 0.5, min, max), 1.0);
        assert_eq!(AnimationChange::None.adjust_scale(0.1, 0.5, min, max), 0.4);
    }

    #[test]
    fn scroll_update_shows_then_dims_to_idle() {
        let mut f = scroll_fixture(true);
        let mut anim = ThinningAnimator::new(f.content, ScrollbarAnimatorConfig::thinning());
        let mut client = RecordingClient::default();
        anim.did_scroll_update(false, &mut f.consumer, &mut client);

        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 1.0);
        assert!(close(thickness(&f.consumer, f.scrollbar), 0.4));
        assert_eq!(anim.opacity_change(), AnimationChange::Decrease);
        assert_eq!(client.delayed.len(), 1);

        assert!(anim.delayed_start_fired(&mut client));
        anim.run_animation_frame(0.5, &mut f.consumer, &mut client);
        assert!(close(f.consumer.node(f.scrollbar).opacity(), 0.85));
        anim.run_animation_frame(1.0, &mut f.consumer, &mut client);
        assert!(close(f.consumer.node(f.scrollbar).opacity(), 0.7));
        assert!(!anim.is_animating());
        assert_eq!(anim.opacity_change(), AnimationChange::None);
    }

    #[test]
    fn approaching_thickens_without_brightening() {
        let (mut f, mut anim, mut client) = idle();
        anim.did_mouse_move_near(10.0, &mut client);
        assert!(anim.mouse_is_near_scrollbar() && !anim.mouse_is_over_scrollbar());
        assert_eq!(anim.thickness_change(), AnimationChange::Increase);
        assert_eq!(anim.opacity_change(), AnimationChange::None);
        assert!(anim.is_animating());

        anim.run_animation_frame(0.5, &mut f.consumer, &mut client);
        assert!(close(thickness(&f.consumer, f.scrollbar), 0.7));
        assert!(close(f.consumer.node(f.scrollbar).opacity(), 0.7));

        anim.run_animation_frame(1.0, &mut f.consumer, &mut client);
        assert!(close(thickness(&f.consumer, f.scrollbar), 1.0));
        assert_eq!(anim.thickness_change(), AnimationChange::None);
    }

    #[test]
    fn hovering_brightens_and_thickens() {
        let (mut f, mut anim, mut client) = idle();
        anim.did_mouse_move_near(0.0, &mut client);
        assert_eq!(anim.opacity_change(), AnimationChange::Increase);
        assert_eq!(anim.thickness_change(), AnimationChange::Increase);
        anim.run_animation_frame(1.0, &mut f.consumer, &mut client);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 1.0);
        assert!(close(thickness(&f.consumer, f.scrollbar), 1.0));
    }

    #[test]
    fn unchanged_proximity_starts_nothing() {
        let (_, mut anim, mut client) = idle();
        let requests = client.animate_requests.len();
        anim.did_mouse_move_near(100.0, &mut client);
        assert_eq!(client.animate_requests.len(), requests);
        assert!(!anim.is_animating());
    }

    #[test]
    fn leaving_decreases_both() {
        let (mut f, mut anim, mut client) = idle();
        anim.did_mouse_move_near(0.0, &mut client);
        anim.run_animation_frame(1.0, &mut f.consumer, &mut client);

        anim.did_mouse_move_off_scrollbar(&mut client);
        assert_eq!(anim.opacity_change(), AnimationChange::Decrease);
        assert_eq!(anim.thickness_change(), AnimationChange::Decrease);
        anim.run_animation_frame(0.5, &mut f.consumer, &mut client);
        assert!(close(f.consumer.node(f.scrollbar).opacity(), 0.85));
        assert!(close(thickness(&f.consumer, f.scrollbar), 0.7));
    }

    #[test]
    fn capture_defers_decrease_until_release() {
        let (mut f, mut anim, mut client) = idle();
        anim.did_mouse_move_near(0.0, &mut client);
        anim.run_animation_frame(1.0, &mut f.consumer, &mut client);

        anim.did_mouse_down();
        assert!(anim.captured());
        anim.did_mouse_move_off_scrollbar(&mut client);
        assert!(!anim.is_animating());
        assert_eq!(anim.opacity_change(), AnimationChange::None);

        anim.did_mouse_up(&mut client);
        assert!(!anim.captured());
        assert_eq!(anim.opacity_change(), AnimationChange::Decrease);
        assert_eq!(anim.thickness_change(), AnimationChange::Decrease);
        assert!(anim.is_animating());
    }

    #[test]
    fn mouse_down_away_from_scrollbar_does_not_capture() {
        let (_, mut anim, _) = idle();
        anim.did_mouse_down();
        assert!(!anim.captured());
    }

    #[test]
    fn hovered_scrollbar_does_not_schedule_fade() {
        let (mut f, mut anim, mut client) = idle();
        anim.did_mouse_move_near(0.0, &mut client);
        let posted = client.delayed.len();
        anim.did_scroll_update(false, &mut f.consumer, &mut client);
        assert_eq!(client.delayed.len(), posted);
        assert_eq!(anim.opacity_change(), AnimationChange::None);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 1.0);
    }

    #[test]
    fn unscrollable_axis_is_transparent() {
        let (mut f, mut anim, mut client) = idle();
        f.producer.set_bounds(f.content, Size::new(100.0, 50.0));
        commit(&mut f.producer, &mut f.consumer);
        anim.did_mouse_move_near(0.0, &mut client);
        anim.run_animation_frame(0.5, &mut f.consumer, &mut client);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 0.0);
    }

    #[test]
    fn hosted_animator_receives_pointer_events() {
        let ScrollFixture {
            mut consumer,
            content,
            ..
        } = scroll_fixture(true);
        consumer.set_scrollbar_animator(
            content,
            Some(alloc::boxed::Box::new(ThinningAnimator::new(
                content,
                ScrollbarAnimatorConfig::thinning(),
            ))),
        );
        let mut client = RecordingClient::default();
        consumer.did_mouse_move_near(content, 5.0, &mut client);
        assert_eq!(client.animate_requests, &[content]);
        assert!(consumer.scrollbar_animator(content).unwrap().is_animating());
    }
}
