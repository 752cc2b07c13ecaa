// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear opacity fade.

use alloc::vec::Vec;

use super::{AnimationDriver, ScrollbarAnimator, ScrollbarAnimatorConfig};
use crate::client::FrameClient;
use crate::tree::{NodeId, SceneTree};

/// Shows overlay scrollbars on scroll and fades them out linearly.
#[derive(Clone, Debug)]
pub struct FadeAnimator {
    driver: AnimationDriver,
}

impl FadeAnimator {
    /// Creates an idle animator for the scrollbars of `scroll_node`.
    #[must_use]
    pub fn new(scroll_node: NodeId, config: ScrollbarAnimatorConfig) -> Self {
        Self {
            driver: AnimationDriver::new(scroll_node, config),
        }
    }

    fn apply_opacity(&self, opacity: f32, tree: &mut SceneTree, client: &mut dyn FrameClient) {
        let Some(node) = tree.get(self.driver.scroll_node()) else {
            return;
        };
        let scrollbars: Vec<NodeId> = node.scrollbars().iter().copied().collect();
        for sb in scrollbars {
            if !tree.node(sb).scrollbar().is_some_and(|s| s.is_overlay) {
                continue;
            }
            let effective = if tree.scrollbar_can_scroll(sb) { opacity } else { 0.0 };
            tree.set_opacity(sb, effective);
        }
        client.set_needs_redraw();
    }
}

impl ScrollbarAnimator for FadeAnimator {
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
        self.driver.did_scroll_update(on_resize, true, client);
        self.apply_opacity(1.0, tree, client);
    }

    fn run_animation_frame(
        &mut self,
        progress: f32,
        tree: &mut SceneTree,
        client: &mut dyn FrameClient,
    ) {
        self.apply_opacity(1.0 - progress, tree, client);
        if progress >= 1.0 {
            self.driver.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use kurbo::{Size, Vec2};

    use super::*;
    use crate::client::testing::RecordingClient;
    use crate::time::Duration;
    use crate::trace::Tracer;
    use crate::tree::testing::{ScrollFixture, commit, scroll_fixture};

    fn with_fade(f: &mut ScrollFixture) {
        f.consumer.set_scrollbar_animator(
            f.content,
            Some(Box::new(FadeAnimator::new(f.content, ScrollbarAnimatorConfig::fade()))),
        );
    }

    #[test]
    fn frame_at_zero_is_opaque_and_at_one_is_idle_and_transparent() {
        let mut f = scroll_fixture(true);
        let mut anim = FadeAnimator::new(f.content, ScrollbarAnimatorConfig::fade());
        let mut client = RecordingClient::default();

        anim.run_animation_frame(0.0, &mut f.consumer, &mut client);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 1.0);

        anim.start_animation(&mut client);
        anim.run_animation_frame(0.25, &mut f.consumer, &mut client);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 0.75);
        assert!(anim.is_animating());

        anim.run_animation_frame(1.0, &mut f.consumer, &mut client);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 0.0);
        assert!(!anim.is_animating());
        assert_eq!(client.redraws, 3);
    }

    #[test]
    fn non_overlay_scrollbar_stays_opaque() {
        let mut f = scroll_fixture(false);
        let mut anim = FadeAnimator::new(f.content, ScrollbarAnimatorConfig::fade());
        let mut client = RecordingClient::default();
        anim.run_animation_frame(1.0, &mut f.consumer, &mut client);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 1.0);
    }

    #[test]
    fn unscrollable_axis_is_transparent_mid_animation() {
        let mut f = scroll_fixture(true);
        f.producer.set_bounds(f.content, Size::new(100.0, 100.0));
        commit(&mut f.producer, &mut f.consumer);
        assert_eq!(f.consumer.max_scroll_offset(f.content), Vec2::ZERO);

        let mut anim = FadeAnimator::new(f.content, ScrollbarAnimatorConfig::fade());
        let mut client = RecordingClient::default();
        anim.did_scroll_update(false, &mut f.consumer, &mut client);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 0.0);
        anim.start_animation(&mut client);
        anim.run_animation_frame(0.4, &mut f.consumer, &mut client);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 0.0);
    }

    #[test]
    fn scroll_then_delay_then_frames() {
        let mut f = scroll_fixture(true);
        with_fade(&mut f);
        let mut client = RecordingClient::default();

        let _ = f.consumer.scroll_by(f.content, Vec2::new(0.0, 20.0));
        f.consumer.update_scrollbar_positions(f.content, false, &mut client);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 1.0);
        assert_eq!(client.delayed, &[(f.content, Duration::from_millis(300))]);

        assert!(f.consumer.delayed_scrollbar_animation_fired(f.content, &mut client));
        assert_eq!(client.animate_requests, &[f.content]);

        let mut tracer = Tracer::none();
        let running = f.consumer.animate_scrollbars(
            f.content,
            Duration::from_millis(150),
            &mut client,
            &mut tracer,
        );
        assert!(running);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 0.5);

        let running = f.consumer.animate_scrollbars(
            f.content,
            Duration::from_millis(300),
            &mut client,
            &mut tracer,
        );
        assert!(!running);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 0.0);
        assert!(!f.consumer.delayed_scrollbar_animation_fired(f.content, &mut client));
    }

    #[test]
    fn scroll_during_fade_restores_opacity() {
        let mut f = scroll_fixture(true);
        with_fade(&mut f);
        let mut client = RecordingClient::default();
        let mut tracer = Tracer::none();

        let _ = f.consumer.scroll_by(f.content, Vec2::new(0.0, 20.0));
        f.consumer.update_scrollbar_positions(f.content, false, &mut client);
        f.consumer.delayed_scrollbar_animation_fired(f.content, &mut client);
        f.consumer
            .animate_scrollbars(f.content, Duration::from_millis(150), &mut client, &mut tracer);

        let _ = f.consumer.scroll_by(f.content, Vec2::new(0.0, 20.0));
        f.consumer.update_scrollbar_positions(f.content, false, &mut client);
        assert_eq!(f.consumer.node(f.scrollbar).opacity(), 1.0);
        assert!(!f.consumer.scrollbar_animator(f.content).unwrap().is_animating());
    }
}
