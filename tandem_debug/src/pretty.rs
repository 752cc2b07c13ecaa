// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use tandem_core::scroll::{InputType, ScrollStatus};
use tandem_core::trace::{
    PushEvent, ScrollAppliedEvent, ScrollDecisionEvent, ScrollbarFrameEvent, SyncEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn input_name(input: InputType) -> &'static str {
    match input {
        InputType::Gesture => "gesture",
        InputType::Wheel => "wheel",
        InputType::AnimatedWheel => "animated-wheel",
        InputType::NonBubblingGesture => "non-bubbling",
    }
}

fn status_name(status: ScrollStatus) -> &'static str {
    match status {
        ScrollStatus::OnMainThread => "main-thread",
        ScrollStatus::Started => "started",
        ScrollStatus::Ignored => "ignored",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_sync(&mut self, e: &SyncEvent) {
        let _ = writeln!(
            self.writer,
            "[sync] pass={} reused={} created={} dropped={} scrollbars={}",
            e.pass, e.reused, e.created, e.dropped, e.scrollbars_bound,
        );
    }

    fn on_push_properties(&mut self, e: &PushEvent) {
        let _ = writeln!(
            self.writer,
            "[push] pass={} visited={} pushed={}",
            e.pass, e.visited, e.pushed,
        );
    }

    fn on_scroll_decision(&mut self, e: &ScrollDecisionEvent) {
        let _ = writeln!(
            self.writer,
            "[scroll:decision] node={} input={} status={}",
            e.node,
            input_name(e.input_type),
            status_name(e.status),
        );
    }

    fn on_scroll_applied(&mut self, e: &ScrollAppliedEvent) {
        if e.skipped {
            let _ = writeln!(
                self.writer,
                "[scroll:applied] node={} skipped offered=({:.1}, {:.1})",
                e.node, e.offered.x, e.offered.y,
            );
        } else {
            let _ = writeln!(
                self.writer,
                "[scroll:applied] node={} offered=({:.1}, {:.1}) consumed=({:.1}, {:.1})",
                e.node, e.offered.x, e.offered.y, e.consumed.x, e.consumed.y,
            );
        }
    }

    fn on_scrollbar_frame(&mut self, e: &ScrollbarFrameEvent) {
        let _ = writeln!(
            self.writer,
            "[scrollbar] node={} progress={:.3}{}",
            e.scroll_node,
            e.progress,
            if e.still_animating { "" } else { " done" },
        );
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::*;
    use tandem_core::tree::NodeId;

    fn id(raw: u32) -> NodeId {
        NodeId::new(raw).unwrap()
    }

    #[test]
    fn pretty_print_sync_and_push() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_sync(&SyncEvent {
            pass: 2,
            reused: 3,
            created: 1,
            dropped: 0,
            scrollbars_bound: 1,
        });
        sink.on_push_properties(&PushEvent {
            pass: 2,
            visited: 3,
            pushed: 1,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[sync] pass=2 reused=3"), "got: {output}");
        assert!(output.contains("[push] pass=2 visited=3 pushed=1"), "got: {output}");
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn pretty_print_scroll_events() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_scroll_decision(&ScrollDecisionEvent {
            node: id(4),
            input_type: InputType::Wheel,
            status: ScrollStatus::OnMainThread,
        });
        sink.on_scroll_applied(&ScrollAppliedEvent {
            node: id(4),
            offered: Vec2::new(0.0, 150.0),
            consumed: Vec2::new(0.0, 100.0),
            skipped: false,
        });
        sink.on_scroll_applied(&ScrollAppliedEvent {
            node: id(2),
            offered: Vec2::new(0.0, 50.0),
            consumed: Vec2::new(0.0, 0.0),
            skipped: true,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(
            output.contains("node=4 input=wheel status=main-thread"),
            "got: {output}"
        );
        assert!(output.contains("consumed=(0.0, 100.0)"), "got: {output}");
        assert!(output.contains("node=2 skipped"), "got: {output}");
    }

    #[test]
    fn pretty_print_final_scrollbar_frame() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_scrollbar_frame(&ScrollbarFrameEvent {
            scroll_node: id(7),
            progress: 1.0,
            still_animating: false,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[scrollbar] node=7 progress=1.000 done\n");
    }
}
