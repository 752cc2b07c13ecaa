// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use kurbo::Vec2;
use tandem_core::scroll::{InputType, ScrollStatus};
use tandem_core::trace::{
    PushEvent, ScrollAppliedEvent, ScrollDecisionEvent, ScrollbarFrameEvent, SyncEvent, TraceSink,
};
use tandem_core::tree::NodeId;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SYNC: u8 = 1;
const TAG_PUSH: u8 = 2;
const TAG_SCROLL_DECISION: u8 = 3;
const TAG_SCROLL_APPLIED: u8 = 4;
const TAG_SCROLLBAR_FRAME: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_vec2(&mut self, v: Vec2) {
        self.buf.extend_from_slice(&v.x.to_le_bytes());
        self.buf.extend_from_slice(&v.y.to_le_bytes());
    }

    fn write_node(&mut self, id: NodeId) {
        self.write_u32(id.get());
    }

    fn write_input(&mut self, input: InputType) {
        self.write_u8(match input {
            InputType::Gesture => 0,
            InputType::Wheel => 1,
            InputType::AnimatedWheel => 2,
            InputType::NonBubblingGesture => 3,
        });
    }

    fn write_status(&mut self, status: ScrollStatus) {
        self.write_u8(match status {
            ScrollStatus::OnMainThread => 0,
            ScrollStatus::Started => 1,
            ScrollStatus::Ignored => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_sync(&mut self, e: &SyncEvent) {
        self.write_u8(TAG_SYNC);
        self.write_u64(e.pass);
        self.write_u32(e.reused);
        self.write_u32(e.created);
        self.write_u32(e.dropped);
        self.write_u32(e.scrollbars_bound);
    }

    fn on_push_properties(&mut self, e: &PushEvent) {
        self.write_u8(TAG_PUSH);
        self.write_u64(e.pass);
        self.write_u32(e.visited);
        self.write_u32(e.pushed);
    }

    fn on_scroll_decision(&mut self, e: &ScrollDecisionEvent) {
        self.write_u8(TAG_SCROLL_DECISION);
        self.write_node(e.node);
        self.write_input(e.input_type);
        self.write_status(e.status);
    }

    fn on_scroll_applied(&mut self, e: &ScrollAppliedEvent) {
        self.write_u8(TAG_SCROLL_APPLIED);
        self.write_node(e.node);
        self.write_vec2(e.offered);
        self.write_vec2(e.consumed);
        self.write_u8(u8::from(e.skipped));
    }

    fn on_scrollbar_frame(&mut self, e: &ScrollbarFrameEvent) {
        self.write_u8(TAG_SCROLLBAR_FRAME);
        self.write_node(e.scroll_node);
        self.write_f32(e.progress);
        self.write_u8(u8::from(e.still_animating));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`SyncEvent`].
    Sync(SyncEvent),
    /// A [`PushEvent`].
    Push(PushEvent),
    /// A [`ScrollDecisionEvent`].
    ScrollDecision(ScrollDecisionEvent),
    /// A [`ScrollAppliedEvent`].
    ScrollApplied(ScrollAppliedEvent),
    /// A [`ScrollbarFrameEvent`].
    ScrollbarFrame(ScrollbarFrameEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes: [u8; N] = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f32(&mut self) -> Option<f32> {
        self.take().map(f32::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_vec2(&mut self) -> Option<Vec2> {
        Some(Vec2::new(self.read_f64()?, self.read_f64()?))
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    // Zero is never a valid id; treat it as a corrupt record.
    fn read_node(&mut self) -> Option<NodeId> {
        NodeId::new(self.read_u32()?)
    }

    fn read_input(&mut self) -> Option<InputType> {
        Some(match self.read_u8()? {
            0 => InputType::Gesture,
            1 => InputType::Wheel,
            2 => InputType::AnimatedWheel,
            _ => InputType::NonBubblingGesture,
        })
    }

    fn read_status(&mut self) -> Option<ScrollStatus> {
        Some(match self.read_u8()? {
            0 => ScrollStatus::OnMainThread,
            1 => ScrollStatus::Started,
            _ => ScrollStatus::Ignored,
        })
    }

    fn decode_sync(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Sync(SyncEvent {
            pass: self.read_u64()?,
            reused: self.read_u32()?,
            created: self.read_u32()?,
            dropped: self.read_u32()?,
            scrollbars_bound: self.read_u32()?,
        }))
    }

    fn decode_push(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Push(PushEvent {
            pass: self.read_u64()?,
            visited: self.read_u32()?,
            pushed: self.read_u32()?,
        }))
    }

    fn decode_scroll_decision(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ScrollDecision(ScrollDecisionEvent {
            node: self.read_node()?,
            input_type: self.read_input()?,
            status: self.read_status()?,
        }))
    }

    fn decode_scroll_applied(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ScrollApplied(ScrollAppliedEvent {
            node: self.read_node()?,
            offered: self.read_vec2()?,
            consumed: self.read_vec2()?,
            skipped: self.read_bool()?,
        }))
    }

    fn decode_scrollbar_frame(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ScrollbarFrame(ScrollbarFrameEvent {
            scroll_node: self.read_node()?,
            progress: self.read_f32()?,
            still_animating: self.read_bool()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_SYNC => self.decode_sync(),
            TAG_PUSH => self.decode_push(),
            TAG_SCROLL_DECISION => self.decode_scroll_decision(),
            TAG_SCROLL_APPLIED => self.decode_scroll_applied(),
            TAG_SCROLLBAR_FRAME => self.decode_scrollbar_frame(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> NodeId {
        NodeId::new(raw).unwrap()
    }

    #[test]
    fn records_a_commit_and_a_scroll_in_order() {
        let mut rec = RecorderSink::new();
        let sync = SyncEvent {
            pass: 1,
            reused: 0,
            created: 3,
            dropped: 0,
            scrollbars_bound: 1,
        };
        let push = PushEvent {
            pass: 1,
            visited: 3,
            pushed: 3,
        };
        let applied = ScrollAppliedEvent {
            node: id(2),
            offered: Vec2::new(0.0, 150.0),
            consumed: Vec2::new(0.0, 100.0),
            skipped: false,
        };
        rec.on_sync(&sync);
        rec.on_push_properties(&push);
        rec.on_scroll_applied(&applied);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            vec![
                RecordedEvent::Sync(sync),
                RecordedEvent::Push(push),
                RecordedEvent::ScrollApplied(applied),
            ]
        );
    }

    #[test]
    fn decision_keeps_input_and_status() {
        let mut rec = RecorderSink::new();
        let orig = ScrollDecisionEvent {
            node: id(9),
            input_type: InputType::NonBubblingGesture,
            status: ScrollStatus::Ignored,
        };
        rec.on_scroll_decision(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::ScrollDecision(e)] => assert_eq!(*e, orig),
            other => panic!("expected one ScrollDecision, got {other:?}"),
        }
    }

    #[test]
    fn scrollbar_frame_keeps_progress_bits() {
        let mut rec = RecorderSink::new();
        let orig = ScrollbarFrameEvent {
            scroll_node: id(3),
            progress: 0.375,
            still_animating: true,
        };
        rec.on_scrollbar_frame(&orig);

        let events: Vec<_> = decode(&rec.into_bytes()).collect();
        assert_eq!(events, vec![RecordedEvent::ScrollbarFrame(orig)]);
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_push_properties(&PushEvent {
            pass: 4,
            visited: 1,
            pushed: 0,
        });
        rec.on_push_properties(&PushEvent {
            pass: 5,
            visited: 1,
            pushed: 1,
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn unknown_tag_stops_decoding() {
        let events: Vec<_> = decode(&[0xff, 0, 0, 0]).collect();
        assert!(events.is_empty());
    }
}
