// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! The core never reads a clock, so events carry no timestamps. Each event is
//! placed at its position in the recording, one microsecond apart.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

const TID_COMMIT: u32 = 0;
const TID_SCROLL: u32 = 1;
const TID_SCROLLBAR: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Commit, scroll, and scrollbar events are placed on separate tracks.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        match recorded {
            RecordedEvent::Sync(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Sync",
                    "cat": "Commit",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_COMMIT,
                    "s": "t",
                    "args": {
                        "pass": e.pass,
                        "reused": e.reused,
                        "created": e.created,
                        "dropped": e.dropped,
                        "scrollbars_bound": e.scrollbars_bound,
                    }
                }));
            }
            RecordedEvent::Push(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "PushProperties",
                    "cat": "Commit",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_COMMIT,
                    "s": "t",
                    "args": {
                        "pass": e.pass,
                        "visited": e.visited,
                        "pushed": e.pushed,
                    }
                }));
            }
            RecordedEvent::ScrollDecision(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "ScrollDecision",
                    "cat": "Scroll",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_SCROLL,
                    "s": "t",
                    "args": {
                        "node": e.node.get(),
                        "input": format!("{:?}", e.input_type),
                        "status": format!("{:?}", e.status),
                    }
                }));
            }
            RecordedEvent::ScrollApplied(e) => {
                let name = if e.skipped {
                    "ScrollSkipped"
                } else {
                    "ScrollApplied"
                };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Scroll",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_SCROLL,
                    "s": "t",
                    "args": {
                        "node": e.node.get(),
                        "offered": [e.offered.x, e.offered.y],
                        "consumed": [e.consumed.x, e.consumed.y],
                    }
                }));
            }
            RecordedEvent::ScrollbarFrame(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": format!("ScrollbarProgress({})", e.scroll_node),
                    "cat": "Scrollbar",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_SCROLLBAR,
                    "args": {
                        "progress": e.progress,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
