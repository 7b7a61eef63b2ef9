// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads a recording from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Engine-wide events (ticks, rejections, seeks, flushes) live on thread 0.
//! Each container slot gets its own thread (`slot index + 1`) on which a
//! comment's stay on the canvas is a duration slice from admission to
//! removal.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use danmaku_core::container::ContainerId;
use serde_json::{Value, json};

use crate::recorder::{Record, RecordedEvent};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Engine seconds are converted to microseconds.
pub fn export(records: &[Record], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = records.iter().map(to_json).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_json(record: &Record) -> Value {
    let ts = seconds_to_us(record.time);
    match record.event {
        RecordedEvent::Tick(e) => json!({
            "ph": "i",
            "name": "Tick",
            "cat": "Engine",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "tick_index": e.tick_index,
                "active": e.active,
            }
        }),
        RecordedEvent::Admit(e) => json!({
            "ph": "B",
            "name": format!("{:?}", e.kind),
            "cat": "Comment",
            "ts": ts,
            "pid": 0,
            "tid": slot_tid(e.container),
            "args": {
                "container": format!("{:?}", e.container),
                "track": e.track,
                "recycled": e.recycled,
            }
        }),
        RecordedEvent::Reject(e) => json!({
            "ph": "i",
            "name": "Reject",
            "cat": "Engine",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "t",
            "args": {
                "kind": format!("{:?}", e.kind),
                "reason": format!("{:?}", e.reason),
            }
        }),
        RecordedEvent::Layout(e) => json!({
            "ph": "i",
            "name": "Layout",
            "cat": "Comment",
            "ts": ts,
            "pid": 0,
            "tid": slot_tid(e.container),
            "s": "t",
            "args": {
                "tick_index": e.tick_index,
                "track": e.track,
                "frame": [e.frame.x0, e.frame.y0, e.frame.x1, e.frame.y1],
            }
        }),
        RecordedEvent::Remove(e) => json!({
            "ph": "E",
            "name": format!("{:?}", e.kind),
            "cat": "Comment",
            "ts": ts,
            "pid": 0,
            "tid": slot_tid(e.container),
            "args": {
                "tick_index": e.tick_index,
                "reason": format!("{:?}", e.reason),
            }
        }),
        RecordedEvent::Commit(e) => json!({
            "ph": "i",
            "name": format!("{:?}", e.op),
            "cat": "Batch",
            "ts": ts,
            "pid": 0,
            "tid": slot_tid(e.container),
            "s": "t",
            "args": {
                "tick_index": e.tick_index,
            }
        }),
        RecordedEvent::Flush(e) => json!({
            "ph": "C",
            "name": "Flush",
            "cat": "Batch",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "args": {
                "commits": e.commits,
                "flushed": e.flushed,
            }
        }),
        RecordedEvent::Seek(e) => json!({
            "ph": "i",
            "name": "Seek",
            "cat": "Engine",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "from": e.from,
                "to": e.to,
                "flagged": e.flagged,
            }
        }),
    }
}

fn slot_tid(id: ContainerId) -> u64 {
    u64::from(id.index()) + 1
}

fn seconds_to_us(seconds: f64) -> f64 {
    seconds * 1_000_000.0
}
