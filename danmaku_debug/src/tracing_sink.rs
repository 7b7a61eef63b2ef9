// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forwards engine trace events to `tracing`.
//!
//! Lifecycle milestones (admit, reject, remove, seek) are emitted at `DEBUG`;
//! per-tick chatter (tick, layout, commit, flush) at `TRACE`. All events use
//! the `danmaku::engine` target so they can be filtered together.

use danmaku_core::trace::{
    AdmitEvent, CommitEvent, FlushEvent, LayoutEvent, RejectEvent, RemoveEvent, SeekEvent,
    TickEvent, TraceSink,
};
use tracing::{debug, trace};

/// A [`TraceSink`] that re-emits every event through `tracing` macros.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn on_tick(&mut self, e: &TickEvent) {
        trace!(
            target: "danmaku::engine",
            tick = e.tick_index,
            time = e.time,
            active = e.active,
            "tick"
        );
    }

    fn on_admit(&mut self, e: &AdmitEvent) {
        debug!(
            target: "danmaku::engine",
            time = e.time,
            container = ?e.container,
            kind = ?e.kind,
            track = ?e.track,
            recycled = e.recycled,
            "admit"
        );
    }

    fn on_reject(&mut self, e: &RejectEvent) {
        debug!(
            target: "danmaku::engine",
            time = e.time,
            kind = ?e.kind,
            reason = ?e.reason,
            "reject"
        );
    }

    fn on_layout(&mut self, e: &LayoutEvent) {
        trace!(
            target: "danmaku::engine",
            tick = e.tick_index,
            container = ?e.container,
            track = ?e.track,
            x = e.frame.x0,
            y = e.frame.y0,
            width = e.frame.width(),
            height = e.frame.height(),
            "layout"
        );
    }

    fn on_remove(&mut self, e: &RemoveEvent) {
        debug!(
            target: "danmaku::engine",
            tick = e.tick_index,
            container = ?e.container,
            kind = ?e.kind,
            reason = ?e.reason,
            "remove"
        );
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        trace!(
            target: "danmaku::engine",
            tick = e.tick_index,
            container = ?e.container,
            op = ?e.op,
            "commit"
        );
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        trace!(
            target: "danmaku::engine",
            tick = e.tick_index,
            commits = e.commits,
            flushed = e.flushed,
            "flush"
        );
    }

    fn on_seek(&mut self, e: &SeekEvent) {
        debug!(
            target: "danmaku::engine",
            from = e.from,
            to = e.to,
            flagged = e.flagged,
            "seek"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use danmaku_core::comment::CommentKind;
    use danmaku_core::trace::RejectReason;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(level: &str, f: impl FnOnce()) -> String {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn forwards_milestones_at_debug() {
        let out = capture("danmaku::engine=debug", || {
            let mut sink = TracingSink;
            sink.on_tick(&TickEvent {
                tick_index: 7,
                time: 1.0,
                active: 1,
            });
            sink.on_reject(&RejectEvent {
                time: 1.0,
                kind: CommentKind::Scroll,
                reason: RejectReason::Vetoed,
            });
        });
        assert!(out.contains("reject"), "got: {out}");
        assert!(out.contains("reason=Vetoed"), "got: {out}");
        assert!(!out.contains("tick=7"), "ticks are TRACE, got: {out}");
    }

    #[test]
    fn trace_level_includes_ticks() {
        let out = capture("danmaku::engine=trace", || {
            TracingSink.on_tick(&TickEvent {
                tick_index: 7,
                time: 1.0,
                active: 1,
            });
        });
        assert!(out.contains("tick=7"), "got: {out}");
    }
}
