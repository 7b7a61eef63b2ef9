// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Engine times
//! are printed in seconds.

use std::io::Write;

use danmaku_core::comment::CommentKind;
use danmaku_core::trace::{
    AdmitEvent, CommitEvent, FlushEvent, LayoutEvent, RejectEvent, RemoveEvent, SeekEvent,
    TickEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    ticks: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            ticks: true,
        }
    }

    /// Omits `[tick]` lines, which otherwise appear once per frame.
    #[must_use]
    pub fn without_ticks(mut self) -> Self {
        self.ticks = false;
        self
    }

    /// Returns the destination.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn kind_name(kind: CommentKind) -> &'static str {
    match kind {
        CommentKind::Base => "base",
        CommentKind::Float => "float",
        CommentKind::Scroll => "scroll",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick(&mut self, e: &TickEvent) {
        if !self.ticks {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[tick] #{} t={:.3}s active={}",
            e.tick_index, e.time, e.active,
        );
    }

    fn on_admit(&mut self, e: &AdmitEvent) {
        let recycled = if e.recycled { " recycled" } else { "" };
        let _ = writeln!(
            self.writer,
            "[admit] t={:.3}s {:?} {} track={:?}{recycled}",
            e.time,
            e.container,
            kind_name(e.kind),
            e.track,
        );
    }

    fn on_reject(&mut self, e: &RejectEvent) {
        let _ = writeln!(
            self.writer,
            "[reject] t={:.3}s {} reason={:?}",
            e.time,
            kind_name(e.kind),
            e.reason,
        );
    }

    fn on_layout(&mut self, e: &LayoutEvent) {
        let _ = writeln!(
            self.writer,
            "[layout] #{} {:?} track={:?} frame=({:.1}, {:.1}, {:.1}, {:.1})",
            e.tick_index, e.container, e.track, e.frame.x0, e.frame.y0, e.frame.x1, e.frame.y1,
        );
    }

    fn on_remove(&mut self, e: &RemoveEvent) {
        let _ = writeln!(
            self.writer,
            "[remove] #{} {:?} {} reason={:?}",
            e.tick_index,
            e.container,
            kind_name(e.kind),
            e.reason,
        );
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        let _ = writeln!(
            self.writer,
            "[commit] #{} {:?} {:?}",
            e.tick_index, e.container, e.op,
        );
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        let _ = writeln!(
            self.writer,
            "[flush] #{} commits={} flushed={}",
            e.tick_index, e.commits, e.flushed,
        );
    }

    fn on_seek(&mut self, e: &SeekEvent) {
        let _ = writeln!(
            self.writer,
            "[seek] {:.3}s -> {:.3}s flagged={}",
            e.from, e.to, e.flagged,
        );
    }
}

#[cfg(test)]
mod tests {
    use danmaku_core::trace::RejectReason;

    use super::*;

    #[test]
    fn pretty_print_tick() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_tick(&TickEvent {
            tick_index: 1,
            time: 0.5,
            active: 3,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[tick]"), "got: {output}");
        assert!(output.contains("t=0.500s"), "got: {output}");
        assert!(output.contains("active=3"), "got: {output}");
    }

    #[test]
    fn ticks_can_be_silenced() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).without_ticks();
        sink.on_tick(&TickEvent {
            tick_index: 1,
            time: 0.5,
            active: 3,
        });
        sink.on_reject(&RejectEvent {
            time: 0.5,
            kind: CommentKind::Float,
            reason: RejectReason::NoTrack,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(!output.contains("[tick]"), "got: {output}");
        assert!(output.contains("[reject] t=0.500s float reason=NoTrack"), "got: {output}");
    }
}
