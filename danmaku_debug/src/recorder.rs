// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event together
//! with the engine time it happened at. Events that carry no time of their
//! own (layout, removal, commit, flush) are stamped with the time of the most
//! recent tick.

use danmaku_core::trace::{
    AdmitEvent, CommitEvent, FlushEvent, LayoutEvent, RejectEvent, RemoveEvent, SeekEvent,
    TickEvent, TraceSink,
};

/// A recorded engine event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`TickEvent`].
    Tick(TickEvent),
    /// An [`AdmitEvent`].
    Admit(AdmitEvent),
    /// A [`RejectEvent`].
    Reject(RejectEvent),
    /// A [`LayoutEvent`].
    Layout(LayoutEvent),
    /// A [`RemoveEvent`].
    Remove(RemoveEvent),
    /// A [`CommitEvent`].
    Commit(CommitEvent),
    /// A [`FlushEvent`].
    Flush(FlushEvent),
    /// A [`SeekEvent`].
    Seek(SeekEvent),
}

/// One entry of a recording.
#[derive(Clone, Copy, Debug)]
pub struct Record {
    /// Engine time in seconds.
    pub time: f64,
    /// The event.
    pub event: RecordedEvent,
}

/// A [`TraceSink`] that appends every event to a list.
#[derive(Debug, Default)]
pub struct RecorderSink {
    records: Vec<Record>,
    last_time: f64,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded entries, oldest first.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the recorder and returns its entries.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn push(&mut self, time: f64, event: RecordedEvent) {
        self.records.push(Record { time, event });
    }
}

impl TraceSink for RecorderSink {
    fn on_tick(&mut self, e: &TickEvent) {
        self.last_time = e.time;
        self.push(e.time, RecordedEvent::Tick(*e));
    }

    fn on_admit(&mut self, e: &AdmitEvent) {
        self.push(e.time, RecordedEvent::Admit(*e));
    }

    fn on_reject(&mut self, e: &RejectEvent) {
        self.push(e.time, RecordedEvent::Reject(*e));
    }

    fn on_layout(&mut self, e: &LayoutEvent) {
        self.push(self.last_time, RecordedEvent::Layout(*e));
    }

    fn on_remove(&mut self, e: &RemoveEvent) {
        self.push(self.last_time, RecordedEvent::Remove(*e));
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.push(self.last_time, RecordedEvent::Commit(*e));
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.push(self.last_time, RecordedEvent::Flush(*e));
    }

    fn on_seek(&mut self, e: &SeekEvent) {
        self.last_time = e.to;
        self.push(e.from, RecordedEvent::Seek(*e));
    }
}
