// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the engine.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls while admitting, laying out and removing comments. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use kurbo::Rect;

use crate::batch::BatchOp;
use crate::comment::CommentKind;
use crate::container::ContainerId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a container left the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalReason {
    /// The comment reported that its run is over.
    Expired,
    /// The container was flagged inactive (seek or explicit deactivation).
    Inactive,
    /// The engine was stopped.
    Stopped,
}

/// Why a comment was not admitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// No track qualified under the non-overlapping policy.
    NoTrack,
    /// The external admission hook vetoed it.
    Vetoed,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of every engine tick.
#[derive(Clone, Copy, Debug)]
pub struct TickEvent {
    /// Monotonic tick counter.
    pub tick_index: u64,
    /// Effective engine time for this tick.
    pub time: f64,
    /// Active containers before the lifecycle pass.
    pub active: usize,
}

/// Emitted when a comment is admitted.
#[derive(Clone, Copy, Debug)]
pub struct AdmitEvent {
    /// Engine time at admission.
    pub time: f64,
    /// The container now holding the comment.
    pub container: ContainerId,
    /// Comment variant.
    pub kind: CommentKind,
    /// Assigned track.
    pub track: Option<u32>,
    /// Whether the container was recycled from the pool.
    pub recycled: bool,
}

/// Emitted when a comment is rejected.
#[derive(Clone, Copy, Debug)]
pub struct RejectEvent {
    /// Engine time of the attempt.
    pub time: f64,
    /// Comment variant.
    pub kind: CommentKind,
    /// Why.
    pub reason: RejectReason,
}

/// Emitted after a container is relaid out.
#[derive(Clone, Copy, Debug)]
pub struct LayoutEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// The relaid container.
    pub container: ContainerId,
    /// Track after clamping.
    pub track: Option<u32>,
    /// New frame.
    pub frame: Rect,
}

/// Emitted when a container returns to the pool.
#[derive(Clone, Copy, Debug)]
pub struct RemoveEvent {
    /// Tick counter (unchanged by `stop`).
    pub tick_index: u64,
    /// The removed container (its handle is stale afterwards).
    pub container: ContainerId,
    /// Comment variant.
    pub kind: CommentKind,
    /// Why.
    pub reason: RemovalReason,
}

/// Emitted when an operation is committed to the batcher.
#[derive(Clone, Copy, Debug)]
pub struct CommitEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// Target container.
    pub container: ContainerId,
    /// Operation.
    pub op: BatchOp,
}

/// Emitted when the batcher is flushed.
#[derive(Clone, Copy, Debug)]
pub struct FlushEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// Raw commits since the previous flush.
    pub commits: usize,
    /// Entries after deduplication that still resolved to a container.
    pub flushed: usize,
}

/// Emitted when engine time is set directly.
#[derive(Clone, Copy, Debug)]
pub struct SeekEvent {
    /// Effective time before the seek.
    pub from: f64,
    /// Effective time after the seek.
    pub to: f64,
    /// Containers flagged inactive.
    pub flagged: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the start of every tick.
    fn on_tick(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// Called when a comment is admitted.
    fn on_admit(&mut self, e: &AdmitEvent) {
        _ = e;
    }

    /// Called when a comment is rejected.
    fn on_reject(&mut self, e: &RejectEvent) {
        _ = e;
    }

    /// Called after a relayout.
    fn on_layout(&mut self, e: &LayoutEvent) {
        _ = e;
    }

    /// Called when a container is removed.
    fn on_remove(&mut self, e: &RemoveEvent) {
        _ = e;
    }

    /// Called when an operation is committed to the batcher.
    fn on_commit(&mut self, e: &CommitEvent) {
        _ = e;
    }

    /// Called when the batcher is flushed.
    fn on_flush(&mut self, e: &FlushEvent) {
        _ = e;
    }

    /// Called on a seek.
    fn on_seek(&mut self, e: &SeekEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Generates a `Tracer` forwarding method per sink callback.
macro_rules! forward {
    ($($(#[$doc:meta])* $name:ident => $hook:ident($event:ty);)*) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $name(&mut self, e: &$event) {
                #[cfg(feature = "trace")]
                if let Some(s) = &mut self.sink {
                    s.$hook(e);
                }
                #[cfg(not(feature = "trace"))]
                {
                    _ = e;
                }
            }
        )*
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    forward! {
        /// Emits a [`TickEvent`].
        tick => on_tick(TickEvent);
        /// Emits an [`AdmitEvent`].
        admit => on_admit(AdmitEvent);
        /// Emits a [`RejectEvent`].
        reject => on_reject(RejectEvent);
        /// Emits a [`LayoutEvent`].
        layout => on_layout(LayoutEvent);
        /// Emits a [`RemoveEvent`].
        remove => on_remove(RemoveEvent);
        /// Emits a [`CommitEvent`].
        commit => on_commit(CommitEvent);
        /// Emits a [`FlushEvent`].
        flush => on_flush(FlushEvent);
        /// Emits a [`SeekEvent`].
        seek => on_seek(SeekEvent);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> ContainerId {
        ContainerId {
            idx: 3,
            generation: 1,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_tick(&TickEvent {
            tick_index: 0,
            time: 0.0,
            active: 0,
        });
        sink.on_remove(&RemoveEvent {
            tick_index: 0,
            container: id(),
            kind: CommentKind::Float,
            reason: RemovalReason::Expired,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.tick(&TickEvent {
            tick_index: 1,
            time: 0.5,
            active: 2,
        });
        tracer.seek(&SeekEvent {
            from: 4.0,
            to: 1.0,
            flagged: 2,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            removed: Vec<(ContainerId, RemovalReason)>,
        }
        impl TraceSink for RecordingSink {
            fn on_remove(&mut self, e: &RemoveEvent) {
                self.removed.push((e.container, e.reason));
            }
        }

        let mut sink = RecordingSink {
            removed: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.remove(&RemoveEvent {
            tick_index: 9,
            container: id(),
            kind: CommentKind::Scroll,
            reason: RemovalReason::Inactive,
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.removed, &[(id(), RemovalReason::Inactive)]);
    }
}
