// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deduplicated per-phase batching of container operations.
//!
//! Lifecycle passes may request the same operation for the same container
//! many times within one tick. [`TransactionBatcher`] collapses those into a
//! single pending entry and hands the whole set out once per idle phase:
//!
//! ```text
//!   tick ─► commit(slot, op) × k ─► ... ─► flush_pending() ─► [(slot, op)]
//! ```
//!
//! Entries are keyed by slot index rather than by [`ContainerId`]. A slot
//! that was recycled between commit and flush therefore resolves to whatever
//! comment is bound to it at flush time.
//!
//! [`ContainerId`]: crate::container::ContainerId

use alloc::vec::Vec;

use understory_dirty::{Channel, CycleHandling, DirtyTracker};

use crate::dirty;

/// An operation that can be batched for a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BatchOp {
    /// Request a new display (draw) of the container's surface.
    Display,
}

impl BatchOp {
    /// Every operation, in flush order.
    pub const ALL: [Self; 1] = [Self::Display];

    const fn channel(self) -> Channel {
        match self {
            Self::Display => dirty::DISPLAY,
        }
    }
}

/// Pending-operation set, flushed once per idle phase.
///
/// Storage is created on the first commit and kept until
/// [`teardown`](Self::teardown).
#[derive(Debug, Default)]
pub struct TransactionBatcher {
    pending: Option<DirtyTracker<u32>>,
    /// Raw commits since the last flush (before deduplication).
    commits: usize,
}

impl TransactionBatcher {
    /// Creates a batcher with no storage installed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: None,
            commits: 0,
        }
    }

    /// Returns `true` once storage has been installed by a commit.
    #[must_use]
    pub const fn is_installed(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns `true` if anything was committed since the last flush.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.commits > 0
    }

    /// Returns the number of raw commits since the last flush.
    #[must_use]
    pub const fn commits(&self) -> usize {
        self.commits
    }

    /// Adds `(slot, op)` to the pending set.
    pub fn commit(&mut self, slot: u32, op: BatchOp) {
        self.pending
            .get_or_insert_with(|| DirtyTracker::with_cycle_handling(CycleHandling::Error))
            .mark(slot, op.channel());
        self.commits += 1;
    }

    /// Drains the pending set.
    ///
    /// Entries are grouped by operation (in [`BatchOp::ALL`] order) and
    /// sorted deterministically within each group.
    pub fn flush_pending(&mut self) -> Vec<(u32, BatchOp)> {
        let mut out = Vec::new();
        if self.commits == 0 {
            return out;
        }
        self.commits = 0;
        let Some(tracker) = self.pending.as_mut() else {
            return out;
        };
        for op in BatchOp::ALL {
            let slots: Vec<u32> = tracker.drain(op.channel()).deterministic().run().collect();
            out.extend(slots.into_iter().map(|slot| (slot, op)));
        }
        out
    }

    /// Discards everything pending.
    pub fn clear(&mut self) {
        _ = self.flush_pending();
    }

    /// Discards everything pending and drops the storage.
    pub fn teardown(&mut self) {
        self.pending = None;
        self.commits = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_is_lazy() {
        let mut batcher = TransactionBatcher::new();
        assert!(!batcher.is_installed());
        assert!(batcher.flush_pending().is_empty());
        batcher.commit(3, BatchOp::Display);
        assert!(batcher.is_installed());
    }

    #[test]
    fn repeated_commits_collapse() {
        let mut batcher = TransactionBatcher::new();
        for _ in 0..5 {
            batcher.commit(7, BatchOp::Display);
        }
        batcher.commit(2, BatchOp::Display);
        assert_eq!(batcher.commits(), 6);

        let flushed = batcher.flush_pending();
        assert_eq!(flushed.len(), 2, "duplicates must collapse: {flushed:?}");
        assert!(flushed.contains(&(7, BatchOp::Display)));
        assert!(flushed.contains(&(2, BatchOp::Display)));
    }

    #[test]
    fn flush_empties_the_set() {
        let mut batcher = TransactionBatcher::new();
        batcher.commit(1, BatchOp::Display);
        assert_eq!(batcher.flush_pending().len(), 1);
        assert!(!batcher.has_pending());
        assert!(batcher.flush_pending().is_empty(), "second flush must be empty");

        batcher.commit(1, BatchOp::Display);
        assert_eq!(batcher.flush_pending().len(), 1, "next phase sees new commits");
    }

    #[test]
    fn clear_and_teardown() {
        let mut batcher = TransactionBatcher::new();
        batcher.commit(1, BatchOp::Display);
        batcher.clear();
        assert!(batcher.flush_pending().is_empty());
        assert!(batcher.is_installed());

        batcher.commit(4, BatchOp::Display);
        batcher.teardown();
        assert!(!batcher.is_installed());
        assert!(!batcher.has_pending());
    }
}
