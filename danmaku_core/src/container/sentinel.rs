// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generation counters for cooperative cancellation of asynchronous draws.
//!
//! Every container owns a [`Sentinel`]. Requesting a new display increments
//! it; the draw task captures the value it was submitted with inside a
//! [`CancelToken`]. A token is cancelled as soon as either:
//!
//! - the sentinel has moved past the captured generation (a newer display was
//!   requested, the comment changed, or the container left the canvas), or
//! - the sentinel itself is gone (the owning engine was dropped).
//!
//! Only the counter is shared across threads. Workers hold a [`Weak`]
//! reference so that an outstanding task never keeps engine state alive.

use alloc::sync::{Arc, Weak};
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use super::ContainerId;

/// A monotonically increasing (wrapping) 32-bit generation counter.
#[derive(Default)]
pub struct Sentinel {
    value: Arc<AtomicU32>,
}

impl fmt::Debug for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sentinel({})", self.value())
    }
}

impl Sentinel {
    /// Creates a sentinel at generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidates every outstanding token and returns the new generation.
    pub fn increase(&self) -> u32 {
        self.value.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    /// Returns the current generation.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.value.load(Ordering::Acquire)
    }

    /// Captures the current generation for `container`.
    #[must_use]
    pub fn token(&self, container: ContainerId) -> CancelToken {
        CancelToken {
            container,
            generation: self.value(),
            sentinel: Arc::downgrade(&self.value),
        }
    }
}

/// The cancellation predicate handed to a draw task.
///
/// Cheap to clone and `Send + Sync`; the check is a weak upgrade plus one
/// atomic load.
#[derive(Clone)]
pub struct CancelToken {
    container: ContainerId,
    generation: u32,
    sentinel: Weak<AtomicU32>,
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("container", &self.container)
            .field("generation", &self.generation)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelToken {
    /// The container the task draws for.
    #[must_use]
    pub const fn container(&self) -> ContainerId {
        self.container
    }

    /// The sentinel generation captured at submission.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns `true` if the owner is gone or a newer generation exists.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        match self.sentinel.upgrade() {
            Some(value) => value.load(Ordering::Acquire) != self.generation,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> ContainerId {
        ContainerId {
            idx: 0,
            generation: 0,
        }
    }

    #[test]
    fn fresh_token_is_live() {
        let sentinel = Sentinel::new();
        let token = sentinel.token(id());
        assert!(!token.is_cancelled());
        assert_eq!(token.generation(), 0);
    }

    #[test]
    fn increase_cancels_outstanding_tokens() {
        let sentinel = Sentinel::new();
        let stale = sentinel.token(id());
        assert_eq!(sentinel.increase(), 1);
        let fresh = sentinel.token(id());
        assert!(stale.is_cancelled());
        assert!(!fresh.is_cancelled());
    }

    #[test]
    fn dropped_owner_cancels() {
        let sentinel = Sentinel::new();
        let token = sentinel.token(id());
        drop(sentinel);
        assert!(token.is_cancelled());
    }

    #[test]
    fn generation_wraps() {
        let sentinel = Sentinel::new();
        sentinel.value.store(u32::MAX, Ordering::Release);
        let token = sentinel.token(id());
        assert_eq!(sentinel.increase(), 0);
        assert!(token.is_cancelled());
    }
}
