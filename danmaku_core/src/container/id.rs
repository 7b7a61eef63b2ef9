// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container identity.

use core::fmt;

/// A handle to a container slot in a [`ContainerPool`](super::ContainerPool).
///
/// The generation is bumped when the slot is released back to the pool and
/// again when it is recycled, so a handle held past its comment's removal
/// stops resolving instead of aliasing the next comment bound to the slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId {
    /// Slot index into the pool.
    pub(crate) idx: u32,
    /// Must match the pool's generation for this slot.
    pub(crate) generation: u32,
}

impl ContainerId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({}@gen{})", self.idx, self.generation)
    }
}
