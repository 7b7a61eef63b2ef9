// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Track (lane) geometry and allocation strategies.
//!
//! The canvas is divided into horizontal tracks of equal height:
//!
//! ```text
//!   track_height = max(preferred_height, min_height) + vertical_gap
//!   track_count  = max(floor(canvas_height / track_height), 1)
//! ```
//!
//! Each comment variant chooses its track through a [`TrackAllocator`]:
//! [`FloatAllocator`] balances occupancy, [`ScrollAllocator`] checks
//! kinematic collisions.

mod float;
mod scroll;

use core::cell::Cell;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

pub use float::{FloatAllocator, FloatCandidate};
pub use scroll::{ScrollAllocator, ScrollCandidate, ScrollConfig, scroll_admits};

use crate::context::Context;

/// Picks a track for a candidate comment.
pub trait TrackAllocator {
    /// What the allocator needs to know about the candidate.
    type Candidate;

    /// Returns the chosen track, or `None` when no track qualifies.
    ///
    /// Under [`LayoutPolicy::Timely`](crate::engine::LayoutPolicy::Timely) an
    /// allocator always returns a track.
    fn allocate(&self, candidate: &Self::Candidate, ctx: &Context<'_>) -> Option<u32>;
}

/// Track sizing parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackConfig {
    /// Lower bound on the content height used for sizing tracks.
    pub min_height: f64,
    /// Spacing added to every track.
    pub vertical_gap: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackConfig {
    /// 24pt minimum height, 6pt gap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_height: 24.0,
            vertical_gap: 6.0,
        }
    }

    /// Derives the track grid for content of `preferred_height` on a canvas
    /// of `canvas_height`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "track counts are clamped to the u32 range before the cast"
    )]
    pub fn layout(&self, preferred_height: f64, canvas_height: f64) -> TrackLayout {
        let track_height = preferred_height.max(self.min_height) + self.vertical_gap;
        let count = (canvas_height / track_height)
            .floor()
            .clamp(1.0, f64::from(u32::MAX)) as u32;
        TrackLayout {
            track_height,
            track_count: count,
        }
    }
}

/// A concrete track grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackLayout {
    /// Height of one track including the gap.
    pub track_height: f64,
    /// Number of tracks, at least one.
    pub track_count: u32,
}

impl TrackLayout {
    /// Clamps `track` into `0..track_count`.
    #[must_use]
    pub fn clamp(&self, track: u32) -> u32 {
        track.min(self.track_count.saturating_sub(1))
    }

    /// Top edge for content of `height` vertically centered in `track`.
    #[must_use]
    pub fn centered_y(&self, track: u32, height: f64) -> f64 {
        f64::from(track) * self.track_height + (self.track_height - height) / 2.0
    }
}

/// Deterministic xorshift64 generator for random track fallback.
///
/// Interior mutability lets allocators draw from it through a shared
/// [`Context`].
#[derive(Debug)]
pub struct TrackRng {
    state: Cell<u64>,
}

impl TrackRng {
    /// Creates a generator. A zero seed is replaced by a fixed constant since
    /// xorshift has no successor for zero.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self {
            state: Cell::new(seed),
        }
    }

    /// Returns the next raw value.
    pub fn next_u64(&self) -> u64 {
        let mut s = self.state.get();
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.state.set(s);
        s
    }

    /// Returns a value in `0..n`, or 0 when `n == 0`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the remainder is below n, which fits in u32"
    )]
    pub fn next_below(&self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        (self.next_u64() % u64::from(n)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_uses_min_height_and_gap() {
        let cfg = TrackConfig::new();
        let l = cfg.layout(24.0, 100.0);
        assert_eq!(l.track_height, 30.0);
        assert_eq!(l.track_count, 3);

        let l = cfg.layout(10.0, 100.0);
        assert_eq!(l.track_height, 30.0, "short content rounds up to min_height");

        let l = cfg.layout(44.0, 100.0);
        assert_eq!(l.track_height, 50.0);
        assert_eq!(l.track_count, 2);
    }

    #[test]
    fn at_least_one_track() {
        let l = TrackConfig::new().layout(24.0, 0.0);
        assert_eq!(l.track_count, 1);
        assert_eq!(l.clamp(7), 0);
    }

    #[test]
    fn clamp_and_center() {
        let l = TrackLayout {
            track_height: 30.0,
            track_count: 3,
        };
        assert_eq!(l.clamp(1), 1);
        assert_eq!(l.clamp(9), 2);
        assert_eq!(l.centered_y(2, 24.0), 63.0);
    }

    #[test]
    fn rng_is_deterministic_and_bounded() {
        let a = TrackRng::new(42);
        let b = TrackRng::new(42);
        for _ in 0..100 {
            let x = a.next_below(5);
            assert_eq!(x, b.next_below(5), "same seed, same sequence");
            assert!(x < 5, "out of range: {x}");
        }
        assert_eq!(a.next_below(0), 0);
    }

    #[test]
    fn zero_seed_still_advances() {
        let rng = TrackRng::new(0);
        assert_ne!(rng.next_u64(), 0);
    }
}
