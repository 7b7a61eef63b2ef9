// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Occupancy-balancing allocation for floating comments.

use alloc::collections::BTreeMap;

use super::TrackAllocator;
use crate::comment::{Edge, Motion};
use crate::context::Context;
use crate::engine::LayoutPolicy;

/// What [`FloatAllocator`] needs to know about a candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatCandidate {
    /// Scan order: `Top` scans `0..n`, `Bottom` scans `n-1..=0`.
    pub edge: Edge,
    /// Padded content height.
    pub height: f64,
}

/// Picks the first empty track in edge order, else the least occupied one.
///
/// Occupancy counts every active floating comment regardless of its edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatAllocator;

impl TrackAllocator for FloatAllocator {
    type Candidate = FloatCandidate;

    fn allocate(&self, candidate: &FloatCandidate, ctx: &Context<'_>) -> Option<u32> {
        let layout = ctx.track_layout(candidate.height);
        let n = layout.track_count;

        // Sparse: only occupied tracks have entries, so a tall canvas costs
        // nothing and the scan below stops at the first gap.
        let mut occupancy: BTreeMap<u32, usize> = BTreeMap::new();
        for (_, peer) in ctx.peers() {
            if let (Motion::Float(_), Some(track)) = (peer.motion(), peer.track()) {
                if track < n {
                    *occupancy.entry(track).or_default() += 1;
                }
            }
        }

        let order = (0..n).map(|i| match candidate.edge {
            Edge::Top => i,
            Edge::Bottom => n - 1 - i,
        });

        let mut least: Option<(u32, usize)> = None;
        for track in order {
            let Some(&count) = occupancy.get(&track) else {
                return Some(track);
            };
            if least.is_none_or(|(_, c)| count < c) {
                least = Some((track, count));
            }
        }

        match ctx.policy() {
            LayoutPolicy::Timely => least.map(|(track, _)| track),
            LayoutPolicy::NonOverlapping => None,
        }
    }
}
