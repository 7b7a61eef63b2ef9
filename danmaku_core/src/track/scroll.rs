// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision-checked allocation for scrolling comments.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use super::TrackAllocator;
use crate::comment::{Direction, Trajectory};
use crate::context::Context;
use crate::engine::LayoutPolicy;

/// Scrolling speed and spacing parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollConfig {
    /// Speed of a zero-width comment, in points per second.
    pub base_speed: f64,
    /// Width at which the speed doubles.
    pub length_coefficient: f64,
    /// Minimum horizontal gap to the previous comment in a track.
    pub gap: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollConfig {
    /// 100pt/s base speed, 1300pt length coefficient, 10pt gap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base_speed: 100.0,
            length_coefficient: 1300.0,
            gap: 10.0,
        }
    }

    /// `ceil(base + width / length_coefficient * base)`: longer comments
    /// travel faster so they spend comparable time on screen.
    #[must_use]
    pub fn speed_for(&self, width: f64) -> f64 {
        (self.base_speed + width / self.length_coefficient * self.base_speed).ceil()
    }
}

/// What [`ScrollAllocator`] needs to know about a candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollCandidate {
    /// Kinematics the candidate would have once admitted.
    pub trajectory: Trajectory,
    /// Padded content height.
    pub height: f64,
}

/// Picks the lowest track whose last occupant the candidate cannot catch
/// while both are on screen.
///
/// Falls back to a random track under
/// [`Timely`](LayoutPolicy::Timely) and rejects under
/// [`NonOverlapping`](LayoutPolicy::NonOverlapping).
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollAllocator;

impl TrackAllocator for ScrollAllocator {
    type Candidate = ScrollCandidate;

    fn allocate(&self, candidate: &ScrollCandidate, ctx: &Context<'_>) -> Option<u32> {
        let layout = ctx.track_layout(candidate.height);
        let n = layout.track_count;
        if let Some(track) = (0..n).find(|&track| fits(candidate, track, ctx)) {
            return Some(track);
        }
        match ctx.policy() {
            LayoutPolicy::Timely => Some(ctx.rng().next_below(n)),
            LayoutPolicy::NonOverlapping => None,
        }
    }
}

fn fits(candidate: &ScrollCandidate, track: u32, ctx: &Context<'_>) -> bool {
    let cand = &candidate.trajectory;
    let appear = cand.start;

    let gap = ctx.config().scroll.gap;
    let canvas_width = ctx.canvas_size().width;

    let mut last: Option<Trajectory> = None;
    for (_, peer) in ctx.peers() {
        if peer.track() != Some(track) {
            continue;
        }
        let Some(occupant) = peer.trajectory() else {
            continue;
        };
        // A paused comment's disappear times are stale until it resumes.
        let paused = occupant.frozen_at.is_some();
        if !paused && occupant.did_disappear_time <= appear {
            continue;
        }
        if occupant.direction != cand.direction {
            // Head-on traffic.
            return false;
        }
        if paused {
            if !scroll_admits(gap, cand, &occupant, canvas_width) {
                return false;
            }
        } else if last.is_none_or(|l| occupant.did_disappear_time > l.did_disappear_time) {
            last = Some(occupant);
        }
    }

    last.is_none_or(|occupant| scroll_admits(gap, cand, &occupant, canvas_width))
}

/// Returns whether `candidate` may follow `occupant` in the same track.
///
/// The free distance between the occupant's trailing edge and the canvas
/// entry edge is measured at the candidate's start. It must exceed `gap`,
/// and a faster candidate must not close that distance before its own
/// leading edge reaches the exit side. A paused occupant does not move.
#[must_use]
pub fn scroll_admits(
    gap: f64,
    candidate: &Trajectory,
    occupant: &Trajectory,
    canvas_width: f64,
) -> bool {
    let (x0, x1) = occupant.span_at(candidate.start);
    let distance = match candidate.direction {
        Direction::ToLeft => canvas_width - x1,
        Direction::ToRight => x0,
    };
    if distance <= gap {
        return false;
    }
    let occupant_speed = if occupant.frozen_at.is_some() {
        0.0
    } else {
        occupant.speed
    };
    let closing = candidate.speed - occupant_speed;
    closing <= 0.0 || distance / closing >= canvas_width / candidate.speed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory(start: f64, speed: f64, width: f64) -> Trajectory {
        let canvas = 400.0;
        Trajectory {
            direction: Direction::ToLeft,
            origin_x: canvas,
            start,
            frozen_at: None,
            speed,
            width,
            will_disappear_time: start + canvas / speed,
            did_disappear_time: start + (canvas + width) / speed,
        }
    }

    #[test]
    fn speed_grows_with_width() {
        let cfg = ScrollConfig::new();
        assert_eq!(cfg.speed_for(0.0), 100.0);
        assert_eq!(cfg.speed_for(100.0), 108.0, "ceil(107.69)");
        assert_eq!(cfg.speed_for(1300.0), 200.0);
    }

    #[test]
    fn fast_follower_too_close_is_rejected() {
        // A: w=100 @150 at t=0. B: w=50 @300 at t=0.1.
        let a = trajectory(0.0, 150.0, 100.0);
        let b = trajectory(0.1, 300.0, 50.0);
        assert!(!scroll_admits(10.0, &b, &a, 400.0), "B would overlap A");
    }

    #[test]
    fn slower_follower_with_room_is_admitted() {
        let a = trajectory(0.0, 150.0, 100.0);
        // At t=1 A spans [250, 350]; 50pt of room.
        let b = trajectory(1.0, 120.0, 50.0);
        assert!(scroll_admits(10.0, &b, &a, 400.0), "slower follower never catches up");
    }

    #[test]
    fn gap_must_be_exceeded() {
        let a = trajectory(0.0, 100.0, 100.0);
        // At t=1.5 A spans [250, 350]; exactly 50pt of room.
        let b = trajectory(1.5, 100.0, 50.0);
        assert!(!scroll_admits(50.0, &b, &a, 400.0), "distance equal to gap");
        assert!(scroll_admits(49.0, &b, &a, 400.0), "distance above gap");
    }

    #[test]
    fn faster_follower_admitted_when_catch_up_is_late() {
        let a = trajectory(0.0, 100.0, 100.0);
        // At t=3 A spans [100, 200]: distance 200, closing 20 => 10s to
        // catch up; B reaches the left edge after 400/120 s.
        let b = trajectory(3.0, 120.0, 50.0);
        assert!(scroll_admits(10.0, &b, &a, 400.0), "catch-up happens off screen");

        // Same distance but a much faster follower closes in time.
        let c = trajectory(3.0, 300.0, 50.0);
        assert!(!scroll_admits(10.0, &c, &a, 400.0), "catch-up happens on screen");
    }

    #[test]
    fn paused_occupant_is_caught_by_an_equal_speed_follower() {
        // A paused at t=2 spans [100, 200]; it stays there.
        let a = Trajectory {
            frozen_at: Some(2.0),
            ..trajectory(0.0, 150.0, 100.0)
        };
        let b = trajectory(5.0, 150.0, 50.0);
        assert!(!scroll_admits(10.0, &b, &a, 400.0), "B runs into the parked A");

        let moving = Trajectory {
            frozen_at: None,
            ..a
        };
        assert!(
            scroll_admits(10.0, &b, &moving, 400.0),
            "the same occupant in motion stays ahead"
        );
    }

    #[test]
    fn to_right_distance_is_occupant_left_edge() {
        let a = Trajectory {
            direction: Direction::ToRight,
            origin_x: -100.0,
            ..trajectory(0.0, 150.0, 100.0)
        };
        let b = Trajectory {
            direction: Direction::ToRight,
            origin_x: -50.0,
            ..trajectory(1.0, 150.0, 50.0)
        };
        // At t=1 A's left edge is at 50.
        assert!(scroll_admits(10.0, &b, &a, 400.0), "equal speeds with room");
        assert!(!scroll_admits(60.0, &b, &a, 400.0), "gap larger than room");
    }
}
