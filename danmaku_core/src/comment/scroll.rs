// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scrolling comments: constant-speed travel across the canvas.
//!
//! A scrolling comment starts fully off-canvas on its entry side at its
//! appear time and moves at `real_speed = speed * extra_speed` points per
//! second:
//!
//! ```text
//!   ToLeft:   x(t) = W  - (t - start) * v
//!   ToRight:  x(t) = -w + (t - start) * v
//! ```
//!
//! where `start = appear_time + accumulated_pause` and `t` is frozen at the
//! pause start while the comment is individually paused.

use kurbo::{Point, Rect};

use super::{Comment, CommentState, Direction, Motion};
use crate::context::Context;
use crate::track::TrackLayout;

/// Motion state of a scrolling comment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMotion {
    direction: Direction,
    extra_speed: f64,
    /// Speed derived from the content width at admission.
    speed: f64,
    origin_x: f64,
    /// The leading edge reaches the exit side.
    will_disappear_time: f64,
    /// The trailing edge leaves the canvas.
    did_disappear_time: f64,
}

impl ScrollMotion {
    pub(crate) const fn new(direction: Direction) -> Self {
        Self {
            direction,
            extra_speed: 1.0,
            speed: 0.0,
            origin_x: 0.0,
            will_disappear_time: 0.0,
            did_disappear_time: 0.0,
        }
    }

    /// Travel direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Width-derived speed in points per second (zero before admission).
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Per-comment speed multiplier.
    #[must_use]
    pub const fn extra_speed(&self) -> f64 {
        self.extra_speed
    }

    /// Effective speed: `speed * extra_speed`.
    #[must_use]
    pub fn real_speed(&self) -> f64 {
        self.speed * self.extra_speed
    }

    /// Horizontal position at the appear time.
    #[must_use]
    pub const fn origin_x(&self) -> f64 {
        self.origin_x
    }

    /// Engine time at which the leading edge reaches the exit side.
    #[must_use]
    pub const fn will_disappear_time(&self) -> f64 {
        self.will_disappear_time
    }

    /// Engine time at which the trailing edge leaves the canvas.
    #[must_use]
    pub const fn did_disappear_time(&self) -> f64 {
        self.did_disappear_time
    }

    pub(crate) fn set_extra_speed(&mut self, factor: f64) {
        self.extra_speed = if factor > 0.0 { factor } else { 1.0 };
    }

    /// Returns the kinematics of this comment.
    #[must_use]
    pub fn trajectory(&self, state: &CommentState) -> Trajectory {
        Trajectory {
            direction: self.direction,
            origin_x: self.origin_x,
            start: state.shifted_start(),
            frozen_at: state.pause_started_at,
            speed: self.real_speed(),
            width: state.size.width,
            will_disappear_time: self.will_disappear_time,
            did_disappear_time: self.did_disappear_time,
        }
    }

    /// Fixes speed, entry position and disappear times at admission.
    pub(crate) fn launch(&mut self, state: &CommentState, ctx: &Context<'_>) {
        let width = state.size.width;
        let canvas_width = ctx.canvas_size().width;
        self.speed = ctx.config().scroll.speed_for(width);
        self.origin_x = match self.direction {
            Direction::ToLeft => canvas_width,
            Direction::ToRight => -width,
        };
        let v = self.real_speed();
        self.will_disappear_time = state.shifted_start() + canvas_width / v;
        self.did_disappear_time = self.will_disappear_time + width / v;
    }

    /// Moves both disappear times past a pause span.
    pub(crate) fn shift(&mut self, span: f64) {
        self.will_disappear_time += span;
        self.did_disappear_time += span;
    }

    /// Keeps the speed, recomputes the disappear times from the current
    /// position and re-centers the comment in its track.
    pub(crate) fn layout(
        &mut self,
        state: &mut CommentState,
        ctx: &Context<'_>,
        layout: &TrackLayout,
    ) {
        let now = ctx.time();
        let at = state.pause_started_at.unwrap_or(now);
        let x = self.trajectory(state).x_at(now);
        let width = state.size.width;
        let canvas_width = ctx.canvas_size().width;
        let v = self.real_speed();
        let (lead, trail) = match self.direction {
            Direction::ToLeft => (x, x + width),
            Direction::ToRight => (canvas_width - x - width, canvas_width - x),
        };
        self.will_disappear_time = at + lead / v;
        self.did_disappear_time = at + trail / v;

        let track = state.track.unwrap_or(0);
        state.place(Point::new(x, layout.centered_y(track, state.size.height)));
    }

    pub(crate) fn update(&self, state: &mut CommentState, now: f64) {
        let x = self.trajectory(state).x_at(now);
        state.frame = Rect::from_origin_size(Point::new(x, state.frame.y0), state.size);
    }

    /// Fully past the exit side, judged from the last computed frame.
    pub(crate) fn gone(&self, state: &CommentState, canvas_width: f64) -> bool {
        match self.direction {
            Direction::ToLeft => state.frame.x1 <= 0.0,
            Direction::ToRight => state.frame.x0 >= canvas_width,
        }
    }
}

/// Kinematic snapshot of a scrolling comment, used for collision checks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trajectory {
    /// Travel direction.
    pub direction: Direction,
    /// Position at `start`.
    pub origin_x: f64,
    /// Appear time plus completed pause spans.
    pub start: f64,
    /// Pause start, if the comment is paused.
    pub frozen_at: Option<f64>,
    /// Effective speed.
    pub speed: f64,
    /// Padded width.
    pub width: f64,
    /// See [`ScrollMotion::will_disappear_time`].
    pub will_disappear_time: f64,
    /// See [`ScrollMotion::did_disappear_time`].
    pub did_disappear_time: f64,
}

impl Trajectory {
    /// Left edge at engine time `t`.
    #[must_use]
    pub fn x_at(&self, t: f64) -> f64 {
        let t = self.frozen_at.unwrap_or(t);
        let travelled = (t - self.start) * self.speed;
        match self.direction {
            Direction::ToLeft => self.origin_x - travelled,
            Direction::ToRight => self.origin_x + travelled,
        }
    }

    /// Horizontal extent `(x0, x1)` at engine time `t`.
    #[must_use]
    pub fn span_at(&self, t: f64) -> (f64, f64) {
        let x = self.x_at(t);
        (x, x + self.width)
    }
}

impl Comment {
    /// Returns the kinematics of a scrolling comment.
    #[must_use]
    pub fn trajectory(&self) -> Option<Trajectory> {
        match &self.motion {
            Motion::Scroll(s) => Some(s.trajectory(&self.state)),
            Motion::Base | Motion::Float(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_left() -> Trajectory {
        Trajectory {
            direction: Direction::ToLeft,
            origin_x: 400.0,
            start: 0.0,
            frozen_at: None,
            speed: 150.0,
            width: 100.0,
            will_disappear_time: 400.0 / 150.0,
            did_disappear_time: 500.0 / 150.0,
        }
    }

    #[test]
    fn to_left_moves_toward_zero() {
        let t = to_left();
        assert_eq!(t.x_at(0.0), 400.0);
        assert_eq!(t.x_at(1.0), 250.0);
        assert_eq!(t.span_at(2.0), (100.0, 200.0));
    }

    #[test]
    fn to_right_moves_away_from_zero() {
        let t = Trajectory {
            direction: Direction::ToRight,
            origin_x: -100.0,
            ..to_left()
        };
        assert_eq!(t.x_at(0.0), -100.0);
        assert_eq!(t.x_at(2.0), 200.0);
    }

    #[test]
    fn frozen_trajectory_stops() {
        let t = Trajectory {
            frozen_at: Some(1.0),
            ..to_left()
        };
        assert_eq!(t.x_at(1.0), t.x_at(50.0));
    }

    #[test]
    fn shift_moves_disappear_times() {
        let mut m = ScrollMotion::new(Direction::ToLeft);
        m.will_disappear_time = 2.0;
        m.did_disappear_time = 3.0;
        m.shift(1.5);
        assert_eq!(m.will_disappear_time(), 3.5);
        assert_eq!(m.did_disappear_time(), 4.5);
    }

    #[test]
    fn non_positive_extra_speed_falls_back() {
        let mut m = ScrollMotion::new(Direction::ToLeft);
        m.set_extra_speed(0.0);
        assert_eq!(m.extra_speed(), 1.0);
        m.set_extra_speed(-3.0);
        assert_eq!(m.extra_speed(), 1.0);
        m.set_extra_speed(1.5);
        assert_eq!(m.extra_speed(), 1.5);
    }
}
