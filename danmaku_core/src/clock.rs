// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scaled playback clock driven by an external frame tick.
//!
//! [`Clock`] turns a stream of host timestamps (seconds, monotonically
//! non-decreasing) into the engine's *effective* time:
//!
//! ```text
//! effective = time + offset
//! time     += (now - previous_tick) * speed      (only while running)
//! ```
//!
//! The clock never reads a time source itself. Backends (a display link, a
//! `requestAnimationFrame` loop, or `danmaku_render::HostClock`) call
//! [`advance`](Clock::advance) once per frame.
//!
//! # States
//!
//! ```text
//!            start            pause
//!   Stopped ──────► Running ◄──────► Paused
//!      ▲                      start     │
//!      └──────────── stop ──────────────┘
//! ```
//!
//! Every transition is idempotent on a state it does not apply to.

/// Run state of a [`Clock`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockState {
    /// Time is zero and does not advance.
    #[default]
    Stopped,
    /// Time advances on every [`Clock::advance`].
    Running,
    /// Time is frozen at its last value.
    Paused,
}

/// Playback clock with pause/resume, offset and speed multiplier.
#[derive(Clone, Debug)]
pub struct Clock {
    state: ClockState,
    /// Accumulated scaled time in seconds.
    time: f64,
    /// Constant shift applied on top of `time`.
    offset: f64,
    /// Non-negative rate multiplier.
    speed: f64,
    /// Host timestamp of the previous tick.
    previous_tick: f64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Creates a stopped clock at time zero with unit speed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ClockState::Stopped,
            time: 0.0,
            offset: 0.0,
            speed: 1.0,
            previous_tick: 0.0,
        }
    }

    /// Returns the current run state.
    #[must_use]
    pub const fn state(&self) -> ClockState {
        self.state
    }

    /// Returns `true` while the clock is advancing.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running)
    }

    /// Starts (or resumes) the clock, using `now` as the reference point for
    /// the next [`advance`](Self::advance).
    pub fn start(&mut self, now: f64) {
        if self.is_running() {
            return;
        }
        self.previous_tick = now;
        self.state = ClockState::Running;
    }

    /// Freezes the clock at its current time.
    pub fn pause(&mut self) {
        if self.is_running() {
            self.state = ClockState::Paused;
        }
    }

    /// Stops the clock and rewinds it to zero.
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.time = 0.0;
        self.previous_tick = 0.0;
    }

    /// Feeds a host timestamp and returns the effective time.
    ///
    /// A `now` earlier than the previous tick contributes no elapsed time.
    pub fn advance(&mut self, now: f64) -> f64 {
        if self.is_running() {
            let elapsed = (now - self.previous_tick).max(0.0);
            self.time += elapsed * self.speed;
        }
        self.previous_tick = now;
        self.effective_time()
    }

    /// Returns `time + offset`.
    #[must_use]
    pub fn effective_time(&self) -> f64 {
        self.time + self.offset
    }

    /// Returns the accumulated scaled time, excluding the offset.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Seeks to `time` (offset excluded). This is a discontinuity, not an
    /// increment.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Returns the offset added to the accumulated time.
    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    /// Sets the offset added to the accumulated time.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// Returns the speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Sets the speed multiplier. Negative values are clamped to zero.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_clock_does_not_advance() {
        let mut clock = Clock::new();
        assert_eq!(clock.advance(5.0), 0.0);
        assert_eq!(clock.state(), ClockState::Stopped);
    }

    #[test]
    fn running_clock_accumulates_elapsed_time() {
        let mut clock = Clock::new();
        clock.start(10.0);
        clock.advance(10.5);
        let t = clock.advance(11.0);
        assert!((t - 1.0).abs() < 1e-9, "expected 1.0, got {t}");
    }

    #[test]
    fn speed_scales_elapsed_time() {
        let mut clock = Clock::new();
        clock.set_speed(2.0);
        clock.start(0.0);
        let t = clock.advance(1.5);
        assert!((t - 3.0).abs() < 1e-9, "expected 3.0, got {t}");
    }

    #[test]
    fn negative_speed_is_clamped() {
        let mut clock = Clock::new();
        clock.set_speed(-1.0);
        assert_eq!(clock.speed(), 0.0);
    }

    #[test]
    fn pause_excludes_paused_duration() {
        let mut clock = Clock::new();
        clock.start(0.0);
        clock.advance(1.0);
        clock.pause();
        // Ticks keep arriving while paused.
        clock.advance(2.0);
        clock.advance(4.0);
        assert!((clock.effective_time() - 1.0).abs() < 1e-9);

        clock.start(4.0);
        let t = clock.advance(4.5);
        assert!((t - 1.5).abs() < 1e-9, "paused span leaked: {t}");
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let mut clock = Clock::new();
        clock.start(0.0);
        clock.advance(1.0);
        // A second start must not reset the reference tick.
        clock.start(100.0);
        let t = clock.advance(2.0);
        assert!((t - 2.0).abs() < 1e-9, "expected 2.0, got {t}");
    }

    #[test]
    fn pause_is_noop_when_stopped() {
        let mut clock = Clock::new();
        clock.pause();
        assert_eq!(clock.state(), ClockState::Stopped);
    }

    #[test]
    fn stop_rewinds_to_zero() {
        let mut clock = Clock::new();
        clock.start(0.0);
        clock.advance(3.0);
        clock.stop();
        assert_eq!(clock.time(), 0.0);
        assert_eq!(clock.state(), ClockState::Stopped);
    }

    #[test]
    fn offset_shifts_effective_time() {
        let mut clock = Clock::new();
        clock.set_offset(-2.0);
        clock.start(0.0);
        let t = clock.advance(5.0);
        assert!((t - 3.0).abs() < 1e-9, "expected 3.0, got {t}");
    }

    #[test]
    fn backwards_host_time_adds_nothing() {
        let mut clock = Clock::new();
        clock.start(10.0);
        clock.advance(9.0);
        assert_eq!(clock.time(), 0.0);
        let t = clock.advance(9.5);
        assert!((t - 0.5).abs() < 1e-9, "expected 0.5, got {t}");
    }

    #[test]
    fn set_time_is_a_seek() {
        let mut clock = Clock::new();
        clock.start(0.0);
        clock.advance(1.0);
        clock.set_time(30.0);
        let t = clock.advance(1.25);
        assert!((t - 30.25).abs() < 1e-9, "expected 30.25, got {t}");
    }
}
