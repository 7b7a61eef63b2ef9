// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::{Duration, Instant};

/// Monotonic host timestamps in seconds, for hosts without a display link.
///
/// `now()` is the time since construction, suitable for
/// [`Engine::advance`](danmaku_core::engine::Engine::advance).
#[derive(Clone, Copy, Debug)]
pub struct HostClock {
    origin: Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    /// Starts counting from the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The instant that maps to zero.
    #[must_use]
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Seconds elapsed since [`origin`](Self::origin).
    #[must_use]
    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    /// Converts an instant to this clock's seconds (zero before the origin).
    #[must_use]
    pub fn seconds_at(&self, instant: Instant) -> f64 {
        instant
            .checked_duration_since(self.origin)
            .unwrap_or(Duration::ZERO)
            .as_secs_f64()
    }
}
