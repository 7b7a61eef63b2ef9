// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating comments: pinned in a track for a fixed lifetime.

use kurbo::Point;

use super::{CommentState, Edge};
use crate::context::Context;
use crate::track::TrackLayout;

/// Motion state of a floating comment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatMotion {
    edge: Edge,
    lifetime: f64,
}

impl FloatMotion {
    pub(crate) const fn new(edge: Edge, lifetime: f64) -> Self {
        Self { edge, lifetime }
    }

    /// The edge tracks are filled from.
    #[must_use]
    pub const fn edge(&self) -> Edge {
        self.edge
    }

    /// Seconds the comment stays on the canvas, excluding paused spans.
    #[must_use]
    pub const fn lifetime(&self) -> f64 {
        self.lifetime
    }

    /// Centers horizontally and vertically within the assigned track.
    pub(crate) fn layout(&self, state: &mut CommentState, ctx: &Context<'_>, layout: &TrackLayout) {
        let canvas = ctx.canvas_size();
        let track = state.track.unwrap_or(0);
        state.place(Point::new(
            (canvas.width - state.size.width) / 2.0,
            layout.centered_y(track, state.size.height),
        ));
    }

    /// Never expires while paused.
    pub(crate) fn expired(&self, state: &CommentState, now: f64) -> bool {
        if state.pause_started_at.is_some() || state.appear_time.is_none() {
            return false;
        }
        let elapsed = now - state.shifted_start();
        elapsed > self.lifetime || -elapsed > self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use kurbo::Size;

    use super::*;
    use crate::comment::{Comment, Motion};
    use crate::content::{Content, Surface};

    struct Text;

    impl Content for Text {
        fn measure(&self) -> Size {
            Size::new(20.0, 20.0)
        }

        fn draw(&self, _surface: &mut Surface, _size: Size, _is_cancelled: &dyn Fn() -> bool) {}
    }

    fn admitted_at(t: f64) -> Comment {
        Comment::float(Arc::new(Text), Edge::Top, 3.0).with_appear_time(t)
    }

    fn expired(c: &Comment, now: f64) -> bool {
        let Motion::Float(f) = &c.motion else {
            panic!("expected float motion");
        };
        f.expired(&c.state, now)
    }

    #[test]
    fn expires_after_lifetime() {
        let c = admitted_at(1.0);
        assert!(!expired(&c, 3.9), "still within lifetime");
        assert!(!expired(&c, 4.0), "boundary is inclusive");
        assert!(expired(&c, 4.01), "lifetime elapsed");
    }

    #[test]
    fn backward_seek_also_expires() {
        let c = admitted_at(10.0);
        assert!(expired(&c, 6.0), "distance is absolute");
    }

    #[test]
    fn pause_defers_expiry() {
        let mut c = admitted_at(0.0);
        c.set_paused(true, 1.0);
        assert!(!expired(&c, 100.0), "paused comments never expire");
        c.set_paused(false, 5.0);
        // 4s were paused: lifetime now ends at 7.
        assert!(!expired(&c, 6.9), "paused span must be excluded");
        assert!(expired(&c, 7.1), "lifetime elapsed after resume");
    }
}
