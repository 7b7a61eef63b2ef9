// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The comment model and its lifecycle hooks.
//!
//! A [`Comment`] is a shared [`CommentState`] (content, size, frame, track,
//! pause bookkeeping, dirty flags) plus exactly one [`Motion`] variant:
//!
//! | Variant | Placement | Removal |
//! |---|---|---|
//! | [`Motion::Base`] | centered, track 0 | never (seek, stop or deactivation only) |
//! | [`Motion::Float`] | centered in a track picked from the edge | lifetime elapsed |
//! | [`Motion::Scroll`] | enters from one side of a collision-checked track | fully off-canvas |
//!
//! The engine drives every comment through the [`Lifecycle`] hooks with a
//! [`Context`] describing the rest of the scene.

mod float;
mod scroll;

use alloc::sync::Arc;
use core::fmt;

use kurbo::{Point, Rect, Size};

pub use float::FloatMotion;
pub use scroll::{ScrollMotion, Trajectory};

use crate::content::{Content, Rgba8};
use crate::context::Context;
use crate::engine::LayoutPolicy;
use crate::track::{FloatAllocator, FloatCandidate, ScrollAllocator, ScrollCandidate};
use crate::track::{TrackAllocator, TrackLayout};

/// Per-tick hooks the engine invokes on every comment.
///
/// Ordering within one tick for an active comment: [`should_remove`], then
/// (if layout is pending) [`resize`], then [`update`]. [`should_admit`] runs
/// once, from `send`, before the comment becomes active.
///
/// [`should_admit`]: Lifecycle::should_admit
/// [`resize`]: Lifecycle::resize
/// [`update`]: Lifecycle::update
/// [`should_remove`]: Lifecycle::should_remove
pub trait Lifecycle {
    /// Decides admission and, when admitted, assigns a track and initial
    /// frame.
    fn should_admit(&mut self, ctx: &Context<'_>) -> bool;

    /// Recomputes size and track geometry after a content or canvas change.
    fn resize(&mut self, ctx: &Context<'_>);

    /// Recomputes the position for the context's time.
    fn update(&mut self, ctx: &Context<'_>);

    /// Returns `true` once the comment has finished its run.
    fn should_remove(&self, ctx: &Context<'_>) -> bool;

    /// Called right before the container returns to the pool.
    fn on_removed(&mut self, ctx: &Context<'_>) {
        _ = ctx;
    }
}

/// Decorative effect drawn around the content. Affects layout padding only;
/// painting it is the content's job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EffectStyle {
    /// No effect.
    #[default]
    None,
    /// Outlined glyphs.
    Stroke,
    /// Drop shadow.
    Shadow,
    /// Outer glow.
    Glow,
}

impl EffectStyle {
    /// Horizontal padding added to the measured content width.
    #[must_use]
    pub const fn padding(self) -> f64 {
        match self {
            Self::Stroke => 5.0,
            Self::None | Self::Shadow | Self::Glow => 3.0,
        }
    }
}

/// Which canvas edge a floating comment stacks from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Fill tracks from the top down.
    #[default]
    Top,
    /// Fill tracks from the bottom up.
    Bottom,
}

/// Travel direction of a scrolling comment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Enters at the right edge, exits at the left.
    #[default]
    ToLeft,
    /// Enters at the left edge, exits at the right.
    ToRight,
}

/// Variant tag, for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// [`Motion::Base`].
    Base,
    /// [`Motion::Float`].
    Float,
    /// [`Motion::Scroll`].
    Scroll,
}

/// Variant-specific motion policy.
#[derive(Clone, Debug)]
pub enum Motion {
    /// No motion: centered and never removed by itself.
    Base,
    /// Stationary for a fixed lifetime.
    Float(FloatMotion),
    /// Travels across the canvas at constant speed.
    Scroll(ScrollMotion),
}

/// State shared by every comment variant.
#[derive(Clone)]
pub struct CommentState {
    pub(crate) content: Arc<dyn Content>,
    pub(crate) effect: EffectStyle,
    pub(crate) background: Option<Rgba8>,
    pub(crate) opaque: bool,
    /// `None` until admission, which fills in the engine time.
    pub(crate) appear_time: Option<f64>,
    pub(crate) size: Size,
    pub(crate) frame: Rect,
    pub(crate) track: Option<u32>,
    pub(crate) pause_started_at: Option<f64>,
    pub(crate) accumulated_pause: f64,
    pub(crate) needs_redraw: bool,
    pub(crate) needs_layout: bool,
}

impl fmt::Debug for CommentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommentState")
            .field("effect", &self.effect)
            .field("appear_time", &self.appear_time)
            .field("frame", &self.frame)
            .field("track", &self.track)
            .field("paused", &self.pause_started_at.is_some())
            .field("accumulated_pause", &self.accumulated_pause)
            .finish_non_exhaustive()
    }
}

impl CommentState {
    fn new(content: Arc<dyn Content>) -> Self {
        Self {
            content,
            effect: EffectStyle::None,
            background: None,
            opaque: false,
            appear_time: None,
            size: Size::ZERO,
            frame: Rect::ZERO,
            track: None,
            pause_started_at: None,
            accumulated_pause: 0.0,
            needs_redraw: false,
            needs_layout: false,
        }
    }

    /// Remeasures the content and applies effect padding.
    fn measure(&mut self) {
        let m = self.content.measure();
        self.size = Size::new(m.width + self.effect.padding(), m.height);
    }

    /// Appear time plus every completed pause span.
    fn shifted_start(&self) -> f64 {
        self.appear_time.unwrap_or(0.0) + self.accumulated_pause
    }

    fn place(&mut self, origin: Point) {
        self.frame = Rect::from_origin_size(origin, self.size);
    }

    fn center(&mut self, canvas: Size) {
        self.place(Point::new(
            (canvas.width - self.size.width) / 2.0,
            (canvas.height - self.size.height) / 2.0,
        ));
    }
}

/// A comment: shared state plus one motion variant.
#[derive(Clone, Debug)]
pub struct Comment {
    pub(crate) state: CommentState,
    pub(crate) motion: Motion,
}

impl Comment {
    /// A comment without motion.
    #[must_use]
    pub fn base(content: Arc<dyn Content>) -> Self {
        Self {
            state: CommentState::new(content),
            motion: Motion::Base,
        }
    }

    /// A floating comment shown for `lifetime` seconds.
    #[must_use]
    pub fn float(content: Arc<dyn Content>, edge: Edge, lifetime: f64) -> Self {
        Self {
            state: CommentState::new(content),
            motion: Motion::Float(FloatMotion::new(edge, lifetime)),
        }
    }

    /// A comment scrolling across the canvas in `direction`.
    #[must_use]
    pub fn scroll(content: Arc<dyn Content>, direction: Direction) -> Self {
        Self {
            state: CommentState::new(content),
            motion: Motion::Scroll(ScrollMotion::new(direction)),
        }
    }

    /// Sets an explicit appear time instead of the admission time.
    #[must_use]
    pub fn with_appear_time(mut self, time: f64) -> Self {
        self.state.appear_time = Some(time);
        self
    }

    /// Sets the effect style.
    #[must_use]
    pub fn with_effect(mut self, effect: EffectStyle) -> Self {
        self.state.effect = effect;
        self
    }

    /// Sets a background color, painted before the content when the comment
    /// is opaque.
    #[must_use]
    pub fn with_background(mut self, color: Rgba8) -> Self {
        self.state.background = Some(color);
        self
    }

    /// Marks the comment's surface as opaque.
    #[must_use]
    pub fn with_opaque(mut self, opaque: bool) -> Self {
        self.state.opaque = opaque;
        self
    }

    /// Multiplies a scrolling comment's speed. Ignored by other variants;
    /// non-positive factors fall back to 1.
    #[must_use]
    pub fn with_extra_speed(mut self, factor: f64) -> Self {
        if let Motion::Scroll(s) = &mut self.motion {
            s.set_extra_speed(factor);
        }
        self
    }

    /// Returns the variant tag.
    #[must_use]
    pub const fn kind(&self) -> CommentKind {
        match self.motion {
            Motion::Base => CommentKind::Base,
            Motion::Float(_) => CommentKind::Float,
            Motion::Scroll(_) => CommentKind::Scroll,
        }
    }

    /// Returns the motion policy.
    #[must_use]
    pub const fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Returns the drawable content.
    #[must_use]
    pub fn content(&self) -> &Arc<dyn Content> {
        &self.state.content
    }

    /// Replaces the content; relayout and redraw follow on the next tick.
    pub fn set_content(&mut self, content: Arc<dyn Content>) {
        self.state.content = content;
        self.state.needs_layout = true;
        self.state.needs_redraw = true;
    }

    /// Returns the effect style.
    #[must_use]
    pub const fn effect(&self) -> EffectStyle {
        self.state.effect
    }

    /// Changes the effect style; relayout and redraw follow on the next tick.
    pub fn set_effect(&mut self, effect: EffectStyle) {
        if self.state.effect != effect {
            self.state.effect = effect;
            self.state.needs_layout = true;
            self.state.needs_redraw = true;
        }
    }

    /// Returns the background color.
    #[must_use]
    pub const fn background(&self) -> Option<Rgba8> {
        self.state.background
    }

    /// Changes the background color and schedules a redraw.
    pub fn set_background(&mut self, color: Option<Rgba8>) {
        if self.state.background != color {
            self.state.background = color;
            self.state.needs_redraw = true;
        }
    }

    /// Returns whether the surface is drawn opaque.
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        self.state.opaque
    }

    /// The fill painted under opaque content: the background when it is
    /// fully opaque, white otherwise.
    #[must_use]
    pub fn opaque_fill(&self) -> Rgba8 {
        match self.state.background {
            Some(color) if color.is_opaque() => color,
            _ => Rgba8::WHITE,
        }
    }

    /// Returns the appear time, once known.
    #[must_use]
    pub const fn appear_time(&self) -> Option<f64> {
        self.state.appear_time
    }

    /// Returns the padded content size from the last layout.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.state.size
    }

    /// Returns the placement on the canvas.
    #[must_use]
    pub const fn frame(&self) -> Rect {
        self.state.frame
    }

    /// Returns the assigned track, if admitted.
    #[must_use]
    pub const fn track(&self) -> Option<u32> {
        self.state.track
    }

    /// Returns `true` while individually paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.state.pause_started_at.is_some()
    }

    /// Total time spent individually paused, excluding a pause in progress.
    #[must_use]
    pub const fn accumulated_pause(&self) -> f64 {
        self.state.accumulated_pause
    }

    /// Returns whether a redraw is pending.
    #[must_use]
    pub const fn needs_redraw(&self) -> bool {
        self.state.needs_redraw
    }

    /// Returns whether a relayout is pending.
    #[must_use]
    pub const fn needs_layout(&self) -> bool {
        self.state.needs_layout
    }

    /// Pauses or resumes this comment at engine time `now`.
    ///
    /// The paused span is excluded from the comment's timeline: a float's
    /// lifetime and a scroll's position both continue where they stopped.
    pub fn set_paused(&mut self, paused: bool, now: f64) {
        if paused {
            if self.state.pause_started_at.is_none() {
                self.state.pause_started_at = Some(now);
            }
        } else if let Some(started) = self.state.pause_started_at.take() {
            let span = (now - started).max(0.0);
            self.state.accumulated_pause += span;
            if let Motion::Scroll(s) = &mut self.motion {
                s.shift(span);
            }
        }
    }

    fn track_layout(&self, ctx: &Context<'_>) -> TrackLayout {
        ctx.track_layout(self.state.size.height)
    }
}

impl Lifecycle for Comment {
    fn should_admit(&mut self, ctx: &Context<'_>) -> bool {
        self.state.appear_time.get_or_insert(ctx.time());
        self.state.measure();
        let height = self.state.size.height;

        let track = match &mut self.motion {
            Motion::Base => Some(0),
            Motion::Float(f) => FloatAllocator.allocate(
                &FloatCandidate {
                    edge: f.edge(),
                    height,
                },
                ctx,
            ),
            Motion::Scroll(s) => {
                s.launch(&self.state, ctx);
                ScrollAllocator.allocate(
                    &ScrollCandidate {
                        trajectory: s.trajectory(&self.state),
                        height,
                    },
                    ctx,
                )
            }
        };

        let track = match (track, ctx.policy()) {
            (Some(track), _) => track,
            (None, LayoutPolicy::NonOverlapping) => return false,
            (None, LayoutPolicy::Timely) => {
                debug_assert!(false, "timely allocation produced no track");
                0
            }
        };
        self.state.track = Some(track);
        self.resize(ctx);
        true
    }

    fn resize(&mut self, ctx: &Context<'_>) {
        self.state.measure();
        let layout = self.track_layout(ctx);
        if let Some(track) = self.state.track {
            self.state.track = Some(layout.clamp(track));
        }
        match &mut self.motion {
            Motion::Base => self.state.center(ctx.canvas_size()),
            Motion::Float(f) => f.layout(&mut self.state, ctx, &layout),
            Motion::Scroll(s) => s.layout(&mut self.state, ctx, &layout),
        }
    }

    fn update(&mut self, ctx: &Context<'_>) {
        if let Motion::Scroll(s) = &self.motion {
            s.update(&mut self.state, ctx.time());
        }
    }

    fn should_remove(&self, ctx: &Context<'_>) -> bool {
        match &self.motion {
            Motion::Base => false,
            Motion::Float(f) => f.expired(&self.state, ctx.time()),
            Motion::Scroll(s) => s.gone(&self.state, ctx.canvas_size().width),
        }
    }

    fn on_removed(&mut self, _ctx: &Context<'_>) {
        self.state.track = None;
        self.state.needs_layout = false;
        self.state.needs_redraw = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Surface;

    struct Text(Size);

    impl Content for Text {
        fn measure(&self) -> Size {
            self.0
        }

        fn draw(&self, _surface: &mut Surface, _size: Size, _is_cancelled: &dyn Fn() -> bool) {}
    }

    fn text(w: f64, h: f64) -> Arc<dyn Content> {
        Arc::new(Text(Size::new(w, h)))
    }

    #[test]
    fn effect_padding() {
        assert_eq!(EffectStyle::Stroke.padding(), 5.0);
        assert_eq!(EffectStyle::Shadow.padding(), 3.0);
        assert_eq!(EffectStyle::Glow.padding(), 3.0);
        assert_eq!(EffectStyle::None.padding(), 3.0);
    }

    #[test]
    fn measure_applies_padding() {
        let mut c = Comment::base(text(40.0, 20.0)).with_effect(EffectStyle::Stroke);
        c.state.measure();
        assert_eq!(c.size(), Size::new(45.0, 20.0));
    }

    #[test]
    fn set_effect_marks_dirty_only_on_change() {
        let mut c = Comment::base(text(10.0, 10.0));
        c.set_effect(EffectStyle::None);
        assert!(!c.needs_layout(), "unchanged effect must not dirty");
        c.set_effect(EffectStyle::Glow);
        assert!(c.needs_layout() && c.needs_redraw());
    }

    #[test]
    fn opaque_fill_requires_fully_opaque_background() {
        let c = Comment::base(text(1.0, 1.0)).with_background(Rgba8::new(10, 20, 30, 128));
        assert_eq!(c.opaque_fill(), Rgba8::WHITE);
        let c = c.with_background(Rgba8::new(10, 20, 30, 255));
        assert_eq!(c.opaque_fill(), Rgba8::new(10, 20, 30, 255));
        let c = Comment::base(text(1.0, 1.0));
        assert_eq!(c.opaque_fill(), Rgba8::WHITE);
    }

    #[test]
    fn pause_accumulates_span() {
        let mut c = Comment::float(text(1.0, 1.0), Edge::Top, 3.0);
        c.set_paused(true, 1.0);
        c.set_paused(true, 1.5);
        assert!(c.is_paused());
        c.set_paused(false, 3.0);
        assert!(!c.is_paused());
        assert_eq!(c.accumulated_pause(), 2.0);
        // Resuming twice is a no-op.
        c.set_paused(false, 10.0);
        assert_eq!(c.accumulated_pause(), 2.0);
    }

    #[test]
    fn extra_speed_only_applies_to_scroll() {
        let c = Comment::float(text(1.0, 1.0), Edge::Top, 3.0).with_extra_speed(2.0);
        assert_eq!(c.kind(), CommentKind::Float);
        let c = Comment::scroll(text(1.0, 1.0), Direction::ToLeft).with_extra_speed(2.0);
        let Motion::Scroll(s) = c.motion() else {
            panic!("expected scroll motion");
        };
        assert_eq!(s.extra_speed(), 2.0);
    }
}
