// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scheduling engine: admission, per-tick lifecycle and display requests.
//!
//! # Tick
//!
//! Every [`advance`](Engine::advance) feeds the [`Clock`] and then walks the
//! active list in reverse index order:
//!
//! ```text
//!   for each active container (newest first):
//!       inactive or should_remove ─► on_removed, detach, release to pool
//!       needs_layout               ─► resize
//!       needs_redraw               ─► batcher.commit(slot, Display)
//!       always                     ─► update (position at current time)
//! ```
//!
//! # Seek
//!
//! [`set_time`](Engine::set_time) flags every active container inactive. The
//! next tick removes them without asking the comments, since their kinematic
//! projections are meaningless across a time discontinuity. Containers
//! admitted after the seek are unaffected.
//!
//! # Display
//!
//! The render side asks for [`flush_pending`](Engine::flush_pending) once per
//! idle phase, turns each container into a [`Display`] with
//! [`begin_display`](Engine::begin_display), and hands finished surfaces back
//! through [`publish`](Engine::publish), which drops anything stale.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Size;

use crate::batch::{BatchOp, TransactionBatcher};
use crate::canvas::Canvas;
use crate::clock::Clock;
use crate::comment::{Comment, Lifecycle};
use crate::container::{CancelToken, Container, ContainerId, ContainerPool};
use crate::content::{Content, Rgba8, Surface};
use crate::context::Context;
use crate::trace::{
    AdmitEvent, CommitEvent, FlushEvent, LayoutEvent, RejectEvent, RejectReason, RemovalReason,
    RemoveEvent, SeekEvent, TickEvent, Tracer,
};
use crate::track::{ScrollConfig, TrackConfig, TrackRng};

/// What happens when no track qualifies for a new comment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutPolicy {
    /// Show every comment; overlap is accepted when the canvas is full.
    #[default]
    Timely,
    /// Drop comments that would overlap.
    NonOverlapping,
}

/// Engine configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Behavior on a full canvas.
    pub policy: LayoutPolicy,
    /// Track sizing.
    pub tracks: TrackConfig,
    /// Scrolling speed and spacing.
    pub scroll: ScrollConfig,
    /// Seed for the random track fallback.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::timely()
    }
}

impl EngineConfig {
    /// Every comment is shown.
    #[must_use]
    pub const fn timely() -> Self {
        Self {
            policy: LayoutPolicy::Timely,
            tracks: TrackConfig::new(),
            scroll: ScrollConfig::new(),
            seed: 0x5EED,
        }
    }

    /// Comments that cannot be placed without overlap are rejected.
    #[must_use]
    pub const fn non_overlapping() -> Self {
        Self {
            policy: LayoutPolicy::NonOverlapping,
            ..Self::timely()
        }
    }

    /// Replaces the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Veto hook consulted after a comment's own admission succeeded.
pub type AdmissionHook = Box<dyn FnMut(&Comment, &Context<'_>) -> bool>;

/// Everything a [`Context`] can see.
#[derive(Debug)]
pub(crate) struct Scene {
    pub(crate) config: EngineConfig,
    pub(crate) canvas: Canvas,
    pub(crate) pool: ContainerPool,
    pub(crate) active: Vec<ContainerId>,
    pub(crate) rng: TrackRng,
}

impl Scene {
    fn context(&self, id: ContainerId, time: f64, speed: f64) -> Context<'_> {
        Context::new(id, time, speed, self)
    }

    /// Detaches the container at `index` of the active list and returns it to
    /// the pool.
    fn retire(&mut self, index: usize, id: ContainerId) {
        self.active.remove(index);
        self.canvas.detach(id);
        self.pool.release(id);
    }
}

/// Immutable snapshot a worker needs to draw one container.
#[derive(Clone)]
pub struct DrawRequest {
    /// Target container.
    pub container: ContainerId,
    /// Logical size of the surface.
    pub size: Size,
    /// Canvas backing scale.
    pub scale: f64,
    /// Whether to fill [`background`](Self::background) before drawing.
    pub opaque: bool,
    /// Fill color for opaque surfaces.
    pub background: Rgba8,
    /// What to draw.
    pub content: Arc<dyn Content>,
    /// Cancellation token captured at submission.
    pub token: CancelToken,
}

impl fmt::Debug for DrawRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawRequest")
            .field("container", &self.container)
            .field("size", &self.size)
            .field("scale", &self.scale)
            .field("opaque", &self.opaque)
            .field("background", &self.background)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Outcome of [`Engine::begin_display`].
#[derive(Clone, Debug)]
pub enum Display {
    /// Draw asynchronously and [`publish`](Engine::publish) the result.
    Draw(DrawRequest),
    /// Geometry is degenerate; the published surface was cleared.
    Clear,
}

/// The comment scheduling engine.
///
/// Owns the clock, the container arena, the canvas and the batcher. All
/// methods must be called from one thread; only [`CancelToken`]s and
/// [`DrawRequest`]s travel to workers.
pub struct Engine {
    scene: Scene,
    clock: Clock,
    batcher: TransactionBatcher,
    admission_hook: Option<AdmissionHook>,
    tick_index: u64,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("clock", &self.clock)
            .field("canvas", &self.scene.canvas)
            .field("active", &self.scene.active)
            .field("pooled", &self.scene.pool.pooled())
            .field("tick_index", &self.tick_index)
            .field("has_admission_hook", &self.admission_hook.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Creates a stopped engine with an empty zero-sized canvas.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            scene: Scene {
                config,
                canvas: Canvas::default(),
                pool: ContainerPool::new(),
                active: Vec::new(),
                rng: TrackRng::new(config.seed),
            },
            clock: Clock::new(),
            batcher: TransactionBatcher::new(),
            admission_hook: None,
            tick_index: 0,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.scene.config
    }

    /// Returns the clock.
    #[must_use]
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Returns the pending-transaction batcher.
    #[must_use]
    pub const fn batcher(&self) -> &TransactionBatcher {
        &self.batcher
    }

    /// Returns the number of ticks processed.
    #[must_use]
    pub const fn tick_index(&self) -> u64 {
        self.tick_index
    }

    // -- Playback --

    /// Starts or resumes the clock at host time `now`.
    pub fn start(&mut self, now: f64) {
        self.clock.start(now);
    }

    /// Freezes the clock.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Stops the clock, clears the canvas and returns every active container
    /// to the pool.
    pub fn stop(&mut self) {
        self.stop_traced(&mut Tracer::none());
    }

    /// [`stop`](Self::stop) with trace events.
    pub fn stop_traced(&mut self, tracer: &mut Tracer<'_>) {
        let time = self.clock.effective_time();
        let speed = self.clock.speed();
        for index in (0..self.scene.active.len()).rev() {
            let id = self.scene.active[index];
            if let Some(mut comment) = self.scene.pool.take_comment(id) {
                comment.on_removed(&self.scene.context(id, time, speed));
                tracer.remove(&RemoveEvent {
                    tick_index: self.tick_index,
                    container: id,
                    kind: comment.kind(),
                    reason: RemovalReason::Stopped,
                });
            }
            self.scene.retire(index, id);
        }
        self.scene.canvas.clear();
        self.batcher.clear();
        self.clock.stop();
    }

    /// Stops and releases the batcher's storage.
    ///
    /// The engine stays usable; the next commit installs fresh storage.
    pub fn shutdown(&mut self) {
        self.stop();
        self.batcher.teardown();
    }

    // -- Time --

    /// Returns the effective engine time (`clock time + offset`).
    #[must_use]
    pub fn time(&self) -> f64 {
        self.clock.effective_time()
    }

    /// Seeks so that [`time`](Self::time) returns `time`.
    ///
    /// Every currently active container is flagged inactive and removed on the
    /// next tick.
    pub fn set_time(&mut self, time: f64) {
        self.set_time_traced(time, &mut Tracer::none());
    }

    /// [`set_time`](Self::set_time) with trace events.
    pub fn set_time_traced(&mut self, time: f64, tracer: &mut Tracer<'_>) {
        let from = self.clock.effective_time();
        let mut flagged = 0;
        for &id in &self.scene.active {
            if let Some(container) = self.scene.pool.get_mut(id) {
                container.is_active = false;
                flagged += 1;
            }
        }
        self.clock.set_time(time - self.clock.offset());
        tracer.seek(&SeekEvent {
            from,
            to: self.clock.effective_time(),
            flagged,
        });
    }

    /// Returns the offset added to the clock time.
    #[must_use]
    pub const fn offset_time(&self) -> f64 {
        self.clock.offset()
    }

    /// Sets the offset added to the clock time.
    pub fn set_offset_time(&mut self, offset: f64) {
        self.clock.set_offset(offset);
    }

    /// Returns the clock speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.clock.speed()
    }

    /// Sets the clock speed multiplier (clamped to be non-negative).
    pub fn set_speed(&mut self, speed: f64) {
        self.clock.set_speed(speed);
    }

    // -- Canvas --

    /// Returns the canvas.
    #[must_use]
    pub const fn canvas(&self) -> &Canvas {
        &self.scene.canvas
    }

    /// Resizes the canvas. On change, every active comment is relaid out and
    /// redisplayed on the next tick, which also cancels draws still in
    /// flight for the old geometry.
    pub fn set_canvas_size(&mut self, size: Size) {
        if self.scene.canvas.set_size(size) {
            self.for_each_active_comment(|c| {
                c.state.needs_layout = true;
                c.state.needs_redraw = true;
            });
        }
    }

    /// Changes the backing scale. On change, every active comment is redrawn.
    pub fn set_canvas_scale(&mut self, scale: f64) {
        if self.scene.canvas.set_scale(scale) {
            self.for_each_active_comment(|c| c.state.needs_redraw = true);
        }
    }

    fn for_each_active_comment(&mut self, mut f: impl FnMut(&mut Comment)) {
        for &id in &self.scene.active {
            if let Some(comment) = self
                .scene
                .pool
                .get_mut(id)
                .and_then(|c| c.comment.as_mut())
            {
                f(comment);
            }
        }
    }

    // -- Containers --

    /// Active containers, oldest first.
    #[must_use]
    pub fn containers(&self) -> &[ContainerId] {
        &self.scene.active
    }

    /// Returns the container arena.
    #[must_use]
    pub const fn pool(&self) -> &ContainerPool {
        &self.scene.pool
    }

    /// Returns a live container.
    #[must_use]
    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.scene.pool.get(id)
    }

    /// Returns the comment bound to a live container.
    #[must_use]
    pub fn comment(&self, id: ContainerId) -> Option<&Comment> {
        self.scene.pool.get(id)?.comment()
    }

    /// Mutable access for restyling. Content and effect setters schedule
    /// relayout and redraw.
    pub fn comment_mut(&mut self, id: ContainerId) -> Option<&mut Comment> {
        self.scene.pool.get_mut(id)?.comment.as_mut()
    }

    /// Returns the last published surface of a live container.
    #[must_use]
    pub fn surface(&self, id: ContainerId) -> Option<&Surface> {
        self.scene.pool.get(id)?.surface()
    }

    /// Pauses or resumes one comment at the current engine time.
    pub fn set_comment_paused(&mut self, id: ContainerId, paused: bool) -> bool {
        let now = self.clock.effective_time();
        match self.comment_mut(id) {
            Some(comment) => {
                comment.set_paused(paused, now);
                true
            }
            None => false,
        }
    }

    /// Flags a container so the next tick removes it.
    pub fn deactivate(&mut self, id: ContainerId) -> bool {
        match self.scene.pool.get_mut(id) {
            Some(container) if container.comment.is_some() => {
                container.is_active = false;
                true
            }
            _ => false,
        }
    }

    /// Installs a hook that may veto comments after their own admission
    /// succeeded.
    pub fn set_admission_hook(
        &mut self,
        hook: impl FnMut(&Comment, &Context<'_>) -> bool + 'static,
    ) {
        self.admission_hook = Some(Box::new(hook));
    }

    /// Removes the admission hook.
    pub fn clear_admission_hook(&mut self) {
        self.admission_hook = None;
    }

    // -- Admission --

    /// Offers a comment to the canvas.
    ///
    /// Returns the container it was bound to, or `None` when it was rejected
    /// (the comment is dropped; there is no retry).
    pub fn send(&mut self, comment: Comment) -> Option<ContainerId> {
        self.send_traced(comment, &mut Tracer::none())
    }

    /// [`send`](Self::send) with trace events.
    pub fn send_traced(
        &mut self,
        mut comment: Comment,
        tracer: &mut Tracer<'_>,
    ) -> Option<ContainerId> {
        let time = self.clock.effective_time();
        let speed = self.clock.speed();
        let recycled = self.scene.pool.pooled() > 0;
        let id = self.scene.pool.acquire();
        self.scene.pool.refresh(id, time);

        let verdict = {
            let ctx = self.scene.context(id, time, speed);
            if !comment.should_admit(&ctx) {
                Err(RejectReason::NoTrack)
            } else if self
                .admission_hook
                .as_mut()
                .is_some_and(|hook| !hook(&comment, &ctx))
            {
                Err(RejectReason::Vetoed)
            } else {
                Ok(())
            }
        };

        if let Err(reason) = verdict {
            tracer.reject(&RejectEvent {
                time,
                kind: comment.kind(),
                reason,
            });
            self.scene.pool.release(id);
            return None;
        }

        comment.state.needs_layout = true;
        comment.state.needs_redraw = true;
        tracer.admit(&AdmitEvent {
            time,
            container: id,
            kind: comment.kind(),
            track: comment.track(),
            recycled,
        });
        self.scene.pool.put_comment(id, comment);
        self.scene.active.push(id);
        self.scene.canvas.attach(id);
        Some(id)
    }

    // -- Tick --

    /// Feeds a host timestamp to the clock and runs one lifecycle pass.
    /// Returns the effective time.
    pub fn advance(&mut self, now: f64) -> f64 {
        self.advance_traced(now, &mut Tracer::none())
    }

    /// [`advance`](Self::advance) with trace events.
    pub fn advance_traced(&mut self, now: f64, tracer: &mut Tracer<'_>) -> f64 {
        let time = self.clock.advance(now);
        self.tick(time, tracer);
        time
    }

    fn tick(&mut self, time: f64, tracer: &mut Tracer<'_>) {
        self.tick_index += 1;
        let tick_index = self.tick_index;
        let speed = self.clock.speed();
        tracer.tick(&TickEvent {
            tick_index,
            time,
            active: self.scene.active.len(),
        });

        for index in (0..self.scene.active.len()).rev() {
            let id = self.scene.active[index];
            let is_active = self.scene.pool.refresh(id, time);
            let Some(mut comment) = self.scene.pool.take_comment(id) else {
                debug_assert!(false, "active container {id:?} has no comment");
                self.scene.retire(index, id);
                continue;
            };

            let ctx = self.scene.context(id, time, speed);
            let removal = if is_active != Some(true) {
                Some(RemovalReason::Inactive)
            } else if comment.should_remove(&ctx) {
                Some(RemovalReason::Expired)
            } else {
                None
            };

            if let Some(reason) = removal {
                comment.on_removed(&ctx);
                tracer.remove(&RemoveEvent {
                    tick_index,
                    container: id,
                    kind: comment.kind(),
                    reason,
                });
                self.scene.retire(index, id);
                continue;
            }

            if comment.state.needs_layout {
                comment.resize(&ctx);
                comment.state.needs_layout = false;
                tracer.layout(&LayoutEvent {
                    tick_index,
                    container: id,
                    track: comment.track(),
                    frame: comment.frame(),
                });
            }

            if comment.state.needs_redraw {
                self.batcher.commit(id.idx, BatchOp::Display);
                comment.state.needs_redraw = false;
                tracer.commit(&CommitEvent {
                    tick_index,
                    container: id,
                    op: BatchOp::Display,
                });
            }

            comment.update(&ctx);
            self.scene.pool.put_comment(id, comment);
        }
    }

    // -- Display --

    /// Requests a redraw of `id` in the next flush.
    pub fn request_redraw(&mut self, id: ContainerId) -> bool {
        match self.comment_mut(id) {
            Some(comment) => {
                comment.state.needs_redraw = true;
                true
            }
            None => false,
        }
    }

    /// Takes this phase's pending display set, resolved to the comments
    /// currently bound to each slot.
    pub fn flush_pending(&mut self) -> Vec<ContainerId> {
        self.flush_pending_traced(&mut Tracer::none())
    }

    /// [`flush_pending`](Self::flush_pending) with trace events.
    pub fn flush_pending_traced(&mut self, tracer: &mut Tracer<'_>) -> Vec<ContainerId> {
        let commits = self.batcher.commits();
        let pool = &self.scene.pool;
        let flushed: Vec<ContainerId> = self
            .batcher
            .flush_pending()
            .into_iter()
            .filter_map(|(slot, op)| match op {
                BatchOp::Display => pool.current(slot),
            })
            .collect();
        if commits > 0 {
            tracer.flush(&FlushEvent {
                tick_index: self.tick_index,
                commits,
                flushed: flushed.len(),
            });
        }
        flushed
    }

    /// Starts a display of `id`.
    ///
    /// Bumps the container's sentinel, cancelling any draw still in flight,
    /// then returns a draw snapshot. When the comment or the canvas has a
    /// dimension below one point, nothing is drawn and the published surface
    /// is cleared instead.
    pub fn begin_display(&mut self, id: ContainerId) -> Option<Display> {
        let degenerate_canvas = self.scene.canvas.is_degenerate();
        let scale = self.scene.canvas.scale();
        let container = self.scene.pool.get_mut(id)?;
        let comment = container.comment.as_ref()?;
        container.sentinel.increase();

        let size = comment.size();
        if degenerate_canvas || size.width < 1.0 || size.height < 1.0 {
            container.surface = None;
            return Some(Display::Clear);
        }

        Some(Display::Draw(DrawRequest {
            container: id,
            size,
            scale,
            opaque: comment.is_opaque(),
            background: comment.opaque_fill(),
            content: Arc::clone(comment.content()),
            token: container.sentinel.token(id),
        }))
    }

    /// Applies a finished draw. Returns `false` (and drops the surface) when
    /// the token was cancelled or the container is gone.
    pub fn publish(&mut self, token: &CancelToken, surface: Surface) -> bool {
        if token.is_cancelled() {
            return false;
        }
        match self.scene.pool.get_mut(token.container()) {
            Some(container) if container.comment.is_some() => {
                container.surface = Some(surface);
                true
            }
            _ => false,
        }
    }
}
