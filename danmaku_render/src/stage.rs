// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame driver joining an [`Engine`] to an [`AsyncRenderPipeline`].

use std::time::Duration;

use danmaku_core::engine::{Display, Engine};
use tracing::{trace, warn};

use crate::pipeline::Completed;
use crate::{AsyncRenderPipeline, HostClock, PipelineConfig};

/// Counters for one [`Stage::frame`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Effective engine time after the tick.
    pub time: f64,
    /// Draws handed to the worker pool.
    pub submitted: usize,
    /// Containers whose surface was cleared for degenerate geometry.
    pub cleared: usize,
    /// Draws that could not be queued.
    pub failed: usize,
    /// Finished surfaces made visible.
    pub published: usize,
    /// Finished surfaces dropped because they were stale.
    pub discarded: usize,
}

/// Owns the engine and its render pipeline on the scheduling thread.
///
/// Each [`frame`](Self::frame) advances the engine, takes the phase's pending
/// display set once, submits the draws and publishes whatever finished.
#[derive(Debug)]
pub struct Stage {
    engine: Engine,
    pipeline: AsyncRenderPipeline,
    host: HostClock,
}

impl Stage {
    /// Wraps `engine` with a pipeline built from `config`.
    #[must_use]
    pub fn new(engine: Engine, config: PipelineConfig) -> Self {
        Self {
            engine,
            pipeline: AsyncRenderPipeline::new(config),
            host: HostClock::new(),
        }
    }

    /// The engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The engine, for sending comments and changing settings.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// The render pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &AsyncRenderPipeline {
        &self.pipeline
    }

    /// The host clock used by [`start`](Self::start) and
    /// [`frame_now`](Self::frame_now).
    #[must_use]
    pub fn host_clock(&self) -> &HostClock {
        &self.host
    }

    /// Starts (or resumes) the engine clock at the current host time.
    pub fn start(&mut self) {
        self.engine.start(self.host.now());
    }

    /// Runs one frame at host timestamp `now` (seconds).
    pub fn frame(&mut self, now: f64) -> FrameStats {
        let time = self.engine.advance(now);
        let mut stats = FrameStats {
            time,
            ..FrameStats::default()
        };

        for id in self.engine.flush_pending() {
            match self.engine.begin_display(id) {
                Some(Display::Draw(request)) => match self.pipeline.submit(request) {
                    Ok(()) => stats.submitted += 1,
                    Err(err) => {
                        warn!(container = ?id, %err, "draw submission failed");
                        stats.failed += 1;
                    }
                },
                Some(Display::Clear) => stats.cleared += 1,
                None => {}
            }
        }

        let completed = self.pipeline.drain_completed();
        self.publish(completed, &mut stats);
        trace!(
            time,
            submitted = stats.submitted,
            published = stats.published,
            discarded = stats.discarded,
            "frame"
        );
        stats
    }

    /// Runs one frame at the host clock's current time.
    pub fn frame_now(&mut self) -> FrameStats {
        let now = self.host.now();
        self.frame(now)
    }

    /// Waits up to `timeout` for in-flight draws and publishes them. Returns
    /// how many surfaces became visible.
    pub fn settle(&mut self, timeout: Duration) -> usize {
        let completed = self.pipeline.wait_idle(timeout);
        let mut stats = FrameStats::default();
        self.publish(completed, &mut stats);
        stats.published
    }

    fn publish(&mut self, completed: Vec<Completed>, stats: &mut FrameStats) {
        for Completed { token, surface } in completed {
            if self.engine.publish(&token, surface) {
                stats.published += 1;
            } else {
                stats.discarded += 1;
            }
        }
    }

    /// Shuts the engine down (clearing the canvas and the pending set) and
    /// joins the workers.
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
        self.pipeline.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use danmaku_core::comment::{Comment, Direction};
    use danmaku_core::content::{Content, Surface};
    use danmaku_core::engine::EngineConfig;
    use kurbo::Size;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    struct Label(Size);

    impl Content for Label {
        fn measure(&self) -> Size {
            self.0
        }

        fn draw(&self, surface: &mut Surface, _size: Size, _is_cancelled: &dyn Fn() -> bool) {
            surface.pixels_mut()[3] = 0x7f;
        }
    }

    fn label(w: f64, h: f64) -> Arc<dyn Content> {
        Arc::new(Label(Size::new(w, h)))
    }

    fn stage(w: f64, h: f64) -> Stage {
        let mut engine = Engine::new(EngineConfig::timely());
        engine.set_canvas_size(Size::new(w, h));
        engine.start(0.0);
        Stage::new(engine, PipelineConfig::new().with_max_workers(2))
    }

    #[test]
    fn sent_comment_is_drawn_and_published() {
        let mut stage = stage(400.0, 200.0);
        let id = stage
            .engine_mut()
            .send(Comment::base(label(40.0, 20.0)))
            .expect("admitted");

        let stats = stage.frame(0.0);
        assert_eq!(stats.submitted, 1, "one draw");
        assert_eq!(stage.settle(WAIT), 1, "published");

        let surface = stage.engine().surface(id).expect("surface published");
        assert_eq!((surface.width(), surface.height()), (43, 20), "padded width");
    }

    #[test]
    fn redraw_requests_collapse_within_a_frame() {
        let mut stage = stage(400.0, 200.0);
        let id = stage
            .engine_mut()
            .send(Comment::base(label(40.0, 20.0)))
            .expect("admitted");
        stage.frame(0.0);
        stage.settle(WAIT);

        stage.engine_mut().request_redraw(id);
        stage.engine_mut().request_redraw(id);
        let stats = stage.frame(0.1);
        assert_eq!(stats.submitted, 1, "one draw for two requests");
    }

    #[test]
    fn degenerate_canvas_clears_instead_of_drawing() {
        let mut stage = stage(400.0, 0.0);
        stage
            .engine_mut()
            .send(Comment::base(label(40.0, 20.0)))
            .expect("admitted");

        let stats = stage.frame(0.0);
        assert_eq!(stats.submitted, 0, "nothing to draw");
        assert_eq!(stats.cleared, 1, "cleared");
        assert_eq!(stage.pipeline().pool().workers(), 0, "pool never started");
    }

    #[test]
    fn shrinking_to_zero_height_drops_the_in_flight_draw() {
        let mut stage = stage(400.0, 200.0);
        let id = stage
            .engine_mut()
            .send(Comment::base(label(40.0, 20.0)))
            .expect("admitted");
        stage.frame(0.0);

        stage.engine_mut().set_canvas_size(Size::new(400.0, 0.0));
        let stats = stage.frame(0.1);
        assert_eq!(stats.cleared, 1, "redisplay clears");
        stage.settle(WAIT);
        assert!(stage.engine().surface(id).is_none(), "no surface update");
    }

    #[test]
    fn surfaces_of_removed_comments_are_discarded() {
        let mut stage = stage(300.0, 100.0);
        let id = stage
            .engine_mut()
            .send(Comment::scroll(label(20.0, 20.0), Direction::ToLeft))
            .expect("admitted");
        stage.frame(0.0);
        stage.engine_mut().deactivate(id);
        stage.frame(0.1);

        assert_eq!(stage.settle(WAIT), 0, "stale surface dropped");
        assert!(stage.engine().containers().is_empty(), "removed");
        assert!(stage.engine().surface(id).is_none(), "nothing visible");
    }

    #[test]
    fn frames_after_shutdown_do_not_submit() {
        let mut stage = stage(400.0, 200.0);
        stage.shutdown();
        assert!(!stage.engine().batcher().is_installed(), "batcher torn down");
        stage.engine_mut().start(0.0);
        stage
            .engine_mut()
            .send(Comment::base(label(40.0, 20.0)))
            .expect("admitted");

        let stats = stage.frame(0.0);
        assert_eq!(stats.failed, 1, "pool is closed");
        assert_eq!(stats.submitted, 0, "nothing queued");
    }
}
