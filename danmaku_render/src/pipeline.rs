// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous draw execution gated by cancellation tokens.
//!
//! [`AsyncRenderPipeline::submit`] moves a [`DrawRequest`] snapshot onto a
//! worker. The task checks the request's [`CancelToken`] before allocating,
//! before drawing, midway (the check is passed into [`Content::draw`]) and
//! after drawing. A cancelled task produces nothing. Finished tasks report
//! back over a channel that the scheduling thread empties with
//! [`drain_completed`](AsyncRenderPipeline::drain_completed), and every
//! surface is re-checked by
//! [`Engine::publish`](danmaku_core::engine::Engine::publish) before it
//! becomes visible.
//!
//! [`Content::draw`]: danmaku_core::content::Content::draw

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use danmaku_core::container::{CancelToken, ContainerId};
use danmaku_core::content::Surface;
use danmaku_core::engine::DrawRequest;
use tracing::{trace, warn};

use crate::{RenderError, WorkerPool};

/// Worker pool configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound on worker threads.
    pub max_workers: usize,
    /// Thread name prefix.
    pub thread_name: &'static str,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Sixteen workers at most, named `danmaku-render-N`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_workers: 16,
            thread_name: "danmaku-render",
        }
    }

    /// Returns a copy with a different worker cap.
    #[must_use]
    pub const fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }
}

/// A surface whose draw ran to completion without being cancelled.
#[derive(Clone, Debug)]
pub struct Completed {
    /// Token captured at submission; hand it to `Engine::publish`.
    pub token: CancelToken,
    /// The rendered pixels.
    pub surface: Surface,
}

impl Completed {
    /// The container the surface was drawn for.
    #[must_use]
    pub fn container(&self) -> ContainerId {
        self.token.container()
    }
}

/// What a worker sends back, drawn or not.
struct Finished {
    token: CancelToken,
    surface: Option<Surface>,
}

/// Submits draw requests to a [`WorkerPool`] and collects the results.
pub struct AsyncRenderPipeline {
    pool: WorkerPool,
    results_tx: mpsc::Sender<Finished>,
    results_rx: mpsc::Receiver<Finished>,
    in_flight: usize,
    cancelled: u64,
}

impl fmt::Debug for AsyncRenderPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRenderPipeline")
            .field("pool", &self.pool)
            .field("in_flight", &self.in_flight)
            .field("cancelled", &self.cancelled)
            .finish_non_exhaustive()
    }
}

impl Default for AsyncRenderPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::new())
    }
}

impl AsyncRenderPipeline {
    /// Creates a pipeline. No thread starts until the first submission.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let (results_tx, results_rx) = mpsc::channel();
        Self {
            pool: WorkerPool::new(config.thread_name, config.max_workers),
            results_tx,
            results_rx,
            in_flight: 0,
            cancelled: 0,
        }
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Tasks submitted but not yet drained.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Tasks that observed cancellation, over the pipeline's lifetime.
    #[must_use]
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }

    /// Queues `request` for drawing. Never blocks on the draw itself.
    pub fn submit(&mut self, request: DrawRequest) -> Result<(), RenderError> {
        let container = request.container;
        let tx = self.results_tx.clone();
        self.pool.execute(Box::new(move || {
            let token = request.token.clone();
            let surface = match panic::catch_unwind(AssertUnwindSafe(|| render(request))) {
                Ok(surface) => surface,
                Err(_) => {
                    warn!(container = ?token.container(), "content draw panicked");
                    None
                }
            };
            // The receiver only disappears with the pipeline.
            _ = tx.send(Finished { token, surface });
        }))?;
        self.in_flight += 1;
        trace!(?container, in_flight = self.in_flight, "draw submitted");
        Ok(())
    }

    /// Returns every result that has arrived, without blocking.
    pub fn drain_completed(&mut self) -> Vec<Completed> {
        let mut out = Vec::new();
        while let Ok(finished) = self.results_rx.try_recv() {
            self.accept(finished, &mut out);
        }
        out
    }

    /// Blocks until every submitted task reported back or `timeout` passed,
    /// returning the completed results.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<Completed> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results_rx.recv_timeout(remaining) {
                Ok(finished) => self.accept(finished, &mut out),
                Err(_) => {
                    warn!(in_flight = self.in_flight, "render pipeline did not settle");
                    break;
                }
            }
        }
        out
    }

    fn accept(&mut self, finished: Finished, out: &mut Vec<Completed>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match finished.surface {
            Some(surface) => out.push(Completed {
                token: finished.token,
                surface,
            }),
            None => {
                self.cancelled += 1;
                trace!(container = ?finished.token.container(), "draw abandoned");
            }
        }
    }

    /// Stops the workers after the queued tasks finish. Later submissions
    /// fail with [`RenderError::ShutDown`].
    pub fn shutdown(&mut self) {
        self.pool.shutdown();
    }
}

/// The drawing body run on a worker.
fn render(request: DrawRequest) -> Option<Surface> {
    let DrawRequest {
        size,
        scale,
        opaque,
        background,
        content,
        token,
        ..
    } = request;

    if token.is_cancelled() {
        return None;
    }
    let mut surface = Surface::new(size, scale);
    if opaque {
        surface.fill(background);
    }
    if token.is_cancelled() {
        return None;
    }
    content.draw(&mut surface, size, &|| token.is_cancelled());
    if token.is_cancelled() {
        return None;
    }
    Some(surface)
}
