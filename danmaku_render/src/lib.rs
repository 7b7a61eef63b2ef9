// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Worker-pool render pipeline and frame driver for [`danmaku_core`].
//!
//! The scheduling thread owns the [`Engine`](danmaku_core::engine::Engine);
//! this crate moves the expensive part, drawing comment content into pixel
//! surfaces, onto a bounded pool of threads:
//!
//! - [`WorkerPool`]: named threads sharing one job queue, sized
//!   `clamp(available_parallelism, 1, max_workers)` and started lazily.
//! - [`AsyncRenderPipeline`]: submits draw snapshots and collects the results.
//!   Every task polls its cancellation token at each step; stale work never
//!   produces a surface.
//! - [`Stage`]: one call per frame that advances the engine, flushes the
//!   pending display set, submits draws and publishes finished surfaces.
//! - [`HostClock`]: an `Instant`-based timestamp source for hosts that have
//!   no display link of their own.
//!
//! Diagnostics go through `tracing`; install a subscriber to see them.

mod error;
mod host_clock;
mod pipeline;
mod pool;
mod stage;

pub use error::RenderError;
pub use host_clock::HostClock;
pub use pipeline::{AsyncRenderPipeline, Completed, PipelineConfig};
pub use pool::{WorkerPool, worker_count};
pub use stage::{FrameStats, Stage};
