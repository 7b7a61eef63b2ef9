// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Track allocation, lifecycle scheduling and cancellation primitives for
//! comment overlays ("danmaku").
//!
//! `danmaku_core` decides where and when transient comments appear on a
//! canvas so that they do not collide, moves them with a shared clock, and
//! removes them when their run is over. It is `no_std` compatible (with
//! `alloc`) and never draws anything itself: drawing is delegated to a
//! [`Content`](content::Content) implementation and, typically, to the worker
//! pool in `danmaku_render`.
//!
//! # Architecture
//!
//! ```text
//!   tick source (host timestamps)
//!       │
//!       ▼
//!   Clock::advance ──► Engine lifecycle pass (newest first)
//!                          │  should_remove / resize / update
//!                          ▼
//!                    TransactionBatcher::commit (dedup per slot)
//!                          │
//!                          ▼  once per idle phase
//!   Engine::flush_pending ──► begin_display ──► DrawRequest ──► worker
//!                                                                 │
//!   Engine::publish ◄── Surface (dropped if its CancelToken is stale)
//! ```
//!
//! **[`clock`]** — Pausable, seekable, speed-scaled playback clock.
//!
//! **[`comment`]** — The comment model (`Base`, `Float`, `Scroll`) and the
//! [`Lifecycle`](comment::Lifecycle) hooks.
//!
//! **[`track`]** — Track geometry and the
//! [`TrackAllocator`](track::TrackAllocator) strategies.
//!
//! **[`container`]** — Generational container arena with an inactive pool,
//! plus the [`Sentinel`](container::Sentinel) /
//! [`CancelToken`](container::CancelToken) pair gating asynchronous draws.
//!
//! **[`engine`]** — [`Engine`](engine::Engine): admission, the per-tick
//! lifecycle pass, seek semantics and the display entry points.
//!
//! **[`batch`]** and **[`dirty`]** — Deduplicated per-phase batching on top of
//! `understory_dirty`.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! engine instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod batch;
pub mod canvas;
pub mod clock;
pub mod comment;
pub mod container;
pub mod content;
pub mod context;
pub mod dirty;
pub mod engine;
pub mod trace;
pub mod track;
