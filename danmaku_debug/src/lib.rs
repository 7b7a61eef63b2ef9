// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, `tracing` forwarding and Chrome trace export
//! for danmaku diagnostics.
//!
//! This crate provides [`TraceSink`](danmaku_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`tracing_sink::TracingSink`]: forwards engine events to `tracing`.
//! - [`recorder::RecorderSink`]: keeps every event with its engine time.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from a
//!   recording, one track per container slot.
//!
//! [`init_logging`] installs a `tracing-subscriber` formatter filtered by
//! `RUST_LOG`.

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod tracing_sink;

use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber writing to stderr.
///
/// The filter comes from `RUST_LOG` when set, otherwise `default_level`
/// (for example `"danmaku_render=debug"`). Returns `false` if a global
/// subscriber was already installed.
pub fn init_logging(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
