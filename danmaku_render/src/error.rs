// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io;

/// Errors from the render worker pool.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The operating system refused to start a worker thread.
    #[error("failed to spawn render worker: {0}")]
    Spawn(#[from] io::Error),
    /// The pool was shut down; the job was dropped.
    #[error("render pool is shut down")]
    ShutDown,
}
