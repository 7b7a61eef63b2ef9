// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded pool of named worker threads sharing one job queue.

use std::fmt;
use std::num::NonZero;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::RenderError;

/// A unit of work executed on a pool thread.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Number of workers for a pool capped at `max_workers`.
///
/// `clamp(available_parallelism, 1, max_workers)`; a cap of zero is treated
/// as one.
#[must_use]
pub fn worker_count(max_workers: usize) -> usize {
    thread::available_parallelism()
        .map_or(1, NonZero::get)
        .clamp(1, max_workers.max(1))
}

/// A fixed-size thread pool, started on first use.
///
/// Workers pull jobs from a single `mpsc` queue whose receiver is shared
/// behind a mutex. [`shutdown`](Self::shutdown) closes the queue and joins
/// every worker; it also runs on drop.
pub struct WorkerPool {
    name: &'static str,
    max_workers: usize,
    sender: Option<mpsc::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    shut_down: bool,
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("max_workers", &self.max_workers)
            .field("workers", &self.workers.len())
            .field("started", &self.sender.is_some())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

impl WorkerPool {
    /// Creates an idle pool. Threads are named `{name}-{index}`.
    #[must_use]
    pub fn new(name: &'static str, max_workers: usize) -> Self {
        Self {
            name,
            max_workers,
            sender: None,
            workers: Vec::new(),
            shut_down: false,
        }
    }

    /// Number of running workers (zero until the first job).
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Returns `true` once the workers have been spawned.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.sender.is_some()
    }

    /// Returns `true` after [`shutdown`](Self::shutdown).
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Queues `job`, spawning the workers first if needed.
    pub(crate) fn execute(&mut self, job: Job) -> Result<(), RenderError> {
        if self.shut_down {
            return Err(RenderError::ShutDown);
        }
        if self.sender.is_none() {
            self.start()?;
        }
        let Some(sender) = &self.sender else {
            return Err(RenderError::ShutDown);
        };
        sender.send(job).map_err(|_| RenderError::ShutDown)
    }

    fn start(&mut self) -> Result<(), RenderError> {
        let count = worker_count(self.max_workers);
        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));

        for index in 0..count {
            let rx = Arc::clone(&rx);
            let handle = thread::Builder::new()
                .name(format!("{}-{index}", self.name))
                .spawn(move || worker_loop(&rx));
            match handle {
                Ok(handle) => self.workers.push(handle),
                Err(err) => {
                    warn!(pool = self.name, index, %err, "failed to spawn render worker");
                    // Dropping `tx` releases the workers already running.
                    drop(tx);
                    self.join_workers();
                    return Err(err.into());
                }
            }
        }

        debug!(pool = self.name, workers = count, "render pool started");
        self.sender = Some(tx);
        Ok(())
    }

    /// Closes the job queue and joins every worker.
    ///
    /// Jobs already queued still run. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        drop(self.sender.take());
        let joined = self.workers.len();
        self.join_workers();
        if joined > 0 {
            debug!(pool = self.name, workers = joined, "render pool shut down");
        }
    }

    fn join_workers(&mut self) {
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!(pool = self.name, "render worker panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(rx: &Mutex<mpsc::Receiver<Job>>) {
    loop {
        // The guard is released before the job runs.
        let job = rx.lock().recv();
        match job {
            Ok(job) => job(),
            Err(_) => return,
        }
    }
}
