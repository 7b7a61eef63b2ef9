// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only scene view handed to lifecycle hooks and allocators.

use core::fmt;

use kurbo::Size;

use crate::canvas::Canvas;
use crate::comment::Comment;
use crate::container::ContainerId;
use crate::engine::{EngineConfig, LayoutPolicy, Scene};
use crate::track::{TrackLayout, TrackRng};

/// What a comment may know about the engine while one of its hooks runs.
///
/// Built per call from the engine's scene and the container's cached engine
/// time; holding one borrows the engine immutably, so hooks cannot mutate
/// other comments.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    container: ContainerId,
    time: f64,
    speed: f64,
    scene: &'a Scene,
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("container", &self.container)
            .field("time", &self.time)
            .field("speed", &self.speed)
            .field("canvas", &self.scene.canvas.size())
            .field("policy", &self.scene.config.policy)
            .finish_non_exhaustive()
    }
}

impl<'a> Context<'a> {
    pub(crate) const fn new(container: ContainerId, time: f64, speed: f64, scene: &'a Scene) -> Self {
        Self {
            container,
            time,
            speed,
            scene,
        }
    }

    /// The container the hook runs for.
    #[must_use]
    pub const fn container(&self) -> ContainerId {
        self.container
    }

    /// Effective engine time cached on the container.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Engine speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// The canvas.
    #[must_use]
    pub fn canvas(&self) -> &'a Canvas {
        &self.scene.canvas
    }

    /// Canvas size in points.
    #[must_use]
    pub fn canvas_size(&self) -> Size {
        self.scene.canvas.size()
    }

    /// Canvas backing scale.
    #[must_use]
    pub fn canvas_scale(&self) -> f64 {
        self.scene.canvas.scale()
    }

    /// Layout policy.
    #[must_use]
    pub fn policy(&self) -> LayoutPolicy {
        self.scene.config.policy
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &'a EngineConfig {
        &self.scene.config
    }

    /// Active containers, oldest first.
    #[must_use]
    pub fn active(&self) -> &'a [ContainerId] {
        &self.scene.active
    }

    /// Pooled containers, next to be recycled first.
    pub fn inactive(&self) -> impl Iterator<Item = ContainerId> + 'a {
        self.scene.pool.inactive()
    }

    /// Active comments other than the one whose hook is running.
    pub fn peers(&self) -> impl Iterator<Item = (ContainerId, &'a Comment)> + 'a {
        let pool = &self.scene.pool;
        self.scene
            .active
            .iter()
            .filter_map(move |&id| Some((id, pool.get(id)?.comment()?)))
    }

    /// Track grid for content of `preferred_height` on this canvas.
    #[must_use]
    pub fn track_layout(&self, preferred_height: f64) -> TrackLayout {
        self.scene
            .config
            .tracks
            .layout(preferred_height, self.scene.canvas.size().height)
    }

    pub(crate) fn rng(&self) -> &'a TrackRng {
        &self.scene.rng
    }
}
