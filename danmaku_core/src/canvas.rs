// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overlay surface comments are attached to.

use alloc::vec::Vec;

use kurbo::{Rect, Size};

use crate::container::ContainerId;

/// Canvas bounds, backing scale and the containers attached to it (in
/// attachment order, which is also paint order).
#[derive(Clone, Debug)]
pub struct Canvas {
    size: Size,
    scale: f64,
    attached: Vec<ContainerId>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(Size::ZERO, 1.0)
    }
}

impl Canvas {
    /// Creates an empty canvas.
    #[must_use]
    pub fn new(size: Size, scale: f64) -> Self {
        Self {
            size,
            scale,
            attached: Vec::new(),
        }
    }

    /// Canvas size in points.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Canvas bounds, anchored at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.size.to_rect()
    }

    /// Points-to-pixels scale.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Containers currently attached, bottom first.
    #[must_use]
    pub fn attached(&self) -> &[ContainerId] {
        &self.attached
    }

    /// Returns `true` when either dimension is below one point.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.size.width < 1.0 || self.size.height < 1.0
    }

    /// Sets the size; returns whether it changed.
    pub(crate) fn set_size(&mut self, size: Size) -> bool {
        let changed = self.size != size;
        self.size = size;
        changed
    }

    /// Sets the scale; returns whether it changed.
    pub(crate) fn set_scale(&mut self, scale: f64) -> bool {
        let changed = self.scale != scale;
        self.scale = scale;
        changed
    }

    pub(crate) fn attach(&mut self, id: ContainerId) {
        debug_assert!(!self.attached.contains(&id), "{id:?} attached twice");
        self.attached.push(id);
    }

    pub(crate) fn detach(&mut self, id: ContainerId) {
        self.attached.retain(|&a| a != id);
    }

    pub(crate) fn clear(&mut self) {
        self.attached.clear();
    }
}
