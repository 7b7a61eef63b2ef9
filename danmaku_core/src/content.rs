// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing contract consumed from the text-rendering collaborator.
//!
//! The engine never shapes text or rasterizes glyphs. A comment carries an
//! `Arc<dyn Content>` which knows its own intrinsic size and how to paint
//! itself into a [`Surface`]. Draw calls run on worker threads, so
//! implementations must be `Send + Sync` and must treat `&self` as immutable.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Size;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Paintable comment content (typically shaped text).
///
/// # Cancellation
///
/// `is_cancelled` must be polled before every costly step and before and
/// after mutating shared visual state. Once it returns `true` the draw should
/// return promptly; whatever was painted is discarded.
pub trait Content: Send + Sync {
    /// Returns the intrinsic size of the content in points, before any effect
    /// padding is applied.
    fn measure(&self) -> Size;

    /// Paints into `surface`, whose logical size is `size`.
    fn draw(&self, surface: &mut Surface, size: Size, is_cancelled: &dyn Fn() -> bool);
}

/// An 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha (255 = opaque).
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white, the fill used when a background is not fully opaque.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a color from its components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns `true` if alpha is 255.
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == u8::MAX
    }
}

/// A CPU pixel buffer (row-major RGBA8) that a draw task renders into.
///
/// The pixel dimensions are the logical size multiplied by the scale factor,
/// rounded up.
#[derive(Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    scale: f64,
    pixels: Vec<u8>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// Allocates a transparent surface for `size` points at `scale`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "surface dimensions are clamped to u32 range before the cast"
    )]
    pub fn new(size: Size, scale: f64) -> Self {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let px = |v: f64| (v * scale).ceil().clamp(0.0, f64::from(u32::MAX)) as u32;
        let (width, height) = (px(size.width), px(size.height));
        Self {
            width,
            height,
            scale,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Points-to-pixels scale factor.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Raw RGBA8 bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable raw RGBA8 bytes.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Fills every pixel with `color`.
    pub fn fill(&mut self, color: Rgba8) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Returns the color at pixel `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[i..i + 4];
        Some(Rgba8::new(p[0], p[1], p[2], p[3]))
    }
}
