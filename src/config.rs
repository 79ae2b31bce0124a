// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! What to render.

use std::mem::size_of;

use num::Complex;

use crate::color::ColorRamp;
use crate::error::{RenderError, Result};
use crate::point::Point;
use crate::raster::PIXEL_STRIDE;

/// No single allocation may exceed this many bytes.
const MAX_ALLOCATION: usize = std::isize::MAX as usize;

/// Whether `len` items of `size` bytes fit in one allocation.
fn fits(len: usize, size: usize) -> bool {
    match len.checked_mul(size) {
        Some(bytes) => bytes <= MAX_ALLOCATION,
        None => false,
    }
}

/// The complete description of one image: its size, how hard to look
/// for escapes, where on the complex plane to look, and how to paint
/// the result.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Number of iterations before a point is declared a member of the
    /// set.
    pub iterations: usize,
    /// Magnification of the `[-2, 1] x [-1, 1]` window.  Must be
    /// positive.
    pub zoom: f64,
    /// Offset of the window from the origin.
    pub center: Complex<f64>,
    /// Colors for escaped points; the end color paints the interior.
    pub ramp: ColorRamp,
}

impl RenderConfig {
    /// A configuration with the default window and colors.
    pub fn new(width: usize, height: usize, iterations: usize) -> Self {
        RenderConfig {
            width,
            height,
            iterations,
            ..RenderConfig::default()
        }
    }

    /// Replace the window onto the complex plane.
    pub fn with_view(mut self, zoom: f64, center: Complex<f64>) -> Self {
        self.zoom = zoom;
        self.center = center;
        self
    }

    /// Replace the color ramp.
    pub fn with_ramp(mut self, ramp: ColorRamp) -> Self {
        self.ramp = ramp;
        self
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that this configuration can be rendered at all.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(RenderError::InvalidConfiguration(msg.to_string()));
        if self.width == 0 {
            return invalid("width must be positive");
        }
        if self.height == 0 {
            return invalid("height must be positive");
        }
        if self.iterations == 0 {
            return invalid("iteration count must be positive");
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return invalid("zoom must be a positive number");
        }
        if !(self.center.re.is_finite() && self.center.im.is_finite()) {
            return invalid("center must be a finite coordinate");
        }
        let len = match self.width.checked_mul(self.height) {
            Some(len) => len,
            None => return invalid("image is too large"),
        };
        if !fits(len, PIXEL_STRIDE) || !fits(len, size_of::<Point>()) {
            return invalid("image is too large to allocate");
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 1080,
            height: 720,
            iterations: 100,
            zoom: 1.0,
            center: Complex::new(0.0, 0.0),
            ramp: ColorRamp::default(),
        }
    }
}
