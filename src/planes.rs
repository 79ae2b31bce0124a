// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes the relationship
//! between the integral pixel plane of the output image, with its
//! origin at the top-left, and the window of the complex plane being
//! rendered.  That window is the classic `[-2, 1] x [-1, 1]` view,
//! shrunk by the zoom factor and shifted by the center offset.
//!
//! The full window is always stretched over the full image, so an
//! image that is not 3:2 will show a squashed or stretched set.  That
//! is how the renderer has always behaved and is left alone.

use itertools::iproduct;
use num::Complex;

use crate::config::RenderConfig;

/// Describes the column, row of a pixel in the image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Width of the unzoomed window on the real axis.
const SPAN_RE: f64 = 3.0;
/// Height of the unzoomed window on the imaginary axis.
const SPAN_IM: f64 = 2.0;
/// Distance from the left edge of the unzoomed window to its center.
const LEFT_RE: f64 = 2.0;
/// Distance from the top edge of the unzoomed window to its center.
const TOP_IM: f64 = 1.0;

/// Maps pixels of a `width x height` image to points on the complex
/// plane.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    width: usize,
    height: usize,
    zoom: f64,
    center: Complex<f64>,
}

impl PlaneMapper {
    /// Constructor.  Takes the image size and the zoom and center of
    /// the window onto the complex plane.  No validation happens here;
    /// that is the job of `RenderConfig::validate`.
    pub fn new(width: usize, height: usize, zoom: f64, center: Complex<f64>) -> Self {
        PlaneMapper {
            width,
            height,
            zoom,
            center,
        }
    }

    /// The mapper for the image and window a configuration describes.
    pub fn from_config(config: &RenderConfig) -> Self {
        PlaneMapper::new(config.width, config.height, config.zoom, config.center)
    }

    /// The total number of pixels in the image.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The column and row of the pixel at row-major `index`.
    pub fn index_to_pixel(&self, index: usize) -> Pixel {
        Pixel(index % self.width, index / self.width)
    }

    /// Given a pixel, find the point of the complex plane at its
    /// top-left corner.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let Pixel(column, row) = *pixel;
        Complex::new(
            (column as f64 * SPAN_RE / self.zoom) / self.width as f64 - LEFT_RE / self.zoom
                + self.center.re,
            (row as f64 * SPAN_IM / self.zoom) / self.height as f64 - TOP_IM / self.zoom
                + self.center.im,
        )
    }

    /// The point for the pixel at row-major `index`.
    pub fn index_to_point(&self, index: usize) -> Complex<f64> {
        self.pixel_to_point(&self.index_to_pixel(index))
    }

    /// Every pixel of the image, in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> {
        iproduct!(0..self.height, 0..self.width).map(|(row, column)| Pixel(column, row))
    }
}
