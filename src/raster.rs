// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The output pixel memory.  Pixels are stored row-major, four bytes
//! each, in blue-green-red-alpha order.

use crate::color::Color;
use crate::partition::PartitionPlan;

/// Bytes per pixel.
pub const PIXEL_STRIDE: usize = 4;

/// A finished (or in-progress) image.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    bytes: Vec<u8>,
}

#[inline]
fn store(bytes: &mut [u8], color: Color) {
    bytes[0] = color.b;
    bytes[1] = color.g;
    bytes[2] = color.r;
    bytes[3] = color.a;
}

impl Raster {
    /// Names the channels of each pixel in memory order.
    pub const CHANNEL_ORDER: [char; PIXEL_STRIDE] = ['B', 'G', 'R', 'A'];

    /// A `width x height` raster with every pixel set to `color`.
    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        let bytes = [color.b, color.g, color.r, color.a]
            .iter()
            .cycle()
            .take(width * height * PIXEL_STRIDE)
            .cloned()
            .collect();
        Raster {
            width,
            height,
            bytes,
        }
    }

    /// Wraps existing BGRA memory, which must hold exactly
    /// `width * height` pixels.
    pub fn from_bytes(width: usize, height: usize, bytes: Vec<u8>) -> Option<Self> {
        if bytes.len() != width * height * PIXEL_STRIDE {
            return None;
        }
        Some(Raster {
            width,
            height,
            bytes,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per pixel.
    pub fn stride(&self) -> usize {
        PIXEL_STRIDE
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The color of the pixel at row-major `index`.
    pub fn pixel(&self, index: usize) -> Color {
        let p = &self.bytes[index * PIXEL_STRIDE..(index + 1) * PIXEL_STRIDE];
        Color::rgba(p[2], p[1], p[0], p[3])
    }

    /// Sets the pixel at row-major `index`.
    pub fn write_pixel(&mut self, index: usize, color: Color) {
        let offset = index * PIXEL_STRIDE;
        store(&mut self.bytes[offset..offset + PIXEL_STRIDE], color);
    }

    /// The raw BGRA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Gives up the raw BGRA bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// One exclusive band of the raster per partition of `plan`.
    pub fn bands_mut(&mut self, plan: &PartitionPlan) -> Vec<Band<'_>> {
        plan.split_mut(&mut self.bytes, PIXEL_STRIDE)
            .into_iter()
            .map(|bytes| Band { bytes })
            .collect()
    }

    /// Packed 8-bit RGB, dropping alpha.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.len() * 3);
        for p in self.bytes.chunks(PIXEL_STRIDE) {
            rgb.extend_from_slice(&[p[2], p[1], p[0]]);
        }
        rgb
    }

    /// Packed 8-bit RGBA.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.bytes.len());
        for p in self.bytes.chunks(PIXEL_STRIDE) {
            rgba.extend_from_slice(&[p[2], p[1], p[0], p[3]]);
        }
        rgba
    }
}

/// A run of whole pixels belonging to one partition.  Indices are
/// relative to the start of the band.
#[derive(Debug)]
pub struct Band<'a> {
    bytes: &'a mut [u8],
}

impl<'a> Band<'a> {
    /// Number of pixels in the band.
    pub fn len(&self) -> usize {
        self.bytes.len() / PIXEL_STRIDE
    }

    /// Describes that the band has no pixels.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Sets the pixel `index` places into the band.
    #[inline]
    pub fn write_pixel(&mut self, index: usize, color: Color) {
        let offset = index * PIXEL_STRIDE;
        store(&mut self.bytes[offset..offset + PIXEL_STRIDE], color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::PartitionScheme;

    #[test]
    fn filled_raster_is_bgra() {
        let raster = Raster::filled(3, 2, Color::rgb(1, 2, 3));
        assert_eq!(raster.as_bytes().len(), 3 * 2 * PIXEL_STRIDE);
        assert_eq!(&raster.as_bytes()[..8], &[3, 2, 1, 255, 3, 2, 1, 255]);
        assert!((0..raster.len()).all(|i| raster.pixel(i) == Color::rgb(1, 2, 3)));
    }

    #[test]
    fn write_pixel_touches_one_pixel() {
        let mut raster = Raster::filled(2, 2, Color::BLACK);
        raster.write_pixel(2, Color::rgba(10, 20, 30, 40));
        assert_eq!(&raster.as_bytes()[8..12], &[30, 20, 10, 40]);
        assert_eq!(raster.pixel(1), Color::BLACK);
        assert_eq!(raster.pixel(3), Color::BLACK);
    }

    #[test]
    fn bands_write_to_their_own_pixels() {
        let plan = PartitionPlan::new(5, 2, PartitionScheme::Flexible).unwrap();
        let mut raster = Raster::filled(5, 1, Color::BLACK);
        {
            let mut bands = raster.bands_mut(&plan);
            assert_eq!(bands[0].len(), 3);
            assert_eq!(bands[1].len(), 2);
            bands[1].write_pixel(0, Color::WHITE);
        }
        assert_eq!(raster.pixel(3), Color::WHITE);
        assert_eq!(raster.pixel(2), Color::BLACK);
    }

    #[test]
    fn conversions_reorder_channels() {
        let raster = Raster::filled(1, 1, Color::rgba(1, 2, 3, 4));
        assert_eq!(raster.to_rgb(), vec![1, 2, 3]);
        assert_eq!(raster.to_rgba(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn from_bytes_checks_the_length() {
        assert!(Raster::from_bytes(2, 2, vec![0; 16]).is_some());
        assert!(Raster::from_bytes(2, 2, vec![0; 15]).is_none());
    }
}
