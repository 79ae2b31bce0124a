// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colors and the two-color ramp used to paint escaped points.  A
//! point's color encodes how long it survived: everything that escapes
//! on iteration `k` of `n` gets `ramp.color_at(k / n)`, and whatever
//! never escapes keeps the ramp's end color.

use std::str::FromStr;

use crate::error::{RenderError, Result};

/// An 8-bit-per-channel color.  Alpha is carried through the ramp but
/// the usual endpoints are opaque.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha; 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque blue.
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    /// A color with an explicit alpha channel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }
}

/// Parses `r,g,b` or `r g b`, each channel a decimal byte.
impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let channels: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|c| !c.is_empty())
            .collect();
        if channels.len() != 3 {
            return Err(format!("expected three channels as r,g,b but got '{}'", s));
        }
        let mut rgb = [0u8; 3];
        for (slot, channel) in rgb.iter_mut().zip(channels) {
            *slot = u8::from_str(channel)
                .map_err(|_| format!("'{}' is not a channel value between 0 and 255", channel))?;
        }
        Ok(Color::rgb(rgb[0], rgb[1], rgb[2]))
    }
}

/// A linear interpolation between two colors.  Stateless beyond its
/// endpoints, so it can be shared freely between workers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorRamp {
    start: Color,
    end: Color,
}

fn lerp(start: u8, end: u8, percentage: f64) -> u8 {
    let delta = f64::from(i16::from(end) - i16::from(start));
    (i16::from(start) + (delta * percentage) as i16) as u8
}

impl ColorRamp {
    /// A ramp from `start` (points that escape immediately) to `end`
    /// (points that never escape).
    pub fn new(start: Color, end: Color) -> Self {
        ColorRamp { start, end }
    }

    /// The color at position 0.
    pub fn start(&self) -> Color {
        self.start
    }

    /// The color at position 1, and the color of the set's interior.
    pub fn end(&self) -> Color {
        self.end
    }

    /// The color `percentage` of the way from start to end.  Each
    /// channel is truncated toward the start color.
    pub fn color_at(&self, percentage: f64) -> Result<Color> {
        if !(0.0..=1.0).contains(&percentage) {
            return Err(RenderError::RampOutOfRange(percentage));
        }
        Ok(Color::rgba(
            lerp(self.start.r, self.end.r, percentage),
            lerp(self.start.g, self.end.g, percentage),
            lerp(self.start.b, self.end.b, percentage),
            lerp(self.start.a, self.end.a, percentage),
        ))
    }

    /// The color for every iteration of an `iterations`-long render:
    /// entry `k` is `color_at(k / iterations)`.
    pub fn palette(&self, iterations: usize) -> Result<Vec<Color>> {
        (0..iterations)
            .map(|k| self.color_at(k as f64 / iterations as f64))
            .collect()
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        ColorRamp::new(Color::BLACK, Color::BLUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        let ramp = ColorRamp::new(Color::rgb(10, 20, 30), Color::rgb(200, 100, 0));
        assert_eq!(ramp.color_at(0.0).unwrap(), Color::rgb(10, 20, 30));
        assert_eq!(ramp.color_at(1.0).unwrap(), Color::rgb(200, 100, 0));
    }

    #[test]
    fn midpoint_truncates_toward_start() {
        let ramp = ColorRamp::new(Color::BLACK, Color::BLUE);
        assert_eq!(ramp.color_at(0.5).unwrap(), Color::rgb(0, 0, 127));

        // Descending channels must not wrap around.
        let ramp = ColorRamp::new(Color::WHITE, Color::BLACK);
        assert_eq!(ramp.color_at(0.5).unwrap(), Color::rgb(128, 128, 128));
    }

    #[test]
    fn out_of_range_is_rejected() {
        let ramp = ColorRamp::default();
        assert_eq!(ramp.color_at(-0.1), Err(RenderError::RampOutOfRange(-0.1)));
        assert_eq!(ramp.color_at(1.01), Err(RenderError::RampOutOfRange(1.01)));
        assert!(ramp.color_at(std::f64::NAN).is_err());
    }

    #[test]
    fn palette_has_one_color_per_iteration() {
        let ramp = ColorRamp::new(Color::BLACK, Color::rgb(0, 0, 100));
        let palette = ramp.palette(4).unwrap();
        assert_eq!(palette.len(), 4);
        assert_eq!(palette[0], Color::BLACK);
        assert_eq!(palette[1], Color::rgb(0, 0, 25));
        assert_eq!(palette[3], Color::rgb(0, 0, 75));
    }

    #[test]
    fn parses_channel_triples() {
        assert_eq!("0,0,255".parse::<Color>(), Ok(Color::BLUE));
        assert_eq!("255 255 255".parse::<Color>(), Ok(Color::WHITE));
        assert!("1,2".parse::<Color>().is_err());
        assert!("1,2,300".parse::<Color>().is_err());
    }
}
