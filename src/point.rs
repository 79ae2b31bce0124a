// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The orbit of a single pixel.  The Mandelbrot iteration is
//! `z <- z^2 + c`; a point belongs to the set if `z` stays bounded.
//! Once `|z|` reaches 2 it is guaranteed to run off to infinity, so
//! that is where we stop.  Unlike the usual formulation, the orbit
//! starts at `z = c` rather than `z = 0`, which just skips the
//! trivial first step.

use num::Complex;

/// The squared escape radius.
pub const ESCAPE_RADIUS_SQR: f64 = 4.0;

/// Iteration state for one pixel.  `c` is fixed at construction; `z`
/// moves on every tick until the point escapes and then never again.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    c: Complex<f64>,
    z: Complex<f64>,
    ticks: usize,
    escaped: bool,
}

impl Point {
    /// A fresh orbit for the coordinate `c`.
    pub fn new(c: Complex<f64>) -> Self {
        Point {
            c,
            z: c,
            ticks: 0,
            escaped: false,
        }
    }

    /// Advance the orbit by one iteration.  Returns true exactly once,
    /// on the tick where the escape threshold is first crossed.  After
    /// that, ticking is a no-op that returns false.  Values that
    /// overflow to infinity compare as escaped, and a NaN orbit never
    /// does.
    #[inline]
    pub fn tick(&mut self) -> bool {
        if self.escaped {
            return false;
        }
        self.z = self.z * self.z + self.c;
        self.ticks += 1;
        if self.z.norm_sqr() >= ESCAPE_RADIUS_SQR {
            self.escaped = true;
            return true;
        }
        false
    }

    /// Whether the orbit has left the escape radius.
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    /// The zero-based tick on which the point escaped, if it has.
    pub fn escape_iteration(&self) -> Option<usize> {
        if self.escaped {
            Some(self.ticks - 1)
        } else {
            None
        }
    }

    /// The fixed coordinate of this orbit.
    pub fn c(&self) -> Complex<f64> {
        self.c
    }

    /// The current iterate.
    pub fn z(&self) -> Complex<f64> {
        self.z
    }
}
