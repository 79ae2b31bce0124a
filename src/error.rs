// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The errors a render can fail with.  Every one of them is reported
//! synchronously from `Plotter::render`; a render either returns a
//! complete raster or one of these, never both.

/// Everything that can go wrong between a `RenderConfig` and a `Raster`.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum RenderError {
    /// The configuration cannot be rendered: a zero dimension or
    /// iteration budget, a non-positive zoom, or a pixel count the
    /// strict partitioning scheme cannot divide among its workers.
    /// Raised before any memory for the grid or raster is allocated.
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfiguration(String),

    /// The requested backend could not be brought up.  The caller may
    /// choose another backend; the library never does so on its own.
    #[fail(display = "backend unavailable: {}", _0)]
    BackendUnavailable(String),

    /// The execution substrate failed mid-render.  Not retried.
    #[fail(display = "compute failure: {}", _0)]
    ComputeFailure(String),

    /// A color ramp was asked for a position outside of [0, 1].
    #[fail(display = "ramp position {} is outside of [0, 1]", _0)]
    RampOutOfRange(f64),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RenderError>;
