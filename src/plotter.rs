// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The seam between the renderer's callers and its backends.  A
//! backend turns a `RenderConfig` into a `Raster` and exposes how far
//! along it is; which backend to use is always the caller's decision.

use std::fmt;
use std::str::FromStr;

use crate::config::RenderConfig;
use crate::cpu::CpuPlotter;
use crate::error::{RenderError, Result};
use crate::partition::PartitionScheme;
use crate::progress::ProgressAggregator;
use crate::raster::Raster;

/// Anything that can render the Mandelbrot set.  Implementations must
/// produce identical rasters for identical configurations.
pub trait Plotter: Send + Sync {
    /// Render one image.  Blocks until the raster is complete.
    fn render(&self, config: &RenderConfig) -> Result<Raster>;

    /// Progress of the render in flight, readable from other threads.
    fn progress(&self) -> &ProgressAggregator;

    /// A short human readable name for logs.
    fn name(&self) -> &'static str;
}

/// The available backends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// All CPU cores, one thread per partition.
    Cpu,
    /// An OpenCL device.
    Gpu,
}

impl Backend {
    /// Bring up a plotter for this backend.  `workers` and `scheme`
    /// only affect the CPU backend.
    pub fn plotter(self, workers: usize, scheme: PartitionScheme) -> Result<Box<dyn Plotter>> {
        match self {
            Backend::Cpu => Ok(Box::new(CpuPlotter::new(workers).with_scheme(scheme))),
            Backend::Gpu => gpu_plotter(),
        }
    }
}

#[cfg(feature = "opencl")]
fn gpu_plotter() -> Result<Box<dyn Plotter>> {
    Ok(Box::new(crate::gpu::GpuPlotter::new()?))
}

#[cfg(not(feature = "opencl"))]
fn gpu_plotter() -> Result<Box<dyn Plotter>> {
    Err(RenderError::BackendUnavailable(
        "built without the opencl feature".to_string(),
    ))
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Backend::Cpu),
            "gpu" | "opencl" => Ok(Backend::Gpu),
            _ => Err(format!("unknown backend '{}', expected cpu or gpu", s)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Backend::Cpu => write!(f, "cpu"),
            Backend::Gpu => write!(f, "gpu"),
        }
    }
}
