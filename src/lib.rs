#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane for
//! which repeatedly squaring `z` and adding `c` never runs off to
//! infinity.  Points outside the set do run off, some faster than
//! others, and how many iterations a point survives is what gives the
//! familiar picture its colors.
//!
//! This crate renders the picture by advancing every pixel's orbit in
//! lockstep, one iteration at a time, and painting each pixel with the
//! color of the iteration on which it escaped.  The pixel grid is split
//! into contiguous partitions that are rendered in parallel, and the
//! progress of each partition is combined into a single percentage
//! that other threads can poll.
//!
//! ```no_run
//! use mandelbrot::{CpuPlotter, Plotter, RenderConfig};
//!
//! let plotter = CpuPlotter::with_all_cores();
//! let raster = plotter.render(&RenderConfig::new(1080, 720, 100)).unwrap();
//! mandelbrot::output::save(&raster, "mandelbrot.png").unwrap();
//! ```

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;
#[cfg(feature = "opencl")]
extern crate ocl;

pub mod color;
pub mod config;
pub mod cpu;
pub mod error;
#[cfg(feature = "opencl")]
pub mod gpu;
pub mod output;
pub mod partition;
pub mod planes;
pub mod plotter;
pub mod point;
pub mod progress;
pub mod raster;

pub use color::{Color, ColorRamp};
pub use config::RenderConfig;
pub use cpu::CpuPlotter;
pub use error::{RenderError, Result};
#[cfg(feature = "opencl")]
pub use gpu::GpuPlotter;
pub use partition::{PartitionPlan, PartitionScheme};
pub use plotter::{Backend, Plotter};
pub use point::Point;
pub use progress::{ProgressAggregator, NOT_STARTED};
pub use raster::Raster;
