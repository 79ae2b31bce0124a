// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The CPU escape-time engine.
//!
//! Rather than running each point to completion and then coloring it,
//! the engine runs the whole grid one iteration at a time.  Every
//! point that escapes on iteration `k` is painted with the same
//! color, the ramp's color at `k / iterations`, so the image is
//! banded by how long each point survived.  Points that survive every
//! iteration are never painted and keep the ramp's end color, which
//! the raster is filled with up front.
//!
//! The grid is split into contiguous partitions, one thread each.  A
//! partition owns its slice of points and its band of the raster
//! outright, so the threads share nothing but the read-only ramp and
//! their progress slots.

use std::time::Instant;

use crate::color::ColorRamp;
use crate::config::RenderConfig;
use crate::error::{RenderError, Result};
use crate::partition::{PartitionPlan, PartitionScheme};
use crate::planes::PlaneMapper;
use crate::plotter::Plotter;
use crate::point::Point;
use crate::progress::{ProgressAggregator, ProgressSlots};
use crate::raster::{Band, Raster};

/// Renders on the CPU with a fixed number of worker threads.
#[derive(Debug)]
pub struct CpuPlotter {
    workers: usize,
    scheme: PartitionScheme,
    progress: ProgressAggregator,
}

impl CpuPlotter {
    /// A plotter that splits each render among `workers` threads.
    pub fn new(workers: usize) -> Self {
        CpuPlotter {
            workers,
            scheme: PartitionScheme::default(),
            progress: ProgressAggregator::new(),
        }
    }

    /// A plotter with one thread per logical CPU.
    pub fn with_all_cores() -> Self {
        CpuPlotter::new(num_cpus::get())
    }

    /// Choose how uneven pixel counts are partitioned.
    pub fn with_scheme(mut self, scheme: PartitionScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// The configured number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// Drive one partition through every iteration, painting points in its
/// band as they escape.  Returns early once every point has escaped;
/// nothing is painted after that anyway.
fn plot_partition(
    id: usize,
    points: &mut [Point],
    mut band: Band,
    ramp: &ColorRamp,
    iterations: usize,
    slots: &ProgressSlots,
) -> Result<()> {
    let mut escaped = 0;
    slots.report(id, 0.0);
    for iteration in 0..iterations {
        let color = ramp.color_at(iteration as f64 / iterations as f64)?;
        for (i, point) in points.iter_mut().enumerate() {
            if point.tick() {
                band.write_pixel(i, color);
                escaped += 1;
            }
        }
        if escaped == points.len() {
            trace!(
                "partition {} fully escaped after {} of {} iterations",
                id,
                iteration + 1,
                iterations
            );
            break;
        }
        slots.report(id, (iteration + 1) as f32 / iterations as f32);
    }
    slots.report(id, 1.0);
    Ok(())
}

impl Plotter for CpuPlotter {
    fn render(&self, config: &RenderConfig) -> Result<Raster> {
        config.validate()?;
        let plan = PartitionPlan::new(config.len(), self.workers, self.scheme)?;
        // Every position the engine asks for lies in [0, 1), so checking
        // the start here means the ramp cannot fail mid-render.
        config.ramp.color_at(0.0)?;

        info!(
            "rendering {}x{} for {} iterations on {} cpu partitions",
            config.width,
            config.height,
            config.iterations,
            plan.len()
        );
        let started = Instant::now();

        let plane = PlaneMapper::from_config(config);
        let mut grid: Vec<Point> = plane
            .pixels()
            .map(|pixel| Point::new(plane.pixel_to_point(&pixel)))
            .collect();
        let mut raster = Raster::filled(config.width, config.height, config.ramp.end());
        let slots = self.progress.begin(plan.len());

        {
            let regions = plan.split_mut(&mut grid, 1);
            let bands = raster.bands_mut(&plan);
            let ramp = &config.ramp;
            let iterations = config.iterations;
            let slots = &slots;
            let panicked = || RenderError::ComputeFailure("a cpu worker panicked".to_string());
            let outcomes = crossbeam::scope(|spawner| {
                let handles: Vec<_> = plan
                    .iter()
                    .zip(regions)
                    .zip(bands)
                    .map(|((partition, points), band)| {
                        let id = partition.id;
                        spawner.spawn(move |_| {
                            plot_partition(id, points, band, ramp, iterations, slots)
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join())
                    .collect::<Vec<_>>()
            })
            .map_err(|_| panicked())?;
            for outcome in outcomes {
                outcome.map_err(|_| panicked())??;
            }
        }

        info!(
            "rendered {} pixels in {:.3}s",
            config.len(),
            started.elapsed().as_secs_f32()
        );
        Ok(raster)
    }

    fn progress(&self) -> &ProgressAggregator {
        &self.progress
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}
