// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An OpenCL backend.  One work item per pixel runs that pixel's orbit
//! to completion; since every pixel escaping on iteration `k` is
//! painted `palette[k]` either way, the result is the same image the
//! CPU engine produces one iteration at a time.
//!
//! The host computes the palette and pre-fills the raster so that both
//! backends share those steps exactly.  The kernel needs double
//! precision, and turns off contraction so that no fused multiply-add
//! can make it disagree with the CPU.

use std::time::Instant;

use ocl::enums::{DeviceInfo, DeviceInfoResult};
use ocl::{flags, Buffer, Device, Platform, ProQue};

use crate::config::RenderConfig;
use crate::error::{RenderError, Result};
use crate::plotter::Plotter;
use crate::progress::ProgressAggregator;
use crate::raster::{Raster, PIXEL_STRIDE};

static KERNEL: &str = r#"
#pragma OPENCL EXTENSION cl_khr_fp64 : enable
#pragma OPENCL FP_CONTRACT OFF

__kernel void escape(__global uchar *raster,
                     __global const uchar *palette,
                     const uint width,
                     const uint height,
                     const uint iterations,
                     const double zoom,
                     const double center_re,
                     const double center_im)
{
    const uint i = get_global_id(0);
    const uint column = i % width;
    const uint row = i / width;
    const double cr = ((double)column * 3.0 / zoom) / (double)width - 2.0 / zoom + center_re;
    const double ci = ((double)row * 2.0 / zoom) / (double)height - 1.0 / zoom + center_im;

    double zr = cr;
    double zi = ci;
    for (uint k = 0; k < iterations; k++) {
        const double next = zr * zr - zi * zi + cr;
        zi = zr * zi + zi * zr + ci;
        zr = next;
        if (zr * zr + zi * zi >= 4.0) {
            for (uint b = 0; b < 4; b++) {
                raster[i * 4 + b] = palette[k * 4 + b];
            }
            return;
        }
    }
}
"#;

fn unavailable<E: ToString>(e: E) -> RenderError {
    RenderError::BackendUnavailable(e.to_string())
}

fn compute_failure(e: ocl::Error) -> RenderError {
    RenderError::ComputeFailure(e.to_string())
}

/// The kernel indexes raster and palette bytes with 32-bit integers.
fn check_device_limits(config: &RenderConfig) -> Result<()> {
    let limit = u32::max_value() as usize;
    let bytes = config.len().checked_mul(PIXEL_STRIDE);
    let palette = config.iterations.checked_mul(PIXEL_STRIDE);
    match (bytes, palette) {
        (Some(bytes), Some(palette)) if bytes <= limit && palette <= limit => Ok(()),
        _ => Err(RenderError::InvalidConfiguration(
            "raster and palette must each fit in 4 GiB on the gpu".to_string(),
        )),
    }
}

fn supports_doubles(device: &Device) -> bool {
    match device.info(DeviceInfo::Extensions) {
        Ok(DeviceInfoResult::Extensions(extensions)) => extensions.contains("cl_khr_fp64"),
        _ => false,
    }
}

/// Renders on the first OpenCL GPU with double precision support.
pub struct GpuPlotter {
    que: ProQue,
    progress: ProgressAggregator,
}

impl GpuPlotter {
    /// Find a device and compile the kernel for it.  Any failure here
    /// is reported as `BackendUnavailable`.
    pub fn new() -> Result<Self> {
        let mut candidates = vec![];
        for platform in Platform::list() {
            let devices =
                Device::list(&platform, Some(flags::DEVICE_TYPE_GPU)).map_err(unavailable)?;
            candidates.extend(devices.into_iter().map(|device| (platform.clone(), device)));
        }
        let (platform, device) = candidates
            .into_iter()
            .find(|(_, device)| supports_doubles(device))
            .ok_or_else(|| unavailable("no OpenCL GPU with cl_khr_fp64 support"))?;
        info!(
            "using opencl device {}",
            device.name().unwrap_or_else(|_| "<unnamed>".to_string())
        );

        let que = ProQue::builder()
            .platform(platform)
            .device(device)
            .src(KERNEL)
            .build()
            .map_err(unavailable)?;
        Ok(GpuPlotter {
            que,
            progress: ProgressAggregator::new(),
        })
    }

    fn launch(
        &self,
        config: &RenderConfig,
        palette: &[u8],
        raster: &mut [u8],
    ) -> ocl::Result<()> {
        let pixels = Buffer::<u8>::builder()
            .queue(self.que.queue().clone())
            .flags(flags::MEM_READ_WRITE)
            .len(raster.len())
            .copy_host_slice(&*raster)
            .build()?;
        let colors = Buffer::<u8>::builder()
            .queue(self.que.queue().clone())
            .flags(flags::MEM_READ_ONLY)
            .len(palette.len())
            .copy_host_slice(palette)
            .build()?;

        let kernel = self
            .que
            .kernel_builder("escape")
            .arg(&pixels)
            .arg(&colors)
            .arg(config.width as u32)
            .arg(config.height as u32)
            .arg(config.iterations as u32)
            .arg(config.zoom)
            .arg(config.center.re)
            .arg(config.center.im)
            .global_work_size(config.len())
            .build()?;

        unsafe {
            kernel.enq()?;
        }
        pixels.read(raster).enq()?;
        self.que.finish()
    }
}

impl Plotter for GpuPlotter {
    fn render(&self, config: &RenderConfig) -> Result<Raster> {
        config.validate()?;
        check_device_limits(config)?;
        let mut palette = Vec::with_capacity(config.iterations * PIXEL_STRIDE);
        for color in config.ramp.palette(config.iterations)? {
            palette.extend_from_slice(&[color.b, color.g, color.r, color.a]);
        }

        info!(
            "rendering {}x{} for {} iterations on the gpu",
            config.width, config.height, config.iterations
        );
        let started = Instant::now();
        let slots = self.progress.begin(1);
        slots.report(0, 0.0);

        let mut bytes = Raster::filled(config.width, config.height, config.ramp.end()).into_bytes();
        self.launch(config, &palette, &mut bytes).map_err(compute_failure)?;
        slots.report(0, 1.0);

        info!(
            "rendered {} pixels in {:.3}s",
            config.len(),
            started.elapsed().as_secs_f32()
        );
        Raster::from_bytes(config.width, config.height, bytes).ok_or_else(|| {
            RenderError::ComputeFailure("device returned a short raster".to_string())
        })
    }

    fn progress(&self) -> &ProgressAggregator {
        &self.progress
    }

    fn name(&self) -> &'static str {
        "gpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_follow_the_byte_count_not_the_sides() {
        assert!(check_device_limits(&RenderConfig::new(16384, 16384, 1000)).is_ok());
        // Each side fits in 32 bits, but 2^30 pixels are 2^32 bytes.
        assert!(check_device_limits(&RenderConfig::new(32768, 32768, 1000)).is_err());
        assert!(check_device_limits(&RenderConfig::new(8, 8, 1 << 30)).is_err());
    }
}
