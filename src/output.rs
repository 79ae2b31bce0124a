// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Persists a finished raster.  The renderer itself knows nothing about
//! files; this is the thin layer between it and the `image` crate.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use failure::Error;
use image::bmp::BMPEncoder;
use image::jpeg::JPEGEncoder;
use image::png::PNGEncoder;
use image::ColorType;

use crate::raster::Raster;

/// Quality used for JPEG output.
const JPEG_QUALITY: u8 = 95;

/// The image formats an output path may name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// `.png`
    Png,
    /// `.bmp`
    Bmp,
    /// `.jpg` or `.jpeg`
    Jpeg,
}

impl OutputFormat {
    /// Pick the format from the path's extension, ignoring case.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_ref().map(String::as_str) {
            Some("png") => Ok(OutputFormat::Png),
            Some("bmp") => Ok(OutputFormat::Bmp),
            Some("jpg") | Some("jpeg") => Ok(OutputFormat::Jpeg),
            _ => Err(format_err!(
                "cannot tell the image format of '{}'; use .png, .bmp, .jpg or .jpeg",
                path.display()
            )),
        }
    }
}

/// Write `raster` to `path` in the format its extension names.
pub fn save<P: AsRef<Path>>(raster: &Raster, path: P) -> Result<(), Error> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)?;
    let (width, height) = (raster.width() as u32, raster.height() as u32);
    let rgb = raster.to_rgb();
    let mut output = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Png => {
            PNGEncoder::new(output).encode(&rgb, width, height, ColorType::RGB(8))?
        }
        OutputFormat::Bmp => {
            BMPEncoder::new(&mut output).encode(&rgb, width, height, ColorType::RGB(8))?
        }
        OutputFormat::Jpeg => JPEGEncoder::new_with_quality(&mut output, JPEG_QUALITY)
            .encode(&rgb, width, height, ColorType::RGB(8))?,
    }
    debug!("wrote {:?} image to {}", format, path.display());
    Ok(())
}
