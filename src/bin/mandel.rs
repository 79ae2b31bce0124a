// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate crossbeam;
extern crate env_logger;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate mandelbrot;
extern crate num;
extern crate num_cpus;

use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

use clap::{App, Arg, ArgMatches};
use crossbeam::channel::{self, RecvTimeoutError};
use failure::Error;
use num::Complex;

use mandelbrot::output::{self, OutputFormat};
use mandelbrot::{
    Backend, Color, ColorRamp, PartitionScheme, Plotter, Raster, RenderConfig, RenderError,
    NOT_STARTED,
};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const ZOOM: &str = "zoom";
const ITERATIONS: &str = "iterations";
const THREADS: &str = "threads";
const START_COLOR: &str = "start-color";
const END_COLOR: &str = "end-color";
const BACKEND: &str = "backend";
const STRICT: &str = "strict";
const FORCE: &str = "force";

const MAX_THREADS: usize = 256;
const REPORT_INTERVAL: Duration = Duration::from_millis(300);

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Escape-time Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (.png, .bmp, .jpg or .jpeg)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1080x720")
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(CENTER)
                .required(false)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0,0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
                .help("Offset of the view from the origin, as re,im"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .required(false)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse zoom",
                        "Zoom must be a positive number",
                    )
                })
                .help("Magnification of the [-2, 1] x [-1, 1] view"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000000",
                    )
                })
                .help("Number of iterations before a point counts as inside the set"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        MAX_THREADS,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", MAX_THREADS),
                    )
                })
                .help("Number of threads to use in solver [default: all cores]"),
        )
        .arg(
            Arg::with_name(START_COLOR)
                .required(false)
                .long(START_COLOR)
                .takes_value(true)
                .default_value("0,0,0")
                .validator(|s| Color::from_str(&s).map(|_| ()))
                .help("Color of points that escape immediately, as r,g,b"),
        )
        .arg(
            Arg::with_name(END_COLOR)
                .required(false)
                .long(END_COLOR)
                .takes_value(true)
                .default_value("0,0,255")
                .validator(|s| Color::from_str(&s).map(|_| ()))
                .help("Color of points that never escape, as r,g,b"),
        )
        .arg(
            Arg::with_name(BACKEND)
                .required(false)
                .long(BACKEND)
                .short("b")
                .takes_value(true)
                .default_value("cpu")
                .validator(|s| Backend::from_str(&s).map(|_| ()))
                .help("Where to compute: cpu or gpu"),
        )
        .arg(
            Arg::with_name(STRICT)
                .long(STRICT)
                .help("Require the pixel count to divide evenly among the threads"),
        )
        .arg(
            Arg::with_name(FORCE)
                .long(FORCE)
                .short("f")
                .help("Overwrite the output file if it exists"),
        )
        .get_matches()
}

/// Everything the command line asked for, parsed.
struct Job<'a> {
    output: &'a Path,
    config: RenderConfig,
    threads: usize,
    scheme: PartitionScheme,
    backend: Backend,
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Error> {
    matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing value for --{}", name))
}

fn parse<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    let raw = value(matches, name)?;
    T::from_str(raw).map_err(|_| format_err!("could not parse --{} '{}'", name, raw))
}

fn job<'a>(matches: &'a ArgMatches) -> Result<Job<'a>, Error> {
    let (width, height) = parse_pair::<u32>(value(matches, SIZE)?, 'x')
        .ok_or_else(|| format_err!("Error parsing image dimensions"))?;
    let center = parse_complex(value(matches, CENTER)?)
        .ok_or_else(|| format_err!("Error parsing center point"))?;
    let threads = if matches.is_present(THREADS) {
        parse(matches, THREADS)?
    } else {
        num_cpus::get()
    };
    let config = RenderConfig::new(width as usize, height as usize, parse(matches, ITERATIONS)?)
        .with_view(parse(matches, ZOOM)?, center)
        .with_ramp(ColorRamp::new(
            parse(matches, START_COLOR)?,
            parse(matches, END_COLOR)?,
        ));
    let scheme = if matches.is_present(STRICT) {
        PartitionScheme::Strict
    } else {
        PartitionScheme::Flexible
    };
    Ok(Job {
        output: Path::new(value(matches, OUTPUT)?),
        config,
        threads,
        scheme,
        backend: parse(matches, BACKEND)?,
    })
}

/// Refuse an output path before spending any time rendering into it.
fn check_output(path: &Path, force: bool) -> Result<OutputFormat, Error> {
    let format = OutputFormat::from_path(path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            bail!("directory '{}' does not exist", parent.display());
        }
    }
    if path.exists() && !force {
        bail!(
            "'{}' already exists; pass --force to overwrite it",
            path.display()
        );
    }
    Ok(format)
}

fn plotter_for(job: &Job) -> Result<Box<dyn Plotter>, Error> {
    match job.backend.plotter(job.threads, job.scheme) {
        Err(RenderError::BackendUnavailable(why)) if job.backend != Backend::Cpu => {
            warn!("{} backend unavailable ({}), falling back to cpu", job.backend, why);
            eprintln!("   {} backend unavailable: {}; using cpu", job.backend, why);
            Ok(Backend::Cpu.plotter(job.threads, job.scheme)?)
        }
        plotter => Ok(plotter?),
    }
}

fn report(progress: f32) {
    let mut stderr = std::io::stderr();
    if progress <= NOT_STARTED {
        let _ = write!(stderr, "\r   Initializing");
    } else {
        let _ = write!(stderr, "\r   {}% complete     ", (progress * 100.0) as u32);
    }
    let _ = stderr.flush();
}

/// Render while a second thread polls and prints the progress.
fn render_with_progress(plotter: &dyn Plotter, config: &RenderConfig) -> Result<Raster, Error> {
    let (done, finished) = channel::bounded::<()>(0);
    let raster = crossbeam::scope(|spawner| {
        let finished = &finished;
        spawner.spawn(move |_| loop {
            match finished.recv_timeout(REPORT_INTERVAL) {
                Err(RecvTimeoutError::Timeout) => report(plotter.progress().overall()),
                _ => break,
            }
        });
        let raster = plotter.render(config);
        drop(done);
        raster
    })
    .map_err(|_| format_err!("progress reporter panicked"))?;
    report(plotter.progress().overall());
    eprintln!();
    Ok(raster?)
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let job = job(matches)?;
    let format = check_output(job.output, matches.is_present(FORCE))?;
    job.config.validate()?;
    let plotter = plotter_for(&job)?;

    let config = &job.config;
    let (start, end) = (config.ramp.start(), config.ramp.end());
    eprintln!("-- Starting");
    eprintln!("   Iterations         : {}", config.iterations);
    eprintln!("   Size               : {}x{}", config.width, config.height);
    eprintln!("   Center             : ({} ; {})", config.center.re, config.center.im);
    eprintln!("   Zoom               : {}", config.zoom);
    eprintln!("   Start color (RGB)  : {} {} {}", start.r, start.g, start.b);
    eprintln!("   End color (RGB)    : {} {} {}", end.r, end.g, end.b);
    eprintln!("   Threads            : {}", job.threads);
    eprintln!("   Backend            : {}", plotter.name());

    let started = Instant::now();
    let raster = render_with_progress(&*plotter, config)?;
    eprintln!("-- Done in {:.3}s", started.elapsed().as_secs_f32());

    eprintln!("-- Saving {:?} to {}", format, job.output.display());
    output::save(&raster, job.output)?;
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
