// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate criterion;
extern crate mandelbrot;
extern crate num;

use criterion::Criterion;
use mandelbrot::{CpuPlotter, PartitionScheme, Plotter, RenderConfig};
use num::Complex;

fn render_default_view(c: &mut Criterion) {
    let config = RenderConfig::new(240, 160, 200);
    let plotter = CpuPlotter::with_all_cores();
    c.bench_function("render 240x160 x200", move |b| {
        b.iter(|| plotter.render(&config).unwrap())
    });
}

fn render_single_thread(c: &mut Criterion) {
    let config = RenderConfig::new(240, 160, 200);
    let plotter = CpuPlotter::new(1).with_scheme(PartitionScheme::Strict);
    c.bench_function("render 240x160 x200 single thread", move |b| {
        b.iter(|| plotter.render(&config).unwrap())
    });
}

fn render_seahorse_valley(c: &mut Criterion) {
    let config = RenderConfig::new(240, 160, 1000).with_view(40.0, Complex::new(-0.745, 0.11));
    let plotter = CpuPlotter::with_all_cores();
    c.bench_function("render seahorse valley x1000", move |b| {
        b.iter(|| plotter.render(&config).unwrap())
    });
}

criterion_group!(
    benches,
    render_default_view,
    render_single_thread,
    render_seahorse_valley
);
criterion_main!(benches);
