use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use geospace_core::advance::AdvanceKernel;
use geospace_core::chemistry;
use geospace_core::euv::EuvModel;
use geospace_types::config::{ElectroConfig, GeospaceConfig, GridConfig, TimeConfig};

fn bench_config() -> GeospaceConfig {
    let mut config = GeospaceConfig::default();
    config.grid = GridConfig {
        n_lons: 24,
        n_lats: 12,
        n_alts: 16,
        alt_min_m: 100.0e3,
        alt_max_m: 500.0e3,
    };
    config.electro = ElectroConfig {
        n_mlats: 16,
        n_mlons: 16,
        ..ElectroConfig::default()
    };
    config.time = TimeConfig {
        dt_initial_s: 5.0,
        dt_min_s: 0.05,
        dt_max_s: 30.0,
        duration_s: 600.0,
        output_cadence_s: 600.0,
    };
    config
}

fn bench_euv_compute(c: &mut Criterion) {
    let kernel = AdvanceKernel::new(bench_config()).unwrap();
    let model = EuvModel::new(&kernel.config().solar);

    c.bench_function("euv_compute_24x12x16", |b| {
        b.iter(|| {
            let rates = model.compute(kernel.grid(), kernel.neutrals(), 0.0);
            black_box(rates.nightside_clamps)
        })
    });
}

fn bench_chemistry_compute(c: &mut Criterion) {
    let kernel = AdvanceKernel::new(bench_config()).unwrap();
    let model = EuvModel::new(&kernel.config().solar);
    let euv = model.compute(kernel.grid(), kernel.neutrals(), 0.0);

    c.bench_function("chemistry_compute_24x12x16", |b| {
        b.iter(|| {
            let rates = chemistry::compute(kernel.neutrals(), kernel.ions(), &euv);
            black_box(rates.floored)
        })
    });
}

fn bench_full_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_step_24x12x16");
    group.sample_size(10);

    group.bench_function("step", |b| {
        let mut kernel = AdvanceKernel::new(bench_config()).unwrap();
        b.iter(|| {
            let diag = kernel.step().unwrap();
            black_box(diag.retries)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_euv_compute, bench_chemistry_compute, bench_full_step);
criterion_main!(benches);
