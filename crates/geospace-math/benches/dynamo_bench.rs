use criterion::{criterion_group, criterion_main, Criterion};
use geospace_math::multigrid::{multigrid_solve, MultigridConfig};
use geospace_math::sor::{sor_step, ShellOperator};
use ndarray::Array2;
use std::hint::black_box;

fn shell_problem(nlat: usize, nlon: usize) -> (ShellOperator, Array2<f64>) {
    let mut op = ShellOperator::uniform(nlat, nlon, 1.0);
    // conductance-like latitude profile
    for j in 0..=nlat {
        for i in 0..nlon {
            op.coef_lat[[j, i]] = 0.1 + 5.0 * ((j as f64 / nlat as f64) * 2.5).exp();
        }
    }
    let source = Array2::from_shape_fn((nlat, nlon), |(j, i)| {
        ((i as f64 * 0.26).sin() * (j as f64 * 0.2).cos()) * 0.1
    });
    (op, source)
}

fn bench_sor_sweep_44x48(c: &mut Criterion) {
    let (op, source) = shell_problem(44, 48);
    let mut phi = Array2::zeros((44, 48));

    c.bench_function("sor_sweep_44x48", |b| {
        b.iter(|| sor_step(&mut phi, &source, &op, 1.5))
    });
}

fn bench_sor_sweep_88x96(c: &mut Criterion) {
    let (op, source) = shell_problem(88, 96);
    let mut phi = Array2::zeros((88, 96));

    c.bench_function("sor_sweep_88x96", |b| {
        b.iter(|| sor_step(&mut phi, &source, &op, 1.5))
    });
}

fn bench_multigrid_vs_sor(c: &mut Criterion) {
    let (op, source) = shell_problem(88, 96);

    let mut group = c.benchmark_group("dynamo_solve_88x96");
    group.sample_size(10);

    group.bench_function("sor_200_sweeps", |b| {
        b.iter(|| {
            let mut phi = Array2::zeros((88, 96));
            for _ in 0..200 {
                sor_step(&mut phi, &source, &op, 1.5);
            }
            black_box(phi[[44, 48]]);
        })
    });

    group.bench_function("multigrid_10_cycles", |b| {
        b.iter(|| {
            let mut phi = Array2::zeros((88, 96));
            let _ = multigrid_solve(&mut phi, &source, &op, &MultigridConfig::default(), 10, 0.0);
            black_box(phi[[44, 48]]);
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sor_sweep_44x48,
    bench_sor_sweep_88x96,
    bench_multigrid_vs_sor
);
criterion_main!(benches);
