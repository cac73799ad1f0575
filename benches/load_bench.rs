//! Run with:
//! ```bash
//! RUSTFLAGS="-C target-cpu=native" cargo bench --bench load_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndwindow::{DelayedArray, Ix2, Ix3, LoadError, SliceSink, WindowedDelayedArray, WorkerId};
use rand::{rngs::StdRng, Rng, SeedableRng};

const SEED: u64 = 0xDEAD_BEEF_CAFE_BABE;

/// Build a square 2-D windowed delayed array of side `n`, with a border
/// width of 8 on every side and a stencil-shaped interior returning values
/// from a flat random buffer — mimicking a finite-difference stencil read.
fn build_2d(n: i64, stencil_h: i64) -> (WindowedDelayedArray<Ix2, f32, impl Fn(Ix2) -> Result<f32, LoadError> + Clone, impl Fn(Ix2) -> Result<f32, LoadError> + Clone>, usize)
{
    let mut rng = StdRng::seed_from_u64(SEED);
    let data: Vec<f32> = (0..(n * n)).map(|_| rng.gen::<f32>()).collect();
    let data_border = std::sync::Arc::new(data.clone());
    let data_win = std::sync::Arc::new(data);

    let border = n.min(8);
    let base = DelayedArray::new(Ix2::new([n, n]), move |ix: Ix2| {
        Ok(data_border[(ix.0[0] * n + ix.0[1]) as usize])
    });
    let wd = WindowedDelayedArray::new(
        base,
        Ix2::new([border, border]),
        Ix2::new([n - 2 * border, n - 2 * border]),
        move |ix: Ix2| Ok(data_win[(ix.0[0] * n + ix.0[1]) as usize] * 2.0),
        Some(Ix2::new([stencil_h, stencil_h])),
    );
    (wd, (n * n) as usize)
}

fn bench_seq_vs_par_2d(c: &mut Criterion) {
    let n = 1024i64;
    let (wd, len) = build_2d(n, 4);

    let mut group = c.benchmark_group("load_2d");
    group.throughput(Throughput::Elements(len as u64));

    group.bench_function(BenchmarkId::new("load_seq", format!("{n}x{n}")), |b| {
        b.iter(|| {
            let mut data = vec![0f32; len];
            ndwindow::load_seq(black_box(&wd), &SliceSink::new(&mut data)).unwrap();
            black_box(data);
        })
    });

    for workers in [1usize, 2, 4, 8] {
        let ids: Vec<_> = (0..workers).map(WorkerId).collect();
        group.bench_function(BenchmarkId::new("load_par", format!("{n}x{n}_w{workers}")), |b| {
            b.iter(|| {
                let mut data = vec![0f32; len];
                ndwindow::load_par(&ids, black_box(&wd), &SliceSink::new(&mut data)).unwrap();
                black_box(data);
            })
        });
    }

    group.finish();
}

/// Measures how the unroll factor (the `stencilSize` hint) affects the
/// rank-2 interior throughput in isolation from border overhead by using a
/// full-shape window (no border at all).
fn bench_unroll_factor(c: &mut Criterion) {
    let n = 1024i64;

    let mut group = c.benchmark_group("unroll_factor_2d");
    group.throughput(Throughput::Elements((n * n) as u64));

    for h in [1i64, 3, 7] {
        let mut rng = StdRng::seed_from_u64(SEED);
        let data: Vec<f32> = (0..(n * n)).map(|_| rng.gen::<f32>()).collect();
        let data = std::sync::Arc::new(data);
        let data_at = std::sync::Arc::clone(&data);
        let base = DelayedArray::new(Ix2::new([n, n]), move |ix: Ix2| {
            Ok(data_at[(ix.0[0] * n + ix.0[1]) as usize])
        });
        let wd = WindowedDelayedArray::new(
            base,
            Ix2::new([0, 0]),
            Ix2::new([n, n]),
            move |ix: Ix2| Ok(data[(ix.0[0] * n + ix.0[1]) as usize]),
            Some(Ix2::new([h, h])),
        );

        group.bench_function(BenchmarkId::from_parameter(h), |b| {
            b.iter(|| {
                let mut out = vec![0f32; (n * n) as usize];
                ndwindow::load_seq(black_box(&wd), &SliceSink::new(&mut out)).unwrap();
                black_box(out);
            })
        });
    }

    group.finish();
}

/// 3-D recursive path, parallel scaling by worker count.
fn bench_3d_scaling(c: &mut Criterion) {
    let n = 96i64;
    let mut rng = StdRng::seed_from_u64(SEED);
    let data: Vec<f32> = (0..(n * n * n)).map(|_| rng.gen::<f32>()).collect();
    let data = std::sync::Arc::new(data);
    let data_at = std::sync::Arc::clone(&data);

    let base = DelayedArray::new(Ix3::new([n, n, n]), move |ix: Ix3| {
        Ok(data_at[(ix.0[0] * n * n + ix.0[1] * n + ix.0[2]) as usize])
    });
    let wd = WindowedDelayedArray::new(
        base,
        Ix3::new([4, 4, 4]),
        Ix3::new([n - 8, n - 8, n - 8]),
        move |ix: Ix3| Ok(data[(ix.0[0] * n * n + ix.0[1] * n + ix.0[2]) as usize] * 0.5),
        None,
    );
    let len = (n * n * n) as usize;

    let mut group = c.benchmark_group("load_3d_scaling");
    group.throughput(Throughput::Elements(len as u64));

    for workers in [1usize, 2, 4, 8] {
        let ids: Vec<_> = (0..workers).map(WorkerId).collect();
        group.bench_function(BenchmarkId::from_parameter(workers), |b| {
            b.iter(|| {
                let mut data = vec![0f32; len];
                ndwindow::load_par(&ids, black_box(&wd), &SliceSink::new(&mut data)).unwrap();
                black_box(data);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_seq_vs_par_2d, bench_unroll_factor, bench_3d_scaling);
criterion_main!(benches);
