//! 1スイープあたりのコストをカーネルごとに比較する
//!
//! Small (129x65x65) の初期化済み格子を使い、nn = 1 のヤコビ反復を計測する。

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use himeno_rust::config::{GridSize, KernelKind, DEFAULT_OMEGA};
use himeno_rust::driver::prepare;
use himeno_rust::implementations::KernelRunner;

fn bench_sweep(c: &mut Criterion) {
    let dims = GridSize::Small.dims();
    let mut group = c.benchmark_group("jacobi/sweep");
    group.throughput(Throughput::Elements(dims.interior_cells() as u64));
    group.sample_size(20);

    let threads = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);

    for kind in [KernelKind::Single, KernelKind::Rayon, KernelKind::Barrier] {
        let runner = KernelRunner::new(kind, threads).expect("runner");
        let mut grid = prepare(dims).expect("grid");

        group.bench_with_input(BenchmarkId::new(format!("{kind:?}"), threads), &threads, |b, _| {
            b.iter(|| black_box(runner.jacobi(&mut grid, DEFAULT_OMEGA, 1)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
