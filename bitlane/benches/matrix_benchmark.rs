use bitlane::BitMatrix;
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::prelude::*;

pub fn transpose_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("BitMatrix::transposed");
    for size in [64usize, 256usize, 1024usize, 4096usize] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, size| {
            bencher.iter_batched(
                || random_bitmatrix(*size, *size),
                |matrix| matrix.transposed(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

pub fn row_xor_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("BitMatrix::add_into_row");
    for size in [256usize, 1024usize, 4096usize] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, size| {
            bencher.iter_batched(
                || random_bitmatrix(2, *size),
                |mut matrix| {
                    matrix.add_into_row(0, 1);
                    matrix
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, transpose_benchmark, row_xor_benchmark);
criterion_main!(benches);

fn random_bitmatrix(rows: usize, columns: usize) -> BitMatrix {
    BitMatrix::random_with_rng(rows, columns, &mut thread_rng())
}
