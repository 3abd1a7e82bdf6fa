//! Stream copier benchmarks.
//!
//! - Chunk size sweep for one 1 MiB body
//! - Pooled buffers vs. a fresh buffer per copy

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sfs_module::{copy_exact, StreamCopier};
use std::io;

const BODY_LEN: usize = 1 << 20;

fn body() -> Vec<u8> {
    (0..BODY_LEN).map(|i| (i % 251) as u8).collect()
}

fn bench_chunk_sizes(c: &mut Criterion) {
    let data = body();
    let mut group = c.benchmark_group("stream_copy/chunk_size");
    group.throughput(Throughput::Bytes(BODY_LEN as u64));

    for chunk in [1024usize, 8 * 1024, 64 * 1024] {
        let copier = StreamCopier::with_chunk_size(chunk, 1);
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, _| {
            b.iter(|| {
                let n = copier
                    .copy(&mut data.as_slice(), BODY_LEN as u64, &mut io::sink())
                    .unwrap();
                black_box(n);
            });
        });
    }
    group.finish();
}

fn bench_buffer_reuse(c: &mut Criterion) {
    let data = body();
    let mut group = c.benchmark_group("stream_copy/buffers");
    group.throughput(Throughput::Bytes(BODY_LEN as u64));

    let copier = StreamCopier::default();
    group.bench_function("pooled", |b| {
        b.iter(|| {
            black_box(
                copier
                    .copy(&mut data.as_slice(), BODY_LEN as u64, &mut io::sink())
                    .unwrap(),
            );
        });
    });

    group.bench_function("fresh", |b| {
        b.iter(|| {
            let mut buf = vec![0u8; 8 * 1024];
            black_box(
                copy_exact(&mut data.as_slice(), BODY_LEN as u64, &mut io::sink(), &mut buf)
                    .unwrap(),
            );
        });
    });
    group.finish();
}

criterion_group!(benches, bench_chunk_sizes, bench_buffer_reuse);
criterion_main!(benches);
