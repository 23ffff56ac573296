use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use rand::Rng;
use std::hint::black_box;
use std::time::Duration;
use termpool::prelude::*;
use termpool::HashConfig;

fn bench_1m_terms(c: &mut Criterion) {
    let mut group = c.benchmark_group("1M Terms");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(90)); // large setup per iteration

    let mut rng = rand::rng();
    let count = 1_000_000;

    // ~16MB of term bytes
    let terms: Vec<Vec<u8>> = (0..count)
        .map(|_| {
            let len = rng.random_range(8..24);
            (0..len).map(|_| rng.random()).collect()
        })
        .collect();

    let total_bytes: usize = terms.iter().map(|t| t.len()).sum();
    group.throughput(Throughput::Bytes(total_bytes as u64));

    group.bench_function("sort_keys", |b| {
        b.iter_batched(
            || terms.clone(),
            |mut data| sort_keys(black_box(&mut data)),
            BatchSize::LargeInput,
        )
    });

    group.bench_function("slice::sort_unstable", |b| {
        b.iter_batched(
            || terms.clone(),
            |mut data| data.sort_unstable(),
            BatchSize::LargeInput,
        )
    });

    group.bench_function("BytesRefHash add + sort", |b| {
        b.iter(|| {
            let mut hash =
                BytesRefHash::with_config(ByteBlockPool::default(), HashConfig::default(), Counter::new());
            for term in &terms {
                black_box(hash.add(term).ok());
            }
            hash.sort().map(|ids| ids.len()).ok()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_1m_terms);
criterion_main!(benches);
