use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zarrs_core::{
    array::ArrayBuilder,
    indexer::{ArraySelection, BasicIndexer, DimensionSelection, SliceSelection},
    storage::store::MemoryStore,
};

fn indexer_projections(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexer_projections");
    for size in [64u64, 256, 1024] {
        let shape = vec![size, size];
        let selection = ArraySelection::new(vec![
            SliceSelection::new(Some(1), None, Some(3)).into(),
            DimensionSelection::Full,
        ]);
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                BasicIndexer::new(&selection, &shape, &[16, 16])
                    .unwrap()
                    .into_projections()
            });
        });
    }
    group.finish();
}

fn array_read_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_read_write");
    for size in [64u64, 128, 256] {
        let num_elements = size * size * size;
        group.throughput(Throughput::Bytes(num_elements));
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(vec![size; 3], "u1", vec![32; 3], 0u8.into())
            .build(store, "/array")
            .unwrap();
        let data = vec![1u8; usize::try_from(num_elements).unwrap()];
        group.bench_function(BenchmarkId::new("write", num_elements), |b| {
            b.iter(|| array.store_selection(&ArraySelection::full(), &data).unwrap());
        });
        group.bench_function(BenchmarkId::new("read", num_elements), |b| {
            b.iter(|| array.retrieve_selection(&ArraySelection::full()).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, indexer_projections, array_read_write);
criterion_main!(benches);
