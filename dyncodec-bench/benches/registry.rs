//! Registry lookup benchmarks.
//!
//! Run with: cargo bench -p dyncodec-bench --bench registry

use criterion::{Criterion, criterion_group, criterion_main};
use dyncodec_bench::fixtures;
use dyncodec_registry::TypeRegistry;
use dyncodec_schema::{INTROSPECTION_C, SchemaAdapter, TypeSupport};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

fn benchmark_lookup(c: &mut Criterion) {
    let registry = TypeRegistry::new();
    let type_support = TypeSupport::new(INTROSPECTION_C, fixtures::telemetry_members());
    registry.get_or_create(&type_support).unwrap();

    c.bench_function("registry_get_or_create_hit", |b| {
        b.iter(|| registry.get_or_create(black_box(&type_support)).unwrap())
    });

    c.bench_function("registry_get_hit", |b| {
        b.iter(|| {
            registry
                .get(black_box("fleet::msg::dps_::Telemetry_"), INTROSPECTION_C)
                .unwrap()
        })
    });
}

fn benchmark_construction(c: &mut Criterion) {
    let type_support = TypeSupport::new(INTROSPECTION_C, fixtures::telemetry_members());
    let adapter = SchemaAdapter::new();

    c.bench_function("schema_build", |b| {
        b.iter(|| adapter.build(black_box(&type_support)).unwrap())
    });

    c.bench_function("registry_cold_insert", |b| {
        b.iter(|| {
            let registry = TypeRegistry::new();
            registry.get_or_create(black_box(&type_support)).unwrap()
        })
    });
}

fn benchmark_contended(c: &mut Criterion) {
    let registry = Arc::new(TypeRegistry::new());
    let type_support = TypeSupport::new(INTROSPECTION_C, fixtures::telemetry_members());
    registry.get_or_create(&type_support).unwrap();

    let mut group = c.benchmark_group("registry_contended");
    group.sample_size(20);
    group.bench_function("four_threads_x1000", |b| {
        b.iter(|| {
            thread::scope(|scope| {
                for _ in 0..4 {
                    scope.spawn(|| {
                        for _ in 0..1000 {
                            black_box(registry.get_or_create(&type_support).unwrap());
                        }
                    });
                }
            });
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_lookup,
    benchmark_construction,
    benchmark_contended
);
criterion_main!(benches);
