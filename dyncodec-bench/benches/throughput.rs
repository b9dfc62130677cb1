//! Throughput benchmarks over growing sequence payloads.
//!
//! Run with: cargo bench -p dyncodec-bench --bench throughput

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dyncodec_bench::fixtures;
use dyncodec_codec::MessageCodec;
use std::hint::black_box;

const LENGTHS: [usize; 4] = [16, 256, 4096, 65536];

fn benchmark_samples(c: &mut Criterion) {
    let codec = MessageCodec::new(fixtures::schema_of(fixtures::samples_members()).unwrap());

    let mut group = c.benchmark_group("samples");
    for len in LENGTHS {
        let message = fixtures::samples(codec.schema(), len).unwrap();
        let bytes = codec.serialize(&message).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        let mut out = Vec::with_capacity(bytes.len());
        group.bench_with_input(BenchmarkId::new("serialize", len), &message, |b, message| {
            b.iter(|| {
                out.clear();
                codec.serialize_into(black_box(message), &mut out).unwrap()
            })
        });

        let mut decoded = codec.new_instance();
        group.bench_with_input(BenchmarkId::new("deserialize", len), &bytes, |b, bytes| {
            b.iter(|| codec.deserialize(black_box(bytes), &mut decoded).unwrap())
        });
    }
    group.finish();
}

fn benchmark_waypoints(c: &mut Criterion) {
    let codec = MessageCodec::new(fixtures::schema_of(fixtures::telemetry_members()).unwrap());

    let mut group = c.benchmark_group("waypoints");
    for count in [1usize, 64, 1024] {
        let message = fixtures::telemetry(codec.schema(), count).unwrap();
        let bytes = codec.serialize(&message).unwrap();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("round_trip", count), &message, |b, message| {
            b.iter(|| {
                let bytes = codec.serialize(black_box(message)).unwrap();
                codec.decode(&bytes).unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("decode", count), &bytes, |b, bytes| {
            b.iter(|| codec.decode(black_box(bytes)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_samples, benchmark_waypoints);
criterion_main!(benches);
