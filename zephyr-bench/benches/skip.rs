//! Schema parse, skip and dynamic decode benchmarks.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use zephyr_bench::fixtures::{read_venue, trade_fixture};
use zephyr_core::ByteBuffer;
use zephyr_schema::Schema;

fn benchmark_schema_parse(c: &mut Criterion) {
    let fixture = trade_fixture(1);
    let description = fixture.schema.to_bytes().unwrap_or_default();
    let mut schema = Schema::new();

    c.bench_function("schema_parse", |b| {
        b.iter(|| schema.parse(&mut ByteBuffer::read_only(black_box(&description))))
    });
}

fn benchmark_skip_to_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("skip_to_last_field");

    for levels in [1usize, 16, 256] {
        let fixture = trade_fixture(levels);
        group.bench_with_input(BenchmarkId::from_parameter(levels), &fixture, |b, f| {
            b.iter(|| {
                let mut reader = ByteBuffer::read_only(black_box(&f.wire));
                read_venue(f, &mut reader)
            })
        });
    }

    group.finish();
}

fn benchmark_dynamic_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_decode");

    for levels in [1usize, 16, 256] {
        let fixture = trade_fixture(levels);
        group.bench_with_input(BenchmarkId::from_parameter(levels), &fixture, |b, f| {
            b.iter(|| {
                f.schema
                    .decode(&mut ByteBuffer::read_only(black_box(&f.wire)), f.trade)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_schema_parse,
    benchmark_skip_to_field,
    benchmark_dynamic_decode,
);
criterion_main!(benches);
