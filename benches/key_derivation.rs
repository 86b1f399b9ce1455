//! Benchmarks for cache key derivation
//!
//! This benchmark measures:
//! - Canonical encoding of call arguments
//! - Full key derivation (encoding + SHA-256 + formatting)
//! - Scaling with argument size

use cache_aside::key::{canonical, derive, ArgValue, CallArgs};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::BTreeMap;

fn small_call() -> CallArgs {
    CallArgs::new().arg(2).arg(3).kwarg("unit", "cm")
}

fn wide_call(width: usize) -> CallArgs {
    let mut record = BTreeMap::new();
    for i in 0..width {
        record.insert(format!("field_{}", i), ArgValue::Float(i as f64 * 0.5));
    }
    CallArgs::new()
        .arg(ArgValue::List((0..width as i64).map(ArgValue::Int).collect()))
        .kwarg("record", ArgValue::Map(record))
}

fn bench_small_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("small_call");
    let args = small_call();

    group.bench_function("encode", |b| {
        b.iter(|| black_box(canonical::encode_call(black_box(&args)).unwrap()))
    });

    group.bench_function("derive", |b| {
        b.iter(|| black_box(derive(Some("math"), "mymodule.add", black_box(&args)).unwrap()))
    });

    group.finish();
}

fn bench_argument_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("argument_width");

    for width in [8usize, 64, 512] {
        let args = wide_call(width);
        let encoded_len = canonical::encode_call(&args).unwrap().len();
        group.throughput(Throughput::Bytes(encoded_len as u64));
        group.bench_with_input(BenchmarkId::new("derive", width), &args, |b, args| {
            b.iter(|| black_box(derive(None, "bench.wide", black_box(args)).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_small_call, bench_argument_width);
criterion_main!(benches);
