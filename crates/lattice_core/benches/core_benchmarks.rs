//! Criterion benchmarks for lattice_core argument adaptation.
//!
//! Measures adapter validation, argument transformation and full formula
//! calls as the number of routed arguments grows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lattice_core::formula::{AdapterOptions, AdapterSpec, ArgumentAdapter, Formula, OutputSlot, SourceRule};
use lattice_core::types::{Args, NodeData, Value};

/// Spec routing `n` keys of the `node` map to output positions 0..n.
fn positional_spec(n: usize) -> AdapterSpec {
    (0..n)
        .map(|i| {
            (
                OutputSlot::from(i),
                SourceRule::keyword("node").inner(format!("k{}", i)),
            )
        })
        .collect()
}

/// Call arguments whose `node` map holds `n` numeric entries.
fn node_args(n: usize) -> Args {
    let node: NodeData = (0..n)
        .map(|i| (format!("k{}", i), Value::from(i as f64)))
        .collect();
    Args::new()
        .with_keyword("node", node)
        .with_keyword("extra", Value::map([("scale", 2.0)]))
}

/// Benchmark adapter construction (validation cost).
fn bench_adapter_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("adapter_validation");

    for size in [4, 32, 256] {
        let spec = positional_spec(size);
        group.bench_with_input(BenchmarkId::new("new", size), &spec, |b, spec| {
            b.iter(|| {
                ArgumentAdapter::new(black_box(spec.clone()), AdapterOptions::default()).unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark argument transformation through a validated adapter.
fn bench_adapter_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("adapter_transform");

    for size in [4, 32, 256] {
        let adapter = ArgumentAdapter::new(
            positional_spec(size),
            AdapterOptions::default().require_inner_keys(),
        )
        .unwrap();
        let args = node_args(size);

        group.bench_with_input(BenchmarkId::new("transform", size), &args, |b, args| {
            b.iter(|| adapter.transform(black_box(args)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark a formula call with and without an adapter in front.
fn bench_formula_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("formula_call");
    let args = node_args(8);

    let direct = Formula::new(|args: &Args| {
        let node = args.keyword("node")?;
        let sum: f64 = node
            .as_map()
            .map(|m| m.values().filter_map(Value::as_number).sum())
            .unwrap_or(0.0);
        Ok(Value::from(sum * args.inner_number("extra", "scale")?))
    });
    group.bench_function("direct", |b| {
        b.iter(|| direct.call(black_box(&args)).unwrap());
    });

    let mut spec = positional_spec(8);
    spec.push((OutputSlot::from("scale"), SourceRule::keyword("extra").inner("scale")));
    let adapted = Formula::on_maps(
        |args: &Args| {
            let sum: f64 = args.positional_values().iter().filter_map(Value::as_number).sum();
            Ok(Value::from(sum * args.number("scale")?))
        },
        spec,
    )
    .unwrap();
    group.bench_function("adapted", |b| {
        b.iter(|| adapted.call(black_box(&args)).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_adapter_validation,
    bench_adapter_transform,
    bench_formula_call
);
criterion_main!(benches);
