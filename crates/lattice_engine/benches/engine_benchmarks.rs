//! Criterion benchmarks for lattice generation and propagation.
//!
//! Compares sequential and level-parallel traversal across lattice heights
//! to characterise scaling behaviour.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lattice_core::formula::Formula;
use lattice_core::types::{Args, NodeData, Value};
use lattice_engine::lattice::{NavigationPolicy, PerfectLattice};
use lattice_engine::propagation::{keys, EngineConfig, PropagationEngine, TraversalMode};

fn seeded(height: u32) -> PerfectLattice {
    PerfectLattice::generate(height, || {
        NodeData::from([("value".to_string(), Value::from(1.0))])
    })
    .unwrap()
}

fn backward() -> Formula {
    Formula::new(|args: &Args| {
        let down = args.inner_number(keys::LEFT, "value")?;
        let up = args.inner_number(keys::RIGHT, "value")?;
        Ok(Value::from(0.99 * (0.5 * up + 0.5 * down)))
    })
}

fn forward() -> Formula {
    Formula::new(|args: &Args| {
        let parent = args.inner_number(keys::PARENT, "value")?;
        match args.keyword(keys::SIDE)?.as_text() {
            Some("R") => Ok(Value::from(parent * 1.1)),
            _ => Ok(Value::from(parent / 1.1)),
        }
    })
}

fn engines() -> [(&'static str, PropagationEngine); 2] {
    let parallel = EngineConfig::builder()
        .traversal(TraversalMode::LevelParallel)
        .parallel_threshold(256)
        .build()
        .unwrap();
    [
        ("sequential", PropagationEngine::default()),
        ("level_parallel", PropagationEngine::new(parallel)),
    ]
}

/// Benchmark perfect lattice generation.
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for height in [8, 12, 16] {
        group.bench_with_input(BenchmarkId::new("perfect", height), &height, |b, &h| {
            b.iter(|| PerfectLattice::generate(black_box(h), NodeData::new).unwrap());
        });
    }

    group.finish();
}

/// Benchmark backward induction in both traversal modes.
fn bench_propagate_up(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagate_up");
    let formula = backward();

    for height in [8, 12, 16] {
        let lattice = seeded(height);
        for (name, engine) in engines() {
            group.bench_with_input(BenchmarkId::new(name, height), &lattice, |b, lattice| {
                b.iter_batched(
                    || lattice.clone(),
                    |mut l| {
                        engine
                            .propagate_up(&mut l, &formula, &Value::Null, "value")
                            .unwrap()
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }
    }

    group.finish();
}

/// Benchmark forward propagation in both traversal modes.
fn bench_propagate_down(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagate_down");
    let formula = forward();

    for height in [8, 12, 16] {
        let lattice = seeded(height);
        for (name, engine) in engines() {
            group.bench_with_input(BenchmarkId::new(name, height), &lattice, |b, lattice| {
                b.iter_batched(
                    || lattice.clone(),
                    |mut l| {
                        engine
                            .propagate_down(&mut l, &formula, &Value::Null, "value")
                            .unwrap()
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }
    }

    group.finish();
}

/// Benchmark navigation to the deepest rightmost leaf.
fn bench_navigate(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigate");

    for height in [8, 16] {
        let lattice = seeded(height);
        let path = "r".repeat(height as usize);
        group.bench_with_input(BenchmarkId::new("root_to_leaf", height), &path, |b, path| {
            b.iter(|| {
                lattice
                    .navigate(lattice.root(), black_box(path), NavigationPolicy::strict())
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_generate,
    bench_propagate_up,
    bench_propagate_down,
    bench_navigate
);
criterion_main!(benches);
