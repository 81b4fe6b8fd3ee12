//! Automaton construction benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dfa_core::{Automaton, AutomatonDefinitionRaw};

/// A ring of `n` states over {a, b}: `a` advances, `b` returns to the start.
fn ring_definition(n: usize) -> AutomatonDefinitionRaw {
    let states: Vec<String> = (0..n).map(|i| format!("s{}", i)).collect();
    let transitions = (0..n)
        .flat_map(|i| {
            [
                format!("s{}-a-s{}", i, (i + 1) % n),
                format!("s{}-b-s0", i),
            ]
        })
        .collect::<Vec<_>>()
        .join(",");
    AutomatonDefinitionRaw::new(states, ["a", "b"], transitions, "s0", [format!("s{}", n - 1)])
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("automaton_build");

    // Simple automaton
    group.bench_function("simple", |b| {
        b.iter(|| {
            black_box(
                Automaton::build(["q0", "q1"], ["a", "b"], "q0-a-q1,q1-b-q0", "q0", ["q1"])
                    .unwrap(),
            )
        });
    });

    // Growing rings
    for n in [10, 100, 1000] {
        let raw = ring_definition(n);
        group.throughput(Throughput::Elements((n * 2) as u64));
        group.bench_with_input(BenchmarkId::new("ring", n), &raw, |b, raw| {
            b.iter(|| black_box(Automaton::from_raw(raw.clone()).unwrap()));
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("automaton_validate");

    // Every check fails somewhere
    let raw = AutomatonDefinitionRaw::new(
        ["q0", "q0", "q1"],
        ["a", "a"],
        "q0-a-q1,q0-a-q0,bad,q1-z-q3",
        "q7",
        ["q1", "q1", "q8"],
    );
    group.bench_function("all_errors", |b| {
        b.iter(|| black_box(Automaton::validate(&raw)));
    });

    let raw = ring_definition(100);
    group.bench_function("ring_100", |b| {
        b.iter(|| black_box(Automaton::validate(&raw)));
    });

    group.finish();
}

fn bench_from_json(c: &mut Criterion) {
    let json = serde_json::json!({
        "states": ["q0", "q1"],
        "alphabet": ["a", "b"],
        "transitions": ["q0-a-q1", "q1-b-q0"],
        "start": "q0",
        "accepted": ["q1"]
    });

    c.bench_function("automaton_from_json", |b| {
        b.iter(|| black_box(Automaton::from_json(&json).unwrap()));
    });
}

criterion_group!(benches, bench_build, bench_validate, bench_from_json);
criterion_main!(benches);
