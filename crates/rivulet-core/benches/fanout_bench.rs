//! Benchmarks for subject fan-out and attach.
//!
//! Run with: `cargo bench --package rivulet-core --bench fanout_bench`
//!
//! Fan-out cost is dominated by the observer-list snapshot (one handle clone
//! per observer) plus one sink dispatch per observer. Attach cost on a
//! replay subject grows with the replayed buffer.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rivulet_core::prelude::*;
use std::hint::black_box;

// ============================================================================
// Fan-out
// ============================================================================

fn bench_publish_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish_fanout");

    for observers in [1usize, 8, 64] {
        let subject = PublishSubject::<u64>::new();
        let subs: Vec<Disposable> = (0..observers)
            .map(|_| {
                subject.subscribe_next(|v| {
                    black_box(v);
                })
            })
            .collect();

        group.throughput(Throughput::Elements(observers as u64));
        group.bench_with_input(BenchmarkId::from_parameter(observers), &observers, |b, _| {
            b.iter(|| subject.on_next(black_box(42)));
        });

        for sub in subs {
            sub.dispose();
        }
    }

    group.finish();
}

// ============================================================================
// Attach with replay
// ============================================================================

fn bench_replay_attach(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay_attach");

    for buffer in [0usize, 16, 256] {
        let subject = ReplaySubject::<u64>::create(buffer);
        for v in 0..buffer as u64 {
            subject.on_next(v);
        }

        group.bench_with_input(BenchmarkId::from_parameter(buffer), &buffer, |b, _| {
            b.iter(|| {
                let sub = subject.subscribe_next(|v| {
                    black_box(v);
                });
                sub.dispose();
            });
        });
    }

    group.finish();
}

// ============================================================================
// Cold sources
// ============================================================================

fn bench_cold_of(c: &mut Criterion) {
    let source = Observable::from_sequence(0..1_000u64);
    c.bench_function("cold_from_sequence_1000", |b| {
        b.iter(|| {
            source.subscribe_next(|v| {
                black_box(v);
            })
        });
    });
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_publish_fanout, bench_replay_attach, bench_cold_of);

criterion_main!(benches);
