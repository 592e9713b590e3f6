//! Benchmarks for `ArrayState` mutations.
//!
//! Run with: `cargo bench --package ftui-array-state --bench array_state_bench`
//!
//! Every commit copies the sequence into a fresh snapshot, so mutation cost
//! is linear in the length. The interesting comparisons are commit vs.
//! suppressed no-op (which must not allocate the candidate for `sort` on
//! already-sorted input) and listener fan-out.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ftui_array_state::{ArrayState, ArrayStateOptions};
use std::hint::black_box;

const SIZES: [usize; 3] = [16, 256, 4096];

fn seeded(len: usize) -> Vec<u64> {
    // Deterministic shuffle-ish sequence.
    (0..len as u64).map(|i| i.wrapping_mul(2_654_435_761) % 10_007).collect()
}

fn bench_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_state/push_pop");
    for &len in &SIZES {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let state = ArrayState::new(seeded(len));
            b.iter(|| {
                state.push([black_box(7)]);
                black_box(state.pop())
            });
        });
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_state/sort");
    for &len in &SIZES {
        group.bench_with_input(BenchmarkId::new("unsorted", len), &len, |b, &len| {
            let items = seeded(len);
            b.iter(|| {
                let state = ArrayState::new(items.clone());
                black_box(state.sort())
            });
        });
        group.bench_with_input(BenchmarkId::new("already_sorted", len), &len, |b, &len| {
            let mut items = seeded(len);
            items.sort_unstable();
            let state = ArrayState::new(items);
            b.iter(|| black_box(state.sort()));
        });
    }
    group.finish();
}

fn bench_filter_noop(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_state/filter_keep_all");
    for &len in &SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let state = ArrayState::new(seeded(len));
            b.iter(|| black_box(state.filter(|_, _| true)));
        });
    }
    group.finish();
}

fn bench_listener_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_state/listeners");
    for subscribers in [0usize, 1, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, &subscribers| {
                let state = ArrayState::with_options(
                    ArrayStateOptions::new()
                        .with_initial_value(seeded(64))
                        .with_on_change(|items: &[u64]| {
                            black_box(items.len());
                        }),
                );
                let _subs: Vec<_> = (0..subscribers)
                    .map(|_| state.subscribe(|items| {
                        black_box(items.len());
                    }))
                    .collect();
                let mut flip = 0u64;
                b.iter(|| {
                    flip ^= 1;
                    state.update(0, flip)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_push_pop,
    bench_sort,
    bench_filter_noop,
    bench_listener_fanout
);
criterion_main!(benches);
