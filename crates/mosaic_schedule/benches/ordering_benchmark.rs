//! # Ordering Benchmark
//!
//! Startup cost of validating and ordering a large family, and the per-tick
//! dispatch overhead of a built schedule.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mosaic_schedule::{ExecutionContext, Family, System, SystemDescriptor, SystemRegistry, TagSet};

const SYSTEM_COUNT: usize = 500;

#[derive(Default)]
struct Step;

impl System<u64> for Step {
    fn update(&mut self, state: &mut u64, ctx: &ExecutionContext<'_>) {
        *state = state.wrapping_add(ctx.tick());
    }
}

/// A chain with extra skip edges, registered in reverse.
fn chain_registry() -> SystemRegistry<u64> {
    let mut registry = SystemRegistry::new();
    for i in (0..SYSTEM_COUNT).rev() {
        let mut descriptor = SystemDescriptor::of::<Step>(format!("s{i}"), "frame");
        if i > 0 {
            descriptor = descriptor.after(format!("s{}", i - 1));
        }
        if i > 8 {
            descriptor = descriptor.after(format!("s{}", i - 8));
        }
        if i % 3 == 0 {
            descriptor = descriptor.requires("editor");
        }
        registry.register(descriptor).expect("unique names");
    }
    registry
}

fn bench_validate(c: &mut Criterion) {
    let registry = chain_registry();

    c.bench_function("validate_500", |b| {
        b.iter(|| black_box(registry.validate().is_ok()));
    });
}

fn bench_order(c: &mut Criterion) {
    let registry = chain_registry();
    let frame = Family::from("frame");
    let active: TagSet = ["editor"].into_iter().collect();

    c.bench_function("order_500_filtered", |b| {
        b.iter(|| black_box(registry.order(&frame, &active).map(|order| order.len())));
    });
}

fn bench_tick(c: &mut Criterion) {
    let registry = chain_registry();
    let mut schedule = registry
        .build(&Family::from("frame"), &TagSet::new())
        .expect("acyclic");
    let mut state = 0u64;

    c.bench_function("tick_dispatch", |b| {
        b.iter(|| black_box(schedule.tick(&mut state)));
    });
}

criterion_group!(benches, bench_validate, bench_order, bench_tick);

criterion_main!(benches);
