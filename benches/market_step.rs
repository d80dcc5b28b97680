//! benches/market_step.rs
//! Run with:  cargo bench --bench market_step
//! HTML:      target/criterion/report/index.html

use agentic_market::{MarketModel, SimConfig};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

// ────────────────────────────────────────────────────────────────────────────
//  Parameter grids
// ────────────────────────────────────────────────────────────────────────────
const POPULATIONS: &[usize] = &[10, 100, 1_000, 10_000];
const RUN_LENGTHS: &[usize] = &[50, 252];

/// A seeded model with `num_agents` investors, warmed past the long window so
/// the fallback rule is doing real work.
fn setup_model(num_agents: usize, seed: u64) -> MarketModel {
    let mut cfg = SimConfig {
        num_agents,
        ..SimConfig::default()
    };
    cfg.price.seed = Some(seed);
    let warmup = cfg.signal.long_window;
    let mut model = MarketModel::new(cfg).expect("default config is valid");
    for _ in 0..warmup {
        model.step().expect("warmup step");
    }
    model
}

pub fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("market_step_scaling");
    let mut rng = StdRng::seed_from_u64(42);

    for &n in POPULATIONS {
        // throughput in "elements" = investors activated per step
        group.throughput(Throughput::Elements(n as u64));
        let seed = rng.gen_range(0..u64::MAX);
        let id = BenchmarkId::from_parameter(format!("agents_{n}"));
        group.bench_function(id, |b| {
            b.iter_batched(
                || setup_model(n, seed),
                |mut model| {
                    let snapshot = model.step().expect("step");
                    black_box(snapshot.price);
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

pub fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("market_run");

    for &steps in RUN_LENGTHS {
        group.throughput(Throughput::Elements(steps as u64));
        for &n in &POPULATIONS[..3] {
            let id = BenchmarkId::from_parameter(format!("steps_{steps}_agents_{n}"));
            group.bench_function(id, |b| {
                b.iter_batched(
                    || {
                        let mut cfg = SimConfig {
                            num_agents: n,
                            ..SimConfig::default()
                        };
                        cfg.price.seed = Some(7);
                        MarketModel::new(cfg).expect("default config is valid")
                    },
                    |model| black_box(model.run(black_box(steps)).expect("run")),
                    BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_run);
criterion_main!(benches);
