//! Benchmarks for the MCCFR engines.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mccfr_solver::cfr::{
    ChanceSampling, DiscountParams, PolicyTable, RobustSampling, Sampler, StrategyProfile, Trainer,
};
use mccfr_solver::games::kuhn::KuhnNode;

fn kuhn_iteration_benchmark(c: &mut Criterion) {
    let mut chance = ChanceSampling::with_seed(PolicyTable::new(DiscountParams::dcfr()), 42);
    c.bench_function("kuhn_chance_single_iteration", |b| {
        b.iter(|| {
            let value = chance.run(KuhnNode::new()).unwrap();
            chance.profile_mut().update();
            black_box(value)
        })
    });

    let mut robust = RobustSampling::with_seed(PolicyTable::new(DiscountParams::dcfr()), 1, 42);
    c.bench_function("kuhn_robust_single_iteration", |b| {
        b.iter(|| {
            let value = robust.run(KuhnNode::new()).unwrap();
            robust.profile_mut().update();
            black_box(value)
        })
    });
}

fn kuhn_1000_iterations_benchmark(c: &mut Criterion) {
    c.bench_function("kuhn_chance_1000_iterations", |b| {
        b.iter(|| {
            let sampler = ChanceSampling::with_seed(PolicyTable::new(DiscountParams::Vanilla), 42);
            let mut trainer = Trainer::new(sampler);
            trainer.train(KuhnNode::new, black_box(1000)).unwrap().iterations
        })
    });

    c.bench_function("kuhn_robust_1000_iterations", |b| {
        b.iter(|| {
            let sampler = RobustSampling::with_seed(PolicyTable::new(DiscountParams::Vanilla), 2, 42);
            let mut trainer = Trainer::new(sampler);
            trainer.train(KuhnNode::new, black_box(1000)).unwrap().iterations
        })
    });
}

criterion_group!(benches, kuhn_iteration_benchmark, kuhn_1000_iterations_benchmark);
criterion_main!(benches);
