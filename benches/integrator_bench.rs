//! Integrator benchmarks: one step per scheme, batch sizes 1 and 200,
//! plus a short twin-divergence run.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use order_chaos_dynamics::sampling::DEFAULT_SEPARATION;
use order_chaos_dynamics::{
    ClassifierSettings, DivergenceClassifier, EnergySampler, FixedStepIntegrator, HenonHeiles,
    Scheme,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_single_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("hh_step");
    let mut rng = StdRng::seed_from_u64(1);
    let sampler = EnergySampler::default();

    for n in [1usize, 200] {
        let state = sampler.sample(&HenonHeiles, n, 1.0 / 8.0, &mut rng).unwrap();
        for scheme in Scheme::ALL {
            let integrator = FixedStepIntegrator::new(scheme, 0.01).unwrap();
            group.bench_with_input(BenchmarkId::new(scheme.to_string(), n), &state, |b, w| {
                b.iter(|| black_box(integrator.step(&HenonHeiles, 0.0, w)))
            });
        }
    }

    group.finish();
}

/// 100 twin pairs over 1000 RK4 steps.
fn bench_twin_divergence(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let twins = EnergySampler::default()
        .sample_twins(&HenonHeiles, 100, 1.0 / 8.0, DEFAULT_SEPARATION, &mut rng)
        .unwrap();
    let integrator = FixedStepIntegrator::new(Scheme::Rk4, 0.01).unwrap();
    let classifier = DivergenceClassifier::new(integrator, 1000, ClassifierSettings::default()).unwrap();

    c.bench_function("twin_divergence_100x1000", |b| {
        b.iter(|| black_box(classifier.measure_twins(&HenonHeiles, &twins)))
    });
}

criterion_group!(benches, bench_single_step, bench_twin_divergence);
criterion_main!(benches);
