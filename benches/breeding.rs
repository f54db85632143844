use criterion::{criterion_group, criterion_main, Criterion};
use swarm_genetics::engine::{compatibility, genetic_fitness, GeneticEngine, RngSource};
use swarm_genetics::genome::{detect_synergies, SwarmPerformance};

fn bench_breeding(c: &mut Criterion) {
    let engine = GeneticEngine::default();
    let mut rng = RngSource::seeded(42);
    let perf = SwarmPerformance { win_rate: 60.0, total_profit: 2500.0 };
    let p1 = engine.initialize_profile("p1", "alice", None, perf, &mut rng);
    let p2 = engine.initialize_profile("p2", "bob", None, perf, &mut rng);

    c.bench_function("breed_pair", |b| {
        b.iter(|| engine.breed(&p1, &p2, &mut rng))
    });

    c.bench_function("compatibility", |b| {
        b.iter(|| compatibility(&p1, &p2))
    });

    c.bench_function("genetic_fitness", |b| {
        b.iter(|| genetic_fitness(&p1.traits, perf))
    });

    c.bench_function("detect_synergies", |b| {
        b.iter(|| detect_synergies(&p1.traits))
    });
}

criterion_group!(benches, bench_breeding);
criterion_main!(benches);
