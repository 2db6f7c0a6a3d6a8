/// Optimizer throughput benchmarks
///
/// Benchmarks:
/// 1. Full short runs of each variant
/// 2. One meta-GA pass
/// 3. Sequential vs parallel evaluation
///
/// Run with: cargo bench --bench generation_step

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use swarm_optim::{Controller, GaParams, MetaGa, MetaIndividual, NullObserver, NullSink, ObjectiveKind, OptimizerConfig, RandomSources, Variant};

fn bench_config() -> OptimizerConfig {
    OptimizerConfig { population_size: 50, generation_count: 10, dimensions: 20, ..OptimizerConfig::default() }
}

fn bench_variants(c: &mut Criterion) {
    let objective = ObjectiveKind::Ackley;
    let ctl = Controller::new(bench_config(), &objective).unwrap();
    let mut group = c.benchmark_group("run_10_generations");
    for variant in [Variant::Adaptive, Variant::Baseline] {
        group.bench_with_input(BenchmarkId::from_parameter(variant.as_str()), &variant, |b, v| {
            b.iter(|| black_box(ctl.run_seeded(*v, &mut NullSink, &mut NullObserver).unwrap()));
        });
    }
    group.finish();
}

fn bench_meta_ga(c: &mut Criterion) {
    let pool: Vec<MetaIndividual> = (0..50).map(|i| MetaIndividual { genes: [0.9, 0.5, 0.5], fitness: i as f64 }).collect();
    let ga = MetaGa::new(GaParams { elite_count: 10, ..GaParams::default() });
    let mut src = RandomSources::from_seeds(1, 2);
    c.bench_function("meta_ga_evolve_k10", |b| {
        b.iter(|| black_box(ga.evolve(black_box(&pool), &mut src.motion)));
    });
}

fn bench_parallel_evaluation(c: &mut Criterion) {
    let objective = ObjectiveKind::Whitley;
    let mut group = c.benchmark_group("whitley_evaluation");
    for parallel in [false, true] {
        let cfg = OptimizerConfig { parallel_evaluation: parallel, generation_count: 3, ..bench_config() };
        let ctl = Controller::new(cfg, &objective).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(if parallel { "parallel" } else { "sequential" }), &ctl, |b, ctl| {
            b.iter(|| black_box(ctl.run_seeded(Variant::Baseline, &mut NullSink, &mut NullObserver).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_variants, bench_meta_ga, bench_parallel_evaluation);
criterion_main!(benches);
