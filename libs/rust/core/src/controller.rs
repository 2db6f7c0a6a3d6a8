//! Generation loop for the adaptive and baseline variants.
//!
//! Per generation, both variants: evaluate every particle, finalize personal
//! and global bests in swarm order, then move every particle against that
//! finalized global best. The adaptive variant additionally projects each
//! particle into a chromosome before it moves, evolves the chromosomes and
//! hands the result to the worst particles. The baseline variant pins every
//! coefficient to 1 before moving.
//!
//! The adaptive variant runs one warm-up evaluation before the loop, so the
//! first generation evaluates every particle a second time at the same
//! position. That keeps `last_fitness` meaningful from generation 0 on; the
//! extra calls are counted in [`RunReport::evaluations`] but not in the
//! per-generation records.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::fitness::is_strictly_better;
use crate::ga::MetaGa;
use crate::meta::{project, ChromosomeScoring, MetaIndividual};
use crate::metrics::OPTIMIZER_METRICS;
use crate::objectives::Objective;
use crate::observer::{SwarmFrame, SwarmObserver};
use crate::particle::{BestSnapshot, Coefficients, Swarm};
use crate::pso::{update_particle, UpdateParams};
use crate::random::{RandomSource, RandomSources};
use crate::recalibrate::recalibrate;
use crate::stats::{FitnessSummary, GenerationRecord, Logbook, StatisticsSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Per-particle coefficients tuned by the meta GA.
    Adaptive,
    /// Every coefficient fixed at 1.
    Baseline,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Adaptive => "adaptive",
            Variant::Baseline => "baseline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub variant: Variant,
    pub swarm: Swarm,
    pub logbook: Logbook,
    pub global_best: Option<BestSnapshot>,
    /// Every objective call, warm-up included.
    pub evaluations: usize,
}

pub struct Controller<'o, O: Objective + ?Sized> {
    config: OptimizerConfig,
    objective: &'o O,
    update: UpdateParams,
    scoring: ChromosomeScoring,
    ga: MetaGa,
}

impl<'o, O: Objective + ?Sized> Controller<'o, O> {
    pub fn new(config: OptimizerConfig, objective: &'o O) -> Result<Self> {
        config.validate()?;
        Ok(Self { update: config.update_params(), scoring: config.scoring(), ga: MetaGa::new(config.ga_params()), config, objective })
    }

    pub fn config(&self) -> &OptimizerConfig { &self.config }

    /// Run `variant` with fresh generators seeded from the configuration.
    pub fn run_seeded(&self, variant: Variant, stats: &mut dyn StatisticsSink, observer: &mut dyn SwarmObserver) -> Result<RunReport> {
        let mut sources = RandomSources::from_seeds(self.config.motion_seed, self.config.coefficient_seed);
        self.run(variant, &mut sources.motion, &mut sources.coefficients, stats, observer)
    }

    pub fn run<M, C>(
        &self,
        variant: Variant,
        motion: &mut M,
        coefficients: &mut C,
        stats: &mut dyn StatisticsSink,
        observer: &mut dyn SwarmObserver,
    ) -> Result<RunReport>
    where
        M: RandomSource + ?Sized,
        C: RandomSource + ?Sized,
    {
        let mut swarm = Swarm::initialize(&self.config.swarm_spec(), motion, coefficients)?;
        let mut global_best: Option<BestSnapshot> = None;
        let mut logbook = Logbook::default();
        let mut evaluations = 0usize;
        info!(
            variant = variant.as_str(),
            population = swarm.len(),
            dimensions = self.config.dimensions,
            generations = self.config.generation_count,
            "optimizer run starting"
        );

        if variant == Variant::Adaptive {
            evaluations += self.evaluate(variant, &mut swarm);
            track_bests(&mut swarm, &mut global_best);
        }

        for generation in 0..self.config.generation_count {
            let evaluated = self.evaluate(variant, &mut swarm);
            evaluations += evaluated;
            track_bests(&mut swarm, &mut global_best);
            let fitness = swarm.fitness_values();

            if let Some(best) = global_best.as_ref() {
                match variant {
                    Variant::Adaptive => {
                        let pool: Vec<MetaIndividual> = swarm.iter().map(|p| project(p, self.scoring)).collect();
                        self.move_swarm(&mut swarm, best, motion);
                        let evolved = self.ga.evolve(&pool, motion);
                        let touched = recalibrate(&mut swarm, &evolved);
                        trace!(variant = variant.as_str(), generation, ?touched, "recalibrated");
                        OPTIMIZER_METRICS.recalibrated(variant, touched.len());
                    }
                    Variant::Baseline => {
                        for p in swarm.particles_mut() { p.coefficients = Coefficients::UNIT; }
                        self.move_swarm(&mut swarm, best, motion);
                    }
                }
            }

            let best = global_best.as_ref().map_or(f64::NAN, |b| b.fitness);
            let record = GenerationRecord { generation, evaluations: evaluated, summary: FitnessSummary::from_values(&fitness), best };
            debug!(variant = variant.as_str(), generation, best, min = record.summary.min, avg = record.summary.avg, "generation complete");
            logbook.push(record);
            stats.record(variant, generation, evaluated, &fitness);
            OPTIMIZER_METRICS.generation_done(variant, best);

            let frame = SwarmFrame::capture(variant, generation, &swarm, global_best.as_ref().map(|b| b.fitness));
            if let Err(e) = observer.observe(&frame) {
                warn!(variant = variant.as_str(), generation, error = ?e, "swarm observer failed");
            }
        }

        info!(
            variant = variant.as_str(),
            best = global_best.as_ref().map_or(f64::NAN, |b| b.fitness),
            evaluations,
            "optimizer run finished"
        );
        Ok(RunReport { variant, swarm, logbook, global_best, evaluations })
    }

    /// Evaluate every particle at its current position. Consumes no randomness,
    /// so the parallel path yields the same fitness values as the sequential one.
    fn evaluate(&self, variant: Variant, swarm: &mut Swarm) -> usize {
        let objective = self.objective;
        if self.config.parallel_evaluation {
            swarm.particles_mut().par_iter_mut().for_each(|p| {
                let f = objective.evaluate(&p.position);
                p.record_fitness(f);
            });
        } else {
            for p in swarm.particles_mut() {
                let f = objective.evaluate(&p.position);
                p.record_fitness(f);
            }
        }
        OPTIMIZER_METRICS.evaluated(variant, swarm.len());
        swarm.len()
    }

    fn move_swarm<M: RandomSource + ?Sized>(&self, swarm: &mut Swarm, global_best: &BestSnapshot, motion: &mut M) {
        for p in swarm.particles_mut() { update_particle(p, global_best, &self.update, motion); }
    }
}

/// Refresh personal bests, then the global best, in swarm order. The global
/// record is rebuilt from a particle only on strict improvement.
fn track_bests(swarm: &mut Swarm, global_best: &mut Option<BestSnapshot>) {
    for p in swarm.particles_mut() {
        p.refresh_personal_best();
        if global_best.as_ref().map_or(true, |g| is_strictly_better(p.fitness, g.fitness)) {
            *global_best = Some(p.snapshot());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objectives::{sphere, ObjectiveKind};
    use crate::observer::NullObserver;
    use crate::stats::NullSink;

    fn small() -> OptimizerConfig {
        OptimizerConfig { population_size: 8, generation_count: 12, dimensions: 3, position_min: -5.0, position_max: 5.0, recalibration_count: 3, ..OptimizerConfig::default() }
    }

    fn frames<F>(f: F) -> F
    where
        F: FnMut(&SwarmFrame<'_>) -> anyhow::Result<()>,
    {
        f
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = OptimizerConfig { recalibration_count: 9, ..small() };
        assert!(Controller::new(cfg, &ObjectiveKind::Sphere).is_err());
    }

    #[test]
    fn run_shape_and_evaluation_counts() {
        let objective = ObjectiveKind::Sphere;
        let ctl = Controller::new(small(), &objective).unwrap();
        let adaptive = ctl.run_seeded(Variant::Adaptive, &mut NullSink, &mut NullObserver).unwrap();
        assert_eq!(adaptive.logbook.len(), 12);
        assert_eq!(adaptive.swarm.len(), 8);
        assert_eq!(adaptive.evaluations, 8 * 13);
        assert_eq!(adaptive.logbook.total_evaluations(), 8 * 12);
        assert!(adaptive.global_best.is_some());

        let baseline = ctl.run_seeded(Variant::Baseline, &mut NullSink, &mut NullObserver).unwrap();
        assert_eq!(baseline.evaluations, 8 * 12);
    }

    #[test]
    fn bests_never_worsen() {
        let objective = |x: &[f64]| sphere(x);
        let ctl = Controller::new(small(), &objective).unwrap();
        for variant in [Variant::Adaptive, Variant::Baseline] {
            let mut previous: Option<(Vec<Option<f64>>, f64)> = None;
            let mut obs = frames(|f| {
                let global = f.global_best.unwrap_or(f64::NAN);
                if let Some((personal, best)) = &previous {
                    assert!(global <= *best);
                    for (now, before) in f.personal_best.iter().zip(personal) {
                        assert!(now.unwrap() <= before.unwrap());
                    }
                }
                previous = Some((f.personal_best.clone(), global));
                Ok(())
            });
            let report = ctl.run_seeded(variant, &mut NullSink, &mut obs).unwrap();
            let history = report.logbook.best_history();
            assert!(history.windows(2).all(|w| w[1] <= w[0]));
        }
    }

    #[test]
    fn baseline_coefficients_pinned() {
        let ctl = Controller::new(small(), &ObjectiveKind::Rastrigin).unwrap();
        let mut obs = frames(|f| {
            assert!(f.coefficients.iter().all(|c| *c == Coefficients::UNIT));
            Ok(())
        });
        ctl.run_seeded(Variant::Baseline, &mut NullSink, &mut obs).unwrap();
    }

    #[test]
    fn velocities_stay_bounded() {
        let ctl = Controller::new(small(), &ObjectiveKind::Ackley).unwrap();
        let limit = ctl.config().swarm_spec().velocity();
        for variant in [Variant::Adaptive, Variant::Baseline] {
            let mut obs = frames(|f| {
                for v in &f.velocities { assert!(v.iter().all(|x| (limit.min..=limit.max).contains(x))); }
                Ok(())
            });
            ctl.run_seeded(variant, &mut NullSink, &mut obs).unwrap();
        }
    }

    #[test]
    fn adaptive_recalibrates_at_most_k_per_generation() {
        let cfg = small();
        let ctl = Controller::new(cfg.clone(), &ObjectiveKind::Sphere).unwrap();
        let mut last: Option<Vec<Coefficients>> = None;
        let mut obs = frames(|f| {
            if let Some(prev) = &last {
                let changed = prev.iter().zip(&f.coefficients).filter(|(a, b)| a != b).count();
                assert!(changed <= cfg.recalibration_count);
            }
            last = Some(f.coefficients.clone());
            Ok(())
        });
        ctl.run_seeded(Variant::Adaptive, &mut NullSink, &mut obs).unwrap();
    }

    #[test]
    fn stats_sink_sees_every_generation() {
        let ctl = Controller::new(small(), &ObjectiveKind::Sphere).unwrap();
        let mut rows = Vec::new();
        let mut sink = |v: Variant, g: usize, e: usize, f: &[f64]| rows.push((v, g, e, f.len()));
        ctl.run_seeded(Variant::Baseline, &mut sink, &mut NullObserver).unwrap();
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().enumerate().all(|(i, r)| *r == (Variant::Baseline, i, 8, 8)));
    }

    #[test]
    fn observer_failure_does_not_stop_run() {
        let ctl = Controller::new(small(), &ObjectiveKind::Sphere).unwrap();
        let mut obs = frames(|_| anyhow::bail!("renderer offline"));
        let report = ctl.run_seeded(Variant::Adaptive, &mut NullSink, &mut obs).unwrap();
        assert_eq!(report.logbook.len(), 12);
    }

    #[test]
    fn parallel_matches_sequential() {
        let objective = ObjectiveKind::Rastrigin;
        let seq = Controller::new(small(), &objective).unwrap();
        let par = Controller::new(OptimizerConfig { parallel_evaluation: true, ..small() }, &objective).unwrap();
        for variant in [Variant::Adaptive, Variant::Baseline] {
            let a = seq.run_seeded(variant, &mut NullSink, &mut NullObserver).unwrap();
            let b = par.run_seeded(variant, &mut NullSink, &mut NullObserver).unwrap();
            assert_eq!(a.swarm, b.swarm);
            assert_eq!(a.logbook, b.logbook);
        }
    }

    #[test]
    fn first_achiever_keeps_global_best_on_ties() {
        let mut swarm = {
            let spec = small().swarm_spec();
            let mut src = RandomSources::from_seeds(1, 1);
            Swarm::initialize(&spec, &mut src.motion, &mut src.coefficients).unwrap()
        };
        for p in swarm.particles_mut() { p.record_fitness(2.0); }
        let mut global = None;
        track_bests(&mut swarm, &mut global);
        assert_eq!(global.as_ref().map(|g| g.position.clone()), Some(swarm.particles()[0].position.clone()));
    }

    #[test]
    fn nan_fitness_propagates() {
        let objective = |_: &[f64]| f64::NAN;
        let ctl = Controller::new(small(), &objective).unwrap();
        let report = ctl.run_seeded(Variant::Adaptive, &mut NullSink, &mut NullObserver).unwrap();
        assert!(report.global_best.unwrap().fitness.is_nan());
        assert!(report.logbook.records().iter().all(|r| r.summary.avg.is_nan()));
    }
}
