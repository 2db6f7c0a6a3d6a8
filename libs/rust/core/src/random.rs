//! Sampling seam shared by every stochastic operator.
//!
//! A run consumes two independent generators: the *motion* source (positions,
//! velocities, PSO draws, crossover, mutation) and the *coefficient* source
//! (initial inertia/cognitive/social). Both are passed explicitly into each
//! sampling call site; nothing reads ambient generator state.
//!
//! Consumption order on the motion source, which bit-reproducibility depends on:
//! 1. swarm init, per particle: D position draws, then D velocity draws
//! 2. per generation, per particle in swarm order: D `u1` draws, then D `u2` draws
//! 3. GA, per pair: one crossover coin, then one draw per gene if crossing
//! 4. GA, per chromosome: one mutation coin, then per gene one coin and a
//!    standard-normal draw on hit
//!
//! The coefficient source is drawn only at init, per particle: inertia,
//! cognitive, social.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

pub trait RandomSource {
    /// Uniform draw from `[low, high)`; `low == high` yields `low`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Draw from N(0, 1).
    fn standard_normal(&mut self) -> f64;

    fn chance(&mut self, probability: f64) -> bool { self.uniform(0.0, 1.0) < probability }
}

impl<R: Rng> RandomSource for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 { low + (high - low) * self.gen::<f64>() }

    fn standard_normal(&mut self) -> f64 { StandardNormal.sample(self) }
}

/// The pair of seeded generators one variant run consumes.
#[derive(Debug, Clone)]
pub struct RandomSources<R = StdRng> {
    pub motion: R,
    pub coefficients: R,
}

impl RandomSources<StdRng> {
    pub fn from_seeds(motion_seed: u64, coefficient_seed: u64) -> Self {
        Self { motion: StdRng::seed_from_u64(motion_seed), coefficients: StdRng::seed_from_u64(coefficient_seed) }
    }
}
