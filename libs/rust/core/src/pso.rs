//! PSO position/velocity update.

use serde::{Deserialize, Serialize};

use crate::particle::{BestSnapshot, Coefficients, Particle};
use crate::random::RandomSource;

/// How coefficients evolve across updates on their own.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum CoefficientGrowth {
    #[default]
    Fixed,
    /// Each coefficient becomes `min(c * rate, ceiling)` once per update.
    Geometric { rate: f64, ceiling: f64 },
}

impl CoefficientGrowth {
    pub fn apply(&self, c: Coefficients) -> Coefficients {
        match *self {
            CoefficientGrowth::Fixed => c,
            CoefficientGrowth::Geometric { rate, ceiling } => Coefficients {
                inertia: (c.inertia * rate).min(ceiling),
                cognitive: (c.cognitive * rate).min(ceiling),
                social: (c.social * rate).min(ceiling),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateParams {
    pub phi1: f64,
    pub phi2: f64,
    pub growth: CoefficientGrowth,
}

impl Default for UpdateParams {
    fn default() -> Self { Self { phi1: 2.0, phi2: 2.0, growth: CoefficientGrowth::Fixed } }
}

/// Advance one particle toward its personal best and `global_best`.
///
/// Velocity is computed with the coefficients held on entry, growth (if any)
/// is applied, then the velocity is clamped and added to the position. The
/// position itself is never clamped. A particle without a personal best is
/// attracted to its own position, which contributes nothing.
pub fn update_particle<R>(particle: &mut Particle, global_best: &BestSnapshot, params: &UpdateParams, motion: &mut R)
where
    R: RandomSource + ?Sized,
{
    let dim = particle.dimensions();
    let u1: Vec<f64> = (0..dim).map(|_| motion.uniform(0.0, params.phi1)).collect();
    let u2: Vec<f64> = (0..dim).map(|_| motion.uniform(0.0, params.phi2)).collect();

    let Coefficients { inertia, cognitive, social } = particle.coefficients;
    let personal = particle.personal_best.as_ref().map_or(particle.position.as_slice(), |b| b.position.as_slice());
    let raw: Vec<f64> = (0..dim)
        .map(|d| {
            let x = particle.position[d];
            inertia * particle.velocity[d] + cognitive * u1[d] * (personal[d] - x) + social * u2[d] * (global_best.position[d] - x)
        })
        .collect();

    particle.coefficients = params.growth.apply(particle.coefficients);

    let bounds = particle.velocity_bounds;
    particle.velocity = raw.into_iter().map(|v| bounds.confine(v)).collect();
    for (x, v) in particle.position.iter_mut().zip(&particle.velocity) { *x += v; }
}
