//! Projection of particles into GA chromosomes.

use serde::{Deserialize, Serialize};

use crate::particle::{Coefficients, Particle};

/// How a chromosome is scored from its source particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChromosomeScoring {
    /// The particle's current fitness.
    #[default]
    Direct,
    /// `fitness / (max(0, fitness - last_fitness) + 1)`, scaled by how far the
    /// fitness rose since the previous evaluation.
    ImprovementPenalized,
}

impl ChromosomeScoring {
    pub fn score(&self, fitness: f64, last_fitness: f64) -> f64 {
        match self {
            ChromosomeScoring::Direct => fitness,
            ChromosomeScoring::ImprovementPenalized => fitness / ((fitness - last_fitness).max(0.0) + 1.0),
        }
    }
}

/// A coefficient triple `[inertia, cognitive, social]` plus its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetaIndividual {
    pub genes: [f64; 3],
    pub fitness: f64,
}

impl MetaIndividual {
    pub fn new(coefficients: Coefficients, fitness: f64) -> Self { Self { genes: coefficients.to_array(), fitness } }
    pub fn coefficients(&self) -> Coefficients { Coefficients::from_array(self.genes) }
}

pub fn project(particle: &Particle, scoring: ChromosomeScoring) -> MetaIndividual {
    MetaIndividual::new(particle.coefficients, scoring.score(particle.fitness, particle.last_fitness))
}
