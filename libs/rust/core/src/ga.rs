//! Meta-parameter GA over coefficient triples.
//!
//! One pass per generation: elite selection, pairwise BLX-α crossover,
//! Gaussian mutation. The chromosome count never changes within a pass and
//! genes are not clamped afterwards.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::fitness::best_first;
use crate::meta::MetaIndividual;
use crate::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaParams {
    /// K: chromosomes kept by elite selection.
    pub elite_count: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    /// Per-gene mutation probability once a chromosome is picked for mutation.
    pub gene_mutation_probability: f64,
    pub mutation_sigma: f64,
    pub blend_alpha: f64,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            elite_count: 3,
            crossover_probability: 0.5,
            mutation_probability: 0.3,
            gene_mutation_probability: 0.5,
            mutation_sigma: 0.1,
            blend_alpha: 0.2,
        }
    }
}

/// The `k` lowest-scoring chromosomes in ascending order; ties keep input order.
pub fn select_best(pool: &[MetaIndividual], k: usize) -> Vec<MetaIndividual> {
    let mut ranked = pool.to_vec();
    ranked.sort_by(|a, b| best_first(a.fitness, b.fitness));
    ranked.truncate(k);
    ranked
}

/// BLX-α: per gene `gamma = (1 + 2α)·r − α` with `r ~ U[0,1)`, and the
/// children are `(1−γ)·x1 + γ·x2` and `γ·x1 + (1−γ)·x2`. Both parents are
/// replaced in place.
pub fn blend_crossover<R>(a: &mut MetaIndividual, b: &mut MetaIndividual, alpha: f64, rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    for (x1, x2) in a.genes.iter_mut().zip(b.genes.iter_mut()) {
        let gamma = (1.0 + 2.0 * alpha) * rng.uniform(0.0, 1.0) - alpha;
        let (p1, p2) = (*x1, *x2);
        *x1 = (1.0 - gamma) * p1 + gamma * p2;
        *x2 = gamma * p1 + (1.0 - gamma) * p2;
    }
}

/// Adds `N(0, sigma)` to each gene independently with probability `gene_probability`.
pub fn gaussian_mutation<R>(individual: &mut MetaIndividual, gene_probability: f64, sigma: f64, rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    for gene in individual.genes.iter_mut() {
        if rng.chance(gene_probability) { *gene += sigma * rng.standard_normal(); }
    }
}

pub struct MetaGa {
    params: GaParams,
}

impl MetaGa {
    pub fn new(params: GaParams) -> Self { Self { params } }
    pub fn params(&self) -> &GaParams { &self.params }

    /// Run one selection/crossover/mutation pass. Returns exactly
    /// `min(elite_count, pool.len())` chromosomes.
    pub fn evolve<R>(&self, pool: &[MetaIndividual], rng: &mut R) -> Vec<MetaIndividual>
    where
        R: RandomSource + ?Sized,
    {
        let p = &self.params;
        let mut offspring = select_best(pool, p.elite_count);

        let mut crossed = 0usize;
        for pair in offspring.chunks_exact_mut(2) {
            if rng.chance(p.crossover_probability) {
                let (left, right) = pair.split_at_mut(1);
                blend_crossover(&mut left[0], &mut right[0], p.blend_alpha, rng);
                crossed += 1;
            }
        }

        let mut mutated = 0usize;
        for individual in offspring.iter_mut() {
            if rng.chance(p.mutation_probability) {
                gaussian_mutation(individual, p.gene_mutation_probability, p.mutation_sigma, rng);
                mutated += 1;
            }
        }

        trace!(selected = offspring.len(), crossed, mutated, "meta-ga pass");
        offspring
    }
}
