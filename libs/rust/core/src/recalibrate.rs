//! Injection of GA-evolved coefficients into the worst particles.

use crate::fitness::best_first;
use crate::meta::MetaIndividual;
use crate::particle::Swarm;

/// Indices of the `k` highest-fitness particles, worst first; ties keep
/// swarm order.
pub fn select_worst(swarm: &Swarm, k: usize) -> Vec<usize> {
    let particles = swarm.particles();
    let mut order: Vec<usize> = (0..particles.len()).collect();
    order.sort_by(|&a, &b| best_first(particles[b].fitness, particles[a].fitness));
    order.truncate(k);
    order
}

/// Overwrite the coefficients of the `evolved.len()` worst particles:
/// the i-th worst receives `evolved[i]`. Returns the touched indices in that
/// order. No other particle state changes.
pub fn recalibrate(swarm: &mut Swarm, evolved: &[MetaIndividual]) -> Vec<usize> {
    let targets = select_worst(swarm, evolved.len());
    let particles = swarm.particles_mut();
    for (&idx, chromosome) in targets.iter().zip(evolved) {
        particles[idx].coefficients = chromosome.coefficients();
    }
    targets
}
