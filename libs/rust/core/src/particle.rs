//! Particle and swarm model.
//!
//! Positions are bounded only at initialization. After the first move a
//! particle may leave the initial domain; velocity is the only clamped state.

use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};
use crate::fitness::is_strictly_better;
use crate::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self { Self { min, max } }

    /// Velocity bounds derived from a position domain: `±width / 10`.
    pub fn velocity_for(position: Bounds) -> Self {
        Self { min: (position.min - position.max) / 10.0, max: (position.max - position.min) / 10.0 }
    }

    pub fn width(&self) -> f64 { self.max - self.min }

    /// Pull `value` into `[min, max]`. NaN passes through untouched.
    #[inline]
    pub fn confine(&self, value: f64) -> f64 {
        if value < self.min { self.min } else if value > self.max { self.max } else { value }
    }

    fn check(&self, name: &'static str) -> Result<()> {
        if !(self.min < self.max) { return Err(OptimizerError::InvertedBounds { name, min: self.min, max: self.max }); }
        Ok(())
    }
}

/// Per-particle PSO weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub inertia: f64,
    pub cognitive: f64,
    pub social: f64,
}

impl Coefficients {
    /// The fixed weights of the baseline variant.
    pub const UNIT: Self = Self { inertia: 1.0, cognitive: 1.0, social: 1.0 };

    pub fn new(inertia: f64, cognitive: f64, social: f64) -> Self { Self { inertia, cognitive, social } }
    pub fn to_array(self) -> [f64; 3] { [self.inertia, self.cognitive, self.social] }
    pub fn from_array([inertia, cognitive, social]: [f64; 3]) -> Self { Self { inertia, cognitive, social } }

    fn random<R: RandomSource + ?Sized>(inertia_lower_bound: f64, rng: &mut R) -> Self {
        let inertia = rng.uniform(inertia_lower_bound, 1.0);
        let cognitive = rng.uniform(0.0, 1.0);
        let social = rng.uniform(0.0, 1.0);
        Self { inertia, cognitive, social }
    }
}

/// Position + fitness record. Replaced wholesale on improvement, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestSnapshot {
    pub position: Vec<f64>,
    pub fitness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    /// Last evaluated fitness; `+inf` before the first evaluation.
    pub fitness: f64,
    /// Fitness one evaluation earlier.
    pub last_fitness: f64,
    pub personal_best: Option<BestSnapshot>,
    pub coefficients: Coefficients,
    pub velocity_bounds: Bounds,
    pub position_bounds: Bounds,
}

impl Particle {
    pub fn random<M, C>(spec: &SwarmSpec, motion: &mut M, coefficients: &mut C) -> Self
    where
        M: RandomSource + ?Sized,
        C: RandomSource + ?Sized,
    {
        let position_bounds = spec.position;
        let velocity_bounds = spec.velocity();
        let position = (0..spec.dimensions).map(|_| motion.uniform(position_bounds.min, position_bounds.max)).collect();
        let velocity = (0..spec.dimensions).map(|_| motion.uniform(velocity_bounds.min, velocity_bounds.max)).collect();
        Self {
            position,
            velocity,
            fitness: f64::INFINITY,
            last_fitness: f64::INFINITY,
            personal_best: None,
            coefficients: Coefficients::random(spec.inertia_lower_bound, coefficients),
            velocity_bounds,
            position_bounds,
        }
    }

    pub fn dimensions(&self) -> usize { self.position.len() }

    /// Store a freshly evaluated fitness, shifting the previous one into `last_fitness`.
    pub fn record_fitness(&mut self, fitness: f64) {
        self.last_fitness = self.fitness;
        self.fitness = fitness;
    }

    /// Adopt the current state as personal best if it is strictly better, or
    /// if none exists yet. Returns whether the record was replaced.
    pub fn refresh_personal_best(&mut self) -> bool {
        let replace = self.personal_best.as_ref().map_or(true, |best| is_strictly_better(self.fitness, best.fitness));
        if replace { self.personal_best = Some(self.snapshot()); }
        replace
    }

    pub fn snapshot(&self) -> BestSnapshot { BestSnapshot { position: self.position.clone(), fitness: self.fitness } }
}

/// Shape of a swarm to build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwarmSpec {
    pub population: usize,
    pub dimensions: usize,
    pub position: Bounds,
    pub inertia_lower_bound: f64,
}

impl SwarmSpec {
    pub fn velocity(&self) -> Bounds { Bounds::velocity_for(self.position) }

    pub fn validate(&self) -> Result<()> {
        if self.population == 0 { return Err(OptimizerError::EmptyPopulation); }
        if self.dimensions == 0 { return Err(OptimizerError::NoDimensions); }
        self.position.check("position")?;
        self.velocity().check("velocity")?;
        Ok(())
    }
}

/// Fixed-size ordered particle collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Swarm {
    particles: Vec<Particle>,
}

impl Swarm {
    pub fn initialize<M, C>(spec: &SwarmSpec, motion: &mut M, coefficients: &mut C) -> Result<Self>
    where
        M: RandomSource + ?Sized,
        C: RandomSource + ?Sized,
    {
        spec.validate()?;
        let particles = (0..spec.population).map(|_| Particle::random(spec, motion, coefficients)).collect();
        Ok(Self { particles })
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self { Self { particles } }

    pub fn len(&self) -> usize { self.particles.len() }
    pub fn is_empty(&self) -> bool { self.particles.is_empty() }
    pub fn particles(&self) -> &[Particle] { &self.particles }
    pub fn particles_mut(&mut self) -> &mut [Particle] { &mut self.particles }
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> { self.particles.iter() }
    pub fn fitness_values(&self) -> Vec<f64> { self.particles.iter().map(|p| p.fitness).collect() }
    pub fn into_particles(self) -> Vec<Particle> { self.particles }
}
