//! Objective oracles (minimization).
//!
//! The engine only needs [`Objective`]; the built-in landscapes exist so a
//! run can be configured by name.

use serde::{Deserialize, Serialize};
use std::f64::consts::{E, PI};

pub trait Objective: Send + Sync {
    fn evaluate(&self, position: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn evaluate(&self, position: &[f64]) -> f64 { self(position) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveKind {
    #[default]
    Ackley,
    Whitley,
    Sphere,
    Rastrigin,
}

impl ObjectiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectiveKind::Ackley => "ackley",
            ObjectiveKind::Whitley => "whitley",
            ObjectiveKind::Sphere => "sphere",
            ObjectiveKind::Rastrigin => "rastrigin",
        }
    }
}

impl Objective for ObjectiveKind {
    fn evaluate(&self, x: &[f64]) -> f64 {
        match self {
            ObjectiveKind::Ackley => ackley(x),
            ObjectiveKind::Whitley => whitley(x),
            ObjectiveKind::Sphere => sphere(x),
            ObjectiveKind::Rastrigin => rastrigin(x),
        }
    }
}

/// Global minimum 0 at the origin; usual domain `[-15, 30]^n` or `[-32, 32]^n`.
pub fn ackley(x: &[f64]) -> f64 {
    let n = x.len() as f64;
    let sq = x.iter().map(|v| v * v).sum::<f64>() / n;
    let cos = x.iter().map(|v| (2.0 * PI * v).cos()).sum::<f64>() / n;
    20.0 - 20.0 * (-0.2 * sq.sqrt()).exp() + E - cos.exp()
}

/// Global minimum 0 at `[1, ..., 1]`; usual domain `[-10.24, 10.24]^n`.
pub fn whitley(x: &[f64]) -> f64 {
    let mut total = 0.0;
    for &xi in x {
        for &xj in x {
            let t = 100.0 * (xi * xi - xj) + (1.0 - xj).powi(2);
            total += t * t / 4000.0 - t.cos() + 1.0;
        }
    }
    total
}

pub fn sphere(x: &[f64]) -> f64 { x.iter().map(|v| v * v).sum() }

pub fn rastrigin(x: &[f64]) -> f64 {
    10.0 * x.len() as f64 + x.iter().map(|v| v * v - 10.0 * (2.0 * PI * v).cos()).sum::<f64>()
}
