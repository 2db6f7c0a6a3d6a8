//! Error type for configuration validation and loading.
//!
//! Only construction can fail. Once a run starts every numeric condition,
//! including non-finite fitness, propagates as-is.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("population size must be at least 1")]
    EmptyPopulation,
    #[error("generation count must be at least 1")]
    NoGenerations,
    #[error("dimensionality must be at least 1")]
    NoDimensions,
    #[error("{name} bounds inverted: min {min} must be below max {max}")]
    InvertedBounds { name: &'static str, min: f64, max: f64 },
    #[error("recalibration count {count} exceeds population size {population}")]
    RecalibrationExceedsPopulation { count: usize, population: usize },
    #[error("{name} must lie in [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("growth rate must exceed 1, got {0}")]
    GrowthRate(f64),
    #[error("heatmap resolution must be at least 2, got {0}")]
    HeatmapResolution(usize),
    #[error("configuration load failed: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
