//! Optimizer configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional file named
//! by `PSO_CONFIG_FILE` (YAML/TOML/JSON by extension), then `PSO__*`
//! environment variables (e.g. `PSO__POPULATION_SIZE=80`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::error::{OptimizerError, Result};
use crate::ga::GaParams;
use crate::meta::ChromosomeScoring;
use crate::objectives::ObjectiveKind;
use crate::particle::{Bounds, SwarmSpec};
use crate::pso::{CoefficientGrowth, UpdateParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub population_size: usize,
    pub generation_count: usize,
    pub dimensions: usize,
    pub position_min: f64,
    pub position_max: f64,
    /// K: particles recalibrated per generation, also the GA elite size.
    pub recalibration_count: usize,
    pub inertia_lower_bound: f64,
    pub phi1: f64,
    pub phi2: f64,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    pub mutation_gene_probability: f64,
    pub mutation_sigma: f64,
    pub blend_alpha: f64,
    pub growth_mode_enabled: bool,
    pub growth_rate: f64,
    pub growth_ceiling: f64,
    pub alternate_chromosome_fitness_enabled: bool,
    pub motion_seed: u64,
    pub coefficient_seed: u64,
    pub objective: ObjectiveKind,
    pub parallel_evaluation: bool,
    /// Directory receiving `<variant>.jsonl` frame dumps.
    pub frames_dir: Option<PathBuf>,
    /// Samples per axis of the landscape grid written next to the frames.
    pub heatmap_resolution: usize,
    /// Values above a non-zero threshold are capped to it; 0 disables capping.
    pub heatmap_threshold: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generation_count: 100,
            dimensions: 50,
            position_min: -32.0,
            position_max: 32.0,
            recalibration_count: 3,
            inertia_lower_bound: 0.75,
            phi1: 2.0,
            phi2: 2.0,
            crossover_probability: 0.5,
            mutation_probability: 0.3,
            mutation_gene_probability: 0.5,
            mutation_sigma: 0.1,
            blend_alpha: 0.2,
            growth_mode_enabled: false,
            growth_rate: 1.002,
            growth_ceiling: 2.0,
            alternate_chromosome_fitness_enabled: false,
            motion_seed: 1234,
            coefficient_seed: 1234,
            objective: ObjectiveKind::Ackley,
            parallel_evaluation: false,
            frames_dir: None,
            heatmap_resolution: 100,
            heatmap_threshold: 0.0,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.generation_count == 0 { return Err(OptimizerError::NoGenerations); }
        self.swarm_spec().validate()?;
        if self.recalibration_count > self.population_size {
            return Err(OptimizerError::RecalibrationExceedsPopulation { count: self.recalibration_count, population: self.population_size });
        }
        unit("inertia_lower_bound", self.inertia_lower_bound)?;
        unit("crossover_probability", self.crossover_probability)?;
        unit("mutation_probability", self.mutation_probability)?;
        unit("mutation_gene_probability", self.mutation_gene_probability)?;
        positive("phi1", self.phi1)?;
        positive("phi2", self.phi2)?;
        non_negative("mutation_sigma", self.mutation_sigma)?;
        non_negative("blend_alpha", self.blend_alpha)?;
        non_negative("heatmap_threshold", self.heatmap_threshold)?;
        if self.heatmap_resolution < 2 { return Err(OptimizerError::HeatmapResolution(self.heatmap_resolution)); }
        if self.growth_mode_enabled {
            if !(self.growth_rate > 1.0) { return Err(OptimizerError::GrowthRate(self.growth_rate)); }
            positive("growth_ceiling", self.growth_ceiling)?;
        }
        Ok(())
    }

    pub fn swarm_spec(&self) -> SwarmSpec {
        SwarmSpec {
            population: self.population_size,
            dimensions: self.dimensions,
            position: Bounds::new(self.position_min, self.position_max),
            inertia_lower_bound: self.inertia_lower_bound,
        }
    }

    pub fn growth(&self) -> CoefficientGrowth {
        if self.growth_mode_enabled {
            CoefficientGrowth::Geometric { rate: self.growth_rate, ceiling: self.growth_ceiling }
        } else {
            CoefficientGrowth::Fixed
        }
    }

    pub fn update_params(&self) -> UpdateParams { UpdateParams { phi1: self.phi1, phi2: self.phi2, growth: self.growth() } }

    pub fn ga_params(&self) -> GaParams {
        GaParams {
            elite_count: self.recalibration_count,
            crossover_probability: self.crossover_probability,
            mutation_probability: self.mutation_probability,
            gene_mutation_probability: self.mutation_gene_probability,
            mutation_sigma: self.mutation_sigma,
            blend_alpha: self.blend_alpha,
        }
    }

    pub fn scoring(&self) -> ChromosomeScoring {
        if self.alternate_chromosome_fitness_enabled { ChromosomeScoring::ImprovementPenalized } else { ChromosomeScoring::Direct }
    }

    /// Parse a YAML document layered over the defaults, then validate.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg = base_builder()?.add_source(config::File::from_str(text, config::FileFormat::Yaml)).build()?;
        let parsed: OptimizerConfig = cfg.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }
}

fn unit(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) { return Err(OptimizerError::OutOfUnitRange { name, value }); }
    Ok(())
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if !(value > 0.0) { return Err(OptimizerError::NonPositive { name, value }); }
    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if !(value >= 0.0) { return Err(OptimizerError::Negative { name, value }); }
    Ok(())
}

fn base_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let defaults = config::Config::try_from(&OptimizerConfig::default())?;
    Ok(config::Config::builder().add_source(defaults))
}

/// Load from defaults, `PSO_CONFIG_FILE` and `PSO__*` environment variables,
/// then validate.
pub fn load_config() -> Result<OptimizerConfig> {
    let mut builder = base_builder()?;
    if let Ok(file) = std::env::var("PSO_CONFIG_FILE") {
        debug!(%file, "layering optimizer config file");
        builder = builder.add_source(config::File::with_name(&file).required(false));
    }
    builder = builder.add_source(config::Environment::with_prefix("PSO").separator("__").try_parsing(true));
    let cfg: OptimizerConfig = builder.build()?.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = OptimizerConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.swarm_spec().velocity(), Bounds::new(-6.4, 6.4));
        assert_eq!(cfg.growth(), CoefficientGrowth::Fixed);
        assert_eq!(cfg.scoring(), ChromosomeScoring::Direct);
        assert_eq!(cfg.ga_params(), GaParams::default());
    }

    #[test]
    fn validation_failures() {
        let bad = |f: fn(&mut OptimizerConfig)| {
            let mut c = OptimizerConfig::default();
            f(&mut c);
            c.validate().unwrap_err()
        };
        assert!(matches!(bad(|c| c.population_size = 0), OptimizerError::EmptyPopulation));
        assert!(matches!(bad(|c| c.generation_count = 0), OptimizerError::NoGenerations));
        assert!(matches!(bad(|c| c.dimensions = 0), OptimizerError::NoDimensions));
        assert!(matches!(bad(|c| c.position_min = 40.0), OptimizerError::InvertedBounds { .. }));
        assert!(matches!(bad(|c| c.recalibration_count = 51), OptimizerError::RecalibrationExceedsPopulation { count: 51, population: 50 }));
        assert!(matches!(bad(|c| c.inertia_lower_bound = 1.5), OptimizerError::OutOfUnitRange { name: "inertia_lower_bound", .. }));
        assert!(matches!(bad(|c| c.phi2 = 0.0), OptimizerError::NonPositive { name: "phi2", .. }));
        assert!(matches!(bad(|c| c.mutation_sigma = -0.1), OptimizerError::Negative { .. }));
        assert!(matches!(bad(|c| c.heatmap_resolution = 1), OptimizerError::HeatmapResolution(1)));
        assert!(matches!(bad(|c| c.heatmap_threshold = -1.0), OptimizerError::Negative { name: "heatmap_threshold", .. }));
        assert!(matches!(bad(|c| { c.growth_mode_enabled = true; c.growth_rate = 0.9; }), OptimizerError::GrowthRate(_)));
    }

    #[test]
    fn recalibration_count_may_equal_population() {
        let cfg = OptimizerConfig { population_size: 4, recalibration_count: 4, ..OptimizerConfig::default() };
        cfg.validate().unwrap();
    }

    #[test]
    fn yaml_overrides_defaults() {
        let cfg = OptimizerConfig::from_yaml_str(
            "population_size: 12\nrecalibration_count: 5\nobjective: whitley\ngrowth_mode_enabled: true\nalternate_chromosome_fitness_enabled: true\n",
        )
        .unwrap();
        assert_eq!(cfg.population_size, 12);
        assert_eq!(cfg.recalibration_count, 5);
        assert_eq!(cfg.objective, ObjectiveKind::Whitley);
        assert_eq!(cfg.generation_count, 100);
        assert_eq!(cfg.growth(), CoefficientGrowth::Geometric { rate: 1.002, ceiling: 2.0 });
        assert_eq!(cfg.scoring(), ChromosomeScoring::ImprovementPenalized);
    }

    #[test]
    fn yaml_rejects_invalid() {
        let err = OptimizerConfig::from_yaml_str("population_size: 2\nrecalibration_count: 3\n").unwrap_err();
        assert!(matches!(err, OptimizerError::RecalibrationExceedsPopulation { .. }));
    }
}
