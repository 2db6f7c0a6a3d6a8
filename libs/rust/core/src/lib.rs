//! Particle swarm optimizer with GA-tuned per-particle coefficients.
//!
//! Two variants share one generation loop: `Adaptive`, where a meta GA evolves
//! `(inertia, cognitive, social)` triples and injects them into the worst
//! particles each generation, and `Baseline`, a fixed-coefficient PSO.

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Install the process-wide fmt subscriber once. `RUST_LOG` selects the
/// filter (default `info`); `SWARM_JSON_LOG=1|true` switches to JSON lines.
pub fn init_tracing(service: &str) -> Result<()> {
    TRACING_INIT.get_or_try_init(|| -> Result<()> {
        let json = std::env::var("SWARM_JSON_LOG").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let installed = if json {
            builder.json().flatten_event(true).with_current_span(true).try_init()
        } else {
            builder.with_target(true).with_line_number(true).try_init()
        };
        installed.map_err(|e| anyhow::anyhow!(e))
    })?;
    info!(target: "swarm_optim", service, "tracing initialized");
    Ok(())
}

pub mod config;
pub mod controller;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod meta;
pub mod metrics;
pub mod objectives;
pub mod observer;
pub mod particle;
pub mod pso;
pub mod random;
pub mod recalibrate;
pub mod stats;

pub use config::{load_config, OptimizerConfig};
pub use controller::{Controller, RunReport, Variant};
pub use error::OptimizerError;
pub use ga::{GaParams, MetaGa};
pub use meta::{ChromosomeScoring, MetaIndividual};
pub use metrics::{OptimizerMetrics, OPTIMIZER_METRICS};
pub use objectives::{Objective, ObjectiveKind};
pub use observer::{JsonLinesObserver, LandscapeGrid, NullObserver, SwarmFrame, SwarmObserver};
pub use particle::{BestSnapshot, Bounds, Coefficients, Particle, Swarm, SwarmSpec};
pub use pso::{CoefficientGrowth, UpdateParams};
pub use random::{RandomSource, RandomSources};
pub use stats::{FitnessSummary, GenerationRecord, Logbook, NullSink, StatisticsSink, TracingSink};
