//! Per-generation statistics: the logbook a run returns and the sink it
//! streams to.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::controller::Variant;

/// Mean, population standard deviation, min and max. Any NaN input makes
/// every field NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub avg: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl FitnessSummary {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() || values.iter().any(|v| v.is_nan()) {
            return Self { avg: f64::NAN, std: f64::NAN, min: f64::NAN, max: f64::NAN };
        }
        let n = values.len() as f64;
        let avg = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self { avg, std: var.sqrt(), min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub evaluations: usize,
    #[serde(flatten)]
    pub summary: FitnessSummary,
    /// Global best fitness once the generation's best tracking finished.
    pub best: f64,
}

impl GenerationRecord {
    /// Tab-separated row matching [`Logbook::HEADER`].
    pub fn stream(&self) -> String {
        let s = &self.summary;
        format!("{}\t{}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}", self.generation, self.evaluations, s.avg, s.std, s.min, s.max, self.best)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logbook {
    records: Vec<GenerationRecord>,
}

impl Logbook {
    pub const HEADER: &'static str = "gen\tevals\tavg\tstd\tmin\tmax\tbest";

    pub fn push(&mut self, record: GenerationRecord) { self.records.push(record); }
    pub fn records(&self) -> &[GenerationRecord] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn last(&self) -> Option<&GenerationRecord> { self.records.last() }
    pub fn best_history(&self) -> Vec<f64> { self.records.iter().map(|r| r.best).collect() }
    pub fn total_evaluations(&self) -> usize { self.records.iter().map(|r| r.evaluations).sum() }
}

/// Receives the raw fitness values of each generation.
pub trait StatisticsSink {
    fn record(&mut self, variant: Variant, generation: usize, evaluations: usize, fitness: &[f64]);
}

impl<F> StatisticsSink for F
where
    F: FnMut(Variant, usize, usize, &[f64]),
{
    fn record(&mut self, variant: Variant, generation: usize, evaluations: usize, fitness: &[f64]) { self(variant, generation, evaluations, fitness) }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StatisticsSink for NullSink {
    fn record(&mut self, _: Variant, _: usize, _: usize, _: &[f64]) {}
}

/// Logs one line per generation through `tracing`. Every line leads with the
/// variant so interleaved runs can be told apart.
#[derive(Debug, Default)]
pub struct TracingSink {
    header_written: bool,
}

impl TracingSink {
    pub const HEADER: &'static str = "variant\tgen\tevals\tavg\tstd\tmin\tmax";

    pub fn new() -> Self { Self::default() }

    pub fn row(variant: Variant, generation: usize, evaluations: usize, fitness: &[f64]) -> String {
        let s = FitnessSummary::from_values(fitness);
        format!("{}\t{generation}\t{evaluations}\t{:.6}\t{:.6}\t{:.6}\t{:.6}", variant.as_str(), s.avg, s.std, s.min, s.max)
    }
}

impl StatisticsSink for TracingSink {
    fn record(&mut self, variant: Variant, generation: usize, evaluations: usize, fitness: &[f64]) {
        if !self.header_written {
            info!(target: "swarm_optim::stats", variant = variant.as_str(), "{}", Self::HEADER);
            self.header_written = true;
        }
        info!(target: "swarm_optim::stats", variant = variant.as_str(), "{}", Self::row(variant, generation, evaluations, fitness));
    }
}
