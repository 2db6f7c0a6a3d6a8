//! OpenTelemetry instruments for optimizer runs.
//!
//! Instruments hang off the global meter; without an installed provider they
//! are no-ops.

use once_cell::sync::Lazy;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::KeyValue;

use crate::controller::Variant;

pub struct OptimizerMetrics {
    pub generations_total: Counter<u64>,
    pub evaluations_total: Counter<u64>,
    pub recalibrations_total: Counter<u64>,
    pub global_best_fitness: Histogram<f64>,
}

static OPTIM_METER: Lazy<Meter> = Lazy::new(|| opentelemetry::global::meter("swarm_optim"));

pub static OPTIMIZER_METRICS: Lazy<OptimizerMetrics> = Lazy::new(|| OptimizerMetrics {
    generations_total: OPTIM_METER.u64_counter("pso_generations_total").with_description("Completed optimizer generations").build(),
    evaluations_total: OPTIM_METER.u64_counter("pso_evaluations_total").with_description("Objective evaluations, warm-up included").build(),
    recalibrations_total: OPTIM_METER.u64_counter("pso_recalibrations_total").with_description("Particles whose coefficients were replaced by the meta GA").build(),
    global_best_fitness: OPTIM_METER.f64_histogram("pso_global_best_fitness").with_description("Global best fitness at the end of each generation").build(),
});

impl OptimizerMetrics {
    pub(crate) fn evaluated(&self, variant: Variant, count: usize) { self.evaluations_total.add(count as u64, &[variant_attr(variant)]); }
    pub(crate) fn recalibrated(&self, variant: Variant, count: usize) { self.recalibrations_total.add(count as u64, &[variant_attr(variant)]); }

    pub(crate) fn generation_done(&self, variant: Variant, best: f64) {
        let attrs = [variant_attr(variant)];
        self.generations_total.add(1, &attrs);
        if best.is_finite() { self.global_best_fitness.record(best, &attrs); }
    }
}

fn variant_attr(variant: Variant) -> KeyValue { KeyValue::new("variant", variant.as_str()) }
