use anyhow::{Context, Result};
use swarm_optim::{load_config, Controller, JsonLinesObserver, LandscapeGrid, NullObserver, Objective, OptimizerConfig, RunReport, SwarmObserver, TracingSink, Variant};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    swarm_optim::init_tracing("optimizer-runner")?;
    let cfg = load_config().context("loading optimizer config")?;
    info!(
        target: "optimizer-runner",
        objective = cfg.objective.name(),
        population = cfg.population_size,
        generations = cfg.generation_count,
        dimensions = cfg.dimensions,
        "Starting optimizer-runner"
    );

    if let Some(dir) = &cfg.frames_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating frames dir {}", dir.display()))?;
        let bounds = cfg.swarm_spec().position;
        let grid = LandscapeGrid::sample(&cfg.objective, bounds, cfg.heatmap_resolution, cfg.heatmap_threshold);
        grid.write_json(dir.join("landscape.json"))?;
    }

    // One variant after the other so the two logbook streams stay contiguous.
    let mut reports = Vec::with_capacity(2);
    for variant in [Variant::Adaptive, Variant::Baseline] {
        let cfg = cfg.clone();
        reports.push(tokio::task::spawn_blocking(move || run_variant(&cfg, variant)).await??);
    }

    for report in &reports { summarize(&cfg, report); }
    Ok(())
}

fn run_variant(cfg: &OptimizerConfig, variant: Variant) -> Result<RunReport> {
    let objective = cfg.objective;
    let controller = Controller::new(cfg.clone(), &objective)?;
    let mut observer: Box<dyn SwarmObserver> = match &cfg.frames_dir {
        Some(dir) => Box::new(JsonLinesObserver::create(dir.join(format!("{}.jsonl", variant.as_str())))?),
        None => Box::new(NullObserver),
    };
    let report = controller.run_seeded(variant, &mut TracingSink::new(), observer.as_mut())?;
    Ok(report)
}

fn summarize(cfg: &OptimizerConfig, report: &RunReport) {
    match &report.global_best {
        Some(best) => info!(
            target: "optimizer-runner",
            variant = report.variant.as_str(),
            best = cfg.objective.evaluate(&best.position),
            evaluations = report.evaluations,
            "best value found"
        ),
        None => info!(target: "optimizer-runner", variant = report.variant.as_str(), "no best recorded"),
    }
}
