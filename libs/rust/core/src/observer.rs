//! Per-generation swarm frames for external renderers.
//!
//! The controller hands each observer a borrowed [`SwarmFrame`] after the
//! generation completes. Observer errors are logged by the controller and
//! never affect the run.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::controller::Variant;
use crate::objectives::Objective;
use crate::particle::{Bounds, Coefficients, Swarm};

#[derive(Debug, Clone, Serialize)]
pub struct SwarmFrame<'a> {
    pub variant: Variant,
    pub generation: usize,
    pub positions: Vec<&'a [f64]>,
    pub velocities: Vec<&'a [f64]>,
    pub coefficients: Vec<Coefficients>,
    pub fitness: Vec<f64>,
    pub personal_best: Vec<Option<f64>>,
    pub global_best: Option<f64>,
}

impl<'a> SwarmFrame<'a> {
    pub fn capture(variant: Variant, generation: usize, swarm: &'a Swarm, global_best: Option<f64>) -> Self {
        Self {
            variant,
            generation,
            positions: swarm.iter().map(|p| p.position.as_slice()).collect(),
            velocities: swarm.iter().map(|p| p.velocity.as_slice()).collect(),
            coefficients: swarm.iter().map(|p| p.coefficients).collect(),
            fitness: swarm.iter().map(|p| p.fitness).collect(),
            personal_best: swarm.iter().map(|p| p.personal_best.as_ref().map(|b| b.fitness)).collect(),
            global_best,
        }
    }
}

pub trait SwarmObserver {
    fn observe(&mut self, frame: &SwarmFrame<'_>) -> Result<()>;
}

impl<F> SwarmObserver for F
where
    F: FnMut(&SwarmFrame<'_>) -> Result<()>,
{
    fn observe(&mut self, frame: &SwarmFrame<'_>) -> Result<()> { self(frame) }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SwarmObserver for NullObserver {
    fn observe(&mut self, _frame: &SwarmFrame<'_>) -> Result<()> { Ok(()) }
}

/// Writes one JSON document per frame, newline separated.
pub struct JsonLinesObserver<W: Write> {
    writer: W,
    frames: usize,
}

impl JsonLinesObserver<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("creating frame file {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesObserver<W> {
    pub fn new(writer: W) -> Self { Self { writer, frames: 0 } }
    pub fn frames(&self) -> usize { self.frames }
    pub fn into_inner(self) -> W { self.writer }
}

impl<W: Write> SwarmObserver for JsonLinesObserver<W> {
    fn observe(&mut self, frame: &SwarmFrame<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, frame)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.frames += 1;
        Ok(())
    }
}

/// Objective sampled over the first two dimensions of the position domain,
/// the backdrop renderers draw frames on. `values[i][j]` is the objective at
/// `(axis[i], axis[j])`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandscapeGrid {
    pub axis: Vec<f64>,
    pub values: Vec<Vec<f64>>,
    pub threshold: Option<f64>,
}

impl LandscapeGrid {
    /// `resolution` evenly spaced samples per axis, both bounds included. A
    /// non-zero `threshold` caps larger values to it.
    pub fn sample<O: Objective + ?Sized>(objective: &O, bounds: Bounds, resolution: usize, threshold: f64) -> Self {
        let step = if resolution > 1 { bounds.width() / (resolution - 1) as f64 } else { 0.0 };
        let axis: Vec<f64> = (0..resolution).map(|i| bounds.min + step * i as f64).collect();
        let threshold = (threshold > 0.0).then_some(threshold);
        let values = axis
            .iter()
            .map(|&x| {
                axis.iter()
                    .map(|&y| {
                        let v = objective.evaluate(&[x, y]);
                        match threshold {
                            Some(t) if v > t => t,
                            _ => v,
                        }
                    })
                    .collect()
            })
            .collect();
        Self { axis, values, threshold }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("creating landscape file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
