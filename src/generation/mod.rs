//! Tile generation algorithms and their single entry point.
//!
//! A run takes a [`GenerationConfig`], prepares exactly one job for the
//! selected [`GenerationMethod`], and drives it through a
//! [`GenerationPipeline`]:
//! 1. Space partition: rooms in partition leaves, dog-leg corridors, ground fill
//! 2. Cellular automaton: random water/grass field smoothed by majority vote
//! 3. Noise field: fractal elevation classified into water/sand/grass/rock

pub mod config;
pub mod bsp;
pub mod rooms;
pub mod cellular;
pub mod noise_field;

pub use config::{CellularConfig, GenerationConfig, GenerationMethod, NoiseConfig, SpacePartitionConfig};
pub use bsp::{NodeId, PartitionNode, PartitionTree, SplitAxis};
pub use rooms::{Corridor, DungeonJob, DungeonPlan, RoomCorridorBuilder};
pub use cellular::{CellField, CellularJob};
pub use noise_field::{NoiseField, NoiseJob};

use crate::core::{Error, Result};
use crate::grid::{Grid, TileWriter};
use crate::math::Rect;
use crate::pipeline::{Advance, CancellationSignal, GenerationPipeline, Outcome, Resumable};
use crate::random::SeededRandom;

/// A prepared job for one of the supported algorithms.
pub enum GenerationJob {
    SpacePartition(DungeonJob),
    CellularAutomaton(CellularJob),
    NoiseField(NoiseJob),
}

impl GenerationJob {
    /// Prepare a job on the current thread. Space partition planning runs
    /// here as well.
    pub fn prepare<G: Grid + ?Sized>(config: &GenerationConfig, grid: &G) -> Result<Self> {
        let bounds = grid_bounds(grid)?;
        let mut rng = run_random(config);
        log_start(config, bounds, rng.seed());

        Ok(match &config.method {
            GenerationMethod::SpacePartition(bsp) => {
                let plan = RoomCorridorBuilder::new(bsp.clone()).plan(bounds, &mut rng);
                GenerationJob::SpacePartition(DungeonJob::new(plan))
            }
            GenerationMethod::CellularAutomaton(ca) => Self::cellular(config, ca, rng),
            GenerationMethod::NoiseField(noise) => Self::noise(config, noise),
        })
    }

    /// Prepare a job, running space partition planning on the blocking pool.
    pub async fn prepare_async<G: Grid + ?Sized>(config: &GenerationConfig, grid: &G) -> Result<Self> {
        let bounds = grid_bounds(grid)?;
        let mut rng = run_random(config);
        log_start(config, bounds, rng.seed());

        Ok(match &config.method {
            GenerationMethod::SpacePartition(bsp) => {
                let builder = RoomCorridorBuilder::new(bsp.clone());
                let plan = tokio::task::spawn_blocking(move || builder.plan(bounds, &mut rng)).await?;
                GenerationJob::SpacePartition(DungeonJob::new(plan))
            }
            GenerationMethod::CellularAutomaton(ca) => Self::cellular(config, ca, rng),
            GenerationMethod::NoiseField(noise) => Self::noise(config, noise),
        })
    }

    fn cellular(config: &GenerationConfig, ca: &CellularConfig, rng: SeededRandom) -> Self {
        GenerationJob::CellularAutomaton(CellularJob::new(ca, config.step_delay(), rng))
    }

    fn noise(config: &GenerationConfig, noise: &NoiseConfig) -> Self {
        GenerationJob::NoiseField(NoiseJob::new(noise, config.samples_per_checkpoint))
    }

    pub fn name(&self) -> &'static str {
        match self {
            GenerationJob::SpacePartition(_) => "space_partition",
            GenerationJob::CellularAutomaton(_) => "cellular_automaton",
            GenerationJob::NoiseField(_) => "noise_field",
        }
    }
}

impl Resumable for GenerationJob {
    fn advance<G: TileWriter + ?Sized>(&mut self, grid: &mut G) -> Advance {
        match self {
            GenerationJob::SpacePartition(job) => job.advance(grid),
            GenerationJob::CellularAutomaton(job) => job.advance(grid),
            GenerationJob::NoiseField(job) => job.advance(grid),
        }
    }

    fn tiles_committed(&self) -> u64 {
        match self {
            GenerationJob::SpacePartition(job) => job.tiles_committed(),
            GenerationJob::CellularAutomaton(job) => job.tiles_committed(),
            GenerationJob::NoiseField(job) => job.tiles_committed(),
        }
    }
}

/// Run one generation to the end on the current thread.
///
/// Fails only on configuration errors, before any tile is written.
/// Cancellation is reported through the returned [`Outcome`].
pub fn generate<G: TileWriter + ?Sized>(
    config: &GenerationConfig,
    grid: &mut G,
    cancel: &CancellationSignal,
) -> Result<Outcome> {
    let mut job = GenerationJob::prepare(config, &*grid)?;
    let outcome = GenerationPipeline::new(cancel.clone()).run_blocking(&mut job, grid);
    log_outcome(job.name(), &outcome);
    Ok(outcome)
}

/// Run one generation on a tokio runtime, yielding at every checkpoint.
pub async fn generate_async<G: TileWriter + ?Sized>(
    config: &GenerationConfig,
    grid: &mut G,
    cancel: &CancellationSignal,
) -> Result<Outcome> {
    let mut job = GenerationJob::prepare_async(config, &*grid).await?;
    let outcome = GenerationPipeline::new(cancel.clone()).run_async(&mut job, grid).await;
    log_outcome(job.name(), &outcome);
    Ok(outcome)
}

/// Full-grid rectangle, or a configuration error for an unusable grid.
fn grid_bounds<G: Grid + ?Sized>(grid: &G) -> Result<Rect> {
    let bounds = Rect::new(0, 0, grid.width(), grid.height());
    if !bounds.is_valid() {
        return Err(Error::Config(format!(
            "grid is unusable: {}x{}",
            grid.width(),
            grid.height()
        )));
    }
    Ok(bounds)
}

fn run_random(config: &GenerationConfig) -> SeededRandom {
    match config.seed {
        Some(seed) => SeededRandom::new(seed),
        None => SeededRandom::from_entropy(),
    }
}

fn log_start(config: &GenerationConfig, bounds: Rect, seed: u64) {
    log::info!(
        "Generating {} on {}x{} grid (seed {})",
        config.method.name(),
        bounds.width,
        bounds.height,
        seed
    );
}

fn log_outcome(name: &str, outcome: &Outcome) {
    let report = outcome.report();
    let status = if outcome.is_completed() { "completed" } else { "cancelled" };
    log::info!(
        "{} {}: {} units, {} checkpoints, {} tiles in {:.1}ms",
        name,
        status,
        report.units,
        report.checkpoints,
        report.tiles_committed,
        report.elapsed.as_secs_f64() * 1000.0
    );
}
