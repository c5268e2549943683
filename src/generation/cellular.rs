//! Majority-vote cellular automaton over a water/grass classification.
//!
//! A [`CellField`] is an immutable snapshot: each step builds a new field
//! from the previous one, so no cell ever sees a neighbor's updated state
//! within the same step.

use std::time::Duration;

use rayon::prelude::*;

use crate::core::types::IVec2;
use crate::grid::{commit_tile, Grid, TileKind, TileWriter};
use crate::pipeline::{Advance, Checkpoint, Resumable};
use crate::random::{RandomSource, SeededRandom};

use super::config::CellularConfig;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Active/inactive classification of every grid cell.
///
/// Cells the grid does not provide are marked absent: they are never active
/// and are not counted as neighbors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellField {
    width: i32,
    height: i32,
    present: Vec<bool>,
    active: Vec<bool>,
}

impl CellField {
    /// Field with every cell present and set to `active`.
    pub fn filled(width: i32, height: i32, active: bool) -> Self {
        let len = width.max(0) as usize * height.max(0) as usize;
        Self {
            width: width.max(0),
            height: height.max(0),
            present: vec![true; len],
            active: vec![active; len],
        }
    }

    /// Random initial field over `grid`.
    ///
    /// Cells are visited row by row; each present cell draws an integer in
    /// `[0, 100)` and starts active when the draw is below `density`.
    pub fn seed<G: Grid + ?Sized>(grid: &G, density: u32, rng: &mut impl RandomSource) -> Self {
        let mut field = Self::filled(grid.width(), grid.height(), false);
        for y in 0..field.height {
            for x in 0..field.width {
                let i = field.index(x, y);
                if grid.try_get_cell(x, y).is_none() {
                    field.present[i] = false;
                    continue;
                }
                field.active[i] = (rng.range(0, 100) as u32) < density;
            }
        }
        field
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn is_present(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.present[self.index(x, y)]
    }

    pub fn is_active(&self, x: i32, y: i32) -> bool {
        self.is_present(x, y) && self.active[self.index(x, y)]
    }

    /// Set a cell's state. Ignored for absent or out-of-range cells.
    pub fn set(&mut self, x: i32, y: i32, active: bool) {
        if self.is_present(x, y) {
            let i = self.index(x, y);
            self.active[i] = active;
        }
    }

    /// Mark a cell as missing from the grid.
    pub fn remove(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            let i = self.index(x, y);
            self.present[i] = false;
            self.active[i] = false;
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// `(active, existing)` neighbor counts over the Moore neighborhood.
    pub fn neighbor_counts(&self, x: i32, y: i32) -> (u32, u32) {
        let mut active = 0;
        let mut existing = 0;
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let (nx, ny) = (x + dx, y + dy);
            if self.is_present(nx, ny) {
                existing += 1;
                if self.active[self.index(nx, ny)] {
                    active += 1;
                }
            }
        }
        (active, existing)
    }

    /// Next state of one cell: inactive once at least `threshold` existing
    /// neighbors are inactive, active otherwise.
    pub fn next_state(&self, x: i32, y: i32, threshold: u32) -> bool {
        if !self.is_present(x, y) {
            return false;
        }
        let (active, existing) = self.neighbor_counts(x, y);
        existing - active < threshold
    }

    /// Compute the whole next field from this one.
    pub fn step(&self, threshold: u32) -> CellField {
        if self.active.is_empty() {
            return self.clone();
        }
        let mut active = vec![false; self.active.len()];
        active
            .par_chunks_mut(self.width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = self.next_state(x as i32, y as i32, threshold);
                }
            });
        CellField {
            width: self.width,
            height: self.height,
            present: self.present.clone(),
            active,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Seed,
    SeedCommit(i32),
    Step(u32),
    Finished,
}

/// Runs the automaton against a grid.
///
/// Units: seeding, one committed row of the seed, one whole step. Yields a
/// tick after seeding and a `step_delay` pause after every step.
pub struct CellularJob {
    config: CellularConfig,
    step_delay: Duration,
    rng: SeededRandom,
    field: Option<CellField>,
    phase: Phase,
    tiles: u64,
}

impl CellularJob {
    pub fn new(config: &CellularConfig, step_delay: Duration, rng: SeededRandom) -> Self {
        Self {
            config: config.validated(),
            step_delay,
            rng,
            field: None,
            phase: Phase::Seed,
            tiles: 0,
        }
    }

    /// Current classification, once seeded
    pub fn field(&self) -> Option<&CellField> {
        self.field.as_ref()
    }

    /// Steps completed so far
    pub fn steps_done(&self) -> u32 {
        match self.phase {
            Phase::Step(n) => n,
            Phase::Finished => self.config.max_steps,
            _ => 0,
        }
    }

    fn commit_row<G: TileWriter + ?Sized>(&mut self, grid: &mut G, y: i32, overwrite: bool) {
        let Some(field) = self.field.as_ref() else {
            return;
        };
        for x in 0..field.width() {
            if !field.is_present(x, y) {
                continue;
            }
            let tile = if field.is_active(x, y) { TileKind::Water } else { TileKind::Grass };
            if commit_tile(grid, IVec2::new(x, y), tile, overwrite) {
                self.tiles += 1;
            }
        }
    }
}

impl Resumable for CellularJob {
    fn advance<G: TileWriter + ?Sized>(&mut self, grid: &mut G) -> Advance {
        match self.phase {
            Phase::Seed => {
                let field = CellField::seed(&*grid, self.config.noise_density, &mut self.rng);
                log::debug!(
                    "Seeded {}x{} field with {} water cells",
                    field.width(),
                    field.height(),
                    field.active_count()
                );
                self.field = Some(field);
                self.phase = Phase::SeedCommit(0);
                Advance::Continue
            }
            Phase::SeedCommit(y) => {
                let height = self.field.as_ref().map_or(0, CellField::height);
                if y < height {
                    self.commit_row(grid, y, false);
                }
                if y + 1 >= height {
                    self.phase = Phase::Step(0);
                    Advance::Yield(Checkpoint::Tick)
                } else {
                    self.phase = Phase::SeedCommit(y + 1);
                    Advance::Continue
                }
            }
            Phase::Step(n) if n < self.config.max_steps => {
                if let Some(field) = self.field.as_ref() {
                    let next = field.step(self.config.neighbor_threshold);
                    log::debug!("Step {}: {} water cells", n + 1, next.active_count());
                    self.field = Some(next);
                }
                let height = self.field.as_ref().map_or(0, CellField::height);
                for y in 0..height {
                    self.commit_row(grid, y, true);
                }
                self.phase = Phase::Step(n + 1);
                Advance::Yield(Checkpoint::Delay(self.step_delay))
            }
            Phase::Step(_) | Phase::Finished => {
                self.phase = Phase::Finished;
                Advance::Done
            }
        }
    }

    fn tiles_committed(&self) -> u64 {
        self.tiles
    }
}
