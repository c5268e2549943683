//! Fractal noise elevation and threshold classification.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::core::types::IVec2;
use crate::grid::{commit_tile, TileKind, TileWriter};
use crate::pipeline::{Advance, Checkpoint, Resumable};

use super::config::NoiseConfig;

/// Deterministic height field in `[0, 1]` built from fractal Brownian motion.
///
/// Immutable once built: the same configuration always yields bit-identical
/// samples.
#[derive(Clone, Debug)]
pub struct NoiseField {
    config: NoiseConfig,
    noise: Fbm<Perlin>,
}

impl NoiseField {
    /// Build a field; the configuration is validated first.
    pub fn new(config: &NoiseConfig) -> Self {
        let config = config.validated();
        let noise = Fbm::<Perlin>::new(config.seed)
            .set_octaves(config.octaves as usize)
            .set_frequency(config.frequency as f64)
            .set_lacunarity(config.lacunarity as f64)
            .set_persistence(config.gain as f64);

        Self { config, noise }
    }

    /// Validated configuration in use
    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Height at `(x, y)` after the offset is applied, remapped to `[0, 1]`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let nx = (x + self.config.offset.x) as f64;
        let ny = (y + self.config.offset.y) as f64;

        // Get noise value in range [-1, 1]
        let raw = self.noise.get([nx, ny]);

        (((raw + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
    }

    /// Tile band for a height using this field's thresholds
    pub fn classify(&self, height: f32) -> TileKind {
        classify_height(height, &self.config)
    }

    /// Sample and classify a cell
    pub fn tile_at(&self, x: i32, y: i32) -> TileKind {
        self.classify(self.sample(x as f32, y as f32))
    }
}

/// Band for `height`: water, then sand, then grass, rock at the top.
pub fn classify_height(height: f32, config: &NoiseConfig) -> TileKind {
    if height < config.water_level {
        TileKind::Water
    } else if height < config.sand_level {
        TileKind::Sand
    } else if height < config.grass_level {
        TileKind::Grass
    } else {
        TileKind::Rock
    }
}

/// Position of a band in the water -> sand -> grass -> rock ordering.
pub fn band_rank(tile: TileKind) -> Option<u8> {
    match tile {
        TileKind::Water => Some(0),
        TileKind::Sand => Some(1),
        TileKind::Grass => Some(2),
        TileKind::Rock => Some(3),
        _ => None,
    }
}

/// Fills the configured region (clamped to the grid) with classified tiles.
///
/// One unit is a batch of `samples_per_checkpoint` samples, each followed by
/// a tick; a final tick is yielded once the region is done.
pub struct NoiseJob {
    field: NoiseField,
    batch: usize,
    region: Option<IVec2>,
    cursor: usize,
    finished_region: bool,
    tiles: u64,
}

impl NoiseJob {
    pub fn new(config: &NoiseConfig, samples_per_checkpoint: usize) -> Self {
        Self {
            field: NoiseField::new(config),
            batch: samples_per_checkpoint.max(1),
            region: None,
            cursor: 0,
            finished_region: false,
            tiles: 0,
        }
    }

    pub fn field(&self) -> &NoiseField {
        &self.field
    }

    /// Samples taken so far
    pub fn samples_done(&self) -> usize {
        self.cursor
    }
}

impl Resumable for NoiseJob {
    fn advance<G: TileWriter + ?Sized>(&mut self, grid: &mut G) -> Advance {
        if self.finished_region {
            return Advance::Done;
        }

        let config = self.field.config();
        let region = *self.region.get_or_insert_with(|| {
            IVec2::new(
                config.width.clamp(1, grid.width().max(1)),
                config.height.clamp(1, grid.height().max(1)),
            )
        });
        let total = region.x as usize * region.y as usize;

        let end = (self.cursor + self.batch).min(total);
        for i in self.cursor..end {
            let x = (i % region.x as usize) as i32;
            let y = (i / region.x as usize) as i32;
            let tile = self.field.tile_at(x, y);
            if commit_tile(grid, IVec2::new(x, y), tile, true) {
                self.tiles += 1;
            }
        }
        self.cursor = end;

        if self.cursor >= total {
            self.finished_region = true;
        }
        Advance::Yield(Checkpoint::Tick)
    }

    fn tiles_committed(&self) -> u64 {
        self.tiles
    }
}
