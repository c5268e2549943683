//! Generation configuration values.
//!
//! Every generation call receives its configuration explicitly; nothing is
//! looked up from a global registry. Configurations can be written by hand
//! or loaded from JSON, where every field is optional.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec2, Vec2};
use crate::core::Result;

/// Top-level configuration for one generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Seed for the run's random source. `None` draws a fresh seed.
    pub seed: Option<u64>,
    /// Pause between cellular automaton steps, in milliseconds.
    pub step_delay_ms: u64,
    /// Noise samples between checkpoints.
    pub samples_per_checkpoint: usize,
    /// Algorithm and its parameters.
    pub method: GenerationMethod,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            step_delay_ms: 50,
            samples_per_checkpoint: 1024,
            method: GenerationMethod::default(),
        }
    }
}

impl GenerationConfig {
    /// Configuration for `method` with default run settings.
    pub fn with_method(method: GenerationMethod) -> Self {
        Self { method, ..Default::default() }
    }

    /// Same configuration with a fixed seed.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The fixed set of generation algorithms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationMethod {
    SpacePartition(SpacePartitionConfig),
    CellularAutomaton(CellularConfig),
    NoiseField(NoiseConfig),
}

impl Default for GenerationMethod {
    fn default() -> Self {
        GenerationMethod::SpacePartition(SpacePartitionConfig::default())
    }
}

impl GenerationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            GenerationMethod::SpacePartition(_) => "space_partition",
            GenerationMethod::CellularAutomaton(_) => "cellular_automaton",
            GenerationMethod::NoiseField(_) => "noise_field",
        }
    }
}

/// Parameters for rooms-and-corridors generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacePartitionConfig {
    /// Leaves beyond this count are discarded (in traversal order).
    pub max_leaf_count: usize,
    /// Maximum recursion depth of the partition tree.
    pub max_split_depth: u32,
    /// Smallest region size a split may produce on each axis.
    pub min_room_size: IVec2,
}

impl Default for SpacePartitionConfig {
    fn default() -> Self {
        Self {
            max_leaf_count: 6,
            max_split_depth: 4,
            min_room_size: IVec2::new(5, 5),
        }
    }
}

/// Parameters for water/grass cellular automaton generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularConfig {
    /// Percent chance (0-100) that a cell starts as water.
    pub noise_density: u32,
    /// Grass neighbors needed for a cell to become grass.
    pub neighbor_threshold: u32,
    /// Number of smoothing steps.
    pub max_steps: u32,
}

impl Default for CellularConfig {
    fn default() -> Self {
        Self {
            noise_density: 50,
            neighbor_threshold: 4,
            max_steps: 10,
        }
    }
}

impl SpacePartitionConfig {
    /// Copy with `min_room_size` raised to at least one cell per axis.
    pub fn validated(&self) -> Self {
        Self {
            min_room_size: self.min_room_size.max(IVec2::ONE),
            ..self.clone()
        }
    }
}

impl CellularConfig {
    /// Copy with `noise_density` clamped to a percentage.
    pub fn validated(&self) -> Self {
        Self {
            noise_density: self.noise_density.min(100),
            ..self.clone()
        }
    }
}

/// Parameters for noise-driven elevation generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Region width to fill (clamped to the grid).
    pub width: i32,
    /// Region height to fill (clamped to the grid).
    pub height: i32,
    pub seed: u32,
    pub frequency: f32,
    pub octaves: u32,
    pub lacunarity: f32,
    pub gain: f32,
    pub offset: Vec2,
    pub water_level: f32,
    pub sand_level: f32,
    pub grass_level: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            seed: 1234,
            frequency: 0.02,
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.5,
            offset: Vec2::ZERO,
            water_level: 0.35,
            sand_level: 0.45,
            grass_level: 0.70,
        }
    }
}

impl NoiseConfig {
    /// Copy with every parameter clamped into its legal range and the
    /// elevation thresholds made monotonic.
    pub fn validated(&self) -> Self {
        let water_level = self.water_level.clamp(0.0, 1.0);
        let sand_level = self.sand_level.clamp(0.0, 1.0).max(water_level);
        let grass_level = self.grass_level.clamp(0.0, 1.0).max(sand_level);
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
            seed: self.seed,
            frequency: self.frequency.clamp(0.0001, 1.0),
            octaves: self.octaves.clamp(1, 12),
            lacunarity: self.lacunarity.clamp(1.0, 4.0),
            gain: self.gain.clamp(0.2, 0.9),
            offset: self.offset,
            water_level,
            sand_level,
            grass_level,
        }
    }
}
