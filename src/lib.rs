//! Tilegen - cooperative procedural generation for tile grids

pub mod core;
pub mod math;
pub mod random;
pub mod grid;
pub mod pipeline;
pub mod generation;

pub use generation::{generate, generate_async, GenerationConfig, GenerationMethod};
pub use grid::{Grid, TileGrid, TileKind, TileWriter};
pub use pipeline::{CancellationSignal, Outcome};
