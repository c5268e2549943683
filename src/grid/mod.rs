//! Grid collaborators consumed by the generators.
//!
//! Generators never own cells. They look cells up by coordinate through
//! [`Grid`] and issue tile assignments through [`TileWriter`]. Coordinates
//! outside the grid simply fail the lookup and are skipped.

pub mod tile_grid;

pub use tile_grid::TileGrid;

use serde::{Deserialize, Serialize};

use crate::core::types::IVec2;

/// Tile category assigned to a cell.
///
/// Resolving a category to a concrete tile asset is up to the `TileWriter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Room,
    Corridor,
    Ground,
    Water,
    Sand,
    Grass,
    Rock,
}

impl TileKind {
    pub const ALL: [TileKind; 7] = [
        TileKind::Room,
        TileKind::Corridor,
        TileKind::Ground,
        TileKind::Water,
        TileKind::Sand,
        TileKind::Grass,
        TileKind::Rock,
    ];

    /// Display name of the tile template
    pub fn name(self) -> &'static str {
        match self {
            TileKind::Room => "Room",
            TileKind::Corridor => "Corridor",
            TileKind::Ground => "Ground",
            TileKind::Water => "Water",
            TileKind::Sand => "Sand",
            TileKind::Grass => "Grass",
            TileKind::Rock => "Rock",
        }
    }

    /// Single-character glyph for text previews
    pub fn glyph(self) -> char {
        match self {
            TileKind::Room => '#',
            TileKind::Corridor => '+',
            TileKind::Ground => '.',
            TileKind::Water => '~',
            TileKind::Sand => ':',
            TileKind::Grass => '"',
            TileKind::Rock => '^',
        }
    }
}

/// Read-only cell lookup over a rectangular grid.
pub trait Grid {
    /// Opaque handle to a cell owned by the grid
    type Cell: Copy;

    fn width(&self) -> i32;

    fn height(&self) -> i32;

    /// Look up the cell at `(x, y)`. Out-of-range coordinates return `None`.
    fn try_get_cell(&self, x: i32, y: i32) -> Option<Self::Cell>;
}

/// Tile assignment on top of a [`Grid`].
pub trait TileWriter: Grid {
    /// Assign `tile` to `cell`.
    ///
    /// With `overwrite` the existing tile is replaced; without it the tile is
    /// only placed on a cell that has none yet.
    fn assign_tile(&mut self, cell: Self::Cell, tile: TileKind, overwrite: bool);
}

/// Look up `pos` and assign `tile` to it. Returns false when the coordinate
/// is outside the grid (the write is skipped).
pub fn commit_tile<G: TileWriter + ?Sized>(
    grid: &mut G,
    pos: IVec2,
    tile: TileKind,
    overwrite: bool,
) -> bool {
    match grid.try_get_cell(pos.x, pos.y) {
        Some(cell) => {
            grid.assign_tile(cell, tile, overwrite);
            true
        }
        None => false,
    }
}
