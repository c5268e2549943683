//! In-memory tile grid.

use serde::{Deserialize, Serialize};

use super::{Grid, TileKind, TileWriter};

/// Dense grid with one tile slot per cell, stored row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Option<TileKind>>,
}

impl TileGrid {
    /// Create an empty grid. Negative extents are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![None; width as usize * height as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Tile currently at `(x, y)`, if any
    pub fn tile_at(&self, x: i32, y: i32) -> Option<TileKind> {
        self.index(x, y).and_then(|i| self.tiles[i])
    }

    /// Number of cells holding `kind`
    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| **t == Some(kind)).count()
    }

    /// Number of cells without a tile
    pub fn unassigned(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_none()).count()
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.unassigned() == 0
    }

    /// Remove every tile
    pub fn clear(&mut self) {
        self.tiles.fill(None);
    }

    /// Render one glyph per cell, one line per row. Empty cells are spaces.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for row in self.tiles.chunks(self.width.max(1) as usize) {
            out.extend(row.iter().map(|t| t.map_or(' ', TileKind::glyph)));
            out.push('\n');
        }
        out
    }
}

impl Grid for TileGrid {
    type Cell = usize;

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn try_get_cell(&self, x: i32, y: i32) -> Option<usize> {
        self.index(x, y)
    }
}

impl TileWriter for TileGrid {
    fn assign_tile(&mut self, cell: usize, tile: TileKind, overwrite: bool) {
        let Some(slot) = self.tiles.get_mut(cell) else {
            return;
        };
        if overwrite || slot.is_none() {
            *slot = Some(tile);
        }
    }
}
