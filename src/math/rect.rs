//! Axis-aligned integer rectangle

use serde::{Deserialize, Serialize};

use crate::core::types::IVec2;

/// Integer rectangle defined by its origin corner and extents.
///
/// `min` is inclusive and `max` is exclusive, so a 5x5 rect at the origin
/// covers cells 0..5 on both axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a rect from origin and extents
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Inclusive lower corner
    pub fn min(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Exclusive upper corner
    pub fn max(&self) -> IVec2 {
        IVec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    /// Center cell, rounded toward the origin corner
    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// True when both extents are positive
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Check if a cell lies inside the rect
    pub fn contains_point(&self, p: IVec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width &&
        p.y >= self.y && p.y < self.y + self.height
    }

    /// Check if `other` lies entirely inside this rect
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x && other.y >= self.y &&
        other.x + other.width <= self.x + self.width &&
        other.y + other.height <= self.y + self.height
    }

    /// Check if two rects share at least one cell
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width && other.x < self.x + self.width &&
        self.y < other.y + other.height && other.y < self.y + self.height
    }

    /// Split by height at `at` rows from the origin: (lower, upper).
    pub fn split_horizontal(&self, at: i32) -> (Rect, Rect) {
        (
            Rect::new(self.x, self.y, self.width, at),
            Rect::new(self.x, self.y + at, self.width, self.height - at),
        )
    }

    /// Split by width at `at` columns from the origin: (left, right).
    pub fn split_vertical(&self, at: i32) -> (Rect, Rect) {
        (
            Rect::new(self.x, self.y, at, self.height),
            Rect::new(self.x + at, self.y, self.width - at, self.height),
        )
    }

    /// Iterate all cells, row by row
    pub fn cells(&self) -> impl Iterator<Item = IVec2> {
        let (x0, y0, x1, y1) = (self.x, self.y, self.x + self.width, self.y + self.height);
        (y0..y1).flat_map(move |y| (x0..x1).map(move |x| IVec2::new(x, y)))
    }
}
