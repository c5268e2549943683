//! Rooms and dog-leg corridors on top of a space partition.
//!
//! Planning is pure: it builds the partition tree, derives one room per leaf
//! and pre-draws every corridor's orientation, touching no grid. The plan can
//! therefore be computed on a worker thread. [`DungeonJob`] then commits the
//! plan to the grid in resumable units: rooms, corridors, ground fill.

use crate::core::types::IVec2;
use crate::grid::{commit_tile, TileKind, TileWriter};
use crate::math::Rect;
use crate::pipeline::{Advance, Checkpoint, Resumable};
use crate::random::RandomSource;

use super::bsp::PartitionTree;
use super::config::SpacePartitionConfig;

/// Smallest room extent on either axis, when the leaf allows it.
pub const ROOM_MIN_SIZE: i32 = 5;

/// Ground rows filled between ticks.
pub const GROUND_ROWS_PER_TICK: i32 = 8;

/// Two-segment orthogonal corridor between two room centers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corridor {
    pub start: IVec2,
    pub end: IVec2,
    /// Run along the start row first, then along the end column.
    /// Otherwise run along the start column first, then the end row.
    pub horizontal_first: bool,
}

impl Corridor {
    /// Cell where the two segments meet
    pub fn corner(&self) -> IVec2 {
        if self.horizontal_first {
            IVec2::new(self.end.x, self.start.y)
        } else {
            IVec2::new(self.start.x, self.end.y)
        }
    }

    /// Every carved cell, walking from `start` through the corner to `end`.
    pub fn path(&self) -> Vec<IVec2> {
        let corner = self.corner();
        let mut cells = walk(self.start, corner);
        cells.pop();
        cells.extend(walk(corner, self.end));
        cells
    }
}

/// Straight inclusive walk between two cells sharing a row or column.
fn walk(from: IVec2, to: IVec2) -> Vec<IVec2> {
    let step = (to - from).signum();
    let len = (to - from).abs().max_element();
    (0..=len).map(|i| from + step * i).collect()
}

/// Pick a room inside `leaf`.
///
/// Extents are drawn from `[5, leaf - 1)` (collapsing to 5 when that range is
/// empty), capped to the leaf, and placed at a random offset that keeps the
/// room inside the leaf.
pub fn derive_room(leaf: Rect, rng: &mut impl RandomSource) -> Rect {
    let width = rng
        .range(ROOM_MIN_SIZE, (leaf.width - 1).max(ROOM_MIN_SIZE))
        .min(leaf.width);
    let height = rng
        .range(ROOM_MIN_SIZE, (leaf.height - 1).max(ROOM_MIN_SIZE))
        .min(leaf.height);
    let x = rng.range(leaf.x, leaf.x + leaf.width - width + 1);
    let y = rng.range(leaf.y, leaf.y + leaf.height - height + 1);
    Rect::new(x, y, width, height)
}

/// Result of the pure planning phase.
#[derive(Clone, Debug, PartialEq)]
pub struct DungeonPlan {
    pub tree: PartitionTree,
    /// Leaves kept after the leaf cap, in traversal order
    pub leaves: Vec<Rect>,
    /// One room per kept leaf, same order
    pub rooms: Vec<Rect>,
    /// `corridors[i]` joins `rooms[i]` and `rooms[i + 1]`
    pub corridors: Vec<Corridor>,
}

/// Plans rooms and corridors for a region.
pub struct RoomCorridorBuilder {
    config: SpacePartitionConfig,
}

impl RoomCorridorBuilder {
    pub fn new(config: SpacePartitionConfig) -> Self {
        Self { config: config.validated() }
    }

    pub fn config(&self) -> &SpacePartitionConfig {
        &self.config
    }

    /// Partition `bounds`, derive rooms and connect consecutive rooms.
    pub fn plan(&self, bounds: Rect, rng: &mut impl RandomSource) -> DungeonPlan {
        let tree = PartitionTree::build(
            bounds,
            self.config.max_split_depth,
            self.config.min_room_size,
            rng,
        );

        let mut leaves = tree.leaf_rects();
        leaves.truncate(self.config.max_leaf_count);

        let rooms: Vec<Rect> = leaves.iter().map(|&leaf| derive_room(leaf, rng)).collect();

        let corridors: Vec<Corridor> = rooms
            .windows(2)
            .map(|pair| Corridor {
                start: pair[0].center(),
                end: pair[1].center(),
                horizontal_first: rng.chance(0.5),
            })
            .collect();

        log::debug!(
            "Planned {} nodes, {} leaves, {} rooms, {} corridors",
            tree.node_count(),
            leaves.len(),
            rooms.len(),
            corridors.len()
        );

        DungeonPlan { tree, leaves, rooms, corridors }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Rooms(usize),
    Corridors(usize),
    Ground(i32),
    Finished,
}

/// Commits a [`DungeonPlan`] to a grid.
///
/// Units: one room, one corridor, or one ground row. Yields after every
/// even-numbered room and corridor, and after every
/// [`GROUND_ROWS_PER_TICK`] ground rows.
pub struct DungeonJob {
    plan: DungeonPlan,
    phase: Phase,
    tiles: u64,
}

impl DungeonJob {
    pub fn new(plan: DungeonPlan) -> Self {
        Self { plan, phase: Phase::Rooms(0), tiles: 0 }
    }

    pub fn plan(&self) -> &DungeonPlan {
        &self.plan
    }

    fn commit<G: TileWriter + ?Sized>(&mut self, grid: &mut G, pos: IVec2, tile: TileKind, overwrite: bool) {
        if commit_tile(grid, pos, tile, overwrite) {
            self.tiles += 1;
        }
    }
}

impl Resumable for DungeonJob {
    fn advance<G: TileWriter + ?Sized>(&mut self, grid: &mut G) -> Advance {
        match self.phase {
            Phase::Rooms(i) if i < self.plan.rooms.len() => {
                let room = self.plan.rooms[i];
                for pos in room.cells() {
                    self.commit(grid, pos, TileKind::Room, false);
                }
                self.phase = Phase::Rooms(i + 1);
                if i % 2 == 0 { Advance::Yield(Checkpoint::Tick) } else { Advance::Continue }
            }
            Phase::Rooms(_) => {
                self.phase = Phase::Corridors(0);
                Advance::Continue
            }
            Phase::Corridors(i) if i < self.plan.corridors.len() => {
                for pos in self.plan.corridors[i].path() {
                    self.commit(grid, pos, TileKind::Corridor, true);
                }
                self.phase = Phase::Corridors(i + 1);
                // Corridor i ends at room i + 1
                if (i + 1) % 2 == 0 { Advance::Yield(Checkpoint::Tick) } else { Advance::Continue }
            }
            Phase::Corridors(_) => {
                self.phase = Phase::Ground(0);
                Advance::Continue
            }
            Phase::Ground(y) if y < grid.height() => {
                for x in 0..grid.width() {
                    self.commit(grid, IVec2::new(x, y), TileKind::Ground, false);
                }
                self.phase = Phase::Ground(y + 1);
                if (y + 1) % GROUND_ROWS_PER_TICK == 0 { Advance::Yield(Checkpoint::Tick) } else { Advance::Continue }
            }
            Phase::Ground(_) | Phase::Finished => {
                self.phase = Phase::Finished;
                Advance::Done
            }
        }
    }

    fn tiles_committed(&self) -> u64 {
        self.tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileGrid;
    use crate::pipeline::{CancellationSignal, GenerationPipeline, Poll};
    use crate::random::SeededRandom;

    fn assert_connected(path: &[IVec2]) {
        for pair in path.windows(2) {
            let d = (pair[1] - pair[0]).abs();
            assert_eq!(d.x + d.y, 1, "cells {:?} and {:?} are not adjacent", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_corridor_path_connected() {
        let mut rng = SeededRandom::new(11);
        for _ in 0..200 {
            let corridor = Corridor {
                start: IVec2::new(rng.range(-20, 20), rng.range(-20, 20)),
                end: IVec2::new(rng.range(-20, 20), rng.range(-20, 20)),
                horizontal_first: rng.coin_flip(),
            };
            let path = corridor.path();
            assert_eq!(path.first(), Some(&corridor.start));
            assert_eq!(path.last(), Some(&corridor.end));
            assert!(path.contains(&corridor.corner()));
            assert_connected(&path);
        }
    }

    #[test]
    fn test_corridor_orientation() {
        let h = Corridor { start: IVec2::new(1, 1), end: IVec2::new(4, 3), horizontal_first: true };
        assert_eq!(h.corner(), IVec2::new(4, 1));
        assert_eq!(
            h.path(),
            vec![
                IVec2::new(1, 1), IVec2::new(2, 1), IVec2::new(3, 1), IVec2::new(4, 1),
                IVec2::new(4, 2), IVec2::new(4, 3),
            ]
        );

        let v = Corridor { start: IVec2::new(4, 3), end: IVec2::new(1, 1), horizontal_first: false };
        assert_eq!(v.corner(), IVec2::new(4, 1));
        assert_eq!(v.path().len(), 6);
    }

    #[test]
    fn test_corridor_same_point() {
        let c = Corridor { start: IVec2::new(2, 2), end: IVec2::new(2, 2), horizontal_first: true };
        assert_eq!(c.path(), vec![IVec2::new(2, 2)]);
    }

    #[test]
    fn test_rooms_inside_leaves() {
        let mut rng = SeededRandom::new(5);
        for _ in 0..500 {
            let leaf = Rect::new(rng.range(-10, 10), rng.range(-10, 10), rng.range(1, 30), rng.range(1, 30));
            let room = derive_room(leaf, &mut rng);
            assert!(leaf.contains_rect(&room), "{:?} not inside {:?}", room, leaf);
            if leaf.width >= ROOM_MIN_SIZE {
                assert!(room.width >= ROOM_MIN_SIZE);
            }
            if leaf.height >= ROOM_MIN_SIZE {
                assert!(room.height >= ROOM_MIN_SIZE);
            }
        }
    }

    #[test]
    fn test_room_smaller_than_leaf() {
        let mut rng = SeededRandom::new(8);
        for _ in 0..100 {
            let room = derive_room(Rect::new(0, 0, 12, 9), &mut rng);
            assert!(room.width < 12);
            assert!(room.height < 9);
        }
    }

    #[test]
    fn test_plan_caps_leaves() {
        let builder = RoomCorridorBuilder::new(SpacePartitionConfig {
            max_leaf_count: 3,
            max_split_depth: 6,
            min_room_size: IVec2::new(5, 5),
        });
        for seed in 0..20 {
            let plan = builder.plan(Rect::new(0, 0, 120, 120), &mut SeededRandom::new(seed));
            assert!(plan.leaves.len() <= 3);
            assert_eq!(plan.rooms.len(), plan.leaves.len());
            assert_eq!(plan.corridors.len(), plan.rooms.len().saturating_sub(1));
            // Kept leaves are the first ones in traversal order
            let all = plan.tree.leaf_rects();
            assert_eq!(&all[..plan.leaves.len()], &plan.leaves[..]);
        }
    }

    #[test]
    fn test_plan_corridors_join_consecutive_centers() {
        let builder = RoomCorridorBuilder::new(SpacePartitionConfig::default());
        let plan = builder.plan(Rect::new(0, 0, 80, 60), &mut SeededRandom::new(21));
        for (i, corridor) in plan.corridors.iter().enumerate() {
            assert_eq!(corridor.start, plan.rooms[i].center());
            assert_eq!(corridor.end, plan.rooms[i + 1].center());
        }
    }

    #[test]
    fn test_plan_reproducible() {
        let builder = RoomCorridorBuilder::new(SpacePartitionConfig::default());
        let a = builder.plan(Rect::new(0, 0, 64, 64), &mut SeededRandom::new(3));
        let b = builder.plan(Rect::new(0, 0, 64, 64), &mut SeededRandom::new(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_job_commit_order() {
        let plan = DungeonPlan {
            tree: PartitionTree::build(Rect::new(0, 0, 12, 6), 0, IVec2::new(5, 5), &mut SeededRandom::new(0)),
            leaves: vec![Rect::new(0, 0, 6, 6), Rect::new(6, 0, 6, 6)],
            rooms: vec![Rect::new(0, 0, 5, 5), Rect::new(7, 1, 5, 5)],
            corridors: vec![Corridor {
                start: IVec2::new(2, 2),
                end: IVec2::new(9, 3),
                horizontal_first: true,
            }],
        };
        let mut grid = TileGrid::new(12, 6);
        let mut job = DungeonJob::new(plan);
        let outcome = GenerationPipeline::new(CancellationSignal::new()).run_blocking(&mut job, &mut grid);
        assert!(outcome.is_completed());

        // Corridor overwrites room tiles along its path
        assert_eq!(grid.tile_at(2, 2), Some(TileKind::Corridor));
        assert_eq!(grid.tile_at(9, 3), Some(TileKind::Corridor));
        assert_eq!(grid.tile_at(5, 2), Some(TileKind::Corridor));
        assert_eq!(grid.tile_at(0, 0), Some(TileKind::Room));
        assert_eq!(grid.tile_at(8, 5), Some(TileKind::Room));
        // Everything else is ground
        assert_eq!(grid.tile_at(5, 5), Some(TileKind::Ground));
        assert!(grid.is_fully_assigned());
    }

    #[test]
    fn test_job_skips_out_of_range() {
        let plan = DungeonPlan {
            tree: PartitionTree::build(Rect::new(0, 0, 4, 4), 0, IVec2::new(5, 5), &mut SeededRandom::new(0)),
            leaves: vec![Rect::new(0, 0, 4, 4)],
            rooms: vec![Rect::new(-2, -2, 5, 5)],
            corridors: Vec::new(),
        };
        let mut grid = TileGrid::new(4, 4);
        let mut job = DungeonJob::new(plan);
        let outcome = GenerationPipeline::new(CancellationSignal::new()).run_blocking(&mut job, &mut grid);
        assert!(outcome.is_completed());
        assert_eq!(grid.count(TileKind::Room), 9);
        assert_eq!(grid.count(TileKind::Ground), 7);
        assert_eq!(outcome.report().tiles_committed, 25);
    }

    #[test]
    fn test_ground_fill_yields_per_batch() {
        let plan = DungeonPlan {
            tree: PartitionTree::build(Rect::new(0, 0, 4, 20), 0, IVec2::new(5, 5), &mut SeededRandom::new(0)),
            leaves: vec![Rect::new(0, 0, 4, 20)],
            rooms: Vec::new(),
            corridors: Vec::new(),
        };
        let mut grid = TileGrid::new(4, 20);
        let mut job = DungeonJob::new(plan);
        let outcome = GenerationPipeline::new(CancellationSignal::new()).run_blocking(&mut job, &mut grid);
        assert!(outcome.is_completed());
        assert_eq!(grid.count(TileKind::Ground), 80);
        // 20 rows: ticks after rows 8 and 16
        assert_eq!(outcome.report().checkpoints, 2);
    }

    #[test]
    fn test_ground_fill_observes_cancel_between_batches() {
        let plan = DungeonPlan {
            tree: PartitionTree::build(Rect::new(0, 0, 3, 30), 0, IVec2::new(5, 5), &mut SeededRandom::new(0)),
            leaves: vec![Rect::new(0, 0, 3, 30)],
            rooms: Vec::new(),
            corridors: Vec::new(),
        };
        let mut grid = TileGrid::new(3, 30);
        let mut job = DungeonJob::new(plan);
        let mut pipeline = GenerationPipeline::new(CancellationSignal::new());
        loop {
            match pipeline.poll(&mut job, &mut grid) {
                Poll::Yield(_) => break,
                Poll::Continue => {}
                other => panic!("unexpected {:?}", other),
            }
        }
        pipeline.cancel_signal().cancel();
        assert_eq!(pipeline.poll(&mut job, &mut grid), Poll::Cancelled);
        assert_eq!(grid.count(TileKind::Ground), 3 * GROUND_ROWS_PER_TICK as usize);
    }

    #[test]
    fn test_builder_degenerate_min_size() {
        for min in [IVec2::new(0, 0), IVec2::new(-4, -4), IVec2::new(1, 1)] {
            let config = SpacePartitionConfig { max_leaf_count: 64, max_split_depth: 6, min_room_size: min };
            let builder = RoomCorridorBuilder::new(config);
            assert_eq!(builder.config().min_room_size, min.max(IVec2::ONE));
            for seed in 0..20 {
                let plan = builder.plan(Rect::new(0, 0, 20, 20), &mut SeededRandom::new(seed));
                for (leaf, room) in plan.leaves.iter().zip(&plan.rooms) {
                    assert!(leaf.is_valid());
                    assert!(room.is_valid());
                    assert!(leaf.contains_rect(room));
                }
            }
        }
    }
}
