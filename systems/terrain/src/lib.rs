#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural dungeon terrain generator.
//!
//! Uniform noise is shaped into cave-like structure by a fixed number of
//! cellular-automaton smoothing generations, then a breadth-first flood fill
//! repairs connectivity by walling off every floor pocket unreachable from
//! the sampled seed cell. The resulting grid always keeps its entire border
//! walled and its floor cells form exactly one 4-connected component.
//!
//! Randomness is injected through the [`rand::Rng`] trait so generation is
//! reproducible: the same seed and dimensions always yield the same grid and
//! the same floor-sampling sequence.

use std::collections::VecDeque;

use delve_core::CellCoord;
use rand::Rng;

const NOISE_WALL_PROBABILITY: f64 = 0.45;
const SMOOTHING_GENERATIONS: usize = 4;
const WALL_NEIGHBOR_THRESHOLD: usize = 5;
const FLOOR_NEIGHBOR_THRESHOLD: usize = 3;
const SAMPLING_ATTEMPTS_PER_CELL: usize = 8;

/// Immutable wall/floor grid describing one dungeon level.
///
/// Storage is row-major; `true` marks a wall. Out-of-bounds coordinates read
/// as wall, which keeps movement and chase checks free of separate bounds
/// tests at every call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DungeonGrid {
    columns: u32,
    rows: u32,
    walls: Vec<bool>,
}

impl DungeonGrid {
    fn filled(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            walls: vec![true; capacity],
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell is a wall; out-of-grid cells count as wall.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(true, |index| self.walls.get(index).copied().unwrap_or(true))
    }

    /// Number of floor cells currently present in the grid.
    #[must_use]
    pub fn floor_count(&self) -> usize {
        self.walls.iter().filter(|wall| !**wall).count()
    }

    /// Collects every floor cell in row-major order.
    #[must_use]
    pub fn floor_cells(&self) -> Vec<CellCoord> {
        let mut cells = Vec::with_capacity(self.floor_count());
        for row in 0..self.rows {
            for column in 0..self.columns {
                let cell = CellCoord::new(column, row);
                if !self.is_wall(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Row-major wall bitmap backing the grid.
    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.walls
    }

    fn set_wall(&mut self, cell: CellCoord, wall: bool) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.walls.get_mut(index) {
                *slot = wall;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Generates a connected dungeon level of the requested dimensions.
///
/// The border is entirely wall and the floor region forms a single
/// 4-connected component. Generation never fails: a degenerate all-wall
/// smoothing outcome is recovered locally by carving a central chamber
/// before connectivity repair runs.
#[must_use]
pub fn generate<R: Rng + ?Sized>(columns: u32, rows: u32, rng: &mut R) -> DungeonGrid {
    debug_assert!(columns >= 3 && rows >= 3, "grid needs an interior");

    let mut grid = seed_noise(columns, rows, rng);
    for _ in 0..SMOOTHING_GENERATIONS {
        grid = smooth_generation(&grid);
    }

    if grid.floor_count() == 0 {
        carve_recovery_chamber(&mut grid);
    }

    repair_connectivity(&mut grid, rng);
    grid
}

/// Samples a uniformly distributed floor cell from the grid.
///
/// Rejection sampling is bounded: after a fixed number of misses the sampler
/// falls back to indexing into the materialized floor-cell list, so the call
/// terminates on every input. Grids produced by [`generate`] always contain
/// floor; for a grid without any floor cells the central cell is returned so
/// callers never observe a panic.
#[must_use]
pub fn random_floor_cell<R: Rng + ?Sized>(grid: &DungeonGrid, rng: &mut R) -> CellCoord {
    let cell_count_u64 = u64::from(grid.columns()) * u64::from(grid.rows());
    let cell_count = usize::try_from(cell_count_u64).unwrap_or(usize::MAX);
    let attempts = cell_count.saturating_mul(SAMPLING_ATTEMPTS_PER_CELL);

    for _ in 0..attempts {
        let cell = CellCoord::new(
            rng.gen_range(0..grid.columns()),
            rng.gen_range(0..grid.rows()),
        );
        if !grid.is_wall(cell) {
            return cell;
        }
    }

    let floors = grid.floor_cells();
    if floors.is_empty() {
        return CellCoord::new(grid.columns() / 2, grid.rows() / 2);
    }
    floors[rng.gen_range(0..floors.len())]
}

fn seed_noise<R: Rng + ?Sized>(columns: u32, rows: u32, rng: &mut R) -> DungeonGrid {
    let mut grid = DungeonGrid::filled(columns, rows);
    for row in 0..rows {
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            let wall = if is_border(cell, columns, rows) {
                true
            } else {
                rng.gen_bool(NOISE_WALL_PROBABILITY)
            };
            grid.set_wall(cell, wall);
        }
    }
    grid
}

fn smooth_generation(previous: &DungeonGrid) -> DungeonGrid {
    let columns = previous.columns();
    let rows = previous.rows();
    // Starts all wall, which also keeps the border intact without a second pass.
    let mut next = DungeonGrid::filled(columns, rows);

    for row in 1..rows.saturating_sub(1) {
        for column in 1..columns.saturating_sub(1) {
            let cell = CellCoord::new(column, row);
            let neighbors = moore_wall_count(previous, cell);
            let wall = if neighbors >= WALL_NEIGHBOR_THRESHOLD {
                true
            } else if neighbors <= FLOOR_NEIGHBOR_THRESHOLD {
                false
            } else {
                previous.is_wall(cell)
            };
            next.set_wall(cell, wall);
        }
    }

    next
}

fn moore_wall_count(grid: &DungeonGrid, cell: CellCoord) -> usize {
    let mut count = 0;
    for row in cell.row().saturating_sub(1)..=cell.row() + 1 {
        for column in cell.column().saturating_sub(1)..=cell.column() + 1 {
            let neighbor = CellCoord::new(column, row);
            if neighbor == cell {
                continue;
            }
            if grid.is_wall(neighbor) {
                count += 1;
            }
        }
    }
    count
}

fn carve_recovery_chamber(grid: &mut DungeonGrid) {
    let columns = grid.columns();
    let rows = grid.rows();

    let column_start = (columns / 4).max(1);
    let column_end = (columns * 3 / 4).min(columns.saturating_sub(1)).max(column_start + 1);
    let row_start = (rows / 4).max(1);
    let row_end = (rows * 3 / 4).min(rows.saturating_sub(1)).max(row_start + 1);

    for row in row_start..row_end {
        for column in column_start..column_end {
            grid.set_wall(CellCoord::new(column, row), false);
        }
    }
}

fn repair_connectivity<R: Rng + ?Sized>(grid: &mut DungeonGrid, rng: &mut R) {
    let seed = random_floor_cell(grid, rng);
    if grid.is_wall(seed) {
        return;
    }

    let mut reachable = vec![false; grid.cells().len()];
    let mut queue = VecDeque::new();
    if let Some(index) = grid.index(seed) {
        reachable[index] = true;
        queue.push_back(seed);
    }

    while let Some(cell) = queue.pop_front() {
        for neighbor in cardinal_neighbors(cell) {
            if grid.is_wall(neighbor) {
                continue;
            }
            let Some(index) = grid.index(neighbor) else {
                continue;
            };
            if !reachable[index] {
                reachable[index] = true;
                queue.push_back(neighbor);
            }
        }
    }

    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            let cell = CellCoord::new(column, row);
            let Some(index) = grid.index(cell) else {
                continue;
            };
            if !grid.is_wall(cell) && !reachable[index] {
                grid.set_wall(cell, true);
            }
        }
    }
}

fn cardinal_neighbors(cell: CellCoord) -> [CellCoord; 4] {
    [
        CellCoord::new(cell.column(), cell.row().saturating_sub(1)),
        CellCoord::new(cell.column().saturating_add(1), cell.row()),
        CellCoord::new(cell.column(), cell.row().saturating_add(1)),
        CellCoord::new(cell.column().saturating_sub(1), cell.row()),
    ]
}

fn is_border(cell: CellCoord, columns: u32, rows: u32) -> bool {
    cell.column() == 0
        || cell.row() == 0
        || cell.column() + 1 == columns
        || cell.row() + 1 == rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn recovery_chamber_opens_floor_in_an_all_wall_grid() {
        let mut grid = DungeonGrid::filled(9, 7);
        assert_eq!(grid.floor_count(), 0);

        carve_recovery_chamber(&mut grid);

        assert!(grid.floor_count() > 0);
        for column in 0..grid.columns() {
            assert!(grid.is_wall(CellCoord::new(column, 0)));
            assert!(grid.is_wall(CellCoord::new(column, grid.rows() - 1)));
        }
        for row in 0..grid.rows() {
            assert!(grid.is_wall(CellCoord::new(0, row)));
            assert!(grid.is_wall(CellCoord::new(grid.columns() - 1, row)));
        }
    }

    #[test]
    fn recovery_chamber_fits_minimal_grid() {
        let mut grid = DungeonGrid::filled(3, 3);
        carve_recovery_chamber(&mut grid);
        assert_eq!(grid.floor_count(), 1);
        assert!(!grid.is_wall(CellCoord::new(1, 1)));
    }

    #[test]
    fn repair_walls_off_disconnected_pockets() {
        // Two one-cell pockets separated by a wall column.
        let mut grid = DungeonGrid::filled(5, 3);
        grid.set_wall(CellCoord::new(1, 1), false);
        grid.set_wall(CellCoord::new(3, 1), false);

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        repair_connectivity(&mut grid, &mut rng);

        assert_eq!(grid.floor_count(), 1);
    }

    #[test]
    fn sampling_survives_a_grid_without_floor() {
        let grid = DungeonGrid::filled(6, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cell = random_floor_cell(&grid, &mut rng);
        assert_eq!(cell, CellCoord::new(3, 2));
    }

    #[test]
    fn out_of_bounds_queries_read_as_wall() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let grid = generate(8, 6, &mut rng);
        assert!(grid.is_wall(CellCoord::new(8, 0)));
        assert!(grid.is_wall(CellCoord::new(0, 6)));
        assert!(grid.is_wall(CellCoord::new(u32::MAX, u32::MAX)));
    }
}
