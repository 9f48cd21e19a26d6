use std::collections::VecDeque;

use delve_core::CellCoord;
use delve_system_terrain::{generate, random_floor_cell, DungeonGrid};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DIMENSIONS: [(u32, u32); 5] = [(3, 3), (5, 4), (12, 9), (40, 30), (64, 48)];

#[test]
fn floor_cells_form_a_single_connected_component() {
    for (columns, rows) in DIMENSIONS {
        for seed in 0..24 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let grid = generate(columns, rows, &mut rng);

            let floor_count = grid.floor_count();
            assert!(
                floor_count > 0,
                "no floor for {columns}x{rows} with seed {seed}",
            );

            let seed_cell = first_floor_cell(&grid);
            let reached = flood_fill_count(&grid, seed_cell);
            assert_eq!(
                reached, floor_count,
                "disconnected floor for {columns}x{rows} with seed {seed}",
            );
        }
    }
}

#[test]
fn borders_are_walls_for_every_generated_grid() {
    for (columns, rows) in DIMENSIONS {
        for seed in 0..24 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let grid = generate(columns, rows, &mut rng);

            for column in 0..columns {
                assert!(grid.is_wall(CellCoord::new(column, 0)));
                assert!(grid.is_wall(CellCoord::new(column, rows - 1)));
            }
            for row in 0..rows {
                assert!(grid.is_wall(CellCoord::new(0, row)));
                assert!(grid.is_wall(CellCoord::new(columns - 1, row)));
            }
        }
    }
}

#[test]
fn generation_is_deterministic_per_seed() {
    for seed in [0, 7, 0xdead_beef] {
        let mut first_rng = ChaCha8Rng::seed_from_u64(seed);
        let mut second_rng = ChaCha8Rng::seed_from_u64(seed);

        let first = generate(40, 30, &mut first_rng);
        let second = generate(40, 30, &mut second_rng);

        assert_eq!(first, second);
        assert_eq!(
            random_floor_cell(&first, &mut first_rng),
            random_floor_cell(&second, &mut second_rng),
        );
    }
}

#[test]
fn sampled_floor_cells_are_never_walls() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let grid = generate(40, 30, &mut rng);

    for _ in 0..1_000 {
        let cell = random_floor_cell(&grid, &mut rng);
        assert!(!grid.is_wall(cell));
    }
}

#[test]
fn wall_queries_are_idempotent() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let grid = generate(12, 9, &mut rng);

    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            let cell = CellCoord::new(column, row);
            assert_eq!(grid.is_wall(cell), grid.is_wall(cell));
        }
    }
}

fn first_floor_cell(grid: &DungeonGrid) -> CellCoord {
    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            let cell = CellCoord::new(column, row);
            if !grid.is_wall(cell) {
                return cell;
            }
        }
    }
    unreachable!("caller guarantees the grid has floor");
}

fn flood_fill_count(grid: &DungeonGrid, seed: CellCoord) -> usize {
    let mut visited = vec![false; grid.cells().len()];
    let mut queue = VecDeque::new();
    let width = grid.columns() as usize;

    visited[seed.row() as usize * width + seed.column() as usize] = true;
    queue.push_back(seed);
    let mut reached = 1;

    while let Some(cell) = queue.pop_front() {
        let neighbors = [
            (cell.column() as i64, cell.row() as i64 - 1),
            (cell.column() as i64 + 1, cell.row() as i64),
            (cell.column() as i64, cell.row() as i64 + 1),
            (cell.column() as i64 - 1, cell.row() as i64),
        ];
        for (column, row) in neighbors {
            if column < 0 || row < 0 {
                continue;
            }
            let neighbor = CellCoord::new(column as u32, row as u32);
            if grid.is_wall(neighbor) {
                continue;
            }
            let index = neighbor.row() as usize * width + neighbor.column() as usize;
            if !visited[index] {
                visited[index] = true;
                reached += 1;
                queue.push_back(neighbor);
            }
        }
    }

    reached
}
