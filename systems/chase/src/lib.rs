#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy single-axis pursuit used by enemy motion.
//!
//! An acting enemy compares its position against the player's and steps one
//! cell along a single axis. The horizontal axis always wins when it is
//! nonzero and unblocked; otherwise the vertical axis is tried; otherwise the
//! enemy stays put. There is no diagonal movement and no planning around
//! obstacles, so enemies can stall indefinitely against concave wall shapes.
//! The asymmetric tie-break is observable difficulty; changing it changes
//! the game.

use std::cmp::Ordering;

use delve_core::{CellCoord, Direction};

/// Computes the cell an acting enemy steps to, if any.
///
/// `is_wall` is the world's wall predicate; any cell it rejects (including
/// everything outside the grid) blocks the step. Returns `None` when both
/// axis moves are zero or blocked.
#[must_use]
pub fn chase_step<F>(enemy: CellCoord, player: CellCoord, is_wall: F) -> Option<CellCoord>
where
    F: Fn(CellCoord) -> bool,
{
    let horizontal = horizontal_direction(enemy, player);
    if let Some(direction) = horizontal {
        if let Some(destination) = enemy.step(direction) {
            if !is_wall(destination) {
                return Some(destination);
            }
        }
    }

    let vertical = vertical_direction(enemy, player);
    if let Some(direction) = vertical {
        if let Some(destination) = enemy.step(direction) {
            if !is_wall(destination) {
                return Some(destination);
            }
        }
    }

    None
}

fn horizontal_direction(enemy: CellCoord, player: CellCoord) -> Option<Direction> {
    match player.column().cmp(&enemy.column()) {
        Ordering::Greater => Some(Direction::East),
        Ordering::Less => Some(Direction::West),
        Ordering::Equal => None,
    }
}

fn vertical_direction(enemy: CellCoord, player: CellCoord) -> Option<Direction> {
    match player.row().cmp(&enemy.row()) {
        Ordering::Greater => Some(Direction::South),
        Ordering::Less => Some(Direction::North),
        Ordering::Equal => None,
    }
}
