#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Delve engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that adapters
//! and systems consume. Presentation code only ever reads snapshot views,
//! never the world's internals.

use serde::{Deserialize, Serialize};

/// Window title presented when the experience boots.
pub const WINDOW_TITLE: &str = "Delve";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by exactly one fixed tick.
    Tick,
    /// Queues a single-cell movement intent for the player.
    Move {
        /// Direction of the requested step.
        direction: Direction,
    },
    /// Queues a restart intent, honored only while the run is over.
    Restart,
    /// Updates the viewport extent used for camera clamping.
    ConfigureViewport {
        /// Viewport width measured in fractional tiles.
        columns: f32,
        /// Viewport height measured in fractional tiles.
        rows: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the player stepped between two cells.
    PlayerMoved {
        /// Cell the player occupied before the step.
        from: CellCoord,
        /// Cell the player occupies after the step.
        to: CellCoord,
    },
    /// Confirms that the player picked up an item.
    ItemCollected {
        /// Identifier of the collected item.
        item: ItemId,
        /// Kind of the collected item.
        kind: ItemKind,
        /// Cell the item was resting on.
        cell: CellCoord,
    },
    /// Announces that the player descended to a deeper level.
    LevelAdvanced {
        /// Level number now active.
        level: u32,
    },
    /// Announces that a finished run was reset to level one.
    GameRestarted,
    /// Reports the periodic hunger decrement.
    HungerDecayed {
        /// Hunger remaining after the decrement.
        hunger: u32,
        /// Whether the decrement drained hunger to zero and hurt the player.
        starving: bool,
    },
    /// Reports that a co-located enemy struck the player.
    PlayerStruck {
        /// Identifier of the attacking enemy.
        enemy: EnemyId,
        /// Damage dealt after the defense deduction.
        damage: u32,
        /// Player health remaining after the strike.
        health: Health,
    },
    /// Confirms that an enemy advanced one cell toward the player.
    EnemyMoved {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Cell the enemy occupied before the step.
        from: CellCoord,
        /// Cell the enemy occupies after the step.
        to: CellCoord,
    },
    /// Announces that the player's counterattack destroyed an enemy.
    EnemySlain {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Cell the enemy occupied when it fell.
        cell: CellCoord,
    },
    /// Announces that the player's health reached zero and the run ended.
    PlayerDied {
        /// Level number the run ended on.
        level: u32,
    },
}

/// Cardinal movement directions available to the player and enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new item identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of items that can rest on dungeon floor cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Restores a fixed amount of health up to the starting cap.
    HealthPotion,
    /// Restores a fixed amount of hunger up to the starting cap.
    Food,
    /// Permanently raises attack and defense by fixed amounts.
    Weapon,
    /// Descends to the next level when stepped on.
    Stairs,
}

/// Bounded vitality measure used for the player and enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining health points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no health remains.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }

    /// Returns the health remaining after absorbing the provided damage.
    #[must_use]
    pub const fn damaged(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Returns the health after restoring points, clamped to the given cap.
    #[must_use]
    pub fn restored(self, amount: u32, cap: u32) -> Self {
        Self(self.0.saturating_add(amount).min(cap))
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Returns the neighboring cell in the provided direction, if it exists.
    ///
    /// Coordinates are unsigned, so stepping north or west off the zero edge
    /// yields `None`; callers treat that exactly like a wall.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => match self.row.checked_sub(1) {
                Some(row) => Some(CellCoord::new(self.column, row)),
                None => None,
            },
            Direction::East => match self.column.checked_add(1) {
                Some(column) => Some(CellCoord::new(column, self.row)),
                None => None,
            },
            Direction::South => match self.row.checked_add(1) {
                Some(row) => Some(CellCoord::new(self.column, row)),
                None => None,
            },
            Direction::West => match self.column.checked_sub(1) {
                Some(column) => Some(CellCoord::new(column, self.row)),
                None => None,
            },
        }
    }
}

/// Camera focus expressed in fractional tile units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CameraTarget {
    column: f32,
    row: f32,
}

impl CameraTarget {
    /// Creates a new camera target at the provided fractional tile position.
    #[must_use]
    pub const fn new(column: f32, row: f32) -> Self {
        Self { column, row }
    }

    /// Horizontal focus in fractional tiles.
    #[must_use]
    pub const fn column(&self) -> f32 {
        self.column
    }

    /// Vertical focus in fractional tiles.
    #[must_use]
    pub const fn row(&self) -> f32 {
        self.row
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Grid cell currently occupied by the player.
    pub cell: CellCoord,
    /// Remaining health points.
    pub health: Health,
    /// Remaining hunger points.
    pub hunger: u32,
    /// Current attack strength.
    pub attack: u32,
    /// Current defense rating.
    pub defense: u32,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Grid cell currently occupied by the enemy.
    pub cell: CellCoord,
    /// Remaining health points.
    pub health: Health,
    /// Health the enemy spawned with.
    pub max_health: Health,
    /// Raw damage dealt before the player's defense deduction.
    pub damage: u32,
    /// Ticks the movement counter must accumulate between actions.
    pub speed: u32,
    /// Whether the movement counter will fill on the upcoming tick.
    pub ready_to_act: bool,
}

/// Read-only snapshot describing all enemies on the active level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single item's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// Unique identifier assigned to the item.
    pub id: ItemId,
    /// Kind of the item.
    pub kind: ItemKind,
    /// Grid cell the item rests on.
    pub cell: CellCoord,
}

/// Read-only snapshot describing all items on the active level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemView {
    snapshots: Vec<ItemSnapshot>,
}

impl ItemView {
    /// Creates a new item view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ItemSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured item snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemSnapshot> {
        self.snapshots.iter()
    }

    /// Number of items captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ItemSnapshot> {
        self.snapshots
    }
}
