#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Delve.
//!
//! The world owns the dungeon grid and every mutable entity collection for
//! the active level. Adapters never mutate state directly: movement and
//! restart requests arrive as [`Command`] values, are queued as intents, and
//! drain atomically at the start of the next simulation tick. Presentation
//! code reads immutable snapshots out of the [`query`] module.

use delve_core::{
    CameraTarget, CellCoord, Command, Direction, EnemyId, Event, Health, ItemId, ItemKind,
};
use delve_system_chase::chase_step;
use delve_system_terrain::{self as terrain, DungeonGrid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Health the player starts with, and the cap potions restore toward.
pub const STARTING_HEALTH: u32 = 100;
/// Hunger the player starts with, and the cap food restores toward.
pub const STARTING_HUNGER: u32 = 100;

const STARTING_ATTACK: u32 = 10;
const STARTING_DEFENSE: u32 = 5;

const HUNGER_DECAY_INTERVAL_TICKS: u32 = 10;
const STARVATION_DAMAGE: u32 = 2;
const MINIMUM_STRIKE_DAMAGE: u32 = 1;

const POTION_HEALTH_RESTORE: u32 = 30;
const FOOD_HUNGER_RESTORE: u32 = 40;
const WEAPON_ATTACK_BONUS: u32 = 5;
const WEAPON_DEFENSE_BONUS: u32 = 2;

const BASE_ENEMY_COUNT: u32 = 5;
const ENEMIES_PER_LEVEL: u32 = 2;
const BASE_ITEM_COUNT: u32 = 8;

const DEFAULT_COLUMNS: u32 = 40;
const DEFAULT_ROWS: u32 = 30;
const DEFAULT_VIEWPORT_COLUMNS: f32 = 40.0;
const DEFAULT_VIEWPORT_ROWS: f32 = 22.5;

const PICKUP_KINDS: [ItemKind; 3] = [ItemKind::HealthPotion, ItemKind::Food, ItemKind::Weapon];

/// Configuration required to construct a world.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    columns: u32,
    rows: u32,
    seed: u64,
    viewport_columns: f32,
    viewport_rows: f32,
}

impl Config {
    /// Creates a configuration with the provided dungeon dimensions and seed.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, seed: u64) -> Self {
        Self {
            columns,
            rows,
            seed,
            viewport_columns: DEFAULT_VIEWPORT_COLUMNS,
            viewport_rows: DEFAULT_VIEWPORT_ROWS,
        }
    }

    /// Overrides the initial viewport extent, measured in fractional tiles.
    #[must_use]
    pub const fn with_viewport(mut self, columns: f32, rows: f32) -> Self {
        self.viewport_columns = columns;
        self.viewport_rows = rows;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS, 0)
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    cell: CellCoord,
    health: Health,
    hunger: u32,
    attack: u32,
    defense: u32,
    hunger_ticks: u32,
}

impl Player {
    fn spawned_at(cell: CellCoord) -> Self {
        Self {
            cell,
            health: Health::new(STARTING_HEALTH),
            hunger: STARTING_HUNGER,
            attack: STARTING_ATTACK,
            defense: STARTING_DEFENSE,
            hunger_ticks: 0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Enemy {
    id: EnemyId,
    cell: CellCoord,
    health: Health,
    max_health: Health,
    damage: u32,
    speed: u32,
    counter: u32,
}

impl Enemy {
    fn for_level(id: EnemyId, cell: CellCoord, level: u32) -> Self {
        let max_health = Health::new(20 + 10 * level);
        Self {
            id,
            cell,
            health: max_health,
            max_health,
            damage: 5 + 2 * level,
            speed: 5u32.saturating_sub(level).max(2),
            counter: 0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Item {
    id: ItemId,
    kind: ItemKind,
    cell: CellCoord,
}

#[derive(Clone, Copy, Debug)]
enum Intent {
    Move(Direction),
    Restart,
}

/// Represents the authoritative Delve world state.
#[derive(Debug)]
pub struct World {
    grid: DungeonGrid,
    player: Player,
    enemies: Vec<Enemy>,
    items: Vec<Item>,
    level: u32,
    game_over: bool,
    victory: bool,
    camera_target: CameraTarget,
    viewport_columns: f32,
    viewport_rows: f32,
    intents: Vec<Intent>,
    next_enemy_id: u32,
    next_item_id: u32,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world ready for simulation, populated at level one.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid = terrain::generate(config.columns, config.rows, &mut rng);
        let player_cell = terrain::random_floor_cell(&grid, &mut rng);

        let mut world = Self {
            grid,
            player: Player::spawned_at(player_cell),
            enemies: Vec::new(),
            items: Vec::new(),
            level: 1,
            game_over: false,
            victory: false,
            camera_target: CameraTarget::default(),
            viewport_columns: config.viewport_columns,
            viewport_rows: config.viewport_rows,
            intents: Vec::new(),
            next_enemy_id: 0,
            next_item_id: 0,
            rng,
        };
        world.populate_level();
        world.refresh_camera_target();
        world
    }

    fn regenerate_level(&mut self) {
        self.grid = terrain::generate(self.grid.columns(), self.grid.rows(), &mut self.rng);
        self.player.cell = terrain::random_floor_cell(&self.grid, &mut self.rng);
        self.populate_level();
        self.refresh_camera_target();
    }

    fn populate_level(&mut self) {
        self.enemies.clear();
        let enemy_count = BASE_ENEMY_COUNT + ENEMIES_PER_LEVEL * self.level;
        for _ in 0..enemy_count {
            let cell = terrain::random_floor_cell(&self.grid, &mut self.rng);
            let id = self.allocate_enemy_id();
            self.enemies.push(Enemy::for_level(id, cell, self.level));
        }

        self.items.clear();
        let item_count = BASE_ITEM_COUNT + self.level;
        for _ in 0..item_count {
            let cell = terrain::random_floor_cell(&self.grid, &mut self.rng);
            let kind = PICKUP_KINDS[self.rng.gen_range(0..PICKUP_KINDS.len())];
            let id = self.allocate_item_id();
            self.items.push(Item { id, kind, cell });
        }

        let stairs_cell = terrain::random_floor_cell(&self.grid, &mut self.rng);
        let stairs_id = self.allocate_item_id();
        self.items.push(Item {
            id: stairs_id,
            kind: ItemKind::Stairs,
            cell: stairs_cell,
        });
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn allocate_item_id(&mut self) -> ItemId {
        let id = ItemId::new(self.next_item_id);
        self.next_item_id = self.next_item_id.wrapping_add(1);
        id
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.drain_intents(out_events);

        if self.game_over || self.victory {
            return;
        }

        self.decay_hunger(out_events);

        if self.player.health.is_depleted() {
            self.game_over = true;
            out_events.push(Event::PlayerDied { level: self.level });
            return;
        }

        self.advance_enemies(out_events);
        self.resolve_combat(out_events);
        self.refresh_camera_target();
    }

    fn drain_intents(&mut self, out_events: &mut Vec<Event>) {
        let intents = std::mem::take(&mut self.intents);
        for intent in intents {
            match intent {
                Intent::Restart => {
                    if self.game_over {
                        self.restart(out_events);
                        // The level the remaining intents referred to is gone.
                        break;
                    }
                }
                Intent::Move(direction) => {
                    if !self.game_over && self.try_move(direction, out_events) {
                        break;
                    }
                }
            }
        }
    }

    /// Applies one queued movement intent. Returns `true` when the move
    /// triggered a level transition, invalidating the rest of the queue.
    fn try_move(&mut self, direction: Direction, out_events: &mut Vec<Event>) -> bool {
        let Some(destination) = self.player.cell.step(direction) else {
            return false;
        };
        if self.grid.is_wall(destination) {
            return false;
        }

        let from = self.player.cell;
        self.player.cell = destination;
        out_events.push(Event::PlayerMoved {
            from,
            to: destination,
        });

        self.collect_items_at(destination, out_events)
    }

    fn collect_items_at(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> bool {
        let mut index = 0;
        while index < self.items.len() {
            if self.items[index].cell != cell {
                index += 1;
                continue;
            }

            let item = self.items[index];
            if item.kind == ItemKind::Stairs {
                self.level += 1;
                out_events.push(Event::LevelAdvanced { level: self.level });
                self.regenerate_level();
                return true;
            }

            let collected = self.items.remove(index);
            self.apply_item_effect(collected.kind);
            out_events.push(Event::ItemCollected {
                item: collected.id,
                kind: collected.kind,
                cell,
            });
        }
        false
    }

    fn apply_item_effect(&mut self, kind: ItemKind) {
        match kind {
            ItemKind::HealthPotion => {
                self.player.health = self
                    .player
                    .health
                    .restored(POTION_HEALTH_RESTORE, STARTING_HEALTH);
            }
            ItemKind::Food => {
                self.player.hunger = self
                    .player
                    .hunger
                    .saturating_add(FOOD_HUNGER_RESTORE)
                    .min(STARTING_HUNGER);
            }
            ItemKind::Weapon => {
                self.player.attack += WEAPON_ATTACK_BONUS;
                self.player.defense += WEAPON_DEFENSE_BONUS;
            }
            ItemKind::Stairs => {}
        }
    }

    fn decay_hunger(&mut self, out_events: &mut Vec<Event>) {
        self.player.hunger_ticks += 1;
        if self.player.hunger_ticks < HUNGER_DECAY_INTERVAL_TICKS {
            return;
        }
        self.player.hunger_ticks = 0;
        self.player.hunger = self.player.hunger.saturating_sub(1);

        let starving = self.player.hunger == 0;
        if starving {
            self.player.health = self.player.health.damaged(STARVATION_DAMAGE);
        }
        out_events.push(Event::HungerDecayed {
            hunger: self.player.hunger,
            starving,
        });
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        let grid = &self.grid;
        let player_cell = self.player.cell;

        for enemy in &mut self.enemies {
            enemy.counter += 1;
            if enemy.counter < enemy.speed {
                continue;
            }
            // The counter resets whether or not a step is possible.
            enemy.counter = 0;

            if let Some(destination) =
                chase_step(enemy.cell, player_cell, |cell| grid.is_wall(cell))
            {
                let from = enemy.cell;
                enemy.cell = destination;
                out_events.push(Event::EnemyMoved {
                    enemy: enemy.id,
                    from,
                    to: destination,
                });
            }
        }
    }

    fn resolve_combat(&mut self, out_events: &mut Vec<Event>) {
        let player_cell = self.player.cell;
        let attack = self.player.attack;
        let defense = self.player.defense;

        let mut health = self.player.health;
        let mut any_slain = false;
        for enemy in &mut self.enemies {
            if enemy.cell != player_cell {
                continue;
            }

            let damage = enemy.damage.saturating_sub(defense).max(MINIMUM_STRIKE_DAMAGE);
            health = health.damaged(damage);
            out_events.push(Event::PlayerStruck {
                enemy: enemy.id,
                damage,
                health,
            });

            enemy.health = enemy.health.damaged(attack);
            if enemy.health.is_depleted() {
                any_slain = true;
                out_events.push(Event::EnemySlain {
                    enemy: enemy.id,
                    cell: enemy.cell,
                });
            }
        }
        self.player.health = health;

        if any_slain {
            self.enemies.retain(|enemy| !enemy.health.is_depleted());
        }
    }

    fn refresh_camera_target(&mut self) {
        let column = clamp_axis(
            self.player.cell.column() as f32,
            self.viewport_columns,
            self.grid.columns() as f32,
        );
        let row = clamp_axis(
            self.player.cell.row() as f32,
            self.viewport_rows,
            self.grid.rows() as f32,
        );
        self.camera_target = CameraTarget::new(column, row);
    }

    fn restart(&mut self, out_events: &mut Vec<Event>) {
        self.level = 1;
        self.player = Player::spawned_at(self.player.cell);
        self.game_over = false;
        self.victory = false;
        self.regenerate_level();
        out_events.push(Event::GameRestarted);
    }
}

fn clamp_axis(focus: f32, viewport: f32, extent: f32) -> f32 {
    let scroll_limit = (extent - viewport).max(0.0);
    (focus - viewport / 2.0).clamp(0.0, scroll_limit)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.tick(out_events),
        Command::Move { direction } => world.intents.push(Intent::Move(direction)),
        Command::Restart => world.intents.push(Intent::Restart),
        Command::ConfigureViewport { columns, rows } => {
            world.viewport_columns = columns.max(0.0);
            world.viewport_rows = rows.max(0.0);
            world.refresh_camera_target();
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use delve_core::{
        CameraTarget, CellCoord, EnemySnapshot, EnemyView, ItemSnapshot, ItemView, PlayerSnapshot,
    };
    use delve_system_terrain::DungeonGrid;

    /// Provides read-only access to the active level's wall grid.
    #[must_use]
    pub fn grid(world: &World) -> &DungeonGrid {
        &world.grid
    }

    /// Reports whether the cell is a wall; out-of-grid cells count as wall.
    #[must_use]
    pub fn is_wall(world: &World, cell: CellCoord) -> bool {
        world.grid.is_wall(cell)
    }

    /// Level number the player is currently on.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Reports whether the run has ended in defeat.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Reports whether the run has ended in victory.
    ///
    /// Reserved by the rules; nothing sets it today.
    #[must_use]
    pub fn is_victory(world: &World) -> bool {
        world.victory
    }

    /// Captures a read-only snapshot of the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: world.player.cell,
            health: world.player.health,
            hunger: world.player.hunger,
            attack: world.player.attack,
            defense: world.player.defense,
        }
    }

    /// Captures a read-only view of the enemies on the active level.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                cell: enemy.cell,
                health: enemy.health,
                max_health: enemy.max_health,
                damage: enemy.damage,
                speed: enemy.speed,
                ready_to_act: enemy.counter + 1 >= enemy.speed,
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the items on the active level.
    #[must_use]
    pub fn item_view(world: &World) -> ItemView {
        let snapshots: Vec<ItemSnapshot> = world
            .items
            .iter()
            .map(|item| ItemSnapshot {
                id: item.id,
                kind: item.kind,
                cell: item.cell,
            })
            .collect();
        ItemView::from_snapshots(snapshots)
    }

    /// Camera focus computed by the most recent tick, in fractional tiles.
    #[must_use]
    pub fn camera_target(world: &World) -> CameraTarget {
        world.camera_target
    }
}
