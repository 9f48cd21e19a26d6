#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Delve adapters.
//!
//! Backends receive a [`Presentation`] and a per-frame callback that drains
//! input, advances the simulation when a tick is due, and repopulates the
//! [`Scene`] snapshot. Everything a backend draws comes out of that snapshot;
//! nothing here reaches back into the world.

use anyhow::Result as AnyResult;
use delve_core::{CellCoord, Direction, Event, ItemKind};
use glam::Vec2;
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Identifiers an image-providing collaborator resolves to visuals.
///
/// The core promises these identifiers stay fixed per drawable thing; whether
/// a lookup succeeds is the collaborator's concern, and backends fall back to
/// primitive shapes when it does not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// The player character.
    Player,
    /// A wall tile.
    Wall,
    /// A floor tile.
    Floor,
    /// A chasing enemy.
    Enemy,
    /// A health potion pickup.
    HealthPotion,
    /// A food pickup.
    Food,
    /// A weapon pickup.
    Weapon,
    /// The stairs down to the next level.
    Stairs,
}

impl SpriteKey {
    /// Fixed visual identifier for an item kind.
    #[must_use]
    pub const fn for_item(kind: ItemKind) -> Self {
        match kind {
            ItemKind::HealthPotion => Self::HealthPotion,
            ItemKind::Food => Self::Food,
            ItemKind::Weapon => Self::Weapon,
            ItemKind::Stairs => Self::Stairs,
        }
    }
}

/// Identifiers an audio-playing collaborator resolves to sounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// A health potion was drunk.
    Potion,
    /// Food was eaten.
    Food,
    /// A weapon was picked up.
    Weapon,
    /// The player descended to the next level.
    LevelUp,
    /// The player died.
    Death,
}

/// Maps a world event to the audio cue it should trigger, if any.
#[must_use]
pub fn audio_cue_for(event: &Event) -> Option<AudioCue> {
    match event {
        Event::ItemCollected { kind, .. } => match kind {
            ItemKind::HealthPotion => Some(AudioCue::Potion),
            ItemKind::Food => Some(AudioCue::Food),
            ItemKind::Weapon => Some(AudioCue::Weapon),
            // Stairs never surface as a collection; the level advance covers it.
            ItemKind::Stairs => None,
        },
        Event::LevelAdvanced { .. } => Some(AudioCue::LevelUp),
        Event::PlayerDied { .. } => Some(AudioCue::Death),
        _ => None,
    }
}

/// Sink that an audio collaborator implements to receive cues.
///
/// Lookup or playback failures stay inside the collaborator; the core never
/// observes them.
pub trait AudioSink {
    /// Plays the sound registered for the provided cue, if any.
    fn play(&mut self, cue: AudioCue);
}

/// Audio sink that discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn play(&mut self, _cue: AudioCue) {}
}

/// Input gathered by the backend during a single presentation frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Movement intent detected this frame, if any.
    pub movement: Option<Direction>,
    /// Whether a restart was requested this frame.
    pub restart: bool,
    /// Viewport extent the backend is drawing, in fractional tiles.
    pub viewport: Vec2,
}

/// Result handed back by the per-frame callback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameDigest {
    /// Number of simulation ticks that ran during the frame.
    pub ticks: u32,
}

/// Wall layout of the active level, copied for presentation use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridPresentation {
    /// Number of tile columns in the level.
    pub columns: u32,
    /// Number of tile rows in the level.
    pub rows: u32,
    /// Row-major wall bitmap; `true` marks a wall.
    pub walls: Vec<bool>,
}

impl GridPresentation {
    /// Reports whether the tile is a wall; out-of-grid tiles count as wall.
    #[must_use]
    pub fn is_wall(&self, column: u32, row: u32) -> bool {
        if column >= self.columns || row >= self.rows {
            return true;
        }
        let index = row as usize * self.columns as usize + column as usize;
        self.walls.get(index).copied().unwrap_or(true)
    }
}

/// Presentation state of a single enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyPresentation {
    /// Tile the enemy stands on.
    pub cell: CellCoord,
    /// Remaining health, for the overhead bar.
    pub health: u32,
    /// Health the enemy spawned with.
    pub max_health: u32,
}

/// Presentation state of a single item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemPresentation {
    /// Tile the item rests on.
    pub cell: CellCoord,
    /// Visual identifier to resolve for the item.
    pub sprite: SpriteKey,
}

/// Status readouts shown by the heads-up display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HudPresentation {
    /// Level number the player is on.
    pub level: u32,
    /// Enemies remaining on the level.
    pub enemy_count: usize,
    /// Remaining player health.
    pub health: u32,
    /// Health bar capacity.
    pub max_health: u32,
    /// Remaining player hunger.
    pub hunger: u32,
    /// Hunger bar capacity.
    pub max_hunger: u32,
    /// Current attack strength.
    pub attack: u32,
    /// Current defense rating.
    pub defense: u32,
}

/// Read-only snapshot of everything a backend draws in one frame.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Wall layout of the active level.
    pub grid: GridPresentation,
    /// Tile the player stands on.
    pub player_cell: CellCoord,
    /// Enemies visible on the level.
    pub enemies: Vec<EnemyPresentation>,
    /// Items visible on the level.
    pub items: Vec<ItemPresentation>,
    /// Smoothed camera position in fractional tile units.
    pub camera: Vec2,
    /// Heads-up display readouts.
    pub hud: HudPresentation,
    /// Whether the run ended in defeat.
    pub game_over: bool,
    /// Whether the run ended in victory.
    pub victory: bool,
}

/// Initial window and scene configuration handed to a backend.
#[derive(Clone, Debug)]
pub struct Presentation {
    /// Title requested for the backend's window.
    pub window_title: String,
    /// Color used to clear the frame before drawing.
    pub clear_color: Color,
    /// Scene the first frame presents.
    pub scene: Scene,
}

/// Contract implemented by rendering backends.
pub trait RenderingBackend {
    /// Runs the presentation loop until the player quits.
    ///
    /// The callback runs once per presentation iteration with the elapsed
    /// frame time and the input gathered during the frame; it owns advancing
    /// the simulation and refreshing the scene.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameDigest + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::{EnemyId, Health, ItemId};

    #[test]
    fn item_kinds_map_to_fixed_sprite_keys() {
        assert_eq!(
            SpriteKey::for_item(ItemKind::HealthPotion),
            SpriteKey::HealthPotion,
        );
        assert_eq!(SpriteKey::for_item(ItemKind::Food), SpriteKey::Food);
        assert_eq!(SpriteKey::for_item(ItemKind::Weapon), SpriteKey::Weapon);
        assert_eq!(SpriteKey::for_item(ItemKind::Stairs), SpriteKey::Stairs);
    }

    #[test]
    fn collection_events_resolve_to_their_cues() {
        let collected = Event::ItemCollected {
            item: ItemId::new(1),
            kind: ItemKind::Food,
            cell: CellCoord::new(2, 2),
        };
        assert_eq!(audio_cue_for(&collected), Some(AudioCue::Food));

        assert_eq!(
            audio_cue_for(&Event::LevelAdvanced { level: 2 }),
            Some(AudioCue::LevelUp),
        );
        assert_eq!(
            audio_cue_for(&Event::PlayerDied { level: 3 }),
            Some(AudioCue::Death),
        );
    }

    #[test]
    fn movement_events_are_silent() {
        let moved = Event::PlayerMoved {
            from: CellCoord::new(1, 1),
            to: CellCoord::new(1, 2),
        };
        assert_eq!(audio_cue_for(&moved), None);

        let struck = Event::PlayerStruck {
            enemy: EnemyId::new(0),
            damage: 2,
            health: Health::new(98),
        };
        assert_eq!(audio_cue_for(&struck), None);
    }

    #[test]
    fn grid_presentation_reports_walls_outside_its_bounds() {
        let grid = GridPresentation {
            columns: 2,
            rows: 2,
            walls: vec![true, false, false, true],
        };
        assert!(grid.is_wall(0, 0));
        assert!(!grid.is_wall(1, 0));
        assert!(grid.is_wall(2, 0));
        assert!(grid.is_wall(0, 2));
    }

    #[test]
    fn lighten_moves_channels_toward_white() {
        let color = Color::from_rgb_u8(100, 100, 100).lighten(0.5);
        assert!(color.red > 0.5 && color.red < 1.0);
        assert_eq!(Color::from_rgb_u8(0, 0, 0).lighten(1.0).red, 1.0);
    }
}
