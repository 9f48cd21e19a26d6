#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Delve experience.
//!
//! Wires the authoritative world, the dual-cadence scheduler, and the
//! macroquad backend together: input becomes queued commands, the tick clock
//! decides when the simulation advances, and every frame repopulates the
//! scene snapshot the backend draws.

use std::{path::PathBuf, time::Instant};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use delve_core::{Command, Event, WINDOW_TITLE};
use delve_rendering::{
    audio_cue_for, AudioSink, Color, EnemyPresentation, FrameDigest, GridPresentation,
    HudPresentation, ItemPresentation, NullAudioSink, Presentation, RenderingBackend, Scene,
    SpriteKey,
};
use delve_rendering_macroquad::{MacroquadBackend, Theme};
use delve_scheduler::{CameraFollow, TickClock, CAMERA_BLEND, TICK_INTERVAL};
use delve_world::{self as world, query, Config, World, STARTING_HEALTH, STARTING_HUNGER};
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "delve", about = "Procedural dungeon survival", version)]
struct Args {
    /// Seed for dungeon generation; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Dungeon width in tiles.
    #[arg(long, default_value_t = 40)]
    columns: u32,

    /// Dungeon height in tiles.
    #[arg(long, default_value_t = 30)]
    rows: u32,

    /// Presentation frame-rate cap.
    #[arg(long, default_value_t = 60)]
    fps_cap: u32,

    /// Show the FPS/TPS overlay.
    #[arg(long)]
    show_fps: bool,

    /// Path to a TOML color theme.
    #[arg(long)]
    theme: Option<PathBuf>,
}

fn main() -> Result<()> {
    install_tracing();

    let args = Args::parse();
    ensure!(
        args.columns >= 3 && args.rows >= 3,
        "the dungeon needs at least a 3x3 grid to have an interior",
    );
    ensure!(args.fps_cap > 0, "the frame-rate cap must be positive");

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        columns = args.columns,
        rows = args.rows,
        "world_config"
    );

    let theme = match &args.theme {
        Some(path) => Theme::load(path)
            .with_context(|| format!("failed to load theme {}", path.display()))?,
        None => Theme::default(),
    };

    let mut world = World::new(Config::new(args.columns, args.rows, seed));
    let mut clock = TickClock::new(TICK_INTERVAL);
    let mut camera = CameraFollow::snapped_to(camera_target_of(&world));
    let mut audio = NullAudioSink;
    let mut level_seen = query::level(&world);
    let mut viewport = Vec2::ZERO;

    let mut scene = Scene::default();
    refresh_grid(&world, &mut scene);
    populate_scene(&world, &mut scene, camera.position());

    let presentation = Presentation {
        window_title: WINDOW_TITLE.to_string(),
        clear_color: Color::from_rgb_u8(0, 0, 0),
        scene,
    };

    let backend = MacroquadBackend::new()
        .with_overlay(args.show_fps)
        .with_frame_rate_cap(args.fps_cap)
        .with_theme(theme);

    backend.run(presentation, move |_frame_dt, input, scene| {
        let mut events = Vec::new();

        if input.viewport != viewport && input.viewport != Vec2::ZERO {
            viewport = input.viewport;
            world::apply(
                &mut world,
                Command::ConfigureViewport {
                    columns: viewport.x,
                    rows: viewport.y,
                },
                &mut events,
            );
        }

        if let Some(direction) = input.movement {
            world::apply(&mut world, Command::Move { direction }, &mut events);
        }
        if input.restart {
            world::apply(&mut world, Command::Restart, &mut events);
        }

        let mut ticks = 0;
        if clock.due(Instant::now()) {
            world::apply(&mut world, Command::Tick, &mut events);
            ticks = 1;
        }

        for event in &events {
            if let Some(cue) = audio_cue_for(event) {
                audio.play(cue);
            }
            match event {
                Event::LevelAdvanced { level } => info!(level, "descended"),
                Event::PlayerDied { level } => info!(level, "run_ended"),
                Event::GameRestarted => info!("run_restarted"),
                _ => {}
            }
        }

        let level = query::level(&world);
        let restarted = events
            .iter()
            .any(|event| matches!(event, Event::GameRestarted));
        if level != level_seen || restarted {
            level_seen = level;
            refresh_grid(&world, scene);
            camera.snap_to(camera_target_of(&world));
        }

        let position = camera.advance_toward(camera_target_of(&world), CAMERA_BLEND);
        populate_scene(&world, scene, position);

        FrameDigest { ticks }
    })
}

fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn camera_target_of(world: &World) -> Vec2 {
    let target = query::camera_target(world);
    Vec2::new(target.column(), target.row())
}

fn refresh_grid(world: &World, scene: &mut Scene) {
    let grid = query::grid(world);
    scene.grid = GridPresentation {
        columns: grid.columns(),
        rows: grid.rows(),
        walls: grid.cells().to_vec(),
    };
}

fn populate_scene(world: &World, scene: &mut Scene, camera: Vec2) {
    let player = query::player(world);
    let enemies = query::enemy_view(world);

    scene.player_cell = player.cell;
    scene.camera = camera;
    scene.game_over = query::is_game_over(world);
    scene.victory = query::is_victory(world);

    scene.hud = HudPresentation {
        level: query::level(world),
        enemy_count: enemies.len(),
        health: player.health.get(),
        max_health: STARTING_HEALTH,
        hunger: player.hunger,
        max_hunger: STARTING_HUNGER,
        attack: player.attack,
        defense: player.defense,
    };

    scene.enemies = enemies
        .iter()
        .map(|enemy| EnemyPresentation {
            cell: enemy.cell,
            health: enemy.health.get(),
            max_health: enemy.max_health.get(),
        })
        .collect();

    scene.items = query::item_view(world)
        .iter()
        .map(|item| ItemPresentation {
            cell: item.cell,
            sprite: SpriteKey::for_item(item.kind),
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn arguments_parse_with_defaults() {
        let args = Args::try_parse_from(["delve"]).expect("defaults parse");
        assert_eq!(args.columns, 40);
        assert_eq!(args.rows, 30);
        assert_eq!(args.fps_cap, 60);
        assert_eq!(args.seed, None);
        assert!(!args.show_fps);
    }

    #[test]
    fn seed_and_dimensions_are_accepted() {
        let args = Args::try_parse_from([
            "delve", "--seed", "7", "--columns", "64", "--rows", "48", "--show-fps",
        ])
        .expect("flags parse");
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.columns, 64);
        assert_eq!(args.rows, 48);
        assert!(args.show_fps);
    }
}
