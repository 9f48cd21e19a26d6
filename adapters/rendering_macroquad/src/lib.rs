#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Delve.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature; sound routing happens through the core's
//! [`AudioSink`](delve_rendering::AudioSink) seam instead.
//!
//! The adapter draws primitive shapes colored through a [`Theme`], the
//! lookup-by-identifier seam that replaces on-disk sprite assets. Everything
//! rendered comes out of the [`Scene`] snapshot refreshed by the per-frame
//! callback.

mod theme;

pub use theme::{Theme, ThemeError};

use std::{
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;
use delve_core::Direction;
use delve_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene, SpriteKey,
};
use delve_scheduler::FrameLimiter;
use glam::Vec2;
use macroquad::{
    input::{is_key_pressed, KeyCode},
    shapes::{draw_circle, draw_rectangle, draw_rectangle_lines},
    text::{draw_text, measure_text},
};

const TILE_SIZE: f32 = 32.0;
const WINDOW_WIDTH: i32 = 1280;
const WINDOW_HEIGHT: i32 = 720;
const DEFAULT_FRAME_RATE: u32 = 60;

/// Snapshot of edge-triggered keyboard input observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the presentation loop.
    quit_requested: bool,
    /// WASD or arrow keys map to a single movement intent per frame.
    movement: Option<Direction>,
    /// `R` requests a restart; only forwarded while the run is over.
    restart: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let restart = is_key_pressed(KeyCode::R);

        let movement = if is_key_pressed(KeyCode::W) || is_key_pressed(KeyCode::Up) {
            Some(Direction::North)
        } else if is_key_pressed(KeyCode::S) || is_key_pressed(KeyCode::Down) {
            Some(Direction::South)
        } else if is_key_pressed(KeyCode::A) || is_key_pressed(KeyCode::Left) {
            Some(Direction::West)
        } else if is_key_pressed(KeyCode::D) || is_key_pressed(KeyCode::Right) {
            Some(Direction::East)
        } else {
            None
        };

        Self {
            quit_requested,
            movement,
            restart,
        }
    }
}

/// Rolling one-second counters for the presentation and simulation cadences.
#[derive(Clone, Copy, Debug)]
struct CadenceCounter {
    window_started: Instant,
    frames: u32,
    ticks: u32,
    frames_per_second: u32,
    ticks_per_second: u32,
}

impl CadenceCounter {
    fn new(now: Instant) -> Self {
        Self {
            window_started: now,
            frames: 0,
            ticks: 0,
            frames_per_second: 0,
            ticks_per_second: 0,
        }
    }

    fn record(&mut self, ticks: u32, now: Instant) {
        self.frames += 1;
        self.ticks += ticks;
        if now.duration_since(self.window_started) >= Duration::from_secs(1) {
            self.frames_per_second = self.frames;
            self.ticks_per_second = self.ticks;
            self.frames = 0;
            self.ticks = 0;
            self.window_started = now;
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug)]
pub struct MacroquadBackend {
    show_overlay: bool,
    frame_rate_cap: u32,
    theme: Theme,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            show_overlay: false,
            frame_rate_cap: DEFAULT_FRAME_RATE,
            theme: Theme::default(),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend with the built-in theme and a 60 Hz frame cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles the FPS/TPS overlay in the top-right corner.
    #[must_use]
    pub fn with_overlay(mut self, show_overlay: bool) -> Self {
        self.show_overlay = show_overlay;
        self
    }

    /// Overrides the presentation frame-rate cap.
    #[must_use]
    pub fn with_frame_rate_cap(mut self, frame_rate_cap: u32) -> Self {
        self.frame_rate_cap = frame_rate_cap.max(1);
        self
    }

    /// Overrides the color theme used for primitive-shape drawing.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> delve_rendering::FrameDigest + 'static,
    {
        let Self {
            show_overlay,
            frame_rate_cap,
            theme,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let config = macroquad::window::Conf {
            window_title,
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            ..macroquad::window::Conf::default()
        };

        let limiter = FrameLimiter::new(Duration::from_secs_f64(1.0 / f64::from(frame_rate_cap)));

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut cadence = CadenceCounter::new(Instant::now());

            loop {
                let frame_start = Instant::now();

                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(to_macroquad_color(clear_color));

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let viewport = Vec2::new(screen_width / TILE_SIZE, screen_height / TILE_SIZE);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = FrameInput {
                    movement: keyboard.movement,
                    restart: keyboard.restart && scene.game_over,
                    viewport,
                };

                let digest = update_scene(frame_dt, frame_input, &mut scene);

                if scene.game_over {
                    draw_game_over(&scene, screen_width, screen_height);
                } else if scene.victory {
                    draw_victory(&scene, screen_width, screen_height);
                } else {
                    draw_dungeon(&scene, &theme, viewport);
                    draw_items(&scene, screen_width, screen_height, &theme);
                    draw_enemies(&scene, screen_width, screen_height, &theme);
                    draw_player(&scene, &theme);
                    draw_hud(&scene, screen_height);
                }

                cadence.record(digest.ticks, Instant::now());
                if show_overlay {
                    draw_overlay(&cadence, screen_width);
                }

                // The regulatory sleep: surplus frame budget is given back to
                // the OS instead of spinning until the next vsync.
                let surplus = limiter.surplus(frame_start, Instant::now());
                if !surplus.is_zero() {
                    thread::sleep(surplus);
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

fn screen_position(cell_column: u32, cell_row: u32, camera: Vec2) -> Vec2 {
    Vec2::new(
        cell_column as f32 * TILE_SIZE - camera.x * TILE_SIZE,
        cell_row as f32 * TILE_SIZE - camera.y * TILE_SIZE,
    )
}

fn on_screen(position: Vec2, screen_width: f32, screen_height: f32) -> bool {
    position.x > -TILE_SIZE
        && position.x < screen_width
        && position.y > -TILE_SIZE
        && position.y < screen_height
}

fn draw_dungeon(scene: &Scene, theme: &Theme, viewport: Vec2) {
    let camera = scene.camera;
    let start_column = camera.x.floor().max(0.0) as u32;
    let start_row = camera.y.floor().max(0.0) as u32;
    let end_column = ((camera.x + viewport.x).ceil() as u32 + 1).min(scene.grid.columns);
    let end_row = ((camera.y + viewport.y).ceil() as u32 + 1).min(scene.grid.rows);

    let wall_color = to_macroquad_color(theme.color_for(SpriteKey::Wall));
    let wall_edge = to_macroquad_color(theme.color_for(SpriteKey::Wall).lighten(0.15));
    let floor_color = to_macroquad_color(theme.color_for(SpriteKey::Floor));

    for row in start_row..end_row {
        for column in start_column..end_column {
            let position = screen_position(column, row, camera);
            if scene.grid.is_wall(column, row) {
                draw_rectangle(position.x, position.y, TILE_SIZE, TILE_SIZE, wall_color);
                draw_rectangle_lines(position.x, position.y, TILE_SIZE, TILE_SIZE, 1.0, wall_edge);
            } else {
                draw_rectangle(position.x, position.y, TILE_SIZE, TILE_SIZE, floor_color);
            }
        }
    }
}

fn draw_items(scene: &Scene, screen_width: f32, screen_height: f32, theme: &Theme) {
    for item in &scene.items {
        let position = screen_position(item.cell.column(), item.cell.row(), scene.camera);
        if !on_screen(position, screen_width, screen_height) {
            continue;
        }
        draw_circle(
            position.x + TILE_SIZE / 2.0,
            position.y + TILE_SIZE / 2.0,
            TILE_SIZE / 2.0 - 8.0,
            to_macroquad_color(theme.color_for(item.sprite)),
        );
    }
}

fn draw_enemies(scene: &Scene, screen_width: f32, screen_height: f32, theme: &Theme) {
    let body_color = to_macroquad_color(theme.color_for(SpriteKey::Enemy));
    let bar_background = macroquad::color::Color::new(0.0, 0.0, 0.0, 1.0);
    let bar_fill = to_macroquad_color(Color::from_rgb_u8(0xff, 0x2d, 0x2d));

    for enemy in &scene.enemies {
        let position = screen_position(enemy.cell.column(), enemy.cell.row(), scene.camera);
        if !on_screen(position, screen_width, screen_height) {
            continue;
        }

        draw_rectangle(
            position.x + 4.0,
            position.y + 4.0,
            TILE_SIZE - 8.0,
            TILE_SIZE - 8.0,
            body_color,
        );

        let fraction = if enemy.max_health == 0 {
            0.0
        } else {
            enemy.health as f32 / enemy.max_health as f32
        };
        draw_rectangle(position.x, position.y - 6.0, TILE_SIZE, 4.0, bar_background);
        draw_rectangle(
            position.x,
            position.y - 6.0,
            TILE_SIZE * fraction,
            4.0,
            bar_fill,
        );
    }
}

fn draw_player(scene: &Scene, theme: &Theme) {
    let position = screen_position(
        scene.player_cell.column(),
        scene.player_cell.row(),
        scene.camera,
    );
    draw_circle(
        position.x + TILE_SIZE / 2.0,
        position.y + TILE_SIZE / 2.0,
        TILE_SIZE / 2.0 - 4.0,
        to_macroquad_color(theme.color_for(SpriteKey::Player)),
    );
}

fn draw_bar(x: f32, y: f32, width: f32, height: f32, current: u32, max: u32, fill: Color) {
    let fraction = if max == 0 {
        0.0
    } else {
        (current as f32 / max as f32).clamp(0.0, 1.0)
    };
    draw_rectangle(
        x,
        y,
        width,
        height,
        macroquad::color::Color::new(0.25, 0.25, 0.25, 1.0),
    );
    draw_rectangle(x, y, width * fraction, height, to_macroquad_color(fill));
    draw_rectangle_lines(
        x,
        y,
        width,
        height,
        1.0,
        macroquad::color::Color::new(1.0, 1.0, 1.0, 1.0),
    );
}

fn draw_hud(scene: &Scene, screen_height: f32) {
    let hud = scene.hud;
    let panel = macroquad::color::Color::new(0.0, 0.0, 0.0, 0.7);
    let white = macroquad::color::Color::new(1.0, 1.0, 1.0, 1.0);

    draw_rectangle(10.0, 10.0, 300.0, 120.0, panel);

    draw_text(&format!("LEVEL: {}", hud.level), 20.0, 32.0, 18.0, white);
    draw_text(
        &format!("ENEMIES: {}", hud.enemy_count),
        20.0,
        52.0,
        18.0,
        white,
    );

    draw_text("HEALTH:", 20.0, 76.0, 16.0, white);
    draw_bar(
        100.0,
        64.0,
        195.0,
        14.0,
        hud.health,
        hud.max_health,
        Color::from_rgb_u8(0xd5, 0x2b, 0x2b),
    );

    draw_text("HUNGER:", 20.0, 100.0, 16.0, white);
    draw_bar(
        100.0,
        88.0,
        195.0,
        14.0,
        hud.hunger,
        hud.max_hunger,
        Color::from_rgb_u8(0xef, 0x8e, 0x1b),
    );

    draw_text(
        &format!("ATK: {} | DEF: {}", hud.attack, hud.defense),
        20.0,
        122.0,
        14.0,
        white,
    );

    draw_text(
        "WASD/Arrows: move | Find the stairs to descend!",
        10.0,
        screen_height - 10.0,
        14.0,
        macroquad::color::Color::new(1.0, 1.0, 1.0, 0.6),
    );
}

fn draw_overlay(cadence: &CadenceCounter, screen_width: f32) {
    let panel = macroquad::color::Color::new(0.0, 0.0, 0.0, 0.6);
    draw_rectangle(screen_width - 120.0, 10.0, 110.0, 50.0, panel);

    draw_text(
        &format!("FPS: {}", cadence.frames_per_second),
        screen_width - 110.0,
        30.0,
        16.0,
        macroquad::color::Color::new(1.0, 1.0, 0.0, 1.0),
    );
    draw_text(
        &format!("TPS: {}", cadence.ticks_per_second),
        screen_width - 110.0,
        50.0,
        16.0,
        macroquad::color::Color::new(0.0, 1.0, 1.0, 1.0),
    );
}

fn draw_centered(text: &str, y: f32, font_size: u16, color: macroquad::color::Color, width: f32) {
    let dimensions = measure_text(text, None, font_size, 1.0);
    draw_text(
        text,
        width / 2.0 - dimensions.width / 2.0,
        y,
        f32::from(font_size),
        color,
    );
}

fn draw_game_over(scene: &Scene, screen_width: f32, screen_height: f32) {
    let red = macroquad::color::Color::new(0.85, 0.1, 0.1, 1.0);
    let white = macroquad::color::Color::new(1.0, 1.0, 1.0, 1.0);

    draw_centered("GAME OVER", screen_height / 2.0 - 50.0, 48, red, screen_width);
    draw_centered(
        &format!("You reached level {}", scene.hud.level),
        screen_height / 2.0,
        20,
        white,
        screen_width,
    );
    draw_centered(
        "Press R to restart",
        screen_height / 2.0 + 50.0,
        20,
        white,
        screen_width,
    );
}

fn draw_victory(scene: &Scene, screen_width: f32, screen_height: f32) {
    let gold = macroquad::color::Color::new(1.0, 0.85, 0.0, 1.0);
    let white = macroquad::color::Color::new(1.0, 1.0, 1.0, 1.0);

    draw_centered("VICTORY!", screen_height / 2.0 - 50.0, 48, gold, screen_width);
    draw_centered(
        &format!("Completed level {}", scene.hud.level),
        screen_height / 2.0,
        20,
        white,
        screen_width,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_counter_rolls_up_once_per_second() {
        let start = Instant::now();
        let mut cadence = CadenceCounter::new(start);

        for _ in 0..59 {
            cadence.record(0, start + Duration::from_millis(500));
        }
        assert_eq!(cadence.frames_per_second, 0, "window has not closed yet");

        cadence.record(1, start + Duration::from_secs(1));
        assert_eq!(cadence.frames_per_second, 60);
        assert_eq!(cadence.ticks_per_second, 1);
    }

    #[test]
    fn screen_positions_follow_the_camera() {
        let position = screen_position(5, 3, Vec2::new(2.0, 1.0));
        assert_eq!(position, Vec2::new(3.0 * TILE_SIZE, 2.0 * TILE_SIZE));
    }

    #[test]
    fn offscreen_cells_are_culled() {
        assert!(on_screen(Vec2::new(0.0, 0.0), 640.0, 360.0));
        assert!(!on_screen(Vec2::new(-TILE_SIZE - 1.0, 0.0), 640.0, 360.0));
        assert!(!on_screen(Vec2::new(0.0, 400.0), 640.0, 360.0));
    }
}
