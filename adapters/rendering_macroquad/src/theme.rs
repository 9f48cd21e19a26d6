use std::{fs, io, path::Path};

use delve_rendering::{Color, SpriteKey};
use serde::Deserialize;
use thiserror::Error;

const SUPPORTED_THEME_VERSION: u32 = 1;

/// Failures raised while loading a theme file.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The theme file could not be read from disk.
    #[error("failed to read theme file: {0}")]
    Io(#[from] io::Error),
    /// The theme file is not valid TOML or misses required keys.
    #[error("failed to parse theme file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The theme file declares a version this adapter does not understand.
    #[error("unsupported theme version {found}, expected {SUPPORTED_THEME_VERSION}")]
    UnsupportedVersion {
        /// Version number declared by the file.
        found: u32,
    },
}

/// Color lookup table keyed by [`SpriteKey`].
///
/// This is the image-provider seam in primitive-shape form: visuals are
/// resolved by identifier, and a missing or unreadable theme simply leaves
/// the built-in palette in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    player: Color,
    wall: Color,
    floor: Color,
    enemy: Color,
    health_potion: Color,
    food: Color,
    weapon: Color,
    stairs: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            player: Color::from_rgb_u8(0x4c, 0xaf, 0x50),
            wall: Color::from_rgb_u8(0x46, 0x46, 0x46),
            floor: Color::from_rgb_u8(0x28, 0x28, 0x28),
            enemy: Color::from_rgb_u8(0xc6, 0x28, 0x28),
            health_potion: Color::from_rgb_u8(0xe9, 0x1e, 0x63),
            food: Color::from_rgb_u8(0xff, 0xc1, 0x07),
            weapon: Color::from_rgb_u8(0x00, 0xbc, 0xd4),
            stairs: Color::from_rgb_u8(0xf5, 0xf5, 0xf5),
        }
    }
}

impl Theme {
    /// Loads a theme from the provided TOML file.
    pub fn load(path: &Path) -> Result<Self, ThemeError> {
        let raw = fs::read_to_string(path)?;
        let manifest: ThemeManifest = toml::from_str(&raw)?;
        if manifest.version != SUPPORTED_THEME_VERSION {
            return Err(ThemeError::UnsupportedVersion {
                found: manifest.version,
            });
        }

        let defaults = Self::default();
        let colors = manifest.colors;
        Ok(Self {
            player: resolve(colors.player, defaults.player),
            wall: resolve(colors.wall, defaults.wall),
            floor: resolve(colors.floor, defaults.floor),
            enemy: resolve(colors.enemy, defaults.enemy),
            health_potion: resolve(colors.health_potion, defaults.health_potion),
            food: resolve(colors.food, defaults.food),
            weapon: resolve(colors.weapon, defaults.weapon),
            stairs: resolve(colors.stairs, defaults.stairs),
        })
    }

    /// Color registered for the provided visual identifier.
    #[must_use]
    pub const fn color_for(&self, key: SpriteKey) -> Color {
        match key {
            SpriteKey::Player => self.player,
            SpriteKey::Wall => self.wall,
            SpriteKey::Floor => self.floor,
            SpriteKey::Enemy => self.enemy,
            SpriteKey::HealthPotion => self.health_potion,
            SpriteKey::Food => self.food,
            SpriteKey::Weapon => self.weapon,
            SpriteKey::Stairs => self.stairs,
        }
    }
}

fn resolve(channels: Option<[u8; 3]>, fallback: Color) -> Color {
    channels.map_or(fallback, |[red, green, blue]| {
        Color::from_rgb_u8(red, green, blue)
    })
}

#[derive(Debug, Deserialize)]
struct ThemeManifest {
    version: u32,
    #[serde(default)]
    colors: ThemeColors,
}

#[derive(Debug, Default, Deserialize)]
struct ThemeColors {
    player: Option<[u8; 3]>,
    wall: Option<[u8; 3]>,
    floor: Option<[u8; 3]>,
    enemy: Option<[u8; 3]>,
    health_potion: Option<[u8; 3]>,
    food: Option<[u8; 3]>,
    weapon: Option<[u8; 3]>,
    stairs: Option<[u8; 3]>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_themes_fall_back_to_the_built_in_palette() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "version = 1\n\n[colors]\nplayer = [1, 2, 3]\nwall = [4, 5, 6]",
        )
        .expect("write theme");

        let theme = Theme::load(file.path()).expect("load theme");
        assert_eq!(
            theme.color_for(SpriteKey::Player),
            Color::from_rgb_u8(1, 2, 3),
        );
        assert_eq!(theme.color_for(SpriteKey::Wall), Color::from_rgb_u8(4, 5, 6));
        assert_eq!(
            theme.color_for(SpriteKey::Stairs),
            Theme::default().color_for(SpriteKey::Stairs),
        );
    }

    #[test]
    fn unsupported_versions_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "version = 9").expect("write theme");

        match Theme::load(file.path()) {
            Err(ThemeError::UnsupportedVersion { found }) => assert_eq!(found, 9),
            other => panic!("expected version rejection, got {other:?}"),
        }
    }

    #[test]
    fn missing_files_surface_io_errors() {
        let missing = Path::new("no-such-theme.toml");
        assert!(matches!(Theme::load(missing), Err(ThemeError::Io(_))));
    }
}
