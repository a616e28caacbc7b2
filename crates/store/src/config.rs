//! TOML configuration.
//!
//! A missing file is created with defaults. A file that fails to parse is
//! logged and replaced in memory by defaults; it is left untouched on disk.

use std::fs;
use std::path::{Path, PathBuf};

use polytris_types::{
    GameCommand, GameSettings, DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH, DEFAULT_MOVE_REPEAT_MS,
    DEFAULT_PLAYER_NAME, MIN_PIECE_SIZE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::StoreResult;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "polytris.toml";

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub controls: ControlsConfig,
    pub input: InputConfig,
    pub graphics: GraphicsConfig,
    pub sound: SoundConfig,
    pub storage: StorageConfig,
}

/// `[game]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field_width: usize,
    pub field_height: usize,
    pub piece_size: u8,
    pub player_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: DEFAULT_FIELD_WIDTH,
            field_height: DEFAULT_FIELD_HEIGHT,
            piece_size: MIN_PIECE_SIZE,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }
}

impl GameConfig {
    /// Field and piece size, clamped into range.
    pub fn settings(&self) -> GameSettings {
        let settings = GameSettings::new(self.field_width, self.field_height, self.piece_size);
        if (settings.width, settings.height, settings.piece_size)
            != (self.field_width, self.field_height, self.piece_size)
        {
            warn!(
                field_width = self.field_width,
                field_height = self.field_height,
                piece_size = self.piece_size,
                clamped = %settings.field_size(),
                clamped_piece_size = settings.piece_size,
                "Game settings out of range, clamped"
            );
        }
        settings
    }
}

/// `[controls]`: key names per command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub move_left: String,
    pub move_right: String,
    pub rotate: String,
    pub soft_drop: String,
    pub hard_drop: String,
    pub pause: String,
    pub new_game: String,
    pub save_game: String,
    pub menu: String,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_left: "left".to_string(),
            move_right: "right".to_string(),
            rotate: "up".to_string(),
            soft_drop: "down".to_string(),
            hard_drop: "space".to_string(),
            pause: "p".to_string(),
            new_game: "n".to_string(),
            save_game: "s".to_string(),
            menu: "escape".to_string(),
        }
    }
}

impl ControlsConfig {
    /// Key name bound to `command`.
    pub fn key_for(&self, command: GameCommand) -> &str {
        match command {
            GameCommand::MoveLeft => &self.move_left,
            GameCommand::MoveRight => &self.move_right,
            GameCommand::Rotate => &self.rotate,
            GameCommand::SoftDrop => &self.soft_drop,
            GameCommand::HardDrop => &self.hard_drop,
            GameCommand::Pause => &self.pause,
            GameCommand::NewGame => &self.new_game,
            GameCommand::SaveGame => &self.save_game,
            GameCommand::Menu => &self.menu,
        }
    }
}

/// `[input]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Minimum interval between repeated left/right moves.
    pub move_repeat_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            move_repeat_ms: DEFAULT_MOVE_REPEAT_MS,
        }
    }
}

/// `[graphics]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub show_ghost: bool,
    pub show_grid: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            show_ghost: true,
            show_grid: true,
        }
    }
}

/// `[sound]`: kept for config compatibility, the terminal build plays no audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enable_music: bool,
    pub enable_sound: bool,
    pub music_volume: f32,
    pub sound_volume: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enable_music: true,
            enable_sound: true,
            music_volume: 0.7,
            sound_volume: 1.0,
        }
    }
}

/// `[storage]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Write saves on a background task instead of the game loop.
    pub background_saves: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            background_saves: false,
        }
    }
}

impl StorageConfig {
    pub fn saves_dir(&self) -> PathBuf {
        self.data_dir.join("saves")
    }

    pub fn leaders_path(&self) -> PathBuf {
        self.data_dir.join("leaders.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("polytris.log")
    }
}

impl Config {
    /// Parses a configuration file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        debug!("Config parsed");
        Ok(config)
    }

    /// Writes the configuration as TOML.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Loads `path`, creating it with defaults when missing.
    ///
    /// Never fails: problems are logged and defaults are used.
    pub fn load_or_create(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            let config = Self::default();
            match config.save(path) {
                Ok(()) => info!(path = %path.display(), "Wrote default config"),
                Err(e) => warn!(path = %path.display(), error = %e, "Cannot write default config"),
            }
            return config;
        }
        match Self::from_file(path) {
            Ok(config) => {
                info!(path = %path.display(), "Config loaded");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config unreadable, using defaults");
                Self::default()
            }
        }
    }
}
