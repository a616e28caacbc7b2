//! Shared types module - plain data structures and rule constants
//!
//! Everything here is pure data usable from the engine, the stores, the input
//! mapping and the terminal view alike.
//!
//! # Field Dimensions
//!
//! The playfield is variable in size. The default is the classic 10x20 field.
//! Coordinates are `(x, y)` with `x` growing to the right and `y` growing down;
//! `y` may be negative while a piece is still above the visible field.
//!
//! # Rule Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Session loop step (~60 steps per second) |
//! | `BASE_SPEED_MS` | 500 | Gravity interval at level 1 |
//! | `SPEED_STEP_MS` | 50 | Interval reduction per level |
//! | `MIN_SPEED_MS` | 50 | Fastest gravity interval |
//! | `LINES_PER_LEVEL` | 5 | Cleared lines needed per level |
//! | `LEVEL_UP_BONUS` | 500 | One-time bonus per level gained |
//!
//! # Examples
//!
//! ```
//! use polytris_types::{GameCommand, GameSettings, PieceKind};
//!
//! assert_eq!(PieceKind::from_str("f5"), Some(PieceKind::F5));
//! assert_eq!(PieceKind::T.native_size(), 4);
//! assert_eq!(GameCommand::from_str("hard_drop"), Some(GameCommand::HardDrop));
//!
//! let settings = GameSettings::new(10, 20, 5);
//! assert_eq!(settings.field_size(), "10x20");
//! ```

use serde::{Deserialize, Serialize};

/// Smallest supported piece size (tetromino)
pub const MIN_PIECE_SIZE: u8 = 4;

/// Largest supported piece size (heptomino)
pub const MAX_PIECE_SIZE: u8 = 7;

/// Default field width in cells
pub const DEFAULT_FIELD_WIDTH: usize = 10;

/// Default field height in cells
pub const DEFAULT_FIELD_HEIGHT: usize = 20;

/// Widest accepted field
pub const MAX_FIELD_WIDTH: usize = 40;

/// Tallest accepted field
pub const MAX_FIELD_HEIGHT: usize = 60;

/// Session loop step in milliseconds (16ms ≈ 60 steps per second)
pub const TICK_MS: u32 = 16;

/// Gravity interval at level 1
pub const BASE_SPEED_MS: u32 = 500;

/// Gravity interval reduction per level
pub const SPEED_STEP_MS: u32 = 50;

/// Fastest gravity interval
pub const MIN_SPEED_MS: u32 = 50;

/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 5;

/// Bonus points per level gained
pub const LEVEL_UP_BONUS: u32 = 500;

/// Points per row awarded by the session for a hard drop
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// Points per row awarded by the session for a soft drop
pub const SOFT_DROP_POINTS_PER_ROW: u32 = 1;

/// Minimum interval between two accepted horizontal moves
pub const DEFAULT_MOVE_REPEAT_MS: u32 = 200;

/// Entries kept per leaderboard partition
pub const LEADERBOARD_SIZE: usize = 10;

/// Name used when the player leaves the name blank
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Line clear scoring table
///
/// Base points for clearing N rows at once, multiplied by the current level.
/// Any clear of four or more rows scores at the top tier.
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Every piece kind in the catalog
///
/// Tetrominoes keep their classic single-letter names. Larger pieces carry
/// their native size as a suffix (`F5`, `I6`, `H7`, ...). Variant names double
/// as the stable ids written into save files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
    F5,
    I5,
    L5,
    N5,
    P5,
    T5,
    U5,
    V5,
    W5,
    X5,
    Y5,
    Z5,
    I6,
    L6,
    J6,
    O6,
    T6,
    Y6,
    S6,
    U6,
    I7,
    L7,
    J7,
    T7,
    U7,
    H7,
    P7,
    S7,
}

impl PieceKind {
    /// All kinds in catalog order (grouped by native size)
    pub const ALL: [PieceKind; 35] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::F5,
        PieceKind::I5,
        PieceKind::L5,
        PieceKind::N5,
        PieceKind::P5,
        PieceKind::T5,
        PieceKind::U5,
        PieceKind::V5,
        PieceKind::W5,
        PieceKind::X5,
        PieceKind::Y5,
        PieceKind::Z5,
        PieceKind::I6,
        PieceKind::L6,
        PieceKind::J6,
        PieceKind::O6,
        PieceKind::T6,
        PieceKind::Y6,
        PieceKind::S6,
        PieceKind::U6,
        PieceKind::I7,
        PieceKind::L7,
        PieceKind::J7,
        PieceKind::T7,
        PieceKind::U7,
        PieceKind::H7,
        PieceKind::P7,
        PieceKind::S7,
    ];

    /// Edge length of this kind's occupancy matrix (also its cell count)
    pub fn native_size(&self) -> u8 {
        use PieceKind::*;
        match self {
            I | O | T | S | Z | J | L => 4,
            F5 | I5 | L5 | N5 | P5 | T5 | U5 | V5 | W5 | X5 | Y5 | Z5 => 5,
            I6 | L6 | J6 | O6 | T6 | Y6 | S6 | U6 => 6,
            I7 | L7 | J7 | T7 | U7 | H7 | P7 | S7 => 7,
        }
    }

    /// Parse piece kind from its id (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use polytris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("H7"), Some(PieceKind::H7));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
    }

    /// Stable id of the kind
    pub fn as_str(&self) -> &'static str {
        use PieceKind::*;
        match self {
            I => "I",
            O => "O",
            T => "T",
            S => "S",
            Z => "Z",
            J => "J",
            L => "L",
            F5 => "F5",
            I5 => "I5",
            L5 => "L5",
            N5 => "N5",
            P5 => "P5",
            T5 => "T5",
            U5 => "U5",
            V5 => "V5",
            W5 => "W5",
            X5 => "X5",
            Y5 => "Y5",
            Z5 => "Z5",
            I6 => "I6",
            L6 => "L6",
            J6 => "J6",
            O6 => "O6",
            T6 => "T6",
            Y6 => "Y6",
            S6 => "S6",
            U6 => "U6",
            I7 => "I7",
            L7 => "L7",
            J7 => "J7",
            T7 => "T7",
            U7 => "U7",
            H7 => "H7",
            P7 => "P7",
            S7 => "S7",
        }
    }
}

/// A cell on the playfield
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell occupied, drawn in that kind's color
pub type Cell = Option<PieceKind>;

/// Logical commands produced by the input mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameCommand {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Rotate piece 90° clockwise
    Rotate,
    /// Start (or continue) pulling the piece down
    SoftDrop,
    /// Drop piece to its resting row and lock it
    HardDrop,
    /// Toggle pause
    Pause,
    /// Save the running game
    SaveGame,
    /// Discard the running game and start over
    NewGame,
    /// Leave the game
    Menu,
}

impl GameCommand {
    pub const ALL: [GameCommand; 9] = [
        GameCommand::MoveLeft,
        GameCommand::MoveRight,
        GameCommand::Rotate,
        GameCommand::SoftDrop,
        GameCommand::HardDrop,
        GameCommand::Pause,
        GameCommand::SaveGame,
        GameCommand::NewGame,
        GameCommand::Menu,
    ];

    /// Parse a command from its configuration name
    ///
    /// # Examples
    ///
    /// ```
    /// use polytris_types::GameCommand;
    ///
    /// assert_eq!(GameCommand::from_str("move_left"), Some(GameCommand::MoveLeft));
    /// assert_eq!(GameCommand::from_str("menu"), Some(GameCommand::Menu));
    /// assert_eq!(GameCommand::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "move_left" => Some(GameCommand::MoveLeft),
            "move_right" => Some(GameCommand::MoveRight),
            "rotate" => Some(GameCommand::Rotate),
            "soft_drop" => Some(GameCommand::SoftDrop),
            "hard_drop" => Some(GameCommand::HardDrop),
            "pause" => Some(GameCommand::Pause),
            "save_game" => Some(GameCommand::SaveGame),
            "new_game" => Some(GameCommand::NewGame),
            "menu" => Some(GameCommand::Menu),
            _ => None,
        }
    }

    /// Configuration name of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            GameCommand::MoveLeft => "move_left",
            GameCommand::MoveRight => "move_right",
            GameCommand::Rotate => "rotate",
            GameCommand::SoftDrop => "soft_drop",
            GameCommand::HardDrop => "hard_drop",
            GameCommand::Pause => "pause",
            GameCommand::SaveGame => "save_game",
            GameCommand::NewGame => "new_game",
            GameCommand::Menu => "menu",
        }
    }
}

/// Observable state of the playfield engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Falling,
    Paused,
    GameOver,
}

/// Field dimensions and piece size of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameSettings {
    pub width: usize,
    pub height: usize,
    pub piece_size: u8,
}

impl GameSettings {
    /// Build settings, clamping every value into its supported range.
    ///
    /// The field is never narrower or shorter than the largest available piece.
    pub fn new(width: usize, height: usize, piece_size: u8) -> Self {
        let piece_size = piece_size.clamp(MIN_PIECE_SIZE, MAX_PIECE_SIZE);
        let min_edge = piece_size as usize;
        Self {
            width: width.clamp(min_edge, MAX_FIELD_WIDTH),
            height: height.clamp(min_edge, MAX_FIELD_HEIGHT),
            piece_size,
        }
    }

    /// Whether `new` would keep these values unchanged
    pub fn is_in_range(&self) -> bool {
        *self == Self::new(self.width, self.height, self.piece_size)
    }

    /// Field size string used to key leaderboards ("10x20")
    pub fn field_size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT, MIN_PIECE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_constants_match_classic_table() {
        assert_eq!(LINE_SCORES, [0, 40, 100, 300, 1200]);
        assert_eq!(BASE_SPEED_MS, 500);
        assert_eq!(MIN_SPEED_MS, 50);
        assert_eq!(LINES_PER_LEVEL, 5);
        assert_eq!(LEADERBOARD_SIZE, 10);
    }

    #[test]
    fn piece_ids_roundtrip_and_are_unique() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_str(kind.as_str()), Some(kind));
        }
        let mut ids: Vec<_> = PieceKind::ALL.iter().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PieceKind::ALL.len());
    }

    #[test]
    fn native_sizes_cover_four_to_seven() {
        for size in MIN_PIECE_SIZE..=MAX_PIECE_SIZE {
            assert!(PieceKind::ALL.iter().any(|k| k.native_size() == size));
        }
    }

    #[test]
    fn settings_are_clamped() {
        let s = GameSettings::new(2, 500, 9);
        assert_eq!(s.piece_size, MAX_PIECE_SIZE);
        assert_eq!(s.width, MAX_PIECE_SIZE as usize);
        assert_eq!(s.height, MAX_FIELD_HEIGHT);
        assert!(!GameSettings { width: 2, height: 20, piece_size: 4 }.is_in_range());
        assert!(GameSettings::default().is_in_range());
    }

    #[test]
    fn commands_roundtrip() {
        for cmd in GameCommand::ALL {
            assert_eq!(GameCommand::from_str(cmd.as_str()), Some(cmd));
        }
    }
}
