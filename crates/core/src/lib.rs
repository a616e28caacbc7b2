//! Core game logic - pure, deterministic when seeded, and testable
//!
//! No terminal, file or clock access lives here; the store and session layers
//! provide those.
//!
//! # Module Structure
//!
//! - [`pieces`]: catalog of shapes from tetrominoes to heptominoes
//! - [`rng`]: shuffle-queue piece generator with injectable randomness
//! - [`board`]: variable-size playfield grid and line clearing
//! - [`scoring`]: line clear points, leveling and gravity speed
//! - [`game_state`]: the playfield engine (movement, rotation, locking, game over)
//! - [`snapshot`]: save record and restore policy
//! - [`leaderboard`]: per-partition ranking with session deduplication
//!
//! # Example
//!
//! ```
//! use polytris_core::{GameState, SimpleRng};
//! use polytris_core::types::GameSettings;
//!
//! let mut game = GameState::with_shuffle(
//!     GameSettings::new(10, 20, 5),
//!     "ada",
//!     Box::new(SimpleRng::new(42)),
//! );
//!
//! game.try_move(-1, 0);
//! game.try_rotate();
//! let rows = game.hard_drop();
//! assert!(rows > 0);
//!
//! let record = game.snapshot();
//! let restored = GameState::restore(&record).unwrap();
//! assert!(restored.paused());
//! ```

pub mod board;
pub mod game_state;
pub mod leaderboard;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use polytris_types as types;

pub use board::Board;
pub use game_state::GameState;
pub use leaderboard::{LeaderEntry, LeaderTable, NewScore};
pub use pieces::{Piece, ShapeMatrix};
pub use rng::{EntropyShuffle, PieceGenerator, ShuffleSource, SimpleRng};
pub use snapshot::{ActiveRecord, RestoreError, SaveRecord};
