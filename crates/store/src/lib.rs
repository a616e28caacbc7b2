//! File-backed collaborators of the game core.
//!
//! - [`save_store`]: one JSON file per saved game, latest save per player
//! - [`leaderboard`]: ranking table in a single self-healing JSON file
//! - [`config`]: TOML configuration with defaults
//! - [`writer`]: copy-then-write background saves on a tokio runtime
//!
//! All fallible operations return [`StoreError`]; callers at the session
//! boundary log and carry on.

pub mod config;
pub mod error;
pub mod leaderboard;
pub mod save_store;
pub mod writer;

pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use leaderboard::LeaderboardStore;
pub use save_store::{SaveFile, SaveStore, SaveSummary};
pub use writer::{BackgroundSaver, SaveOutcome};
