//! Leaderboard store - the ranking table in a single JSON file.
//!
//! An empty or unparsable file is treated as "no leaderboard yet" and removed
//! when the store is opened.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use polytris_core::{LeaderEntry, LeaderTable, NewScore};
use tracing::{debug, info, instrument, warn};

use crate::error::StoreResult;

/// File-backed [`LeaderTable`].
#[derive(Debug, Clone)]
pub struct LeaderboardStore {
    path: PathBuf,
}

impl LeaderboardStore {
    /// Opens the store at `path`, discarding a corrupt file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let store = Self { path };
        store.discard_if_corrupt();
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn discard_if_corrupt(&self) {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return,
        };
        let corrupt = content.trim().is_empty()
            || serde_json::from_str::<LeaderTable>(&content).is_err();
        if !corrupt {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => warn!("Discarded corrupt leaderboard file"),
            Err(e) => warn!(error = %e, "Failed to discard corrupt leaderboard file"),
        }
    }

    /// Whole table; a missing or unreadable file reads as empty.
    pub fn load(&self) -> LeaderTable {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return LeaderTable::new(),
        };
        if content.trim().is_empty() {
            return LeaderTable::new();
        }
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(error = %e, "Leaderboard unreadable, treating as empty");
            LeaderTable::new()
        })
    }

    fn write(&self, table: &LeaderTable) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(table)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Ranks a result now and writes the table back.
    pub fn add_score(&self, score: NewScore) -> StoreResult<()> {
        self.add_score_at(score, Utc::now())
    }

    /// Ranks a result recorded at `recorded_at` and writes the table back.
    #[instrument(skip(self, score), fields(player = %score.player_name, score = score.score))]
    pub fn add_score_at(&self, score: NewScore, recorded_at: DateTime<Utc>) -> StoreResult<()> {
        let mut table = self.load();
        table.add_score(score, recorded_at);
        self.write(&table)?;
        info!("Score recorded");
        Ok(())
    }

    /// Ranked entries for a piece size and `"WxH"` field.
    #[instrument(skip(self))]
    pub fn leaders(&self, piece_size: u8, field_size: &str) -> Vec<LeaderEntry> {
        let leaders = self.load().leaders(piece_size, field_size);
        debug!(count = leaders.len(), "Leaders read");
        leaders
    }
}
