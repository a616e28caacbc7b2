//! Save store - one JSON file per saved game.
//!
//! Files are named `<player>_<YYYYmmdd_HHMMSS>.save` and hold a [`SaveFile`].
//! Saving for a player first removes that player's earlier saves, so each
//! player has at most one save on disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use polytris_core::SaveRecord;
use polytris_types::DEFAULT_PLAYER_NAME;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{StoreError, StoreResult};

/// File extension of save files.
pub const SAVE_EXTENSION: &str = "save";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// On-disk content of a save file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFile {
    pub saved_at: DateTime<Utc>,
    pub record: SaveRecord,
}

/// Listing entry for a save file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub file_name: String,
    pub player_name: String,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub saved_at: DateTime<Utc>,
    /// `"WxH"`
    pub field_size: String,
    pub piece_size: u8,
}

impl SaveSummary {
    fn new(file_name: String, file: &SaveFile) -> Self {
        Self {
            file_name,
            player_name: file.record.player_name.clone(),
            score: file.record.score,
            level: file.record.level,
            lines: file.record.lines_cleared,
            saved_at: file.saved_at,
            field_size: file.record.field_size(),
            piece_size: file.record.piece_size,
        }
    }
}

/// Directory of save files.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    /// Opens the store, creating the directory if needed.
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Save store ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves `record` now. Returns the new file name.
    pub fn save(&self, record: &SaveRecord) -> StoreResult<String> {
        self.save_at(record, Utc::now())
    }

    /// Saves `record` stamped with `saved_at`. Returns the new file name.
    #[instrument(skip(self, record), fields(player = %record.player_name, score = record.score))]
    pub fn save_at(&self, record: &SaveRecord, saved_at: DateTime<Utc>) -> StoreResult<String> {
        let player = sanitize_player_name(&record.player_name);
        self.remove_saves_of(&player);

        let file_name = format!(
            "{}_{}.{}",
            player,
            saved_at.format(TIMESTAMP_FORMAT),
            SAVE_EXTENSION
        );
        let file = SaveFile {
            saved_at,
            record: record.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let path = self.dir.join(&file_name);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        info!(file = %file_name, "Game saved");
        Ok(file_name)
    }

    fn remove_saves_of(&self, player: &str) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Cannot scan save directory");
                return;
            }
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if player_of_file(&name) != Some(player) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => debug!(file = %name, "Removed earlier save"),
                Err(e) => warn!(file = %name, error = %e, "Failed to remove earlier save"),
            }
        }
    }

    /// Lists readable saves, most recent first.
    ///
    /// Unreadable files are logged and skipped.
    #[instrument(skip(self))]
    pub fn list(&self) -> StoreResult<Vec<SaveSummary>> {
        let mut saves = Vec::new();
        for entry in fs::read_dir(&self.dir)?.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(&format!(".{SAVE_EXTENSION}")) {
                continue;
            }
            match read_save_file(&entry.path()) {
                Ok(file) => saves.push(SaveSummary::new(name, &file)),
                Err(e) => warn!(file = %name, error = %e, "Skipping unreadable save"),
            }
        }
        saves.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        debug!(count = saves.len(), "Listed saves");
        Ok(saves)
    }

    /// Loads a save by file name.
    #[instrument(skip(self))]
    pub fn load(&self, file_name: &str) -> StoreResult<SaveRecord> {
        let path = self.path_of(file_name)?;
        let file = read_save_file(&path)?;
        info!(player = %file.record.player_name, "Save loaded");
        Ok(file.record)
    }

    /// Deletes a save by file name.
    #[instrument(skip(self))]
    pub fn delete(&self, file_name: &str) -> StoreResult<()> {
        let path = self.path_of(file_name)?;
        fs::remove_file(path)?;
        info!("Save deleted");
        Ok(())
    }

    fn path_of(&self, file_name: &str) -> StoreResult<PathBuf> {
        let plain = !file_name.is_empty()
            && !file_name.contains(|c: char| c == '/' || c == '\\')
            && file_name != "."
            && file_name != "..";
        if !plain {
            return Err(StoreError::new(format!("invalid save file name: {file_name:?}")));
        }
        Ok(self.dir.join(file_name))
    }
}

fn read_save_file(path: &Path) -> StoreResult<SaveFile> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// File-system safe form of a player name.
pub fn sanitize_player_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        cleaned
    }
}

/// Player part of `<player>_<YYYYmmdd>_<HHMMSS>.save`, if `name` has that shape.
fn player_of_file(name: &str) -> Option<&str> {
    let stem = name.strip_suffix(SAVE_EXTENSION)?.strip_suffix('.')?;
    let (rest, time) = stem.rsplit_once('_')?;
    let (player, date) = rest.rsplit_once('_')?;
    let digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
    (digits(date, 8) && digits(time, 6)).then_some(player)
}
