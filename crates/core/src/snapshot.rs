//! Snapshot module - the save record and the restore policy
//!
//! A [`SaveRecord`] carries everything needed to rebuild a session: field
//! settings, player and session identity, the full grid, counters and the
//! active piece's kind, anchor and occupancy matrix. Generation history is
//! not kept; a restored game starts a fresh shuffle.
//!
//! Restoring always yields a paused game that is not over.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::game_state::GameState;
use crate::pieces::{self, Piece, ShapeMatrix};
use crate::rng::{EntropyShuffle, ShuffleSource};
use crate::types::{Cell, GameSettings, PieceKind, MAX_PIECE_SIZE, MIN_PIECE_SIZE};

/// Active piece as stored in a save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRecord {
    pub kind: PieceKind,
    pub x: i32,
    pub y: i32,
    /// Occupancy matrix, 0/1 values, `n`x`n`
    pub shape: Vec<Vec<u8>>,
}

impl From<Piece> for ActiveRecord {
    fn from(piece: Piece) -> Self {
        Self {
            kind: piece.kind,
            x: piece.x,
            y: piece.y,
            shape: piece.shape.to_grid(),
        }
    }
}

/// Serializable copy of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub width: usize,
    pub height: usize,
    pub piece_size: u8,
    pub player_name: String,
    /// Rows top to bottom; each cell is a kind id or null
    pub grid: Vec<Vec<Cell>>,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub active: Option<ActiveRecord>,
    pub session_id: String,
}

impl SaveRecord {
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            width: self.width,
            height: self.height,
            piece_size: self.piece_size,
        }
    }

    /// `"WxH"` label of the field
    pub fn field_size(&self) -> String {
        self.settings().field_size()
    }
}

/// A save record that cannot be turned back into a game
#[derive(Debug, Clone, Display, Error)]
#[display("Invalid save record: {} at {}:{}", message, file, line)]
pub struct RestoreError {
    pub message: String,
    pub line: u32,
    pub file: &'static str,
}

impl RestoreError {
    /// Creates a restore error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl GameState {
    /// Capture the session as a save record
    pub fn snapshot(&self) -> SaveRecord {
        SaveRecord {
            width: self.width(),
            height: self.height(),
            piece_size: self.piece_size(),
            player_name: self.player_name().to_string(),
            grid: self.board().to_rows(),
            score: self.score(),
            level: self.level(),
            lines_cleared: self.lines(),
            active: self.active().map(ActiveRecord::from),
            session_id: self.session_id().to_string(),
        }
    }

    /// Rebuild a paused game from a save record
    pub fn restore(record: &SaveRecord) -> Result<Self, RestoreError> {
        Self::restore_with_shuffle(record, Box::new(EntropyShuffle::new()))
    }

    /// Rebuild a paused game from a save record, drawing future pieces from `source`
    pub fn restore_with_shuffle(
        record: &SaveRecord,
        source: Box<dyn ShuffleSource>,
    ) -> Result<Self, RestoreError> {
        let settings = record.settings();
        if !(MIN_PIECE_SIZE..=MAX_PIECE_SIZE).contains(&settings.piece_size) {
            return Err(RestoreError::new(format!(
                "piece size {} out of range",
                settings.piece_size
            )));
        }
        if !settings.is_in_range() {
            return Err(RestoreError::new(format!(
                "field {} out of range for piece size {}",
                settings.field_size(),
                settings.piece_size
            )));
        }
        if record.grid.len() != record.height {
            return Err(RestoreError::new(format!(
                "grid has {} rows, expected {}",
                record.grid.len(),
                record.height
            )));
        }
        let board = Board::from_rows(&record.grid, record.width).ok_or_else(|| {
            RestoreError::new(format!("grid rows must be {} cells wide", record.width))
        })?;

        let active = record
            .active
            .as_ref()
            .map(|active| restore_piece(active, settings.width, settings.height))
            .transpose()?;

        let mut state = GameState::with_shuffle(settings, &record.player_name, source)
            .with_session_id(record.session_id.clone());
        state.restore_parts(
            board,
            active,
            record.score,
            record.level,
            record.lines_cleared,
        );
        Ok(state)
    }
}

fn restore_piece(
    record: &ActiveRecord,
    width: usize,
    height: usize,
) -> Result<Piece, RestoreError> {
    let shape = ShapeMatrix::from_grid(&record.shape).ok_or_else(|| {
        RestoreError::new(format!("shape of {} is not a square matrix", record.kind.as_str()))
    })?;
    if shape.size() != record.kind.native_size() {
        return Err(RestoreError::new(format!(
            "shape of {} is {}x{}, expected {}x{}",
            record.kind.as_str(),
            shape.size(),
            shape.size(),
            record.kind.native_size(),
            record.kind.native_size()
        )));
    }
    let edge = i32::from(shape.size());
    let (width, height) = (width as i32, height as i32);
    if !(-edge..=width).contains(&record.x) || !(-edge..=height).contains(&record.y) {
        return Err(RestoreError::new(format!(
            "active piece at ({}, {}) is outside the field",
            record.x, record.y
        )));
    }
    Ok(Piece {
        kind: record.kind,
        shape,
        color: pieces::color(record.kind),
        x: record.x,
        y: record.y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimpleRng;

    fn sample_game() -> GameState {
        let mut state = GameState::with_shuffle(
            GameSettings::new(8, 16, 5),
            "ada",
            Box::new(SimpleRng::new(11)),
        );
        state.hard_drop();
        state.try_move(1, 0);
        state.try_rotate();
        state.add_bonus_points(77);
        state
    }

    #[test]
    fn test_snapshot_captures_state() {
        let state = sample_game();
        let record = state.snapshot();
        assert_eq!((record.width, record.height, record.piece_size), (8, 16, 5));
        assert_eq!(record.player_name, "ada");
        assert_eq!(record.grid.len(), 16);
        assert_eq!(record.score, state.score());
        assert_eq!(record.session_id, state.session_id());
        let active = record.active.unwrap();
        assert_eq!(active.kind, state.active().unwrap().kind);
    }

    #[test]
    fn test_restore_round_trip_is_paused() {
        let state = sample_game();
        let record = state.snapshot();
        let restored = GameState::restore(&record).unwrap();

        assert!(restored.paused());
        assert!(!restored.game_over());
        assert_eq!(restored.board(), state.board());
        assert_eq!(restored.score(), state.score());
        assert_eq!(restored.level(), state.level());
        assert_eq!(restored.lines(), state.lines());
        assert_eq!(restored.active(), state.active());
        assert_eq!(restored.session_id(), state.session_id());
        assert_eq!(restored.snapshot(), record);
    }

    #[test]
    fn test_restore_survives_json() {
        let record = sample_game().snapshot();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: SaveRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_restore_recomputes_speed() {
        let mut record = sample_game().snapshot();
        record.level = 3;
        let restored = GameState::restore(&record).unwrap();
        assert_eq!(restored.speed_ms(), 400);
    }

    #[test]
    fn test_restore_rejects_bad_grid() {
        let mut record = sample_game().snapshot();
        record.grid.pop();
        assert!(GameState::restore(&record).is_err());

        let mut record = sample_game().snapshot();
        record.grid[3].push(None);
        assert!(GameState::restore(&record).is_err());
    }

    #[test]
    fn test_restore_rejects_wrong_shape_size() {
        let mut record = sample_game().snapshot();
        if let Some(active) = record.active.as_mut() {
            active.kind = PieceKind::I7;
        }
        let err = GameState::restore(&record).unwrap_err();
        assert!(err.to_string().contains("I7"));
    }

    #[test]
    fn test_restore_without_active_piece() {
        let mut record = sample_game().snapshot();
        record.active = None;
        let restored = GameState::restore(&record).unwrap();
        assert!(restored.active().is_none());
        assert!(restored.ghost().is_none());
    }
}
