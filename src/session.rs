//! Session orchestrator: drives one game from commands and clock ticks.
//!
//! The session owns the [`GameState`] and the stores around it. The binary
//! feeds it commands from the keyboard and calls [`Session::tick`] once per
//! frame; everything is synchronous except background saves, whose outcomes
//! are picked up on later ticks.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::core::scoring::drop_bonus;
use crate::core::{GameState, NewScore, RestoreError, SaveRecord};
use crate::store::{BackgroundSaver, LeaderboardStore, SaveStore};
use crate::types::GameCommand;

/// How long a notification stays on screen.
pub const NOTIFICATION_MS: u64 = 2_000;

/// Where saves go.
#[derive(Debug)]
pub enum Saver {
    /// Write on the session thread.
    Direct(SaveStore),
    /// Hand a copy of the record to a background writer.
    Background(BackgroundSaver),
}

/// Whether the loop should keep running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Something the presentation layer may react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LineClear(usize),
    LevelUp,
    GameOver,
    Saved(String),
    SaveFailed,
}

#[derive(Debug)]
pub struct Session {
    game: GameState,
    leaders: LeaderboardStore,
    saver: Saver,
    /// Rows fallen during the current soft-drop hold.
    soft_drop_rows: u32,
    last_drop_ms: u64,
    score_recorded: bool,
    game_over_handled: bool,
    loaded_game: bool,
    /// Leaderboard entries waiting for their background save to succeed.
    pending_scores: VecDeque<Option<NewScore>>,
    notification: Option<(String, u64)>,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Session for a fresh game.
    pub fn new(game: GameState, leaders: LeaderboardStore, saver: Saver) -> Self {
        Self {
            game,
            leaders,
            saver,
            soft_drop_rows: 0,
            last_drop_ms: 0,
            score_recorded: false,
            game_over_handled: false,
            loaded_game: false,
            pending_scores: VecDeque::new(),
            notification: None,
            events: Vec::new(),
        }
    }

    /// Session resuming a saved game. The game starts paused.
    pub fn load(
        record: &SaveRecord,
        leaders: LeaderboardStore,
        saver: Saver,
    ) -> Result<Self, RestoreError> {
        let game = GameState::restore(record)?;
        info!(player = %game.player_name(), score = game.score(), "Loaded game");
        let mut session = Self::new(game, leaders, saver);
        session.loaded_game = true;
        Ok(session)
    }

    /// Start the gravity clock.
    pub fn start(&mut self, now_ms: u64) {
        self.last_drop_ms = now_ms;
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn is_loaded_game(&self) -> bool {
        self.loaded_game
    }

    pub fn score_recorded(&self) -> bool {
        self.score_recorded
    }

    pub fn soft_drop_rows(&self) -> u32 {
        self.soft_drop_rows
    }

    pub fn leaders(&self) -> &LeaderboardStore {
        &self.leaders
    }

    /// Current notification text, if it has not expired.
    pub fn notification(&self, now_ms: u64) -> Option<&str> {
        match &self.notification {
            Some((text, until)) if now_ms < *until => Some(text),
            _ => None,
        }
    }

    fn notify(&mut self, text: &str, now_ms: u64) {
        self.notification = Some((text.to_string(), now_ms + NOTIFICATION_MS));
    }

    /// Apply one command.
    ///
    /// Gameplay commands only act on a running game; pause, new game and menu
    /// always do.
    pub fn apply(&mut self, command: GameCommand, now_ms: u64) -> Flow {
        let playable = !self.game.paused() && !self.game.game_over();
        match command {
            GameCommand::MoveLeft if playable => {
                self.game.try_move(-1, 0);
            }
            GameCommand::MoveRight if playable => {
                self.game.try_move(1, 0);
            }
            GameCommand::Rotate if playable => {
                self.game.try_rotate();
            }
            GameCommand::SoftDrop if playable => {
                self.soft_drop_step();
            }
            GameCommand::HardDrop if playable => {
                let rows = self.game.hard_drop();
                self.game.add_bonus_points(drop_bonus(rows, true));
            }
            GameCommand::SaveGame if playable => self.save(now_ms),
            GameCommand::Pause => {
                let paused = self.game.toggle_pause();
                debug!(paused, "Pause toggled");
            }
            GameCommand::NewGame => self.new_game(now_ms),
            GameCommand::Menu => {
                if self.game.score() > 0 {
                    self.record_score();
                }
                return Flow::Exit;
            }
            _ => {}
        }
        Flow::Continue
    }

    fn soft_drop_step(&mut self) {
        if self.game.try_move(0, 1) {
            self.soft_drop_rows += 1;
        }
    }

    /// The soft-drop key went up: award the rows fallen while it was held.
    pub fn end_soft_drop(&mut self) {
        let rows = std::mem::take(&mut self.soft_drop_rows);
        if rows > 0 {
            self.game.add_bonus_points(drop_bonus(rows, false));
        }
    }

    fn new_game(&mut self, now_ms: u64) {
        self.game.reset();
        self.game.renew_session_id();
        self.soft_drop_rows = 0;
        self.score_recorded = false;
        self.game_over_handled = false;
        self.loaded_game = false;
        self.last_drop_ms = now_ms;
        info!(session = %self.game.session_id(), "New game");
    }

    /// Score this save would put on the leaderboard once it succeeds.
    fn score_for_save(&self) -> Option<NewScore> {
        (!self.loaded_game && !self.score_recorded).then(|| NewScore::from_game(&self.game))
    }

    fn save(&mut self, now_ms: u64) {
        let record = self.game.snapshot();
        let score = self.score_for_save();
        let written = match &self.saver {
            Saver::Direct(store) => Some(store.save(&record)),
            Saver::Background(saver) => {
                if !saver.submit(record) {
                    warn!("Background saver is not running");
                    self.on_save_failed(now_ms);
                    return;
                }
                None
            }
        };
        match written {
            Some(Ok(file)) => self.on_saved(file, score, now_ms),
            Some(Err(e)) => {
                warn!(error = %e, "Save failed");
                self.on_save_failed(now_ms);
            }
            None => self.pending_scores.push_back(score),
        }
    }

    fn on_saved(&mut self, file: String, score: Option<NewScore>, now_ms: u64) {
        if let Some(score) = score {
            if !self.score_recorded {
                self.add_score(score);
            }
        }
        self.notify("Game saved", now_ms);
        self.events.push(SessionEvent::Saved(file));
    }

    fn on_save_failed(&mut self, now_ms: u64) {
        self.notify("Save failed", now_ms);
        self.events.push(SessionEvent::SaveFailed);
    }

    fn drain_background_saves(&mut self, now_ms: u64) {
        let Saver::Background(saver) = &mut self.saver else {
            return;
        };
        let mut outcomes = Vec::new();
        while let Some(outcome) = saver.try_outcome() {
            outcomes.push(outcome);
        }
        for outcome in outcomes {
            let score = self.pending_scores.pop_front().flatten();
            match outcome.result {
                Ok(file) => self.on_saved(file, score, now_ms),
                Err(_) => self.on_save_failed(now_ms),
            }
        }
    }

    fn record_score(&mut self) {
        if self.score_recorded {
            return;
        }
        self.add_score(NewScore::from_game(&self.game));
    }

    fn add_score(&mut self, score: NewScore) {
        if let Err(e) = self.leaders.add_score(score) {
            warn!(error = %e, "Could not record leaderboard entry");
        }
        self.score_recorded = true;
    }

    /// Advance one frame.
    ///
    /// While the soft-drop key is held the piece moves down one row per tick.
    /// Gravity drops it at most once per tick, when more than the level's
    /// interval has passed since the last drop.
    pub fn tick(&mut self, now_ms: u64, soft_drop_held: bool) -> Vec<SessionEvent> {
        self.drain_background_saves(now_ms);

        if self.game.game_over() {
            if !self.game_over_handled {
                self.game_over_handled = true;
                info!(
                    player = %self.game.player_name(),
                    score = self.game.score(),
                    level = self.game.level(),
                    lines = self.game.lines(),
                    "Game over"
                );
                self.record_score();
                self.events.push(SessionEvent::GameOver);
            }
        } else if !self.game.paused() {
            // Saves taken between lock and spawn carry no active piece.
            if self.game.active().is_none() {
                self.game.spawn_piece();
            }
            if soft_drop_held {
                self.soft_drop_step();
            }
            if now_ms.saturating_sub(self.last_drop_ms) > u64::from(self.game.speed_ms()) {
                self.game.drop_piece();
                self.last_drop_ms = now_ms;
            }
        }

        let cleared = self.game.take_last_clear();
        if cleared > 0 {
            self.events.push(SessionEvent::LineClear(cleared));
        }
        if self.game.take_level_up() {
            self.events.push(SessionEvent::LevelUp);
        }

        std::mem::take(&mut self.events)
    }

    /// Stop the background writer and settle its remaining saves.
    pub fn close(&mut self) {
        if let Saver::Background(saver) = &mut self.saver {
            saver.shutdown();
        }
        self.drain_background_saves(0);
        self.events.clear();
    }
}
