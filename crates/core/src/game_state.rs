//! Game state module - the playfield engine
//!
//! Ties together the board, the piece generator and the scoring rules. Owns
//! the single active piece and every rule that moves, rotates, locks or scores
//! it. All operations are synchronous; gravity timing and drop bonuses belong
//! to the session that drives the engine.
//!
//! Lifecycle: `Spawning -> Falling -> (Locking -> LineClear -> Spawning) | GameOver`,
//! with `Falling <-> Paused` toggled from outside. Game over is terminal until
//! [`GameState::reset`].

use uuid::Uuid;

use crate::board::Board;
use crate::pieces::Piece;
use crate::rng::{EntropyShuffle, PieceGenerator, ShuffleSource};
use crate::scoring::{level_for_lines, level_up_bonus, line_clear_points, speed_for_level};
use crate::types::{GamePhase, GameSettings, BASE_SPEED_MS, DEFAULT_PLAYER_NAME};

/// Horizontal offsets tried, in order, when a rotation collides in place
pub const WALL_KICKS: [i32; 4] = [1, -1, 2, -2];

/// Complete game state
#[derive(Debug)]
pub struct GameState {
    settings: GameSettings,
    player_name: String,
    session_id: String,
    board: Board,
    active: Option<Piece>,
    generator: PieceGenerator,
    score: u32,
    level: u32,
    lines: u32,
    speed_ms: u32,
    paused: bool,
    game_over: bool,
    /// Raised by a clear that gained a level, consumed by the session.
    level_up: bool,
    /// Rows removed by the most recent lock, consumed by the session.
    last_clear: usize,
}

impl GameState {
    /// Start a new game with an OS-seeded shuffle
    pub fn new(settings: GameSettings, player_name: &str) -> Self {
        Self::with_shuffle(settings, player_name, Box::new(EntropyShuffle::new()))
    }

    /// Start a new game drawing permutations from `source`
    pub fn with_shuffle(
        settings: GameSettings,
        player_name: &str,
        source: Box<dyn ShuffleSource>,
    ) -> Self {
        let settings = GameSettings::new(settings.width, settings.height, settings.piece_size);
        let mut state = Self {
            settings,
            player_name: normalize_name(player_name),
            session_id: new_session_id(),
            board: Board::new(settings.width, settings.height),
            active: None,
            generator: PieceGenerator::new(settings.piece_size, source),
            score: 0,
            level: 1,
            lines: 0,
            speed_ms: BASE_SPEED_MS,
            paused: false,
            game_over: false,
            level_up: false,
            last_clear: 0,
        };
        state.spawn_piece();
        state
    }

    /// Replace the generated session id (continuing a saved session)
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn width(&self) -> usize {
        self.settings.width
    }

    pub fn height(&self) -> usize {
        self.settings.height
    }

    pub fn piece_size(&self) -> u8 {
        self.settings.piece_size
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<Piece> {
        self.active
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Current gravity interval in milliseconds
    pub fn speed_ms(&self) -> u32 {
        self.speed_ms
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn phase(&self) -> GamePhase {
        if self.game_over {
            GamePhase::GameOver
        } else if self.paused {
            GamePhase::Paused
        } else {
            GamePhase::Falling
        }
    }

    fn playable(&self) -> bool {
        !self.game_over && !self.paused
    }

    /// Toggle pause; ignored once the game is over
    pub fn toggle_pause(&mut self) -> bool {
        if !self.game_over {
            self.paused = !self.paused;
        }
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if !self.game_over {
            self.paused = paused;
        }
    }

    /// Consume the level-up signal
    pub fn take_level_up(&mut self) -> bool {
        std::mem::take(&mut self.level_up)
    }

    /// Consume the row count of the last clear
    pub fn take_last_clear(&mut self) -> usize {
        std::mem::take(&mut self.last_clear)
    }

    /// Add points from outside the engine (drop bonuses)
    pub fn add_bonus_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Piece the next spawn will produce
    pub fn next_preview(&self) -> Option<Piece> {
        self.generator.preview()
    }

    /// Start a new session identity, e.g. for a fresh game on the same state
    pub fn renew_session_id(&mut self) {
        self.session_id = new_session_id();
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn set_active(&mut self, piece: Option<Piece>) {
        self.active = piece;
    }

    /// Draw the next piece, center it above the field and check for game over
    pub fn spawn_piece(&mut self) {
        let mut piece = Piece::new(self.generator.next());
        piece.x = (self.settings.width as i32 - piece.width()) / 2;
        piece.y = -piece.width();
        self.active = Some(piece);
        self.check_game_over();
    }

    /// Whether `piece` shifted by `(dx, dy)` leaves the field or hits a filled cell.
    ///
    /// Cells above the field only collide with the side walls.
    pub fn collides(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        let width = self.settings.width as i32;
        let height = self.settings.height as i32;
        piece.cells().iter().any(|&(x, y)| {
            let (x, y) = (x + dx, y + dy);
            x < 0 || x >= width || y >= height || (y >= 0 && self.board.is_occupied(x, y))
        })
    }

    /// Translate the active piece. Returns whether it moved.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if !self.playable() {
            return false;
        }
        let Some(piece) = self.active else {
            return false;
        };
        if self.collides(&piece, dx, dy) {
            return false;
        }
        self.active = Some(Piece {
            x: piece.x + dx,
            y: piece.y + dy,
            ..piece
        });
        true
    }

    /// Rotate the active piece clockwise, kicking sideways if needed.
    ///
    /// All-or-nothing: when every kick collides the piece is left untouched.
    pub fn try_rotate(&mut self) -> bool {
        if !self.playable() {
            return false;
        }
        let Some(piece) = self.active else {
            return false;
        };
        let rotated = Piece {
            shape: piece.shape.rotated_cw(),
            ..piece
        };

        let offset = std::iter::once(0)
            .chain(WALL_KICKS)
            .find(|&dx| !self.collides(&rotated, dx, 0));

        match offset {
            Some(dx) => {
                self.active = Some(Piece {
                    x: rotated.x + dx,
                    ..rotated
                });
                true
            }
            None => false,
        }
    }

    /// One gravity step: move down or lock. Returns whether the piece moved.
    pub fn drop_piece(&mut self) -> bool {
        if !self.playable() || self.active.is_none() {
            return false;
        }
        if self.try_move(0, 1) {
            return true;
        }
        self.lock_piece();
        false
    }

    /// Drop straight down and lock. Returns the number of rows fallen.
    pub fn hard_drop(&mut self) -> u32 {
        if !self.playable() || self.active.is_none() {
            return 0;
        }
        let mut rows = 0;
        while self.try_move(0, 1) {
            rows += 1;
        }
        self.lock_piece();
        rows
    }

    /// Write the active piece into the board, clear lines and spawn the next one.
    ///
    /// Cells still above the field are discarded.
    pub fn lock_piece(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };
        for (x, y) in piece.cells() {
            if y >= 0 {
                self.board.set(x, y, Some(piece.kind));
            }
        }
        self.clear_lines();
        self.spawn_piece();
        self.check_game_over();
    }

    fn clear_lines(&mut self) -> usize {
        let rows = self.board.clear_full_rows();
        self.last_clear = rows;
        if rows == 0 {
            return 0;
        }

        self.score = self
            .score
            .saturating_add(line_clear_points(rows, self.level));
        self.lines = self.lines.saturating_add(rows as u32);

        let old_level = self.level;
        self.level = level_for_lines(self.lines);
        if self.level > old_level {
            self.score = self
                .score
                .saturating_add(level_up_bonus(self.level - old_level));
            self.level_up = true;
        }
        self.speed_ms = speed_for_level(self.level);
        rows
    }

    /// Flag game over when the active piece overlaps the visible field or
    /// the top row already holds a block.
    fn check_game_over(&mut self) {
        let Some(piece) = self.active else {
            return;
        };
        let width = self.settings.width as i32;
        let blocked = piece.cells().iter().any(|&(x, y)| {
            y >= 0 && (x < 0 || x >= width || self.board.is_occupied(x, y))
        });
        if blocked || self.board.top_row_occupied() {
            self.game_over = true;
        }
    }

    /// Resting position of the active piece if dropped now
    pub fn ghost(&self) -> Option<Piece> {
        let mut ghost = self.active?;
        while !self.collides(&ghost, 0, 1) {
            ghost.y += 1;
        }
        Some(ghost)
    }

    /// Clear the field and counters and start over with a fresh queue.
    ///
    /// Level restarts at 0 and returns to the normal curve with the first clear.
    pub fn reset(&mut self) {
        self.board.clear();
        self.score = 0;
        self.level = 0;
        self.lines = 0;
        self.speed_ms = BASE_SPEED_MS;
        self.paused = false;
        self.game_over = false;
        self.level_up = false;
        self.last_clear = 0;
        self.generator.reset();
        self.spawn_piece();
    }

    pub(crate) fn restore_parts(
        &mut self,
        board: Board,
        active: Option<Piece>,
        score: u32,
        level: u32,
        lines: u32,
    ) {
        self.board = board;
        self.active = active;
        self.score = score;
        self.level = level;
        self.lines = lines;
        self.speed_ms = speed_for_level(level);
        self.paused = true;
        self.game_over = false;
        self.level_up = false;
        self.last_clear = 0;
        self.generator.reset();
    }
}

fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
