//! Held-key tracking for terminal environments.
//!
//! Left/right moves repeat while the key is held, never faster than the move
//! repeat delay; terminal auto-repeat events arriving sooner are dropped.
//! Soft drop is a hold: the session drops one row per tick while it is held and
//! scores the rows when it ends.
//!
//! Terminals without key-release events are handled with a timeout: a hold ends
//! when no press or repeat for that key arrived within the timeout.

use crate::types::{GameCommand, DEFAULT_MOVE_REPEAT_MS};

// Long enough to bridge the typical first auto-repeat gap of a terminal.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 550;

/// What held keys produced during [`InputHandler::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldUpdate {
    /// Repeated horizontal move that is due now.
    pub repeat: Option<GameCommand>,
    /// The soft-drop hold ended by timeout.
    pub soft_drop_released: bool,
}

/// Tracks held keys and the move repeat delay.
#[derive(Debug, Clone)]
pub struct InputHandler {
    move_repeat_ms: u64,
    key_release_timeout_ms: u64,
    horizontal: Option<GameCommand>,
    last_horizontal_key_ms: u64,
    last_move_ms: Option<u64>,
    soft_drop_held: bool,
    last_soft_drop_key_ms: u64,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::with_repeat_ms(DEFAULT_MOVE_REPEAT_MS)
    }

    pub fn with_repeat_ms(move_repeat_ms: u32) -> Self {
        Self {
            move_repeat_ms: u64::from(move_repeat_ms),
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
            horizontal: None,
            last_horizontal_key_ms: 0,
            last_move_ms: None,
            soft_drop_held: false,
            last_soft_drop_key_ms: 0,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn move_repeat_ms(&self) -> u64 {
        self.move_repeat_ms
    }

    pub fn soft_drop_held(&self) -> bool {
        self.soft_drop_held
    }

    fn move_due(&self, now_ms: u64) -> bool {
        match self.last_move_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.move_repeat_ms,
            None => true,
        }
    }

    /// A key press or repeat. Returns the command to apply now, if any.
    pub fn press(&mut self, command: GameCommand, now_ms: u64) -> Option<GameCommand> {
        match command {
            GameCommand::MoveLeft | GameCommand::MoveRight => {
                self.horizontal = Some(command);
                self.last_horizontal_key_ms = now_ms;
                if !self.move_due(now_ms) {
                    return None;
                }
                self.last_move_ms = Some(now_ms);
                Some(command)
            }
            GameCommand::SoftDrop => {
                self.last_soft_drop_key_ms = now_ms;
                if self.soft_drop_held {
                    return None;
                }
                self.soft_drop_held = true;
                Some(command)
            }
            other => Some(other),
        }
    }

    /// A key release. Returns true when this ended a soft-drop hold.
    pub fn release(&mut self, command: GameCommand) -> bool {
        match command {
            GameCommand::MoveLeft | GameCommand::MoveRight => {
                if self.horizontal == Some(command) {
                    self.horizontal = None;
                }
                false
            }
            GameCommand::SoftDrop => std::mem::take(&mut self.soft_drop_held),
            _ => false,
        }
    }

    /// Advance held keys to `now_ms`.
    pub fn update(&mut self, now_ms: u64) -> HeldUpdate {
        let mut out = HeldUpdate::default();

        if self.horizontal.is_some()
            && now_ms.saturating_sub(self.last_horizontal_key_ms) > self.key_release_timeout_ms
        {
            self.horizontal = None;
        }
        if self.soft_drop_held
            && now_ms.saturating_sub(self.last_soft_drop_key_ms) > self.key_release_timeout_ms
        {
            self.soft_drop_held = false;
            out.soft_drop_released = true;
        }

        if let Some(command) = self.horizontal {
            if self.move_due(now_ms) {
                self.last_move_ms = Some(now_ms);
                out.repeat = Some(command);
            }
        }
        out
    }

    /// Forget all held keys.
    pub fn reset(&mut self) {
        self.horizontal = None;
        self.last_move_ms = None;
        self.soft_drop_held = false;
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
