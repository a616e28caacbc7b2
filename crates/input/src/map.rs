//! Key mapping from terminal events to game commands.
//!
//! Bindings come from key names in the configuration ("left", "space", "p",
//! "f5", ...). A name that does not parse keeps the default key for that
//! command.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::types::GameCommand;

/// Default key name of a command.
pub fn default_key_name(command: GameCommand) -> &'static str {
    match command {
        GameCommand::MoveLeft => "left",
        GameCommand::MoveRight => "right",
        GameCommand::Rotate => "up",
        GameCommand::SoftDrop => "down",
        GameCommand::HardDrop => "space",
        GameCommand::Pause => "p",
        GameCommand::NewGame => "n",
        GameCommand::SaveGame => "s",
        GameCommand::Menu => "escape",
    }
}

/// Parse a configuration key name.
pub fn parse_key_name(name: &str) -> Option<KeyCode> {
    let name = name.trim().to_lowercase();
    let code = match name.as_str() {
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => KeyCode::Char(' '),
        "enter" | "return" => KeyCode::Enter,
        "escape" | "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        _ => {
            if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                return (1..=12).contains(&n).then_some(KeyCode::F(n));
            }
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(code)
}

/// Display name of a key, the inverse of [`parse_key_name`].
pub fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        KeyCode::Char(c) => c.to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Key to command table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    by_key: HashMap<KeyCode, GameCommand>,
    by_command: HashMap<GameCommand, KeyCode>,
}

impl KeyBindings {
    /// Build bindings from a key name per command.
    pub fn from_names<'a>(name_for: impl Fn(GameCommand) -> &'a str) -> Self {
        let mut bindings = Self {
            by_key: HashMap::new(),
            by_command: HashMap::new(),
        };
        for command in GameCommand::ALL {
            let name = name_for(command);
            let code = match parse_key_name(name) {
                Some(code) => code,
                None => {
                    let fallback = default_key_name(command);
                    warn!(command = command.as_str(), key = name, fallback, "Unknown key name");
                    match parse_key_name(fallback) {
                        Some(code) => code,
                        None => continue,
                    }
                }
            };
            bindings.bind(command, code);
        }
        bindings
    }

    fn bind(&mut self, command: GameCommand, code: KeyCode) {
        let code = normalize(code);
        if let Some(other) = self.by_key.get(&code) {
            warn!(
                key = %key_name(code),
                command = command.as_str(),
                kept = other.as_str(),
                "Key already bound, ignoring"
            );
            return;
        }
        self.by_key.insert(code, command);
        self.by_command.insert(command, code);
    }

    /// Command bound to a key event.
    pub fn command_for(&self, key: KeyEvent) -> Option<GameCommand> {
        self.by_key.get(&normalize(key.code)).copied()
    }

    /// Key bound to a command.
    pub fn key_for(&self, command: GameCommand) -> Option<KeyCode> {
        self.by_command.get(&command).copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_names(default_key_name)
    }
}

/// Check if key should quit the game regardless of bindings.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
