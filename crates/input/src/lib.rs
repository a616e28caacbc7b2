//! Terminal input (engine-facing).
//!
//! Maps `crossterm` key events to [`crate::types::GameCommand`] through
//! configurable bindings, and tracks held keys for the move repeat delay and
//! the soft-drop hold, including on terminals without key-release events.

pub mod handler;
pub mod map;

pub use polytris_types as types;

pub use handler::{HeldUpdate, InputHandler};
pub use map::{key_name, parse_key_name, should_quit, KeyBindings};
