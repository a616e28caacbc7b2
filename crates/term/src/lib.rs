//! Terminal rendering for polytris.
//!
//! Rendering goes through a plain framebuffer instead of a widget toolkit:
//! [`GameView`] paints a [`crate::core::GameState`] into a [`FrameBuffer`]
//! (pure, testable), and [`Screen`] flushes frames to the terminal with a
//! per-row diff.
//!
//! Board cells are two characters wide so squares look square.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use polytris_core as core;
pub use polytris_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, GameView, Hud, Viewport};
pub use renderer::{changed_runs, encode_frame, Screen};
