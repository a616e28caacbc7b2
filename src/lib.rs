//! Polytris (workspace facade crate).
//!
//! Re-exports the member crates under `crates/` and hosts the pieces that tie
//! them together: the [`session`] orchestrator and [`logging`] setup.

pub use polytris_core as core;
pub use polytris_input as input;
pub use polytris_store as store;
pub use polytris_term as term;
pub use polytris_types as types;

pub mod logging;
pub mod session;
