//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`]. One key
//! press is one attempted move; terminal auto-repeat is left to the caller
//! to filter (see [`is_press`]).

pub mod map;

pub use tui_2048_types as types;

pub use map::{handle_key_event, is_hint_request, is_press, should_quit};
