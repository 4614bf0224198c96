//! Move advisory layer built on top of the core rule engine.
//!
//! An advisor looks at a read-only [`GameSnapshot`](tui_2048_core::GameSnapshot)
//! and suggests a direction with a short reason. Advice is only ever a hint:
//! nothing here can mutate a game session, and a failing advisor degrades to a
//! fixed fallback hint instead of reaching the move pipeline.

pub mod hint;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

pub use hint::{
    fallback_hint, hint_or_fallback, Advisor, AdvisorError, GreedyAdvisor, Hint, FALLBACK_REASON,
};
