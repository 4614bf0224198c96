//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the sliding-tile rule engine and the caller-side
//! session built on top of it. It has **zero dependencies** on UI,
//! networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games (for AI training and replays)
//! - **Stateless at the core**: [`rules`] functions take a board and return a new one
//! - **Portable**: Can run in any environment (terminal, GUI, headless)
//! - **Allocation-free on the move path**: boards are `Copy`, empty cells come back in an `ArrayVec`
//!
//! # Module Structure
//!
//! - [`board`]: 4x4 board, coordinates, and the direction-parameterized line view
//! - [`line`]: canonical slide/merge of one line toward index 0
//! - [`rules`]: empty board, empty cells, spawn, move, terminal detection
//! - [`rng`]: small seedable LCG used by game sessions
//! - [`game_state`]: session state machine, score, best score, episodes
//! - [`snapshot`]: plain-data copy of a session for renderers and adapters
//! - [`leaderboard`]: rank-ordered score history
//!
//! # Game Rules
//!
//! - **Spawn**: a 2 (90%) or a 4 (10%) on a uniformly chosen empty cell
//! - **Move**: every line slides toward the move direction; equal neighbors merge
//!   once per move, scanning from the leading edge
//! - **Score**: each merge adds the value of the new tile
//! - **Terminal**: no empty cell and no equal orthogonal neighbors
//!
//! # Example
//!
//! ```
//! use tui_2048_core::{apply_move, empty_board, is_terminal, spawn_tile, Board, SimpleRng};
//! use tui_2048_core::types::Direction;
//!
//! let board = Board::from_array([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
//! let result = apply_move(&board, Direction::Left);
//! assert_eq!(result.board.rows()[0], [4, 4, 0, 0]);
//! assert_eq!(result.score_delta, 8);
//! assert!(result.moved);
//!
//! let mut rng = SimpleRng::new(12345);
//! let next = spawn_tile(&result.board, &mut rng);
//! assert_eq!(next.count_empty(), result.board.count_empty() - 1);
//! assert!(!is_terminal(&next));
//! assert!(empty_board().is_empty());
//! ```
//!
//! Sessions wrap the same functions:
//!
//! ```
//! use tui_2048_core::GameState;
//! use tui_2048_core::types::GameAction;
//!
//! let mut game = GameState::new(12345);
//! game.start();
//! game.apply_action(GameAction::MoveLeft);
//! assert!(game.score() <= game.best_score());
//! ```

pub mod board;
pub mod error;
pub mod game_state;
pub mod leaderboard;
pub mod line;
pub mod rng;
pub mod rules;
pub mod snapshot;

pub use tui_2048_types as types;

// Re-export commonly used types for convenience
pub use board::{line_coords, Board, Coord, Line};
pub use error::BoardError;
pub use game_state::{GameState, MoveEvent, Phase};
pub use leaderboard::{Leaderboard, ScoreEntry, ANONYMOUS_PLAYER};
pub use line::{slide_line, SlideOutcome};
pub use rng::SimpleRng;
pub use rules::{
    apply_move, can_move, empty_board, empty_cells, is_terminal, legal_moves, random_tile_value,
    spawn_tile, try_spawn_tile, MoveResult, Spawn,
};
pub use snapshot::GameSnapshot;
