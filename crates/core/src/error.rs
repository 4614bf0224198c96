//! Errors raised when a board is built from untrusted data.
//!
//! Engine operations themselves are total; these only come from
//! converting dynamic input (protocol payloads, test fixtures) into a
//! [`Board`](crate::Board).

use thiserror::Error;

use crate::types::{Tile, BOARD_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board must have {expected} rows, got {rows}", expected = BOARD_SIZE)]
    WrongRowCount { rows: usize },

    #[error("row {row} must have {expected} cells, got {cols}", expected = BOARD_SIZE)]
    WrongRowLength { row: usize, cols: usize },

    /// A cell held a value that is neither 0 nor a power of two in `2..=MAX_TILE`.
    #[error("invalid tile {value} at ({row}, {col})")]
    InvalidTile { row: usize, col: usize, value: Tile },
}
