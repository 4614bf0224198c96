//! Hint module - suggest the next move
//!
//! [`GreedyAdvisor`] does a one-ply lookahead: it applies every legal move to
//! a copy of the board and ranks the results by free space, merge score,
//! corner placement of the largest tile, and row/column monotonicity. Ties
//! favor DOWN, then LEFT, RIGHT, UP, which keeps big tiles in the bottom row.

use thiserror::Error;

use crate::core::{apply_move, can_move, legal_moves, Board, GameSnapshot, MoveResult};
use crate::types::{Direction, BOARD_SIZE};

/// Reason attached to [`fallback_hint`].
pub const FALLBACK_REASON: &str = "Advisor offline, try keeping tiles down.";

/// Tie-break order for equally ranked moves.
const PREFERENCE: [Direction; 4] = [
    Direction::Down,
    Direction::Left,
    Direction::Right,
    Direction::Up,
];

const EMPTY_WEIGHT: i64 = 1000;
const MERGE_WEIGHT: i64 = 2;
const CORNER_WEIGHT: i64 = 500;
const MONOTONIC_WEIGHT: i64 = 100;

/// A suggested direction with a short rationale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub direction: Direction,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisorError {
    #[error("no move can change the board")]
    NoLegalMove,
    #[error("advisor unavailable: {0}")]
    Unavailable(String),
    #[error("advisor suggested an invalid move: {0}")]
    InvalidSuggestion(String),
}

/// Anything that can suggest a move for a snapshot.
pub trait Advisor {
    fn suggest(&self, snapshot: &GameSnapshot) -> Result<Hint, AdvisorError>;
}

/// The hint shown when an advisor fails.
pub fn fallback_hint() -> Hint {
    Hint {
        direction: Direction::Down,
        reason: FALLBACK_REASON.to_string(),
    }
}

/// Ask `advisor`, falling back to [`fallback_hint`] on any error.
///
/// A suggestion that would not change the board counts as an error.
pub fn hint_or_fallback(advisor: &dyn Advisor, snapshot: &GameSnapshot) -> Hint {
    match advisor.suggest(snapshot).and_then(|hint| checked(hint, snapshot)) {
        Ok(hint) => hint,
        Err(e) => {
            log::warn!("advisor failed, using fallback hint: {}", e);
            fallback_hint()
        }
    }
}

fn checked(hint: Hint, snapshot: &GameSnapshot) -> Result<Hint, AdvisorError> {
    if can_move(&snapshot.board(), hint.direction) {
        Ok(hint)
    } else {
        Err(AdvisorError::InvalidSuggestion(hint.direction.to_string()))
    }
}

/// One-ply lookahead advisor. Stateless and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAdvisor;

impl GreedyAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// Pick the best legal move for `board`.
    pub fn best_move(&self, board: &Board) -> Option<(Direction, MoveResult)> {
        let legal = legal_moves(board);
        let mut best: Option<(Direction, MoveResult, i64)> = None;

        for dir in PREFERENCE {
            if !legal.contains(&dir) {
                continue;
            }
            let result = apply_move(board, dir);
            let value = evaluate(&result);
            match best {
                Some((_, _, v)) if v >= value => {}
                _ => best = Some((dir, result, value)),
            }
        }

        best.map(|(dir, result, _)| (dir, result))
    }
}

impl Advisor for GreedyAdvisor {
    fn suggest(&self, snapshot: &GameSnapshot) -> Result<Hint, AdvisorError> {
        let board = snapshot.board();
        let (direction, result) = self.best_move(&board).ok_or(AdvisorError::NoLegalMove)?;
        Ok(Hint {
            direction,
            reason: explain(&result),
        })
    }
}

fn evaluate(result: &MoveResult) -> i64 {
    let board = &result.board;
    board.count_empty() as i64 * EMPTY_WEIGHT
        + result.score_delta as i64 * MERGE_WEIGHT
        + if max_in_corner(board) { CORNER_WEIGHT } else { 0 }
        + monotonic_lines(board) as i64 * MONOTONIC_WEIGHT
}

fn explain(result: &MoveResult) -> String {
    let cornered = max_in_corner(&result.board);
    match (result.merges, cornered) {
        (0, true) => "Keeps your biggest tile in the corner".to_string(),
        (0, false) => format!("Frees space, {} empty cells", result.board.count_empty()),
        (_, true) => format!("Merge for +{}, max tile stays cornered", result.score_delta),
        (_, false) => format!("Merge for +{}", result.score_delta),
    }
}

fn max_in_corner(board: &Board) -> bool {
    let max = board.max_tile();
    if max == 0 {
        return false;
    }
    let last = BOARD_SIZE - 1;
    [(0, 0), (0, last), (last, 0), (last, last)]
        .iter()
        .any(|&(r, c)| board.get(r, c) == Some(max))
}

/// Rows plus columns whose tiles never increase or never decrease.
fn monotonic_lines(board: &Board) -> usize {
    let rows = board.rows().iter().filter(|line| is_monotonic(line)).count();
    let cols = (0..BOARD_SIZE)
        .map(|c| board.line(Direction::Up, c))
        .filter(|line| is_monotonic(line))
        .count();
    rows + cols
}

fn is_monotonic(line: &[u32; BOARD_SIZE]) -> bool {
    line.windows(2).all(|w| w[0] <= w[1]) || line.windows(2).all(|w| w[0] >= w[1])
}
