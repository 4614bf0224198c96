//! Rules module - the stateless grid engine
//!
//! Pure functions over [`Board`] values: spawning, moving, and terminal
//! detection. Nothing here holds state between calls and no input board is
//! ever mutated, so any caller (UI, test harness, advisor simulation) can
//! treat these as a function library and call them from any thread.

use arrayvec::ArrayVec;
use rand::Rng;

use crate::board::{Board, Coord};
use crate::line::slide_line;
use crate::types::{
    Direction, Tile, BOARD_SIZE, CELL_COUNT, SPAWN_FOUR_PROBABILITY, TILE_FOUR, TILE_TWO,
};

/// Outcome of a move attempt.
///
/// Built fresh on every call. When `moved` is false, `board` equals the
/// input and `score_delta` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    pub board: Board,
    /// Sum of tile values created by merges in this move
    pub score_delta: u32,
    /// Whether any cell changed position or value
    pub moved: bool,
    /// Number of merges performed
    pub merges: u8,
}

/// A tile placed by a spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spawn {
    pub coord: Coord,
    pub value: Tile,
}

/// A 4x4 board of zeros.
pub fn empty_board() -> Board {
    Board::new()
}

/// Coordinates holding zero, in row-major order.
pub fn empty_cells(board: &Board) -> ArrayVec<Coord, CELL_COUNT> {
    board.empty_cells()
}

/// Draw a spawn value: 4 with probability 0.1, otherwise 2.
pub fn random_tile_value<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_bool(SPAWN_FOUR_PROBABILITY) {
        TILE_FOUR
    } else {
        TILE_TWO
    }
}

/// Place a tile on a uniformly chosen empty cell.
///
/// Returns `None` when the board is full.
pub fn try_spawn_tile<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<(Board, Spawn)> {
    let empty = board.empty_cells();
    if empty.is_empty() {
        return None;
    }

    let coord = empty[rng.gen_range(0..empty.len())];
    let value = random_tile_value(rng);

    let mut next = *board;
    next.set(coord.row, coord.col, value);
    Some((next, Spawn { coord, value }))
}

/// Place a tile on a uniformly chosen empty cell.
///
/// A full board is returned unchanged; callers that need to tell the two
/// cases apart should use [`try_spawn_tile`] or check [`Board::is_full`].
pub fn spawn_tile<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Board {
    match try_spawn_tile(board, rng) {
        Some((next, _)) => next,
        None => *board,
    }
}

/// Slide and merge every line toward `direction`.
pub fn apply_move(board: &Board, direction: Direction) -> MoveResult {
    let mut next = *board;
    let mut score_delta = 0u32;
    let mut merges = 0u8;
    let mut moved = false;

    for index in 0..BOARD_SIZE {
        let before = board.line(direction, index);
        let outcome = slide_line(before);
        if outcome.changed_from(&before) {
            moved = true;
            next.write_line(direction, index, outcome.line);
        }
        score_delta = score_delta.saturating_add(outcome.score);
        merges += outcome.merges;
    }

    debug_assert!(moved || score_delta == 0);
    next.debug_validate();

    MoveResult {
        board: next,
        score_delta,
        moved,
        merges,
    }
}

/// Whether a move in `direction` would change the board.
pub fn can_move(board: &Board, direction: Direction) -> bool {
    (0..BOARD_SIZE).any(|index| {
        let before = board.line(direction, index);
        slide_line(before).changed_from(&before)
    })
}

/// Directions that would change the board, in [`Direction::ALL`] order.
pub fn legal_moves(board: &Board) -> ArrayVec<Direction, 4> {
    Direction::ALL
        .into_iter()
        .filter(|&dir| can_move(board, dir))
        .collect()
}

/// True iff the board is full and no two orthogonal neighbors are equal.
pub fn is_terminal(board: &Board) -> bool {
    if !board.is_full() {
        return false;
    }
    !board.has_adjacent_pair()
}

impl Board {
    /// See [`apply_move`].
    pub fn apply_move(&self, direction: Direction) -> MoveResult {
        apply_move(self, direction)
    }

    /// See [`spawn_tile`].
    pub fn spawn_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        spawn_tile(self, rng)
    }

    /// See [`is_terminal`].
    pub fn is_terminal(&self) -> bool {
        is_terminal(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_move_left_single_row() {
        let board = Board::from_array([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
        let result = apply_move(&board, Direction::Left);
        assert_eq!(result.board.rows()[0], [4, 4, 0, 0]);
        assert_eq!(result.score_delta, 8);
        assert!(result.moved);
        assert_eq!(result.merges, 2);
    }

    #[test]
    fn test_move_right_mirrors_left() {
        let board = Board::from_array([[2, 2, 2, 0], [0; 4], [0; 4], [0; 4]]);
        let result = apply_move(&board, Direction::Right);
        assert_eq!(result.board.rows()[0], [0, 0, 2, 4]);
        assert_eq!(result.score_delta, 4);
    }

    #[test]
    fn test_move_up_and_down_use_columns() {
        let board = Board::from_array([[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [0, 0, 0, 0]]);

        let up = apply_move(&board, Direction::Up);
        assert_eq!(up.board.line(Direction::Up, 0), [4, 4, 0, 0]);
        assert_eq!(up.score_delta, 4);

        let down = apply_move(&board, Direction::Down);
        // Travel order for DOWN reads bottom to top: [0, 4, 2, 2] -> [4, 4, 0, 0].
        assert_eq!(
            down.board,
            Board::from_array([[0, 0, 0, 0], [0, 0, 0, 0], [4, 0, 0, 0], [4, 0, 0, 0]])
        );
        assert_eq!(down.score_delta, 4);
    }

    #[test]
    fn test_no_op_move_returns_input() {
        let board = Board::from_array([[2, 4, 0, 0], [8, 0, 0, 0], [0; 4], [0; 4]]);
        let result = apply_move(&board, Direction::Left);
        assert!(!result.moved);
        assert_eq!(result.board, board);
        assert_eq!(result.score_delta, 0);
        assert!(!can_move(&board, Direction::Left));
        assert!(can_move(&board, Direction::Right));
    }

    #[test]
    fn test_spawn_on_full_board_is_noop() {
        let board = Board::from_array([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(spawn_tile(&board, &mut rng), board);
        assert!(try_spawn_tile(&board, &mut rng).is_none());
    }

    #[test]
    fn test_spawn_fills_exactly_one_empty_cell() {
        let mut rng = StdRng::seed_from_u64(42);
        let board = empty_board();
        let (next, spawn) = try_spawn_tile(&board, &mut rng).unwrap();
        assert_eq!(next.count_empty(), 15);
        assert_eq!(next.at(spawn.coord), spawn.value);
        assert!(spawn.value == 2 || spawn.value == 4);
        // Input untouched.
        assert!(board.is_empty());
    }

    #[test]
    fn test_legal_moves_on_terminal_board() {
        let board = Board::from_array([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(is_terminal(&board));
        assert!(legal_moves(&board).is_empty());
    }

    #[test]
    fn test_terminal_requires_full_board() {
        let mut board = Board::from_array([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        board.set(3, 3, 0);
        assert!(!is_terminal(&board));
    }
}
