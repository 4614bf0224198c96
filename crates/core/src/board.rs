//! Board module - the 4x4 tile grid
//!
//! The board is a fixed 4x4 matrix of tile values where `0` is an empty cell.
//! It is `Copy` (16 words), so every engine transition returns a fresh value and
//! callers can keep the previous board for undo, replay, or simulation.
//! Coordinates: (row, col) where row ranges 0..3 (top to bottom) and col
//! ranges 0..3 (left to right).

use std::fmt;

use arrayvec::ArrayVec;

use crate::error::BoardError;
use crate::types::{can_merge, is_valid_tile, Direction, Tile, BOARD_SIZE, CELL_COUNT};

/// One row or column, ordered from the edge tiles slide toward.
pub type Line = [Tile; BOARD_SIZE];

/// A cell position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The game board - 4 rows x 4 columns of tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [[Tile; BOARD_SIZE]; BOARD_SIZE],
}

/// Positions of line `index` for a slide in `direction`, leading edge first.
///
/// LEFT reads row `index` left to right, RIGHT reads it right to left, UP
/// reads column `index` top to bottom and DOWN bottom to top. Every
/// direction therefore reduces to the canonical "slide toward index 0" case.
pub fn line_coords(direction: Direction, index: usize) -> [Coord; BOARD_SIZE] {
    debug_assert!(index < BOARD_SIZE);
    let last = BOARD_SIZE - 1;
    std::array::from_fn(|i| match direction {
        Direction::Left => Coord::new(index, i),
        Direction::Right => Coord::new(index, last - i),
        Direction::Up => Coord::new(i, index),
        Direction::Down => Coord::new(last - i, index),
    })
}

impl Board {
    /// Create a new empty board
    pub const fn new() -> Self {
        Self {
            cells: [[0; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Wrap a fixed-size grid.
    ///
    /// Tiles are checked in debug builds only; use [`Board::from_rows`] for
    /// data that has not been validated.
    pub fn from_array(cells: [[Tile; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        let board = Self { cells };
        board.debug_validate();
        board
    }

    /// Build a board from dynamically sized rows, validating shape and tiles.
    pub fn from_rows<R: AsRef<[Tile]>>(rows: &[R]) -> Result<Self, BoardError> {
        if rows.len() != BOARD_SIZE {
            return Err(BoardError::WrongRowCount { rows: rows.len() });
        }

        let mut cells = [[0; BOARD_SIZE]; BOARD_SIZE];
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != BOARD_SIZE {
                return Err(BoardError::WrongRowLength {
                    row,
                    cols: values.len(),
                });
            }
            for (col, &value) in values.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
                cells[row][col] = value;
            }
        }
        Ok(Self { cells })
    }

    /// Get tile at (row, col). Returns None if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Set tile at (row, col). Returns false if out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: Tile) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    #[inline(always)]
    pub fn at(&self, coord: Coord) -> Tile {
        self.cells[coord.row][coord.col]
    }

    #[inline(always)]
    fn at_mut(&mut self, coord: Coord) -> &mut Tile {
        &mut self.cells[coord.row][coord.col]
    }

    /// Borrow the grid rows.
    pub fn rows(&self) -> &[[Tile; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Iterate all tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.cells.iter().flat_map(|row| row.iter().copied())
    }

    /// Empty cell positions in row-major order (stack-only, no allocation).
    pub fn empty_cells(&self) -> ArrayVec<Coord, CELL_COUNT> {
        let mut out = ArrayVec::new();
        for (row, values) in self.cells.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value == 0 {
                    out.push(Coord::new(row, col));
                }
            }
        }
        out
    }

    pub fn count_empty(&self) -> usize {
        self.tiles().filter(|&v| v == 0).count()
    }

    pub fn is_full(&self) -> bool {
        self.tiles().all(|v| v != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.tiles().all(|v| v == 0)
    }

    /// Largest tile on the board (0 for an empty board).
    pub fn max_tile(&self) -> Tile {
        self.tiles().max().unwrap_or(0)
    }

    /// Sum of all tiles.
    pub fn tile_sum(&self) -> u64 {
        self.tiles().map(u64::from).sum()
    }

    /// Read line `index` in travel order for `direction`.
    pub fn line(&self, direction: Direction, index: usize) -> Line {
        line_coords(direction, index).map(|c| self.at(c))
    }

    /// Write line `index` back into its original row/column orientation.
    pub fn write_line(&mut self, direction: Direction, index: usize, line: Line) {
        for (coord, value) in line_coords(direction, index).into_iter().zip(line) {
            *self.at_mut(coord) = value;
        }
    }

    /// Swap rows and columns.
    pub fn transpose(&self) -> Self {
        let mut out = Self::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                out.cells[col][row] = self.cells[row][col];
            }
        }
        out
    }

    /// Reverse every row (mirror across the vertical axis).
    pub fn mirror(&self) -> Self {
        let mut out = *self;
        for row in out.cells.iter_mut() {
            row.reverse();
        }
        out
    }

    /// True if some cell can merge with its right or down neighbor.
    ///
    /// Checking only right and down covers left and up as well: every
    /// adjacent pair is seen exactly once from its upper/left member.
    pub fn has_adjacent_pair(&self) -> bool {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let v = self.cells[row][col];
                if col + 1 < BOARD_SIZE && can_merge(v, self.cells[row][col + 1]) {
                    return true;
                }
                if row + 1 < BOARD_SIZE && can_merge(v, self.cells[row + 1][col]) {
                    return true;
                }
            }
        }
        false
    }

    /// Assert every tile is 0 or a power of two (debug builds only).
    #[inline]
    pub(crate) fn debug_validate(&self) {
        debug_assert!(
            self.tiles().all(is_valid_tile),
            "board holds an invalid tile: {:?}",
            self.cells
        );
    }
}

impl From<[[Tile; BOARD_SIZE]; BOARD_SIZE]> for Board {
    fn from(cells: [[Tile; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self::from_array(cells)
    }
}

impl TryFrom<Vec<Vec<Tile>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<Tile>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

/// Tab-separated rows, one per line.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str("\t")?;
                }
                write!(f, "{}", v)?;
            }
        }
        Ok(())
    }
}
