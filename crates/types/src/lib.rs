//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are plain data with no I/O, so they can be shared by the rule
//! engine, the terminal front end, and the control adapter alike.
//!
//! # Board Dimensions
//!
//! The grid is always 4x4. Cells hold a [`Tile`] value where `0` means empty
//! and any other value is a power of two.
//!
//! # Game Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BOARD_SIZE` | 4 | Rows and columns |
//! | `CELL_COUNT` | 16 | Total cells |
//! | `INITIAL_TILES` | 2 | Tiles spawned when a game starts |
//! | `SPAWN_FOUR_PROBABILITY` | 0.1 | Chance a spawn is a 4 instead of a 2 |
//! | `WIN_TILE` | 2048 | Tile value that marks a game as won |
//! | `MAX_TILE` | 131072 | Largest tile; equal pairs of it stay apart |
//!
//! # Examples
//!
//! ```
//! use tui_2048_types::{Direction, GameAction, BOARD_SIZE};
//!
//! let dir: Direction = "left".parse().unwrap();
//! assert_eq!(dir, Direction::Left);
//! assert_eq!(dir.opposite(), Direction::Right);
//!
//! assert!("sideways".parse::<Direction>().is_err());
//!
//! let action = GameAction::from_direction(Direction::Up);
//! assert_eq!(action.direction(), Some(Direction::Up));
//!
//! assert_eq!(BOARD_SIZE, 4);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Board side length (4 rows, 4 columns)
pub const BOARD_SIZE: usize = 4;

/// Total number of cells on the board
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Number of tiles placed on an empty board when a game starts
pub const INITIAL_TILES: usize = 2;

/// Probability that a spawned tile is a 4 (otherwise it is a 2)
pub const SPAWN_FOUR_PROBABILITY: f64 = 0.1;

/// The common spawn value
pub const TILE_TWO: Tile = 2;

/// The rare spawn value
pub const TILE_FOUR: Tile = 4;

/// Reaching this tile marks the game as won (play continues)
pub const WIN_TILE: Tile = 2048;

/// Largest tile a 4x4 game can produce. Tiles of this value no longer merge.
pub const MAX_TILE: Tile = 1 << 17;

/// Default leaderboard size
pub const DEFAULT_LEADERBOARD_CAPACITY: usize = 10;

/// A cell value: `0` for empty, otherwise a power of two.
pub type Tile = u32;

/// The four slide directions.
///
/// This is a closed set: there is no way to construct any other direction.
/// Text from untrusted sources goes through [`FromStr`], which fails instead
/// of defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Uppercase name, as shown to players and advisors.
    ///
    /// ```
    /// use tui_2048_types::Direction;
    ///
    /// assert_eq!(Direction::Up.as_str(), "UP");
    /// assert_eq!(Direction::Right.as_str(), "RIGHT");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text does not name a direction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid direction: {input:?} (expected up, down, left or right)")]
pub struct ParseDirectionError {
    pub input: String,
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    /// Parse a direction (case-insensitive). Accepts full names or `u/d/l/r`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(ParseDirectionError {
                input: s.to_string(),
            }),
        }
    }
}

/// Player or controller actions applied to a game session.
///
/// These actions are used by both keyboard input and the control adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Slide all tiles up
    MoveUp,
    /// Slide all tiles down
    MoveDown,
    /// Slide all tiles left
    MoveLeft,
    /// Slide all tiles right
    MoveRight,
    /// Start a new episode (keeps the best score)
    Restart,
}

impl GameAction {
    pub fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => GameAction::MoveUp,
            Direction::Down => GameAction::MoveDown,
            Direction::Left => GameAction::MoveLeft,
            Direction::Right => GameAction::MoveRight,
        }
    }

    /// The slide direction, or `None` for non-move actions.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            GameAction::MoveUp => Some(Direction::Up),
            GameAction::MoveDown => Some(Direction::Down),
            GameAction::MoveLeft => Some(Direction::Left),
            GameAction::MoveRight => Some(Direction::Right),
            GameAction::Restart => None,
        }
    }

    /// Parse action from string (for the control protocol)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("up"), Some(GameAction::MoveUp));
    /// assert_eq!(GameAction::from_str("LEFT"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("hold"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("restart") {
            return Some(GameAction::Restart);
        }
        s.parse::<Direction>().ok().map(Self::from_direction)
    }

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveUp => "up",
            GameAction::MoveDown => "down",
            GameAction::MoveLeft => "left",
            GameAction::MoveRight => "right",
            GameAction::Restart => "restart",
        }
    }
}

/// True for `0` and for powers of two from 2 up to [`MAX_TILE`].
#[inline]
pub fn is_valid_tile(value: Tile) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

/// Whether two neighboring tiles combine on a move.
///
/// ```
/// use tui_2048_types::{can_merge, MAX_TILE};
///
/// assert!(can_merge(8, 8));
/// assert!(!can_merge(8, 16));
/// assert!(!can_merge(MAX_TILE, MAX_TILE));
/// ```
#[inline]
pub fn can_merge(a: Tile, b: Tile) -> bool {
    a == b && a < MAX_TILE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_constants() {
        assert_eq!(CELL_COUNT, 16);
        assert_eq!(INITIAL_TILES, 2);
        assert!((SPAWN_FOUR_PROBABILITY - 0.1).abs() < f64::EPSILON);
        assert_eq!(WIN_TILE, 2048);
    }

    #[test]
    fn direction_parse_is_case_insensitive() {
        assert_eq!("UP".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("Down".parse::<Direction>(), Ok(Direction::Down));
        assert_eq!(" l ".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("r".parse::<Direction>(), Ok(Direction::Right));
    }

    #[test]
    fn direction_parse_rejects_unknown() {
        let err = "north".parse::<Direction>().unwrap_err();
        assert_eq!(err.input, "north");
        assert!(err.to_string().contains("north"));
    }

    #[test]
    fn direction_round_trips_through_display() {
        for dir in Direction::ALL {
            assert_eq!(dir.to_string().parse::<Direction>(), Ok(dir));
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn action_direction_mapping() {
        for dir in Direction::ALL {
            assert_eq!(GameAction::from_direction(dir).direction(), Some(dir));
        }
        assert_eq!(GameAction::Restart.direction(), None);
    }

    #[test]
    fn tile_validity() {
        assert!(is_valid_tile(0));
        assert!(is_valid_tile(2));
        assert!(is_valid_tile(131072));
        assert!(!is_valid_tile(1));
        assert!(!is_valid_tile(3));
        assert!(!is_valid_tile(6));
        assert!(is_valid_tile(MAX_TILE));
        assert!(!is_valid_tile(MAX_TILE << 1));
        assert!(!is_valid_tile(1 << 31));
    }
}
