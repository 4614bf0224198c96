use crate::board::Board;
use crate::game_state::Phase;
use crate::types::{Tile, BOARD_SIZE};

/// Read-only copy of a session, handed to renderers, advisors and the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub board: [[Tile; BOARD_SIZE]; BOARD_SIZE],
    pub phase: Phase,
    pub score: u32,
    pub best_score: u32,
    pub moves: u32,
    pub max_tile: Tile,
    pub won: bool,
    pub game_over: bool,
    pub episode_id: u32,
    pub seed: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn playable(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn board(&self) -> Board {
        Board::from_array(self.board)
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[0; BOARD_SIZE]; BOARD_SIZE],
            phase: Phase::Init,
            score: 0,
            best_score: 0,
            moves: 0,
            max_tile: 0,
            won: false,
            game_over: false,
            episode_id: 0,
            seed: 0,
        }
    }
}
