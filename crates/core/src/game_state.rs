//! Game state module - a caller-owned game session
//!
//! The rule engine in [`rules`](crate::rules) is stateless. This module is the
//! caller side of it: it owns the current board, the running score, the best
//! score, and the RNG, and drives the session state machine
//! `Init -> Playing -> Terminal`.
//!
//! A move is accepted only if it changes the board. Accepted moves add their
//! score delta, spawn one tile, and re-check the terminal condition. Rejected
//! moves change nothing.

use crate::board::Board;
use crate::rng::SimpleRng;
use crate::rules::{apply_move, is_terminal, try_spawn_tile, Spawn};
use crate::snapshot::GameSnapshot;
use crate::types::{Direction, GameAction, Tile, INITIAL_TILES, WIN_TILE};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created, initial tiles not yet placed
    Init,
    /// Accepting moves
    Playing,
    /// No move can change the board
    Terminal,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Playing => "playing",
            Phase::Terminal => "terminal",
        }
    }
}

/// What an accepted move did (consumed by observers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveEvent {
    pub direction: Direction,
    pub score_delta: u32,
    pub merges: u8,
    pub spawn: Option<Spawn>,
    /// This move ended the game
    pub game_over: bool,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    phase: Phase,
    rng: SimpleRng,
    /// Seed the current episode started from.
    seed: u32,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    /// Accepted moves in this episode.
    moves: u32,
    score: u32,
    best_score: u32,
    won: bool,
    /// Last accepted move (consumed by observers).
    last_event: Option<MoveEvent>,
}

impl GameState {
    /// Create a new game with the given RNG seed
    pub fn new(seed: u32) -> Self {
        let rng = SimpleRng::new(seed);
        Self {
            board: Board::new(),
            phase: Phase::Init,
            seed: rng.state(),
            rng,
            episode_id: 0,
            moves: 0,
            score: 0,
            best_score: 0,
            won: false,
            last_event: None,
        }
    }

    /// Resume play from an arbitrary board (for tests, replays, and tools).
    ///
    /// The phase is `Playing`, or `Terminal` if the board admits no move.
    pub fn from_board(board: Board, seed: u32) -> Self {
        let mut state = Self::new(seed);
        state.board = board;
        state.won = board.max_tile() >= WIN_TILE;
        state.phase = if is_terminal(&board) {
            Phase::Terminal
        } else {
            Phase::Playing
        };
        state
    }

    /// Carry a best score in from a previous run.
    pub fn with_best_score(mut self, best_score: u32) -> Self {
        self.best_score = self.best_score.max(best_score);
        self
    }

    /// Place the initial tiles and start accepting moves
    pub fn start(&mut self) {
        if self.phase != Phase::Init {
            return;
        }
        for _ in 0..INITIAL_TILES {
            if let Some((board, _)) = try_spawn_tile(&self.board, &mut self.rng) {
                self.board = board;
            }
        }
        self.phase = Phase::Playing;
        log::debug!(
            "episode {} started (seed {}):\n{}",
            self.episode_id,
            self.seed,
            self.board
        );
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn started(&self) -> bool {
        self.phase != Phase::Init
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::Terminal
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn max_tile(&self) -> Tile {
        self.board.max_tile()
    }

    pub fn last_event(&self) -> Option<MoveEvent> {
        self.last_event
    }

    pub fn take_last_event(&mut self) -> Option<MoveEvent> {
        self.last_event.take()
    }

    /// Attempt a move. Returns the event if the move was accepted.
    pub fn apply_move(&mut self, direction: Direction) -> Option<MoveEvent> {
        if self.phase != Phase::Playing {
            return None;
        }

        let result = apply_move(&self.board, direction);
        if !result.moved {
            return None;
        }

        self.score = self.score.saturating_add(result.score_delta);
        self.best_score = self.best_score.max(self.score);
        self.moves += 1;

        let spawn = match try_spawn_tile(&result.board, &mut self.rng) {
            Some((board, spawn)) => {
                self.board = board;
                Some(spawn)
            }
            None => {
                self.board = result.board;
                None
            }
        };

        if !self.won && self.board.max_tile() >= WIN_TILE {
            self.won = true;
            log::info!("episode {} reached {}", self.episode_id, WIN_TILE);
        }

        let game_over = is_terminal(&self.board);
        if game_over {
            self.phase = Phase::Terminal;
            log::info!(
                "episode {} over: score {} after {} moves",
                self.episode_id,
                self.score,
                self.moves
            );
        }

        let event = MoveEvent {
            direction,
            score_delta: result.score_delta,
            merges: result.merges,
            spawn,
            game_over,
        };
        self.last_event = Some(event);
        Some(event)
    }

    /// Apply a game action. Returns true if the state changed.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action.direction() {
            Some(direction) => self.apply_move(direction).is_some(),
            None => {
                self.restart();
                true
            }
        }
    }

    /// Start a new episode, continuing the RNG sequence and keeping the best score.
    pub fn restart(&mut self) {
        let seed = self.rng.state();
        let next_episode = self.episode_id.wrapping_add(1);
        let best_score = self.best_score;
        *self = Self::new(seed).with_best_score(best_score);
        self.episode_id = next_episode;
        self.start();
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.board = *self.board.rows();
        out.phase = self.phase;
        out.score = self.score;
        out.best_score = self.best_score;
        out.moves = self.moves;
        out.max_tile = self.board.max_tile();
        out.won = self.won;
        out.game_over = self.game_over();
        out.episode_id = self.episode_id;
        out.seed = self.seed;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}
