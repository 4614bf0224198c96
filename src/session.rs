//! One player's run: the game, the leaderboard and the UI-only state
//! (current hint, win banner) that sits next to it.
//!
//! Keyboard and adapter commands both go through [`Session::apply`], so the
//! main loop stays the only writer of game state.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::AppConfig;
use crate::core::{GameSnapshot, GameState, Leaderboard};
use crate::engine::{hint_or_fallback, Advisor, GreedyAdvisor, Hint};
use crate::types::GameAction;

pub struct Session {
    game: GameState,
    leaderboard: Leaderboard,
    player: Option<String>,
    advisor: Box<dyn Advisor>,
    hint: Option<Hint>,
    celebrate: bool,
    /// The current episode's score is already on the leaderboard.
    recorded: bool,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        let game = GameState::new(config.seed).with_best_score(config.best_score);
        Self::with_game(game, config.player.clone())
    }

    pub fn with_game(game: GameState, player: Option<String>) -> Self {
        Self {
            game,
            leaderboard: Leaderboard::default(),
            player,
            advisor: Box::new(GreedyAdvisor::new()),
            hint: None,
            celebrate: false,
            recorded: false,
        }
    }

    pub fn with_advisor(mut self, advisor: Box<dyn Advisor>) -> Self {
        self.advisor = advisor;
        self
    }

    pub fn start(&mut self) {
        self.game.start();
        self.recorded = self.game.game_over();
    }

    /// Apply one action. Returns true if the game state changed.
    pub fn apply(&mut self, action: GameAction) -> bool {
        self.hint = None;
        self.celebrate = false;

        let Some(direction) = action.direction() else {
            self.record_score();
            self.game.restart();
            self.recorded = false;
            return true;
        };

        let was_won = self.game.won();
        let Some(event) = self.game.apply_move(direction) else {
            return false;
        };
        if self.game.won() && !was_won {
            self.celebrate = true;
        }
        if event.game_over {
            self.record_score();
        }
        true
    }

    /// Ask the advisor for the current position.
    ///
    /// A finished (or not yet started) game gets no hint; advisor errors
    /// degrade to the fallback hint.
    pub fn request_hint(&mut self) -> Option<&Hint> {
        let snapshot = self.game.snapshot();
        if !snapshot.playable() {
            self.hint = None;
            return None;
        }
        let hint: &Hint = self.hint.insert(hint_or_fallback(self.advisor.as_ref(), &snapshot));
        Some(hint)
    }

    /// Record the running episode (used on quit).
    pub fn finish(&mut self) {
        self.record_score();
    }

    fn record_score(&mut self) {
        if self.recorded || self.game.score() == 0 {
            return;
        }
        self.recorded = true;
        let rank = self
            .leaderboard
            .record(self.player.as_deref(), self.game.score(), now_ms());
        match rank {
            Some(rank) => log::info!("score {} ranked #{}", self.game.score(), rank),
            None => log::debug!("score {} did not place", self.game.score()),
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn hint(&self) -> Option<&Hint> {
        self.hint.as_ref()
    }

    pub fn celebrate(&self) -> bool {
        self.celebrate
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
