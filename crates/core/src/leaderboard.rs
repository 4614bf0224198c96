//! Leaderboard module - rank-ordered score history
//!
//! Caller-owned record of finished games, kept sorted by score (highest
//! first). Ties keep insertion order, so an earlier game outranks a later one
//! with the same score. Storage is left to the caller.

use crate::types::DEFAULT_LEADERBOARD_CAPACITY;

/// Name recorded when the player did not give one.
pub const ANONYMOUS_PLAYER: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    /// Unix time in milliseconds when the game ended
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
    capacity: usize,
}

impl Leaderboard {
    /// Create an empty leaderboard holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Build from previously stored entries, re-sorting and trimming.
    pub fn from_entries(capacity: usize, entries: impl IntoIterator<Item = ScoreEntry>) -> Self {
        let mut board = Self::new(capacity);
        let mut entries: Vec<ScoreEntry> = entries.into_iter().collect();
        // Stable sort keeps the stored order among equal scores.
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(board.capacity);
        board.entries = entries;
        board
    }

    /// Record a finished game. Returns the 1-based rank, or `None` if the
    /// score did not make the table.
    pub fn record(&mut self, name: Option<&str>, score: u32, timestamp_ms: u64) -> Option<usize> {
        let pos = self.entries.partition_point(|e| e.score >= score);
        if pos >= self.capacity {
            return None;
        }

        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => ANONYMOUS_PLAYER.to_string(),
        };

        self.entries.insert(
            pos,
            ScoreEntry {
                name,
                score,
                timestamp_ms,
            },
        );
        self.entries.truncate(self.capacity);
        log::debug!("leaderboard: score {} placed at rank {}", score, pos + 1);
        Some(pos + 1)
    }

    /// Highest recorded score.
    pub fn best(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(DEFAULT_LEADERBOARD_CAPACITY)
    }
}
