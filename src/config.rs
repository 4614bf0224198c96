//! Runtime configuration read from `TUI2048_*` environment variables.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::adapter::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// RNG seed for the first episode.
    pub seed: u32,
    /// Leaderboard name; `None` records as anonymous.
    pub player: Option<String>,
    /// Best score carried in from a previous run.
    pub best_score: u32,
    /// When set, logs are appended to this file.
    pub log_path: Option<PathBuf>,
    pub adapter: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let seed = non_empty("TUI2048_SEED")
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(time_seed);
        let best_score = non_empty("TUI2048_BEST")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        Self {
            seed,
            player: non_empty("TUI2048_PLAYER"),
            best_score,
            log_path: non_empty("TUI2048_LOG_PATH").map(PathBuf::from),
            adapter: ServerConfig::from_lookup(&lookup),
        }
    }
}

/// Seed derived from the wall clock.
fn time_seed() -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(1);
    (nanos as u32) ^ ((nanos >> 32) as u32)
}
