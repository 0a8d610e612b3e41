//! High score leaderboard system
//!
//! Persisted through the storage backend, tracks the top 10 runs.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, load_json, save_json, storage_key};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score
    pub score: u64,
    /// Level reached (1-based)
    pub level: u32,
    /// Session length in seconds
    pub time_secs: u64,
    /// Unix timestamp (ms) when the run ended
    pub timestamp: f64,
    /// Model the player picked
    pub model: Option<String>,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Storage key suffix
    const STORAGE_KEY: &'static str = "highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a finished run, keep the board sorted descending and trimmed.
    /// Returns the rank achieved (1-indexed) or None if it fell off the board.
    pub fn record(&mut self, entry: HighScoreEntry) -> Option<usize> {
        // Ties keep the earlier run ahead
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);

        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores, starting fresh if none are stored or they are unreadable
    pub fn load(storage: &dyn Storage) -> Self {
        let mut scores: Self = load_json(storage, &storage_key(Self::STORAGE_KEY));
        // Stored data may predate the cap or be hand-edited
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        scores
    }

    /// Save high scores; failures are logged
    pub fn save(&self, storage: &dyn Storage) -> bool {
        let saved = save_json(storage, &storage_key(Self::STORAGE_KEY), self);
        if saved {
            log::info!("High scores saved ({} entries)", self.entries.len());
        }
        saved
    }
}
