//! High score leaderboard system
//!
//! Local top-10 table persisted as JSON. The network half of the leaderboard
//! is a host concern; everything here is best-effort and failures are logged
//! and swallowed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::Mode;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    /// Presents delivered
    pub score: u32,
    pub mode: Mode,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(
        &mut self,
        name: &str,
        score: u32,
        mode: Mode,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            name: name.to_string(),
            score,
            mode,
            timestamp,
        };

        // Insertion point, sorted descending by score
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from a JSON file; any failure starts fresh
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<HighScores>(&json) {
                Ok(scores) => {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    scores
                }
                Err(e) => {
                    log::warn!("High score file unreadable ({e}), starting fresh");
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    /// Save high scores to a JSON file; failures are logged and ignored
    pub fn save(&self, path: &Path) {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not serialize high scores: {e}");
                return;
            }
        };
        match std::fs::write(path, json) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Could not save high scores: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(1));
    }

    #[test]
    fn test_add_keeps_descending_order() {
        let mut scores = HighScores::new();
        scores.add_score("a", 10, Mode::Campaign, 0.0);
        scores.add_score("b", 30, Mode::Campaign, 0.0);
        scores.add_score("c", 20, Mode::Survival, 0.0);

        let got: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(got, vec![30, 20, 10]);
        assert_eq!(scores.top_score(), Some(30));
    }

    #[test]
    fn test_table_truncates_at_max() {
        let mut scores = HighScores::new();
        for i in 1..=15u32 {
            scores.add_score("p", i, Mode::Campaign, 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        // The weakest entries fell off the bottom
        assert_eq!(scores.entries.last().map(|e| e.score), Some(6));
        assert!(!scores.qualifies(5));
        assert!(scores.qualifies(7));
    }

    #[test]
    fn test_potential_rank() {
        let mut scores = HighScores::new();
        scores.add_score("a", 30, Mode::Campaign, 0.0);
        scores.add_score("b", 10, Mode::Campaign, 0.0);

        assert_eq!(scores.potential_rank(40), Some(1));
        assert_eq!(scores.potential_rank(20), Some(2));
        assert_eq!(scores.potential_rank(5), Some(3));
        assert_eq!(scores.potential_rank(0), None);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let scores = HighScores::load(Path::new("/nonexistent/highscores.json"));
        assert!(scores.is_empty());
    }
}
