//! High score leaderboard
//!
//! Lives in memory for the session and tracks the top 10 runs. The whole
//! board serializes to JSON so a host can persist it if it wants to.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Displayed score
    pub score: u64,
    /// Which run of the session (1-based)
    pub run: u32,
    /// Raw distance in play-field pixels
    pub distance_ran: f64,
    /// Jumps made during the run
    pub jumps: u32,
}

/// Higher score wins; equal scores go to the longer raw distance. A later
/// run never displaces an earlier one it merely ties.
fn outranks(a: &HighScoreEntry, b: &HighScoreEntry) -> bool {
    a.score > b.score || (a.score == b.score && a.distance_ran > b.distance_ran)
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
    /// Longest raw distance seen this session, rounded up
    #[serde(default)]
    pub best_distance: f64,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            best_distance: 0.0,
        }
    }

    /// Whether a finished run would make the board. Zero-score runs (a crash
    /// on the first obstacle before any distance registers) never do.
    pub fn qualifies(&self, entry: &HighScoreEntry) -> bool {
        entry.score > 0
            && self
                .entries
                .get(MAX_HIGH_SCORES - 1)
                .is_none_or(|lowest| outranks(entry, lowest))
    }

    /// Record a finished run. Returns its 1-based place, or None when it
    /// did not make the board.
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(&entry) {
            return None;
        }
        let index = self.entries.partition_point(|e| !outranks(&entry, e));
        self.entries.insert(index, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(index + 1)
    }

    /// Record a run's raw distance. Returns true when it beats the session
    /// best, which is then updated.
    pub fn beat_distance(&mut self, distance_ran: f64) -> bool {
        if distance_ran > self.best_distance {
            self.best_distance = distance_ran.ceil();
            true
        } else {
            false
        }
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.distance_ran.total_cmp(&a.distance_ran))
        });
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u64, run: u32) -> HighScoreEntry {
        HighScoreEntry {
            score,
            run,
            distance_ran: score as f64 * 40.0,
            jumps: 0,
        }
    }

    #[test]
    fn test_sorted_insert_and_rank() {
        let mut scores = HighScores::new();
        assert!(scores.is_empty());
        assert_eq!(scores.add_score(entry(100, 1)), Some(1));
        assert_eq!(scores.add_score(entry(300, 2)), Some(1));
        assert_eq!(scores.add_score(entry(200, 3)), Some(2));
        assert_eq!(scores.top_score(), Some(300));
        assert_eq!(scores.add_score(entry(0, 4)), None);
    }

    #[test]
    fn test_capped_at_ten() {
        let mut scores = HighScores::new();
        for i in 1..=15 {
            scores.add_score(entry(i * 10, i as u32));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(60));
        assert!(!scores.qualifies(&entry(60, 16)));
        assert!(scores.qualifies(&entry(61, 16)));
    }

    #[test]
    fn test_equal_scores_ranked_by_distance() {
        let mut scores = HighScores::new();
        let short = HighScoreEntry {
            distance_ran: 1000.0,
            ..entry(25, 1)
        };
        let long = HighScoreEntry {
            distance_ran: 1030.0,
            ..entry(25, 2)
        };
        assert_eq!(scores.add_score(short.clone()), Some(1));
        assert_eq!(scores.add_score(long), Some(1));
        // An exact tie lands behind the earlier run
        assert_eq!(scores.add_score(HighScoreEntry { run: 3, ..short }), Some(3));
        let runs: Vec<u32> = scores.entries.iter().map(|e| e.run).collect();
        assert_eq!(runs, vec![2, 1, 3]);
    }

    #[test]
    fn test_best_distance() {
        let mut scores = HighScores::new();
        assert!(scores.beat_distance(120.3));
        assert_eq!(scores.best_distance, 121.0);
        assert!(!scores.beat_distance(121.0));
        assert!(scores.beat_distance(121.5));
    }

    #[test]
    fn test_json_round_trip() {
        let mut scores = HighScores::new();
        scores.add_score(entry(42, 1));
        scores.beat_distance(1680.0);
        let json = scores.to_json().unwrap();
        let loaded = HighScores::from_json(&json).unwrap();
        assert_eq!(loaded.entries, scores.entries);
        assert_eq!(loaded.best_distance, 1680.0);
        assert!(HighScores::from_json("[").is_err());
    }
}
