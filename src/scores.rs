//! # High Scores
//!
//! The persisted leaderboard: at most [`MAX_HIGH_SCORES`] records, best score
//! first, earlier entries winning ties.

use crate::config::MAX_HIGH_SCORES;
use crate::{ChaseError, ChaseResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// One leaderboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub name: String,
    pub score: u32,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl HighScore {
    /// Leaderboard order: higher score first, then earlier timestamp.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then(self.timestamp_ms.cmp(&other.timestamp_ms))
    }
}

impl std::fmt::Display for HighScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} points", self.name, self.score)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Sorted, capped high-score list.
///
/// # Examples
///
/// ```
/// use mazechase::HighScoreTable;
///
/// let mut table = HighScoreTable::new();
/// table.add_at("ada", 1200, 1).unwrap();
/// table.add_at("bob", 3400, 2).unwrap();
/// assert_eq!(table.highest().unwrap().name, "bob");
/// assert_eq!(table.position(2000), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreTable {
    entries: Vec<HighScore>,
}

impl HighScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HighScore] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a score stamped with the current time.
    pub fn add(&mut self, name: &str, score: u32) -> ChaseResult<Option<usize>> {
        self.add_at(name, score, now_ms())
    }

    /// Records a score with an explicit timestamp.
    ///
    /// Returns the 1-based rank the entry landed on, or `None` when it did not
    /// make the cut. Names are trimmed; an empty name is rejected.
    pub fn add_at(&mut self, name: &str, score: u32, timestamp_ms: u64) -> ChaseResult<Option<usize>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChaseError::InvalidScore(
                "player name cannot be empty".to_string(),
            ));
        }

        let entry = HighScore {
            name: name.to_string(),
            score,
            timestamp_ms,
        };
        let index = self
            .entries
            .partition_point(|existing| existing.rank_cmp(&entry) != Ordering::Greater);
        if index >= MAX_HIGH_SCORES {
            debug!("score {} for {} did not make the table", score, name);
            return Ok(None);
        }
        self.entries.insert(index, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        info!("{} entered the high scores at #{} with {}", name, index + 1, score);
        Ok(Some(index + 1))
    }

    /// Whether `score` would earn a place.
    pub fn is_high_score(&self, score: u32) -> bool {
        match self.entries.get(MAX_HIGH_SCORES - 1) {
            Some(lowest) => score > lowest.score,
            None => true,
        }
    }

    /// The 1-based rank `score` would take, if any.
    pub fn position(&self, score: u32) -> Option<usize> {
        match self.entries.iter().position(|entry| score > entry.score) {
            Some(index) => Some(index + 1),
            None if self.entries.len() < MAX_HIGH_SCORES => Some(self.entries.len() + 1),
            None => None,
        }
    }

    pub fn highest(&self) -> Option<&HighScore> {
        self.entries.first()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_json(&self) -> ChaseResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a table and restores its ordering and cap.
    pub fn from_json(json: &str) -> ChaseResult<Self> {
        let mut table: HighScoreTable = serde_json::from_str(json)?;
        table.entries.sort_by(HighScore::rank_cmp);
        table.entries.truncate(MAX_HIGH_SCORES);
        Ok(table)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> ChaseResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Loads a table; a missing file is an empty table.
    pub fn load_from_path(path: impl AsRef<Path>) -> ChaseResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Plain-text leaderboard, one numbered line per entry.
    pub fn export(&self) -> String {
        let mut out = String::from("HIGH SCORES\n===========\n");
        for (rank, entry) in self.entries.iter().enumerate() {
            out.push_str(&format!("{:2}. {}\n", rank + 1, entry));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_score_then_time() {
        let mut table = HighScoreTable::new();
        table.add_at("late", 500, 20).unwrap();
        table.add_at("early", 500, 10).unwrap();
        table.add_at("top", 900, 30).unwrap();
        let names: Vec<&str> = table.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["top", "early", "late"]);
    }

    #[test]
    fn test_capped_at_ten() {
        let mut table = HighScoreTable::new();
        for i in 0..12u32 {
            table.add_at("p", (i + 1) * 100, i as u64).unwrap();
        }
        assert_eq!(table.len(), MAX_HIGH_SCORES);
        assert_eq!(table.highest().unwrap().score, 1200);
        assert_eq!(table.entries().last().unwrap().score, 300);
        assert_eq!(table.add_at("low", 50, 99).unwrap(), None);
        assert!(!table.is_high_score(300));
        assert!(table.is_high_score(301));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut table = HighScoreTable::new();
        assert!(matches!(table.add("   ", 10), Err(ChaseError::InvalidScore(_))));
        assert!(table.is_empty());
    }

    #[test]
    fn test_position() {
        let mut table = HighScoreTable::new();
        assert_eq!(table.position(0), Some(1));
        table.add_at("a", 300, 1).unwrap();
        table.add_at("b", 100, 2).unwrap();
        assert_eq!(table.position(200), Some(2));
        assert_eq!(table.position(100), Some(3));
    }

    #[test]
    fn test_tied_score_ranks_after_existing() {
        let mut table = HighScoreTable::new();
        table.add_at("first", 400, 1).unwrap();
        assert_eq!(table.add_at("second", 400, 2).unwrap(), Some(2));
    }

    #[test]
    fn test_export_lists_entries() {
        let mut table = HighScoreTable::new();
        table.add_at("ada", 1200, 1).unwrap();
        let text = table.export();
        assert!(text.contains(" 1. ada: 1200 points"));
    }
}
