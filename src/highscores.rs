//! High score leaderboard
//!
//! Keeps the best 10 runs. Storage belongs to the host; this is the model only.

use serde::{Deserialize, Serialize};

use crate::sim::RunSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// `kills * 10 + level * 100 + floor(time)`
pub fn run_score(kills: u32, level: u32, time: f32) -> u64 {
    kills as u64 * 10 + level as u64 * 100 + time.max(0.0).floor() as u64
}

/// One wave per survived minute, starting at 1
pub fn wave_for_time(time: f32) -> u32 {
    (time.max(0.0) / 60.0).floor() as u32 + 1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    pub kills: u32,
    pub level: u32,
    /// Seconds survived
    pub time: f32,
    pub wave: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl HighScoreEntry {
    pub fn from_summary(summary: &RunSummary, timestamp: f64) -> Self {
        Self {
            score: run_score(summary.kills, summary.level, summary.time),
            kills: summary.kills,
            level: summary.level,
            time: summary.time,
            wave: wave_for_time(summary.time),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed), None if it doesn't qualify
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies. Returns the rank achieved.
    pub fn add_entry(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        let rank = match self.entries.iter().position(|e| entry.score > e.score) {
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

    /// Record a finished run
    pub fn add_run(&mut self, summary: &RunSummary, timestamp: f64) -> Option<usize> {
        let entry = HighScoreEntry::from_summary(summary, timestamp);
        let rank = self.add_entry(entry);
        if let Some(rank) = rank {
            log::info!("New high score at rank {rank}");
        }
        rank
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored board, re-sorting and trimming whatever was saved
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(kills: u32, level: u32, time: f32) -> RunSummary {
        RunSummary {
            time,
            kills,
            level,
            max_combo: 0,
            gold: 0,
        }
    }

    #[test]
    fn test_score_and_wave() {
        assert_eq!(run_score(12, 3, 125.9), 120 + 300 + 125);
        assert_eq!(wave_for_time(0.0), 1);
        assert_eq!(wave_for_time(59.9), 1);
        assert_eq!(wave_for_time(60.0), 2);
        let entry = HighScoreEntry::from_summary(&summary(5, 2, 61.0), 1.0);
        assert_eq!(entry.score, 50 + 200 + 61);
        assert_eq!(entry.wave, 2);
    }

    #[test]
    fn test_ranking_and_trim() {
        let mut hs = HighScores::new();
        for i in 1..=12u32 {
            hs.add_run(&summary(i, 1, 0.0), i as f64);
        }
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(hs.top_score(), Some(120 + 100));
        assert!(hs.entries.windows(2).all(|w| w[0].score >= w[1].score));
        // Lowest kept entry is 3 kills (130); 2 kills no longer qualifies
        assert!(!hs.qualifies(120));
        assert_eq!(hs.potential_rank(1000), Some(1));
    }

    #[test]
    fn test_zero_score_never_qualifies() {
        let hs = HighScores::new();
        assert!(!hs.qualifies(0));
        assert_eq!(hs.potential_rank(0), None);
    }

    #[test]
    fn test_from_json_sorts() {
        let json = r#"{"entries":[
            {"score":5,"kills":0,"level":0,"time":5.0,"wave":1,"timestamp":0.0},
            {"score":50,"kills":5,"level":0,"time":0.0,"wave":1,"timestamp":0.0}]}"#;
        let hs = HighScores::from_json(json).unwrap();
        assert_eq!(hs.top_score(), Some(50));
    }
}
