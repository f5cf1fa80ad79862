use serde::{Deserialize, Serialize};

/// Number of scores kept when no capacity is given
pub const DEFAULT_HIGH_SCORE_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player_name: String,
    /// Dungeon level the run ended on
    pub level_description: String,
    pub score: u64,
}

impl ScoreEntry {
    pub fn new(player_name: impl Into<String>, level_description: impl Into<String>, score: u64) -> Self {
        Self {
            player_name: player_name.into(),
            level_description: level_description.into(),
            score,
        }
    }
}

/// High-score table ordered from best to worst
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    entries: Vec<ScoreEntry>,
    capacity: usize,
}

impl Default for HighScores {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HIGH_SCORE_CAPACITY)
    }
}

impl HighScores {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
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

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 1-based rank a score would take, `None` if it does not make the table
    ///
    /// Ties rank above existing entries with the same score.
    pub fn rank(&self, score: u64) -> Option<usize> {
        if let Some(index) = self.entries.iter().position(|entry| score >= entry.score) {
            return Some(index + 1);
        }

        (self.entries.len() < self.capacity).then_some(self.entries.len() + 1)
    }

    /// Insert at a rank from [`HighScores::rank`], dropping whatever falls off the end
    ///
    /// Ranks beyond the end of the table append.
    pub fn add(&mut self, entry: ScoreEntry, rank: usize) {
        let index = rank.saturating_sub(1).min(self.entries.len());
        self.entries.insert(index, entry);
        self.entries.truncate(self.capacity);
    }

    /// Rank and insert in one go, returning the rank taken
    pub fn submit(&mut self, entry: ScoreEntry) -> Option<usize> {
        let rank = self.rank(entry.score)?;
        self.add(entry, rank);
        Some(rank)
    }
}
