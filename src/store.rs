use std::collections::BTreeMap;

use chrono::Utc;
use thiserror::Error;

use crate::chord::{parse_chord, Chord, PairKey};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid chord name {0:?} in save file")]
    MalformedChord(String),
    #[error("malformed pair key {0:?} in save file")]
    MalformedPair(String),
    #[error("bad timestamp {0:?} in save file")]
    BadTimestamp(String),
    #[error("no chord pairs to choose from — add at least two chords first")]
    NoPairs,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of attempting to add a chord to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
    Invalid,
}

/// One drill attempt: when it happened and how many changes were counted.
/// The score is `None` only for the seed entry written when a pair is
/// first derived, marking its creation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreEntry {
    pub timestamp: f64,
    pub score: Option<u32>,
}

/// Full attempt history for one chord pair, in time order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreHistory {
    entries: Vec<ScoreEntry>,
}

impl ScoreHistory {
    /// History for a freshly derived pair: a single null-score entry
    /// recording when the pair came into existence.
    pub fn seeded_at(timestamp: f64) -> Self {
        Self {
            entries: vec![ScoreEntry { timestamp, score: None }],
        }
    }

    /// Insert an attempt, keeping the history in time order. Backdated
    /// entries slot in where they belong; equal timestamps append after.
    pub fn push(&mut self, entry: ScoreEntry) {
        let pos = self
            .entries
            .partition_point(|e| e.timestamp.total_cmp(&entry.timestamp).is_le());
        self.entries.insert(pos, entry);
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Highest recorded score, 0 if nothing has been recorded yet.
    pub fn highscore(&self) -> u32 {
        self.entries.iter().filter_map(|e| e.score).max().unwrap_or(0)
    }

    /// Mean of recorded scores. Seed entries (null score) are excluded;
    /// a history with no recorded scores averages 0.0.
    pub fn avgscore(&self) -> f64 {
        let scores: Vec<u32> = self.entries.iter().filter_map(|e| e.score).collect();
        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64
    }

    /// Timestamp of the most recent recorded score, if any.
    /// Seed entries don't count as plays.
    pub fn last_played(&self) -> Option<f64> {
        self.entries
            .iter()
            .filter(|e| e.score.is_some())
            .map(|e| e.timestamp)
            .fold(None, |acc, t| Some(acc.map_or(t, |a: f64| a.max(t))))
    }

    /// Number of recorded attempts (seed entries excluded).
    pub fn attempts(&self) -> usize {
        self.entries.iter().filter(|e| e.score.is_some()).count()
    }

    pub(crate) fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        // Keep histories in time order regardless of save-file key order
        entries.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { entries }
    }
}

/// In-memory practice data: the known chords (insertion order, unique) and
/// the score history of every practiceable pair.
///
/// Invariant: for every two distinct known chords exactly one [`PairKey`]
/// exists in the score map. Pairs are derived automatically when a chord is
/// added and never removed, so all mutation must go through [`add_chord`]
/// and [`add_score`].
///
/// [`add_chord`]: ChordStore::add_chord
/// [`add_score`]: ChordStore::add_score
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChordStore {
    chords: Vec<Chord>,
    scores: BTreeMap<PairKey, ScoreHistory>,
}

/// Current wall-clock time as fractional seconds since the Unix epoch.
pub fn now_ts() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

impl ChordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(chords: Vec<Chord>, scores: BTreeMap<PairKey, ScoreHistory>) -> Self {
        Self { chords, scores }
    }

    /// Known chords in the order they were learned.
    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// All practiceable pairs and their histories.
    pub fn scores(&self) -> &BTreeMap<PairKey, ScoreHistory> {
        &self.scores
    }

    pub fn history(&self, pair: &PairKey) -> Option<&ScoreHistory> {
        self.scores.get(pair)
    }

    /// Validate and add a chord, deriving a new pair against every chord
    /// already known. Pairs are seeded before the chord is appended, so a
    /// chord never gets paired with itself.
    pub fn add_chord(&mut self, raw: &str) -> AddOutcome {
        let Some(chord) = parse_chord(raw) else {
            log::debug!("Rejected invalid chord {raw:?}");
            return AddOutcome::Invalid;
        };
        if self.chords.contains(&chord) {
            log::debug!("Chord {chord} already known");
            return AddOutcome::Duplicate;
        }

        let now = now_ts();
        for known in &self.chords {
            // Distinct by construction, so new() cannot fail here
            if let Some(key) = PairKey::new(chord.clone(), known.clone()) {
                self.scores.insert(key, ScoreHistory::seeded_at(now));
            }
        }
        log::info!("Added chord {chord}");
        self.chords.push(chord);
        AddOutcome::Added
    }

    /// Record a drill score for an existing pair. Returns false without
    /// touching anything when the pair is unknown — scores never create
    /// pairs. Every attempt is kept; nothing is overwritten.
    pub fn add_score(&mut self, pair: &PairKey, score: u32, timestamp: Option<f64>) -> bool {
        let Some(history) = self.scores.get_mut(pair) else {
            log::warn!("No such pair {pair}, score not recorded");
            return false;
        };
        history.push(ScoreEntry {
            timestamp: timestamp.unwrap_or_else(now_ts),
            score: Some(score),
        });
        true
    }

    /// Highest score recorded for a pair, 0 if none (or the pair is unknown).
    pub fn highscore(&self, pair: &PairKey) -> u32 {
        self.scores.get(pair).map_or(0, ScoreHistory::highscore)
    }

    /// Mean recorded score for a pair (see [`ScoreHistory::avgscore`]).
    pub fn avgscore(&self, pair: &PairKey) -> f64 {
        self.scores.get(pair).map_or(0.0, ScoreHistory::avgscore)
    }

    /// When the pair was last actually played, if ever.
    pub fn last_played(&self, pair: &PairKey) -> Option<f64> {
        self.scores.get(pair).and_then(ScoreHistory::last_played)
    }

    /// Total recorded attempts across all pairs.
    pub fn total_attempts(&self) -> usize {
        self.scores.values().map(ScoreHistory::attempts).sum()
    }
}
