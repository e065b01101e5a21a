// ============================================
// src/store.rs
// Review progress: per-card state, answer stats, and how they are saved
// ============================================

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bincode::config::standard;
use bincode::{Decode, Encode};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, WordwizError};
use crate::scheduler::{Grade, ReviewState, schedule};

const FILE_STEM: &str = "progress";

/// On-disk encoding of the progress file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    /// `progress.json`, human readable.
    #[default]
    Json,
    /// `progress.bin`, bincode.
    Binary,
}

impl StorageFormat {
    pub fn file_name(self) -> String {
        let ext = match self {
            StorageFormat::Json => "json",
            StorageFormat::Binary => "bin",
        };
        format!("{FILE_STEM}.{ext}")
    }

    fn other(self) -> Self {
        match self {
            StorageFormat::Json => StorageFormat::Binary,
            StorageFormat::Binary => StorageFormat::Json,
        }
    }
}

/// Quiz answer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Stats {
    pub seen: u64,
    pub correct: u64,
}

impl Stats {
    /// Whole-number percentage, 0 before the first answer.
    pub fn accuracy_percent(&self) -> u64 {
        if self.seen == 0 {
            return 0;
        }
        (self.correct as f64 / self.seen as f64 * 100.0).round() as u64
    }
}

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct PersistedState {
    pub cards: BTreeMap<String, ReviewState>,
    pub stats: Stats,
}

impl PersistedState {
    pub fn encode(&self, format: StorageFormat) -> Result<Vec<u8>> {
        let bytes = match format {
            StorageFormat::Json => serde_json::to_vec_pretty(self)?,
            StorageFormat::Binary => bincode::encode_to_vec(self, standard())?,
        };
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8], format: StorageFormat) -> Result<Self> {
        let state = match format {
            StorageFormat::Json => serde_json::from_slice(bytes)?,
            StorageFormat::Binary => bincode::decode_from_slice(bytes, standard())?.0,
        };
        Ok(state)
    }
}

/// Owns all review progress. Every mutation is written straight to disk.
#[derive(Debug)]
pub struct ReviewStore {
    state: PersistedState,
    /// `None` keeps everything in memory.
    dir: Option<PathBuf>,
    format: StorageFormat,
}

impl ReviewStore {
    pub fn in_memory() -> Self {
        Self {
            state: PersistedState::default(),
            dir: None,
            format: StorageFormat::default(),
        }
    }

    /// MARK: load progress from `dir` (configured format first, then the other one)
    ///
    /// Missing or unreadable files leave the store empty; this never fails.
    pub fn open(dir: impl Into<PathBuf>, format: StorageFormat) -> Self {
        let dir = dir.into();
        let state = [format, format.other()]
            .into_iter()
            .find_map(|fmt| read_state(&dir.join(fmt.file_name()), fmt))
            .unwrap_or_default();
        info!(
            dir = %dir.display(),
            cards = state.cards.len(),
            seen = state.stats.seen,
            "opened review store"
        );
        Self {
            state,
            dir: Some(dir),
            format,
        }
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(self.format.file_name()))
    }

    /// MARK: write progress to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, self.state.encode(self.format)?)?;
        fs::rename(&tmp, &path)?;

        // the other format's file is now stale and must not win a later open
        let stale = path.with_file_name(self.format.other().file_name());
        match fs::remove_file(&stale) {
            Ok(()) => info!(path = %stale.display(), "removed stale progress file"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        debug!(path = %path.display(), "saved review store");
        Ok(())
    }

    pub fn state(&self, key: &str) -> Option<&ReviewState> {
        self.state.cards.get(key)
    }

    pub fn stats(&self) -> Stats {
        self.state.stats
    }

    pub fn snapshot(&self) -> &PersistedState {
        &self.state
    }

    /// Number of cards that have been graded at least once.
    pub fn len(&self) -> usize {
        self.state.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.cards.is_empty()
    }

    /// Grades `key` and saves. The state is created on the first review.
    pub fn review(&mut self, key: &str, grade: Grade, now_ms: i64) -> Result<&ReviewState> {
        let next = schedule(self.state.cards.get(key), grade, now_ms);
        self.commit(key, next, self.state.stats)
    }

    /// A flipped flashcard counts as a good recall. Stats are left alone.
    pub fn flip_flashcard(&mut self, key: &str, now_ms: i64) -> Result<&ReviewState> {
        self.review(key, Grade::GOOD, now_ms)
    }

    /// Schedules a quiz answer and bumps the counters.
    pub fn record_quiz_answer(&mut self, key: &str, correct: bool, now_ms: i64) -> Result<&ReviewState> {
        let grade = if correct { Grade::EASY } else { Grade::AGAIN };
        let next = schedule(self.state.cards.get(key), grade, now_ms);
        let mut stats = self.state.stats;
        stats.seen += 1;
        if correct {
            stats.correct += 1;
        }
        self.commit(key, next, stats)
    }

    /// Drops every card state and zeroes the counters.
    pub fn reset(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.state);
        if let Err(err) = self.save() {
            self.state = previous;
            return Err(err);
        }
        info!("review progress reset");
        Ok(())
    }

    /// Applies one card update and its stats, keeping it only if the save succeeds.
    fn commit(&mut self, key: &str, next: ReviewState, stats: Stats) -> Result<&ReviewState> {
        let previous_card = self.state.cards.insert(key.to_string(), next);
        let previous_stats = std::mem::replace(&mut self.state.stats, stats);
        if let Err(err) = self.save() {
            match previous_card {
                Some(card) => self.state.cards.insert(key.to_string(), card),
                None => self.state.cards.remove(key),
            };
            self.state.stats = previous_stats;
            return Err(err);
        }
        Ok(&self.state.cards[key])
    }
}

fn read_state(path: &Path, format: StorageFormat) -> Option<PersistedState> {
    if !path.exists() {
        return None;
    }
    let decoded = fs::read(path)
        .map_err(WordwizError::from)
        .and_then(|bytes| PersistedState::decode(&bytes, format));
    match decoded {
        Ok(state) => Some(state),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable progress file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::DAY_MS;
    use tempfile::tempdir;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn accuracy_rounds_and_handles_zero() {
        assert_eq!(Stats::default().accuracy_percent(), 0);
        assert_eq!(Stats { seen: 3, correct: 2 }.accuracy_percent(), 67);
        assert_eq!(Stats { seen: 8, correct: 1 }.accuracy_percent(), 13);
    }

    #[test]
    fn json_matches_persisted_shape() {
        let mut store = ReviewStore::in_memory();
        store.record_quiz_answer("แมว", true, NOW).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&store.snapshot().encode(StorageFormat::Json).unwrap()).unwrap();
        let card = &json["cards"]["แมว"];
        assert_eq!(card["interval"], 1);
        assert_eq!(card["streak"], 1);
        assert_eq!(card["due"], NOW + DAY_MS);
        assert!(card["ease"].is_f64());
        assert_eq!(json["stats"]["seen"], 1);
        assert_eq!(json["stats"]["correct"], 1);
    }

    #[test]
    fn quiz_answers_count_but_flips_do_not() {
        let mut store = ReviewStore::in_memory();
        store.flip_flashcard("a", NOW).unwrap();
        assert_eq!(store.stats(), Stats::default());

        store.record_quiz_answer("a", false, NOW).unwrap();
        store.record_quiz_answer("b", true, NOW).unwrap();
        assert_eq!(store.stats(), Stats { seen: 2, correct: 1 });
        assert_eq!(store.state("a").unwrap().streak, 0);
        assert_eq!(store.state("b").unwrap().streak, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn review_creates_state_lazily() {
        let mut store = ReviewStore::in_memory();
        assert!(store.state("x").is_none());
        let st = *store.review("x", Grade::new(3).unwrap(), NOW).unwrap();
        assert_eq!(st.streak, 1);
        assert_eq!(store.state("x"), Some(&st));
    }

    #[test]
    fn reset_clears_cards_and_stats() {
        let dir = tempdir().unwrap();
        let mut store = ReviewStore::open(dir.path(), StorageFormat::Json);
        store.record_quiz_answer("a", true, NOW).unwrap();
        store.reset().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.stats(), Stats::default());

        let reopened = ReviewStore::open(dir.path(), StorageFormat::Json);
        assert!(reopened.is_empty());
    }

    #[test]
    fn round_trips_through_both_formats() {
        for format in [StorageFormat::Json, StorageFormat::Binary] {
            let dir = tempdir().unwrap();
            let mut store = ReviewStore::open(dir.path(), format);
            for (i, g) in [5u8, 5, 5, 3, 0, 4].into_iter().enumerate() {
                store.review("k", Grade::new(g).unwrap(), NOW + i as i64).unwrap();
            }
            store.record_quiz_answer("j", true, NOW).unwrap();
            store.record_quiz_answer("j", false, NOW).unwrap();

            let reopened = ReviewStore::open(dir.path(), format);
            assert_eq!(reopened.snapshot(), store.snapshot());
            // bit-for-bit float equality
            assert_eq!(
                reopened.state("k").unwrap().ease.to_bits(),
                store.state("k").unwrap().ease.to_bits()
            );
        }
    }

    #[test]
    fn falls_back_to_other_format() {
        let dir = tempdir().unwrap();
        let mut store = ReviewStore::open(dir.path(), StorageFormat::Json);
        store.record_quiz_answer("a", true, NOW).unwrap();

        let migrated = ReviewStore::open(dir.path(), StorageFormat::Binary);
        assert_eq!(migrated.stats().seen, 1);
        assert!(migrated.state("a").is_some());
    }

    #[test]
    fn switching_formats_back_keeps_latest_progress() {
        let dir = tempdir().unwrap();
        let mut json = ReviewStore::open(dir.path(), StorageFormat::Json);
        json.record_quiz_answer("a", true, NOW).unwrap();

        let mut binary = ReviewStore::open(dir.path(), StorageFormat::Binary);
        binary.record_quiz_answer("a", false, NOW).unwrap();
        binary.record_quiz_answer("b", true, NOW).unwrap();
        assert_eq!(binary.stats().seen, 3);
        assert!(!dir.path().join("progress.json").exists());

        let reopened = ReviewStore::open(dir.path(), StorageFormat::Json);
        assert_eq!(reopened.stats(), Stats { seen: 3, correct: 2 });
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.snapshot(), binary.snapshot());
    }

    #[test]
    fn failed_save_leaves_memory_untouched() {
        let dir = tempdir().unwrap();
        // a regular file where the data directory should be
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"").unwrap();
        let mut store = ReviewStore::open(&blocker, StorageFormat::Json);

        assert!(store.record_quiz_answer("a", true, NOW).is_err());
        assert!(store.review("b", Grade::EASY, NOW).is_err());
        assert!(store.is_empty());
        assert_eq!(store.stats(), Stats::default());
    }

    #[test]
    fn failed_save_keeps_previous_card_state() {
        let dir = tempdir().unwrap();
        let mut store = ReviewStore::open(dir.path(), StorageFormat::Json);
        let before = *store.review("a", Grade::EASY, NOW).unwrap();

        // swap the data directory for a file so the next write fails
        fs::remove_dir_all(dir.path()).unwrap();
        fs::write(dir.path(), b"").unwrap();
        assert!(store.review("a", Grade::new(0).unwrap(), NOW).is_err());
        assert!(store.reset().is_err());
        assert_eq!(store.state("a"), Some(&before));
        fs::remove_file(dir.path()).unwrap();
    }

    #[test]
    fn corrupt_or_missing_files_yield_empty_store() {
        let dir = tempdir().unwrap();
        assert!(ReviewStore::open(dir.path(), StorageFormat::Json).is_empty());

        fs::write(dir.path().join("progress.json"), b"{not json").unwrap();
        let store = ReviewStore::open(dir.path(), StorageFormat::Json);
        assert!(store.is_empty());
        assert_eq!(store.stats(), Stats::default());

        fs::write(dir.path().join("progress.json"), b"{}").unwrap();
        assert!(ReviewStore::open(dir.path(), StorageFormat::Json).is_empty());
    }
}
