//! Aggregate statistics and per-day progress.
//!
//! Maps are keyed by `"<day>-<size>"` strings so that the persisted blob keeps the shape the
//! game has always written.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::Coord;

/// Key of the per-day, per-size entries.
pub fn day_size_key(day: i64, size: usize) -> String {
    format!("{day}-{size}")
}

/// A word found by the player and the cells it was found in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundWord {
    /// The word as listed in the puzzle.
    pub word: String,

    /// The selected cells, from the first click to the last.
    pub coords: Vec<Coord>,
}

/// Progress on one day's grid at one size.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameState {
    /// When the game was started, in milliseconds since the Unix epoch.
    pub start_time: i64,

    /// Found words in the order they were found.
    pub found_words: Vec<String>,

    /// Found words with their cells, in the order they were found.
    pub found_words_data: Vec<FoundWord>,
}

impl GameState {
    /// A fresh game started at `start_time`.
    pub fn new(start_time: i64) -> Self {
        Self {
            start_time,
            ..Self::default()
        }
    }

    /// Whether `word` has been found already.
    pub fn has_found(&self, word: &str) -> bool {
        self.found_words.iter().any(|found| found == word)
    }

    /// Whether any word has been found yet.
    pub fn has_progress(&self) -> bool {
        !self.found_words_data.is_empty()
    }
}

/// Everything the game remembers across sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    /// Puzzle days on which a game was started.
    pub games_played: u64,

    /// Games finished, counting every size.
    pub games_completed: u64,

    /// Sum of all completion times, in seconds.
    pub total_completion_time: u64,

    /// Best completion time per day and size, in seconds.
    pub best_times: BTreeMap<String, u64>,

    /// Completions per day and size.
    pub completed_by_size: BTreeMap<String, u64>,

    /// Every completion time per day and size, in seconds.
    pub times_by_size: BTreeMap<String, Vec<u64>>,

    /// The last puzzle day a game was started on.
    pub last_played_day: i64,

    /// Progress per day and size. Only the current day is kept.
    pub game_state: BTreeMap<String, GameState>,
}

impl Stats {
    /// Registers the start of a game on `day`.
    ///
    /// The first start on a new day counts as a played game and discards the previous day's
    /// progress. Returns whether this was a new day.
    pub fn record_game_start(&mut self, day: i64) -> bool {
        if self.last_played_day == day {
            return false;
        }

        self.games_played += 1;
        self.last_played_day = day;
        self.game_state.clear();
        true
    }

    /// Returns the progress for `key`, creating it with `start_time` when absent.
    pub fn ensure_game_state(&mut self, key: &str, start_time: i64) -> &mut GameState {
        self.game_state
            .entry(key.to_owned())
            .or_insert_with(|| GameState::new(start_time))
    }

    /// Appends a found word to the progress for `key`.
    pub fn record_word_found(&mut self, key: &str, word: &str, coords: Vec<Coord>, start_time: i64) {
        let state = self.ensure_game_state(key, start_time);

        state.found_words.push(word.to_owned());
        state.found_words_data.push(FoundWord {
            word: word.to_owned(),
            coords,
        });
    }

    /// Records a completed game for `key` that took `seconds`.
    ///
    /// The best time only changes when the new time is strictly lower. Returns whether it did.
    pub fn record_game_complete(&mut self, key: &str, seconds: u64) -> bool {
        self.games_completed += 1;
        self.total_completion_time += seconds;
        *self.completed_by_size.entry(key.to_owned()).or_default() += 1;
        self.times_by_size.entry(key.to_owned()).or_default().push(seconds);

        match self.best_times.get(key) {
            Some(&best) if seconds >= best => false,
            _ => {
                self.best_times.insert(key.to_owned(), seconds);
                true
            }
        }
    }

    /// Removes every entry of `day`, at every size, from all per-day maps.
    ///
    /// Returns whether there was anything to remove.
    pub fn reset_day(&mut self, day: i64) -> bool {
        let prefix = format!("{day}-");
        let mut removed = false;

        removed |= remove_prefixed(&mut self.best_times, &prefix);
        removed |= remove_prefixed(&mut self.game_state, &prefix);
        removed |= remove_prefixed(&mut self.completed_by_size, &prefix);
        removed |= remove_prefixed(&mut self.times_by_size, &prefix);

        removed
    }

    /// The best time for `key`, if the puzzle was completed.
    pub fn best_time(&self, key: &str) -> Option<u64> {
        self.best_times.get(key).copied()
    }

    /// Whether the puzzle for `key` has been completed.
    pub fn is_completed(&self, key: &str) -> bool {
        self.best_time(key).is_some()
    }

    /// Average completion time rounded to whole seconds, if any game was completed.
    pub fn average_time(&self) -> Option<u64> {
        (self.games_completed > 0).then(|| {
            (self.total_completion_time as f64 / self.games_completed as f64).round() as u64
        })
    }
}

fn remove_prefixed<V>(map: &mut BTreeMap<String, V>, prefix: &str) -> bool {
    let before = map.len();
    map.retain(|key, _| !key.starts_with(prefix));
    map.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_start_counts_once_per_day() {
        let mut stats = Stats::default();
        stats.ensure_game_state("7-16", 0);

        assert!(stats.record_game_start(8));
        assert!(!stats.record_game_start(8));
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.last_played_day, 8);
        assert!(stats.game_state.is_empty());
    }

    #[test]
    fn found_words_are_appended_in_order() {
        let mut stats = Stats::default();
        stats.record_word_found("8-16", "SOL", vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)], 100);
        stats.record_word_found("8-16", "MAR", vec![Coord::new(1, 0)], 999);

        let state = &stats.game_state["8-16"];
        assert_eq!(state.start_time, 100);
        assert_eq!(state.found_words, vec!["SOL", "MAR"]);
        assert_eq!(state.found_words_data[0].coords.len(), 3);
        assert!(state.has_found("MAR"));
    }

    #[test]
    fn best_time_only_improves_strictly() {
        let mut stats = Stats::default();

        assert!(stats.record_game_complete("8-16", 120));
        assert!(!stats.record_game_complete("8-16", 120));
        assert!(stats.record_game_complete("8-16", 90));
        assert!(!stats.record_game_complete("8-16", 200));

        assert_eq!(stats.best_time("8-16"), Some(90));
        assert_eq!(stats.games_completed, 4);
        assert_eq!(stats.total_completion_time, 530);
        assert_eq!(stats.completed_by_size["8-16"], 4);
        assert_eq!(stats.times_by_size["8-16"], vec![120, 120, 90, 200]);
        assert_eq!(stats.average_time(), Some(133));
    }

    #[test]
    fn reset_day_only_touches_that_day() {
        let mut stats = Stats::default();
        for key in ["8-16", "8-24", "9-16", "18-16", "80-20"] {
            stats.record_game_complete(key, 60);
            stats.ensure_game_state(key, 0);
        }

        assert!(stats.reset_day(8));

        for map_keys in [
            stats.best_times.keys().cloned().collect::<Vec<_>>(),
            stats.game_state.keys().cloned().collect(),
            stats.completed_by_size.keys().cloned().collect(),
            stats.times_by_size.keys().cloned().collect(),
        ] {
            assert_eq!(map_keys, vec!["18-16", "80-20", "9-16"]);
        }
        assert!(!stats.reset_day(8));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut stats = Stats::default();
        stats.record_word_found("8-16", "SOL", vec![Coord::new(2, 3)], 5);

        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["gamesPlayed"], 0);
        assert_eq!(json["gameState"]["8-16"]["foundWordsData"][0]["coords"][0]["r"], 2);
        assert!(json["timesBySize"].is_object());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let stats: Stats = serde_json::from_str(r#"{"gamesPlayed": 3, "bestTimes": {"1-16": 40}}"#).unwrap();

        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.best_time("1-16"), Some(40));
        assert!(stats.completed_by_size.is_empty());
        assert!(stats.game_state.is_empty());
    }
}
