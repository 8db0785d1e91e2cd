//! One player's game on one device: today's grid, their progress and the commands the
//! presentation layer sends.
//!
//! Every command runs to completion synchronously. Stats are saved right after each change so
//! that closing the page at any point loses nothing.

use chrono::{Offset, TimeDelta};
use log::info;
use serde::Serialize;

use crate::{
    catalog::{Catalog, Puzzle},
    config::{DayResolver, DebugConfig, GameConfig},
    day::{self, Clock},
    generator::{self, GeneratedPuzzle},
    grid::{Coord, Grid},
    selection,
    stats::{day_size_key, Stats},
    storage::{StatsRepository, Storage},
    Result,
};

macro_rules! verbose {
    ($session:expr, $($arg:tt)+) => {
        if $session.debug.verbose {
            log::debug!($($arg)+);
        }
    };
}

/// Something the presentation layer should react to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    /// A word was found at the given cells.
    WordFound {
        /// The word as listed in the puzzle.
        word: String,

        /// The selected cells.
        coords: Vec<Coord>,
    },

    /// The last word was found.
    #[serde(rename_all = "camelCase")]
    PuzzleCompleted {
        /// Seconds since the game started.
        elapsed_seconds: u64,

        /// Whether this beat the best time for the day and size.
        new_best: bool,
    },

    /// The selection did not match any remaining word.
    IncorrectSelection {
        /// The selected cells, empty when the points were not on a line.
        coords: Vec<Coord>,
    },
}

/// What the game shows after a command that (re)loads the puzzle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    /// The grid is playable.
    Playing,

    /// Today's puzzle at this size is already solved.
    Completed(CompletedScreen),
}

/// Contents of the "already solved" screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedScreen {
    /// Best time for today at this size.
    pub best_time: Option<u64>,

    /// The revealed secret phrase.
    pub secret: String,

    /// Time left until the next puzzle.
    pub next_puzzle_in: TimeDelta,
}

/// Outcome of [`Session::reset_day`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Today's progress was removed and the game restarted.
    Reset,

    /// There was no progress for today.
    NothingToReset,
}

/// A word in the displayed list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WordEntry {
    /// The word.
    pub word: String,

    /// Whether the player found it.
    pub found: bool,
}

/// Numbers shown in the stats panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// Days a game was started on.
    pub games_played: u64,

    /// Games finished.
    pub games_completed: u64,

    /// Best time for today at the current size.
    pub best_time: Option<u64>,

    /// Average completion time.
    pub average_time: Option<u64>,
}

/// The game state of one device.
pub struct Session<S, C> {
    config: GameConfig,
    debug: DebugConfig,
    catalog: Catalog,
    resolver: DayResolver<C>,
    repository: StatsRepository<S>,
    stats: Stats,
    grid_size: usize,
    day: i64,
    puzzle: Puzzle,
    generated: GeneratedPuzzle,
    found: Vec<String>,
    timer_running: bool,
    final_time: Option<u64>,
}

impl<S: Storage, C: Clock> Session<S, C> {
    /// Loads saved stats, settings and debug overrides from `storage` and prepares today's puzzle.
    ///
    /// Call [`Session::initialize`] afterwards to decide between playing and the solved screen.
    pub fn new(storage: S, clock: C, catalog: Catalog, config: GameConfig) -> Self {
        let debug = DebugConfig::load(&storage);
        let repository = StatsRepository::new(storage);
        let stats = repository.load();
        let grid_size = repository
            .load_grid_size()
            .and_then(|size| config.validate_size(size).ok())
            .unwrap_or(config.default_size);
        let resolver = DayResolver::new(clock, &debug);
        let day = resolver.current_day();
        let puzzle = catalog.puzzle_for_day(day).clone();
        let generated = generator::generate(day, grid_size, &puzzle);

        Self {
            config,
            debug,
            catalog,
            resolver,
            repository,
            stats,
            grid_size,
            day,
            puzzle,
            generated,
            found: Vec::new(),
            timer_running: false,
            final_time: None,
        }
    }

    /// Replaces the debug overrides for this session without persisting them.
    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.resolver.set_forced_date(debug.forced_date);
        self.debug = debug;
        self
    }

    /// Shows the solved screen when today's puzzle at the current size is done, otherwise starts
    /// a game.
    pub fn initialize(&mut self) -> Screen {
        let key = day_size_key(self.resolver.current_day(), self.grid_size);

        if self.stats.is_completed(&key) {
            self.show_completed()
        } else {
            self.load_game(false);
            Screen::Playing
        }
    }

    /// Starts or resumes today's game at `size`.
    ///
    /// Unless `is_restart` is set, the first game of a new puzzle day counts as played and drops
    /// the previous day's progress.
    pub fn start_new_game(&mut self, size: usize, is_restart: bool) -> Result<()> {
        self.grid_size = self.config.validate_size(size)?;
        self.load_game(is_restart);
        Ok(())
    }

    fn load_game(&mut self, is_restart: bool) {
        self.regenerate();
        verbose!(self, "new game: day {}, size {}, restart {}", self.day, self.grid_size, is_restart);

        if !is_restart {
            let day = self.day;
            if self.update(|stats| stats.record_game_start(day)) {
                info!("first game of puzzle day {day}");
            }
        }

        let key = self.key();
        let now = self.now_ms();
        self.final_time = None;

        match self.stats.game_state.get(&key) {
            Some(state) => {
                self.found = state.found_words_data.iter().map(|data| data.word.clone()).collect();
                self.timer_running = state.has_progress();
            }
            None => {
                self.update(|stats| {
                    stats.ensure_game_state(&key, now);
                });
                self.found.clear();
                self.timer_running = false;
            }
        }
    }

    fn regenerate(&mut self) {
        self.day = self.resolver.current_day();
        self.puzzle = self.catalog.puzzle_for_day(self.day).clone();
        self.generated = generator::generate(self.day, self.grid_size, &self.puzzle);
        verbose!(
            self,
            "puzzle {:?}: {} of {} words placed",
            self.puzzle.theme,
            self.generated.words.len(),
            self.puzzle.words.len()
        );

        for placement in &self.generated.placements {
            verbose!(
                self,
                "placed {} at {:?} going {:?} (reversed: {})",
                placement.word,
                placement.span.begin,
                placement.span.direction,
                placement.reversed
            );
        }
    }

    fn show_completed(&mut self) -> Screen {
        self.regenerate();
        self.timer_running = false;
        self.found = self.generated.words.clone();
        self.final_time = self.stats.best_time(&self.key());

        Screen::Completed(self.completed_screen())
    }

    /// Starts the clock for a game without progress, as when the player presses "start".
    pub fn start_timer(&mut self) {
        if self.timer_running {
            return;
        }

        let key = self.key();
        let now = self.now_ms();
        self.update(|stats| stats.ensure_game_state(&key, now).start_time = now);
        self.timer_running = true;
    }

    /// Checks the line from `start` to `end` against the remaining words.
    ///
    /// Selecting the same cell twice cancels the selection and yields no event.
    pub fn submit_selection(&mut self, start: Coord, end: Coord) -> Vec<GameEvent> {
        if start == end || self.is_complete() {
            return Vec::new();
        }

        let selection = selection::resolve_line_selection(&self.generated.grid, start, end);
        verbose!(self, "selected {:?} from {:?} to {:?}", selection.word(), start, end);

        let word = match selection::try_match(&selection.letters, &self.generated.words, &self.found) {
            Some(word) => word.to_owned(),
            None => {
                return vec![GameEvent::IncorrectSelection {
                    coords: selection.coords,
                }]
            }
        };

        let key = self.key();
        let now = self.now_ms();
        let coords = selection.coords;
        self.found.push(word.clone());
        self.update(|stats| stats.record_word_found(&key, &word, coords.clone(), now));

        let mut events = vec![GameEvent::WordFound { word, coords }];

        if self.is_complete() {
            let elapsed = self.elapsed_seconds();
            let new_best = self.update(|stats| stats.record_game_complete(&key, elapsed));
            self.timer_running = false;
            self.final_time = Some(elapsed);
            info!("puzzle {key} completed in {}", day::format_time(elapsed as f64));

            events.push(GameEvent::PuzzleCompleted {
                elapsed_seconds: elapsed,
                new_best,
            });
        }

        events
    }

    /// Forgets today's progress and best times at every size and reloads the game as on a fresh
    /// visit, so a reset after the morning rollover also starts the new puzzle day.
    pub fn reset_day(&mut self) -> ResetOutcome {
        let day = self.resolver.current_day();

        if self.update(|stats| stats.reset_day(day)) {
            info!("progress for puzzle day {day} reset");
            self.initialize();
            ResetOutcome::Reset
        } else {
            ResetOutcome::NothingToReset
        }
    }

    /// Switches to `size`, remembering the choice for the next visit.
    pub fn change_grid_size(&mut self, size: usize) -> Result<Screen> {
        self.grid_size = self.config.validate_size(size)?;
        self.repository.save_grid_size(size);

        if self.stats.is_completed(&day_size_key(self.resolver.current_day(), size)) {
            Ok(self.show_completed())
        } else {
            self.load_game(true);
            Ok(Screen::Playing)
        }
    }

    /// Forces puzzle days to resolve from `input` (`dd/mm/yyyy`) and persists the override.
    ///
    /// Call [`Session::initialize`] afterwards to load that day's puzzle.
    pub fn set_debug_date(&mut self, input: &str) -> Result<()> {
        let offset = self.resolver.now().offset().fix();
        self.debug.set_date(input, offset)?;
        self.resolver.set_forced_date(self.debug.forced_date);
        self.debug.save(self.repository.storage_mut());
        Ok(())
    }

    /// Removes the forced date and persists the change.
    pub fn clear_debug_date(&mut self) {
        self.debug.clear_date();
        self.resolver.set_forced_date(None);
        self.debug.save(self.repository.storage_mut());
    }

    /// Turns session tracing on or off and persists the choice.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.debug.verbose = verbose;
        self.debug.save(self.repository.storage_mut());
    }

    fn update<T>(&mut self, change: impl FnOnce(&mut Stats) -> T) -> T {
        let result = change(&mut self.stats);
        self.repository.save(&self.stats);
        result
    }

    fn key(&self) -> String {
        day_size_key(self.day, self.grid_size)
    }

    fn now_ms(&self) -> i64 {
        self.resolver.now().timestamp_millis()
    }

    /// The grid being played.
    pub fn grid(&self) -> &Grid {
        &self.generated.grid
    }

    /// The generated puzzle, including where each word was placed.
    pub fn generated(&self) -> &GeneratedPuzzle {
        &self.generated
    }

    /// Today's puzzle.
    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    /// The puzzle day being played.
    pub fn day(&self) -> i64 {
        self.day
    }

    /// The current grid size.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// The persisted stats.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The active debug overrides.
    pub fn debug(&self) -> &DebugConfig {
        &self.debug
    }

    /// Words found so far, in the order they were found.
    pub fn found_words(&self) -> &[String] {
        &self.found
    }

    /// The word list in display order.
    pub fn word_list(&self) -> Vec<WordEntry> {
        self.generated
            .display_order
            .iter()
            .map(|word| WordEntry {
                word: word.clone(),
                found: self.found.contains(word),
            })
            .collect()
    }

    /// Whether every word has been found.
    pub fn is_complete(&self) -> bool {
        self.generated.words.iter().all(|word| self.found.contains(word))
    }

    /// Whether the clock is running.
    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    /// Whole seconds since the game started, or the final time once it is over.
    pub fn elapsed_seconds(&self) -> u64 {
        if let Some(final_time) = self.final_time {
            return final_time;
        }

        let start = self
            .stats
            .game_state
            .get(&self.key())
            .map_or_else(|| self.now_ms(), |state| state.start_time);

        (self.now_ms() - start).max(0) as u64 / 1000
    }

    /// The timer text, `MM:SS`.
    pub fn timer_display(&self) -> String {
        day::format_time(self.elapsed_seconds() as f64)
    }

    /// Cells of the secret message to highlight once the puzzle is solved.
    pub fn revealed_secret_cells(&self) -> Vec<Coord> {
        if self.is_complete() {
            self.generated.grid.secret_cells()
        } else {
            Vec::new()
        }
    }

    /// The solved screen for the current day and size.
    pub fn completed_screen(&self) -> CompletedScreen {
        CompletedScreen {
            best_time: self.stats.best_time(&self.key()),
            secret: self.puzzle.secret.clone(),
            next_puzzle_in: day::time_until_next_puzzle(&self.resolver.now()),
        }
    }

    /// Numbers for the stats panel.
    pub fn stats_summary(&self) -> StatsSummary {
        StatsSummary {
            games_played: self.stats.games_played,
            games_completed: self.stats.games_completed,
            best_time: self.stats.best_time(&self.key()),
            average_time: self.stats.average_time(),
        }
    }

    /// Text for sharing a finished puzzle.
    pub fn share_text(&self) -> String {
        format!(
            "¡He resuelto la Sopa de Letras Diaria! 🎉\nTema: {}\nTamaño: {}x{}\nMi tiempo: {}",
            self.puzzle.theme,
            self.grid_size,
            self.grid_size,
            day::format_optional_time(self.final_time)
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone};

    use super::*;
    use crate::{day::ManualClock, storage::MemoryStorage, storage::STATS_KEY};

    fn at(d: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 5, d, h, m, 0)
            .unwrap()
    }

    fn small_catalog() -> Catalog {
        Catalog::new(vec![
            Puzzle::new("Mar", &["OLA", "PEZ", "ARENA"], "AGUA"),
            Puzzle::new("Cielo", &["NUBE", "SOL"], "AZUL"),
        ])
        .unwrap()
    }

    fn session(clock: &ManualClock) -> Session<MemoryStorage, ManualClock> {
        Session::new(MemoryStorage::new(), clock.clone(), small_catalog(), GameConfig::default())
    }

    fn find(session: &mut Session<MemoryStorage, ManualClock>, word: &str) -> Vec<GameEvent> {
        let span = session.generated().placement(word).unwrap().span;
        let end = span.position(span.len - 1).unwrap();
        session.submit_selection(span.begin, end)
    }

    #[test]
    fn first_game_of_the_day_counts_once() {
        let clock = ManualClock::new(at(10, 10, 0));
        let mut session = session(&clock);

        assert_eq!(session.initialize(), Screen::Playing);
        session.start_new_game(16, false).unwrap();

        assert_eq!(session.stats().games_played, 1);
        assert!(session.stats().game_state.contains_key(&session.key()));
    }

    #[test]
    fn finding_every_word_completes_the_puzzle() {
        let clock = ManualClock::new(at(10, 10, 0));
        let mut session = session(&clock);
        session.initialize();
        session.start_timer();

        let words = session.generated().words.clone();
        let (last, rest) = words.split_last().unwrap();
        for word in rest {
            let events = find(&mut session, word);
            assert!(matches!(&events[..], [GameEvent::WordFound { word: w, .. }] if w == word));
        }

        clock.advance(TimeDelta::seconds(95));
        let events = find(&mut session, last);

        assert_eq!(
            events.last(),
            Some(&GameEvent::PuzzleCompleted {
                elapsed_seconds: 95,
                new_best: true
            })
        );
        assert!(session.is_complete());
        assert_eq!(session.stats().games_completed, 1);
        assert_eq!(session.stats_summary().best_time, Some(95));
        assert!(session.share_text().contains("01:35"));
        assert!(!session.revealed_secret_cells().is_empty());
    }

    #[test]
    fn wrong_selection_changes_nothing() {
        let clock = ManualClock::new(at(10, 10, 0));
        let mut session = session(&clock);
        session.initialize();
        let before = session.stats().clone();

        let events = session.submit_selection(Coord::new(0, 0), Coord::new(1, 5));

        assert_eq!(events, vec![GameEvent::IncorrectSelection { coords: vec![] }]);
        assert_eq!(session.stats(), &before);
        assert!(session.submit_selection(Coord::new(2, 2), Coord::new(2, 2)).is_empty());
    }

    #[test]
    fn progress_survives_a_new_session() {
        let clock = ManualClock::new(at(10, 10, 0));
        let mut first = session(&clock);
        first.initialize();
        let word = first.generated().words[0].clone();
        find(&mut first, &word);

        let storage = first.repository.storage().clone();
        let mut second = Session::new(storage, clock.clone(), small_catalog(), GameConfig::default());
        second.initialize();

        assert_eq!(second.found_words(), &[word]);
        assert!(second.timer_running());
        assert_eq!(second.stats().games_played, 1);
    }

    #[test]
    fn next_morning_is_a_new_day() {
        let clock = ManualClock::new(at(10, 23, 0));
        let mut session = session(&clock);
        session.initialize();
        let evening = session.day();

        clock.set(at(11, 8, 59));
        session.initialize();
        assert_eq!(session.day(), evening);
        assert_eq!(session.stats().games_played, 1);

        clock.set(at(11, 9, 1));
        session.initialize();
        assert_eq!(session.day(), evening + 1);
        assert_eq!(session.stats().games_played, 2);
        assert_eq!(session.stats().game_state.len(), 1);
    }

    #[test]
    fn completed_day_shows_solved_screen() {
        let clock = ManualClock::new(at(10, 10, 0));
        let mut session = session(&clock);
        session.initialize();
        for word in session.generated().words.clone() {
            find(&mut session, &word);
        }

        match session.initialize() {
            Screen::Completed(screen) => {
                assert_eq!(screen.secret, session.puzzle().secret);
                assert_eq!(screen.next_puzzle_in, TimeDelta::hours(23));
            }
            Screen::Playing => panic!("puzzle was already solved"),
        }

        assert_eq!(session.change_grid_size(20).unwrap(), Screen::Playing);
    }

    #[test]
    fn reset_day_clears_progress() {
        let clock = ManualClock::new(at(10, 10, 0));
        let mut session = session(&clock);
        session.initialize();

        let word = session.generated().words[0].clone();
        find(&mut session, &word);

        assert_eq!(session.reset_day(), ResetOutcome::Reset);
        assert!(session.found_words().is_empty());

        session.update(|stats| stats.game_state.clear());
        assert_eq!(session.reset_day(), ResetOutcome::NothingToReset);
    }

    #[test]
    fn reset_after_rollover_starts_the_new_day() {
        let clock = ManualClock::new(at(10, 23, 0));
        let mut session = session(&clock);
        session.initialize();
        let evening = session.day();
        let word = session.generated().words[0].clone();
        find(&mut session, &word);

        clock.set(at(11, 9, 30));
        let morning_key = day_size_key(evening + 1, 16);
        session.update(|stats| {
            stats.record_game_complete(&morning_key, 50);
        });

        assert_eq!(session.reset_day(), ResetOutcome::Reset);
        assert_eq!(session.day(), evening + 1);
        assert_eq!(session.stats().games_played, 2);
        assert_eq!(session.stats().last_played_day, evening + 1);
        assert_eq!(session.stats().game_state.keys().collect::<Vec<_>>(), vec![&morning_key]);
        assert!(session.found_words().is_empty());
    }

    #[test]
    fn verbose_flag_persists() {
        let clock = ManualClock::new(at(10, 10, 0));
        let mut first = session(&clock);
        first.set_verbose(true);
        first.initialize();

        let storage = first.repository.storage().clone();
        let mut second = Session::new(storage, clock.clone(), small_catalog(), GameConfig::default());
        assert!(second.debug().verbose);

        second.set_verbose(false);
        let third = Session::new(second.repository.storage().clone(), clock, small_catalog(), GameConfig::default());
        assert!(!third.debug().verbose);
    }

    #[test]
    fn grid_size_is_validated_and_remembered() {
        let clock = ManualClock::new(at(10, 10, 0));
        let mut session = session(&clock);
        session.initialize();

        assert!(session.change_grid_size(17).is_err());
        assert_eq!(session.grid_size(), 16);

        session.change_grid_size(24).unwrap();
        assert_eq!(session.grid().size(), 24);
        assert_eq!(session.repository.load_grid_size(), Some(24));
    }

    #[test]
    fn debug_date_selects_another_day() {
        let clock = ManualClock::new(at(10, 10, 0));
        let mut session = session(&clock);
        session.initialize();
        let today = session.day();

        assert!(session.set_debug_date("not a date").is_err());
        session.set_debug_date("12/05/2025").unwrap();
        session.initialize();
        assert_eq!(session.day(), today + 2);

        session.clear_debug_date();
        session.initialize();
        assert_eq!(session.day(), today);
    }

    #[test]
    fn damaged_save_still_loads() {
        let clock = ManualClock::new(at(10, 10, 0));
        let mut storage = MemoryStorage::new();
        storage
            .set_item(STATS_KEY, r#"{"gamesPlayed": 7, "gameState": "oops"}"#)
            .unwrap();

        let mut session = Session::new(storage, clock, small_catalog(), GameConfig::default());

        assert_eq!(session.initialize(), Screen::Playing);
        assert_eq!(session.stats().games_played, 8);
    }
}
