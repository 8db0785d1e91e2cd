//! Game settings and the debug overrides used to demo day rollovers.

use chrono::{DateTime, FixedOffset};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    day::{self, Clock},
    storage::Storage,
    Error, Result,
};

/// Key under which the verbose flag is persisted.
pub const DEBUG_KEY: &str = "DEBUG_WORDSEARCH";

/// Key under which the forced date is persisted.
pub const DEBUG_DATE_KEY: &str = "DEBUG_WORDSEARCH_DATE";

/// Grid sizes offered to players.
pub const SUPPORTED_SIZES: [usize; 3] = [16, 20, 24];

/// Which grid sizes may be played and which one a new player starts with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Sizes a game may be started with.
    pub sizes: Vec<usize>,

    /// Size used when none was saved.
    pub default_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            sizes: SUPPORTED_SIZES.to_vec(),
            default_size: SUPPORTED_SIZES[0],
        }
    }
}

impl GameConfig {
    /// Returns `size` if it may be played.
    pub fn validate_size(&self, size: usize) -> Result<usize> {
        if size > 0 && self.sizes.contains(&size) {
            Ok(size)
        } else {
            Err(Error::UnsupportedGridSize(size))
        }
    }
}

/// Overrides for testing and demos: verbose tracing and a forced "current" date.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebugConfig {
    /// Whether session tracing is logged.
    pub verbose: bool,

    /// When set, puzzle days are resolved from this instant instead of the clock.
    pub forced_date: Option<DateTime<FixedOffset>>,
}

impl DebugConfig {
    /// Reads persisted overrides. Unreadable values are ignored.
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Self {
        let verbose = matches!(storage.get_item(DEBUG_KEY), Ok(Some(v)) if v == "true");
        let forced_date = storage
            .get_item(DEBUG_DATE_KEY)
            .ok()
            .flatten()
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok());

        Self {
            verbose,
            forced_date,
        }
    }

    /// Persists the overrides. Failures are logged and otherwise ignored.
    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) {
        let result = storage
            .set_item(DEBUG_KEY, if self.verbose { "true" } else { "false" })
            .and_then(|()| match self.forced_date {
                Some(date) => storage.set_item(DEBUG_DATE_KEY, &date.to_rfc3339()),
                None => storage.remove_item(DEBUG_DATE_KEY),
            });

        if let Err(err) = result {
            warn!("could not save debug settings: {err}");
        }
    }

    /// Forces puzzle days to resolve from 09:00 on `input`, given as `dd/mm/yyyy`.
    ///
    /// On error the current override is left unchanged.
    pub fn set_date(&mut self, input: &str, offset: FixedOffset) -> Result<()> {
        let date = day::parse_debug_date(input, offset)?;
        info!("forcing puzzle date {}", date.format("%d/%m/%Y"));
        self.forced_date = Some(date);
        Ok(())
    }

    /// Removes the forced date.
    pub fn clear_date(&mut self) {
        self.forced_date = None;
    }
}

/// Resolves puzzle days from a clock, honoring a forced debug date.
#[derive(Clone, Debug)]
pub struct DayResolver<C> {
    clock: C,
    forced_date: Option<DateTime<FixedOffset>>,
}

impl<C: Clock> DayResolver<C> {
    /// Creates a resolver reading `clock` unless `debug` forces a date.
    pub fn new(clock: C, debug: &DebugConfig) -> Self {
        Self {
            clock,
            forced_date: debug.forced_date,
        }
    }

    /// The current time according to the clock. The forced date does not affect it.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    /// The instant puzzle days are computed from.
    pub fn reference_now(&self) -> DateTime<FixedOffset> {
        self.forced_date.unwrap_or_else(|| self.clock.now())
    }

    /// The current puzzle day.
    pub fn current_day(&self) -> i64 {
        day::day_identifier(&self.reference_now())
    }

    /// Replaces the forced date.
    pub fn set_forced_date(&mut self, forced_date: Option<DateTime<FixedOffset>>) {
        self.forced_date = forced_date;
    }
}
