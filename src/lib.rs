#![warn(missing_docs)]

//! # Palabrix
//!
//! The core of a daily word search: the same puzzle for every player on a given puzzle day,
//! plus the bookkeeping of what each player found and how fast.
//!
//! A [`Session`] ties the parts together. It resolves the puzzle day from a [`Clock`], picks
//! the day's [`Puzzle`] from a [`Catalog`], generates the [`Grid`] from a seeded [`Lcg`], checks
//! selections and keeps [`Stats`] in a host-provided [`Storage`].
//!
//! ```
//! use palabrix::{Catalog, Coord, GameConfig, MemoryStorage, Screen, Session, SystemClock};
//!
//! let mut session = Session::new(MemoryStorage::new(), SystemClock, Catalog::builtin(), GameConfig::default());
//!
//! if session.initialize() == Screen::Playing {
//!     let events = session.submit_selection(Coord::new(0, 0), Coord::new(0, 3));
//!     assert!(!events.is_empty());
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod day;
mod error;
pub mod generator;
pub mod grid;
pub mod rng;
pub mod selection;
pub mod session;
pub mod stats;
pub mod storage;

pub use catalog::{Catalog, Puzzle};
pub use config::{DayResolver, DebugConfig, GameConfig};
pub use day::{day_identifier, format_time, Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use generator::{generate, GeneratedPuzzle};
pub use grid::{Cell, Coord, Direction, Grid, Placement, WordSpan};
pub use rng::Lcg;
pub use selection::{resolve_line_selection, try_match, Selection};
pub use session::{CompletedScreen, GameEvent, ResetOutcome, Screen, Session, StatsSummary, WordEntry};
pub use stats::{FoundWord, GameState, Stats};
pub use storage::{FileStorage, MemoryStorage, StatsRepository, Storage};
