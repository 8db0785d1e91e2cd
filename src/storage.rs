//! Device-local key-value persistence.
//!
//! The host decides where values live by implementing [`Storage`]. [`StatsRepository`] sits on
//! top of it and owns the fixed keys the game writes. Every write failure is logged and
//! swallowed there, so the in-memory session never notices a broken store.

use std::{
    collections::HashMap,
    fs,
    io,
    path::{Path, PathBuf},
};

use log::warn;
use serde_json::{Map, Value};

use crate::{stats::Stats, Error, Result};

/// Key of the persisted [`Stats`] blob.
pub const STATS_KEY: &str = "wordSearchStats";

/// Key of the last selected grid size.
pub const GRID_SIZE_KEY: &str = "wordSearchGridSize";

/// A string key-value store, in the spirit of browser local storage.
pub trait Storage {
    /// Reads the value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Deleting a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// Keeps everything in memory. Useful for tests or hosts without a disk.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Stores each key as a file inside a directory, created on first write.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Uses `dir` as the backing directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' { ch } else { '_' })
            .collect();
        self.dir.join(name)
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Loads and saves the game's persisted values through a [`Storage`].
#[derive(Debug)]
pub struct StatsRepository<S> {
    storage: S,
}

impl<S: Storage> StatsRepository<S> {
    /// Wraps `storage`.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The underlying store, mutably.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Loads the stats, falling back to defaults for anything missing or unreadable.
    pub fn load(&self) -> Stats {
        match self.storage.get_item(STATS_KEY) {
            Ok(Some(blob)) => merge_with_defaults(&blob),
            Ok(None) => Stats::default(),
            Err(err) => {
                warn!("could not read stats, starting fresh: {err}");
                Stats::default()
            }
        }
    }

    /// Persists `stats`. Failures are logged and otherwise ignored.
    pub fn save(&mut self, stats: &Stats) {
        let result = serde_json::to_string(stats)
            .map_err(Error::from)
            .and_then(|blob| self.storage.set_item(STATS_KEY, &blob));

        if let Err(err) = result {
            warn!("could not save stats: {err}");
        }
    }

    /// The last selected grid size, if one was saved and parses.
    pub fn load_grid_size(&self) -> Option<usize> {
        self.storage
            .get_item(GRID_SIZE_KEY)
            .ok()
            .flatten()
            .and_then(|value| value.trim().parse().ok())
    }

    /// Persists the selected grid size. Failures are logged and otherwise ignored.
    pub fn save_grid_size(&mut self, size: usize) {
        if let Err(err) = self.storage.set_item(GRID_SIZE_KEY, &size.to_string()) {
            warn!("could not save grid size: {err}");
        }
    }
}

/// Parses a stats blob field by field over the defaults.
///
/// Each top-level field that deserializes is kept. A field with an unexpected shape is dropped
/// and its default used instead, so old or damaged saves still load.
pub fn merge_with_defaults(blob: &str) -> Stats {
    let loaded = match serde_json::from_str::<Value>(blob) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) | Err(_) => {
            warn!("stored stats are not an object, using defaults");
            return Stats::default();
        }
    };

    if let Ok(stats) = serde_json::from_value::<Stats>(Value::Object(loaded.clone())) {
        return stats;
    }

    let mut merged = Map::new();
    for (key, value) in loaded {
        merged.insert(key.clone(), value);

        if serde_json::from_value::<Stats>(Value::Object(merged.clone())).is_err() {
            warn!("dropping malformed stats field {key:?}");
            merged.remove(&key);
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}
