use std::fmt::Display;

/// An error reported by the puzzle core.
///
/// Only [`Error::InvalidDebugDate`] and [`Error::UnsupportedGridSize`] ever reach a caller of the
/// session commands. Storage and serialization errors are logged and swallowed at the
/// persistence boundary.
#[derive(Debug)]
pub enum Error {
    /// The debug date override was not a valid `dd/mm/yyyy` calendar date.
    InvalidDebugDate(String),

    /// The requested grid size is not one of the supported sizes.
    UnsupportedGridSize(usize),

    /// A puzzle catalog was built without any puzzles.
    EmptyCatalog,

    /// The backing store could not be read or written.
    Io(std::io::Error),

    /// A persisted value could not be serialized or parsed.
    Serialization(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidDebugDate(input) => {
                write!(f, "Invalid debug date {:?}, expected dd/mm/yyyy", input)
            }
            Error::UnsupportedGridSize(size) => {
                write!(f, "Grid size {} is not supported", size)
            }
            Error::EmptyCatalog => write!(f, "The puzzle catalog has no puzzles"),
            Error::Io(err) => write!(f, "Storage error: {}", err),
            Error::Serialization(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
