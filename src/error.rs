//! Error types for everything outside the simulation proper.
//!
//! None of these are fatal: callers log them and fall back to defaults.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum GameError {
    /// Reading or writing a file failed.
    Io(io::Error),
    /// The score file exists but does not decode.
    CorruptScores(String),
    /// The configuration file is not valid TOML for `GameConfig`.
    Config(toml::de::Error),
}

pub type GameResult<T> = Result<T, GameError>;

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Io(err) => write!(f, "I/O error: {}", err),
            GameError::CorruptScores(msg) => write!(f, "corrupt score file: {}", msg),
            GameError::Config(err) => write!(f, "invalid config: {}", err),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Io(err) => Some(err),
            GameError::Config(err) => Some(err),
            GameError::CorruptScores(_) => None,
        }
    }
}

impl From<io::Error> for GameError {
    fn from(err: io::Error) -> Self {
        GameError::Io(err)
    }
}

impl From<toml::de::Error> for GameError {
    fn from(err: toml::de::Error) -> Self {
        GameError::Config(err)
    }
}
