//! Error type shared by the contest, the codec and the storage collaborators.

use std::io;

use thiserror::Error;

/// Errors raised by contest operations.
///
/// Undo and redo on empty logs are not errors; they are no-ops.
#[derive(Error, Debug)]
pub enum GameError {
    /// The starting position descriptor is not a valid FEN.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// A saved game is missing, unparsable or does not replay.
    #[error("cannot load game: {0}")]
    Load(String),

    /// Background computation broke its contract, e.g. reported
    /// readiness without a candidate move.
    #[error("engine invariant violated: {0}")]
    EngineInvariant(String),

    /// The requested move is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// A square identifier could not be resolved.
    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The preference store could not be read or written.
    #[error("preference store error: {0}")]
    Preferences(String),
}

/// Result type for contest operations.
pub type Result<T> = std::result::Result<T, GameError>;

impl GameError {
    /// Whether the contest can no longer be trusted after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::EngineInvariant(_))
    }
}
