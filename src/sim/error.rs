//! Session error types.
//!
//! Every variant is a contract violation or bad input data: the operation that
//! produced it made no partial change, and the host is expected to tear the
//! session down. Expected empty outcomes (no path, no free cell) are values,
//! never errors.

use std::fmt;

use super::state::SessionState;

/// Top-level error enum for the session engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// A state switch outside the transition table. Indicates an orchestrator bug.
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },

    /// An explosion was requested on the outer wall ring or off the grid.
    InvalidExplosionCell { col: i64, row: i64 },

    /// `tick` was called before `start`.
    NotStarted,

    /// Arena dimensions too small to hold a playable cell.
    InvalidArena { rows: usize, cols: usize },

    /// A level descriptor does not fit the arena.
    InvalidLevel {
        /// 1-based level index
        level: usize,
        reason: String,
    },

    /// Level JSON could not be parsed.
    LevelData(String),

    /// Settings JSON could not be parsed or failed validation.
    Settings(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidTransition { from, to } => {
                write!(f, "invalid session state transition from {} to {}", from, to)
            }
            SessionError::InvalidExplosionCell { col, row } => {
                write!(f, "invalid bomb detonation coordinates: [{}, {}]", col, row)
            }
            SessionError::NotStarted => write!(f, "game session not started yet"),
            SessionError::InvalidArena { rows, cols } => {
                write!(f, "arena must be at least 3x3, got {}x{}", rows, cols)
            }
            SessionError::InvalidLevel { level, reason } => {
                write!(f, "level {} is invalid: {}", level, reason)
            }
            SessionError::LevelData(msg) => write!(f, "level data could not be parsed: {}", msg),
            SessionError::Settings(msg) => write!(f, "invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

/// Convenience alias: a `Result` using `SessionError` as the error type.
pub type SessionResult<T> = Result<T, SessionError>;
