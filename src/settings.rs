//! Session settings
//!
//! Chosen by the host before a session starts. Loaded from JSON; any missing
//! field falls back to its default.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_COLS, DEFAULT_LIVES, DEFAULT_ROWS};
use crate::sim::{SessionError, SessionResult};

/// Seed used when the host does not pick one
pub const DEFAULT_SEED: u64 = 0x5EED_B0B5;

/// Settings for a single playthrough
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Lives at the start of the session
    pub lives: u8,
    /// Procedurally generated levels instead of the level list
    pub endless: bool,
    /// Arena rows (including the outer wall ring)
    pub rows: usize,
    /// Arena columns (including the outer wall ring)
    pub cols: usize,
    /// RNG seed (enemy AI, endless generation)
    pub seed: u64,
    /// Initial viewport size in canvas units
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            lives: DEFAULT_LIVES,
            endless: false,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            seed: DEFAULT_SEED,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

impl SessionSettings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> SessionResult<Self> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| SessionError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to JSON
    pub fn to_json(&self) -> SessionResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SessionError::Settings(e.to_string()))
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> SessionResult<()> {
        if self.lives == 0 {
            return Err(SessionError::Settings("lives must be at least 1".into()));
        }
        if self.rows < 3 || self.cols < 3 {
            return Err(SessionError::InvalidArena {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(SessionError::Settings(format!(
                "viewport must be positive, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        Ok(())
    }
}
