//! Session state machine
//!
//! Only the orchestrator switches states. A switch outside the transition
//! table is an orchestrator bug and comes back as an error with the state
//! left untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{SessionError, SessionResult};

/// Current phase of a playthrough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Active gameplay
    InProgress,
    /// Player was caught; movement frozen while the sprite blinks
    PlayerHit,
    /// Level banner between levels or after a hit
    LevelInfo,
    /// Gameplay frozen until pause is pressed again
    Paused,
    /// Waiting for the player to confirm leaving
    LeavePrompt,
    /// Session over
    GameEnd,
}

impl SessionState {
    /// States reachable from `self` in one switch
    pub fn successors(self) -> &'static [SessionState] {
        use SessionState::*;
        match self {
            InProgress => &[PlayerHit, Paused, LeavePrompt, LevelInfo, GameEnd],
            PlayerHit => &[LevelInfo, GameEnd],
            LevelInfo => &[InProgress],
            Paused => &[InProgress],
            LeavePrompt => &[InProgress, GameEnd],
            GameEnd => &[],
        }
    }

    pub fn can_switch_to(self, next: SessionState) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::InProgress => "IN_PROGRESS",
            SessionState::PlayerHit => "PLAYER_HIT",
            SessionState::LevelInfo => "LEVEL_INFO",
            SessionState::Paused => "PAUSED",
            SessionState::LeavePrompt => "LEAVE_PROMPT",
            SessionState::GameEnd => "GAME_END",
        };
        f.write_str(name)
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Every level cleared
    Victory,
    /// Out of lives
    Defeat,
    /// Player confirmed the leave prompt
    Left,
}

/// Holder of the current state; starts in `InProgress`
#[derive(Debug, Clone)]
pub struct StateMachine {
    current: SessionState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: SessionState::InProgress,
        }
    }

    #[inline]
    pub fn current(&self) -> SessionState {
        self.current
    }

    /// Move to `next` if the table allows it
    pub fn switch_state(&mut self, next: SessionState) -> SessionResult<()> {
        if !self.current.can_switch_to(next) {
            log::error!("Invalid state transition: {} -> {}", self.current, next);
            return Err(SessionError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        log::info!("State transition: {} -> {}", self.current, next);
        self.current = next;
        Ok(())
    }
}
