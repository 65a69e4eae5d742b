//! Game phases and the legal transitions between them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The coarse-grained mode gating input and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Waiting for the player to pick two elements.
    #[default]
    Idle,
    /// A pair was handed to the oracle and has not settled yet.
    Fusing,
    /// The oracle answered; the last discovery is on display.
    Success,
    /// The oracle failed; nothing was added.
    Error,
}

impl GamePhase {
    /// Check if `self -> to` is one of the legal transitions.
    pub fn can_transition_to(&self, to: GamePhase) -> bool {
        matches!(
            (self, to),
            (GamePhase::Idle, GamePhase::Fusing)
                | (GamePhase::Fusing, GamePhase::Success)
                | (GamePhase::Fusing, GamePhase::Error)
                | (GamePhase::Success, GamePhase::Idle)
                | (GamePhase::Error, GamePhase::Idle)
        )
    }

    /// Picks are only admitted while idle.
    pub fn accepts_picks(&self) -> bool {
        matches!(self, GamePhase::Idle)
    }

    /// Status line shown for this phase.
    pub fn status_line(&self) -> &'static str {
        match self {
            GamePhase::Idle => "Select two elements to fuse",
            GamePhase::Fusing => "Alchemy in progress...",
            GamePhase::Success => "Created something!",
            GamePhase::Error => "Fizzle... Try something else.",
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GamePhase::Idle => "idle",
            GamePhase::Fusing => "fusing",
            GamePhase::Success => "success",
            GamePhase::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal phase transition {from} -> {to}")]
pub struct TransitionError {
    pub from: GamePhase,
    pub to: GamePhase,
}

/// Holds the live phase and refuses transitions outside the table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseMachine {
    phase: GamePhase,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Move to `to`, or leave the phase untouched and report the illegal move.
    pub fn transition(&mut self, to: GamePhase) -> Result<GamePhase, TransitionError> {
        let from = self.phase;
        if !from.can_transition_to(to) {
            return Err(TransitionError { from, to });
        }
        self.phase = to;
        tracing::debug!(%from, %to, "phase transition");
        Ok(from)
    }

    /// Return to idle from any phase. Only a full reset does this.
    pub fn force_idle(&mut self) {
        self.phase = GamePhase::Idle;
    }
}
