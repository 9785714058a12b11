//! # Intents
//!
//! The discrete requests an outer layer feeds into a game session.

use crate::game::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete player request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Turn the player as soon as the turn is legal
    Move(Direction),
    TogglePause,
    /// Hand steering to or take it back from the autopilot
    ToggleAutopilot,
    NewGame,
    Quit,
}

impl Intent {
    /// Whether the intent affects the running game rather than the session.
    pub fn is_gameplay(self) -> bool {
        matches!(self, Intent::Move(_))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Move(direction) => write!(f, "move {:?}", direction),
            Intent::TogglePause => write!(f, "toggle pause"),
            Intent::ToggleAutopilot => write!(f, "toggle autopilot"),
            Intent::NewGame => write!(f, "new game"),
            Intent::Quit => write!(f, "quit"),
        }
    }
}
