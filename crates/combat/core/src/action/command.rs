use crate::state::{CombatantId, GridPosition};

use super::ActionId;

/// A single step of a turn, as submitted to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Walk toward `to`; the path is truncated to the remaining movement.
    Move { to: GridPosition },
    /// Use an available action, optionally on a target.
    Act {
        action: ActionId,
        target: Option<CombatantId>,
    },
    /// End the turn.
    Pass,
}

impl Command {
    pub fn act(action: impl Into<String>, target: CombatantId) -> Self {
        Command::Act {
            action: ActionId::new(action),
            target: Some(target),
        }
    }

    pub fn act_self(action: impl Into<String>) -> Self {
        Command::Act {
            action: ActionId::new(action),
            target: None,
        }
    }

    pub fn move_to(x: i32, y: i32) -> Self {
        Command::Move {
            to: GridPosition::new(x, y),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Command::Pass)
    }
}
