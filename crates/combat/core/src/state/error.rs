//! State management errors.
//!
//! Errors raised while assembling an encounter, before the engine runs.

use crate::error::{CombatError, ErrorSeverity};
use crate::state::{CombatantId, GridPosition};

/// Errors that occur while building or configuring a [`super::CombatState`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    /// A combatant with the same id is already present.
    #[error("combatant {0} already exists")]
    DuplicateCombatant(CombatantId),

    /// The id does not refer to any combatant.
    #[error("combatant {0} not found")]
    UnknownCombatant(CombatantId),

    /// Two combatants cannot share a cell.
    #[error("cell {position} is already occupied by {occupant}")]
    PositionOccupied {
        position: GridPosition,
        occupant: CombatantId,
    },

    /// Initiative order lists the same combatant twice or is empty.
    #[error("invalid initiative order")]
    InvalidInitiative,
}

impl CombatError for StateError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            StateError::DuplicateCombatant(_) => "STATE_DUPLICATE_COMBATANT",
            StateError::UnknownCombatant(_) => "STATE_UNKNOWN_COMBATANT",
            StateError::PositionOccupied { .. } => "STATE_POSITION_OCCUPIED",
            StateError::InvalidInitiative => "STATE_INVALID_INITIATIVE",
        }
    }
}
