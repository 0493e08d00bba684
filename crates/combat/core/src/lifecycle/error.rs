use crate::error::{CombatError, ErrorSeverity};
use crate::state::{CombatantId, ConditionKind};

/// Failures of dependent-effect propagation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifecycleFault {
    #[error("combatant {0} not found")]
    UnknownCombatant(CombatantId),

    #[error("combatant {combatant} cannot hold more conditions")]
    CapacityExceeded { combatant: CombatantId },

    /// A linked condition whose counterpart is missing.
    #[error("{condition} on {holder} is linked to {partner}, which holds no counterpart")]
    OneSidedLink {
        holder: CombatantId,
        condition: ConditionKind,
        partner: CombatantId,
    },
}

impl CombatError for LifecycleFault {
    fn severity(&self) -> ErrorSeverity {
        match self {
            LifecycleFault::UnknownCombatant(_) => ErrorSeverity::Validation,
            LifecycleFault::CapacityExceeded { .. } => ErrorSeverity::Recoverable,
            LifecycleFault::OneSidedLink { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            LifecycleFault::UnknownCombatant(_) => "LIFECYCLE_UNKNOWN_COMBATANT",
            LifecycleFault::CapacityExceeded { .. } => "LIFECYCLE_CAPACITY_EXCEEDED",
            LifecycleFault::OneSidedLink { .. } => "LIFECYCLE_ONE_SIDED_LINK",
        }
    }
}
