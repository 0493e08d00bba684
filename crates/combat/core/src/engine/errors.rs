//! Error types for the command execution pipeline.

use crate::action::ActionId;
use crate::env::OracleError;
use crate::error::{CombatError, ErrorContext, ErrorSeverity};
use crate::lifecycle::LifecycleFault;
use crate::state::{CombatantId, GridPosition};

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

// ============================================================================
// Move
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("combatant {0} not found")]
    ActorNotFound(CombatantId),

    /// Grappled, restrained or incapacitated.
    #[error("combatant {0} cannot move")]
    Immobilized(CombatantId),

    #[error("no movement left this round")]
    NoMovementLeft,

    #[error("already standing on {0}")]
    NoProgress(GridPosition),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleFault),
}

impl CombatError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            MoveError::ActorNotFound(_) | MoveError::NoProgress(_) => ErrorSeverity::Validation,
            MoveError::Immobilized(_) | MoveError::NoMovementLeft => ErrorSeverity::Recoverable,
            MoveError::Oracle(error) => error.severity(),
            MoveError::Lifecycle(fault) => fault.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            MoveError::ActorNotFound(_) => "MOVE_ACTOR_NOT_FOUND",
            MoveError::Immobilized(_) => "MOVE_IMMOBILIZED",
            MoveError::NoMovementLeft => "MOVE_NO_MOVEMENT_LEFT",
            MoveError::NoProgress(_) => "MOVE_NO_PROGRESS",
            MoveError::Oracle(error) => error.error_code(),
            MoveError::Lifecycle(fault) => fault.error_code(),
        }
    }
}

// ============================================================================
// Act
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("combatant {0} not found")]
    ActorNotFound(CombatantId),

    /// Not in the actor's catalogue, or filtered out by availability.
    #[error("action '{0}' is not available")]
    ActionNotAvailable(ActionId),

    #[error("target {0} not found")]
    TargetNotFound(CombatantId),

    #[error("action requires a target")]
    MissingTarget,

    #[error("target {0} is not a legal target")]
    InvalidTarget(CombatantId),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleFault),
}

impl CombatError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            ActorNotFound(_) | TargetNotFound(_) | MissingTarget => ErrorSeverity::Validation,
            ActionNotAvailable(_) | InvalidTarget(_) => ErrorSeverity::Recoverable,
            Oracle(error) => error.severity(),
            Lifecycle(fault) => fault.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            ActorNotFound(_) => "ACTION_ACTOR_NOT_FOUND",
            ActionNotAvailable(_) => "ACTION_NOT_AVAILABLE",
            TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            MissingTarget => "ACTION_MISSING_TARGET",
            InvalidTarget(_) => "ACTION_INVALID_TARGET",
            Oracle(error) => error.error_code(),
            Lifecycle(fault) => fault.error_code(),
        }
    }
}

// ============================================================================
// Turn
// ============================================================================

/// Errors raised while ending one turn and starting the next.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnError {
    #[error("initiative order has not been set")]
    NoInitiative,

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleFault),
}

impl CombatError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            TurnError::NoInitiative => ErrorSeverity::Validation,
            TurnError::Oracle(error) => error.severity(),
            TurnError::Lifecycle(fault) => fault.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            TurnError::NoInitiative => "TURN_NO_INITIATIVE",
            TurnError::Oracle(error) => error.error_code(),
            TurnError::Lifecycle(fault) => fault.error_code(),
        }
    }
}

// ============================================================================
// Execute
// ============================================================================

/// Errors surfaced while executing a command through the combat engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecuteError {
    #[error("move failed: {0}")]
    Move(TransitionPhaseError<MoveError>),

    #[error("action failed: {0}")]
    Act(TransitionPhaseError<ActionError>),

    #[error("pass failed: {0}")]
    Pass(TransitionPhaseError<TurnError>),

    #[error("encounter could not begin: {0}")]
    Begin(TurnError),

    #[error("combatant {actor} is not the current actor")]
    ActorNotCurrent {
        actor: CombatantId,
        current: Option<CombatantId>,
        #[cfg_attr(feature = "serde", serde(skip))]
        context: ErrorContext,
    },

    #[error("combatant {actor} is defeated")]
    ActorDefeated {
        actor: CombatantId,
        #[cfg_attr(feature = "serde", serde(skip))]
        context: ErrorContext,
    },
}

impl ExecuteError {
    /// Phase that failed, for transition errors.
    pub fn phase(&self) -> Option<TransitionPhase> {
        match self {
            ExecuteError::Move(e) => Some(e.phase),
            ExecuteError::Act(e) => Some(e.phase),
            ExecuteError::Pass(e) => Some(e.phase),
            _ => None,
        }
    }
}

impl CombatError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ExecuteError::Move(e) => e.error.severity(),
            ExecuteError::Act(e) => e.error.severity(),
            ExecuteError::Pass(e) => e.error.severity(),
            ExecuteError::Begin(e) => e.severity(),
            ExecuteError::ActorNotCurrent { .. } => ErrorSeverity::Validation,
            ExecuteError::ActorDefeated { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            ExecuteError::ActorNotCurrent { context, .. }
            | ExecuteError::ActorDefeated { context, .. } => Some(context),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ExecuteError::Move(e) => e.error.error_code(),
            ExecuteError::Act(e) => e.error.error_code(),
            ExecuteError::Pass(e) => e.error.error_code(),
            ExecuteError::Begin(e) => e.error_code(),
            ExecuteError::ActorNotCurrent { .. } => "EXECUTE_ACTOR_NOT_CURRENT",
            ExecuteError::ActorDefeated { .. } => "EXECUTE_ACTOR_DEFEATED",
        }
    }
}
