//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the engine, the oracles and turn providers so callers
//! can bubble them up with consistent severity and context.
use std::fmt;

use combat_core::{
    CombatError, CombatantId, ErrorContext, ErrorSeverity, ExecuteError, OracleError, Round,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no combatant holds the current turn")]
    NoCurrentActor,

    #[error("{kind} turn provider not set")]
    ProviderNotSet { kind: ProviderKind },

    #[error("combatant {0} is not in the encounter")]
    UnknownCombatant(CombatantId),

    #[error("scripted provider has no turn queued for {actor}")]
    ScriptExhausted { actor: CombatantId },

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("encounter could not begin")]
    Begin(#[source] ExecuteError),

    #[error("command for {actor} failed in {round}")]
    Execute {
        actor: CombatantId,
        round: Round,
        #[source]
        source: ExecuteError,
    },
}

impl RuntimeError {
    pub(crate) fn execute(actor: CombatantId, round: Round, source: ExecuteError) -> Self {
        RuntimeError::Execute {
            actor,
            round,
            source,
        }
    }
}

impl CombatError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::NoCurrentActor | RuntimeError::ScriptExhausted { .. } => {
                ErrorSeverity::Recoverable
            }
            RuntimeError::ProviderNotSet { .. } | RuntimeError::UnknownCombatant(_) => {
                ErrorSeverity::Validation
            }
            RuntimeError::Oracle(error) => error.severity(),
            RuntimeError::Begin(source) | RuntimeError::Execute { source, .. } => source.severity(),
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            RuntimeError::Begin(source) | RuntimeError::Execute { source, .. } => source.context(),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::NoCurrentActor => "RUNTIME_NO_CURRENT_ACTOR",
            RuntimeError::ProviderNotSet { .. } => "RUNTIME_PROVIDER_NOT_SET",
            RuntimeError::UnknownCombatant(_) => "RUNTIME_UNKNOWN_COMBATANT",
            RuntimeError::ScriptExhausted { .. } => "RUNTIME_SCRIPT_EXHAUSTED",
            RuntimeError::Oracle(error) => error.error_code(),
            RuntimeError::Begin(_) => "RUNTIME_BEGIN_FAILED",
            RuntimeError::Execute { source, .. } => source.error_code(),
        }
    }
}

/// Which registered provider drives a combatant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderKind {
    /// Turn planner.
    Planner,
    /// Pre-recorded commands (player input, fixtures).
    Scripted,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Planner => "planner",
            ProviderKind::Scripted => "scripted",
        };
        write!(f, "{}", label)
    }
}
