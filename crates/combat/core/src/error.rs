//! Common error infrastructure for combat-core.
//!
//! Domain-specific errors (e.g. `MoveError`, `ActionError`) are defined next to
//! the transitions that raise them. This module holds the shared severity
//! classification, the context attached to errors, and the [`CombatError`]
//! trait every error type implements.
//!
//! # Design Principles
//!
//! - **Filtering is not failure**: unavailable actions never reach the engine
//!   as errors; the availability resolver simply omits them
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **Internal faults are distinct**: a broken condition linkage is reported
//!   as [`ErrorSeverity::Internal`] and must not be retried

use crate::state::{CombatantId, GridPosition, Round};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the turn can continue with a different step
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: state inconsistency caused by an engine defect
/// - **Fatal**: state cannot be used any further
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the caller may try an alternative step.
    ///
    /// Examples: destination occupied, target moved out of range
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown combatant, action not in the actor's catalogue
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: one-sided linked condition
    Internal,

    /// Fatal error - combat state corrupted, cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an engine defect.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Combatant that triggered the error (if applicable).
    pub actor: Option<CombatantId>,

    /// Grid cell involved in the error (if applicable).
    pub position: Option<GridPosition>,

    /// Combat round at the time of error.
    pub round: Round,

    /// Execution nonce at the time of error.
    pub nonce: u64,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    /// Creates a new error context for the given round and nonce.
    #[must_use]
    pub const fn new(round: Round, nonce: u64) -> Self {
        Self {
            actor: None,
            position: None,
            round,
            nonce,
            message: None,
        }
    }

    /// Attaches an actor to this context (builder pattern).
    #[must_use]
    pub const fn with_actor(mut self, actor: CombatantId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Attaches a position to this context (builder pattern).
    #[must_use]
    pub const fn with_position(mut self, position: GridPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Attaches a static message to this context (builder pattern).
    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new(Round::FIRST, 0)
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert_eq!(ErrorSeverity::Internal.as_str(), "internal");
    }

    #[test]
    fn test_context_builder() {
        let ctx = ErrorContext::new(Round(3), 7)
            .with_actor(CombatantId(2))
            .with_position(GridPosition::new(1, 4))
            .with_message("blocked");

        assert_eq!(ctx.actor, Some(CombatantId(2)));
        assert_eq!(ctx.position, Some(GridPosition::new(1, 4)));
        assert_eq!(ctx.round, Round(3));
        assert_eq!(ctx.nonce, 7);
        assert_eq!(ctx.message, Some("blocked"));
    }
}
