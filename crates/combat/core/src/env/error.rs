//! Oracle access errors.

use crate::action::ActionId;
use crate::error::{CombatError, ErrorSeverity};
use crate::state::CreatureKind;

/// Errors that occur when accessing oracle data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// CatalogOracle is not available in the environment.
    #[error("CatalogOracle not available")]
    CatalogNotAvailable,

    /// RulesOracle is not available in the environment.
    #[error("RulesOracle not available")]
    RulesNotAvailable,

    /// RngOracle is not available in the environment.
    #[error("RngOracle not available")]
    RngNotAvailable,

    /// No definition is registered for the creature kind.
    #[error("creature kind '{0}' not found")]
    UnknownCreatureKind(CreatureKind),

    /// The creature kind does not define the action.
    #[error("action '{action}' not defined for '{kind}'")]
    UnknownAction { kind: CreatureKind, action: ActionId },
}

impl CombatError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            CatalogNotAvailable | RulesNotAvailable | RngNotAvailable => ErrorSeverity::Fatal,
            UnknownCreatureKind(_) | UnknownAction { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            CatalogNotAvailable => "ORACLE_CATALOG_NOT_AVAILABLE",
            RulesNotAvailable => "ORACLE_RULES_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            UnknownCreatureKind(_) => "ORACLE_UNKNOWN_CREATURE_KIND",
            UnknownAction { .. } => "ORACLE_UNKNOWN_ACTION",
        }
    }
}
