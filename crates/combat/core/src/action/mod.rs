//! Action domain.
//!
//! # Module Structure
//!
//! - `profile`: static action definitions ([`ActionDef`]) and their parts
//! - `dice`: dice expressions
//! - `standard`: Dash, Disengage, Dodge and generated escape actions
//! - `availability`: which actions a combatant may attempt right now
//! - `targeting`: legal targets for an action
//! - `command`: commands submitted to the engine

pub mod availability;
pub mod command;
pub mod dice;
pub mod profile;
pub mod standard;
pub mod targeting;

pub use availability::{get_available_actions_for_combatant, is_action_available};
pub use command::Command;
pub use dice::{DiceExpr, DiceParseError};
pub use profile::{
    ActionDef, ActionEffect, ActionId, ActionKind, ActionProperties, ActionRange, ActionRecord,
    ActionTiming, AttackSpec, EscapeSpec, PriorActionRequirement, RangeKind, ResourceCost,
    SaveEffect, SaveSpec, TargetKind,
};
pub use standard::{escape_action_for, escape_actions, standard_actions};
pub use targeting::{is_legal_target, legal_targets};

use crate::env::CombatEnv;
use crate::state::{CombatState, CombatantId};

/// Defines how a command mutates combat state.
///
/// Hooks receive read-only access to the oracles through `env`. The
/// validation hooks must stay side-effect free.
pub trait ActionTransition {
    type Error;
    type Output;

    /// Returns the combatant performing this transition.
    fn actor(&self) -> CombatantId;

    /// Validates pre-conditions using the state **before** mutation.
    fn pre_validate(&self, _state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies the transition. Implementations may assume `pre_validate`
    /// has already succeeded.
    fn apply(&self, state: &mut CombatState, env: &CombatEnv<'_>) -> Result<Self::Output, Self::Error>;

    /// Validates post-conditions using the state **after** mutation.
    fn post_validate(&self, _state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}
