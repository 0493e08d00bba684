//! Deterministic combat rules.
//!
//! `combat-core` defines the canonical encounter state, data-declared actions,
//! the modifier pipeline and the execution engine. It performs no I/O and no
//! logging: content is supplied through the oracle traits in [`env`], and
//! every mutation of [`CombatState`] flows through [`engine::CombatEngine`].
//! Planning layers read the state freely and reuse the pure pieces
//! ([`action::is_action_available`], [`modifier::gather_modifiers`],
//! [`combat::HitOdds`]) to reason about hypothetical steps.
pub mod action;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod lifecycle;
pub mod modifier;
pub mod result;
pub mod state;
pub mod zone;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{
    ActionDef, ActionEffect, ActionId, ActionKind, ActionProperties, ActionRange, ActionRecord,
    ActionTiming, ActionTransition, AttackSpec, Command, DiceExpr, PriorActionRequirement,
    RangeKind, ResourceCost, SaveEffect, SaveSpec, TargetKind,
};
pub use config::{CombatConfig, MovementWeights, ScoringWeights, SearchConfig};
pub use engine::{
    ActionError, CombatEngine, ExecuteError, MoveError, TransitionPhase, TransitionPhaseError,
    TurnError,
};
pub use env::{
    AuraDef, CatalogOracle, CombatEnv, CreatureDefinition, Env, OracleError, PassiveTrait, PcgRng,
    RngOracle, RulesOracle,
};
pub use error::{CombatError, ErrorContext, ErrorSeverity};
pub use lifecycle::{DeathPolicy, LifecycleFault, LifecycleRules, LinkedPair, PositionSyncRule};
pub use modifier::{
    ConditionExpr, Diagnostic, Modifier, ModifierAxis, ModifierDefinition, ModifierId,
    ModifierRegistry, ModifierSet, ModifierSource, ModifierValue, RollMode,
};
pub use result::{ActionResult, DeltaEntry, Outcome, StateDelta};
pub use state::{
    Ability, Alliances, Buff, BuffEffect, CombatState, Combatant, CombatantId, ConditionDuration,
    ConditionInstance, ConditionKind, Conditions, CreatureKind, GridPosition, GroupId, HitPoints,
    Resources, Round, SaveBonuses, StateError, TurnBudget,
};
pub use zone::{ZoneAnchor, ZoneEffect, ZoneId, ZonePayload, ZoneTargets, ZoneTrigger};
