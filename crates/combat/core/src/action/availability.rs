//! Which actions a combatant may attempt right now.
//!
//! The predicate is side-effect free and answers `false` for any unmet
//! requirement; unavailable actions are filtered out, never reported as
//! errors.

use std::sync::Arc;

use crate::env::{CombatEnv, OracleError};
use crate::state::{CombatState, Combatant};

use super::standard::escape_actions;
use super::{ActionDef, ActionId, ActionKind};

/// Checks whether `combatant` may attempt `action`.
///
/// Checks, in order:
/// 1. resources (spell slot, recharge timer, daily uses);
/// 2. incapacitating conditions: only `allow_list` actions remain, and this
///    overrides every later check;
/// 3. the prior-action requirement against this turn's history;
/// 4. the budget slot for the action's timing.
///
/// The action's `timing` is taken as given; callers apply timing overrides
/// before asking.
pub fn is_action_available(
    combatant: &Combatant,
    action: &ActionDef,
    state: &CombatState,
    allow_list: &[ActionId],
) -> bool {
    if !combatant.is_alive() {
        return false;
    }

    if !combatant.resources.can_pay(&action.id, action.cost) {
        return false;
    }

    if combatant.conditions.is_incapacitated() {
        return allow_list.contains(&action.id);
    }

    if let Some(requirement) = &action.requires {
        if !combatant.history.iter().any(|record| requirement.is_met_by(record)) {
            return false;
        }
    }

    if let ActionKind::Escape(spec) = action.kind {
        let held = combatant
            .conditions
            .find(spec.condition, spec.source)
            .is_some();
        let source_standing = spec
            .source
            .is_none_or(|source| state.combatant(source).is_some_and(|c| c.is_alive()));
        if !held || !source_standing {
            return false;
        }
    }

    combatant.budget.can_afford(action.timing)
}

/// Every action `combatant` may attempt right now.
///
/// The catalogue is the creature's own actions, the standard actions and one
/// escape action per escapable condition. Passive timing overrides are
/// applied before filtering, so returned definitions carry the timing they
/// are used with.
///
/// # Errors
///
/// Returns `OracleError` if the catalog or rules oracle is missing, or the
/// creature kind is unknown.
pub fn get_available_actions_for_combatant(
    combatant: &Combatant,
    state: &CombatState,
    env: &CombatEnv<'_>,
) -> Result<Vec<Arc<ActionDef>>, OracleError> {
    let catalog = env.catalog()?;
    let rules = env.rules()?;
    let creature = catalog
        .creature(&combatant.kind)
        .ok_or_else(|| OracleError::UnknownCreatureKind(combatant.kind.clone()))?;

    let escapes = escape_actions(combatant).into_iter().map(Arc::new);
    let catalogue = creature
        .actions
        .iter()
        .chain(rules.standard_actions())
        .cloned()
        .chain(escapes);

    let allow_list = rules.incapacitated_allow_list();
    Ok(catalogue
        .map(|action| {
            let timing = creature.timing_of(&action);
            if timing == action.timing {
                action
            } else {
                Arc::new(ActionDef::clone(&action).with_timing(timing))
            }
        })
        .filter(|action| is_action_available(combatant, action, state, allow_list))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{
        ActionProperties, ActionRange, ActionTiming, DiceExpr, PriorActionRequirement,
        ResourceCost, TargetKind, standard,
    };
    use crate::env::{Env, PcgRng, PassiveTrait};
    use crate::state::{
        CombatantId, ConditionDuration, ConditionInstance, ConditionKind, Resources,
    };
    use crate::testing::{TestCatalog, TestRules, combatant, state_with};

    fn scimitar() -> ActionDef {
        ActionDef::weapon_attack("scimitar", ActionRange::melee(5), 4, DiceExpr::new(1, 6, 2))
            .with_properties(ActionProperties::LIGHT)
    }

    fn offhand() -> ActionDef {
        ActionDef::weapon_attack("offhand", ActionRange::melee(5), 4, DiceExpr::new(1, 6, 0))
            .with_timing(ActionTiming::BonusAction)
            .with_requirement(PriorActionRequirement {
                timings: vec![ActionTiming::Action],
                properties: ActionProperties::MELEE_WEAPON | ActionProperties::LIGHT,
            })
    }

    fn fire_breath() -> ActionDef {
        ActionDef::new("breath", ActionTiming::Action, TargetKind::Enemy, ActionRange::ranged(15, 15))
            .with_cost(ResourceCost::Recharge { min_roll: 5 })
    }

    #[test]
    fn test_stunned_actor_has_no_actions() {
        let mut catalog = TestCatalog::default();
        catalog.define("fighter", |d| {
            d.actions.push(Arc::new(scimitar()));
            d.actions.push(Arc::new(fire_breath()));
        });
        let rules = TestRules::default();
        let mut state = state_with(vec![combatant(1, 1, 0, 0), combatant(2, 2, 1, 0)]);

        let env: CombatEnv<'_> = Env::with_all(&catalog, &rules, &PcgRng).as_combat_env();
        let actor = state.combatant(CombatantId(1)).unwrap().clone();
        // scimitar, breath and three standard actions
        assert_eq!(get_available_actions_for_combatant(&actor, &state, &env).unwrap().len(), 5);

        if let Some(c) = state.combatant_mut(CombatantId(1)) {
            c.conditions
                .push(ConditionInstance::new(ConditionKind::Stunned, ConditionDuration::Rounds(1)));
        }
        let stunned = state.combatant(CombatantId(1)).unwrap();
        for action in [scimitar(), fire_breath(), offhand()] {
            assert!(!is_action_available(stunned, &action, &state, &[]));
        }
        assert!(get_available_actions_for_combatant(stunned, &state, &env).unwrap().is_empty());
    }

    #[test]
    fn test_allow_list_overrides_incapacitation() {
        let state = state_with(vec![combatant(1, 1, 0, 0)]);
        let mut stunned = state.combatant(CombatantId(1)).unwrap().clone();
        stunned
            .conditions
            .push(ConditionInstance::new(ConditionKind::Stunned, ConditionDuration::Rounds(1)));
        let dodge = standard::standard_actions().remove(2);
        assert!(is_action_available(&stunned, &dodge, &state, &[ActionId::new(standard::DODGE)]));
    }

    #[test]
    fn test_offhand_requires_light_main_attack() {
        let state = state_with(vec![combatant(1, 1, 0, 0)]);
        let mut actor = state.combatant(CombatantId(1)).unwrap().clone();
        assert!(!is_action_available(&actor, &offhand(), &state, &[]));

        let heavy = ActionDef::weapon_attack("maul", ActionRange::melee(5), 4, DiceExpr::new(2, 6, 2));
        actor.history.push(heavy.record(ActionTiming::Action));
        assert!(!is_action_available(&actor, &offhand(), &state, &[]));

        actor.history.push(scimitar().record(ActionTiming::Action));
        assert!(is_action_available(&actor, &offhand(), &state, &[]));
    }

    #[test]
    fn test_spent_resources_and_budget_close_actions() {
        let state = state_with(vec![combatant(1, 1, 0, 0)]);
        let breath = fire_breath();
        let mut actor = state.combatant(CombatantId(1)).unwrap().clone();
        actor.resources = Resources::for_actions([&breath]);
        assert!(is_action_available(&actor, &breath, &state, &[]));

        actor.resources.consume(&breath.id, breath.cost);
        assert!(!is_action_available(&actor, &breath, &state, &[]));

        let mut tired = state.combatant(CombatantId(1)).unwrap().clone();
        tired.budget.consume(ActionTiming::Action);
        assert!(!is_action_available(&tired, &scimitar(), &state, &[]));
    }

    #[test]
    fn test_timing_override_is_applied() {
        let mut catalog = TestCatalog::default();
        catalog.define("fighter", |d| {
            d.passives.push(PassiveTrait::TimingOverride {
                actions: vec![ActionId::new(standard::DASH), ActionId::new(standard::DISENGAGE)],
                timing: ActionTiming::BonusAction,
            });
        });
        let rules = TestRules::default();
        let state = state_with(vec![combatant(1, 1, 0, 0)]);
        let env: CombatEnv<'_> = Env::with_all(&catalog, &rules, &PcgRng).as_combat_env();

        let mut actor = state.combatant(CombatantId(1)).unwrap().clone();
        actor.budget.consume(ActionTiming::Action);
        let available = get_available_actions_for_combatant(&actor, &state, &env).unwrap();
        let ids: Vec<&str> = available.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec![standard::DASH, standard::DISENGAGE]);
        assert!(available.iter().all(|a| a.timing == ActionTiming::BonusAction));
    }

    #[test]
    fn test_escape_available_while_grappled() {
        let catalog = TestCatalog::default().with_action("fighter", scimitar());
        let rules = TestRules::default();
        let mut state = state_with(vec![combatant(1, 1, 0, 0), combatant(2, 2, 1, 0)]);
        if let Some(c) = state.combatant_mut(CombatantId(1)) {
            c.conditions.push(
                ConditionInstance::new(ConditionKind::Grappled, ConditionDuration::UntilEscape)
                    .from_source(CombatantId(2))
                    .with_escape_dc(12),
            );
        }
        let env: CombatEnv<'_> = Env::with_all(&catalog, &rules, &PcgRng).as_combat_env();
        let actor = state.combatant(CombatantId(1)).unwrap();
        let available = get_available_actions_for_combatant(actor, &state, &env).unwrap();
        assert!(available.iter().any(|a| matches!(a.kind, ActionKind::Escape(_))));
    }
}
