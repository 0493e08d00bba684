//! Action resolution.
//!
//! Standard actions adjust the actor's own budget or conditions. Declared
//! actions resolve generically from their definition: an attack roll or a
//! saving throw, then damage, healing and effects.

use std::sync::Arc;

use crate::action::{
    ActionDef, ActionEffect, ActionId, ActionKind, ActionTransition, EscapeSpec, ResourceCost,
    SaveEffect, TargetKind, get_available_actions_for_combatant, is_legal_target,
};
use crate::combat::{AttackRoll, classify_attack, resolve_natural};
use crate::env::{CombatEnv, RngOracle, compute_seed, roll_context};
use crate::lifecycle::{self, LifecycleRules};
use crate::modifier::{ModifierAxis, ModifierSet, RollMode, gather_modifiers};
use crate::result::{DeltaEntry, Outcome, StateDelta};
use crate::state::{
    Buff, CombatState, Combatant, CombatantId, ConditionDuration, ConditionInstance,
    ConditionKind,
};

use super::Resolution;
use super::errors::ActionError;

/// Uses an action, optionally against a target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActTransition {
    pub actor: CombatantId,
    pub action: ActionId,
    pub target: Option<CombatantId>,
}

impl ActTransition {
    pub fn new(actor: CombatantId, action: ActionId, target: Option<CombatantId>) -> Self {
        Self {
            actor,
            action,
            target,
        }
    }

    /// Looks the action up among those currently available to the actor.
    fn resolve(&self, state: &CombatState, env: &CombatEnv<'_>) -> Result<Arc<ActionDef>, ActionError> {
        let actor = state
            .combatant(self.actor)
            .ok_or(ActionError::ActorNotFound(self.actor))?;
        get_available_actions_for_combatant(actor, state, env)?
            .into_iter()
            .find(|action| action.id == self.action)
            .ok_or_else(|| ActionError::ActionNotAvailable(self.action.clone()))
    }

    /// Target the action lands on; self-only actions ignore the requested one.
    fn target_of(&self, action: &ActionDef) -> Result<CombatantId, ActionError> {
        match action.target {
            TargetKind::SelfOnly => Ok(self.actor),
            TargetKind::Enemy | TargetKind::Ally => self.target.ok_or(ActionError::MissingTarget),
        }
    }
}

impl ActionTransition for ActTransition {
    type Error = ActionError;
    type Output = Resolution;

    fn actor(&self) -> CombatantId {
        self.actor
    }

    fn pre_validate(&self, state: &CombatState, env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        let action = self.resolve(state, env)?;
        let target_id = self.target_of(&action)?;
        let actor = state
            .combatant(self.actor)
            .ok_or(ActionError::ActorNotFound(self.actor))?;
        let target = state
            .combatant(target_id)
            .ok_or(ActionError::TargetNotFound(target_id))?;
        if !is_legal_target(actor, &action, target, state) {
            return Err(ActionError::InvalidTarget(target_id));
        }
        Ok(())
    }

    fn apply(&self, state: &mut CombatState, env: &CombatEnv<'_>) -> Result<Self::Output, Self::Error> {
        let action = self.resolve(state, env)?;
        let target = self.target_of(&action)?;
        let rules = env.rules()?;
        let rng = env.rng()?;

        let mut delta = spend(state, self.actor, &action)?;

        let outcome = match action.kind {
            ActionKind::Dash => {
                if let Some(actor) = state.combatant_mut(self.actor) {
                    actor.budget.dash();
                }
                Outcome::Applied
            }
            ActionKind::Disengage => {
                let condition =
                    ConditionInstance::new(ConditionKind::Disengaging, ConditionDuration::UntilTurnEnd);
                delta.append(lifecycle::apply_condition(state, rules.lifecycle(), self.actor, condition)?);
                Outcome::Applied
            }
            ActionKind::Dodge => {
                let condition =
                    ConditionInstance::new(ConditionKind::Dodging, ConditionDuration::UntilTurnStart);
                delta.append(lifecycle::apply_condition(state, rules.lifecycle(), self.actor, condition)?);
                Outcome::Applied
            }
            ActionKind::Escape(spec) => escape(state, rules.lifecycle(), rng, self.actor, spec, &mut delta)?,
            ActionKind::Declared => {
                let catalog = env.catalog()?;
                let (actor, defender) = match (state.combatant(self.actor), state.combatant(target)) {
                    (Some(actor), Some(defender)) => (actor.clone(), defender.clone()),
                    (None, _) => return Err(ActionError::ActorNotFound(self.actor)),
                    (_, None) => return Err(ActionError::TargetNotFound(target)),
                };
                let modifiers = gather_modifiers(
                    &actor,
                    Some(&defender),
                    &action,
                    state,
                    catalog,
                    rules.modifiers(),
                );
                resolve_declared(
                    state,
                    rules.lifecycle(),
                    rng,
                    &actor,
                    &defender,
                    &action,
                    &modifiers,
                    &mut delta,
                )?
            }
        };

        Ok(Resolution { outcome, delta })
    }

    fn post_validate(&self, state: &CombatState, env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        lifecycle::verify_links(state, env.rules()?.lifecycle())?;
        Ok(())
    }
}

/// Consumes the budget slot and resource, and records the action in history.
fn spend(state: &mut CombatState, actor: CombatantId, action: &ActionDef) -> Result<StateDelta, ActionError> {
    let mut delta = StateDelta::new();
    let combatant = state
        .combatant_mut(actor)
        .ok_or(ActionError::ActorNotFound(actor))?;
    if !combatant.budget.consume(action.timing) {
        return Err(ActionError::ActionNotAvailable(action.id.clone()));
    }
    if action.cost != ResourceCost::None {
        combatant.resources.consume(&action.id, action.cost);
        delta.push(DeltaEntry::ResourceSpent {
            combatant: actor,
            action: action.id.clone(),
        });
    }
    combatant.history.push(action.record(action.timing));
    Ok(delta)
}

fn escape<R>(
    state: &mut CombatState,
    rules: &LifecycleRules,
    rng: &R,
    actor: CombatantId,
    spec: EscapeSpec,
    delta: &mut StateDelta,
) -> Result<Outcome, ActionError>
where
    R: RngOracle + ?Sized,
{
    let bonus = state
        .combatant(actor)
        .map(|c| c.saves.escape_bonus())
        .ok_or(ActionError::ActorNotFound(actor))?;
    let roll = rng.roll_d20(compute_seed(state.seed, state.nonce, actor.0, roll_context::SAVE));
    if roll as i32 + bonus < spec.dc as i32 {
        return Ok(Outcome::EscapeFailed);
    }
    delta.append(lifecycle::remove_condition(state, rules, actor, spec.condition, spec.source));
    Ok(Outcome::Escaped)
}

#[allow(clippy::too_many_arguments)]
fn resolve_declared<R>(
    state: &mut CombatState,
    rules: &LifecycleRules,
    rng: &R,
    actor: &Combatant,
    target: &Combatant,
    action: &ActionDef,
    modifiers: &ModifierSet,
    delta: &mut StateDelta,
) -> Result<Outcome, ActionError>
where
    R: RngOracle + ?Sized,
{
    let (seed, nonce) = (state.seed, state.nonce);
    let actor_seed = |context: u32| compute_seed(seed, nonce, actor.id.0, context);

    // ===== roll =====
    let mut critical = false;
    let mut saved = false;
    if let Some(attack) = action.attack {
        let mode = modifiers.roll_mode();
        let first = rng.roll_d20(actor_seed(roll_context::ATTACK));
        let second = match mode {
            RollMode::Normal => first,
            RollMode::Advantage | RollMode::Disadvantage => {
                rng.roll_d20(actor_seed(roll_context::ATTACK_SECOND))
            }
        };
        let natural = resolve_natural(first, second, mode);
        let roll = classify_attack(
            natural,
            attack.bonus + modifiers.total(ModifierAxis::Attack),
            target.armor_class + modifiers.total(ModifierAxis::ArmorClass),
            modifiers.auto_crit(),
            modifiers.auto_miss(),
        );
        match roll {
            AttackRoll::Miss => return Ok(Outcome::Miss),
            AttackRoll::Hit => {}
            AttackRoll::Critical => critical = true,
        }
    } else if let Some(save) = action.save {
        let bonus = target.saves.get(save.ability) + modifiers.total(ModifierAxis::Save);
        let roll = rng.roll_d20(compute_seed(seed, nonce, target.id.0, roll_context::SAVE));
        saved = roll as i32 + bonus >= save.dc as i32;
    }

    // ===== damage =====
    let mut dealt = 0;
    if let Some(dice) = action.damage {
        let dice = if critical { dice.doubled_dice() } else { dice };
        let rolled = dice.roll(rng, |die| actor_seed(roll_context::DAMAGE + die)) as i32;
        let mut amount = (rolled + modifiers.total(ModifierAxis::Damage)).max(0) as u32;
        if saved {
            amount = match action.save.map(|s| s.on_save) {
                Some(SaveEffect::Half) => amount / 2,
                _ => 0,
            };
        }
        dealt = damage(state, rules, target.id, amount, delta);
    }

    let outcome = if action.attack.is_some() {
        if critical {
            Outcome::Critical { damage: dealt }
        } else {
            Outcome::Hit { damage: dealt }
        }
    } else if action.save.is_some() {
        if saved {
            Outcome::SaveSucceeded { damage: dealt }
        } else {
            Outcome::SaveFailed { damage: dealt }
        }
    } else {
        Outcome::Applied
    };

    if saved || !state.combatant(target.id).is_some_and(|c| c.is_alive()) {
        return Ok(outcome);
    }

    // ===== healing =====
    if let Some(dice) = action.healing {
        let amount = dice.roll(rng, |die| actor_seed(roll_context::HEALING + die));
        if let Some(holder) = state.combatant_mut(target.id) {
            let before = holder.hp.current;
            holder.hp.heal(amount);
            if holder.hp.current != before {
                delta.push(DeltaEntry::HpChanged {
                    combatant: target.id,
                    before,
                    after: holder.hp.current,
                });
            }
        }
    }

    // ===== effects =====
    for effect in &action.effects {
        match effect {
            ActionEffect::ApplyCondition {
                kind,
                duration,
                escape_dc,
            } => {
                let mut condition = ConditionInstance::new(*kind, *duration).from_source(actor.id);
                condition.escape_dc = *escape_dc;
                delta.append(lifecycle::apply_condition(state, rules, target.id, condition)?);
            }
            ActionEffect::GrantBuff(buff) => {
                let buff = Buff {
                    source: buff.source.or(Some(actor.id)),
                    ..*buff
                };
                if let Some(holder) = state.combatant_mut(target.id) {
                    holder.buffs.push(buff);
                    delta.push(DeltaEntry::BuffAdded {
                        combatant: target.id,
                        effect: buff.effect,
                    });
                }
            }
        }
    }

    Ok(outcome)
}

/// Applies damage and runs death cleanup. Returns the damage actually dealt.
fn damage(
    state: &mut CombatState,
    rules: &LifecycleRules,
    target: CombatantId,
    amount: u32,
    delta: &mut StateDelta,
) -> u32 {
    let Some(holder) = state.combatant_mut(target) else {
        return 0;
    };
    if amount == 0 || !holder.is_alive() {
        return 0;
    }
    let before = holder.hp.current;
    let dealt = holder.hp.damage(amount);
    let after = holder.hp.current;
    delta.push(DeltaEntry::HpChanged {
        combatant: target,
        before,
        after,
    });
    if after == 0 {
        delta.append(lifecycle::handle_death(state, rules, target));
    }
    dealt
}
