//! Expected-value scoring of turn steps.
//!
//! The [`ScoringEngine`] turns an action against a target, or a move to a
//! cell, into a [`StepScore`]. Action scores come from the full outcome
//! distribution ([`estimate`]) under the modifiers `combat-core` gathers for
//! the attempt; move scores come from the actor's movement [`Desire`].
//!
//! # Score Components
//!
//! Every component is already weighted by [`ScoringWeights`]:
//!
//! - **damage**: expected damage capped at the target's HP
//! - **kill**: kill probability × the target's damage output
//! - **control**: target output × condition impact × expected rounds × success
//! - **healing** / **buff**: value delivered to an ally
//! - **movement**: potential the move gains under the turn's desire
//! - **defense**: incoming damage a defensive action prevents
//! - **risk**: expected incoming damage at the actor's position (subtracted)
//!
//! ```text
//! value = max(0, damage + kill + control + healing + buff + movement + defense - risk)
//! ```
//!
//! Step values never go below zero, so a plan's value never decreases as
//! steps are added.

pub mod cache;
pub mod estimate;
pub mod movement;

use std::collections::BTreeSet;

pub use cache::{BaseValueCache, CacheKey};
pub use estimate::{ActionEstimate, condition_impact, estimate_action, expected_condition_rounds};
pub use movement::{Desire, DesireInputs, TargetPull, ThreatPush, Vector, desire_at};

use combat_core::combat::save_success_probability;
use combat_core::modifier::gather_modifiers;
use combat_core::{
    ActionDef, ActionEffect, ActionKind, ActionTiming, BuffEffect, CombatConfig, CombatEnv,
    CombatState, Combatant, ConditionDuration, ConditionKind, GridPosition, ModifierSet,
    OracleError, RangeKind, RollMode, ScoringWeights,
};
use tracing::warn;

use estimate::imposed_conditions;

/// Rounds a buff is valued over at most; fights rarely outlast it.
const BUFF_HORIZON_ROUNDS: f64 = 3.0;
/// Share of incoming damage a Dodge prevents.
const DODGE_REDUCTION: f64 = 0.5;

/// Weighted breakdown of one step's value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepScore {
    pub damage: f64,
    pub kill: f64,
    pub control: f64,
    pub healing: f64,
    pub buff: f64,
    pub movement: f64,
    pub defense: f64,
    pub risk: f64,
}

impl StepScore {
    /// Net value, floored at zero.
    pub fn value(&self) -> f64 {
        let gain = self.damage
            + self.kill
            + self.control
            + self.healing
            + self.buff
            + self.movement
            + self.defense;
        (gain - self.risk).max(0.0)
    }
}

/// Scores steps for one actor against a borrowed state.
///
/// The engine never mutates the state; hypothetical actors (at a planned
/// position, with a planned budget) are passed in by value.
pub struct ScoringEngine<'a> {
    state: &'a CombatState,
    env: CombatEnv<'a>,
    weights: &'a ScoringWeights,
    cache: &'a mut BaseValueCache,
    reported: BTreeSet<String>,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(
        state: &'a CombatState,
        env: CombatEnv<'a>,
        weights: &'a ScoringWeights,
        cache: &'a mut BaseValueCache,
    ) -> Self {
        cache.sync_round(state.round);
        Self {
            state,
            env,
            weights,
            cache,
            reported: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> &'a CombatState {
        self.state
    }

    // ========================================================================
    // Base values
    // ========================================================================

    /// Best unmodified expected damage `attacker` deals `target` in one turn:
    /// its best main action plus its best bonus action.
    ///
    /// # Errors
    ///
    /// Returns `OracleError` if the catalog is missing or the attacker's kind
    /// is unknown.
    pub fn base_value(&mut self, attacker: &Combatant, target: &Combatant) -> Result<f64, OracleError> {
        let key = CacheKey::new(attacker.id, target.id, self.state.round);
        if let Some(value) = self.cache.get(key) {
            return Ok(value);
        }

        let catalog = self.env.catalog()?;
        let creature = catalog
            .creature(&attacker.kind)
            .ok_or_else(|| OracleError::UnknownCreatureKind(attacker.kind.clone()))?;
        let unmodified = ModifierSet::new();
        let (mut main, mut bonus) = (0.0_f64, 0.0_f64);
        for action in creature.actions.iter().filter(|a| a.is_hostile()) {
            let expected = estimate_action(action, &unmodified, target).expected_damage;
            match creature.timing_of(action) {
                ActionTiming::Action => main = main.max(expected),
                ActionTiming::BonusAction => bonus = bonus.max(expected),
                ActionTiming::Reaction | ActionTiming::Free => {}
            }
        }

        let value = main + bonus;
        self.cache.insert(key, value);
        Ok(value)
    }

    /// Best damage output of `combatant` against any of its living enemies.
    pub fn output(&mut self, combatant: &Combatant) -> Result<f64, OracleError> {
        let state = self.state;
        let mut best = 0.0_f64;
        for enemy in state.living().filter(|c| state.is_enemy(combatant.id, c.id)) {
            best = best.max(self.base_value(combatant, enemy)?);
        }
        Ok(best)
    }

    /// Expected damage `actor` takes next round while standing at `position`.
    ///
    /// Counts every living enemy that could reach the position with its
    /// movement plus weapon reach. Dodging halves the total.
    pub fn incoming_at(&mut self, actor: &Combatant, position: GridPosition) -> Result<f64, OracleError> {
        let state = self.state;
        let mut total = 0.0;
        for enemy in state.living().filter(|c| state.is_enemy(actor.id, c.id)) {
            if enemy.conditions.is_incapacitated() {
                continue;
            }
            let reach = self.reach_of(enemy)?;
            if enemy.position.distance_feet(position) <= enemy.effective_speed() + reach {
                total += self.base_value(enemy, actor)?;
            }
        }
        if actor.conditions.has(ConditionKind::Dodging) {
            total *= 1.0 - DODGE_REDUCTION;
        }
        Ok(total)
    }

    fn reach_of(&self, combatant: &Combatant) -> Result<u32, OracleError> {
        let catalog = self.env.catalog()?;
        Ok(catalog
            .creature(&combatant.kind)
            .into_iter()
            .flat_map(|c| c.actions.iter())
            .filter(|a| a.is_hostile())
            .map(|a| a.range.max())
            .max()
            .unwrap_or(CombatConfig::CELL_FEET))
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Scores `actor` using `action` on `target`.
    ///
    /// # Errors
    ///
    /// Returns `OracleError` if an oracle is missing or a creature kind is
    /// unknown.
    pub fn score_action(
        &mut self,
        actor: &Combatant,
        action: &ActionDef,
        target: &Combatant,
    ) -> Result<StepScore, OracleError> {
        let weights = self.weights;
        let mut score = StepScore::default();

        match action.kind {
            ActionKind::Declared => {
                let modifiers = self.modifiers(actor, action, target)?;
                let estimate = estimate_action(action, &modifiers, target);
                if self.state.is_enemy(actor.id, target.id) {
                    let threat = self.base_value(target, actor)?;
                    score.damage = weights.damage * estimate.expected_damage;
                    score.kill = weights.kill_bonus * estimate.kill_probability * threat;
                    score.control = imposed_conditions(action)
                        .filter(|(kind, _)| !target.conditions.has(*kind))
                        .map(|(kind, duration)| {
                            weights.control
                                * threat
                                * condition_impact(kind)
                                * expected_condition_rounds(kind, duration)
                                * estimate.success
                        })
                        .sum();
                    score.risk = weights.risk * self.incoming_at(actor, actor.position)?;
                } else {
                    score.healing = weights.healing * estimate.expected_healing;
                    score.buff = weights.buff * self.buff_value(action, target, estimate.success)?;
                }
            }
            ActionKind::Dash | ActionKind::Disengage => {
                // Worth only what the moves it enables are worth.
            }
            ActionKind::Dodge => {
                score.defense = weights.risk * self.incoming_at(actor, actor.position)? * DODGE_REDUCTION;
            }
            ActionKind::Escape(spec) => {
                let chance = save_success_probability(
                    actor.saves.escape_bonus(),
                    spec.dc as i32,
                    RollMode::Normal,
                );
                score.control = weights.control
                    * self.output(actor)?
                    * condition_impact(spec.condition).max(0.1)
                    * expected_condition_rounds(spec.condition, ConditionDuration::UntilEscape)
                    * chance;
            }
        }

        Ok(score)
    }

    fn modifiers(&mut self, actor: &Combatant, action: &ActionDef, target: &Combatant) -> Result<ModifierSet, OracleError> {
        let catalog = self.env.catalog()?;
        let rules = self.env.rules()?;
        let modifiers = gather_modifiers(actor, Some(target), action, self.state, catalog, rules.modifiers());
        for diagnostic in modifiers.diagnostics() {
            if self.reported.insert(diagnostic.message.clone()) {
                warn!(
                    actor = %actor.id,
                    action = %action.id,
                    modifier = ?diagnostic.modifier,
                    source = ?diagnostic.source,
                    "modifier skipped: {}",
                    diagnostic.message
                );
            }
        }
        Ok(modifiers)
    }

    fn buff_value(&mut self, action: &ActionDef, target: &Combatant, success: f64) -> Result<f64, OracleError> {
        let mut total = 0.0;
        for effect in &action.effects {
            let ActionEffect::GrantBuff(buff) = effect else {
                continue;
            };
            if target.buffs.iter().any(|held| held.effect == buff.effect) {
                continue;
            }
            let rounds = buff
                .rounds
                .map_or(BUFF_HORIZON_ROUNDS, |r| (r as f64).min(BUFF_HORIZON_ROUNDS));
            let per_round = match buff.effect {
                BuffEffect::AttackBonus(v) => v as f64 * 0.05 * self.output(target)?,
                BuffEffect::DamageBonus(v) => v as f64,
                BuffEffect::Advantage => 0.25 * self.output(target)?,
                BuffEffect::AcBonus(v) | BuffEffect::SaveBonus(v) => {
                    v as f64 * 0.05 * self.incoming_at(target, target.position)?
                }
                BuffEffect::Disadvantage => 0.0,
            };
            total += per_round.max(0.0) * rounds * success;
        }
        Ok(total)
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Desire of `actor` at its current position.
    ///
    /// The planner builds it once at the start of the turn and scores every
    /// planned move against it.
    ///
    /// # Errors
    ///
    /// Returns `OracleError` if the catalog is missing or a creature kind is
    /// unknown.
    pub fn desire(&mut self, actor: &Combatant) -> Result<Desire, OracleError> {
        let inputs = self.desire_inputs(actor)?;
        Ok(desire_at(self.state, actor, actor.position, &self.weights.movement, &inputs))
    }

    fn desire_inputs(&mut self, actor: &Combatant) -> Result<DesireInputs, OracleError> {
        let state = self.state;
        let mut targets = Vec::new();
        let mut threats = Vec::new();
        for enemy in state.living().filter(|c| state.is_enemy(actor.id, c.id)) {
            let value = self.base_value(actor, enemy)?;
            targets.push(TargetPull {
                position: enemy.position,
                priority: value,
            });
            if !enemy.conditions.is_incapacitated() {
                threats.push(ThreatPush {
                    position: enemy.position,
                    reach_feet: self.melee_reach_of(enemy)?,
                    danger: self.base_value(enemy, actor)?,
                });
            }
        }
        normalize(targets.iter_mut().map(|t| &mut t.priority));
        normalize(threats.iter_mut().map(|t| &mut t.danger));

        Ok(DesireInputs {
            targets,
            threats,
            preferred_range_feet: self.preferred_range(actor)?,
        })
    }

    fn melee_reach_of(&self, combatant: &Combatant) -> Result<u32, OracleError> {
        let catalog = self.env.catalog()?;
        Ok(catalog
            .creature(&combatant.kind)
            .into_iter()
            .flat_map(|c| c.actions.iter())
            .filter(|a| a.is_hostile() && a.range.kind == RangeKind::Melee)
            .map(|a| a.range.normal)
            .max()
            .unwrap_or(CombatConfig::CELL_FEET))
    }

    /// Normal range of the actor's hardest-hitting hostile action.
    fn preferred_range(&self, actor: &Combatant) -> Result<u32, OracleError> {
        let catalog = self.env.catalog()?;
        let best = catalog
            .creature(&actor.kind)
            .into_iter()
            .flat_map(|c| c.actions.iter())
            .filter(|a| a.is_hostile() && a.damage.is_some())
            .filter(|a| actor.resources.can_pay(&a.id, a.cost))
            .max_by(|a, b| {
                let (x, y) = (average_damage(a), average_damage(b));
                x.total_cmp(&y)
            });
        Ok(best.map_or(CombatConfig::CELL_FEET, |a| a.range.normal))
    }

    /// Scores moving `actor` from its (possibly planned) position to `to`
    /// under `desire`.
    ///
    /// Leaving an enemy's melee reach without Disengaging costs the expected
    /// damage of its retaliation; ending the move inside a hostile zone costs
    /// the zone's average damage.
    ///
    /// # Errors
    ///
    /// Returns `OracleError` if the catalog is missing or a creature kind is
    /// unknown.
    pub fn score_move(&mut self, actor: &Combatant, desire: &Desire, to: GridPosition) -> Result<StepScore, OracleError> {
        let state = self.state;
        let weights = self.weights;
        let from = actor.position;

        let mut exposure = 0.0;
        if !actor.conditions.has(ConditionKind::Disengaging) {
            for enemy in state.living().filter(|c| state.is_enemy(actor.id, c.id)) {
                if enemy.conditions.is_incapacitated() {
                    continue;
                }
                let reach = self.melee_reach_of(enemy)?;
                let threatened_before = enemy.position.distance_feet(from) <= reach;
                let threatened_after = enemy.position.distance_feet(to) <= reach;
                if threatened_before && !threatened_after {
                    exposure += self.base_value(enemy, actor)?;
                }
            }
        }
        exposure += combat_core::zone::hostile_zones_at(state, actor, to)
            .filter_map(|zone| zone.payload.damage)
            .map(|dice| dice.average().max(0.0))
            .sum::<f64>();

        Ok(StepScore {
            movement: desire.gain(from, to),
            risk: weights.risk * exposure,
            ..StepScore::default()
        })
    }
}

fn average_damage(action: &ActionDef) -> f64 {
    action.damage.map_or(0.0, |dice| dice.average())
}

/// Scales values so the largest becomes 1. All-zero inputs stay zero.
fn normalize<'v>(values: impl Iterator<Item = &'v mut f64>) {
    let values: Vec<&mut f64> = values.collect();
    let max = values.iter().map(|v| **v).fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return;
    }
    for value in values {
        *value /= max;
    }
}
