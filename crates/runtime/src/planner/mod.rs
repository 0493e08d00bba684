//! Bounded tree search over composite turn plans.
//!
//! The planner starts from one root [`TurnCandidate`] (the actor as it stands)
//! and repeatedly expands every open candidate into one child per legal
//! follow-up: a move to one of the reachable cells that gains the most under
//! the desire built at the turn's start, an available action against each
//! legal target, or an explicit pass. After
//! each expansion round the frontier is pruned to candidates worth at least
//! `prune_ratio` of the best one and cut to the beam width. The search ends
//! when every survivor is terminal, or degrades to the best candidate so far
//! once `max_expansion_rounds` is spent.
//!
//! # Determinism
//!
//! Children are generated in a fixed order (pass, moves by score then cell,
//! actions in catalogue order, targets by id) and ties go to the lowest
//! sequence number, so the same state always yields the same plan.
//!
//! The state is only borrowed; every planned effect lives on the candidate's
//! hypothetical copy of the actor.

pub mod candidate;

pub use candidate::{BudgetMark, PlanStep, TurnCandidate, prune, select_best, truncate_beam};

use std::collections::BTreeSet;
use std::sync::Arc;

use combat_core::action::{get_available_actions_for_combatant, legal_targets};
use combat_core::zone::movement_cost;
use combat_core::{
    ActionDef, ActionId, ActionKind, ActionTiming, CombatConfig, CombatEnv, CombatState, Combatant, CombatantId,
    Command, ConditionDuration, ConditionInstance, ConditionKind, GridPosition, ResourceCost,
    ScoringWeights, SearchConfig,
};
use tracing::{debug, info};

use crate::api::{Result, RuntimeError};
use crate::scoring::{BaseValueCache, Desire, ScoringEngine, StepScore};

/// Outcome of one planning call.
#[derive(Clone, Debug)]
pub struct TurnPlan {
    pub actor: CombatantId,
    /// Chosen steps; ends with `Pass` unless the search ran out of rounds.
    pub steps: Vec<PlanStep>,
    pub value: f64,
    /// Budget after each step, starting with the turn's budget.
    pub trail: Vec<BudgetMark>,
    /// Search stopped at `max_expansion_rounds` before every candidate was terminal.
    pub budget_exhausted: bool,
    pub expansion_rounds: u32,
    /// Candidates created, root included.
    pub candidates: u32,
}

impl TurnPlan {
    /// Engine commands for the steps, without the closing pass.
    pub fn commands(&self) -> Vec<Command> {
        self.steps
            .iter()
            .filter(|step| !matches!(step, PlanStep::Pass))
            .map(PlanStep::command)
            .collect()
    }
}

/// Plans turns under a search configuration and scoring weights.
pub struct TurnPlanner<'c> {
    search: &'c SearchConfig,
    weights: &'c ScoringWeights,
}

impl<'c> TurnPlanner<'c> {
    pub fn new(config: &'c CombatConfig) -> Self {
        Self {
            search: &config.search,
            weights: &config.scoring,
        }
    }

    /// Chooses the best turn for `actor`.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::UnknownCombatant` if the actor is not in the
    /// state, or an oracle error if content is missing.
    pub fn plan(
        &self,
        actor: CombatantId,
        state: &CombatState,
        env: CombatEnv<'_>,
        cache: &mut BaseValueCache,
    ) -> Result<TurnPlan> {
        let combatant = state
            .combatant(actor)
            .ok_or(RuntimeError::UnknownCombatant(actor))?;
        let mut scorer = ScoringEngine::new(state, env, self.weights, cache);
        let desire = scorer.desire(combatant)?;
        let mut search = Search {
            config: self.search,
            env,
            scorer: &mut scorer,
            desire,
            next_seq: 1,
        };

        let mut frontier = vec![TurnCandidate::root(combatant.clone())];
        let mut rounds = 0;
        let mut exhausted = false;

        while frontier.iter().any(|c| !c.terminal) {
            if rounds >= self.search.max_expansion_rounds {
                exhausted = true;
                break;
            }
            rounds += 1;

            let mut next = Vec::with_capacity(frontier.len());
            for candidate in frontier {
                if candidate.terminal {
                    next.push(candidate);
                } else {
                    next.extend(search.expand(&candidate)?);
                }
            }

            for dropped in prune(&mut next, self.search.prune_ratio) {
                debug!(
                    actor = %actor,
                    seq = dropped.seq,
                    value = dropped.value,
                    round = rounds,
                    "pruned candidate"
                );
            }
            truncate_beam(&mut next, self.search.beam_width);
            frontier = next;
        }

        let best = select_best(&frontier)
            .cloned()
            .unwrap_or_else(|| TurnCandidate::root(combatant.clone()));
        let plan = TurnPlan {
            actor,
            steps: best.steps,
            value: best.value,
            trail: best.trail,
            budget_exhausted: exhausted,
            expansion_rounds: rounds,
            candidates: search.next_seq,
        };

        info!(
            actor = %actor,
            value = plan.value,
            steps = ?plan.commands(),
            rounds = plan.expansion_rounds,
            candidates = plan.candidates,
            budget_exhausted = plan.budget_exhausted,
            "turn planned"
        );
        Ok(plan)
    }
}

/// Per-call expansion context.
struct Search<'s, 'a> {
    config: &'s SearchConfig,
    env: CombatEnv<'a>,
    scorer: &'s mut ScoringEngine<'a>,
    /// Desire at the turn's starting position; every move is scored against it.
    desire: Desire,
    next_seq: u32,
}

impl Search<'_, '_> {
    fn take_seq(&mut self) -> u32 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn push_child(
        &mut self,
        children: &mut Vec<TurnCandidate>,
        parent: &TurnCandidate,
        actor: Combatant,
        step: PlanStep,
    ) {
        let seq = self.take_seq();
        let child = parent.child(seq, actor, step);
        debug!(
            parent = parent.seq,
            seq = child.seq,
            step = ?child.last_step().map(PlanStep::command),
            value = child.value,
            terminal = child.terminal,
            "candidate"
        );
        children.push(child);
    }

    /// One child per legal follow-up of `parent`, pass first.
    fn expand(&mut self, parent: &TurnCandidate) -> Result<Vec<TurnCandidate>> {
        let mut children = Vec::new();
        self.push_child(&mut children, parent, parent.actor.clone(), PlanStep::Pass);

        // ===== movement =====
        // A move straight after a move could have been one move.
        let moved_last = parent.last_step().is_some_and(PlanStep::is_move);
        if !moved_last && parent.actor.effective_speed() > 0 && parent.actor.budget.movement > 0 {
            for (to, feet, score) in self.move_options(&parent.actor)? {
                let mut actor = parent.actor.clone();
                actor.position = to;
                actor.budget.spend_movement(feet);
                self.push_child(&mut children, parent, actor, PlanStep::Move { to, score });
            }
        }

        // ===== actions =====
        let state = self.scorer.state();
        let used: BTreeSet<_> = parent.actor.history.iter().map(|r| r.action.clone()).collect();
        let available = get_available_actions_for_combatant(&parent.actor, state, &self.env)?;
        for action in available.iter().filter(|a| plannable(a, &parent.actor, &used)) {
            for target_id in legal_targets(&parent.actor, action, state) {
                let target = if target_id == parent.actor.id {
                    parent.actor.clone()
                } else {
                    match state.combatant(target_id) {
                        Some(target) => target.clone(),
                        None => continue,
                    }
                };
                let score = self.scorer.score_action(&parent.actor, action, &target)?;
                let actor = apply_action(parent.actor.clone(), action);
                let step = PlanStep::Act {
                    action: action.id.clone(),
                    target: target_id,
                    score,
                };
                self.push_child(&mut children, parent, actor, step);
            }
        }

        Ok(children)
    }

    /// Reachable destinations worth moving to, best first.
    ///
    /// Only moves with positive value are offered; at most
    /// `max_move_candidates` of them.
    fn move_options(&mut self, actor: &Combatant) -> Result<Vec<(GridPosition, u32, StepScore)>> {
        let state = self.scorer.state();
        let from = actor.position;
        let radius = (actor.budget.movement / CombatConfig::CELL_FEET) as i32;

        let mut seen = BTreeSet::new();
        let mut options = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let request = from.offset(dx, dy);
                if request == from {
                    continue;
                }
                let (to, feet) = walk(state, actor, request);
                if to == from || !seen.insert(to) {
                    continue;
                }
                let score = self.scorer.score_move(actor, &self.desire, to)?;
                if score.value() > 0.0 {
                    options.push((to, feet, score));
                }
            }
        }

        options.sort_by(|a, b| b.2.value().total_cmp(&a.2.value()).then(a.0.cmp(&b.0)));
        options.truncate(self.config.max_move_candidates);
        Ok(options)
    }
}

/// Actions the planner considers on its own turn.
///
/// Reactions belong to other turns, free actions are taken at most once per
/// turn, and turn states already held are not re-applied.
fn plannable(action: &Arc<ActionDef>, actor: &Combatant, used: &BTreeSet<ActionId>) -> bool {
    match action.timing {
        ActionTiming::Reaction => return false,
        ActionTiming::Free if used.contains(&action.id) => return false,
        _ => {}
    }
    match action.kind {
        ActionKind::Disengage => !actor.conditions.has(ConditionKind::Disengaging),
        ActionKind::Dodge => !actor.conditions.has(ConditionKind::Dodging),
        ActionKind::Dash => actor.effective_speed() > 0,
        ActionKind::Declared | ActionKind::Escape(_) => true,
    }
}

/// The actor after paying for and taking `action`, as far as the plan can know.
fn apply_action(mut actor: Combatant, action: &ActionDef) -> Combatant {
    actor.budget.consume(action.timing);
    if action.cost != ResourceCost::None {
        actor.resources.consume(&action.id, action.cost);
    }
    actor.history.push(action.record(action.timing));
    match action.kind {
        ActionKind::Dash => {
            actor.budget.dash();
            actor
        }
        ActionKind::Disengage => actor.with_condition(ConditionInstance::new(
            ConditionKind::Disengaging,
            ConditionDuration::UntilTurnEnd,
        )),
        ActionKind::Dodge => actor.with_condition(ConditionInstance::new(
            ConditionKind::Dodging,
            ConditionDuration::UntilTurnStart,
        )),
        ActionKind::Declared | ActionKind::Escape(_) => actor,
    }
}

/// Where a move toward `to` would end, and the feet it would cost.
///
/// Follows the same rules as the engine: one step at a time, stopping before
/// an occupied cell or a step the remaining movement cannot pay for.
pub fn walk(state: &CombatState, actor: &Combatant, to: GridPosition) -> (GridPosition, u32) {
    let mut position = actor.position;
    let mut movement = actor.budget.movement;
    let mut feet = 0;
    while position != to {
        let next = position.step_toward(to);
        if state.occupant_at(next).is_some_and(|id| id != actor.id) {
            break;
        }
        let cost = movement_cost(state, next);
        if movement < cost {
            break;
        }
        movement -= cost;
        feet += cost;
        position = next;
    }
    (position, feet)
}
