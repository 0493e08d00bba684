//! Turn boundaries.
//!
//! Ending a turn fires turn-end zones and expires the actor's turn-end
//! durations, then hands the turn to the next living combatant in
//! initiative order. When the order wraps the round advances and every
//! per-round budget is refilled.

use crate::action::ActionTransition;
use crate::env::{CombatEnv, RngOracle};
use crate::lifecycle::{self, LifecycleRules, TurnEdge};
use crate::result::{DeltaEntry, Outcome, StateDelta};
use crate::state::{CombatState, CombatantId, Round};
use crate::zone::{self, ZoneTrigger};

use super::errors::{ExecuteError, TurnError};
use super::{CombatEngine, Resolution};

/// Ends the actor's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassTransition {
    pub actor: CombatantId,
}

impl PassTransition {
    pub fn new(actor: CombatantId) -> Self {
        Self { actor }
    }
}

impl ActionTransition for PassTransition {
    type Error = TurnError;
    type Output = Resolution;

    fn actor(&self) -> CombatantId {
        self.actor
    }

    fn pre_validate(&self, state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        if state.initiative().is_empty() {
            return Err(TurnError::NoInitiative);
        }
        Ok(())
    }

    fn apply(&self, state: &mut CombatState, env: &CombatEnv<'_>) -> Result<Self::Output, Self::Error> {
        let rules = env.rules()?.lifecycle();
        let rng = env.rng()?;
        let mut delta = StateDelta::new();

        if state.combatant(self.actor).is_some_and(|c| c.is_alive()) {
            delta.append(zone::trigger_zones(state, rules, rng, self.actor, ZoneTrigger::OnTurnEnd)?);
        }
        delta.append(lifecycle::tick_durations(state, rules, self.actor, TurnEdge::End));

        if let Some(next) = advance(state) {
            delta.append(start_turn(state, rules, rng, next)?);
        }

        Ok(Resolution {
            outcome: Outcome::Passed,
            delta,
        })
    }

    fn post_validate(&self, state: &CombatState, env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        lifecycle::verify_links(state, env.rules()?.lifecycle())?;
        Ok(())
    }
}

/// Moves the current index to the next living combatant.
///
/// Wrapping past the end of the order starts a new round: the round counter
/// increments and every combatant's budget and history are reset.
///
/// # Returns
///
/// The new current actor, or `None` if nobody is left standing.
pub(crate) fn advance(state: &mut CombatState) -> Option<CombatantId> {
    let len = state.initiative().len();
    let current = state.current_index();

    for step in 1..=len {
        let index = (current + step) % len;
        let id = state.initiative()[index];
        if !state.combatant(id).is_some_and(|c| c.is_alive()) {
            continue;
        }
        if current + step >= len {
            state.round = state.round.next();
            for combatant in state.combatants_mut() {
                combatant.reset_budget();
                combatant.history.clear();
            }
        }
        state.set_current_index(index);
        return Some(id);
    }
    None
}

/// Start-of-turn bookkeeping for `actor`.
///
/// Clears the actor from zone ledgers, ticks recharge timers, expires
/// turn-start durations and fires turn-start zones.
pub(crate) fn start_turn<R>(
    state: &mut CombatState,
    rules: &LifecycleRules,
    rng: &R,
    actor: CombatantId,
) -> Result<StateDelta, TurnError>
where
    R: RngOracle + ?Sized,
{
    let mut delta = StateDelta::new();
    zone::reset_ledger(state, actor);
    if let Some(combatant) = state.combatant_mut(actor) {
        combatant.resources.tick_recharge();
        combatant.history.clear();
    }
    delta.push(DeltaEntry::TurnStarted {
        combatant: actor,
        round: state.round,
    });
    delta.append(lifecycle::tick_durations(state, rules, actor, TurnEdge::Start));
    delta.append(zone::trigger_zones(state, rules, rng, actor, ZoneTrigger::OnTurnStart)?);
    Ok(delta)
}

/// Turn queries and encounter start for CombatEngine.
impl CombatEngine<'_> {
    /// Combatant whose turn it is.
    pub fn current_actor(&self) -> Option<CombatantId> {
        self.state.current_actor()
    }

    pub fn round(&self) -> Round {
        self.state.round
    }

    /// Runs start-of-turn bookkeeping for the first combatant in initiative.
    ///
    /// Call once after the initiative order is set. A dead first combatant
    /// is skipped.
    ///
    /// # Errors
    ///
    /// Returns `ExecuteError::Begin` if initiative is unset or a start-of-turn
    /// effect fails.
    pub fn begin_encounter(&mut self, env: CombatEnv<'_>) -> Result<StateDelta, ExecuteError> {
        let rules = env.rules().map_err(|e| ExecuteError::Begin(e.into()))?.lifecycle();
        let rng = env.rng().map_err(|e| ExecuteError::Begin(e.into()))?;
        let first = self
            .state
            .current_actor()
            .ok_or(ExecuteError::Begin(TurnError::NoInitiative))?;

        let actor = if self.state.combatant(first).is_some_and(|c| c.is_alive()) {
            Some(first)
        } else {
            advance(self.state)
        };
        match actor {
            Some(actor) => start_turn(self.state, rules, rng, actor).map_err(ExecuteError::Begin),
            None => Ok(StateDelta::new()),
        }
    }
}
