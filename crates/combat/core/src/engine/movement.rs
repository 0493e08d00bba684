//! Grid movement.

use crate::action::ActionTransition;
use crate::env::CombatEnv;
use crate::lifecycle;
use crate::result::{DeltaEntry, Outcome, StateDelta};
use crate::state::{CombatState, CombatantId, GridPosition};
use crate::zone;

use super::Resolution;
use super::errors::MoveError;

/// Walks the actor toward `to`, one cell at a time.
///
/// The walk stops early when the next cell is occupied or the remaining
/// movement cannot pay for it, so a request beyond the budget is truncated
/// rather than rejected. Entry zones fire for every cell entered and
/// followers (e.g. a grappled creature) are dragged along at the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveTransition {
    pub actor: CombatantId,
    pub to: GridPosition,
}

impl MoveTransition {
    pub fn new(actor: CombatantId, to: GridPosition) -> Self {
        Self { actor, to }
    }
}

impl ActionTransition for MoveTransition {
    type Error = MoveError;
    type Output = Resolution;

    fn actor(&self) -> CombatantId {
        self.actor
    }

    fn pre_validate(&self, state: &CombatState, _env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        let actor = state
            .combatant(self.actor)
            .ok_or(MoveError::ActorNotFound(self.actor))?;
        if actor.position == self.to {
            return Err(MoveError::NoProgress(self.to));
        }
        if actor.effective_speed() == 0 {
            return Err(MoveError::Immobilized(self.actor));
        }
        if actor.budget.movement == 0 {
            return Err(MoveError::NoMovementLeft);
        }
        Ok(())
    }

    fn apply(&self, state: &mut CombatState, env: &CombatEnv<'_>) -> Result<Self::Output, Self::Error> {
        let rules = env.rules()?.lifecycle();
        let rng = env.rng()?;

        let start = state
            .combatant(self.actor)
            .map(|c| c.position)
            .ok_or(MoveError::ActorNotFound(self.actor))?;
        let mut position = start;
        let mut feet = 0;
        let mut triggered = StateDelta::new();

        while position != self.to {
            let next = position.step_toward(self.to);
            if state.occupant_at(next).is_some_and(|id| id != self.actor) {
                break;
            }
            let cost = zone::movement_cost(state, next);
            let actor = state
                .combatant_mut(self.actor)
                .ok_or(MoveError::ActorNotFound(self.actor))?;
            if actor.budget.movement < cost {
                break;
            }
            actor.budget.spend_movement(cost);
            actor.position = next;
            feet += cost;

            triggered.append(zone::trigger_entry(state, rules, rng, self.actor, position, next)?);
            position = next;
            if !state.combatant(self.actor).is_some_and(|c| c.is_alive()) {
                break;
            }
        }

        let mut delta = StateDelta::new();
        if position != start {
            delta.push(DeltaEntry::Moved {
                combatant: self.actor,
                from: start,
                to: position,
            });
            delta.append(lifecycle::sync_positions(state, rules, self.actor, start));
        }
        delta.append(triggered);

        Ok(Resolution {
            outcome: Outcome::Moved {
                from: start,
                to: position,
                feet,
            },
            delta,
        })
    }

    fn post_validate(&self, state: &CombatState, env: &CombatEnv<'_>) -> Result<(), Self::Error> {
        lifecycle::verify_links(state, env.rules()?.lifecycle())?;
        Ok(())
    }
}
