//! Command execution pipeline.
//!
//! The [`CombatEngine`] is the single authority that mutates a
//! [`CombatState`]: hit points, positions, resources and conditions all change
//! through [`CombatEngine::execute_action`]. Each command runs through the
//! three-phase transition pipeline (pre_validate → apply → post_validate),
//! and the post-validation step checks the linked-condition invariant.

mod act;
mod errors;
mod movement;
mod transition;
mod turns;

pub use act::ActTransition;
pub use errors::{
    ActionError, ExecuteError, MoveError, TransitionPhase, TransitionPhaseError, TurnError,
};
pub use movement::MoveTransition;
pub use turns::PassTransition;

use crate::action::Command;
use crate::env::CombatEnv;
use crate::error::ErrorContext;
use crate::result::{ActionResult, Outcome, StateDelta};
use crate::state::{CombatState, CombatantId};

/// What a transition produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub delta: StateDelta,
}

/// Applies commands to a borrowed combat state.
///
/// Holding the state mutably for the engine's lifetime means no planner can
/// read it while a command is being applied.
pub struct CombatEngine<'a> {
    state: &'a mut CombatState,
}

impl<'a> CombatEngine<'a> {
    pub fn new(state: &'a mut CombatState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &CombatState {
        self.state
    }

    /// Executes one command for `actor`.
    ///
    /// The actor must be the current combatant. Dead actors may only pass.
    /// The nonce is incremented after every successful command, so replays
    /// of the same command sequence roll the same dice.
    ///
    /// # Errors
    ///
    /// Returns `ExecuteError` when the actor may not act or a transition
    /// phase fails. A failed command leaves the nonce unchanged.
    pub fn execute_action(
        &mut self,
        env: CombatEnv<'_>,
        actor: CombatantId,
        command: &Command,
    ) -> Result<ActionResult, ExecuteError> {
        self.validate_actor(actor, command)?;

        let round = self.state.round;
        let nonce = self.state.nonce;
        let resolution = transition::execute_command(actor, command, self.state, &env)?;

        self.state.nonce += 1;

        let (action, target) = match command {
            Command::Act { action, target } => (Some(action.clone()), *target),
            Command::Move { .. } | Command::Pass => (None, None),
        };
        Ok(ActionResult {
            actor,
            action,
            target,
            outcome: resolution.outcome,
            delta: resolution.delta,
            round,
            nonce,
        })
    }

    fn validate_actor(&self, actor: CombatantId, command: &Command) -> Result<(), ExecuteError> {
        let context = ErrorContext::new(self.state.round, self.state.nonce).with_actor(actor);

        let current = self.state.current_actor();
        if current != Some(actor) {
            return Err(ExecuteError::ActorNotCurrent {
                actor,
                current,
                context,
            });
        }

        let alive = self.state.combatant(actor).is_some_and(|c| c.is_alive());
        if !alive && !command.is_pass() {
            return Err(ExecuteError::ActorDefeated {
                actor,
                context: context.with_message("defeated combatants may only pass"),
            });
        }
        Ok(())
    }
}
