//! Command dispatch and the three-phase transition pipeline.

use crate::action::{ActionTransition, Command};
use crate::env::CombatEnv;
use crate::state::{CombatState, CombatantId};

use super::Resolution;
use super::act::ActTransition;
use super::errors::{ExecuteError, TransitionPhase, TransitionPhaseError};
use super::movement::MoveTransition;
use super::turns::PassTransition;

/// Executes a transition through the three-phase pipeline and returns its output.
///
/// Phases:
/// 1. `pre_validate` - Check preconditions before mutation
/// 2. `apply` - Mutate the combat state
/// 3. `post_validate` - Verify postconditions after mutation
#[inline]
fn drive_transition<T>(
    transition: &T,
    state: &mut CombatState,
    env: &CombatEnv<'_>,
) -> Result<T::Output, TransitionPhaseError<T::Error>>
where
    T: ActionTransition,
{
    transition
        .pre_validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PreValidate, error))?;

    let output = transition
        .apply(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))?;

    Ok(output)
}

/// Routes a command to its transition.
pub(super) fn execute_command(
    actor: CombatantId,
    command: &Command,
    state: &mut CombatState,
    env: &CombatEnv<'_>,
) -> Result<Resolution, ExecuteError> {
    match command {
        Command::Move { to } => {
            drive_transition(&MoveTransition::new(actor, *to), state, env).map_err(ExecuteError::Move)
        }
        Command::Act { action, target } => {
            let transition = ActTransition::new(actor, action.clone(), *target);
            drive_transition(&transition, state, env).map_err(ExecuteError::Act)
        }
        Command::Pass => {
            drive_transition(&PassTransition::new(actor), state, env).map_err(ExecuteError::Pass)
        }
    }
}
