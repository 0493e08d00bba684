//! Synchronous abstraction for sourcing a combatant's turn.
//!
//! Runtime users plug in [`TurnProvider`] implementations so an encounter can
//! run with the turn planner, scripted fixtures, or recorded player input.
use combat_core::{CombatEnv, CombatState, CombatantId, Command};

use super::errors::Result;

/// Trait for providing a turn based on the current combat state.
///
/// The returned commands are executed in order; the runner always closes the
/// turn with a pass, so providers never need to append one. A `Pass` inside
/// the list ends the turn early.
///
/// Providers take `&mut self` so they can keep caches across turns. The
/// state is only borrowed immutably; nothing a provider does can mutate it.
pub trait TurnProvider: Send {
    /// Commands for `actor`'s turn.
    ///
    /// # Arguments
    /// * `actor` - The combatant whose turn it is
    /// * `state` - Read-only view of the encounter
    /// * `env` - Oracles the encounter runs against
    ///
    /// # Errors
    ///
    /// Returns an error if the turn cannot be determined.
    fn provide_turn(
        &mut self,
        actor: CombatantId,
        state: &CombatState,
        env: CombatEnv<'_>,
    ) -> Result<Vec<Command>>;
}

/// A provider that always passes.
/// Useful as a fallback and for combatants that should stand still.
pub struct PassProvider;

impl TurnProvider for PassProvider {
    fn provide_turn(
        &mut self,
        _actor: CombatantId,
        _state: &CombatState,
        _env: CombatEnv<'_>,
    ) -> Result<Vec<Command>> {
        Ok(Vec::new())
    }
}
