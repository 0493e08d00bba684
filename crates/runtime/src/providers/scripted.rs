//! Provider that replays queued turns.

use std::collections::{BTreeMap, VecDeque};

use combat_core::{CombatEnv, CombatState, CombatantId, Command};
use tracing::debug;

use crate::api::{Result, RuntimeError, TurnProvider};

/// Replays pre-recorded turns per combatant, in order.
///
/// Used for player input and fixtures. An actor with no queued turn passes,
/// unless the provider is strict, in which case it fails with
/// `RuntimeError::ScriptExhausted`.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    turns: BTreeMap<CombatantId, VecDeque<Vec<Command>>>,
    strict: bool,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail instead of passing when an actor's queue runs dry.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Queues one turn for `actor`.
    pub fn push_turn(&mut self, actor: CombatantId, commands: Vec<Command>) {
        self.turns.entry(actor).or_default().push_back(commands);
    }

    pub fn with_turn(mut self, actor: CombatantId, commands: Vec<Command>) -> Self {
        self.push_turn(actor, commands);
        self
    }

    /// Turns still queued for `actor`.
    pub fn remaining(&self, actor: CombatantId) -> usize {
        self.turns.get(&actor).map_or(0, VecDeque::len)
    }
}

impl TurnProvider for ScriptedProvider {
    fn provide_turn(
        &mut self,
        actor: CombatantId,
        _state: &CombatState,
        _env: CombatEnv<'_>,
    ) -> Result<Vec<Command>> {
        match self.turns.get_mut(&actor).and_then(VecDeque::pop_front) {
            Some(commands) => Ok(commands),
            None if self.strict => Err(RuntimeError::ScriptExhausted { actor }),
            None => {
                debug!(actor = %actor, "no scripted turn queued, passing");
                Ok(Vec::new())
            }
        }
    }
}
