//! Encounter loop.
//!
//! [`EncounterRunner`] drives a [`CombatState`] from its first turn to a
//! decision: for each turn it asks the actor's provider for commands, feeds
//! them to the [`CombatEngine`] and closes the turn with a pass. Providers
//! only ever see the state immutably; every mutation goes through the engine.

use std::collections::BTreeSet;

use combat_core::{
    ActionResult, CombatEngine, CombatEnv, CombatError, CombatState, CombatantId, Command, GroupId,
    Round,
};
use tracing::{debug, info, warn};

use crate::api::{ProviderKind, ProviderRegistry, Result, RuntimeError};
use crate::oracle::OracleManager;
use crate::providers::PlannerProvider;

/// How an encounter ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncounterOutcome {
    /// Only mutually allied groups are left standing.
    Victory { groups: BTreeSet<GroupId> },
    /// Nobody is left standing.
    Wipe,
    /// The round limit was reached first.
    RoundLimit { round: Round },
}

/// Result of [`EncounterRunner::run`].
#[derive(Clone, Debug)]
pub struct EncounterReport {
    pub outcome: EncounterOutcome,
    /// Last round played.
    pub rounds: Round,
    /// Every executed command, in order.
    pub log: Vec<ActionResult>,
}

pub struct EncounterRunner {
    oracles: OracleManager,
    providers: ProviderRegistry,
    max_rounds: u32,
}

impl EncounterRunner {
    pub const DEFAULT_MAX_ROUNDS: u32 = 20;

    pub fn new(oracles: OracleManager, providers: ProviderRegistry) -> Self {
        Self {
            oracles,
            providers,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
        }
    }

    /// Runner where every combatant is driven by the turn planner.
    pub fn with_planner(oracles: OracleManager) -> Self {
        let mut providers = ProviderRegistry::new();
        providers.register(
            ProviderKind::Planner,
            PlannerProvider::new(oracles.config.clone()),
        );
        Self::new(oracles, providers)
    }

    pub fn with_round_limit(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn providers_mut(&mut self) -> &mut ProviderRegistry {
        &mut self.providers
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    /// Plays `state` until one side is left standing or the round limit is hit.
    ///
    /// The initiative order must already be set.
    ///
    /// # Errors
    ///
    /// Returns an error when the encounter cannot begin, a provider fails,
    /// or the engine reports an internal fault. Rejected commands are logged
    /// and end the actor's turn early instead.
    pub fn run(&mut self, state: &mut CombatState) -> Result<EncounterReport> {
        let env = self.oracles.as_combat_env();
        let mut engine = CombatEngine::new(state);
        engine.begin_encounter(env).map_err(RuntimeError::Begin)?;

        let mut log = Vec::new();
        let outcome = loop {
            if let Some(outcome) = decision(engine.state()) {
                break outcome;
            }
            if engine.round().0 > self.max_rounds {
                break EncounterOutcome::RoundLimit {
                    round: engine.round(),
                };
            }
            let actor = engine.current_actor().ok_or(RuntimeError::NoCurrentActor)?;
            play_turn(&mut self.providers, &mut engine, env, actor, &mut log)?;
        };

        let rounds = engine.round();
        info!(?outcome, %rounds, commands = log.len(), "encounter finished");
        Ok(EncounterReport {
            outcome,
            rounds,
            log,
        })
    }
}

/// Runs one turn for `actor`, always ending with a pass.
fn play_turn(
    providers: &mut ProviderRegistry,
    engine: &mut CombatEngine<'_>,
    env: CombatEnv<'_>,
    actor: CombatantId,
    log: &mut Vec<ActionResult>,
) -> Result<()> {
    let round = engine.round();
    let alive = engine.state().combatant(actor).is_some_and(|c| c.is_alive());
    let commands = if alive {
        providers.provider_for(actor)?.provide_turn(actor, engine.state(), env)?
    } else {
        Vec::new()
    };
    debug!(actor = %actor, %round, commands = ?commands, "turn start");

    for command in commands.iter().take_while(|c| !c.is_pass()) {
        match engine.execute_action(env, actor, command) {
            Ok(result) => {
                debug!(actor = %actor, outcome = ?result.outcome, delta = result.delta.len(), "executed");
                log.push(result);
            }
            Err(error) if error.severity().is_internal() => {
                return Err(RuntimeError::execute(actor, round, error));
            }
            Err(error) => {
                warn!(
                    actor = %actor,
                    %round,
                    command = ?command,
                    code = error.error_code(),
                    "command rejected, ending turn: {error}"
                );
                break;
            }
        }
        if !engine.state().combatant(actor).is_some_and(|c| c.is_alive()) {
            break;
        }
    }

    let result = engine
        .execute_action(env, actor, &Command::Pass)
        .map_err(|error| RuntimeError::execute(actor, round, error))?;
    log.push(result);
    Ok(())
}

/// Outcome if the encounter is decided: no two living combatants are enemies.
fn decision(state: &CombatState) -> Option<EncounterOutcome> {
    let living: Vec<_> = state.living().collect();
    if living.is_empty() {
        return Some(EncounterOutcome::Wipe);
    }
    let contested = living
        .iter()
        .any(|a| living.iter().any(|b| state.is_enemy(a.id, b.id)));
    if contested {
        None
    } else {
        Some(EncounterOutcome::Victory {
            groups: state.standing_groups(),
        })
    }
}
