//! Provider backed by the turn planner.

use std::sync::Arc;

use combat_core::{CombatConfig, CombatEnv, CombatState, CombatantId, Command};

use crate::api::{Result, TurnProvider};
use crate::planner::{TurnPlan, TurnPlanner};
use crate::scoring::BaseValueCache;

/// Plans every turn it is asked for.
///
/// The base-value cache is kept across calls, so combatants planning in the
/// same round share their unmodified damage estimates.
pub struct PlannerProvider {
    config: Arc<CombatConfig>,
    cache: BaseValueCache,
    last_plan: Option<TurnPlan>,
}

impl PlannerProvider {
    pub fn new(config: Arc<CombatConfig>) -> Self {
        Self {
            config,
            cache: BaseValueCache::new(),
            last_plan: None,
        }
    }

    /// Plan chosen by the most recent call.
    pub fn last_plan(&self) -> Option<&TurnPlan> {
        self.last_plan.as_ref()
    }

    pub fn cache(&self) -> &BaseValueCache {
        &self.cache
    }
}

impl TurnProvider for PlannerProvider {
    fn provide_turn(
        &mut self,
        actor: CombatantId,
        state: &CombatState,
        env: CombatEnv<'_>,
    ) -> Result<Vec<Command>> {
        let plan = TurnPlanner::new(&self.config).plan(actor, state, env, &mut self.cache)?;
        let commands = plan.commands();
        self.last_plan = Some(plan);
        Ok(commands)
    }
}
