//! Runtime bundle of the static combat content oracles.
//!
//! The catalog and the rulebook implement the `combat-core` oracle traits;
//! [`OracleManager`] keeps them behind `Arc` together with the tuning config
//! so the runtime can build [`CombatEnv`] snapshots on demand. The data is
//! immutable while an encounter runs; dynamic state lives in
//! [`combat_core::CombatState`].
use std::sync::Arc;

use combat_content::{CreatureCatalog, Rulebook};
use combat_core::{CombatConfig, CombatEnv, Env, PcgRng};

/// Manages the oracle implementations and provides unified access.
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) catalog: Arc<CreatureCatalog>,
    pub(crate) rules: Arc<Rulebook>,
    pub(crate) config: Arc<CombatConfig>,
    pub(crate) rng: PcgRng,
}

impl OracleManager {
    pub fn new(catalog: Arc<CreatureCatalog>, rules: Arc<Rulebook>, config: Arc<CombatConfig>) -> Self {
        Self {
            catalog,
            rules,
            config,
            rng: PcgRng, // stateless
        }
    }

    /// Converts the bundle into the `CombatEnv` the engine and planner read.
    pub fn as_combat_env(&self) -> CombatEnv<'_> {
        Env::with_all(self.catalog.as_ref(), self.rules.as_ref(), &self.rng).as_combat_env()
    }

    pub fn catalog(&self) -> &CreatureCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }
}
