//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Once};

use combat_content::{CreatureCatalog, builtin_catalog, builtin_config, builtin_rulebook};
use combat_core::{CombatState, CombatantId, CreatureKind, GridPosition, GroupId};
use combat_runtime::OracleManager;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test subscriber once; `RUST_LOG` controls the level.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn oracles() -> OracleManager {
    init_tracing();
    OracleManager::new(
        Arc::new(builtin_catalog().unwrap()),
        Arc::new(builtin_rulebook().unwrap()),
        Arc::new(builtin_config().unwrap()),
    )
}

/// One entry of an encounter roster.
pub struct Spawn {
    pub kind: &'static str,
    pub id: u32,
    pub group: u32,
    pub at: (i32, i32),
}

pub const fn spawn(kind: &'static str, id: u32, group: u32, at: (i32, i32)) -> Spawn {
    Spawn { kind, id, group, at }
}

/// Builds a state with `roster` in initiative order.
pub fn encounter(catalog: &CreatureCatalog, seed: u64, roster: &[Spawn]) -> CombatState {
    let mut state = CombatState::new(seed);
    for entry in roster {
        let combatant = catalog
            .spawn(
                &CreatureKind::new(entry.kind),
                CombatantId(entry.id),
                GroupId(entry.group),
                GridPosition::new(entry.at.0, entry.at.1),
            )
            .unwrap();
        state.add_combatant(combatant).unwrap();
    }
    state
        .set_initiative(roster.iter().map(|entry| CombatantId(entry.id)).collect())
        .unwrap();
    state
}
