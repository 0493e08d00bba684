//! Shared fixtures for unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::action::{ActionDef, ActionId, standard_actions};
use crate::env::{CatalogOracle, CreatureDefinition, RulesOracle};
use crate::lifecycle::LifecycleRules;
use crate::modifier::ModifierRegistry;
use crate::state::{CombatState, Combatant, CombatantId, CreatureKind, GridPosition, GroupId};

#[derive(Default)]
pub struct TestCatalog {
    creatures: BTreeMap<CreatureKind, CreatureDefinition>,
}

impl TestCatalog {
    pub fn define(&mut self, kind: &str, edit: impl FnOnce(&mut CreatureDefinition)) {
        let kind = CreatureKind::new(kind);
        let definition = self
            .creatures
            .entry(kind.clone())
            .or_insert_with(|| CreatureDefinition::new(kind));
        edit(definition);
    }

    pub fn with_action(mut self, kind: &str, action: ActionDef) -> Self {
        self.define(kind, |d| d.actions.push(Arc::new(action)));
        self
    }
}

impl CatalogOracle for TestCatalog {
    fn creature(&self, kind: &CreatureKind) -> Option<&CreatureDefinition> {
        self.creatures.get(kind)
    }
}

pub struct TestRules {
    pub lifecycle: LifecycleRules,
    pub modifiers: ModifierRegistry,
    pub standard: Vec<Arc<ActionDef>>,
    pub allow_list: Vec<ActionId>,
}

impl Default for TestRules {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleRules::default(),
            modifiers: ModifierRegistry::empty(),
            standard: standard_actions().into_iter().map(Arc::new).collect(),
            allow_list: Vec::new(),
        }
    }
}

impl RulesOracle for TestRules {
    fn lifecycle(&self) -> &LifecycleRules {
        &self.lifecycle
    }

    fn modifiers(&self) -> &ModifierRegistry {
        &self.modifiers
    }

    fn standard_actions(&self) -> &[Arc<ActionDef>] {
        &self.standard
    }

    fn incapacitated_allow_list(&self) -> &[ActionId] {
        &self.allow_list
    }
}

/// A 20 HP, AC 15, speed 30 "fighter".
pub fn combatant(id: u32, group: u32, x: i32, y: i32) -> Combatant {
    Combatant::new(
        CombatantId(id),
        CreatureKind::new("fighter"),
        GroupId(group),
        20,
        15,
        30,
    )
    .at(GridPosition::new(x, y))
}

/// State with the combatants in initiative order as given.
pub fn state_with(combatants: Vec<Combatant>) -> CombatState {
    let mut state = CombatState::new(42);
    let order = combatants.iter().map(|c| c.id).collect();
    for combatant in combatants {
        state
            .add_combatant(combatant)
            .expect("fixture combatants must not collide");
    }
    state
        .set_initiative(order)
        .expect("fixture initiative must be valid");
    state
}
