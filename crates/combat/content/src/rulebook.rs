//! Rule tables bundled behind [`RulesOracle`].

use std::sync::Arc;

use combat_core::action::standard_actions;
use combat_core::{ActionDef, ActionId, LifecycleRules, ModifierRegistry, RulesOracle};

/// Lifecycle table, modifier registry and the actions every combatant has.
#[derive(Clone, Debug)]
pub struct Rulebook {
    lifecycle: LifecycleRules,
    modifiers: ModifierRegistry,
    standard: Vec<Arc<ActionDef>>,
    allow_list: Vec<ActionId>,
}

impl Rulebook {
    /// Rulebook with the built-in Dash/Disengage/Dodge actions.
    pub fn new(lifecycle: LifecycleRules, modifiers: ModifierRegistry) -> Self {
        Self {
            lifecycle,
            modifiers,
            standard: standard_actions().into_iter().map(Arc::new).collect(),
            allow_list: Vec::new(),
        }
    }

    /// Actions that remain usable while incapacitated.
    pub fn with_allow_list(mut self, allow_list: Vec<ActionId>) -> Self {
        self.allow_list = allow_list;
        self
    }
}

impl Default for Rulebook {
    fn default() -> Self {
        Self::new(LifecycleRules::default(), ModifierRegistry::empty())
    }
}

impl RulesOracle for Rulebook {
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
