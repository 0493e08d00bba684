use std::sync::Arc;

use crate::action::{ActionDef, ActionId};
use crate::lifecycle::LifecycleRules;
use crate::modifier::ModifierRegistry;

/// Rule tables shared by every combatant of an encounter.
pub trait RulesOracle: Send + Sync {
    /// Linked pairs, death policies and position-sync rules.
    fn lifecycle(&self) -> &LifecycleRules;

    /// Schema modifiers referenced by creatures and actions.
    fn modifiers(&self) -> &ModifierRegistry;

    /// Actions every combatant has (Dash, Disengage, Dodge).
    fn standard_actions(&self) -> &[Arc<ActionDef>];

    /// Actions that stay available under an incapacitating condition.
    fn incapacitated_allow_list(&self) -> &[ActionId] {
        &[]
    }
}
