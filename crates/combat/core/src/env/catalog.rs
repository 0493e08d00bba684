use std::sync::Arc;

use crate::action::{ActionDef, ActionId, ActionTiming};
use crate::modifier::{ConditionExpr, ModifierId, ModifierValue};
use crate::state::CreatureKind;

/// Always-on trait of a creature kind.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassiveTrait {
    /// Changes the budget slot the listed actions consume
    /// (e.g. Cunning Action turns Dash and Disengage into bonus actions).
    TimingOverride {
        actions: Vec<ActionId>,
        timing: ActionTiming,
    },
    /// Contributes a modifier to the creature's own attacks while `when` holds.
    Conditional {
        label: String,
        #[cfg_attr(feature = "serde", serde(default = "ConditionExpr::always"))]
        when: ConditionExpr,
        effect: ModifierValue,
    },
}

/// Modifier a creature projects onto nearby allies (itself included).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraDef {
    pub label: String,
    pub radius_feet: u32,
    #[cfg_attr(feature = "serde", serde(default = "ConditionExpr::always"))]
    pub when: ConditionExpr,
    pub effect: ModifierValue,
}

/// Everything the engine knows about one creature kind.
///
/// Action definitions are shared through `Arc`; every combatant of the kind
/// refers to the same allocations.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatureDefinition {
    pub kind: CreatureKind,
    pub actions: Vec<Arc<ActionDef>>,
    /// Schema modifiers attached to the creature's traits.
    pub modifiers: Vec<ModifierId>,
    pub passives: Vec<PassiveTrait>,
    pub auras: Vec<AuraDef>,
}

impl CreatureDefinition {
    pub fn new(kind: CreatureKind) -> Self {
        Self {
            kind,
            actions: Vec::new(),
            modifiers: Vec::new(),
            passives: Vec::new(),
            auras: Vec::new(),
        }
    }

    pub fn action(&self, id: &ActionId) -> Option<&Arc<ActionDef>> {
        self.actions.iter().find(|a| &a.id == id)
    }

    /// Timing the action has for this creature after passive overrides.
    pub fn timing_of(&self, action: &ActionDef) -> ActionTiming {
        self.passives
            .iter()
            .rev()
            .find_map(|passive| match passive {
                PassiveTrait::TimingOverride { actions, timing } if actions.contains(&action.id) => {
                    Some(*timing)
                }
                _ => None,
            })
            .unwrap_or(action.timing)
    }
}

/// Read-only creature definitions keyed by kind.
pub trait CatalogOracle: Send + Sync {
    fn creature(&self, kind: &CreatureKind) -> Option<&CreatureDefinition>;
}
