//! Actions every combatant has, and generated escape actions.

use crate::state::{Combatant, ConditionInstance, ConditionKind};

use super::{ActionDef, ActionKind, ActionRange, ActionTiming, EscapeSpec, TargetKind};

pub const DASH: &str = "dash";
pub const DISENGAGE: &str = "disengage";
pub const DODGE: &str = "dodge";

/// Dash, Disengage and Dodge.
pub fn standard_actions() -> Vec<ActionDef> {
    [
        (DASH, "Dash", ActionKind::Dash),
        (DISENGAGE, "Disengage", ActionKind::Disengage),
        (DODGE, "Dodge", ActionKind::Dodge),
    ]
    .into_iter()
    .map(|(id, name, kind)| {
        ActionDef::new(id, ActionTiming::Action, TargetKind::SelfOnly, ActionRange::personal())
            .with_name(name)
            .with_kind(kind)
    })
    .collect()
}

/// Escape action for an escapable condition, `None` for any other.
///
/// Only `Grappled` and `Restrained` with an escape DC can be escaped.
pub fn escape_action_for(condition: &ConditionInstance) -> Option<ActionDef> {
    if !matches!(condition.kind, ConditionKind::Grappled | ConditionKind::Restrained) {
        return None;
    }
    let dc = condition.escape_dc?;
    let id = match condition.source {
        Some(source) => format!("escape-{}-{}", condition.kind, source.0),
        None => format!("escape-{}", condition.kind),
    };
    Some(
        ActionDef::new(id, ActionTiming::Action, TargetKind::SelfOnly, ActionRange::personal())
            .with_name(format!("Escape ({})", condition.kind))
            .with_kind(ActionKind::Escape(EscapeSpec {
                condition: condition.kind,
                source: condition.source,
                dc,
            })),
    )
}

/// One escape action per escapable condition on `combatant`.
pub fn escape_actions(combatant: &Combatant) -> Vec<ActionDef> {
    combatant
        .conditions
        .iter()
        .filter_map(escape_action_for)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CombatantId, ConditionDuration};
    use crate::testing::combatant;

    #[test]
    fn test_escape_generated_only_for_escapable_conditions() {
        let fighter = combatant(1, 1, 0, 0)
            .with_condition(
                ConditionInstance::new(ConditionKind::Grappled, ConditionDuration::UntilEscape)
                    .from_source(CombatantId(4))
                    .with_escape_dc(14),
            )
            .with_condition(ConditionInstance::new(ConditionKind::Prone, ConditionDuration::Permanent))
            .with_condition(ConditionInstance::new(
                ConditionKind::Restrained,
                ConditionDuration::UntilEscape,
            ));

        let escapes = escape_actions(&fighter);
        assert_eq!(escapes.len(), 1);
        assert_eq!(escapes[0].id.as_str(), "escape-grappled-4");
        assert_eq!(
            escapes[0].kind,
            ActionKind::Escape(EscapeSpec {
                condition: ConditionKind::Grappled,
                source: Some(CombatantId(4)),
                dc: 14,
            })
        );
    }
}
