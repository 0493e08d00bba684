//! Gathers every modifier that applies to one attempted action.

use std::borrow::Cow;

use super::expression::opposite_sides;
use super::{
    Diagnostic, EvalContext, Modifier, ModifierAxis, ModifierRegistry, ModifierSet,
    ModifierSource, ModifierValue, Override,
};
use crate::action::ActionDef;
use crate::config::CombatConfig;
use crate::env::{CatalogOracle, PassiveTrait};
use crate::state::{BuffEffect, CombatState, Combatant, ConditionKind};

/// Collects the modifiers for `actor` using `action` against `target`.
///
/// `actor` may be a hypothetical copy (for example at a planned position);
/// the state is only read. Sources are consulted in precedence order:
/// conditions, buffs, situational factors, schema modifiers, passive traits,
/// auras. Schema and passive modifiers that fail to evaluate are skipped and
/// recorded as diagnostics.
pub fn gather_modifiers<C>(
    actor: &Combatant,
    target: Option<&Combatant>,
    action: &ActionDef,
    state: &CombatState,
    catalog: &C,
    registry: &ModifierRegistry,
) -> ModifierSet
where
    C: CatalogOracle + ?Sized,
{
    let mut set = ModifierSet::new();
    let ctx = EvalContext::new(state, actor, target, action);

    condition_modifiers(&mut set, actor, target, action);
    buff_modifiers(&mut set, actor, target);
    situational_modifiers(&mut set, state, actor, target, action);

    let definition = catalog.creature(&actor.kind);
    if definition.is_none() {
        set.diagnose(Diagnostic {
            modifier: None,
            source: ModifierSource::Schema,
            message: format!("creature kind '{}' is not in the catalog", actor.kind),
        });
    }

    // ===== schema =====
    let schema_ids = definition
        .into_iter()
        .flat_map(|d| d.modifiers.iter())
        .chain(action.modifiers.iter());
    for id in schema_ids {
        let Some(entry) = registry.get(id) else {
            set.diagnose(Diagnostic {
                modifier: Some(id.clone()),
                source: ModifierSource::Schema,
                message: "not registered".to_string(),
            });
            continue;
        };
        match entry.evaluator.evaluate(&ctx) {
            Ok(Some(value)) => set.push(Modifier::new(
                ModifierSource::Schema,
                Cow::Owned(entry.label.clone()),
                value,
            )),
            Ok(None) => {}
            Err(error) => set.diagnose(Diagnostic {
                modifier: Some(id.clone()),
                source: ModifierSource::Schema,
                message: error.to_string(),
            }),
        }
    }

    // ===== passive traits =====
    for passive in definition.into_iter().flat_map(|d| d.passives.iter()) {
        let PassiveTrait::Conditional {
            label,
            when,
            effect,
        } = passive
        else {
            continue;
        };
        match when.evaluate(&ctx) {
            Ok(true) => set.push(Modifier::new(
                ModifierSource::Passive,
                Cow::Owned(label.clone()),
                *effect,
            )),
            Ok(false) => {}
            Err(error) => set.diagnose(Diagnostic {
                modifier: None,
                source: ModifierSource::Passive,
                message: format!("{label}: {error}"),
            }),
        }
    }

    // ===== auras =====
    for ally in state.living() {
        if !state.is_ally(actor.id, ally.id) || ally.conditions.is_incapacitated() {
            continue;
        }
        let Some(ally_definition) = catalog.creature(&ally.kind) else {
            continue;
        };
        let origin = if ally.id == actor.id {
            actor.position
        } else {
            ally.position
        };
        for aura in &ally_definition.auras {
            if origin.distance_feet(actor.position) > aura.radius_feet {
                continue;
            }
            match aura.when.evaluate(&ctx) {
                Ok(true) => set.push(Modifier::new(
                    ModifierSource::Aura,
                    Cow::Owned(aura.label.clone()),
                    aura.effect,
                )),
                Ok(false) => {}
                Err(error) => set.diagnose(Diagnostic {
                    modifier: None,
                    source: ModifierSource::Aura,
                    message: format!("{}: {error}", aura.label),
                }),
            }
        }
    }

    set
}

fn condition_modifiers(
    set: &mut ModifierSet,
    actor: &Combatant,
    target: Option<&Combatant>,
    action: &ActionDef,
) {
    if action.attack.is_none() {
        return;
    }
    let push = |set: &mut ModifierSet, kind: ConditionKind, value: ModifierValue| {
        let label: &'static str = kind.into();
        set.push(Modifier::new(ModifierSource::Condition, label, value));
    };

    for condition in actor.conditions.iter() {
        match condition.kind {
            ConditionKind::Blinded
            | ConditionKind::Frightened
            | ConditionKind::Poisoned
            | ConditionKind::Restrained => {
                push(set, condition.kind, ModifierValue::disadvantage());
            }
            ConditionKind::Prone if action.is_ranged() => {
                push(set, condition.kind, ModifierValue::disadvantage());
            }
            ConditionKind::Invisible => push(set, condition.kind, ModifierValue::advantage()),
            _ => {}
        }
    }

    let Some(target) = target else {
        return;
    };
    let within_reach = actor.position.is_adjacent(target.position);
    for condition in target.conditions.iter() {
        match condition.kind {
            ConditionKind::Blinded
            | ConditionKind::Restrained
            | ConditionKind::Stunned
            | ConditionKind::Petrified => push(set, condition.kind, ModifierValue::advantage()),
            ConditionKind::Paralyzed | ConditionKind::Unconscious => {
                push(set, condition.kind, ModifierValue::advantage());
                if within_reach {
                    push(
                        set,
                        condition.kind,
                        ModifierValue::Override(Override::AutoCrit(true)),
                    );
                }
            }
            ConditionKind::Prone => {
                if within_reach && action.is_melee() {
                    push(set, condition.kind, ModifierValue::advantage());
                } else {
                    push(set, condition.kind, ModifierValue::disadvantage());
                }
            }
            ConditionKind::Dodging | ConditionKind::Invisible => {
                push(set, condition.kind, ModifierValue::disadvantage());
            }
            _ => {}
        }
    }
}

fn buff_modifiers(set: &mut ModifierSet, actor: &Combatant, target: Option<&Combatant>) {
    for buff in &actor.buffs {
        let value = match buff.effect {
            BuffEffect::AttackBonus(v) => ModifierValue::magnitude(ModifierAxis::Attack, v),
            BuffEffect::DamageBonus(v) => ModifierValue::magnitude(ModifierAxis::Damage, v),
            BuffEffect::Advantage => ModifierValue::advantage(),
            BuffEffect::Disadvantage => ModifierValue::disadvantage(),
            BuffEffect::AcBonus(_) | BuffEffect::SaveBonus(_) => continue,
        };
        set.push(Modifier::new(ModifierSource::Buff, "actor buff", value));
    }

    for buff in target.into_iter().flat_map(|t| t.buffs.iter()) {
        let value = match buff.effect {
            BuffEffect::AcBonus(v) => ModifierValue::magnitude(ModifierAxis::ArmorClass, v),
            BuffEffect::SaveBonus(v) => ModifierValue::magnitude(ModifierAxis::Save, v),
            _ => continue,
        };
        set.push(Modifier::new(ModifierSource::Buff, "target buff", value));
    }
}

fn situational_modifiers(
    set: &mut ModifierSet,
    state: &CombatState,
    actor: &Combatant,
    target: Option<&Combatant>,
    action: &ActionDef,
) {
    let Some(target) = target else {
        return;
    };
    if action.attack.is_none() || target.id == actor.id {
        return;
    }

    // Half cover only; never upgraded.
    let line = actor.position.line_between(target.position);
    if !line.is_empty() {
        let blockers = line
            .iter()
            .filter(|cell| {
                state
                    .occupant_at(**cell)
                    .is_some_and(|id| id != actor.id && id != target.id)
            })
            .count();
        if blockers * 2 >= line.len() {
            set.push(Modifier::new(
                ModifierSource::Situational,
                "half cover",
                ModifierValue::magnitude(ModifierAxis::ArmorClass, CombatConfig::HALF_COVER_AC),
            ));
        }
    }

    if action.is_ranged() {
        if action
            .range
            .is_long(actor.position.distance_feet(target.position))
        {
            set.push(Modifier::new(
                ModifierSource::Situational,
                "long range",
                ModifierValue::disadvantage(),
            ));
        }

        let threatened = state.living().any(|other| {
            other.id != actor.id
                && state.is_enemy(actor.id, other.id)
                && !other.conditions.is_incapacitated()
                && other.position.is_adjacent(actor.position)
        });
        if threatened {
            set.push(Modifier::new(
                ModifierSource::Situational,
                "ranged in melee",
                ModifierValue::disadvantage(),
            ));
        }
    }

    if action.is_melee() && actor.position.is_adjacent(target.position) {
        let flanked = state.living().any(|ally| {
            ally.id != actor.id
                && ally.id != target.id
                && state.is_ally(actor.id, ally.id)
                && !ally.conditions.is_incapacitated()
                && opposite_sides(target.position, ally.position, actor.position)
        });
        if flanked {
            set.push(Modifier::new(
                ModifierSource::Situational,
                "flanking",
                ModifierValue::advantage(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionRange, DiceExpr};
    use crate::env::AuraDef;
    use crate::modifier::{ConditionExpr, ModifierDefinition, ModifierId, RollMode, Subject};
    use crate::state::{
        CombatantId, ConditionDuration, ConditionInstance, GridPosition,
    };
    use crate::testing::{TestCatalog, combatant, state_with};

    fn sword() -> ActionDef {
        ActionDef::weapon_attack("sword", ActionRange::melee(5), 5, DiceExpr::new(1, 8, 3))
    }

    fn bow() -> ActionDef {
        ActionDef::weapon_attack("bow", ActionRange::ranged(80, 320), 5, DiceExpr::new(1, 8, 3))
    }

    #[test]
    fn test_flanking_grants_advantage() {
        let state = state_with(vec![
            combatant(1, 1, 0, 0),
            combatant(2, 2, 1, 0),
            combatant(3, 1, 2, 0),
        ]);
        let catalog = TestCatalog::default();
        let set = gather_modifiers(
            state.combatant(CombatantId(1)).unwrap(),
            state.combatant(CombatantId(2)),
            &sword(),
            &state,
            &catalog,
            &ModifierRegistry::empty(),
        );
        assert_eq!(set.roll_mode(), RollMode::Advantage);
        assert!(set.iter().any(|m| m.label == "flanking"));
    }

    #[test]
    fn test_half_cover_and_ranged_penalties() {
        // archer at (0,0), blocker at (2,0), target at (4,0): one of three line cells occupied
        let state = state_with(vec![
            combatant(1, 1, 0, 0),
            combatant(2, 2, 4, 0),
            combatant(3, 2, 2, 0),
        ]);
        let catalog = TestCatalog::default();
        let archer = state.combatant(CombatantId(1)).unwrap();
        let target = state.combatant(CombatantId(2));
        let set = gather_modifiers(archer, target, &bow(), &state, &catalog, &ModifierRegistry::empty());
        assert_eq!(set.total(ModifierAxis::ArmorClass), 0);

        // blocker adjacent to the archer
        let mut close = state.clone();
        if let Some(c) = close.combatant_mut(CombatantId(3)) {
            c.position = GridPosition::new(1, 0);
        }
        let mut hypothetical = close.combatant(CombatantId(1)).unwrap().clone();
        hypothetical.position = GridPosition::new(0, 0);
        let set = gather_modifiers(
            &hypothetical,
            close.combatant(CombatantId(2)),
            &bow(),
            &close,
            &catalog,
            &ModifierRegistry::empty(),
        );
        assert!(set.iter().any(|m| m.label == "ranged in melee"));
        assert_eq!(set.roll_mode(), RollMode::Disadvantage);

        // target 2 cells away with one blocker in between: half cover
        let short = state_with(vec![
            combatant(1, 1, 0, 0),
            combatant(2, 2, 2, 0),
            combatant(3, 2, 1, 1),
            combatant(4, 1, 1, 0),
        ]);
        let set = gather_modifiers(
            short.combatant(CombatantId(1)).unwrap(),
            short.combatant(CombatantId(2)),
            &bow(),
            &short,
            &catalog,
            &ModifierRegistry::empty(),
        );
        assert_eq!(set.total(ModifierAxis::ArmorClass), CombatConfig::HALF_COVER_AC);
    }

    #[test]
    fn test_target_conditions() {
        let mut target = combatant(2, 2, 1, 0);
        target.conditions.push(ConditionInstance::new(
            ConditionKind::Paralyzed,
            ConditionDuration::Permanent,
        ));
        let state = state_with(vec![combatant(1, 1, 0, 0), target]);
        let set = gather_modifiers(
            state.combatant(CombatantId(1)).unwrap(),
            state.combatant(CombatantId(2)),
            &sword(),
            &state,
            &TestCatalog::default(),
            &ModifierRegistry::empty(),
        );
        assert_eq!(set.roll_mode(), RollMode::Advantage);
        assert!(set.auto_crit());
    }

    #[test]
    fn test_schema_errors_become_diagnostics() {
        let registry = ModifierRegistry::init([ModifierDefinition {
            id: ModifierId::new("bully"),
            label: "bully".to_string(),
            when: Some(ConditionExpr::HasCondition {
                subject: Subject::Target,
                condition: ConditionKind::Prone,
            }),
            effect: ModifierValue::magnitude(ModifierAxis::Damage, 2),
        }]);
        let mut catalog = TestCatalog::default();
        catalog.define("fighter", |d| {
            d.modifiers.push(ModifierId::new("bully"));
            d.modifiers.push(ModifierId::new("missing"));
        });

        let state = state_with(vec![combatant(1, 1, 0, 0), combatant(2, 2, 1, 0)]);
        let actor = state.combatant(CombatantId(1)).unwrap();

        // no target bound: the guard cannot be evaluated
        let set = gather_modifiers(actor, None, &sword(), &state, &catalog, &registry);
        assert_eq!(set.diagnostics().len(), 2);
        assert_eq!(set.total(ModifierAxis::Damage), 0);
    }

    #[test]
    fn test_auras_skip_incapacitated_allies() {
        let mut catalog = TestCatalog::default();
        catalog.define("fighter", |d| {
            d.auras.push(AuraDef {
                label: "banner".to_string(),
                radius_feet: 10,
                when: ConditionExpr::Always,
                effect: ModifierValue::magnitude(ModifierAxis::Attack, 1),
            });
        });
        let mut sleeper = combatant(3, 1, 0, 1);
        sleeper.conditions.push(ConditionInstance::new(
            ConditionKind::Unconscious,
            ConditionDuration::Permanent,
        ));
        let state = state_with(vec![combatant(1, 1, 0, 0), combatant(2, 2, 1, 0), sleeper]);

        let set = gather_modifiers(
            state.combatant(CombatantId(1)).unwrap(),
            state.combatant(CombatantId(2)),
            &sword(),
            &state,
            &catalog,
            &ModifierRegistry::empty(),
        );
        // only the actor's own banner counts
        assert_eq!(set.total(ModifierAxis::Attack), 1);
        assert!(set.iter().all(|m| m.source != ModifierSource::Condition));
    }
}
