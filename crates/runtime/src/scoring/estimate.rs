//! Outcome distribution of one action against one target.
//!
//! The damage distribution mixes every branch of the roll: miss, hit and
//! critical for attacks; failed and successful saves for save actions.
//! Derived figures (capped damage, kill probability, effective healing) are
//! read off the mixture, never off a mean.

use combat_core::combat::{HitOdds, Pmf, save_success_probability};
use combat_core::{
    ActionDef, ActionEffect, Combatant, ConditionDuration, ConditionKind, ModifierAxis, ModifierSet,
    RollMode, SaveEffect,
};

/// What an action is expected to do to a target.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionEstimate {
    /// Damage dealt, over all roll branches.
    pub damage: Pmf,
    /// Probability the action lands: any hit, a failed save, or 1 with no roll.
    pub success: f64,
    /// Expected damage capped at the target's remaining HP.
    pub expected_damage: f64,
    /// Probability the damage drops the target.
    pub kill_probability: f64,
    /// Expected healing capped at the target's missing HP.
    pub expected_healing: f64,
}

/// Estimates `action` against `target` under `modifiers`.
///
/// Pass an empty modifier set for the base (unmodified) estimate.
pub fn estimate_action(action: &ActionDef, modifiers: &ModifierSet, target: &Combatant) -> ActionEstimate {
    let damage_bonus = modifiers.total(ModifierAxis::Damage);
    let base = action
        .damage
        .map(|dice| Pmf::from_dice(dice).shift(damage_bonus))
        .unwrap_or_else(|| Pmf::point(0));
    let none = Pmf::point(0);

    let (damage, success) = if let Some(attack) = action.attack {
        let odds = HitOdds::attack(
            attack.bonus + modifiers.total(ModifierAxis::Attack),
            target.armor_class + modifiers.total(ModifierAxis::ArmorClass),
            modifiers.roll_mode(),
            modifiers.auto_crit(),
            modifiers.auto_miss(),
        );
        let crit = action
            .damage
            .map(|dice| Pmf::from_dice(dice.doubled_dice()).shift(damage_bonus))
            .unwrap_or_else(|| Pmf::point(0));
        let damage = Pmf::mixture([(odds.miss, &none), (odds.hit, &base), (odds.crit, &crit)]);
        (damage, odds.any_hit())
    } else if let Some(save) = action.save {
        let p_save = save_success_probability(
            target.saves.get(save.ability) + modifiers.total(ModifierAxis::Save),
            save.dc as i32,
            RollMode::Normal,
        );
        let on_save = match save.on_save {
            SaveEffect::Half => base.map(|v| v / 2),
            SaveEffect::None => Pmf::point(0),
        };
        let damage = Pmf::mixture([(1.0 - p_save, &base), (p_save, &on_save)]);
        (damage, 1.0 - p_save)
    } else {
        (base, 1.0)
    };

    let hp = target.hp.current;
    let expected_damage = if action.damage.is_some() {
        damage.expected_capped(hp)
    } else {
        0.0
    };
    let kill_probability = if action.damage.is_some() && hp > 0 {
        damage.prob_at_least(hp)
    } else {
        0.0
    };

    // Healing only lands if the target survives the action's own damage.
    let expected_healing = action
        .healing
        .map(|dice| {
            Pmf::from_dice(dice).expected_capped(target.hp.missing()) * success * (1.0 - kill_probability)
        })
        .unwrap_or(0.0);

    ActionEstimate {
        damage,
        success,
        expected_damage,
        kill_probability,
        expected_healing,
    }
}

/// Expected number of rounds a condition stays on its target.
///
/// Saves at the end of each turn make long durations unlikely to run their
/// course, so kinds with a repeating save are capped by the table.
pub fn expected_condition_rounds(kind: ConditionKind, duration: ConditionDuration) -> f64 {
    let typical: f64 = match kind {
        ConditionKind::Paralyzed => 2.5,
        ConditionKind::Stunned => 1.5,
        ConditionKind::Frightened => 3.0,
        ConditionKind::Restrained => 2.5,
        ConditionKind::Prone => 0.5,
        ConditionKind::Incapacitated => 2.0,
        ConditionKind::Blinded => 2.0,
        ConditionKind::Charmed => 3.0,
        ConditionKind::Deafened => 1.0,
        ConditionKind::Grappled => 2.0,
        ConditionKind::Poisoned => 3.0,
        ConditionKind::Petrified => 5.0,
        ConditionKind::Unconscious => 2.0,
        ConditionKind::Grappling
        | ConditionKind::Invisible
        | ConditionKind::Dodging
        | ConditionKind::Disengaging => 1.5,
    };
    match duration {
        ConditionDuration::Rounds(n) => typical.min(n as f64).max(0.5),
        ConditionDuration::UntilTurnStart | ConditionDuration::UntilTurnEnd => 0.5,
        ConditionDuration::UntilEscape | ConditionDuration::Permanent => typical,
    }
}

/// Share of the holder's damage output a condition takes away.
pub fn condition_impact(kind: ConditionKind) -> f64 {
    if kind.is_incapacitating() {
        return 1.0;
    }
    match kind {
        ConditionKind::Blinded
        | ConditionKind::Frightened
        | ConditionKind::Poisoned
        | ConditionKind::Restrained => 0.25,
        ConditionKind::Prone | ConditionKind::Grappled | ConditionKind::Charmed => 0.1,
        _ => 0.0,
    }
}

/// Conditions `action` imposes, with their durations.
pub fn imposed_conditions(action: &ActionDef) -> impl Iterator<Item = (ConditionKind, ConditionDuration)> + '_ {
    action.effects.iter().filter_map(|effect| match effect {
        ActionEffect::ApplyCondition { kind, duration, .. } => Some((*kind, *duration)),
        ActionEffect::GrantBuff(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{
        Ability, ActionRange, ActionTiming, CombatantId, CreatureKind, DiceExpr, GroupId, HitPoints,
        SaveBonuses, SaveSpec, TargetKind,
    };

    fn target(hp: u32, ac: i32) -> Combatant {
        Combatant::new(CombatantId(2), CreatureKind::new("goblin"), GroupId(2), hp, ac, 30)
    }

    #[test]
    fn test_attack_mixes_miss_hit_and_crit() {
        // +4 vs AC 14: natural 10-19 hit, 20 crits.
        let action = ActionDef::weapon_attack("scimitar", ActionRange::melee(5), 4, DiceExpr::new(1, 6, 2));
        let estimate = estimate_action(&action, &ModifierSet::new(), &target(50, 14));

        assert!((estimate.success - 0.55).abs() < 1e-9);
        // 0.5 × 5.5 + 0.05 × 9.0
        assert!((estimate.damage.expected() - 3.2).abs() < 1e-9);
        assert!((estimate.damage.total() - 1.0).abs() < 1e-9);
        assert_eq!(estimate.kill_probability, 0.0);
    }

    #[test]
    fn test_damage_is_capped_at_remaining_hp() {
        let action = ActionDef::weapon_attack("greataxe", ActionRange::melee(5), 20, DiceExpr::new(1, 12, 3));
        let wounded = target(40, 10).with_hp(HitPoints::new(2, 40));
        let estimate = estimate_action(&action, &ModifierSet::new(), &wounded);

        // Only a natural 1 misses.
        assert!((estimate.expected_damage - 0.95 * 2.0).abs() < 1e-9);
        assert!((estimate.kill_probability - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_half_on_save_keeps_damage_on_success() {
        let breath = ActionDef::new("breath", ActionTiming::Action, TargetKind::Enemy, ActionRange::ranged(15, 15))
            .with_save(SaveSpec {
                ability: Ability::Dex,
                dc: 11,
                on_save: SaveEffect::Half,
            })
            .with_damage(DiceExpr::flat(10));
        let dodgy = target(50, 10).with_saves(SaveBonuses::default().with(Ability::Dex, 0));
        let estimate = estimate_action(&breath, &ModifierSet::new(), &dodgy);

        // Save succeeds on 11+: half the time for 5, half for 10.
        assert!((estimate.success - 0.5).abs() < 1e-9);
        assert!((estimate.expected_damage - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_healing_is_capped_at_missing_hp() {
        let cure = ActionDef::new("cure", ActionTiming::Action, TargetKind::Ally, ActionRange::melee(5))
            .with_healing(DiceExpr::flat(8));
        let scratched = target(20, 10).with_hp(HitPoints::new(17, 20));
        let estimate = estimate_action(&cure, &ModifierSet::new(), &scratched);

        assert_eq!(estimate.expected_healing, 3.0);
        assert_eq!(estimate.expected_damage, 0.0);
    }

    #[test]
    fn test_condition_rounds_respect_declared_duration() {
        assert_eq!(
            expected_condition_rounds(ConditionKind::Paralyzed, ConditionDuration::Rounds(1)),
            1.0
        );
        assert_eq!(
            expected_condition_rounds(ConditionKind::Paralyzed, ConditionDuration::UntilEscape),
            2.5
        );
        assert_eq!(condition_impact(ConditionKind::Stunned), 1.0);
        assert_eq!(condition_impact(ConditionKind::Dodging), 0.0);
    }
}
