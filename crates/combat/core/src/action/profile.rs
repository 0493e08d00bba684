//! Action definitions - the complete data-declared description of an action.
//!
//! Definitions are supplied by content catalogs, are immutable, and are shared
//! through `Arc` by every combatant of the same creature kind. The engine
//! interprets them generically; no action is hard-coded except the standard
//! actions in [`super::standard`].

use std::borrow::Borrow;
use std::fmt;

use crate::action::dice::DiceExpr;
use crate::modifier::ModifierId;
use crate::state::{Ability, Buff, CombatantId, ConditionDuration, ConditionKind};

/// Identifier of an action definition.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which per-round budget slot an action consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionTiming {
    Action,
    BonusAction,
    Reaction,
    Free,
}

/// How the engine resolves an action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    /// Generic resolution: attack or save, damage, healing, effects.
    Declared,
    /// Adds base movement to the budget.
    Dash,
    /// Movement provokes no retaliation until turn end.
    Disengage,
    /// Attacks against the actor have disadvantage until its next turn.
    Dodge,
    /// Contested check to end a condition.
    Escape(EscapeSpec),
}

/// Condition an escape action tries to end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EscapeSpec {
    pub condition: ConditionKind,
    pub source: Option<CombatantId>,
    pub dc: u8,
}

/// Delivery of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeKind {
    Melee,
    Ranged,
    /// Affects the actor only.
    Personal,
}

/// Reach of an action in feet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRange {
    pub kind: RangeKind,
    /// Range without penalty.
    pub normal: u32,
    /// Maximum range; attacks beyond `normal` have disadvantage.
    #[cfg_attr(feature = "serde", serde(default))]
    pub long: Option<u32>,
}

impl ActionRange {
    pub const fn melee(reach: u32) -> Self {
        Self {
            kind: RangeKind::Melee,
            normal: reach,
            long: None,
        }
    }

    pub const fn ranged(normal: u32, long: u32) -> Self {
        Self {
            kind: RangeKind::Ranged,
            normal,
            long: Some(long),
        }
    }

    pub const fn personal() -> Self {
        Self {
            kind: RangeKind::Personal,
            normal: 0,
            long: None,
        }
    }

    /// Maximum reach in feet.
    pub fn max(&self) -> u32 {
        self.long.unwrap_or(self.normal).max(self.normal)
    }

    /// True if `feet` lies beyond normal range but within long range.
    pub fn is_long(&self, feet: u32) -> bool {
        feet > self.normal && feet <= self.max()
    }
}

bitflags::bitflags! {
    /// Descriptive properties used by prerequisites and modifier predicates.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ActionProperties: u16 {
        const MELEE_WEAPON = 1 << 0;
        const RANGED_WEAPON = 1 << 1;
        const LIGHT = 1 << 2;
        const FINESSE = 1 << 3;
        const SPELL = 1 << 4;
        const HEAVY = 1 << 5;
        const NATURAL = 1 << 6;
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ActionProperties {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        bitflags::serde::serialize(self, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ActionProperties {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bitflags::serde::deserialize(deserializer)
    }
}

/// Who an action may target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetKind {
    Enemy,
    Ally,
    /// The actor itself; no other target is legal.
    SelfOnly,
}

/// Attack roll made against the target's armor class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackSpec {
    pub bonus: i32,
}

/// What a successful save does to the action's damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SaveEffect {
    Half,
    None,
}

/// Saving throw the target makes against the action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveSpec {
    pub ability: Ability,
    pub dc: u8,
    pub on_save: SaveEffect,
}

/// Secondary effect applied when the action succeeds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionEffect {
    /// Imposes a condition on the target with the actor as source.
    ApplyCondition {
        kind: ConditionKind,
        duration: ConditionDuration,
        #[cfg_attr(feature = "serde", serde(default))]
        escape_dc: Option<u8>,
    },
    /// Grants a buff to the target.
    GrantBuff(Buff),
}

/// Resource that must be available (and is consumed) to use an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceCost {
    #[default]
    None,
    SpellSlot {
        tier: u8,
    },
    /// Recharges on a d6 roll of at least `min_roll`.
    Recharge {
        min_roll: u8,
    },
    PerDay {
        uses: u8,
    },
}

/// Requirement on an action taken earlier in the same turn.
///
/// Example: an off-hand attack requires a preceding main-action attack with a
/// light melee weapon.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorActionRequirement {
    /// Timings the prior action may have had.
    pub timings: Vec<ActionTiming>,
    /// Properties the prior action must all carry.
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: ActionProperties,
}

impl PriorActionRequirement {
    pub fn is_met_by(&self, record: &ActionRecord) -> bool {
        self.timings.contains(&record.timing) && record.properties.contains(self.properties)
    }
}

/// Record of an action taken this turn, kept for prerequisite checks.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRecord {
    pub action: ActionId,
    pub timing: ActionTiming,
    pub properties: ActionProperties,
}

/// Complete static definition of an action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionDef {
    pub id: ActionId,
    pub name: String,
    pub timing: ActionTiming,
    pub kind: ActionKind,
    pub target: TargetKind,
    pub range: ActionRange,
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: ActionProperties,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack: Option<AttackSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub save: Option<SaveSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<DiceExpr>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub healing: Option<DiceExpr>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<ActionEffect>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: ResourceCost,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requires: Option<PriorActionRequirement>,
    /// Schema modifiers this action participates in.
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<ModifierId>,
}

impl ActionDef {
    /// A declared action with no roll, damage or effects.
    pub fn new(id: impl Into<String>, timing: ActionTiming, target: TargetKind, range: ActionRange) -> Self {
        let id = ActionId::new(id);
        Self {
            name: id.0.clone(),
            id,
            timing,
            kind: ActionKind::Declared,
            target,
            range,
            properties: ActionProperties::empty(),
            attack: None,
            save: None,
            damage: None,
            healing: None,
            effects: Vec::new(),
            cost: ResourceCost::None,
            requires: None,
            modifiers: Vec::new(),
        }
    }

    /// A single-target weapon attack.
    pub fn weapon_attack(
        id: impl Into<String>,
        range: ActionRange,
        bonus: i32,
        damage: DiceExpr,
    ) -> Self {
        let properties = match range.kind {
            RangeKind::Ranged => ActionProperties::RANGED_WEAPON,
            RangeKind::Melee | RangeKind::Personal => ActionProperties::MELEE_WEAPON,
        };
        Self {
            attack: Some(AttackSpec { bonus }),
            damage: Some(damage),
            properties,
            ..Self::new(id, ActionTiming::Action, TargetKind::Enemy, range)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_kind(mut self, kind: ActionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_timing(mut self, timing: ActionTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_properties(mut self, properties: ActionProperties) -> Self {
        self.properties |= properties;
        self
    }

    pub fn with_save(mut self, save: SaveSpec) -> Self {
        self.save = Some(save);
        self
    }

    pub fn with_damage(mut self, damage: DiceExpr) -> Self {
        self.damage = Some(damage);
        self
    }

    pub fn with_healing(mut self, healing: DiceExpr) -> Self {
        self.healing = Some(healing);
        self
    }

    pub fn with_effect(mut self, effect: ActionEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_cost(mut self, cost: ResourceCost) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_requirement(mut self, requires: PriorActionRequirement) -> Self {
        self.requires = Some(requires);
        self
    }

    pub fn with_modifier(mut self, modifier: ModifierId) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// True for attack-roll or saving-throw actions aimed at an enemy.
    pub fn is_hostile(&self) -> bool {
        self.target == TargetKind::Enemy
    }

    pub fn is_ranged(&self) -> bool {
        self.range.kind == RangeKind::Ranged
    }

    pub fn is_melee(&self) -> bool {
        self.range.kind == RangeKind::Melee
    }

    pub fn record(&self, timing: ActionTiming) -> ActionRecord {
        ActionRecord {
            action: self.id.clone(),
            timing,
            properties: self.properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_long_band() {
        let bow = ActionRange::ranged(80, 320);
        assert!(!bow.is_long(80));
        assert!(bow.is_long(85));
        assert!(!bow.is_long(325));
        assert_eq!(ActionRange::melee(5).max(), 5);
    }

    #[test]
    fn test_prior_requirement_needs_all_properties() {
        let requirement = PriorActionRequirement {
            timings: vec![ActionTiming::Action],
            properties: ActionProperties::MELEE_WEAPON | ActionProperties::LIGHT,
        };
        let dagger = ActionDef::weapon_attack(
            "dagger",
            ActionRange::melee(5),
            4,
            DiceExpr::new(1, 4, 2),
        )
        .with_properties(ActionProperties::LIGHT);
        let greataxe =
            ActionDef::weapon_attack("greataxe", ActionRange::melee(5), 5, DiceExpr::new(1, 12, 3));

        assert!(requirement.is_met_by(&dagger.record(ActionTiming::Action)));
        assert!(!requirement.is_met_by(&greataxe.record(ActionTiming::Action)));
        assert!(!requirement.is_met_by(&dagger.record(ActionTiming::BonusAction)));
    }
}
