//! Modifier pipeline.
//!
//! A [`Modifier`] is either a numeric magnitude on an axis or a boolean
//! override of the attack roll. [`gather_modifiers`] collects every modifier
//! applying to one attempted action into a [`ModifierSet`], which resolves
//! them into the numbers the resolver and the scoring engine consume.
//!
//! # Combination
//!
//! - Magnitudes on the same axis sum.
//! - Overrides resolve by the last applicable source in precedence order.
//!
//! # Source precedence
//!
//! Conditions, buffs, situational factors, schema modifiers, passive traits,
//! auras; see [`ModifierSource`].

pub mod expression;
pub mod gather;
pub mod registry;

use std::borrow::Cow;
use std::fmt;

pub use expression::{ConditionExpr, EvalContext, ExprError, Quantifier, Relation, Subject};
pub use gather::gather_modifiers;
pub use registry::{Evaluator, ModifierDefinition, ModifierRegistry};

/// Identifier of a data-declared modifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ModifierId(pub String);

impl ModifierId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ModifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quantity a magnitude modifier adjusts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierAxis {
    /// Attacker's attack-roll bonus.
    Attack,
    /// Target's armor class.
    ArmorClass,
    /// Damage on a successful hit or failed save.
    Damage,
    /// Target's saving-throw bonus.
    Save,
}

/// How the attack d20 is rolled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

/// Boolean override of the attack roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Override {
    RollMode(RollMode),
    AutoCrit(bool),
    AutoMiss(bool),
}

/// Payload of a modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierValue {
    Magnitude { axis: ModifierAxis, amount: i32 },
    Override(Override),
}

impl ModifierValue {
    pub const fn advantage() -> Self {
        ModifierValue::Override(Override::RollMode(RollMode::Advantage))
    }

    pub const fn disadvantage() -> Self {
        ModifierValue::Override(Override::RollMode(RollMode::Disadvantage))
    }

    pub const fn magnitude(axis: ModifierAxis, amount: i32) -> Self {
        ModifierValue::Magnitude { axis, amount }
    }

    pub fn combine(&self) -> Combine {
        match self {
            ModifierValue::Magnitude { .. } => Combine::Additive,
            ModifierValue::Override(_) => Combine::Override,
        }
    }
}

/// Combination rule of a modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combine {
    Additive,
    Override,
}

/// Category a modifier was gathered from, in precedence order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierSource {
    Condition,
    Buff,
    Situational,
    Schema,
    Passive,
    Aura,
}

/// A single gathered modifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Modifier {
    pub source: ModifierSource,
    pub label: Cow<'static, str>,
    pub value: ModifierValue,
}

impl Modifier {
    pub fn new(source: ModifierSource, label: impl Into<Cow<'static, str>>, value: ModifierValue) -> Self {
        Self {
            source,
            label: label.into(),
            value,
        }
    }

    pub fn combine(&self) -> Combine {
        self.value.combine()
    }
}

/// A modifier that could not be evaluated and was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub modifier: Option<ModifierId>,
    pub source: ModifierSource,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.modifier {
            Some(id) => write!(f, "{} modifier '{}': {}", self.source, id, self.message),
            None => write!(f, "{} modifier: {}", self.source, self.message),
        }
    }
}

/// Ordered modifiers for one attempted action, plus skipped-modifier diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifierSet {
    modifiers: Vec<Modifier>,
    diagnostics: Vec<Diagnostic>,
}

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Sum of all magnitudes on `axis`.
    pub fn total(&self, axis: ModifierAxis) -> i32 {
        self.modifiers
            .iter()
            .filter_map(|m| match m.value {
                ModifierValue::Magnitude { axis: a, amount } if a == axis => Some(amount),
                _ => None,
            })
            .sum()
    }

    fn last_override<T>(&self, pick: impl Fn(Override) -> Option<T>) -> Option<T> {
        self.modifiers.iter().rev().find_map(|m| match m.value {
            ModifierValue::Override(o) => pick(o),
            ModifierValue::Magnitude { .. } => None,
        })
    }

    /// Roll mode set by the last roll-mode override, `Normal` if none.
    pub fn roll_mode(&self) -> RollMode {
        self.last_override(|o| match o {
            Override::RollMode(mode) => Some(mode),
            _ => None,
        })
        .unwrap_or_default()
    }

    pub fn auto_crit(&self) -> bool {
        self.last_override(|o| match o {
            Override::AutoCrit(flag) => Some(flag),
            _ => None,
        })
        .unwrap_or(false)
    }

    pub fn auto_miss(&self) -> bool {
        self.last_override(|o| match o {
            Override::AutoMiss(flag) => Some(flag),
            _ => None,
        })
        .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitudes_sum_per_axis() {
        let mut set = ModifierSet::new();
        set.push(Modifier::new(
            ModifierSource::Buff,
            "bless",
            ModifierValue::magnitude(ModifierAxis::Attack, 2),
        ));
        set.push(Modifier::new(
            ModifierSource::Aura,
            "banner",
            ModifierValue::magnitude(ModifierAxis::Attack, 1),
        ));
        set.push(Modifier::new(
            ModifierSource::Situational,
            "half cover",
            ModifierValue::magnitude(ModifierAxis::ArmorClass, 2),
        ));

        assert_eq!(set.total(ModifierAxis::Attack), 3);
        assert_eq!(set.total(ModifierAxis::ArmorClass), 2);
        assert_eq!(set.total(ModifierAxis::Damage), 0);
    }

    #[test]
    fn test_overrides_last_wins() {
        let mut set = ModifierSet::new();
        assert_eq!(set.roll_mode(), RollMode::Normal);

        set.push(Modifier::new(
            ModifierSource::Condition,
            "poisoned",
            ModifierValue::disadvantage(),
        ));
        set.push(Modifier::new(
            ModifierSource::Situational,
            "flanking",
            ModifierValue::advantage(),
        ));
        set.push(Modifier::new(
            ModifierSource::Passive,
            "reckless",
            ModifierValue::Override(Override::AutoCrit(true)),
        ));

        assert_eq!(set.roll_mode(), RollMode::Advantage);
        assert!(set.auto_crit());
        assert!(!set.auto_miss());
        assert_eq!(set.iter().filter(|m| m.combine() == Combine::Override).count(), 3);
    }
}
