use crate::state::CombatantId;

/// Numeric or roll-mode benefit granted by a buff.
///
/// Attack, damage and roll-mode buffs apply to the holder's own attacks.
/// Armor-class and save buffs apply when the holder is attacked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuffEffect {
    AttackBonus(i32),
    DamageBonus(i32),
    AcBonus(i32),
    SaveBonus(i32),
    Advantage,
    Disadvantage,
}

impl BuffEffect {
    /// Rough numeric size of the benefit, used when valuing a buff.
    ///
    /// A roll-mode change is worth about as much as a +4 bonus.
    pub fn magnitude(&self) -> f64 {
        match *self {
            BuffEffect::AttackBonus(v)
            | BuffEffect::DamageBonus(v)
            | BuffEffect::AcBonus(v)
            | BuffEffect::SaveBonus(v) => v as f64,
            BuffEffect::Advantage => 4.0,
            BuffEffect::Disadvantage => -4.0,
        }
    }
}

/// An active buff on a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Buff {
    pub effect: BuffEffect,
    /// Combatant that granted the buff. Cleared from everyone when it dies.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source: Option<CombatantId>,
    /// Remaining holder turns; `None` lasts until removed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rounds: Option<u8>,
}

impl Buff {
    pub fn new(effect: BuffEffect) -> Self {
        Self {
            effect,
            source: None,
            rounds: None,
        }
    }

    pub fn from_source(mut self, source: CombatantId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn for_rounds(mut self, rounds: u8) -> Self {
        self.rounds = Some(rounds);
        self
    }
}
