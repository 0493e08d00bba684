//! Limited-use resource pools: spell slots, recharge timers, per-day uses.

use std::collections::BTreeMap;

use crate::action::{ActionDef, ActionId, ResourceCost};
use crate::config::CombatConfig;

/// Resource pools of a single combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resources {
    /// Remaining slots per tier; index 0 is unused (cantrips cost nothing).
    spell_slots: [u8; CombatConfig::MAX_SPELL_TIER + 1],
    /// Turns until a recharge action is ready again; 0 means ready.
    recharge: BTreeMap<ActionId, u8>,
    /// Remaining uses of per-day actions.
    uses: BTreeMap<ActionId, u8>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial pools for a set of actions: recharge timers start ready and
    /// per-day actions start with their full use count.
    pub fn for_actions<'a>(actions: impl IntoIterator<Item = &'a ActionDef>) -> Self {
        let mut resources = Self::new();
        for action in actions {
            match action.cost {
                ResourceCost::Recharge { .. } => {
                    resources.recharge.insert(action.id.clone(), 0);
                }
                ResourceCost::PerDay { uses } => {
                    resources.uses.insert(action.id.clone(), uses);
                }
                ResourceCost::None | ResourceCost::SpellSlot { .. } => {}
            }
        }
        resources
    }

    /// Sets the number of slots for a tier (1-9). Out-of-range tiers are ignored.
    pub fn with_spell_slots(mut self, tier: u8, count: u8) -> Self {
        if let Some(slot) = self.spell_slots.get_mut(tier as usize) {
            if tier > 0 {
                *slot = count;
            }
        }
        self
    }

    pub fn spell_slots(&self, tier: u8) -> u8 {
        self.spell_slots.get(tier as usize).copied().unwrap_or(0)
    }

    pub fn recharge_timer(&self, action: &ActionId) -> u8 {
        self.recharge.get(action).copied().unwrap_or(0)
    }

    pub fn uses_left(&self, action: &ActionId) -> u8 {
        self.uses.get(action).copied().unwrap_or(0)
    }

    /// Checks whether the pool backing `cost` can pay for one use of `action`.
    pub fn can_pay(&self, action: &ActionId, cost: ResourceCost) -> bool {
        match cost {
            ResourceCost::None => true,
            ResourceCost::SpellSlot { tier } => tier == 0 || self.spell_slots(tier) > 0,
            ResourceCost::Recharge { .. } => self.recharge_timer(action) == 0,
            ResourceCost::PerDay { .. } => self.uses_left(action) > 0,
        }
    }

    /// Pays for one use of `action`.
    ///
    /// Recharge actions get a timer of the expected number of turns until the
    /// recharge roll succeeds, `ceil(6 / window)`.
    pub fn consume(&mut self, action: &ActionId, cost: ResourceCost) {
        match cost {
            ResourceCost::None => {}
            ResourceCost::SpellSlot { tier } => {
                if let Some(slot) = self.spell_slots.get_mut(tier as usize) {
                    *slot = slot.saturating_sub(1);
                }
            }
            ResourceCost::Recharge { min_roll } => {
                self.recharge
                    .insert(action.clone(), Self::recharge_turns(min_roll));
            }
            ResourceCost::PerDay { .. } => {
                if let Some(uses) = self.uses.get_mut(action) {
                    *uses = uses.saturating_sub(1);
                }
            }
        }
    }

    /// Expected turns until a d6 roll of at least `min_roll` succeeds.
    pub fn recharge_turns(min_roll: u8) -> u8 {
        let window = 7u8.saturating_sub(min_roll.clamp(1, 6));
        6u8.div_ceil(window)
    }

    /// Counts all recharge timers down by one turn.
    pub fn tick_recharge(&mut self) {
        for timer in self.recharge.values_mut() {
            *timer = timer.saturating_sub(1);
        }
    }
}
