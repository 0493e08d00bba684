//! Per-round turn budget.
//!
//! Every combatant gets one main action, one bonus action, one reaction and
//! its speed in movement per round. The budget only ever decreases during a
//! turn; it is refilled when the initiative order wraps.

use crate::action::ActionTiming;

/// Remaining per-round allotment of a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnBudget {
    /// Movement left this round, in feet.
    pub movement: u32,
    /// Speed the budget was filled with; Dash adds this again.
    pub base_movement: u32,
    pub action: bool,
    pub bonus_action: bool,
    pub reaction: bool,
}

impl TurnBudget {
    /// A full budget for a creature with the given walking speed (feet).
    pub fn full(speed: u32) -> Self {
        Self {
            movement: speed,
            base_movement: speed,
            action: true,
            bonus_action: true,
            reaction: true,
        }
    }

    /// A budget with nothing left.
    pub fn exhausted() -> Self {
        Self::default()
    }

    /// Spends up to `requested` feet of movement.
    ///
    /// # Returns
    ///
    /// The movement actually granted, truncated to what remains.
    pub fn spend_movement(&mut self, requested: u32) -> u32 {
        let granted = requested.min(self.movement);
        self.movement -= granted;
        granted
    }

    /// Dash: adds the base movement again.
    pub fn dash(&mut self) {
        self.movement = self.movement.saturating_add(self.base_movement);
    }

    /// True while any movement, main action or bonus action is left.
    pub fn has_remaining(&self) -> bool {
        self.movement > 0 || self.action || self.bonus_action
    }

    /// True if the slot required by `timing` is still available.
    pub fn can_afford(&self, timing: ActionTiming) -> bool {
        match timing {
            ActionTiming::Action => self.action,
            ActionTiming::BonusAction => self.bonus_action,
            ActionTiming::Reaction => self.reaction,
            ActionTiming::Free => true,
        }
    }

    /// Consumes the slot required by `timing`. Returns false if it was already spent.
    pub fn consume(&mut self, timing: ActionTiming) -> bool {
        let slot = match timing {
            ActionTiming::Action => &mut self.action,
            ActionTiming::BonusAction => &mut self.bonus_action,
            ActionTiming::Reaction => &mut self.reaction,
            ActionTiming::Free => return true,
        };
        core::mem::replace(slot, false)
    }

    /// Number of budget units left; strictly decreases with every non-free step.
    pub fn units(&self) -> u32 {
        self.movement + u32::from(self.action) + u32::from(self.bonus_action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_is_truncated_to_remaining() {
        let mut budget = TurnBudget::full(30);
        assert_eq!(budget.spend_movement(10), 10);
        assert_eq!(budget.spend_movement(25), 20);
        assert_eq!(budget.movement, 0);
    }

    #[test]
    fn test_consume_only_once() {
        let mut budget = TurnBudget::full(30);
        assert!(budget.consume(ActionTiming::Action));
        assert!(!budget.consume(ActionTiming::Action));
        assert!(!budget.can_afford(ActionTiming::Action));
        assert!(budget.can_afford(ActionTiming::BonusAction));
        assert!(budget.can_afford(ActionTiming::Free));
    }

    #[test]
    fn test_dash_adds_base_movement() {
        let mut budget = TurnBudget::full(30);
        budget.spend_movement(15);
        budget.dash();
        assert_eq!(budget.movement, 45);
    }

    #[test]
    fn test_has_remaining() {
        let mut budget = TurnBudget::full(0);
        assert!(budget.has_remaining());
        budget.consume(ActionTiming::Action);
        budget.consume(ActionTiming::BonusAction);
        assert!(!budget.has_remaining());
        assert_eq!(budget.units(), 0);
    }
}
