//! d20 roll math for attacks and saving throws.

use crate::modifier::RollMode;

/// Probability of each natural d20 result under a roll mode.
fn natural_probability(natural: u32, mode: RollMode) -> f64 {
    let r = natural as f64;
    match mode {
        RollMode::Normal => 1.0 / 20.0,
        RollMode::Advantage => (r * r - (r - 1.0) * (r - 1.0)) / 400.0,
        RollMode::Disadvantage => {
            let above = 21.0 - r;
            (above * above - (above - 1.0) * (above - 1.0)) / 400.0
        }
    }
}

/// Outcome of a single attack roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackRoll {
    Miss,
    Hit,
    Critical,
}

/// Classifies a natural d20 result against a target number.
///
/// A natural 1 always misses and a natural 20 always crits. `auto_miss`
/// forces a miss; `auto_crit` upgrades any hit to a critical.
pub fn classify_attack(
    natural: u32,
    attack_bonus: i32,
    armor_class: i32,
    auto_crit: bool,
    auto_miss: bool,
) -> AttackRoll {
    if auto_miss || natural <= 1 {
        return AttackRoll::Miss;
    }
    if natural >= 20 {
        return AttackRoll::Critical;
    }
    if natural as i32 + attack_bonus >= armor_class {
        if auto_crit {
            AttackRoll::Critical
        } else {
            AttackRoll::Hit
        }
    } else {
        AttackRoll::Miss
    }
}

/// Miss / hit / critical probabilities of an attack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitOdds {
    pub miss: f64,
    pub hit: f64,
    pub crit: f64,
}

impl HitOdds {
    /// Odds of an attack with the given total bonus against `armor_class`.
    pub fn attack(
        attack_bonus: i32,
        armor_class: i32,
        mode: RollMode,
        auto_crit: bool,
        auto_miss: bool,
    ) -> Self {
        let mut odds = HitOdds {
            miss: 0.0,
            hit: 0.0,
            crit: 0.0,
        };
        for natural in 1..=20 {
            let p = natural_probability(natural, mode);
            match classify_attack(natural, attack_bonus, armor_class, auto_crit, auto_miss) {
                AttackRoll::Miss => odds.miss += p,
                AttackRoll::Hit => odds.hit += p,
                AttackRoll::Critical => odds.crit += p,
            }
        }
        odds
    }

    /// Probability of any hit (including criticals).
    pub fn any_hit(&self) -> f64 {
        self.hit + self.crit
    }
}

/// Probability that a saving throw with `save_bonus` meets `dc`.
pub fn save_success_probability(save_bonus: i32, dc: i32, mode: RollMode) -> f64 {
    (1..=20)
        .filter(|&natural| natural as i32 + save_bonus >= dc)
        .map(|natural| natural_probability(natural, mode))
        .sum()
}

/// Picks the natural result of a d20 roll made with `mode` from two dice.
pub fn resolve_natural(first: u32, second: u32, mode: RollMode) -> u32 {
    match mode {
        RollMode::Normal => first,
        RollMode::Advantage => first.max(second),
        RollMode::Disadvantage => first.min(second),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_normal_odds() {
        // 10..=19 hit, 20 crits
        let odds = HitOdds::attack(5, 15, RollMode::Normal, false, false);
        assert!(close(odds.hit, 10.0 / 20.0));
        assert!(close(odds.crit, 1.0 / 20.0));
        assert!(close(odds.miss + odds.hit + odds.crit, 1.0));
    }

    #[test]
    fn test_advantage_raises_hit_chance() {
        let normal = HitOdds::attack(5, 15, RollMode::Normal, false, false);
        let adv = HitOdds::attack(5, 15, RollMode::Advantage, false, false);
        let dis = HitOdds::attack(5, 15, RollMode::Disadvantage, false, false);
        assert!(adv.any_hit() > normal.any_hit());
        assert!(dis.any_hit() < normal.any_hit());
        assert!(close(adv.crit, 39.0 / 400.0));
    }

    #[test]
    fn test_auto_flags() {
        let crit = HitOdds::attack(5, 15, RollMode::Normal, true, false);
        assert!(close(crit.hit, 0.0));
        assert!(close(crit.crit, 11.0 / 20.0));

        let miss = HitOdds::attack(5, 15, RollMode::Advantage, true, true);
        assert!(close(miss.miss, 1.0));
    }

    #[test]
    fn test_natural_extremes() {
        assert_eq!(classify_attack(1, 100, 10, false, false), AttackRoll::Miss);
        assert_eq!(classify_attack(20, -100, 30, false, false), AttackRoll::Critical);
    }

    #[test]
    fn test_save_probability() {
        assert!(close(save_success_probability(2, 13, RollMode::Normal), 10.0 / 20.0));
        assert!(close(save_success_probability(0, 25, RollMode::Normal), 0.0));
    }
}
