//! Deterministic dice.
//!
//! Every roll is a pure function of a seed derived from the encounter seed,
//! the execution nonce, the rolling combatant and a per-roll context slot.
//! Replaying the same commands against the same initial state reproduces
//! every roll exactly.

/// Dice source. Implementations must return the same value for the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        (self.next_u32(seed) % sides.max(1)) + 1
    }

    /// Roll a d20.
    fn roll_d20(&self, seed: u64) -> u32 {
        self.roll_die(seed, 20)
    }
}

/// PCG-XSH-RR generator evaluated statelessly per seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Roll slots within one command. Each independent roll uses its own slot.
pub mod roll_context {
    /// First d20 of an attack roll.
    pub const ATTACK: u32 = 0;
    /// Second d20 when rolling with advantage or disadvantage.
    pub const ATTACK_SECOND: u32 = 1;
    /// Saving throw or escape check.
    pub const SAVE: u32 = 2;
    /// Healing dice start here.
    pub const HEALING: u32 = 0x100;
    /// Damage dice start here; die `i` uses `DAMAGE + i`.
    pub const DAMAGE: u32 = 0x200;
    /// Zone payload rolls; zone `z` uses `ZONE + z * 0x100`.
    pub const ZONE: u32 = 0x1_0000;
}

/// Compute deterministic seed from encounter state components.
///
/// # Arguments
///
/// * `encounter_seed` - Base seed set at encounter start
/// * `nonce` - Command sequence number
/// * `combatant` - Combatant the roll belongs to
/// * `context` - Roll slot within the command, see [`roll_context`]
pub fn compute_seed(encounter_seed: u64, nonce: u64, combatant: u32, context: u32) -> u64 {
    // SplitMix64 / FxHash style mixing
    let mut hash = encounter_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (combatant as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolls_are_deterministic_and_in_range() {
        let rng = PcgRng;
        for nonce in 0..200 {
            let seed = compute_seed(42, nonce, 3, roll_context::ATTACK);
            let roll = rng.roll_d20(seed);
            assert!((1..=20).contains(&roll));
            assert_eq!(roll, rng.roll_d20(seed));
        }
    }

    #[test]
    fn test_context_changes_seed() {
        let a = compute_seed(1, 1, 1, roll_context::ATTACK);
        let b = compute_seed(1, 1, 1, roll_context::ATTACK_SECOND);
        assert_ne!(a, b);
    }
}
