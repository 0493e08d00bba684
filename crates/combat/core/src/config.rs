/// Combat configuration constants and tunable parameters.
///
/// Compile-time capacities live as associated constants; everything the
/// decision engine may want to calibrate lives in the nested runtime structs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Turn planner limits.
    pub search: SearchConfig,
    /// Weights used by the scoring engine.
    pub scoring: ScoringWeights,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of simultaneous conditions on one combatant.
    pub const MAX_CONDITIONS: usize = 16;
    /// Maximum nesting depth accepted by the condition expression evaluator.
    pub const MAX_EXPRESSION_DEPTH: usize = 16;
    /// Highest spell-slot tier tracked by [`crate::Resources`].
    pub const MAX_SPELL_TIER: usize = 9;

    // ===== grid rules =====
    /// Feet covered by one grid cell.
    pub const CELL_FEET: u32 = 5;
    /// Armor-class bonus granted by half cover.
    pub const HALF_COVER_AC: i32 = 2;

    pub fn new() -> Self {
        Self {
            search: SearchConfig::default(),
            scoring: ScoringWeights::default(),
        }
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringWeights) -> Self {
        self.scoring = scoring;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Limits for the candidate tree search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Maximum expand+prune rounds before falling back to the best candidate so far.
    pub max_expansion_rounds: u32,
    /// Candidates whose value falls below `prune_ratio × frontier max` are discarded.
    pub prune_ratio: f64,
    /// Upper bound on frontier size kept after each prune.
    pub beam_width: usize,
    /// Movement destinations generated per candidate (best aligned first).
    pub max_move_candidates: usize,
}

impl SearchConfig {
    pub const DEFAULT_MAX_EXPANSION_ROUNDS: u32 = 8;
    pub const DEFAULT_PRUNE_RATIO: f64 = 0.5;
    pub const DEFAULT_BEAM_WIDTH: usize = 50;
    pub const DEFAULT_MAX_MOVE_CANDIDATES: usize = 10;
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_expansion_rounds: Self::DEFAULT_MAX_EXPANSION_ROUNDS,
            prune_ratio: Self::DEFAULT_PRUNE_RATIO,
            beam_width: Self::DEFAULT_BEAM_WIDTH,
            max_move_candidates: Self::DEFAULT_MAX_MOVE_CANDIDATES,
        }
    }
}

/// Weights combining the parts of an action or movement score.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoringWeights {
    /// Multiplier on expected damage (capped at target HP).
    pub damage: f64,
    /// Rounds of the target's damage output credited when it is killed.
    pub kill_bonus: f64,
    /// Multiplier on the value of imposing a condition.
    pub control: f64,
    /// Multiplier on effective healing.
    pub healing: f64,
    /// Value of one point of buff magnitude per round.
    pub buff: f64,
    /// Multiplier on the expected incoming damage subtracted from step values.
    pub risk: f64,
    /// Attraction / repulsion weights for movement.
    pub movement: MovementWeights,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            damage: 1.0,
            kill_bonus: 1.0,
            control: 1.0,
            healing: 1.0,
            buff: 0.5,
            risk: 0.25,
            movement: MovementWeights::default(),
        }
    }
}

/// Weights for the movement desire vector.
///
/// The desire vector is the sum of attraction terms (toward targets worth
/// attacking and toward allies) and repulsion terms (away from threats and
/// hazard zones). Movement value is the dot product of the step with it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MovementWeights {
    /// Pull toward enemies that are outside the preferred attack range.
    pub target_attraction: f64,
    /// Pull toward living allies.
    pub ally_cohesion: f64,
    /// Push away from enemies closer than the preferred attack range.
    pub threat_repulsion: f64,
    /// Push away from harmful zones affecting the mover.
    pub hazard_repulsion: f64,
}

impl Default for MovementWeights {
    fn default() -> Self {
        Self {
            target_attraction: 1.0,
            ally_cohesion: 0.1,
            threat_repulsion: 0.8,
            hazard_repulsion: 1.5,
        }
    }
}
