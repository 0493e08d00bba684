//! Movement desire.
//!
//! A [`Desire`] is a set of weighted pulls on the actor, built once at the
//! position its turn starts from: attraction toward preferred targets and
//! allies, repulsion from threats and hazard zones. Each pull measures
//! progress as the change in distance to its anchor, capped at the cells
//! needed to satisfy it. The sum is a potential over the grid, and a move is
//! worth the potential it gains, so a turn's moves together earn no more than
//! the net progress they make and sideways drift earns little.

use combat_core::{CombatConfig, CombatState, Combatant, GridPosition, MovementWeights};

/// Planar vector in cell units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Displacement from `from` to `to`.
    pub fn between(from: GridPosition, to: GridPosition) -> Self {
        Self::new((to.x - from.x) as f64, (to.y - from.y) as f64)
    }

    /// Unit vector from `from` to `to`; zero when they coincide.
    pub fn direction(from: GridPosition, to: GridPosition) -> Self {
        Self::between(from, to).normalized()
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn normalized(self) -> Self {
        let length = self.length();
        if length == 0.0 {
            Self::ZERO
        } else {
            self.scaled(1.0 / length)
        }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn plus(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

/// Whether a pull draws the actor in or pushes it away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Toward,
    Away,
}

/// One weighted pull.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pull {
    pub anchor: GridPosition,
    pub sense: Sense,
    /// Unit direction at the origin.
    pub direction: Vector,
    pub weight: f64,
    /// Cells of progress that still count.
    pub limit: f64,
    /// Distance from the origin to the anchor, in cells.
    base: f64,
}

impl Pull {
    fn new(origin: GridPosition, anchor: GridPosition, sense: Sense, weight: f64, limit: f64) -> Self {
        let direction = match sense {
            Sense::Toward => Vector::direction(origin, anchor),
            Sense::Away => Vector::direction(anchor, origin),
        };
        Self {
            anchor,
            sense,
            direction,
            weight,
            limit,
            base: Vector::between(origin, anchor).length(),
        }
    }

    /// Weighted progress of standing at `at` instead of the origin.
    fn potential(&self, at: GridPosition) -> f64 {
        let distance = Vector::between(at, self.anchor).length();
        let progress = match self.sense {
            Sense::Toward => self.base - distance,
            Sense::Away => distance - self.base,
        };
        self.weight * progress.min(self.limit)
    }
}

/// Enemy the actor wants to close on, with its relative priority in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetPull {
    pub position: GridPosition,
    pub priority: f64,
}

/// Enemy whose reach the actor wants to leave, with relative danger in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThreatPush {
    pub position: GridPosition,
    pub reach_feet: u32,
    pub danger: f64,
}

/// What the desire at one position is built from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DesireInputs {
    pub targets: Vec<TargetPull>,
    pub threats: Vec<ThreatPush>,
    /// Distance in feet the actor wants to keep from its targets.
    pub preferred_range_feet: u32,
}

/// Composite desire at a position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Desire {
    pub origin: GridPosition,
    pub pulls: Vec<Pull>,
}

impl Desire {
    /// Net direction the actor is pulled in, for inspection.
    pub fn resultant(&self) -> Vector {
        self.pulls.iter().fold(Vector::ZERO, |sum, pull| {
            sum.plus(pull.direction.scaled(pull.weight))
        })
    }

    /// Potential gained by standing at `to` instead of the origin.
    pub fn alignment(&self, to: GridPosition) -> f64 {
        self.pulls.iter().map(|pull| pull.potential(to)).sum()
    }

    /// Potential gained by the move `from → to`.
    ///
    /// Gains along a path telescope, so any sequence of moves is worth
    /// `alignment` of where it ends.
    pub fn gain(&self, from: GridPosition, to: GridPosition) -> f64 {
        self.alignment(to) - self.alignment(from)
    }

    pub fn is_empty(&self) -> bool {
        self.pulls.is_empty()
    }
}

fn cells(feet: u32) -> f64 {
    feet as f64 / CombatConfig::CELL_FEET as f64
}

/// Builds the desire of `actor` standing at `position`.
///
/// Allies and hazard zones come from `state`; targets and threats are
/// supplied by the caller, which knows their values.
pub fn desire_at(
    state: &CombatState,
    actor: &Combatant,
    position: GridPosition,
    weights: &MovementWeights,
    inputs: &DesireInputs,
) -> Desire {
    let mut pulls = Vec::new();
    let preferred = inputs.preferred_range_feet.max(CombatConfig::CELL_FEET);

    // ===== targets =====
    for target in &inputs.targets {
        let distance = position.distance_feet(target.position);
        if distance <= preferred || target.priority <= 0.0 {
            continue;
        }
        pulls.push(Pull::new(
            position,
            target.position,
            Sense::Toward,
            weights.target_attraction * target.priority,
            cells(distance - preferred),
        ));
    }

    // ===== threats =====
    // Only actors that fight from range back away.
    if preferred > CombatConfig::CELL_FEET {
        for threat in &inputs.threats {
            let distance = position.distance_feet(threat.position);
            let unsafe_within = threat.reach_feet + CombatConfig::CELL_FEET;
            if distance > unsafe_within || threat.danger <= 0.0 {
                continue;
            }
            pulls.push(Pull::new(
                position,
                threat.position,
                Sense::Away,
                weights.threat_repulsion * threat.danger,
                cells(unsafe_within - distance + CombatConfig::CELL_FEET),
            ));
        }
    }

    // ===== allies =====
    for ally in state.living() {
        if ally.id == actor.id || !state.is_ally(actor.id, ally.id) {
            continue;
        }
        let distance = position.distance(ally.position);
        if distance <= 1 {
            continue;
        }
        pulls.push(Pull::new(
            position,
            ally.position,
            Sense::Toward,
            weights.ally_cohesion,
            (distance - 1) as f64,
        ));
    }

    // ===== hazards =====
    for zone in state.zones() {
        if !zone.active || zone.payload.is_empty() || !zone.affects(state, actor) {
            continue;
        }
        let Some(center) = zone.center(state) else {
            continue;
        };
        let exit = zone.radius_feet + CombatConfig::CELL_FEET;
        let distance = position.distance_feet(center);
        if distance > exit {
            continue;
        }
        pulls.push(Pull::new(
            position,
            center,
            Sense::Away,
            weights.hazard_repulsion,
            cells(exit - distance),
        ));
    }

    Desire {
        origin: position,
        pulls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{CombatantId, CreatureKind, GroupId};

    fn actor_at(x: i32, y: i32) -> Combatant {
        Combatant::new(CombatantId(1), CreatureKind::new("orc"), GroupId(1), 15, 13, 30)
            .at(GridPosition::new(x, y))
    }

    #[test]
    fn test_alignment_is_capped_at_goal() {
        let state = CombatState::new(1);
        let actor = actor_at(0, 0);
        let inputs = DesireInputs {
            targets: vec![TargetPull {
                position: GridPosition::new(4, 0),
                priority: 1.0,
            }],
            threats: Vec::new(),
            preferred_range_feet: 5,
        };
        let desire = desire_at(&state, &actor, actor.position, &MovementWeights::default(), &inputs);

        assert_eq!(desire.alignment(GridPosition::new(3, 0)), 3.0);
        // Walking past the target earns no more than reaching it.
        assert_eq!(desire.alignment(GridPosition::new(4, 3)), 1.0);
        assert!(desire.alignment(GridPosition::new(5, 1)) <= 3.0);
        assert!(desire.alignment(GridPosition::new(-2, 0)) < 0.0);
    }

    #[test]
    fn test_sideways_drift_earns_less_than_direct_progress() {
        let state = CombatState::new(1);
        let actor = actor_at(0, 0);
        let inputs = DesireInputs {
            targets: vec![TargetPull {
                position: GridPosition::new(7, 0),
                priority: 1.0,
            }],
            threats: Vec::new(),
            preferred_range_feet: 5,
        };
        let desire = desire_at(&state, &actor, actor.position, &MovementWeights::default(), &inputs);

        let straight = desire.alignment(GridPosition::new(6, 0));
        let drift = desire.alignment(GridPosition::new(6, -6));
        assert_eq!(straight, 6.0);
        assert!(drift < 1.0);
    }

    #[test]
    fn test_gains_along_a_path_sum_to_net_progress() {
        let state = CombatState::new(1);
        let actor = actor_at(0, 0);
        let inputs = DesireInputs {
            targets: vec![TargetPull {
                position: GridPosition::new(7, 0),
                priority: 1.0,
            }],
            threats: Vec::new(),
            preferred_range_feet: 5,
        };
        let desire = desire_at(&state, &actor, actor.position, &MovementWeights::default(), &inputs);

        let path = [
            GridPosition::new(0, 0),
            GridPosition::new(6, -6),
            GridPosition::new(1, 0),
            GridPosition::new(4, 2),
        ];
        let walked: f64 = path.windows(2).map(|leg| desire.gain(leg[0], leg[1])).sum();
        assert!((walked - desire.alignment(GridPosition::new(4, 2))).abs() < 1e-9);
        // At the goal, stepping off the line loses ground.
        assert!(desire.gain(GridPosition::new(6, 0), GridPosition::new(6, 1)) < 0.0);
    }

    #[test]
    fn test_melee_actor_ignores_threats() {
        let state = CombatState::new(1);
        let actor = actor_at(0, 0);
        let inputs = DesireInputs {
            targets: Vec::new(),
            threats: vec![ThreatPush {
                position: GridPosition::new(1, 0),
                reach_feet: 5,
                danger: 1.0,
            }],
            preferred_range_feet: 5,
        };
        let desire = desire_at(&state, &actor, actor.position, &MovementWeights::default(), &inputs);
        assert!(desire.is_empty());

        let ranged = DesireInputs {
            preferred_range_feet: 80,
            ..inputs
        };
        let desire = desire_at(&state, &actor, actor.position, &MovementWeights::default(), &ranged);
        assert!(desire.resultant().x < 0.0);
        assert!(desire.alignment(GridPosition::new(-2, 0)) > 0.0);
    }
}
