//! Condition expression language used by schema modifiers, passive traits
//! and auras.
//!
//! Expressions are closed enums evaluated against an [`EvalContext`]. The
//! evaluation is pure: it reads the state and never mutates it, so the same
//! expression can be evaluated for hypothetical actor positions.

use crate::action::{ActionDef, ActionId, ActionProperties, ActionTiming, RangeKind};
use crate::config::CombatConfig;
use crate::state::{CombatState, Combatant, ConditionKind, GridPosition};

/// Participant an expression talks about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subject {
    Actor,
    Target,
    /// The combatant bound by the innermost [`ConditionExpr::Exists`].
    Other,
}

/// Side filter of an [`ConditionExpr::Exists`], relative to its anchor subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    Ally,
    Enemy,
    Any,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantifier {
    Any,
    All,
    AtLeast(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionExpr {
    Always,

    // ===== logic =====
    And(Vec<ConditionExpr>),
    Or(Vec<ConditionExpr>),
    Not(Box<ConditionExpr>),
    /// Quantifies over living combatants other than the actor and the target.
    Exists {
        relative_to: Subject,
        filter: Relation,
        quantifier: Quantifier,
        predicate: Box<ConditionExpr>,
    },

    // ===== spatial =====
    AdjacentTo {
        subject: Subject,
        other: Subject,
    },
    WithinRange {
        subject: Subject,
        other: Subject,
        feet: u32,
    },
    BeyondRange {
        subject: Subject,
        other: Subject,
        feet: u32,
    },
    /// `subject` and `from` are both adjacent to `anchor`, on opposite sides.
    OppositeSide {
        subject: Subject,
        anchor: Subject,
        from: Subject,
    },

    // ===== state =====
    HasCondition {
        subject: Subject,
        condition: ConditionKind,
    },
    IsIncapacitated(Subject),
    HpBelowPercent {
        subject: Subject,
        percent: u32,
    },
    /// Subject fights on the actor's side.
    IsAlly(Subject),
    /// Subject fights against the actor.
    IsEnemy(Subject),

    // ===== action =====
    ActionHasProperty(ActionProperties),
    ActionIsTiming(ActionTiming),
    ActionRangeKind(RangeKind),
    ActionIs(ActionId),
}

/// Reasons an expression cannot be evaluated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("subject {0} is not bound in this context")]
    UnboundSubject(Subject),

    #[error("expression nesting exceeds {max} levels")]
    TooDeep { max: usize },

    #[error("quantifier must require at least one match")]
    InvalidQuantifier,
}

/// Everything an expression may look at.
#[derive(Clone, Copy, Debug)]
pub struct EvalContext<'a> {
    pub state: &'a CombatState,
    /// Acting combatant; may carry a hypothetical position.
    pub actor: &'a Combatant,
    pub target: Option<&'a Combatant>,
    pub other: Option<&'a Combatant>,
    pub action: &'a ActionDef,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        state: &'a CombatState,
        actor: &'a Combatant,
        target: Option<&'a Combatant>,
        action: &'a ActionDef,
    ) -> Self {
        Self {
            state,
            actor,
            target,
            other: None,
            action,
        }
    }

    fn subject(&self, subject: Subject) -> Result<&'a Combatant, ExprError> {
        match subject {
            Subject::Actor => Ok(self.actor),
            Subject::Target => self.target.ok_or(ExprError::UnboundSubject(subject)),
            Subject::Other => self.other.ok_or(ExprError::UnboundSubject(subject)),
        }
    }

    fn position(&self, subject: Subject) -> Result<GridPosition, ExprError> {
        self.subject(subject).map(|c| c.position)
    }

    fn with_other(&self, other: &'a Combatant) -> Self {
        Self {
            other: Some(other),
            ..*self
        }
    }
}

/// True if `a` and `b` are both adjacent to `anchor` and on opposite sides of it.
pub fn opposite_sides(anchor: GridPosition, a: GridPosition, b: GridPosition) -> bool {
    if !anchor.is_adjacent(a) || !anchor.is_adjacent(b) {
        return false;
    }
    let (ax, ay) = ((a.x - anchor.x).signum(), (a.y - anchor.y).signum());
    let (bx, by) = ((b.x - anchor.x).signum(), (b.y - anchor.y).signum());
    ax == -bx && ay == -by
}

impl ConditionExpr {
    /// Expression that always holds; the serde default for optional guards.
    pub fn always() -> Self {
        ConditionExpr::Always
    }

    /// Structural check performed when definitions are registered.
    pub fn validate(&self) -> Result<(), ExprError> {
        self.validate_at(1)
    }

    fn validate_at(&self, depth: usize) -> Result<(), ExprError> {
        if depth > CombatConfig::MAX_EXPRESSION_DEPTH {
            return Err(ExprError::TooDeep {
                max: CombatConfig::MAX_EXPRESSION_DEPTH,
            });
        }
        match self {
            ConditionExpr::And(items) | ConditionExpr::Or(items) => items
                .iter()
                .try_for_each(|item| item.validate_at(depth + 1)),
            ConditionExpr::Not(inner) => inner.validate_at(depth + 1),
            ConditionExpr::Exists {
                quantifier,
                predicate,
                ..
            } => {
                if *quantifier == Quantifier::AtLeast(0) {
                    return Err(ExprError::InvalidQuantifier);
                }
                predicate.validate_at(depth + 1)
            }
            _ => Ok(()),
        }
    }

    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<bool, ExprError> {
        self.eval_at(ctx, 1)
    }

    fn eval_at(&self, ctx: &EvalContext<'_>, depth: usize) -> Result<bool, ExprError> {
        if depth > CombatConfig::MAX_EXPRESSION_DEPTH {
            return Err(ExprError::TooDeep {
                max: CombatConfig::MAX_EXPRESSION_DEPTH,
            });
        }

        match self {
            ConditionExpr::Always => Ok(true),

            ConditionExpr::And(items) => {
                for item in items {
                    if !item.eval_at(ctx, depth + 1)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ConditionExpr::Or(items) => {
                for item in items {
                    if item.eval_at(ctx, depth + 1)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ConditionExpr::Not(inner) => Ok(!inner.eval_at(ctx, depth + 1)?),
            ConditionExpr::Exists {
                relative_to,
                filter,
                quantifier,
                predicate,
            } => {
                let anchor = ctx.subject(*relative_to)?;
                let target_id = ctx.target.map(|t| t.id);
                let mut matches = 0u32;
                let mut candidates = 0u32;

                for other in ctx.state.living() {
                    if other.id == ctx.actor.id || Some(other.id) == target_id {
                        continue;
                    }
                    let related = match filter {
                        Relation::Ally => ctx.state.is_ally(anchor.id, other.id),
                        Relation::Enemy => ctx.state.is_enemy(anchor.id, other.id),
                        Relation::Any => true,
                    };
                    if !related {
                        continue;
                    }
                    candidates += 1;
                    if predicate.eval_at(&ctx.with_other(other), depth + 1)? {
                        matches += 1;
                    }
                }

                match quantifier {
                    Quantifier::Any => Ok(matches > 0),
                    Quantifier::All => Ok(matches == candidates),
                    Quantifier::AtLeast(0) => Err(ExprError::InvalidQuantifier),
                    Quantifier::AtLeast(n) => Ok(matches >= *n),
                }
            }

            ConditionExpr::AdjacentTo { subject, other } => {
                Ok(ctx.position(*subject)?.is_adjacent(ctx.position(*other)?))
            }
            ConditionExpr::WithinRange {
                subject,
                other,
                feet,
            } => Ok(ctx.position(*subject)?.distance_feet(ctx.position(*other)?) <= *feet),
            ConditionExpr::BeyondRange {
                subject,
                other,
                feet,
            } => Ok(ctx.position(*subject)?.distance_feet(ctx.position(*other)?) > *feet),
            ConditionExpr::OppositeSide {
                subject,
                anchor,
                from,
            } => Ok(opposite_sides(
                ctx.position(*anchor)?,
                ctx.position(*subject)?,
                ctx.position(*from)?,
            )),

            ConditionExpr::HasCondition { subject, condition } => {
                Ok(ctx.subject(*subject)?.conditions.has(*condition))
            }
            ConditionExpr::IsIncapacitated(subject) => {
                Ok(ctx.subject(*subject)?.conditions.is_incapacitated())
            }
            ConditionExpr::HpBelowPercent { subject, percent } => {
                Ok(ctx.subject(*subject)?.hp.percent() < *percent)
            }
            ConditionExpr::IsAlly(subject) => {
                let other = ctx.subject(*subject)?;
                Ok(ctx.state.is_ally(ctx.actor.id, other.id))
            }
            ConditionExpr::IsEnemy(subject) => {
                let other = ctx.subject(*subject)?;
                Ok(ctx.state.is_enemy(ctx.actor.id, other.id))
            }

            ConditionExpr::ActionHasProperty(properties) => {
                Ok(ctx.action.properties.contains(*properties))
            }
            ConditionExpr::ActionIsTiming(timing) => Ok(ctx.action.timing == *timing),
            ConditionExpr::ActionRangeKind(kind) => Ok(ctx.action.range.kind == *kind),
            ConditionExpr::ActionIs(id) => Ok(&ctx.action.id == id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionDef, ActionRange, DiceExpr};
    use crate::state::{CombatantId, ConditionDuration, ConditionInstance, CreatureKind, GroupId};

    fn unit(id: u32, group: u32, x: i32, y: i32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            CreatureKind::new("wolf"),
            GroupId(group),
            11,
            13,
            40,
        )
        .at(GridPosition::new(x, y))
    }

    fn scene() -> (CombatState, ActionDef) {
        let mut state = CombatState::new(1);
        state.add_combatant(unit(1, 1, 0, 0)).unwrap();
        state.add_combatant(unit(2, 2, 1, 0)).unwrap();
        state.add_combatant(unit(3, 1, 2, 0)).unwrap();
        let bite = ActionDef::weapon_attack("bite", ActionRange::melee(5), 4, DiceExpr::new(2, 4, 2));
        (state, bite)
    }

    fn pack_tactics() -> ConditionExpr {
        ConditionExpr::Exists {
            relative_to: Subject::Actor,
            filter: Relation::Ally,
            quantifier: Quantifier::Any,
            predicate: Box::new(ConditionExpr::And(vec![
                ConditionExpr::AdjacentTo {
                    subject: Subject::Other,
                    other: Subject::Target,
                },
                ConditionExpr::Not(Box::new(ConditionExpr::IsIncapacitated(Subject::Other))),
            ])),
        }
    }

    #[test]
    fn test_pack_tactics_needs_adjacent_ally() {
        let (state, bite) = scene();
        let actor = state.combatant(CombatantId(1)).unwrap();
        let target = state.combatant(CombatantId(2)).unwrap();
        let ctx = EvalContext::new(&state, actor, Some(target), &bite);
        assert_eq!(pack_tactics().evaluate(&ctx), Ok(true));

        let mut lonely = state.clone();
        if let Some(ally) = lonely.combatant_mut(CombatantId(3)) {
            ally.position = GridPosition::new(5, 5);
        }
        let actor = lonely.combatant(CombatantId(1)).unwrap();
        let target = lonely.combatant(CombatantId(2)).unwrap();
        let ctx = EvalContext::new(&lonely, actor, Some(target), &bite);
        assert_eq!(pack_tactics().evaluate(&ctx), Ok(false));
    }

    #[test]
    fn test_flanking_geometry() {
        let (state, bite) = scene();
        let actor = state.combatant(CombatantId(1)).unwrap();
        let target = state.combatant(CombatantId(2)).unwrap();
        let ally = state.combatant(CombatantId(3)).unwrap();
        let ctx = EvalContext::new(&state, actor, Some(target), &bite).with_other(ally);

        let flank = ConditionExpr::OppositeSide {
            subject: Subject::Other,
            anchor: Subject::Target,
            from: Subject::Actor,
        };
        assert_eq!(flank.evaluate(&ctx), Ok(true));
    }

    #[test]
    fn test_unbound_target_is_an_error() {
        let (state, bite) = scene();
        let actor = state.combatant(CombatantId(1)).unwrap();
        let ctx = EvalContext::new(&state, actor, None, &bite);
        let expr = ConditionExpr::HasCondition {
            subject: Subject::Target,
            condition: ConditionKind::Prone,
        };
        assert_eq!(expr.evaluate(&ctx), Err(ExprError::UnboundSubject(Subject::Target)));
    }

    #[test]
    fn test_state_predicates() {
        let (mut state, bite) = scene();
        if let Some(target) = state.combatant_mut(CombatantId(2)) {
            target.hp.damage(8);
            target.conditions.push(ConditionInstance::new(
                ConditionKind::Prone,
                ConditionDuration::Permanent,
            ));
        }
        let actor = state.combatant(CombatantId(1)).unwrap();
        let target = state.combatant(CombatantId(2)).unwrap();
        let ctx = EvalContext::new(&state, actor, Some(target), &bite);

        let expr = ConditionExpr::And(vec![
            ConditionExpr::HpBelowPercent {
                subject: Subject::Target,
                percent: 50,
            },
            ConditionExpr::HasCondition {
                subject: Subject::Target,
                condition: ConditionKind::Prone,
            },
            ConditionExpr::IsEnemy(Subject::Target),
            ConditionExpr::ActionRangeKind(RangeKind::Melee),
            ConditionExpr::ActionHasProperty(ActionProperties::MELEE_WEAPON),
        ]);
        assert_eq!(expr.evaluate(&ctx), Ok(true));
    }

    #[test]
    fn test_validation_rejects_depth_and_zero_quantifier() {
        let mut expr = ConditionExpr::Always;
        for _ in 0..CombatConfig::MAX_EXPRESSION_DEPTH {
            expr = ConditionExpr::Not(Box::new(expr));
        }
        assert!(matches!(expr.validate(), Err(ExprError::TooDeep { .. })));

        let zero = ConditionExpr::Exists {
            relative_to: Subject::Actor,
            filter: Relation::Any,
            quantifier: Quantifier::AtLeast(0),
            predicate: Box::new(ConditionExpr::Always),
        };
        assert_eq!(zero.validate(), Err(ExprError::InvalidQuantifier));
    }
}
