//! Turn candidates and the steps they are made of.

use combat_core::{ActionId, Combatant, CombatantId, Command, GridPosition, TurnBudget};

use crate::scoring::StepScore;

/// One step of a planned turn.
#[derive(Clone, Debug, PartialEq)]
pub enum PlanStep {
    Move {
        to: GridPosition,
        score: StepScore,
    },
    Act {
        action: ActionId,
        target: CombatantId,
        score: StepScore,
    },
    Pass,
}

impl PlanStep {
    pub fn value(&self) -> f64 {
        match self {
            PlanStep::Move { score, .. } | PlanStep::Act { score, .. } => score.value(),
            PlanStep::Pass => 0.0,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, PlanStep::Move { .. })
    }

    /// Engine command for this step.
    pub fn command(&self) -> Command {
        match self {
            PlanStep::Move { to, .. } => Command::Move { to: *to },
            PlanStep::Act { action, target, .. } => Command::Act {
                action: action.clone(),
                target: Some(*target),
            },
            PlanStep::Pass => Command::Pass,
        }
    }
}

/// Budget snapshot ordered by what is left: action slots first, then movement.
///
/// Dash trades the main action for movement, so movement alone is not a
/// measure of what remains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BudgetMark {
    pub slots: u32,
    pub movement: u32,
}

impl From<&TurnBudget> for BudgetMark {
    fn from(budget: &TurnBudget) -> Self {
        Self {
            slots: u32::from(budget.action) + u32::from(budget.bonus_action),
            movement: budget.movement,
        }
    }
}

/// A node of the turn search: the actor as it would be after `steps`.
#[derive(Clone, Debug)]
pub struct TurnCandidate {
    /// Creation order; lower wins ties.
    pub seq: u32,
    /// Hypothetical actor (position, budget, history, resources, turn states).
    pub actor: Combatant,
    pub steps: Vec<PlanStep>,
    pub value: f64,
    pub terminal: bool,
    /// Budget after each step, starting with the root budget.
    pub trail: Vec<BudgetMark>,
}

impl TurnCandidate {
    /// Root candidate: current position, the actor's budget, no steps.
    pub fn root(actor: Combatant) -> Self {
        let mark = BudgetMark::from(&actor.budget);
        Self {
            seq: 0,
            actor,
            steps: Vec::new(),
            value: 0.0,
            terminal: false,
            trail: vec![mark],
        }
    }

    /// Child with `step` applied to `actor`.
    pub fn child(&self, seq: u32, actor: Combatant, step: PlanStep) -> Self {
        let value = self.value + step.value();
        let terminal = matches!(step, PlanStep::Pass) || !actor.budget.has_remaining();
        let mut steps = self.steps.clone();
        steps.push(step);
        let mut trail = self.trail.clone();
        trail.push(BudgetMark::from(&actor.budget));
        Self {
            seq,
            actor,
            steps,
            value,
            terminal,
            trail,
        }
    }

    pub fn last_step(&self) -> Option<&PlanStep> {
        self.steps.last()
    }

    pub fn position(&self) -> GridPosition {
        self.actor.position
    }

    /// True if `a` beats `b`: higher value, then lower sequence number.
    pub fn beats(a: &TurnCandidate, b: &TurnCandidate) -> bool {
        a.value > b.value || (a.value == b.value && a.seq < b.seq)
    }
}

/// Drops every candidate valued below `ratio` × the frontier maximum.
///
/// Returns the dropped candidates. Order of the survivors is preserved.
pub fn prune(frontier: &mut Vec<TurnCandidate>, ratio: f64) -> Vec<TurnCandidate> {
    let max = frontier.iter().map(|c| c.value).fold(0.0_f64, f64::max);
    let threshold = ratio * max;
    let (kept, dropped): (Vec<_>, Vec<_>) = frontier.drain(..).partition(|c| c.value >= threshold);
    *frontier = kept;
    dropped
}

/// Keeps the `width` best candidates, then restores creation order.
pub fn truncate_beam(frontier: &mut Vec<TurnCandidate>, width: usize) {
    if frontier.len() <= width {
        return;
    }
    frontier.sort_by(|a, b| b.value.total_cmp(&a.value).then(a.seq.cmp(&b.seq)));
    frontier.truncate(width);
    frontier.sort_by_key(|c| c.seq);
}

/// Best candidate: highest value, earliest created on ties.
pub fn select_best(candidates: &[TurnCandidate]) -> Option<&TurnCandidate> {
    candidates.iter().fold(None, |best, c| match best {
        Some(b) if !TurnCandidate::beats(c, b) => Some(b),
        _ => Some(c),
    })
}
