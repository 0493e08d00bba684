//! Legal target selection.
//!
//! The actor is passed by value rather than looked up so that hypothetical
//! positions can be evaluated without touching the state.

use crate::state::{CombatState, Combatant, CombatantId};

use super::{ActionDef, TargetKind};

/// True if `target` may be chosen for `action` by `actor`.
pub fn is_legal_target(actor: &Combatant, action: &ActionDef, target: &Combatant, state: &CombatState) -> bool {
    if !target.is_alive() {
        return false;
    }
    let allied = state.alliances().are_allied(actor.group, target.group);
    let in_reach = actor.position.distance_feet(target.position) <= action.range.max();
    match action.target {
        TargetKind::SelfOnly => target.id == actor.id,
        TargetKind::Enemy => target.id != actor.id && !allied && in_reach,
        TargetKind::Ally => target.id == actor.id || (allied && in_reach),
    }
}

/// Living combatants `actor` may target with `action`, in id order.
pub fn legal_targets(actor: &Combatant, action: &ActionDef, state: &CombatState) -> Vec<CombatantId> {
    if action.target == TargetKind::SelfOnly {
        return vec![actor.id];
    }
    let mut targets: Vec<CombatantId> = state
        .living()
        .filter(|c| c.id != actor.id)
        .filter(|c| is_legal_target(actor, action, c, state))
        .map(|c| c.id)
        .collect();
    if action.target == TargetKind::Ally && actor.is_alive() {
        targets.push(actor.id);
        targets.sort();
    }
    targets
}
