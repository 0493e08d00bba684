//! Dependent-effect propagation.
//!
//! Conditions can reference other combatants: a `Grappled` condition names
//! its grappler, who holds a mirrored `Grappling` condition. The functions in
//! this module are the only way such conditions are added or removed, and
//! they keep both halves of a pair in step within a single call.
//!
//! # Invariants
//!
//! - A linked pair exists on both combatants or on neither.
//! - After [`handle_death`], no combatant holds a condition or buff whose
//!   source is the dead combatant.
//!
//! [`verify_links`] checks the first invariant after every command.

mod error;
mod rules;

pub use error::LifecycleFault;
pub use rules::{DeathPolicy, LifecycleRules, LinkRule, LinkedPair, PositionSyncRule};

use crate::result::{DeltaEntry, StateDelta};
use crate::state::{
    CombatState, CombatantId, ConditionDuration, ConditionInstance, ConditionKind, GridPosition,
};

/// Point of a holder's turn at which durations are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnEdge {
    Start,
    End,
}

/// Applies a condition to `holder`, creating the linked counterpart on its
/// source when the kind is part of a pair.
///
/// Re-applying an existing condition refreshes it, unless the pair is
/// marked `only_if_new`. Conditions on dead combatants are ignored.
///
/// # Errors
///
/// `UnknownCombatant` for missing holder or source, `CapacityExceeded`
/// when either side has no room left (nothing is applied in that case).
pub fn apply_condition(
    state: &mut CombatState,
    rules: &LifecycleRules,
    holder: CombatantId,
    condition: ConditionInstance,
) -> Result<StateDelta, LifecycleFault> {
    let mut delta = StateDelta::new();
    let target = state
        .combatant(holder)
        .ok_or(LifecycleFault::UnknownCombatant(holder))?;
    if !target.is_alive() {
        return Ok(delta);
    }

    let pairing = condition
        .source
        .filter(|source| *source != holder)
        .and_then(|source| rules.partner_of(condition.kind).map(|link| (source, link)));

    let Some((source, link)) = pairing else {
        let target = state
            .combatant_mut(holder)
            .ok_or(LifecycleFault::UnknownCombatant(holder))?;
        if let Some(existing) = target
            .conditions
            .iter_mut()
            .find(|c| c.same_as(condition.kind, condition.source))
        {
            *existing = condition;
            return Ok(delta);
        }
        if !target.conditions.push(condition) {
            return Err(LifecycleFault::CapacityExceeded { combatant: holder });
        }
        delta.push(DeltaEntry::ConditionAdded {
            combatant: holder,
            condition: condition.kind,
            source: condition.source,
        });
        return Ok(delta);
    };

    let origin = state
        .combatant(source)
        .ok_or(LifecycleFault::UnknownCombatant(source))?;
    if !origin.is_alive() {
        return Ok(delta);
    }
    let origin_room = origin.conditions.remaining_capacity();

    let target = state
        .combatant_mut(holder)
        .ok_or(LifecycleFault::UnknownCombatant(holder))?;
    if let Some(existing) = target
        .conditions
        .iter_mut()
        .find(|c| c.same_as(condition.kind, Some(source)))
    {
        if !link.only_if_new {
            existing.duration = condition.duration;
            existing.escape_dc = condition.escape_dc;
        }
        return Ok(delta);
    }
    if target.conditions.remaining_capacity() == 0 {
        return Err(LifecycleFault::CapacityExceeded { combatant: holder });
    }
    if origin_room == 0 {
        return Err(LifecycleFault::CapacityExceeded { combatant: source });
    }

    target.conditions.push(condition.linked_to(source));
    delta.push(DeltaEntry::ConditionAdded {
        combatant: holder,
        condition: condition.kind,
        source: Some(source),
    });

    // The counterpart lives exactly as long as the primary; it is removed with it.
    let counterpart = ConditionInstance::new(link.partner, ConditionDuration::Permanent)
        .from_source(holder)
        .linked_to(holder);
    if let Some(origin) = state.combatant_mut(source) {
        origin.conditions.push(counterpart);
        delta.push(DeltaEntry::ConditionAdded {
            combatant: source,
            condition: link.partner,
            source: Some(holder),
        });
    }

    Ok(delta)
}

/// Removes a condition from `holder` together with its linked counterpart.
pub fn remove_condition(
    state: &mut CombatState,
    rules: &LifecycleRules,
    holder: CombatantId,
    kind: ConditionKind,
    source: Option<CombatantId>,
) -> StateDelta {
    let mut delta = StateDelta::new();
    let Some(removed) = state
        .combatant_mut(holder)
        .and_then(|c| c.conditions.remove(kind, source))
    else {
        return delta;
    };
    delta.push(DeltaEntry::ConditionRemoved {
        combatant: holder,
        condition: removed.kind,
        source: removed.source,
    });

    let (Some(other), Some(link)) = (removed.linked, rules.partner_of(kind)) else {
        return delta;
    };
    if let Some(counterpart) = state
        .combatant_mut(other)
        .and_then(|c| c.conditions.remove(link.partner, Some(holder)))
    {
        delta.push(DeltaEntry::ConditionRemoved {
            combatant: other,
            condition: counterpart.kind,
            source: counterpart.source,
        });
    }
    delta
}

/// Cleans up after `dead` died.
///
/// Conditions it imposed are removed (linked pairs always; others according
/// to their [`DeathPolicy`]), buffs it granted are removed, and zones it
/// owns are deactivated.
pub fn handle_death(state: &mut CombatState, rules: &LifecycleRules, dead: CombatantId) -> StateDelta {
    let mut delta = StateDelta::new();
    delta.push(DeltaEntry::Died { combatant: dead });

    let ids: Vec<CombatantId> = state.combatants().map(|c| c.id).collect();
    for id in ids {
        let sourced: Vec<ConditionInstance> = state
            .combatant(id)
            .map(|c| {
                c.conditions
                    .iter()
                    .filter(|cond| cond.source == Some(dead))
                    .copied()
                    .collect()
            })
            .unwrap_or_default();

        for condition in sourced {
            let linked = condition.linked.is_some() && rules.partner_of(condition.kind).is_some();
            if linked || rules.death_policy(condition.kind) == DeathPolicy::RemoveFromTargets {
                delta.append(remove_condition(state, rules, id, condition.kind, condition.source));
            } else if let Some(holder) = state.combatant_mut(id) {
                holder.conditions.orphan(condition.kind, dead);
            }
        }

        if let Some(holder) = state.combatant_mut(id) {
            let mut removed = Vec::new();
            holder.buffs.retain(|buff| {
                if buff.source == Some(dead) {
                    removed.push(buff.effect);
                    false
                } else {
                    true
                }
            });
            delta.extend(
                removed
                    .into_iter()
                    .map(|effect| DeltaEntry::BuffRemoved { combatant: id, effect }),
            );
        }
    }

    for zone in state.zones_mut() {
        if zone.owner == dead && zone.active {
            zone.active = false;
            delta.push(DeltaEntry::ZoneDeactivated { zone: zone.id });
        }
    }

    delta
}

/// Moves combatants that follow `mover` by the offset `mover` just travelled.
///
/// Followers keep their offset to the mover. A follower whose new cell is
/// occupied stays where it is.
pub fn sync_positions(
    state: &mut CombatState,
    rules: &LifecycleRules,
    mover: CombatantId,
    from: GridPosition,
) -> StateDelta {
    let mut delta = StateDelta::new();
    let Some(leader) = state.combatant(mover) else {
        return delta;
    };
    let to = leader.position;
    if to == from {
        return delta;
    }
    let (dx, dy) = (to.x - from.x, to.y - from.y);

    let mut followers: Vec<CombatantId> = Vec::new();
    for rule in rules.position_sync.iter().filter(|r| r.follow_source) {
        for follower in state.living() {
            if follower.id == mover || followers.contains(&follower.id) {
                continue;
            }
            let held = follower
                .conditions
                .iter()
                .any(|c| c.kind == rule.condition && c.source == Some(mover));
            let anchored = rule.requires_source_condition.is_none_or(|required| {
                leader
                    .conditions
                    .iter()
                    .any(|c| c.kind == required && c.linked == Some(follower.id))
            });
            if held && anchored {
                followers.push(follower.id);
            }
        }
    }

    for id in followers {
        let Some(from) = state.combatant(id).map(|c| c.position) else {
            continue;
        };
        let destination = from.offset(dx, dy);
        if state
            .occupant_at(destination)
            .is_some_and(|occupant| occupant != id)
        {
            continue;
        }
        if let Some(follower) = state.combatant_mut(id) {
            follower.position = destination;
            delta.push(DeltaEntry::Moved {
                combatant: id,
                from,
                to: destination,
            });
        }
    }

    delta
}

/// Expires conditions and buffs of `holder` at the given turn edge.
///
/// At the start of the turn `UntilTurnStart` conditions end. At the end of
/// the turn `UntilTurnEnd` conditions end and round counters tick down.
pub fn tick_durations(
    state: &mut CombatState,
    rules: &LifecycleRules,
    holder: CombatantId,
    edge: TurnEdge,
) -> StateDelta {
    let mut delta = StateDelta::new();
    let mut expired: Vec<(ConditionKind, Option<CombatantId>)> = Vec::new();

    let Some(combatant) = state.combatant_mut(holder) else {
        return delta;
    };
    for condition in combatant.conditions.iter_mut() {
        let ends = match (edge, &mut condition.duration) {
            (TurnEdge::Start, ConditionDuration::UntilTurnStart) => true,
            (TurnEdge::End, ConditionDuration::UntilTurnEnd) => true,
            (TurnEdge::End, ConditionDuration::Rounds(rounds)) => {
                if *rounds <= 1 {
                    true
                } else {
                    *rounds -= 1;
                    false
                }
            }
            _ => false,
        };
        if ends {
            expired.push((condition.kind, condition.source));
        }
    }

    if edge == TurnEdge::End {
        let mut removed = Vec::new();
        combatant.buffs.retain_mut(|buff| match &mut buff.rounds {
            Some(rounds) if *rounds <= 1 => {
                removed.push(buff.effect);
                false
            }
            Some(rounds) => {
                *rounds -= 1;
                true
            }
            None => true,
        });
        delta.extend(removed.into_iter().map(|effect| DeltaEntry::BuffRemoved {
            combatant: holder,
            effect,
        }));
    }

    for (kind, source) in expired {
        delta.append(remove_condition(state, rules, holder, kind, source));
    }
    delta
}

/// Checks that every linked condition has its counterpart.
///
/// # Errors
///
/// [`LifecycleFault::OneSidedLink`] for the first violation found.
pub fn verify_links(state: &CombatState, rules: &LifecycleRules) -> Result<(), LifecycleFault> {
    for holder in state.combatants() {
        for condition in holder.conditions.iter() {
            let (Some(partner), Some(link)) = (condition.linked, rules.partner_of(condition.kind))
            else {
                continue;
            };
            let mirrored = state.combatant(partner).is_some_and(|other| {
                other.conditions.iter().any(|c| {
                    c.kind == link.partner && c.source == Some(holder.id) && c.linked == Some(holder.id)
                })
            });
            if !mirrored {
                return Err(LifecycleFault::OneSidedLink {
                    holder: holder.id,
                    condition: condition.kind,
                    partner,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Buff, BuffEffect};
    use crate::testing::{combatant, state_with};
    use crate::zone::{ZoneEffect, ZoneId};

    const A: CombatantId = CombatantId(1);
    const B: CombatantId = CombatantId(2);
    const C: CombatantId = CombatantId(3);

    fn grapple(source: CombatantId) -> ConditionInstance {
        ConditionInstance::new(ConditionKind::Grappled, ConditionDuration::UntilEscape)
            .from_source(source)
            .with_escape_dc(13)
    }

    fn three() -> CombatState {
        state_with(vec![
            combatant(1, 1, 0, 0),
            combatant(2, 2, 1, 0),
            combatant(3, 2, 5, 5),
        ])
    }

    #[test]
    fn test_linked_pair_is_created_on_both_sides() {
        let rules = LifecycleRules::default();
        let mut state = three();

        let delta = apply_condition(&mut state, &rules, A, grapple(B)).unwrap();
        assert_eq!(delta.len(), 2);

        let grappled = state.combatant(A).unwrap().conditions.find(ConditionKind::Grappled, Some(B));
        assert_eq!(grappled.and_then(|c| c.linked), Some(B));
        let grappling = state.combatant(B).unwrap().conditions.find(ConditionKind::Grappling, Some(A));
        assert_eq!(grappling.and_then(|c| c.linked), Some(A));
        assert_eq!(verify_links(&state, &rules), Ok(()));

        // only_if_new: a second grapple is a no-op
        let again = apply_condition(&mut state, &rules, A, grapple(B)).unwrap();
        assert!(again.is_empty());
        assert_eq!(state.combatant(B).unwrap().conditions.len(), 1);
    }

    #[test]
    fn test_removing_either_side_removes_both() {
        let rules = LifecycleRules::default();

        let mut state = three();
        apply_condition(&mut state, &rules, A, grapple(B)).unwrap();
        let delta = remove_condition(&mut state, &rules, A, ConditionKind::Grappled, Some(B));
        assert_eq!(delta.len(), 2);
        assert!(state.combatant(A).unwrap().conditions.is_empty());
        assert!(state.combatant(B).unwrap().conditions.is_empty());

        let mut state = three();
        apply_condition(&mut state, &rules, A, grapple(B)).unwrap();
        remove_condition(&mut state, &rules, B, ConditionKind::Grappling, Some(A));
        assert!(state.combatant(A).unwrap().conditions.is_empty());
        assert!(state.combatant(B).unwrap().conditions.is_empty());
    }

    #[test]
    fn test_death_strips_everything_sourced_by_the_dead() {
        let mut rules = LifecycleRules::default();
        rules
            .death_policies
            .insert(ConditionKind::Poisoned, DeathPolicy::Persist);
        let mut state = three();

        apply_condition(&mut state, &rules, A, grapple(B)).unwrap();
        apply_condition(
            &mut state,
            &rules,
            A,
            ConditionInstance::new(ConditionKind::Frightened, ConditionDuration::Rounds(3))
                .from_source(B),
        )
        .unwrap();
        apply_condition(
            &mut state,
            &rules,
            A,
            ConditionInstance::new(ConditionKind::Poisoned, ConditionDuration::Rounds(3))
                .from_source(B),
        )
        .unwrap();
        if let Some(c) = state.combatant_mut(C) {
            c.buffs.push(Buff::new(BuffEffect::AttackBonus(1)).from_source(B));
        }
        state.add_zone(ZoneEffect::new(ZoneId(1), "stench", B, 10));

        let delta = handle_death(&mut state, &rules, B);
        assert!(delta.iter().any(|e| matches!(e, DeltaEntry::ZoneDeactivated { .. })));

        for combatant in state.combatants() {
            assert!(combatant.conditions.iter().all(|c| c.source != Some(B)));
            assert!(combatant.buffs.iter().all(|b| b.source != Some(B)));
        }
        assert!(state.combatant(A).unwrap().conditions.has(ConditionKind::Poisoned));
        assert!(!state.combatant(A).unwrap().conditions.has(ConditionKind::Frightened));
        assert!(!state.zone(ZoneId(1)).unwrap().active);
        assert_eq!(verify_links(&state, &rules), Ok(()));
    }

    #[test]
    fn test_persisting_condition_merges_with_unsourced_copy() {
        let mut rules = LifecycleRules::default();
        rules
            .death_policies
            .insert(ConditionKind::Poisoned, DeathPolicy::Persist);
        let mut state = three();

        apply_condition(
            &mut state,
            &rules,
            A,
            ConditionInstance::new(ConditionKind::Poisoned, ConditionDuration::Rounds(1)),
        )
        .unwrap();
        apply_condition(
            &mut state,
            &rules,
            A,
            ConditionInstance::new(ConditionKind::Poisoned, ConditionDuration::Rounds(3))
                .from_source(B),
        )
        .unwrap();
        assert_eq!(state.combatant(A).unwrap().conditions.len(), 2);

        handle_death(&mut state, &rules, B);

        let conditions = &state.combatant(A).unwrap().conditions;
        assert_eq!(conditions.len(), 1);
        assert_eq!(
            conditions.find(ConditionKind::Poisoned, None).map(|c| c.duration),
            Some(ConditionDuration::Rounds(3))
        );

        remove_condition(&mut state, &rules, A, ConditionKind::Poisoned, None);
        assert!(!state.combatant(A).unwrap().conditions.has(ConditionKind::Poisoned));
    }

    #[test]
    fn test_grappled_follows_grappler_keeping_offset() {
        let rules = LifecycleRules::default();
        let mut state = three();
        apply_condition(&mut state, &rules, A, grapple(B)).unwrap();

        let from = GridPosition::new(1, 0);
        if let Some(b) = state.combatant_mut(B) {
            b.position = GridPosition::new(3, 0);
        }
        let delta = sync_positions(&mut state, &rules, B, from);
        assert_eq!(delta.len(), 1);
        assert_eq!(state.combatant(A).unwrap().position, GridPosition::new(2, 0));
    }

    #[test]
    fn test_durations_tick_at_turn_edges() {
        let rules = LifecycleRules::default();
        let mut state = three();
        apply_condition(
            &mut state,
            &rules,
            A,
            ConditionInstance::new(ConditionKind::Dodging, ConditionDuration::UntilTurnStart),
        )
        .unwrap();
        apply_condition(
            &mut state,
            &rules,
            A,
            ConditionInstance::new(ConditionKind::Prone, ConditionDuration::Rounds(2)),
        )
        .unwrap();

        tick_durations(&mut state, &rules, A, TurnEdge::End);
        let a = state.combatant(A).unwrap();
        assert!(a.conditions.has(ConditionKind::Dodging));
        assert_eq!(
            a.conditions.find(ConditionKind::Prone, None).map(|c| c.duration),
            Some(ConditionDuration::Rounds(1))
        );

        tick_durations(&mut state, &rules, A, TurnEdge::Start);
        assert!(!state.combatant(A).unwrap().conditions.has(ConditionKind::Dodging));

        tick_durations(&mut state, &rules, A, TurnEdge::End);
        assert!(state.combatant(A).unwrap().conditions.is_empty());
    }

    #[test]
    fn test_verify_detects_one_sided_link() {
        let rules = LifecycleRules::default();
        let mut state = three();
        if let Some(a) = state.combatant_mut(A) {
            a.conditions.push(grapple(B).linked_to(B));
        }
        assert!(matches!(
            verify_links(&state, &rules),
            Err(LifecycleFault::OneSidedLink { holder: A, .. })
        ));
    }
}
