//! Persistent area effects.
//!
//! A zone is anchored either on its owner (and moves with it) or on a fixed
//! cell. It triggers when a combatant enters it, or at the start or end of a
//! combatant's turn inside it. Each zone affects a given combatant at most
//! once per turn; the ledger is cleared at that combatant's turn start.
use std::collections::BTreeSet;
use std::fmt;

use crate::action::{DiceExpr, SaveEffect, SaveSpec};
use crate::config::CombatConfig;
use crate::env::{RngOracle, compute_seed, roll_context};
use crate::lifecycle::{self, LifecycleFault, LifecycleRules};
use crate::result::{DeltaEntry, StateDelta};
use crate::state::{
    BuffEffect, CombatState, Combatant, CombatantId, ConditionDuration, ConditionInstance,
    ConditionKind, GridPosition,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone#{}", self.0)
    }
}

/// Where the centre of a zone is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneAnchor {
    /// Follows the owner's position.
    Owner,
    Fixed(GridPosition),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneTrigger {
    OnEnter,
    OnTurnStart,
    OnTurnEnd,
}

/// Which combatants a zone affects, relative to its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneTargets {
    Enemies,
    Allies,
    All,
}

/// What happens to an affected combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZonePayload {
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<DiceExpr>,
    /// When present, a successful save reduces damage and blocks the condition.
    #[cfg_attr(feature = "serde", serde(default))]
    pub save: Option<SaveSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<(ConditionKind, ConditionDuration)>,
}

impl ZonePayload {
    pub fn is_empty(&self) -> bool {
        self.damage.is_none() && self.condition.is_none()
    }
}

/// An active area effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneEffect {
    pub id: ZoneId,
    pub name: String,
    pub owner: CombatantId,
    pub anchor: ZoneAnchor,
    pub radius_feet: u32,
    pub trigger: ZoneTrigger,
    pub targets: ZoneTargets,
    pub payload: ZonePayload,
    /// Feet of movement spent per foot moved inside the zone. 1 is normal
    /// terrain, 2 is difficult terrain.
    pub speed_multiplier: u32,
    pub active: bool,
    triggered: BTreeSet<CombatantId>,
}

impl ZoneEffect {
    /// Creates an owner-anchored zone that triggers on entry against enemies
    /// and has no payload yet.
    pub fn new(id: ZoneId, name: impl Into<String>, owner: CombatantId, radius_feet: u32) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            anchor: ZoneAnchor::Owner,
            radius_feet,
            trigger: ZoneTrigger::OnEnter,
            targets: ZoneTargets::Enemies,
            payload: ZonePayload::default(),
            speed_multiplier: 1,
            active: true,
            triggered: BTreeSet::new(),
        }
    }

    pub fn at(mut self, center: GridPosition) -> Self {
        self.anchor = ZoneAnchor::Fixed(center);
        self
    }

    pub fn with_trigger(mut self, trigger: ZoneTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_targets(mut self, targets: ZoneTargets) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_damage(mut self, damage: DiceExpr) -> Self {
        self.payload.damage = Some(damage);
        self
    }

    pub fn with_save(mut self, save: SaveSpec) -> Self {
        self.payload.save = Some(save);
        self
    }

    pub fn with_condition(mut self, kind: ConditionKind, duration: ConditionDuration) -> Self {
        self.payload.condition = Some((kind, duration));
        self
    }

    pub fn with_speed_multiplier(mut self, multiplier: u32) -> Self {
        self.speed_multiplier = multiplier.max(1);
        self
    }

    /// Current centre cell, `None` when the owner is gone.
    pub fn center(&self, state: &CombatState) -> Option<GridPosition> {
        match self.anchor {
            ZoneAnchor::Fixed(center) => Some(center),
            ZoneAnchor::Owner => state.combatant(self.owner).map(|owner| owner.position),
        }
    }

    pub fn contains(&self, state: &CombatState, position: GridPosition) -> bool {
        self.active
            && self
                .center(state)
                .is_some_and(|center| center.distance_feet(position) <= self.radius_feet)
    }

    /// True if the zone's target filter selects `combatant`. The owner is
    /// never affected.
    pub fn affects(&self, state: &CombatState, combatant: &Combatant) -> bool {
        if !self.active || !combatant.is_alive() || combatant.id == self.owner {
            return false;
        }
        match self.targets {
            ZoneTargets::All => true,
            ZoneTargets::Allies => state.is_ally(self.owner, combatant.id),
            ZoneTargets::Enemies => state.is_enemy(self.owner, combatant.id),
        }
    }

    pub fn has_triggered_for(&self, combatant: CombatantId) -> bool {
        self.triggered.contains(&combatant)
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Movement, in feet, spent to step into `cell`.
pub fn movement_cost(state: &CombatState, cell: GridPosition) -> u32 {
    let multiplier = state
        .zones()
        .iter()
        .filter(|zone| zone.contains(state, cell))
        .map(|zone| zone.speed_multiplier)
        .max()
        .unwrap_or(1);
    CombatConfig::CELL_FEET * multiplier
}

/// Zones with a payload that would affect `combatant` if it stood on `cell`.
pub fn hostile_zones_at<'s>(
    state: &'s CombatState,
    combatant: &'s Combatant,
    cell: GridPosition,
) -> impl Iterator<Item = &'s ZoneEffect> + 's {
    state.zones().iter().filter(move |zone| {
        !zone.payload.is_empty() && zone.affects(state, combatant) && zone.contains(state, cell)
    })
}

// ============================================================================
// Triggers
// ============================================================================

/// Clears `combatant` from every zone's ledger. Called at its turn start.
pub(crate) fn reset_ledger(state: &mut CombatState, combatant: CombatantId) {
    for zone in state.zones_mut() {
        zone.triggered.remove(&combatant);
    }
}

/// Fires `trigger` zones containing `combatant`'s current position.
pub(crate) fn trigger_zones<R>(
    state: &mut CombatState,
    rules: &LifecycleRules,
    rng: &R,
    combatant: CombatantId,
    trigger: ZoneTrigger,
) -> Result<StateDelta, LifecycleFault>
where
    R: RngOracle + ?Sized,
{
    let Some(position) = state.combatant(combatant).map(|c| c.position) else {
        return Err(LifecycleFault::UnknownCombatant(combatant));
    };
    let pending = pending_zones(state, combatant, trigger, |zone, state| {
        zone.contains(state, position)
    });
    fire(state, rules, rng, combatant, pending)
}

/// Fires entry zones that contain `to` but not `from`.
pub(crate) fn trigger_entry<R>(
    state: &mut CombatState,
    rules: &LifecycleRules,
    rng: &R,
    combatant: CombatantId,
    from: GridPosition,
    to: GridPosition,
) -> Result<StateDelta, LifecycleFault>
where
    R: RngOracle + ?Sized,
{
    let pending = pending_zones(state, combatant, ZoneTrigger::OnEnter, |zone, state| {
        zone.contains(state, to) && !zone.contains(state, from)
    });
    fire(state, rules, rng, combatant, pending)
}

fn pending_zones(
    state: &CombatState,
    combatant: CombatantId,
    trigger: ZoneTrigger,
    inside: impl Fn(&ZoneEffect, &CombatState) -> bool,
) -> Vec<ZoneId> {
    let Some(target) = state.combatant(combatant) else {
        return Vec::new();
    };
    state
        .zones()
        .iter()
        .filter(|zone| {
            zone.trigger == trigger
                && !zone.has_triggered_for(combatant)
                && zone.affects(state, target)
                && inside(zone, state)
        })
        .map(|zone| zone.id)
        .collect()
}

fn fire<R>(
    state: &mut CombatState,
    rules: &LifecycleRules,
    rng: &R,
    combatant: CombatantId,
    zones: Vec<ZoneId>,
) -> Result<StateDelta, LifecycleFault>
where
    R: RngOracle + ?Sized,
{
    let mut delta = StateDelta::new();

    for id in zones {
        let Some(zone) = state.zones_mut().iter_mut().find(|z| z.id == id) else {
            continue;
        };
        zone.triggered.insert(combatant);
        let owner = zone.owner;
        let payload = zone.payload.clone();
        delta.push(DeltaEntry::ZoneTriggered { zone: id, combatant });

        let target = state
            .combatant(combatant)
            .ok_or(LifecycleFault::UnknownCombatant(combatant))?;
        if !target.is_alive() {
            break;
        }
        let context = roll_context::ZONE + id.0 * 0x100;
        let seed = |slot: u32| compute_seed(state.seed, state.nonce, combatant.0, context + slot);

        let saved = payload.save.as_ref().is_some_and(|save| {
            let roll = rng.roll_d20(seed(roll_context::SAVE)) as i32;
            roll + save_bonus(target, save) >= save.dc as i32
        });

        let mut damage = payload
            .damage
            .map(|dice| dice.roll(rng, |die| seed(roll_context::DAMAGE + die)))
            .unwrap_or(0);
        if saved {
            damage = match payload.save.map(|s| s.on_save) {
                Some(SaveEffect::Half) => damage / 2,
                _ => 0,
            };
        }

        if damage > 0 {
            let Some(target) = state.combatant_mut(combatant) else {
                continue;
            };
            let before = target.hp.current;
            target.hp.damage(damage);
            let after = target.hp.current;
            delta.push(DeltaEntry::HpChanged {
                combatant,
                before,
                after,
            });
            if after == 0 {
                delta.append(lifecycle::handle_death(state, rules, combatant));
                break;
            }
        }

        if let (Some((kind, duration)), false) = (payload.condition, saved) {
            let condition = ConditionInstance::new(kind, duration).from_source(owner);
            delta.append(lifecycle::apply_condition(state, rules, combatant, condition)?);
        }
    }

    Ok(delta)
}

fn save_bonus(target: &Combatant, save: &SaveSpec) -> i32 {
    let buffs: i32 = target
        .buffs
        .iter()
        .filter_map(|buff| match buff.effect {
            BuffEffect::SaveBonus(v) => Some(v),
            _ => None,
        })
        .sum();
    target.saves.get(save.ability) + buffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;
    use crate::state::{Ability, SaveBonuses};
    use crate::testing::{combatant, state_with};

    fn arena() -> CombatState {
        state_with(vec![
            combatant(1, 1, 0, 0),
            combatant(2, 2, 4, 0),
            combatant(3, 1, 1, 0),
        ])
    }

    #[test]
    fn test_owner_anchored_zone_moves_with_owner() {
        let mut state = arena();
        state.add_zone(ZoneEffect::new(ZoneId(1), "aura", CombatantId(1), 10));
        let zone = state.zone(ZoneId(1)).unwrap().clone();

        assert!(zone.contains(&state, GridPosition::new(2, 0)));
        assert!(!zone.contains(&state, GridPosition::new(3, 0)));
        assert!(!zone.affects(&state, state.combatant(CombatantId(1)).unwrap()));
        assert!(!zone.affects(&state, state.combatant(CombatantId(3)).unwrap()));
        assert!(zone.affects(&state, state.combatant(CombatantId(2)).unwrap()));
    }

    #[test]
    fn test_difficult_terrain_doubles_step_cost() {
        let mut state = arena();
        state.add_zone(
            ZoneEffect::new(ZoneId(1), "mud", CombatantId(1), 5)
                .at(GridPosition::new(10, 10))
                .with_targets(ZoneTargets::All)
                .with_speed_multiplier(2),
        );
        assert_eq!(movement_cost(&state, GridPosition::new(10, 11)), 10);
        assert_eq!(movement_cost(&state, GridPosition::new(0, 5)), 5);
    }

    #[test]
    fn test_zone_fires_once_per_turn() {
        let rules = LifecycleRules::default();
        let mut state = arena();
        state.add_zone(
            ZoneEffect::new(ZoneId(7), "spikes", CombatantId(1), 20)
                .with_trigger(ZoneTrigger::OnTurnStart)
                .with_damage(DiceExpr::flat(3)),
        );

        let first = trigger_zones(&mut state, &rules, &PcgRng, CombatantId(2), ZoneTrigger::OnTurnStart)
            .unwrap();
        assert_eq!(state.combatant(CombatantId(2)).unwrap().hp.current, 17);
        assert!(first.iter().any(|e| matches!(e, DeltaEntry::ZoneTriggered { .. })));

        let second = trigger_zones(&mut state, &rules, &PcgRng, CombatantId(2), ZoneTrigger::OnTurnStart)
            .unwrap();
        assert!(second.is_empty());

        reset_ledger(&mut state, CombatantId(2));
        trigger_zones(&mut state, &rules, &PcgRng, CombatantId(2), ZoneTrigger::OnTurnStart).unwrap();
        assert_eq!(state.combatant(CombatantId(2)).unwrap().hp.current, 14);
    }

    #[test]
    fn test_entry_zone_saves_block_condition() {
        let rules = LifecycleRules::default();
        let mut state = arena();
        if let Some(c) = state.combatant_mut(CombatantId(2)) {
            c.saves = SaveBonuses::default().with(Ability::Dex, 30);
        }
        state.add_zone(
            ZoneEffect::new(ZoneId(2), "web", CombatantId(1), 5)
                .at(GridPosition::new(6, 0))
                .with_save(SaveSpec {
                    ability: Ability::Dex,
                    dc: 12,
                    on_save: SaveEffect::None,
                })
                .with_condition(ConditionKind::Restrained, ConditionDuration::UntilEscape),
        );

        let delta = trigger_entry(
            &mut state,
            &rules,
            &PcgRng,
            CombatantId(2),
            GridPosition::new(4, 0),
            GridPosition::new(5, 0),
        )
        .unwrap();
        assert_eq!(delta.len(), 1);
        assert!(state.combatant(CombatantId(2)).unwrap().conditions.is_empty());
    }
}
