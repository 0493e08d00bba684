//! Authoritative combat state.
//!
//! [`CombatState`] is the single mutable aggregate of an encounter. Runtime
//! layers read it freely, but combatants are only mutated through
//! [`crate::engine::CombatEngine`] and the lifecycle functions it drives.
pub mod error;
pub mod types;

use std::collections::{BTreeMap, BTreeSet};

pub use error::StateError;
pub use types::{
    Ability, Buff, BuffEffect, Combatant, CombatantId, ConditionDuration, ConditionInstance,
    ConditionKind, Conditions, CreatureKind, GridPosition, GroupId, HitPoints, Resources, Round,
    SaveBonuses, TurnBudget,
};

use crate::zone::{ZoneEffect, ZoneId};

/// Groups that fight on the same side. A group is always allied with itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alliances {
    pairs: BTreeSet<(GroupId, GroupId)>,
}

impl Alliances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares two groups allies (symmetric).
    pub fn ally(&mut self, a: GroupId, b: GroupId) {
        self.pairs.insert((a.min(b), a.max(b)));
    }

    pub fn are_allied(&self, a: GroupId, b: GroupId) -> bool {
        a == b || self.pairs.contains(&(a.min(b), a.max(b)))
    }
}

/// Canonical snapshot of an encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    /// Base seed for deterministic dice. Set once at encounter start.
    pub seed: u64,
    /// Execution counter, incremented after every successful command.
    pub nonce: u64,
    pub round: Round,
    initiative: Vec<CombatantId>,
    current: usize,
    combatants: BTreeMap<CombatantId, Combatant>,
    zones: Vec<ZoneEffect>,
    alliances: Alliances,
}

impl CombatState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            nonce: 0,
            round: Round::FIRST,
            initiative: Vec::new(),
            current: 0,
            combatants: BTreeMap::new(),
            zones: Vec::new(),
            alliances: Alliances::new(),
        }
    }

    // ========================================================================
    // Encounter assembly
    // ========================================================================

    /// Adds a combatant.
    ///
    /// # Errors
    ///
    /// Fails if the id is already taken or a living combatant occupies the cell.
    pub fn add_combatant(&mut self, combatant: Combatant) -> Result<(), StateError> {
        if self.combatants.contains_key(&combatant.id) {
            return Err(StateError::DuplicateCombatant(combatant.id));
        }
        if let Some(occupant) = self.occupant_at(combatant.position) {
            return Err(StateError::PositionOccupied {
                position: combatant.position,
                occupant,
            });
        }
        self.combatants.insert(combatant.id, combatant);
        Ok(())
    }

    /// Sets the initiative order and rewinds the encounter to round 1.
    ///
    /// Every combatant's per-round budget is refilled.
    pub fn set_initiative(&mut self, order: Vec<CombatantId>) -> Result<(), StateError> {
        if order.is_empty() {
            return Err(StateError::InvalidInitiative);
        }
        let mut seen = BTreeSet::new();
        for id in &order {
            if !self.combatants.contains_key(id) {
                return Err(StateError::UnknownCombatant(*id));
            }
            if !seen.insert(*id) {
                return Err(StateError::InvalidInitiative);
            }
        }

        self.initiative = order;
        self.current = 0;
        self.round = Round::FIRST;
        for combatant in self.combatants.values_mut() {
            combatant.reset_budget();
            combatant.history.clear();
        }
        Ok(())
    }

    pub fn ally_groups(&mut self, a: GroupId, b: GroupId) {
        self.alliances.ally(a, b);
    }

    pub fn add_zone(&mut self, zone: ZoneEffect) {
        self.zones.push(zone);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    pub(crate) fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    pub(crate) fn combatants_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.combatants.values_mut()
    }

    /// All combatants in id order.
    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values()
    }

    pub fn living(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values().filter(|c| c.is_alive())
    }

    pub fn initiative(&self) -> &[CombatantId] {
        &self.initiative
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub(crate) fn set_current_index(&mut self, index: usize) {
        self.current = index;
    }

    /// Combatant whose turn it is, if initiative has been set.
    pub fn current_actor(&self) -> Option<CombatantId> {
        self.initiative.get(self.current).copied()
    }

    pub fn alliances(&self) -> &Alliances {
        &self.alliances
    }

    /// True if both combatants fight on the same side. A combatant is its own ally.
    pub fn is_ally(&self, a: CombatantId, b: CombatantId) -> bool {
        match (self.combatant(a), self.combatant(b)) {
            (Some(a), Some(b)) => self.alliances.are_allied(a.group, b.group),
            _ => false,
        }
    }

    pub fn is_enemy(&self, a: CombatantId, b: CombatantId) -> bool {
        match (self.combatant(a), self.combatant(b)) {
            (Some(a), Some(b)) => !self.alliances.are_allied(a.group, b.group),
            _ => false,
        }
    }

    /// Living combatant standing on `position`.
    pub fn occupant_at(&self, position: GridPosition) -> Option<CombatantId> {
        self.living()
            .find(|c| c.position == position)
            .map(|c| c.id)
    }

    /// Groups that still have at least one living combatant.
    pub fn standing_groups(&self) -> BTreeSet<GroupId> {
        self.living().map(|c| c.group).collect()
    }

    pub fn zones(&self) -> &[ZoneEffect] {
        &self.zones
    }

    pub(crate) fn zones_mut(&mut self) -> &mut [ZoneEffect] {
        &mut self.zones
    }

    pub fn zone(&self, id: ZoneId) -> Option<&ZoneEffect> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// SHA-256 over the bincode encoding of the whole state.
    ///
    /// Two states with the same digest are identical; used to check that
    /// planning leaves the state untouched.
    #[cfg(feature = "serde")]
    pub fn digest(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        if let Ok(bytes) = bincode::serialize(self) {
            hasher.update(&bytes);
        }
        hasher.finalize().into()
    }
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(id: u32, group: u32, x: i32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            CreatureKind::new("fighter"),
            GroupId(group),
            20,
            16,
            30,
        )
        .at(GridPosition::new(x, 0))
    }

    #[test]
    fn test_add_rejects_duplicates_and_occupied_cells() {
        let mut state = CombatState::new(7);
        state.add_combatant(fighter(1, 1, 0)).unwrap();
        assert_eq!(
            state.add_combatant(fighter(1, 1, 3)),
            Err(StateError::DuplicateCombatant(CombatantId(1)))
        );
        assert!(matches!(
            state.add_combatant(fighter(2, 1, 0)),
            Err(StateError::PositionOccupied { .. })
        ));
    }

    #[test]
    fn test_initiative_validation() {
        let mut state = CombatState::new(7);
        state.add_combatant(fighter(1, 1, 0)).unwrap();
        state.add_combatant(fighter(2, 2, 1)).unwrap();

        assert_eq!(
            state.set_initiative(vec![CombatantId(1), CombatantId(1)]),
            Err(StateError::InvalidInitiative)
        );
        assert_eq!(
            state.set_initiative(vec![CombatantId(3)]),
            Err(StateError::UnknownCombatant(CombatantId(3)))
        );
        state
            .set_initiative(vec![CombatantId(2), CombatantId(1)])
            .unwrap();
        assert_eq!(state.current_actor(), Some(CombatantId(2)));
        assert_eq!(state.round, Round::FIRST);
    }

    #[test]
    fn test_alliances() {
        let mut state = CombatState::new(7);
        state.add_combatant(fighter(1, 1, 0)).unwrap();
        state.add_combatant(fighter(2, 2, 1)).unwrap();
        state.add_combatant(fighter(3, 3, 2)).unwrap();
        state.ally_groups(GroupId(1), GroupId(3));

        assert!(state.is_ally(CombatantId(1), CombatantId(1)));
        assert!(state.is_ally(CombatantId(3), CombatantId(1)));
        assert!(state.is_enemy(CombatantId(1), CombatantId(2)));
        assert!(!state.is_enemy(CombatantId(1), CombatantId(9)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_digest_tracks_changes() {
        let mut state = CombatState::new(7);
        state.add_combatant(fighter(1, 1, 0)).unwrap();
        let before = state.digest();
        assert_eq!(before, state.clone().digest());

        if let Some(c) = state.combatant_mut(CombatantId(1)) {
            c.hp.damage(3);
        }
        assert_ne!(hex::encode(before), hex::encode(state.digest()));
    }
}
