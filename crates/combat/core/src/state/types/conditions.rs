//! Condition instances carried by combatants.
//!
//! A condition is a status such as `Prone` or `Grappled`. Conditions may name
//! the combatant that imposed them (`source`) and, for paired conditions, the
//! combatant holding the mirrored counterpart (`linked`). Pair consistency is
//! maintained by [`crate::lifecycle`]; this module only stores instances.
//!
//! # Duration
//!
//! Durations are counted in the holder's turns, see [`ConditionDuration`].

use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::state::CombatantId;

/// Kinds of conditions. The set is closed; rules match on it exhaustively.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionKind {
    // ========================================================================
    // Standard conditions
    // ========================================================================
    Blinded,
    Charmed,
    Deafened,
    Frightened,
    /// Held by another creature; speed 0. Paired with [`ConditionKind::Grappling`].
    Grappled,
    /// Holding another creature. Paired with [`ConditionKind::Grappled`].
    Grappling,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,

    // ========================================================================
    // Turn states from standard actions
    // ========================================================================
    /// Took the Dodge action; attacks against have disadvantage.
    Dodging,
    /// Took the Disengage action; movement provokes no retaliation.
    Disengaging,
}

impl ConditionKind {
    /// Conditions that prevent taking actions.
    pub const INCAPACITATING: [ConditionKind; 5] = [
        ConditionKind::Incapacitated,
        ConditionKind::Paralyzed,
        ConditionKind::Petrified,
        ConditionKind::Stunned,
        ConditionKind::Unconscious,
    ];

    pub fn is_incapacitating(self) -> bool {
        Self::INCAPACITATING.contains(&self)
    }

    /// Conditions that reduce speed to zero.
    pub fn is_immobilizing(self) -> bool {
        matches!(self, ConditionKind::Grappled | ConditionKind::Restrained) || self.is_incapacitating()
    }
}

/// How long a condition lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionDuration {
    /// Expires after the holder ends this many turns.
    Rounds(u8),
    /// Expires when the holder's next turn starts.
    UntilTurnStart,
    /// Expires when the holder's current turn ends.
    UntilTurnEnd,
    /// Lasts until escaped or removed by its source.
    UntilEscape,
    /// Lasts until removed.
    Permanent,
}

impl ConditionDuration {
    /// Orders durations by how long they keep a condition on.
    fn span(self) -> (u8, u8) {
        match self {
            Self::UntilTurnStart | Self::UntilTurnEnd => (0, 0),
            Self::Rounds(n) => (1, n),
            Self::UntilEscape => (2, 0),
            Self::Permanent => (3, 0),
        }
    }

    /// The longer of two durations.
    pub fn longer(self, other: Self) -> Self {
        if other.span() > self.span() { other } else { self }
    }
}

/// A single condition carried by a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionInstance {
    pub kind: ConditionKind,
    /// Combatant that imposed this condition.
    pub source: Option<CombatantId>,
    /// Combatant holding the paired counterpart, if any.
    pub linked: Option<CombatantId>,
    pub duration: ConditionDuration,
    /// DC of the escape check, for conditions that can be escaped.
    pub escape_dc: Option<u8>,
}

impl ConditionInstance {
    pub fn new(kind: ConditionKind, duration: ConditionDuration) -> Self {
        Self {
            kind,
            source: None,
            linked: None,
            duration,
            escape_dc: None,
        }
    }

    pub fn from_source(mut self, source: CombatantId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn linked_to(mut self, other: CombatantId) -> Self {
        self.linked = Some(other);
        self
    }

    pub fn with_escape_dc(mut self, dc: u8) -> Self {
        self.escape_dc = Some(dc);
        self
    }

    /// Same kind imposed by the same source.
    pub fn same_as(&self, kind: ConditionKind, source: Option<CombatantId>) -> bool {
        self.kind == kind && self.source == source
    }
}

/// Conditions currently on a combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conditions {
    entries: ArrayVec<ConditionInstance, { CombatConfig::MAX_CONDITIONS }>,
}

impl Conditions {
    pub fn empty() -> Self {
        Self {
            entries: ArrayVec::new(),
        }
    }

    /// Checks if any instance of `kind` is present.
    pub fn has(&self, kind: ConditionKind) -> bool {
        self.entries.iter().any(|c| c.kind == kind)
    }

    /// Checks if any incapacitating condition is present.
    pub fn is_incapacitated(&self) -> bool {
        self.entries.iter().any(|c| c.kind.is_incapacitating())
    }

    /// Checks if any condition reduces speed to zero.
    pub fn is_immobilized(&self) -> bool {
        self.entries.iter().any(|c| c.kind.is_immobilizing())
    }

    pub fn find(
        &self,
        kind: ConditionKind,
        source: Option<CombatantId>,
    ) -> Option<&ConditionInstance> {
        self.entries.iter().find(|c| c.same_as(kind, source))
    }

    /// Number of free slots.
    pub fn remaining_capacity(&self) -> usize {
        self.entries.remaining_capacity()
    }

    /// Adds a condition instance.
    ///
    /// # Returns
    ///
    /// `false` if there is no room left; the instance is not added.
    pub(crate) fn push(&mut self, condition: ConditionInstance) -> bool {
        self.entries.try_push(condition).is_ok()
    }

    /// Removes the first instance matching `kind` and `source`.
    pub(crate) fn remove(
        &mut self,
        kind: ConditionKind,
        source: Option<CombatantId>,
    ) -> Option<ConditionInstance> {
        let index = self.entries.iter().position(|c| c.same_as(kind, source))?;
        Some(self.entries.remove(index))
    }

    /// Detaches the `kind` instance imposed by `source` from it.
    ///
    /// If an unsourced instance of `kind` is already present the two merge
    /// into it, keeping the longer duration and the harder escape.
    pub(crate) fn orphan(&mut self, kind: ConditionKind, source: CombatantId) {
        let Some(index) = self.entries.iter().position(|c| c.same_as(kind, Some(source))) else {
            return;
        };
        match self.entries.iter().position(|c| c.same_as(kind, None)) {
            Some(existing) => {
                let orphaned = self.entries.remove(index);
                let existing = if existing > index { existing - 1 } else { existing };
                let kept = &mut self.entries[existing];
                kept.duration = kept.duration.longer(orphaned.duration);
                kept.escape_dc = kept.escape_dc.max(orphaned.escape_dc);
                kept.linked = kept.linked.or(orphaned.linked);
            }
            None => self.entries[index].source = None,
        }
    }

    /// Removes all instances matching the predicate and returns them.
    pub(crate) fn drain_where(
        &mut self,
        mut predicate: impl FnMut(&ConditionInstance) -> bool,
    ) -> Vec<ConditionInstance> {
        let mut removed = Vec::new();
        self.entries.retain(|c| {
            if predicate(c) {
                removed.push(*c);
                false
            } else {
                true
            }
        });
        removed
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ConditionInstance> {
        self.entries.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConditionInstance> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ConditionInstance> for Conditions {
    fn from_iter<T: IntoIterator<Item = ConditionInstance>>(iter: T) -> Self {
        let mut conditions = Self::empty();
        for condition in iter {
            conditions.push(condition);
        }
        conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orphan_merges_into_unsourced_instance() {
        let mut conditions: Conditions = [
            ConditionInstance::new(ConditionKind::Frightened, ConditionDuration::Rounds(1)),
            ConditionInstance::new(ConditionKind::Frightened, ConditionDuration::Rounds(3))
                .from_source(CombatantId(7)),
        ]
        .into_iter()
        .collect();

        conditions.orphan(ConditionKind::Frightened, CombatantId(7));

        assert_eq!(conditions.len(), 1);
        let kept = conditions.find(ConditionKind::Frightened, None).unwrap();
        assert_eq!(kept.duration, ConditionDuration::Rounds(3));
        conditions.remove(ConditionKind::Frightened, None);
        assert!(!conditions.has(ConditionKind::Frightened));
    }

    #[test]
    fn test_orphan_without_unsourced_instance_clears_source() {
        let mut conditions: Conditions = [ConditionInstance::new(
            ConditionKind::Poisoned,
            ConditionDuration::Permanent,
        )
        .from_source(CombatantId(2))]
        .into_iter()
        .collect();

        conditions.orphan(ConditionKind::Poisoned, CombatantId(2));

        assert_eq!(conditions.len(), 1);
        assert!(conditions.find(ConditionKind::Poisoned, None).is_some());
    }

    #[test]
    fn test_incapacitating_kinds() {
        assert!(ConditionKind::Stunned.is_incapacitating());
        assert!(ConditionKind::Paralyzed.is_incapacitating());
        assert!(!ConditionKind::Prone.is_incapacitating());
        assert!(ConditionKind::Grappled.is_immobilizing());
    }

    #[test]
    fn test_kind_names_are_kebab_case() {
        assert_eq!(ConditionKind::Grappled.to_string(), "grappled");
        assert_eq!(
            "disengaging".parse::<ConditionKind>().ok(),
            Some(ConditionKind::Disengaging)
        );
    }

    #[test]
    fn test_remove_matches_source() {
        let mut conditions = Conditions::empty();
        conditions.push(
            ConditionInstance::new(ConditionKind::Prone, ConditionDuration::Permanent)
                .from_source(CombatantId(1)),
        );
        conditions.push(
            ConditionInstance::new(ConditionKind::Prone, ConditionDuration::Permanent)
                .from_source(CombatantId(2)),
        );

        let removed = conditions.remove(ConditionKind::Prone, Some(CombatantId(2)));
        assert_eq!(removed.and_then(|c| c.source), Some(CombatantId(2)));
        assert_eq!(conditions.len(), 1);
        assert!(conditions.find(ConditionKind::Prone, Some(CombatantId(1))).is_some());
    }

    #[test]
    fn test_push_respects_capacity() {
        let mut conditions = Conditions::empty();
        for _ in 0..CombatConfig::MAX_CONDITIONS {
            assert!(conditions.push(ConditionInstance::new(
                ConditionKind::Poisoned,
                ConditionDuration::Permanent
            )));
        }
        assert!(!conditions.push(ConditionInstance::new(
            ConditionKind::Prone,
            ConditionDuration::Permanent
        )));
        assert_eq!(conditions.remaining_capacity(), 0);
    }
}
