use std::collections::BTreeMap;

use crate::state::ConditionKind;

/// Two condition kinds that always exist together on two combatants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkedPair {
    pub primary: ConditionKind,
    pub partner: ConditionKind,
    /// Re-applying an existing pair is a no-op instead of refreshing it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub only_if_new: bool,
}

/// Resolved view of a pair from one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkRule {
    pub partner: ConditionKind,
    pub only_if_new: bool,
}

/// What happens to a condition when the combatant that imposed it dies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeathPolicy {
    #[default]
    RemoveFromTargets,
    /// The condition stays; its source reference is cleared.
    Persist,
}

/// Holders of `condition` move along with the combatant that imposed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionSyncRule {
    pub condition: ConditionKind,
    pub follow_source: bool,
    /// The source must hold this condition, linked to the follower.
    #[cfg_attr(feature = "serde", serde(default))]
    pub requires_source_condition: Option<ConditionKind>,
}

/// Rule table driving dependent-effect propagation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LifecycleRules {
    pub linked_pairs: Vec<LinkedPair>,
    /// Per-kind policy; kinds not listed use [`DeathPolicy::RemoveFromTargets`].
    pub death_policies: BTreeMap<ConditionKind, DeathPolicy>,
    pub position_sync: Vec<PositionSyncRule>,
}

impl LifecycleRules {
    /// No pairs, default death policy, no position sync.
    pub fn empty() -> Self {
        Self {
            linked_pairs: Vec::new(),
            death_policies: BTreeMap::new(),
            position_sync: Vec::new(),
        }
    }

    /// Partner of `kind`, looked up from either side of a pair.
    pub fn partner_of(&self, kind: ConditionKind) -> Option<LinkRule> {
        self.linked_pairs.iter().find_map(|pair| {
            if pair.primary == kind {
                Some(LinkRule {
                    partner: pair.partner,
                    only_if_new: pair.only_if_new,
                })
            } else if pair.partner == kind {
                Some(LinkRule {
                    partner: pair.primary,
                    only_if_new: pair.only_if_new,
                })
            } else {
                None
            }
        })
    }

    pub fn death_policy(&self, kind: ConditionKind) -> DeathPolicy {
        self.death_policies.get(&kind).copied().unwrap_or_default()
    }
}

impl Default for LifecycleRules {
    /// Grappled/Grappling pair; grappled creatures are dragged by the grappler.
    fn default() -> Self {
        Self {
            linked_pairs: vec![LinkedPair {
                primary: ConditionKind::Grappled,
                partner: ConditionKind::Grappling,
                only_if_new: true,
            }],
            death_policies: BTreeMap::new(),
            position_sync: vec![PositionSyncRule {
                condition: ConditionKind::Grappled,
                follow_source: true,
                requires_source_condition: Some(ConditionKind::Grappling),
            }],
        }
    }
}
