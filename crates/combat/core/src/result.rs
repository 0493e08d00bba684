//! Execution log entries.

use crate::action::ActionId;
use crate::state::{BuffEffect, CombatantId, ConditionKind, GridPosition, Round};
use crate::zone::ZoneId;

/// How a command resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Hit { damage: u32 },
    Critical { damage: u32 },
    Miss,
    /// Target failed its save and took the full effect.
    SaveFailed { damage: u32 },
    /// Target made its save; `damage` is what remained (half or none).
    SaveSucceeded { damage: u32 },
    /// No roll was needed (healing, buffs, standard actions).
    Applied,
    Moved {
        from: GridPosition,
        to: GridPosition,
        feet: u32,
    },
    Passed,
    Escaped,
    EscapeFailed,
}

impl Outcome {
    /// Damage dealt to the primary target, if any.
    pub fn damage(&self) -> u32 {
        match *self {
            Outcome::Hit { damage }
            | Outcome::Critical { damage }
            | Outcome::SaveFailed { damage }
            | Outcome::SaveSucceeded { damage } => damage,
            _ => 0,
        }
    }
}

/// One observable state change.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeltaEntry {
    HpChanged {
        combatant: CombatantId,
        before: u32,
        after: u32,
    },
    Moved {
        combatant: CombatantId,
        from: GridPosition,
        to: GridPosition,
    },
    ConditionAdded {
        combatant: CombatantId,
        condition: ConditionKind,
        source: Option<CombatantId>,
    },
    ConditionRemoved {
        combatant: CombatantId,
        condition: ConditionKind,
        source: Option<CombatantId>,
    },
    BuffAdded {
        combatant: CombatantId,
        effect: BuffEffect,
    },
    BuffRemoved {
        combatant: CombatantId,
        effect: BuffEffect,
    },
    ResourceSpent {
        combatant: CombatantId,
        action: ActionId,
    },
    Died {
        combatant: CombatantId,
    },
    ZoneTriggered {
        zone: ZoneId,
        combatant: CombatantId,
    },
    ZoneDeactivated {
        zone: ZoneId,
    },
    TurnStarted {
        combatant: CombatantId,
        round: Round,
    },
}

/// Ordered state changes produced by one command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateDelta {
    entries: Vec<DeltaEntry>,
}

impl StateDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: DeltaEntry) {
        self.entries.push(entry);
    }

    pub fn append(&mut self, other: StateDelta) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[DeltaEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeltaEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Extend<DeltaEntry> for StateDelta {
    fn extend<T: IntoIterator<Item = DeltaEntry>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

/// Record of one executed command.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionResult {
    pub actor: CombatantId,
    /// Action used, `None` for moves and passes.
    pub action: Option<ActionId>,
    pub target: Option<CombatantId>,
    pub outcome: Outcome,
    pub delta: StateDelta,
    /// Round in which the command was executed.
    pub round: Round,
    /// Nonce the command was executed with.
    pub nonce: u64,
}
