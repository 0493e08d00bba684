//! Per-combatant state.

use crate::action::ActionRecord;
use crate::state::{
    Buff, CombatantId, ConditionInstance, Conditions, CreatureKind, GridPosition, GroupId,
    HitPoints, Resources, TurnBudget,
};

/// The six abilities used for saving throws and checks.
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
)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    const fn index(self) -> usize {
        match self {
            Ability::Str => 0,
            Ability::Dex => 1,
            Ability::Con => 2,
            Ability::Int => 3,
            Ability::Wis => 4,
            Ability::Cha => 5,
        }
    }
}

/// Saving-throw bonus per ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveBonuses([i32; 6]);

impl SaveBonuses {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self([str, dex, con, int, wis, cha])
    }

    pub fn get(&self, ability: Ability) -> i32 {
        self.0[ability.index()]
    }

    pub fn with(mut self, ability: Ability, bonus: i32) -> Self {
        self.0[ability.index()] = bonus;
        self
    }

    /// Bonus used for escape checks: the better of Strength and Dexterity.
    pub fn escape_bonus(&self) -> i32 {
        self.get(Ability::Str).max(self.get(Ability::Dex))
    }
}

/// A single participant in an encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub kind: CreatureKind,
    pub group: GroupId,
    pub position: GridPosition,
    pub hp: HitPoints,
    pub armor_class: i32,
    /// Walking speed in feet.
    pub speed: u32,
    pub saves: SaveBonuses,
    pub conditions: Conditions,
    pub buffs: Vec<Buff>,
    pub resources: Resources,
    pub budget: TurnBudget,
    /// Actions taken during the current turn.
    pub history: Vec<ActionRecord>,
}

impl Combatant {
    pub fn new(
        id: CombatantId,
        kind: CreatureKind,
        group: GroupId,
        max_hp: u32,
        armor_class: i32,
        speed: u32,
    ) -> Self {
        Self {
            id,
            name: format!("{kind} {id}"),
            kind,
            group,
            position: GridPosition::ORIGIN,
            hp: HitPoints::full(max_hp),
            armor_class,
            speed,
            saves: SaveBonuses::default(),
            conditions: Conditions::empty(),
            buffs: Vec::new(),
            resources: Resources::new(),
            budget: TurnBudget::full(speed),
            history: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, position: GridPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_hp(mut self, hp: HitPoints) -> Self {
        self.hp = hp;
        self
    }

    pub fn with_saves(mut self, saves: SaveBonuses) -> Self {
        self.saves = saves;
        self
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    /// Starts the encounter with a condition already applied.
    ///
    /// Linked conditions must go through the lifecycle engine instead so that
    /// both halves of the pair exist.
    pub fn with_condition(mut self, condition: ConditionInstance) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_buff(mut self, buff: Buff) -> Self {
        self.buffs.push(buff);
        self
    }

    pub fn is_alive(&self) -> bool {
        !self.hp.is_zero()
    }

    /// Speed after conditions; zero while grappled, restrained or incapacitated.
    pub fn effective_speed(&self) -> u32 {
        if self.conditions.is_immobilized() {
            0
        } else {
            self.speed
        }
    }

    /// Refills the per-round budget.
    pub fn reset_budget(&mut self) {
        self.budget = TurnBudget::full(self.speed);
    }
}
