pub mod budget;
pub mod buffs;
pub mod combatant;
pub mod common;
pub mod conditions;
pub mod resources;

pub use budget::TurnBudget;
pub use buffs::{Buff, BuffEffect};
pub use combatant::{Ability, Combatant, SaveBonuses};
pub use common::{CombatantId, CreatureKind, GridPosition, GroupId, HitPoints, Round};
pub use conditions::{ConditionDuration, ConditionInstance, ConditionKind, Conditions};
pub use resources::Resources;
