//! Per-kind creature cache.
//!
//! A [`CreatureCatalog`] is assembled once from action definitions and
//! creature specs. Every action is allocated a single time and shared by
//! `Arc` between all kinds that list it, so looking up a creature's actions
//! never clones a definition.

use std::collections::BTreeMap;
use std::sync::Arc;

use combat_core::{
    Ability, ActionDef, ActionId, AuraDef, CatalogOracle, Combatant, CombatantId, CreatureDefinition,
    CreatureKind, GridPosition, GroupId, ModifierId, OracleError, PassiveTrait, Resources,
    SaveBonuses,
};

/// Numbers a combatant of a kind starts the encounter with.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBlock {
    pub max_hp: u32,
    pub armor_class: i32,
    pub speed: u32,
    /// Saving-throw bonuses; abilities not listed are +0.
    #[cfg_attr(feature = "serde", serde(default))]
    pub saves: BTreeMap<Ability, i32>,
    /// Spell slots per tier.
    #[cfg_attr(feature = "serde", serde(default))]
    pub spell_slots: BTreeMap<u8, u8>,
}

impl StatBlock {
    pub fn save_bonuses(&self) -> SaveBonuses {
        self.saves
            .iter()
            .fold(SaveBonuses::default(), |saves, (ability, bonus)| {
                saves.with(*ability, *bonus)
            })
    }
}

/// Data-file form of a creature kind. Actions are referenced by id.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureSpec {
    pub kind: CreatureKind,
    /// Display name prefix; defaults to the kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    pub stats: StatBlock,
    pub actions: Vec<ActionId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<ModifierId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub passives: Vec<PassiveTrait>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub auras: Vec<AuraDef>,
}

#[derive(Clone, Debug)]
struct CatalogEntry {
    name: String,
    stats: StatBlock,
    definition: CreatureDefinition,
}

/// Creature definitions keyed by kind, with shared action allocations.
#[derive(Clone, Debug, Default)]
pub struct CreatureCatalog {
    actions: BTreeMap<ActionId, Arc<ActionDef>>,
    creatures: BTreeMap<CreatureKind, CatalogEntry>,
}

impl CreatureCatalog {
    /// Builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::UnknownAction` when a creature lists an action
    /// id that no definition provides.
    pub fn build(
        actions: impl IntoIterator<Item = ActionDef>,
        creatures: impl IntoIterator<Item = CreatureSpec>,
    ) -> Result<Self, OracleError> {
        let actions: BTreeMap<ActionId, Arc<ActionDef>> = actions
            .into_iter()
            .map(|action| (action.id.clone(), Arc::new(action)))
            .collect();

        let mut entries = BTreeMap::new();
        for spec in creatures {
            let mut definition = CreatureDefinition::new(spec.kind.clone());
            for id in &spec.actions {
                let action = actions.get(id).ok_or_else(|| OracleError::UnknownAction {
                    kind: spec.kind.clone(),
                    action: id.clone(),
                })?;
                definition.actions.push(Arc::clone(action));
            }
            definition.modifiers = spec.modifiers;
            definition.passives = spec.passives;
            definition.auras = spec.auras;

            entries.insert(
                spec.kind.clone(),
                CatalogEntry {
                    name: spec.name.unwrap_or_else(|| spec.kind.to_string()),
                    stats: spec.stats,
                    definition,
                },
            );
        }

        Ok(Self {
            actions,
            creatures: entries,
        })
    }

    pub fn action(&self, id: &ActionId) -> Option<&Arc<ActionDef>> {
        self.actions.get(id)
    }

    pub fn stats(&self, kind: &CreatureKind) -> Option<&StatBlock> {
        self.creatures.get(kind).map(|entry| &entry.stats)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &CreatureKind> {
        self.creatures.keys()
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    /// Creates a combatant of `kind` with full HP, its saves, spell slots
    /// and ready recharge/per-day pools.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::UnknownCreatureKind` if the kind is not registered.
    pub fn spawn(
        &self,
        kind: &CreatureKind,
        id: CombatantId,
        group: GroupId,
        position: GridPosition,
    ) -> Result<Combatant, OracleError> {
        let entry = self
            .creatures
            .get(kind)
            .ok_or_else(|| OracleError::UnknownCreatureKind(kind.clone()))?;
        let stats = &entry.stats;

        let resources = stats.spell_slots.iter().fold(
            Resources::for_actions(entry.definition.actions.iter().map(Arc::as_ref)),
            |resources, (tier, count)| resources.with_spell_slots(*tier, *count),
        );

        Ok(Combatant::new(
            id,
            kind.clone(),
            group,
            stats.max_hp,
            stats.armor_class,
            stats.speed,
        )
        .with_name(format!("{} {}", entry.name, id.0))
        .with_saves(stats.save_bonuses())
        .with_resources(resources)
        .at(position))
    }
}

impl CatalogOracle for CreatureCatalog {
    fn creature(&self, kind: &CreatureKind) -> Option<&CreatureDefinition> {
        self.creatures.get(kind).map(|entry| &entry.definition)
    }
}
