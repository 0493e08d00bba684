//! Content compiled into the binary.
//!
//! The same files as the bundled `data/` directory, parsed from
//! `include_str!` so tests and tools need no file access.

use combat_core::CombatConfig;

use crate::catalog::{CreatureCatalog, CreatureSpec};
use crate::loaders::{ActionLoader, ConfigLoader, LoadResult, ModifierLoader, RulesSpec, parse_ron};
use crate::rulebook::Rulebook;

const WEAPONS: &str = include_str!("../../data/actions/weapons.ron");
const SPELLS: &str = include_str!("../../data/actions/spells.ron");
const MONSTERS: &str = include_str!("../../data/actions/monsters.ron");
const CREATURES: &str = include_str!("../../data/creatures.ron");
const MODIFIERS: &str = include_str!("../../data/modifiers.ron");
const RULES: &str = include_str!("../../data/rules.ron");
const CONFIG: &str = include_str!("../../data/config.toml");

/// Built-in creature catalog.
pub fn builtin_catalog() -> LoadResult<CreatureCatalog> {
    let actions = ActionLoader::merge([
        parse_ron(WEAPONS, "actions/weapons.ron")?,
        parse_ron(SPELLS, "actions/spells.ron")?,
        parse_ron(MONSTERS, "actions/monsters.ron")?,
    ]);
    let creatures: Vec<CreatureSpec> = parse_ron(CREATURES, "creatures.ron")?;
    CreatureCatalog::build(actions, creatures)
        .map_err(|e| anyhow::anyhow!("Failed to build creature catalog: {}", e))
}

/// Built-in lifecycle rules and modifier registry.
pub fn builtin_rulebook() -> LoadResult<Rulebook> {
    let rules: RulesSpec = parse_ron(RULES, "rules.ron")?;
    let modifiers = ModifierLoader::build(parse_ron(MODIFIERS, "modifiers.ron")?);
    Ok(Rulebook::new(rules.lifecycle, modifiers).with_allow_list(rules.incapacitated_allow_list))
}

/// Built-in tuning.
pub fn builtin_config() -> LoadResult<CombatConfig> {
    ConfigLoader::parse(CONFIG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ActionId, CatalogOracle, CreatureKind, ModifierId, PassiveTrait, RulesOracle};

    #[test]
    fn test_builtin_catalog_resolves_every_kind() {
        let catalog = builtin_catalog().unwrap();
        for kind in ["goblin", "orc", "wolf", "fighter", "rogue", "cleric", "wizard", "ogre"] {
            let definition = catalog.creature(&CreatureKind::new(kind));
            assert!(definition.is_some(), "missing creature kind {kind}");
            assert!(!definition.unwrap().actions.is_empty());
        }
    }

    #[test]
    fn test_builtin_modifiers_cover_creature_references() {
        let catalog = builtin_catalog().unwrap();
        let rulebook = builtin_rulebook().unwrap();
        assert!(rulebook.modifiers().diagnostics().is_empty());

        for kind in catalog.kinds() {
            let definition = catalog.creature(kind).unwrap();
            let referenced = definition
                .modifiers
                .iter()
                .chain(definition.actions.iter().flat_map(|a| a.modifiers.iter()));
            for id in referenced {
                assert!(rulebook.modifiers().get(id).is_some(), "{kind} references unknown {id}");
            }
        }
        assert!(rulebook.modifiers().get(&ModifierId::new("pack-tactics")).is_some());
    }

    #[test]
    fn test_rogue_has_cunning_action() {
        let catalog = builtin_catalog().unwrap();
        let rogue = catalog.creature(&CreatureKind::new("rogue")).unwrap();
        assert!(rogue.passives.iter().any(|p| matches!(
            p,
            PassiveTrait::TimingOverride { actions, .. } if actions.contains(&ActionId::new("dash"))
        )));
    }

    #[test]
    fn test_builtin_config_matches_defaults() {
        assert_eq!(builtin_config().unwrap(), CombatConfig::default());
    }
}
