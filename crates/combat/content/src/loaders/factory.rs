//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use combat_core::CombatConfig;

use crate::catalog::{CreatureCatalog, CreatureSpec};
use crate::loaders::{
    ActionLoader, ConfigLoader, CreatureLoader, LoadResult, ModifierLoader, RulesLoader, RulesSpec,
};
use crate::rulebook::Rulebook;

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── creatures.ron
/// ├── modifiers.ron
/// ├── rules.ron
/// └── actions/
///     ├── weapons.ron
///     └── spells.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load creature specs from `creatures.ron`.
    pub fn load_creatures(&self) -> LoadResult<Vec<CreatureSpec>> {
        CreatureLoader::load(&self.data_dir.join("creatures.ron"))
    }

    /// Load and resolve the creature catalog (`actions/` + `creatures.ron`).
    pub fn load_catalog(&self) -> LoadResult<CreatureCatalog> {
        let actions = ActionLoader::load_dir(&self.data_dir.join("actions"))?;
        let creatures = self.load_creatures()?;
        CreatureCatalog::build(actions, creatures)
            .map_err(|e| anyhow::anyhow!("Failed to build creature catalog: {}", e))
    }

    /// Load the rulebook from `rules.ron` and `modifiers.ron`.
    ///
    /// A missing `rules.ron` falls back to the default lifecycle table.
    pub fn load_rulebook(&self) -> LoadResult<Rulebook> {
        let rules_path = self.data_dir.join("rules.ron");
        let rules = if rules_path.exists() {
            RulesLoader::load(&rules_path)?
        } else {
            RulesSpec::default()
        };
        let modifiers = ModifierLoader::load(&self.data_dir.join("modifiers.ron"))?;
        Ok(Rulebook::new(rules.lifecycle, modifiers).with_allow_list(rules.incapacitated_allow_list))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
