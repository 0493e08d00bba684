//! Content loaders for reading combat data from files.
//!
//! RON files hold action, creature, modifier and lifecycle definitions;
//! `config.toml` holds the tunable [`combat_core::CombatConfig`].

pub mod actions;
pub mod config;
pub mod creatures;
pub mod embedded;
pub mod factory;
pub mod modifiers;
pub mod rules;

pub use actions::ActionLoader;
pub use config::ConfigLoader;
pub use creatures::CreatureLoader;
pub use factory::ContentFactory;
pub use modifiers::ModifierLoader;
pub use rules::{RulesLoader, RulesSpec};

use std::path::Path;

use serde::de::DeserializeOwned;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Parses RON text, naming `origin` in the error.
pub(crate) fn parse_ron<T: DeserializeOwned>(content: &str, origin: &str) -> LoadResult<T> {
    ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", origin, e))
}
