//! Data-driven combat content and loaders.
//!
//! This crate provides the read-only oracles consumed by `combat-core`:
//! - [`CreatureCatalog`]: creature kinds with shared action definitions ([`combat_core::CatalogOracle`])
//! - [`Rulebook`]: lifecycle rules, modifier registry and standard actions ([`combat_core::RulesOracle`])
//!
//! With the `loaders` feature (default) it also reads them from RON/TOML
//! files, either from a data directory ([`ContentFactory`]) or from the
//! copies compiled into the crate ([`loaders::embedded`]).
//!
//! Content is consumed through the oracles and never appears in combat state.

pub mod catalog;
pub mod rulebook;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{CreatureCatalog, CreatureSpec, StatBlock};
pub use rulebook::Rulebook;

#[cfg(feature = "loaders")]
pub use loaders::{
    ActionLoader, ConfigLoader, ContentFactory, CreatureLoader, LoadResult, ModifierLoader,
    RulesLoader, RulesSpec,
    embedded::{builtin_catalog, builtin_config, builtin_rulebook},
};
