//! Schema modifier loader.
//!
//! Builds the [`ModifierRegistry`] from `Vec<ModifierDefinition>` RON data.
//! Definitions the registry rejects are logged, not fatal.

use std::path::Path;

use combat_core::{ModifierDefinition, ModifierRegistry};
use tracing::{debug, warn};

use crate::loaders::{LoadResult, parse_ron, read_file};

/// Loader for data-declared modifiers.
pub struct ModifierLoader;

impl ModifierLoader {
    /// Load definitions from a RON file and initialise the registry.
    pub fn load(path: &Path) -> LoadResult<ModifierRegistry> {
        let content = read_file(path)?;
        let definitions: Vec<ModifierDefinition> =
            parse_ron(&content, &path.display().to_string())?;
        Ok(Self::build(definitions))
    }

    /// Initialises the registry and reports its diagnostics.
    pub fn build(definitions: Vec<ModifierDefinition>) -> ModifierRegistry {
        let count = definitions.len();
        let registry = ModifierRegistry::init(definitions);
        for diagnostic in registry.diagnostics() {
            warn!(
                modifier = ?diagnostic.modifier,
                source = %diagnostic.source,
                "{}",
                diagnostic.message
            );
        }
        debug!(
            loaded = registry.len(),
            rejected = count.saturating_sub(registry.len()),
            "modifier registry initialised"
        );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::ModifierId;

    #[test]
    fn test_rejected_definitions_become_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modifiers.ron");
        std::fs::write(
            &path,
            r#"[
                (
                    id: "pack-tactics",
                    label: "Pack Tactics",
                    when: Some(Exists(
                        relative_to: Actor,
                        filter: Ally,
                        quantifier: Any,
                        predicate: AdjacentTo(subject: Other, other: Target),
                    )),
                    effect: Override(RollMode(Advantage)),
                ),
                (
                    id: "empty-blessing",
                    label: "Empty Blessing",
                    effect: Magnitude(axis: Attack, amount: 0),
                ),
            ]"#,
        )
        .unwrap();

        let registry = ModifierLoader::load(&path).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&ModifierId::new("pack-tactics")).is_some());
        assert_eq!(registry.diagnostics().len(), 1);
        assert_eq!(
            registry.diagnostics()[0].modifier,
            Some(ModifierId::new("empty-blessing"))
        );
    }
}
