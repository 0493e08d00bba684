//! Action definition loader.
//!
//! Actions live in RON files as `Vec<ActionDef>`. A directory of such files
//! is merged in file-name order; a later definition replaces an earlier one
//! with the same id.

use std::collections::BTreeMap;
use std::path::Path;

use combat_core::{ActionDef, ActionId};
use tracing::warn;

use crate::loaders::{LoadResult, parse_ron, read_file};

/// Loader for action definitions.
pub struct ActionLoader;

impl ActionLoader {
    /// Load actions from a single RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<ActionDef>> {
        let content = read_file(path)?;
        parse_ron(&content, &path.display().to_string())
    }

    /// Load every `*.ron` file in `dir`.
    ///
    /// # Returns
    ///
    /// Definitions sorted by id.
    pub fn load_dir(dir: &Path) -> LoadResult<Vec<ActionDef>> {
        let mut files: Vec<_> = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        files.sort();

        let mut sources = Vec::with_capacity(files.len());
        for path in files {
            sources.push(Self::load(&path)?);
        }
        Ok(Self::merge(sources))
    }

    /// Merges definition lists; later ids win.
    pub(crate) fn merge(sources: impl IntoIterator<Item = Vec<ActionDef>>) -> Vec<ActionDef> {
        let mut actions: BTreeMap<ActionId, ActionDef> = BTreeMap::new();
        for action in sources.into_iter().flatten() {
            let id = action.id.clone();
            if actions.insert(id.clone(), action).is_some() {
                warn!(action = %id, "duplicate action definition replaced");
            }
        }
        actions.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ActionProperties, ActionTiming, DiceExpr, ResourceCost};

    const DAGGERS: &str = r#"[
        (
            id: "dagger",
            name: "Dagger",
            timing: Action,
            kind: Declared,
            target: Enemy,
            range: (kind: Melee, normal: 5),
            properties: "MELEE_WEAPON | LIGHT | FINESSE",
            attack: Some((bonus: 4)),
            damage: Some("1d4+2"),
        ),
        (
            id: "offhand-dagger",
            name: "Off-hand Dagger",
            timing: BonusAction,
            kind: Declared,
            target: Enemy,
            range: (kind: Melee, normal: 5),
            properties: "MELEE_WEAPON | LIGHT",
            attack: Some((bonus: 4)),
            damage: Some("1d4"),
            requires: Some((timings: [Action], properties: "MELEE_WEAPON | LIGHT")),
        ),
    ]"#;

    #[test]
    fn test_load_actions_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daggers.ron");
        std::fs::write(&path, DAGGERS).unwrap();

        let actions = ActionLoader::load(&path).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].damage, Some(DiceExpr::new(1, 4, 2)));
        assert!(actions[0].properties.contains(ActionProperties::FINESSE));
        assert_eq!(actions[1].timing, ActionTiming::BonusAction);
        assert_eq!(actions[1].cost, ResourceCost::None);
        assert!(actions[1].requires.is_some());
    }

    #[test]
    fn test_load_dir_merges_later_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ron"), DAGGERS).unwrap();
        std::fs::write(
            dir.path().join("b.ron"),
            DAGGERS.replace("1d4+2", "1d4+3"),
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let actions = ActionLoader::load_dir(dir.path()).unwrap();
        assert_eq!(actions.len(), 2);
        let dagger = actions.iter().find(|a| a.id.as_str() == "dagger").unwrap();
        assert_eq!(dagger.damage, Some(DiceExpr::new(1, 4, 3)));
    }

    #[test]
    fn test_bad_dice_fails_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, DAGGERS.replace("1d4+2", "1d1")).unwrap();

        let error = ActionLoader::load(&path).unwrap_err();
        assert!(error.to_string().contains("broken.ron"));
    }
}
