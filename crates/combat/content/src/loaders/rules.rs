//! Lifecycle rule table loader.

use std::path::Path;

use combat_core::{ActionId, LifecycleRules};

use crate::loaders::{LoadResult, parse_ron, read_file};

/// Data-file form of the encounter-wide rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct RulesSpec {
    pub lifecycle: LifecycleRules,
    /// Actions that stay available under an incapacitating condition.
    pub incapacitated_allow_list: Vec<ActionId>,
}

/// Loader for `rules.ron`.
pub struct RulesLoader;

impl RulesLoader {
    pub fn load(path: &Path) -> LoadResult<RulesSpec> {
        let content = read_file(path)?;
        parse_ron(&content, &path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ConditionKind, DeathPolicy};

    #[test]
    fn test_load_rules_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.ron");
        std::fs::write(
            &path,
            r#"(
                lifecycle: (
                    linked_pairs: [
                        (primary: Grappled, partner: Grappling, only_if_new: true),
                    ],
                    death_policies: { Poisoned: Persist },
                    position_sync: [
                        (
                            condition: Grappled,
                            follow_source: true,
                            requires_source_condition: Some(Grappling),
                        ),
                    ],
                ),
            )"#,
        )
        .unwrap();

        let rules = RulesLoader::load(&path).unwrap();
        assert_eq!(
            rules.lifecycle.partner_of(ConditionKind::Grappling).map(|r| r.partner),
            Some(ConditionKind::Grappled)
        );
        assert_eq!(
            rules.lifecycle.death_policy(ConditionKind::Poisoned),
            DeathPolicy::Persist
        );
        assert_eq!(
            rules.lifecycle.death_policy(ConditionKind::Frightened),
            DeathPolicy::RemoveFromTargets
        );
        assert!(rules.incapacitated_allow_list.is_empty());
    }
}
