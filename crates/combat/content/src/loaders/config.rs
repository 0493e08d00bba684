//! Combat configuration loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing sections and keys fall back to their defaults.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing CombatConfig
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nmax_expansion_rounds = 3\n\n[scoring.movement]\nhazard_repulsion = 4.0").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.search.max_expansion_rounds, 3);
        assert_eq!(config.search.prune_ratio, 0.5);
        assert_eq!(config.scoring.movement.hazard_repulsion, 4.0);
        assert_eq!(config.scoring.movement.target_attraction, 1.0);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let error = ConfigLoader::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/config.toml"));
    }
}
