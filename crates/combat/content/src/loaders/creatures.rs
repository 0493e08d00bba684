//! Creature spec loader.

use std::path::Path;

use crate::catalog::CreatureSpec;
use crate::loaders::{LoadResult, parse_ron, read_file};

/// Loader for creature specs from RON files.
pub struct CreatureLoader;

impl CreatureLoader {
    /// Load creature specs from a RON file.
    ///
    /// RON format: `Vec<CreatureSpec>`; actions are referenced by id and
    /// resolved when the catalog is built.
    pub fn load(path: &Path) -> LoadResult<Vec<CreatureSpec>> {
        let content = read_file(path)?;
        parse_ron(&content, &path.display().to_string())
    }
}
