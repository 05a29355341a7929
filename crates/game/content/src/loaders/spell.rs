//! Spell catalog loader.

use std::path::Path;

use crate::catalog::SpellCatalog;
use crate::loaders::{LoadResult, ensure_unique_ids, read_file};

/// Loader for spell definitions from RON files.
pub struct SpellLoader;

impl SpellLoader {
    /// Load the spell catalog from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a SpellCatalog
    pub fn load(path: &Path) -> LoadResult<SpellCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    /// Parse a catalog. Damage scaling tables are only meaningful on cantrips
    /// and are rejected elsewhere.
    pub fn parse(content: &str) -> LoadResult<SpellCatalog> {
        let catalog: SpellCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse spell catalog RON: {}", e))?;
        ensure_unique_ids("spell", catalog.spells.iter().map(|s| s.id.as_str()))?;

        for spell in &catalog.spells {
            let scales = spell
                .damage
                .as_ref()
                .is_some_and(|damage| !damage.scaling.is_empty());
            if scales && !spell.is_cantrip() {
                anyhow::bail!(
                    "Spell `{}` is level {} but has cantrip damage scaling",
                    spell.id,
                    spell.level
                );
            }
        }

        tracing::info!(count = catalog.spells.len(), "loaded spell catalog");
        Ok(catalog)
    }
}
