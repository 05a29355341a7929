//! Maneuver catalog loader.

use std::path::Path;

use crate::catalog::ManeuverCatalog;
use crate::loaders::{LoadResult, ensure_unique_ids, read_file};

/// Loader for maneuver definitions from RON files.
pub struct ManeuverLoader;

impl ManeuverLoader {
    /// Load the maneuver catalog from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a ManeuverCatalog
    pub fn load(path: &Path) -> LoadResult<ManeuverCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<ManeuverCatalog> {
        let catalog: ManeuverCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse maneuver catalog RON: {}", e))?;
        ensure_unique_ids("maneuver", catalog.maneuvers.iter().map(|m| m.id.as_str()))?;

        tracing::info!(count = catalog.maneuvers.len(), "loaded maneuver catalog");
        Ok(catalog)
    }
}
