//! Map preset loader.
//!
//! Each RON file holds one preset. Presets are checked by building a grid from
//! them, so a loaded preset always produces a valid battle map.

use std::path::Path;

use tactics_core::env::MapPreset;
use tactics_core::grid::Grid;

use crate::catalog::MapCatalog;
use crate::loaders::{LoadResult, ensure_unique_ids, read_file};

/// Loader for battle map presets from RON files.
pub struct MapLoader;

impl MapLoader {
    /// Load one map preset from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a MapPreset
    pub fn load(path: &Path) -> LoadResult<MapPreset> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<MapPreset> {
        let preset: MapPreset = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON: {}", e))?;
        Grid::from_preset(&preset)?;
        Ok(preset)
    }

    /// Load every `.ron` preset in a directory, ordered by file name.
    pub fn load_dir(dir: &Path) -> LoadResult<MapCatalog> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                paths.push(path);
            }
        }
        paths.sort();

        let presets = paths
            .iter()
            .map(|path| Self::load(path))
            .collect::<LoadResult<Vec<_>>>()?;
        Self::catalog(presets)
    }

    pub(crate) fn catalog(presets: Vec<MapPreset>) -> LoadResult<MapCatalog> {
        ensure_unique_ids("map", presets.iter().map(|p| p.id.as_str()))?;
        tracing::info!(count = presets.len(), "loaded map presets");
        Ok(MapCatalog { presets })
    }
}
