//! Content loaders for reading rules data from files.
//!
//! Every loader offers `load` for a path and `parse` for text already in
//! memory; the bundled catalogs go through `parse`.

pub mod config;
pub mod maneuver;
pub mod map;
pub mod spell;

pub use config::ConfigLoader;
pub use maneuver::ManeuverLoader;
pub use map::MapLoader;
pub use spell::SpellLoader;

use std::collections::BTreeSet;
use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Fails on the first id that appears twice.
pub(crate) fn ensure_unique_ids<'a>(
    what: &str,
    ids: impl IntoIterator<Item = &'a str>,
) -> LoadResult<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            anyhow::bail!("Duplicate {} id `{}`", what, id);
        }
    }
    Ok(())
}
