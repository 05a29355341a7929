//! Standard catalogs compiled into the crate.

use tactics_core::RulesConfig;

use crate::catalog::{ManeuverCatalog, MapCatalog, SpellCatalog};
use crate::loaders::{ConfigLoader, LoadResult, ManeuverLoader, MapLoader, SpellLoader};

const MANEUVERS: &str = include_str!("../data/maneuvers.ron");
const SPELLS: &str = include_str!("../data/spells.ron");
const RULES: &str = include_str!("../data/rules.toml");
const MAPS: [&str; 3] = [
    include_str!("../data/maps/arena.ron"),
    include_str!("../data/maps/forest.ron"),
    include_str!("../data/maps/ruins.ron"),
];

pub fn standard_maneuvers() -> LoadResult<ManeuverCatalog> {
    ManeuverLoader::parse(MANEUVERS)
}

pub fn standard_spells() -> LoadResult<SpellCatalog> {
    SpellLoader::parse(SPELLS)
}

pub fn standard_maps() -> LoadResult<MapCatalog> {
    let presets = MAPS
        .iter()
        .map(|text| MapLoader::parse(text))
        .collect::<LoadResult<Vec<_>>>()?;
    MapLoader::catalog(presets)
}

pub fn standard_rules() -> LoadResult<RulesConfig> {
    ConfigLoader::parse(RULES)
}
