//! In-memory catalogs backing the engine's oracle traits.

use tactics_core::env::{ManeuverOracle, MapOracle, SpellOracle};
use tactics_core::env::MapPreset;
use tactics_core::maneuver::Maneuver;
use tactics_core::spell::Spell;

/// Maneuver definitions keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManeuverCatalog {
    pub maneuvers: Vec<Maneuver>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellCatalog {
    pub spells: Vec<Spell>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapCatalog {
    pub presets: Vec<MapPreset>,
}

impl ManeuverCatalog {
    pub fn len(&self) -> usize {
        self.maneuvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maneuvers.is_empty()
    }
}

impl SpellCatalog {
    /// Spells of one level, cantrips being level 0.
    pub fn of_level(&self, level: u8) -> impl Iterator<Item = &Spell> {
        self.spells.iter().filter(move |s| s.level == level)
    }
}

impl MapCatalog {
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.id.as_str())
    }
}

impl ManeuverOracle for ManeuverCatalog {
    fn maneuver(&self, id: &str) -> Option<&Maneuver> {
        self.maneuvers.maneuver(id)
    }

    fn all_maneuvers(&self) -> &[Maneuver] {
        &self.maneuvers
    }
}

impl SpellOracle for SpellCatalog {
    fn spell(&self, id: &str) -> Option<&Spell> {
        self.spells.spell(id)
    }

    fn all_spells(&self) -> &[Spell] {
        &self.spells
    }
}

impl MapOracle for MapCatalog {
    fn preset(&self, id: &str) -> Option<&MapPreset> {
        self.presets.preset(id)
    }
}
