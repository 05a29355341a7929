//! Read-only catalogs of static rules content.
//!
//! The engine never owns catalog data; it asks an oracle by id. Slices and
//! vectors of definitions are oracles themselves, which keeps tests free of
//! loader plumbing.

use crate::maneuver::Maneuver;
use crate::spell::Spell;

use super::map::MapPreset;

/// Maneuver definitions by id.
pub trait ManeuverOracle {
    fn maneuver(&self, id: &str) -> Option<&Maneuver>;

    fn all_maneuvers(&self) -> &[Maneuver];
}

/// Spell definitions by id.
pub trait SpellOracle {
    fn spell(&self, id: &str) -> Option<&Spell>;

    fn all_spells(&self) -> &[Spell];
}

/// Battle map presets by id.
pub trait MapOracle {
    fn preset(&self, id: &str) -> Option<&MapPreset>;
}

impl ManeuverOracle for [Maneuver] {
    fn maneuver(&self, id: &str) -> Option<&Maneuver> {
        self.iter().find(|m| m.id == id)
    }

    fn all_maneuvers(&self) -> &[Maneuver] {
        self
    }
}

impl ManeuverOracle for Vec<Maneuver> {
    fn maneuver(&self, id: &str) -> Option<&Maneuver> {
        self.as_slice().maneuver(id)
    }

    fn all_maneuvers(&self) -> &[Maneuver] {
        self
    }
}

impl SpellOracle for [Spell] {
    fn spell(&self, id: &str) -> Option<&Spell> {
        self.iter().find(|s| s.id == id)
    }

    fn all_spells(&self) -> &[Spell] {
        self
    }
}

impl SpellOracle for Vec<Spell> {
    fn spell(&self, id: &str) -> Option<&Spell> {
        self.as_slice().spell(id)
    }

    fn all_spells(&self) -> &[Spell] {
        self
    }
}

impl MapOracle for [MapPreset] {
    fn preset(&self, id: &str) -> Option<&MapPreset> {
        self.iter().find(|p| p.id == id)
    }
}

impl MapOracle for Vec<MapPreset> {
    fn preset(&self, id: &str) -> Option<&MapPreset> {
        self.as_slice().preset(id)
    }
}
