//! Static rules content and loaders.
//!
//! This crate ships the standard catalogs the engine reads through its oracle
//! traits and the loaders that build them from files:
//! - Maneuver definitions (RON)
//! - Spell definitions (RON)
//! - Battle map presets (RON)
//! - Rules configuration (TOML)
//!
//! Catalogs are read-only inputs; nothing here appears in combat state.

pub mod catalog;

#[cfg(feature = "loaders")]
pub mod bundled;
#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{ManeuverCatalog, MapCatalog, SpellCatalog};

#[cfg(feature = "loaders")]
pub use bundled::{standard_maneuvers, standard_maps, standard_rules, standard_spells};
#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult, ManeuverLoader, MapLoader, SpellLoader};
