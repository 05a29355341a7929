//! Everything the rules read but never own.
//!
//! Dice are the only source of nondeterminism and sit behind [`DiceRoller`] so
//! tests can script every face. Catalog oracles expose static content
//! (maneuvers, spells, map presets) by id.
mod catalog;
mod dice;
mod map;

pub use catalog::{ManeuverOracle, MapOracle, SpellOracle};
pub use dice::{
    Advantage, D20Roll, DiceExpr, DiceParseError, DiceRoll, DiceRoller, PcgDice, RandDice,
    ScriptedDice,
};
pub use map::{ElevationSpec, MapDimensions, MapPreset, ObstacleSpec, StairSpec, TerrainSpec};
