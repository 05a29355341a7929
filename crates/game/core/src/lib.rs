//! Deterministic rules engine for grid-based tactical combat.
//!
//! `tactics-core` resolves attacks, damage, saving throws, class features,
//! maneuvers, spells and monster decisions as pure functions over plain
//! state. Callers own the encounter: every operation takes the combatants it
//! needs and returns updated copies together with [`combat::LogEntry`] lines.
//! Randomness enters only through a [`env::DiceRoller`], so the same script of
//! dice always produces the same outcome.
pub mod ai;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod features;
pub mod grid;
pub mod maneuver;
pub mod spell;
pub mod state;
pub mod turn;

#[cfg(test)]
mod testing;

pub use ai::{AiAction, AiContext, AiDecision, decide_monster_turn};
pub use combat::{
    AttackSituation, CombatOutcome, LogEntry, LogKind, calculate_damage_application,
    check_combat_end, is_dead, resolve_weapon_attack,
};
pub use config::{AiWeights, RulesConfig};
pub use env::{
    Advantage, DiceExpr, DiceRoller, MapOracle, MapPreset, ManeuverOracle, PcgDice, RandDice,
    ScriptedDice, SpellOracle,
};
pub use error::{RejectionKind, RuleError};
pub use features::{ClassFeature, FeatureKind, LevelTable};
pub use grid::{FogOfWar, Grid, GridError, Path};
pub use maneuver::{Maneuver, ManeuverError, ManeuverTrigger};
pub use spell::{Spell, SpellError};
pub use state::{
    Ability, AbilityScores, ActiveCondition, CharacterSheet, Combatant, CombatantId, Condition,
    MonsterStatBlock, Position,
};
pub use turn::{TurnStart, begin_turn, initiative_order};
