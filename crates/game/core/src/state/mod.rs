//! Combat state value types.
//!
//! Everything here is plain data owned by the caller. Rule modules read these
//! values and return new ones; nothing in the engine holds state between calls.
pub mod abilities;
pub mod character;
pub mod combatant;
pub mod common;
pub mod condition;
pub mod equipment;

pub use abilities::{Ability, AbilityScores, ability_modifier, proficiency_bonus};
pub use character::{CharacterSheet, MAX_KNOWN_MANEUVERS, MonsterAttack, MonsterStatBlock};
pub use combatant::{
    Combatant, CombatantPayload, DeathSaves, ResourcePools, SpellSlots, TurnFlags,
};
pub use common::{CombatantId, Position, ResourceMeter};
pub use condition::{
    ActiveCondition, Condition, ConditionDuration, with_condition, without_condition,
};
pub use equipment::{
    Armor, ArmorCategory, DamageType, Weapon, WeaponMastery, WeaponProperties, WeaponReach,
};
