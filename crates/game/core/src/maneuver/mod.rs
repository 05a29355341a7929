//! Battle Master maneuvers and the superiority-dice economy.
//!
//! Maneuver definitions are static catalog data ([`Maneuver`]); [`rules`]
//! decides whether one can be used and [`apply`] spends the die and resolves
//! its effect.

mod apply;
mod rules;

pub use apply::{
    ManeuverContext, OnHitManeuver, ParryOutcome, apply_evasive_footwork, apply_feinting_attack,
    apply_lunging_attack, apply_on_hit_maneuver, apply_parry, apply_precision_attack, apply_rally,
    apply_relentless, apply_riposte, check_relentless,
};
pub use rules::{
    ManeuverError, can_use_maneuver, maneuver_save_dc, maneuvers_known_count,
    max_superiority_dice, superiority_die_size,
};

use crate::state::{Ability, Condition, ConditionDuration};

/// Maneuver ids the engine resolves with dedicated rules.
pub mod ids {
    pub const PARRY: &str = "parry";
    pub const RIPOSTE: &str = "riposte";
    pub const PRECISION_ATTACK: &str = "precision_attack";
    pub const EVASIVE_FOOTWORK: &str = "evasive_footwork";
    pub const FEINTING_ATTACK: &str = "feinting_attack";
    pub const LUNGING_ATTACK: &str = "lunging_attack";
    pub const RALLY: &str = "rally";
}

/// When a maneuver can be declared.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ManeuverTrigger {
    OnHit,
    PreAttack,
    Reaction,
    BonusAction,
}

/// What a failed save against a maneuver does to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ManeuverEffect {
    Condition {
        condition: Condition,
        duration: ConditionDuration,
    },
    /// Shove the target straight away from the attacker.
    Push { feet: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManeuverSave {
    pub ability: Ability,
    pub effect: ManeuverEffect,
}

/// A maneuver definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Maneuver {
    pub id: String,
    pub name: String,
    pub trigger: ManeuverTrigger,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub saving_throw: Option<ManeuverSave>,
}
