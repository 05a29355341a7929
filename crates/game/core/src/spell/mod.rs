//! Spell definitions, casting legality and spell resolution.

mod area;
mod resolve;
mod validate;

pub use area::{AoeOrigin, SpellTargetError, find_aoe_targets, is_in_area};
pub use resolve::{
    ProjectileHit, SpellAttack, SpellSaveOutcome, get_effective_damage_dice, resolve_projectiles,
    resolve_spell_attack, resolve_spell_save, spell_attack_bonus, spell_save_dc,
    spellcasting_modifier,
};
pub use validate::{
    CastError, SlotError, SlotUsage, SpellError, consume_spell_resources, prepare_cast,
    validate_spell_casting, validate_spell_slot,
};

use crate::env::DiceExpr;
use crate::features::LevelTable;
use crate::state::{Ability, DamageType};

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
pub enum SpellSchool {
    Abjuration,
    Conjuration,
    Divination,
    Enchantment,
    Evocation,
    Illusion,
    Necromancy,
    Transmutation,
}

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
pub enum CastingTime {
    Action,
    BonusAction,
    Reaction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpellRange {
    SelfOnly,
    Touch,
    Feet(u32),
}

impl SpellRange {
    /// Reach of the spell in feet (touch is 5).
    pub const fn feet(self) -> u32 {
        match self {
            Self::SelfOnly => 0,
            Self::Touch => 5,
            Self::Feet(feet) => feet,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellDamage {
    pub dice: DiceExpr,
    pub damage_type: DamageType,
    /// Cantrip upgrades by caster level.
    #[cfg_attr(feature = "serde", serde(default))]
    pub scaling: LevelTable<DiceExpr>,
    /// Die size used instead when the target is below its max HP.
    #[cfg_attr(feature = "serde", serde(default))]
    pub damaged_target_die: Option<u32>,
}

/// Area shapes; sizes in feet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AreaOfEffect {
    Sphere { radius: u32 },
    Cylinder { radius: u32 },
    Cube { size: u32 },
    /// Starts at the caster and runs toward the origin.
    Line { length: u32 },
    /// Starts at the caster; as wide as it is far.
    Cone { length: u32 },
}

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
pub enum SpellAttackType {
    Melee,
    Ranged,
}

/// A spell definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spell {
    pub id: String,
    pub name: String,
    /// 0 for cantrips.
    pub level: u8,
    pub school: SpellSchool,
    pub casting_time: CastingTime,
    pub range: SpellRange,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<SpellDamage>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub area_of_effect: Option<AreaOfEffect>,
    /// Number of independent missiles (Magic Missile, Scorching Ray).
    #[cfg_attr(feature = "serde", serde(default))]
    pub projectiles: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub saving_throw: Option<Ability>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack_type: Option<SpellAttackType>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub concentration: bool,
}

impl Spell {
    pub const fn is_cantrip(&self) -> bool {
        self.level == 0
    }
}
