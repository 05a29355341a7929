//! Weapons and armor carried by characters.

use bitflags::bitflags;

use crate::env::DiceExpr;

bitflags! {
    /// Weapon properties relevant to combat resolution.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WeaponProperties: u16 {
        const FINESSE    = 1 << 0;
        const LIGHT      = 1 << 1;
        const HEAVY      = 1 << 2;
        const TWO_HANDED = 1 << 3;
        const VERSATILE  = 1 << 4;
        const THROWN     = 1 << 5;
        const REACH      = 1 << 6;
        const AMMUNITION = 1 << 7;
        const LOADING    = 1 << 8;
    }
}

/// Damage types.
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
pub enum DamageType {
    Bludgeoning,
    Piercing,
    Slashing,
    Acid,
    Cold,
    Fire,
    Force,
    Lightning,
    Necrotic,
    Poison,
    Psychic,
    Radiant,
    Thunder,
}

/// Weapon mastery properties (one per weapon).
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
pub enum WeaponMastery {
    Cleave,
    Graze,
    Nick,
    Push,
    Sap,
    Slow,
    Topple,
    Vex,
}

/// Whether a weapon is swung or fired, and how far it reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeaponReach {
    /// Melee weapon with reach in feet (5, or 10 with the reach property).
    Melee { reach: u32 },
    /// Ranged weapon with normal and long range in feet.
    Ranged { normal: u32, long: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub name: String,
    pub damage: DiceExpr,
    pub damage_type: DamageType,
    pub reach: WeaponReach,
    pub properties: WeaponProperties,
    pub mastery: Option<WeaponMastery>,
}

impl Weapon {
    pub fn melee(name: impl Into<String>, damage: DiceExpr, damage_type: DamageType) -> Self {
        Self {
            name: name.into(),
            damage,
            damage_type,
            reach: WeaponReach::Melee { reach: 5 },
            properties: WeaponProperties::empty(),
            mastery: None,
        }
    }

    pub fn ranged(
        name: impl Into<String>,
        damage: DiceExpr,
        damage_type: DamageType,
        normal: u32,
        long: u32,
    ) -> Self {
        Self {
            name: name.into(),
            damage,
            damage_type,
            reach: WeaponReach::Ranged { normal, long },
            properties: WeaponProperties::AMMUNITION,
            mastery: None,
        }
    }

    pub fn with_properties(mut self, properties: WeaponProperties) -> Self {
        self.properties |= properties;
        if properties.contains(WeaponProperties::REACH)
            && let WeaponReach::Melee { reach } = &mut self.reach
        {
            *reach = 10;
        }
        self
    }

    pub fn with_mastery(mut self, mastery: WeaponMastery) -> Self {
        self.mastery = Some(mastery);
        self
    }

    pub const fn is_ranged(&self) -> bool {
        matches!(self.reach, WeaponReach::Ranged { .. })
    }

    pub const fn is_melee(&self) -> bool {
        matches!(self.reach, WeaponReach::Melee { .. })
    }

    pub fn is_finesse(&self) -> bool {
        self.properties.contains(WeaponProperties::FINESSE)
    }

    pub fn is_two_handed(&self) -> bool {
        self.properties.contains(WeaponProperties::TWO_HANDED)
    }
}

/// Armor weight class; decides how much DEX applies to AC.
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
pub enum ArmorCategory {
    Light,
    Medium,
    Heavy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Armor {
    pub name: String,
    pub base_ac: i32,
    pub category: ArmorCategory,
}

impl Armor {
    pub fn new(name: impl Into<String>, base_ac: i32, category: ArmorCategory) -> Self {
        Self {
            name: name.into(),
            base_ac,
            category,
        }
    }

    /// AC contributed by the armor for a given DEX modifier.
    pub fn armor_class(&self, dex_modifier: i32) -> i32 {
        match self.category {
            ArmorCategory::Light => self.base_ac + dex_modifier,
            ArmorCategory::Medium => self.base_ac + dex_modifier.min(2),
            ArmorCategory::Heavy => self.base_ac,
        }
    }
}
