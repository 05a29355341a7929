//! Player-character and monster payloads carried by a combatant.

use arrayvec::ArrayVec;

use crate::env::DiceExpr;
use crate::features::{ClassFeature, RacialAbility};

use super::abilities::{Ability, AbilityScores};
use super::equipment::{Armor, DamageType, Weapon, WeaponReach};

/// Largest number of maneuvers any Battle Master can know.
pub const MAX_KNOWN_MANEUVERS: usize = 9;

/// Fully resolved character sheet supplied by the character builder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterSheet {
    pub class_name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub subclass: Option<String>,
    pub level: u32,
    pub abilities: AbilityScores,
    #[cfg_attr(feature = "serde", serde(default))]
    pub save_proficiencies: Vec<Ability>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub features: Vec<ClassFeature>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub racial_abilities: Vec<RacialAbility>,
    /// Wielded weapons; the first entry is the main hand.
    #[cfg_attr(feature = "serde", serde(default))]
    pub weapons: Vec<Weapon>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub armor: Option<Armor>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shield: bool,
    pub speed: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spellcasting_ability: Option<Ability>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub known_spells: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub known_maneuvers: ArrayVec<String, MAX_KNOWN_MANEUVERS>,
}

impl CharacterSheet {
    pub fn new(class_name: impl Into<String>, level: u32, abilities: AbilityScores) -> Self {
        Self {
            class_name: class_name.into(),
            subclass: None,
            level,
            abilities,
            save_proficiencies: Vec::new(),
            features: Vec::new(),
            racial_abilities: Vec::new(),
            weapons: Vec::new(),
            armor: None,
            shield: false,
            speed: 30,
            spellcasting_ability: None,
            known_spells: Vec::new(),
            known_maneuvers: ArrayVec::new(),
        }
    }

    pub fn main_hand(&self) -> Option<&Weapon> {
        self.weapons.first()
    }

    pub fn is_spellcaster(&self) -> bool {
        self.spellcasting_ability.is_some() || !self.known_spells.is_empty()
    }

    pub fn knows_maneuver(&self, id: &str) -> bool {
        self.known_maneuvers.iter().any(|known| known == id)
    }

    pub fn is_proficient_in_save(&self, ability: Ability) -> bool {
        self.save_proficiencies.contains(&ability)
    }
}

/// A natural or wielded attack of a monster stat block.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterAttack {
    pub name: String,
    pub attack_bonus: i32,
    pub damage: DiceExpr,
    pub damage_type: DamageType,
    pub reach: WeaponReach,
}

/// Monster stat block supplied by the bestiary.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterStatBlock {
    pub name: String,
    pub armor_class: i32,
    pub abilities: AbilityScores,
    pub proficiency_bonus: i32,
    pub speed: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attacks: Vec<MonsterAttack>,
    /// Explicit saving throw bonuses; unlisted abilities use the plain modifier.
    #[cfg_attr(feature = "serde", serde(default))]
    pub saving_throws: Vec<(Ability, i32)>,
    /// Number of attacks the Multiattack action makes (1 without Multiattack).
    #[cfg_attr(feature = "serde", serde(default = "default_multiattack"))]
    pub multiattack: u32,
}

#[cfg(feature = "serde")]
fn default_multiattack() -> u32 {
    1
}

impl MonsterStatBlock {
    pub fn new(name: impl Into<String>, armor_class: i32, abilities: AbilityScores) -> Self {
        Self {
            name: name.into(),
            armor_class,
            abilities,
            proficiency_bonus: 2,
            speed: 30,
            attacks: Vec::new(),
            saving_throws: Vec::new(),
            multiattack: 1,
        }
    }

    pub fn with_attack(mut self, attack: MonsterAttack) -> Self {
        self.attacks.push(attack);
        self
    }

    pub fn save_bonus(&self, ability: Ability) -> i32 {
        self.saving_throws
            .iter()
            .find(|(a, _)| *a == ability)
            .map(|(_, bonus)| *bonus)
            .unwrap_or_else(|| self.abilities.modifier(ability))
    }
}
