//! Class and subclass features as a tagged union.
//!
//! Each variant carries the level at which it becomes active plus a narrow
//! payload. Consumers match on the variant they care about; adding a feature
//! kind means adding one arm where it matters, not touching every consumer.

use crate::env::DiceExpr;

use super::table::LevelTable;

/// Discriminator of [`ClassFeature`], also used as the key of usage pools.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FeatureKind {
    SecondWind,
    FightingStyle,
    SneakAttack,
    ActionSurge,
    CunningAction,
    ExtraAttack,
    ImprovedCritical,
    Indomitable,
    CombatSuperiority,
    Relentless,
    WeaponMastery,
    TacticalMaster,
    StudiedAttacks,
    HeroicWarrior,
    Survivor,
    RemarkableAthlete,
    Generic,
}

/// Fighting Style options.
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
pub enum FightingStyle {
    Archery,
    Defense,
    Dueling,
    GreatWeaponFighting,
    Protection,
    TwoWeaponFighting,
}

/// Feature with a limited number of uses that may scale with level.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsageFeature {
    pub level: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_uses: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_uses_at_levels: LevelTable<u32>,
}

/// Feature whose only data is the level it unlocks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelGate {
    pub level: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FightingStyleFeature {
    pub level: u32,
    pub style: FightingStyle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SneakAttackFeature {
    pub level: u32,
    pub dice_scaling: LevelTable<DiceExpr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtraAttackFeature {
    pub level: u32,
    /// Attacks per Attack action granted by this feature.
    pub attack_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImprovedCriticalFeature {
    pub level: u32,
    /// Lowest natural d20 that scores a critical hit.
    pub critical_range: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponMasteryFeature {
    pub level: u32,
    pub mastery_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenericFeature {
    pub level: u32,
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_uses: Option<u32>,
}

/// A class or subclass feature.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ClassFeature {
    SecondWind(UsageFeature),
    FightingStyle(FightingStyleFeature),
    SneakAttack(SneakAttackFeature),
    ActionSurge(UsageFeature),
    CunningAction(LevelGate),
    ExtraAttack(ExtraAttackFeature),
    ImprovedCritical(ImprovedCriticalFeature),
    Indomitable(UsageFeature),
    CombatSuperiority(LevelGate),
    Relentless(LevelGate),
    WeaponMastery(WeaponMasteryFeature),
    TacticalMaster(LevelGate),
    StudiedAttacks(LevelGate),
    HeroicWarrior(LevelGate),
    Survivor(LevelGate),
    RemarkableAthlete(LevelGate),
    Generic(GenericFeature),
}

impl ClassFeature {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::SecondWind(_) => FeatureKind::SecondWind,
            Self::FightingStyle(_) => FeatureKind::FightingStyle,
            Self::SneakAttack(_) => FeatureKind::SneakAttack,
            Self::ActionSurge(_) => FeatureKind::ActionSurge,
            Self::CunningAction(_) => FeatureKind::CunningAction,
            Self::ExtraAttack(_) => FeatureKind::ExtraAttack,
            Self::ImprovedCritical(_) => FeatureKind::ImprovedCritical,
            Self::Indomitable(_) => FeatureKind::Indomitable,
            Self::CombatSuperiority(_) => FeatureKind::CombatSuperiority,
            Self::Relentless(_) => FeatureKind::Relentless,
            Self::WeaponMastery(_) => FeatureKind::WeaponMastery,
            Self::TacticalMaster(_) => FeatureKind::TacticalMaster,
            Self::StudiedAttacks(_) => FeatureKind::StudiedAttacks,
            Self::HeroicWarrior(_) => FeatureKind::HeroicWarrior,
            Self::Survivor(_) => FeatureKind::Survivor,
            Self::RemarkableAthlete(_) => FeatureKind::RemarkableAthlete,
            Self::Generic(_) => FeatureKind::Generic,
        }
    }

    /// Earliest character level at which the feature applies.
    pub fn level(&self) -> u32 {
        match self {
            Self::SecondWind(f) | Self::ActionSurge(f) | Self::Indomitable(f) => f.level,
            Self::FightingStyle(f) => f.level,
            Self::SneakAttack(f) => f.level,
            Self::ExtraAttack(f) => f.level,
            Self::ImprovedCritical(f) => f.level,
            Self::WeaponMastery(f) => f.level,
            Self::Generic(f) => f.level,
            Self::CunningAction(g)
            | Self::CombatSuperiority(g)
            | Self::Relentless(g)
            | Self::TacticalMaster(g)
            | Self::StudiedAttacks(g)
            | Self::HeroicWarrior(g)
            | Self::Survivor(g)
            | Self::RemarkableAthlete(g) => g.level,
        }
    }

    /// Key under which the feature's remaining uses are tracked.
    pub fn uses_key(&self) -> &str {
        match self {
            Self::Generic(f) => &f.id,
            other => {
                let key: &'static str = other.kind().into();
                key
            }
        }
    }

    pub fn is_active_at(&self, level: u32) -> bool {
        level >= self.level()
    }

    pub fn as_usage(&self) -> Option<&UsageFeature> {
        match self {
            Self::SecondWind(f) | Self::ActionSurge(f) | Self::Indomitable(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_fighting_style(&self) -> Option<FightingStyle> {
        match self {
            Self::FightingStyle(f) => Some(f.style),
            _ => None,
        }
    }

    pub fn as_sneak_attack(&self) -> Option<&SneakAttackFeature> {
        match self {
            Self::SneakAttack(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_extra_attack(&self) -> Option<&ExtraAttackFeature> {
        match self {
            Self::ExtraAttack(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_improved_critical(&self) -> Option<&ImprovedCriticalFeature> {
        match self {
            Self::ImprovedCritical(f) => Some(f),
            _ => None,
        }
    }
}

/// Racial abilities tracked by the engine.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RacialAbilityKind {
    /// Drop to 1 HP instead of 0 once per long rest.
    RelentlessEndurance,
    /// Bonus-action healing once per long rest.
    HealingHands,
    /// Breath weapon area attack.
    BreathWeapon,
    /// Reroll natural 1s on d20 tests.
    Lucky,
    Other,
}

impl RacialAbilityKind {
    /// True for abilities that leave the creature at 1 HP instead of 0.
    pub const fn prevents_knockout(self) -> bool {
        matches!(self, Self::RelentlessEndurance)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RacialAbility {
    pub kind: RacialAbilityKind,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_uses: Option<u32>,
}

impl RacialAbility {
    pub fn new(kind: RacialAbilityKind, max_uses: Option<u32>) -> Self {
        Self {
            kind,
            name: kind.to_string(),
            max_uses,
        }
    }
}
