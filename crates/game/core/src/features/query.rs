//! Pure queries over a combatant's active feature set.
//!
//! A feature is active when the combatant's level is at least the feature's
//! level. Nothing here is cached on the combatant: bonuses, dice and limits
//! are recomputed from the sheet on every call.

use crate::combat::AttackOption;
use crate::env::{Advantage, DiceExpr};
use crate::error::{RejectionKind, RuleError};
use crate::state::{Ability, Combatant, Weapon};

use super::kinds::{ClassFeature, FeatureKind, FightingStyle, UsageFeature};
use super::table::LevelTable;

/// Upper bound on uses of a feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaxUses {
    Limited(u32),
    Unlimited,
}

/// Reasons a feature cannot be used right now.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    #[error("{0} is not available at this level")]
    NotPresent(FeatureKind),
    #[error("bonus action already used this turn")]
    BonusActionUsed,
    #[error("reaction already used")]
    ReactionUsed,
    #[error("action already used this turn")]
    ActionUsed,
    #[error("{0} already used this turn")]
    AlreadyUsedThisTurn(FeatureKind),
    #[error("no uses of {0} remaining")]
    NoUsesRemaining(FeatureKind),
    #[error("sneak attack requires a finesse or ranged weapon")]
    WeaponNotEligible,
    #[error("sneak attack is impossible with disadvantage")]
    Disadvantage,
    #[error("sneak attack requires advantage or an ally within 5 ft of the target")]
    NoAdvantageOrAlly,
}

impl RuleError for FeatureError {
    fn kind(&self) -> RejectionKind {
        match self {
            Self::NotPresent(_) => RejectionKind::NotFound,
            Self::BonusActionUsed
            | Self::ReactionUsed
            | Self::ActionUsed
            | Self::AlreadyUsedThisTurn(_) => RejectionKind::ActionEconomy,
            Self::NoUsesRemaining(_) => RejectionKind::ResourceExhausted,
            Self::WeaponNotEligible | Self::Disadvantage | Self::NoAdvantageOrAlly => {
                RejectionKind::Precondition
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotPresent(_) => "feature_not_present",
            Self::BonusActionUsed => "bonus_action_used",
            Self::ReactionUsed => "reaction_used",
            Self::ActionUsed => "action_used",
            Self::AlreadyUsedThisTurn(_) => "feature_used_this_turn",
            Self::NoUsesRemaining(_) => "no_uses_remaining",
            Self::WeaponNotEligible => "weapon_not_eligible",
            Self::Disadvantage => "disadvantage",
            Self::NoAdvantageOrAlly => "no_advantage_or_ally",
        }
    }
}

// ============================================================================
// Feature lookup
// ============================================================================

/// Features whose level requirement the combatant meets, in declaration order.
pub fn active_features(combatant: &Combatant) -> impl Iterator<Item = &ClassFeature> {
    let level = combatant.level();
    combatant
        .features()
        .iter()
        .filter(move |f| f.is_active_at(level))
}

/// First active feature of the given kind.
pub fn find_feature(combatant: &Combatant, kind: FeatureKind) -> Option<&ClassFeature> {
    active_features(combatant).find(|f| f.kind() == kind)
}

pub fn has_feature(combatant: &Combatant, kind: FeatureKind) -> bool {
    find_feature(combatant, kind).is_some()
}

// ============================================================================
// Usage limits
// ============================================================================

/// Built-in scaling for features whose use count grows with level when the
/// catalog entry does not spell it out.
fn default_scaling(kind: FeatureKind) -> Option<LevelTable<u32>> {
    match kind {
        FeatureKind::SecondWind => Some(LevelTable::new([(1, 2), (4, 3), (10, 4)])),
        FeatureKind::ActionSurge => Some(LevelTable::new([(2, 1), (17, 2)])),
        FeatureKind::Indomitable => Some(LevelTable::new([(9, 1), (13, 2), (17, 3)])),
        _ => None,
    }
}

fn usage_max(kind: FeatureKind, usage: &UsageFeature, level: u32) -> MaxUses {
    if let Some(&count) = usage.max_uses_at_levels.at(level) {
        return MaxUses::Limited(count);
    }
    if let Some(count) = usage.max_uses {
        return MaxUses::Limited(count);
    }
    if usage.max_uses_at_levels.is_empty() {
        return default_scaling(kind)
            .and_then(|table| table.at(level).copied())
            .map_or(MaxUses::Unlimited, MaxUses::Limited);
    }
    MaxUses::Unlimited
}

/// Maximum uses of `feature` at `level`.
///
/// A level table wins when it has a threshold at or below `level`; otherwise
/// the flat `max_uses`. Second Wind, Action Surge and Indomitable with neither
/// fall back to their standard progression; anything else is unlimited.
pub fn get_max_uses(feature: &ClassFeature, level: u32) -> MaxUses {
    match feature {
        ClassFeature::SecondWind(usage)
        | ClassFeature::ActionSurge(usage)
        | ClassFeature::Indomitable(usage) => usage_max(feature.kind(), usage, level),
        ClassFeature::Generic(generic) => match generic.max_uses {
            Some(count) => MaxUses::Limited(count),
            None => MaxUses::Unlimited,
        },
        _ => MaxUses::Unlimited,
    }
}

/// Starting uses for every limited, active feature.
///
/// Limits come from [`get_max_uses`]; unlimited features get no entry.
pub fn initialize_class_feature_uses(
    combatant: &Combatant,
) -> std::collections::BTreeMap<String, u32> {
    let level = combatant.level();
    let mut uses = std::collections::BTreeMap::new();
    for feature in active_features(combatant) {
        if let MaxUses::Limited(count) = get_max_uses(feature, level) {
            uses.insert(feature.uses_key().to_string(), count);
        }
    }
    uses
}

/// Starting uses for racial abilities with a limit.
pub fn initialize_racial_ability_uses(
    combatant: &Combatant,
) -> std::collections::BTreeMap<crate::features::RacialAbilityKind, u32> {
    combatant
        .sheet()
        .map(|sheet| {
            sheet
                .racial_abilities
                .iter()
                .filter_map(|a| a.max_uses.map(|n| (a.kind, n)))
                .collect()
        })
        .unwrap_or_default()
}

fn has_uses_remaining(combatant: &Combatant, feature: &ClassFeature) -> bool {
    match combatant.feature_uses(feature.uses_key()) {
        Some(remaining) => remaining > 0,
        None => get_max_uses(feature, combatant.level()) == MaxUses::Unlimited,
    }
}

fn require(combatant: &Combatant, kind: FeatureKind) -> Result<&ClassFeature, FeatureError> {
    find_feature(combatant, kind).ok_or(FeatureError::NotPresent(kind))
}

// ============================================================================
// Usage guards
// ============================================================================

pub fn can_use_second_wind(combatant: &Combatant) -> Result<(), FeatureError> {
    let feature = require(combatant, FeatureKind::SecondWind)?;
    if combatant.turn.has_bonus_acted {
        return Err(FeatureError::BonusActionUsed);
    }
    if !has_uses_remaining(combatant, feature) {
        return Err(FeatureError::NoUsesRemaining(FeatureKind::SecondWind));
    }
    Ok(())
}

pub fn can_use_action_surge(combatant: &Combatant) -> Result<(), FeatureError> {
    let feature = require(combatant, FeatureKind::ActionSurge)?;
    if combatant.turn.used_action_surge_this_turn {
        return Err(FeatureError::AlreadyUsedThisTurn(FeatureKind::ActionSurge));
    }
    if !has_uses_remaining(combatant, feature) {
        return Err(FeatureError::NoUsesRemaining(FeatureKind::ActionSurge));
    }
    Ok(())
}

pub fn can_use_cunning_action(combatant: &Combatant) -> Result<(), FeatureError> {
    require(combatant, FeatureKind::CunningAction)?;
    if combatant.turn.has_bonus_acted {
        return Err(FeatureError::BonusActionUsed);
    }
    Ok(())
}

pub fn can_use_indomitable(combatant: &Combatant) -> Result<(), FeatureError> {
    let feature = require(combatant, FeatureKind::Indomitable)?;
    if !has_uses_remaining(combatant, feature) {
        return Err(FeatureError::NoUsesRemaining(FeatureKind::Indomitable));
    }
    Ok(())
}

// ============================================================================
// Attack modifiers
// ============================================================================

/// Attacks per Attack action: the best Extra Attack count (not the sum).
///
/// Monsters use their Multiattack count.
pub fn get_max_attacks(combatant: &Combatant) -> u32 {
    if let Some(stats) = combatant.stat_block() {
        return stats.multiattack.max(1);
    }
    active_features(combatant)
        .filter_map(ClassFeature::as_extra_attack)
        .map(|f| f.attack_count)
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Lowest natural d20 that crits: the best Improved Critical range, else 20.
pub fn get_critical_range(combatant: &Combatant) -> u32 {
    active_features(combatant)
        .filter_map(ClassFeature::as_improved_critical)
        .map(|f| f.critical_range)
        .min()
        .unwrap_or(20)
        .min(20)
}

pub fn is_critical_hit(combatant: &Combatant, natural_roll: u32) -> bool {
    natural_roll >= get_critical_range(combatant)
}

pub fn has_fighting_style(combatant: &Combatant, style: FightingStyle) -> bool {
    active_features(combatant).any(|f| f.as_fighting_style() == Some(style))
}

/// +2 to ranged attack rolls with Archery.
pub fn archery_bonus(combatant: &Combatant, weapon: &Weapon) -> i32 {
    if weapon.is_ranged() && has_fighting_style(combatant, FightingStyle::Archery) {
        2
    } else {
        0
    }
}

/// +2 damage with Dueling while wielding a one-handed melee weapon.
pub fn dueling_bonus(combatant: &Combatant, weapon: &Weapon) -> i32 {
    if weapon.is_melee()
        && !weapon.is_two_handed()
        && has_fighting_style(combatant, FightingStyle::Dueling)
    {
        2
    } else {
        0
    }
}

/// +1 AC with Defense, only while wearing armor.
pub fn defense_bonus(combatant: &Combatant) -> i32 {
    let armored = combatant.sheet().is_some_and(|s| s.armor.is_some());
    if armored && has_fighting_style(combatant, FightingStyle::Defense) {
        1
    } else {
        0
    }
}

/// Current armor class, derived from equipment and features.
pub fn armor_class(combatant: &Combatant) -> i32 {
    let evasive = combatant.evasive_ac_bonus as i32;
    match (combatant.sheet(), combatant.stat_block()) {
        (Some(sheet), _) => {
            let dex = sheet.abilities.modifier(Ability::Dexterity);
            let base = sheet
                .armor
                .as_ref()
                .map_or(10 + dex, |armor| armor.armor_class(dex));
            let shield = if sheet.shield { 2 } else { 0 };
            base + shield + defense_bonus(combatant) + evasive
        }
        (None, Some(stats)) => stats.armor_class + evasive,
        (None, None) => 10 + evasive,
    }
}

// ============================================================================
// Sneak Attack
// ============================================================================

/// Whether Sneak Attack applies to this attack.
///
/// Once per turn, finesse or ranged weapon, no disadvantage, and either
/// advantage or an ally adjacent to the target.
pub fn can_sneak_attack(
    combatant: &Combatant,
    attack: &AttackOption,
    advantage: Advantage,
    ally_adjacent_to_target: bool,
) -> Result<(), FeatureError> {
    require(combatant, FeatureKind::SneakAttack)?;
    if combatant.turn.used_sneak_attack_this_turn {
        return Err(FeatureError::AlreadyUsedThisTurn(FeatureKind::SneakAttack));
    }
    if !attack.is_finesse() && !attack.is_ranged() {
        return Err(FeatureError::WeaponNotEligible);
    }
    match advantage {
        Advantage::Disadvantage => Err(FeatureError::Disadvantage),
        Advantage::Advantage => Ok(()),
        Advantage::Normal if ally_adjacent_to_target => Ok(()),
        Advantage::Normal => Err(FeatureError::NoAdvantageOrAlly),
    }
}

/// Sneak Attack dice at the combatant's level (last threshold at or below it).
pub fn sneak_attack_dice(combatant: &Combatant) -> Option<DiceExpr> {
    let level = combatant.level();
    active_features(combatant)
        .find_map(ClassFeature::as_sneak_attack)
        .and_then(|f| f.dice_scaling.at(level).copied())
}

// ============================================================================
// Champion / Weapon Master flags
// ============================================================================

pub fn weapon_mastery_count(combatant: &Combatant) -> u32 {
    active_features(combatant)
        .filter_map(|f| match f {
            ClassFeature::WeaponMastery(m) => Some(m.mastery_count),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

pub fn has_tactical_master(combatant: &Combatant) -> bool {
    has_feature(combatant, FeatureKind::TacticalMaster)
}

pub fn has_studied_attacks(combatant: &Combatant) -> bool {
    has_feature(combatant, FeatureKind::StudiedAttacks)
}

pub fn has_heroic_warrior(combatant: &Combatant) -> bool {
    has_feature(combatant, FeatureKind::HeroicWarrior)
}

pub fn has_survivor(combatant: &Combatant) -> bool {
    has_feature(combatant, FeatureKind::Survivor)
}

pub fn has_remarkable_athlete(combatant: &Combatant) -> bool {
    has_feature(combatant, FeatureKind::RemarkableAthlete)
}

pub fn has_relentless(combatant: &Combatant) -> bool {
    has_feature(combatant, FeatureKind::Relentless)
}
