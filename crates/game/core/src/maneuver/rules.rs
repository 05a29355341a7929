//! Superiority dice scaling and maneuver eligibility.

use crate::config::RulesConfig;
use crate::env::ManeuverOracle;
use crate::error::{RejectionKind, RuleError};
use crate::features::{FeatureKind, has_feature, level_lookup};
use crate::state::{Ability, Combatant};

use super::{Maneuver, ManeuverTrigger};

const DIE_SIZE_BY_LEVEL: [(u32, u32); 3] = [(3, 8), (10, 10), (18, 12)];
const DICE_POOL_BY_LEVEL: [(u32, u32); 3] = [(3, 4), (7, 5), (15, 6)];
const KNOWN_COUNT_BY_LEVEL: [(u32, usize); 4] = [(3, 3), (7, 5), (10, 7), (15, 9)];

/// Faces on a superiority die at `level` (d8, d10 from 10th, d12 from 18th).
pub fn superiority_die_size(level: u32) -> u32 {
    level_lookup(&DIE_SIZE_BY_LEVEL, level).copied().unwrap_or(8)
}

/// Superiority dice regained on a rest.
pub fn max_superiority_dice(level: u32) -> u32 {
    level_lookup(&DICE_POOL_BY_LEVEL, level).copied().unwrap_or(0)
}

/// Number of maneuvers known at `level`.
pub fn maneuvers_known_count(level: u32) -> usize {
    level_lookup(&KNOWN_COUNT_BY_LEVEL, level).copied().unwrap_or(0)
}

/// Save DC against the maneuvers of `user`.
///
/// Characters use 8 + proficiency + the better of STR and DEX; monsters use
/// the configured flat DC.
pub fn maneuver_save_dc(user: &Combatant, config: &RulesConfig) -> i32 {
    if !user.is_character() {
        return config.monster_maneuver_dc;
    }
    let physical = user
        .ability_modifier(Ability::Strength)
        .max(user.ability_modifier(Ability::Dexterity));
    8 + user.proficiency_bonus() + physical
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ManeuverError {
    #[error("no Combat Superiority feature")]
    NoCombatSuperiority,
    #[error("no superiority dice remaining")]
    NoDiceRemaining,
    #[error("maneuver {0} is not known")]
    NotKnown(String),
    #[error("maneuver {0} not found")]
    NotFound(String),
    #[error("reaction already used")]
    ReactionUsed,
    #[error("bonus action already used this turn")]
    BonusActionUsed,
    #[error("a maneuver was already used on this attack")]
    AlreadyUsedThisAttack,
    #[error("maneuver {id} is a {actual} maneuver, not {expected}")]
    WrongTrigger {
        id: String,
        expected: ManeuverTrigger,
        actual: ManeuverTrigger,
    },
    #[error("target is not within 5 ft")]
    TargetOutOfReach,
}

impl RuleError for ManeuverError {
    fn kind(&self) -> RejectionKind {
        match self {
            Self::NoCombatSuperiority | Self::NotKnown(_) | Self::NotFound(_) => {
                RejectionKind::NotFound
            }
            Self::NoDiceRemaining => RejectionKind::ResourceExhausted,
            Self::ReactionUsed | Self::BonusActionUsed | Self::AlreadyUsedThisAttack => {
                RejectionKind::ActionEconomy
            }
            Self::WrongTrigger { .. } | Self::TargetOutOfReach => RejectionKind::Precondition,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoCombatSuperiority => "no_combat_superiority",
            Self::NoDiceRemaining => "no_superiority_dice",
            Self::NotKnown(_) => "maneuver_not_known",
            Self::NotFound(_) => "maneuver_not_found",
            Self::ReactionUsed => "reaction_used",
            Self::BonusActionUsed => "bonus_action_used",
            Self::AlreadyUsedThisAttack => "maneuver_used_this_attack",
            Self::WrongTrigger { .. } => "wrong_trigger",
            Self::TargetOutOfReach => "target_out_of_reach",
        }
    }
}

/// Whether `user` can spend a die on maneuver `id` right now.
///
/// Checks, in order: Combat Superiority, dice remaining, the maneuver being
/// known, the catalog entry, then the action-economy slot its trigger needs.
pub fn can_use_maneuver<'c>(
    user: &Combatant,
    id: &str,
    catalog: &'c (impl ManeuverOracle + ?Sized),
) -> Result<&'c Maneuver, ManeuverError> {
    if !has_feature(user, FeatureKind::CombatSuperiority) {
        return Err(ManeuverError::NoCombatSuperiority);
    }
    if user.resources.superiority_dice_remaining == 0 {
        return Err(ManeuverError::NoDiceRemaining);
    }
    if !user.sheet().is_some_and(|sheet| sheet.knows_maneuver(id)) {
        return Err(ManeuverError::NotKnown(id.to_string()));
    }
    let maneuver = catalog
        .maneuver(id)
        .ok_or_else(|| ManeuverError::NotFound(id.to_string()))?;

    match maneuver.trigger {
        ManeuverTrigger::Reaction if user.has_reacted => Err(ManeuverError::ReactionUsed),
        ManeuverTrigger::BonusAction if user.turn.has_bonus_acted => {
            Err(ManeuverError::BonusActionUsed)
        }
        ManeuverTrigger::OnHit | ManeuverTrigger::PreAttack
            if user.turn.used_maneuver_this_attack =>
        {
            Err(ManeuverError::AlreadyUsedThisAttack)
        }
        _ => Ok(maneuver),
    }
}
