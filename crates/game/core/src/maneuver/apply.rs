//! Spending superiority dice.

use std::collections::BTreeSet;

use tracing::debug;

use crate::combat::{LogEntry, LogKind, SavingThrow, grant_temporary_hp, roll_saving_throw};
use crate::config::RulesConfig;
use crate::env::{DiceRoller, ManeuverOracle};
use crate::features::has_relentless;
use crate::grid::{Grid, push_destination};
use crate::state::{
    Ability, ActiveCondition, Combatant, Condition, Position, with_condition,
};

use super::rules::{ManeuverError, can_use_maneuver, maneuver_save_dc, superiority_die_size};
use super::{Maneuver, ManeuverEffect, ManeuverTrigger, ids};

/// Read-only data maneuvers resolve against.
#[derive(Clone, Copy)]
pub struct ManeuverContext<'a> {
    pub catalog: &'a dyn ManeuverOracle,
    pub config: &'a RulesConfig,
    pub grid: &'a Grid,
    /// Cells held by other combatants; forced movement stops before them.
    pub occupied: &'a BTreeSet<Position>,
}

fn expect_trigger(maneuver: &Maneuver, expected: ManeuverTrigger) -> Result<(), ManeuverError> {
    if maneuver.trigger == expected {
        Ok(())
    } else {
        Err(ManeuverError::WrongTrigger {
            id: maneuver.id.clone(),
            expected,
            actual: maneuver.trigger,
        })
    }
}

/// Validates `id`, checks its trigger, and spends one die.
///
/// Returns the user with one fewer die, the maneuver and the rolled value.
fn spend_die<'c>(
    user: &Combatant,
    id: &str,
    expected: ManeuverTrigger,
    ctx: &ManeuverContext<'c>,
    dice: &mut impl DiceRoller,
) -> Result<(Combatant, &'c Maneuver, u32), ManeuverError> {
    let maneuver = can_use_maneuver(user, id, ctx.catalog)?;
    expect_trigger(maneuver, expected)?;

    let roll = dice.roll_die(superiority_die_size(user.level()));
    let mut next = user.clone();
    next.resources.superiority_dice_remaining -= 1;

    debug!(
        target: "tactics::maneuver",
        user = %user.id,
        maneuver = id,
        roll,
        dice_left = next.resources.superiority_dice_remaining,
        "superiority die spent"
    );
    Ok((next, maneuver, roll))
}

// ============================================================================
// On-hit maneuvers
// ============================================================================

/// Result of an on-hit maneuver (Trip Attack, Pushing Attack, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnHitManeuver {
    pub user: Combatant,
    pub target: Combatant,
    /// Superiority die added to the hit's damage.
    pub bonus_damage: u32,
    pub save: Option<SavingThrow>,
    /// True when the target failed its save and the effect landed.
    pub effect_applied: bool,
    pub log: Vec<LogEntry>,
}

/// Adds a superiority die to a hit and forces the maneuver's save.
///
/// The bonus damage applies regardless of the save; the condition or forced
/// movement only on a failure.
///
/// # Arguments
///
/// * `user` - The attacker that just hit
/// * `target` - The creature that was hit
/// * `id` - Catalog id of an `on_hit` maneuver
pub fn apply_on_hit_maneuver(
    user: &Combatant,
    target: &Combatant,
    id: &str,
    ctx: &ManeuverContext<'_>,
    dice: &mut impl DiceRoller,
) -> Result<OnHitManeuver, ManeuverError> {
    let (mut next_user, maneuver, bonus_damage) =
        spend_die(user, id, ManeuverTrigger::OnHit, ctx, dice)?;
    next_user.turn.used_maneuver_this_attack = true;

    let mut next_target = target.clone();
    let mut log = vec![LogEntry::new(
        LogKind::Maneuver,
        format!(
            "{} uses {} on {} (+{bonus_damage} damage)",
            user.name, maneuver.name, target.name
        ),
    )];

    let mut save = None;
    let mut effect_applied = false;
    if let Some(spec) = maneuver.saving_throw {
        let dc = maneuver_save_dc(user, ctx.config);
        let throw = roll_saving_throw(target, spec.ability, dc, dice);
        if throw.success {
            log.push(LogEntry::new(
                LogKind::Maneuver,
                format!(
                    "{} resists {} ({} vs DC {dc})",
                    target.name, maneuver.name, throw.total
                ),
            ));
        } else {
            effect_applied = true;
            match spec.effect {
                ManeuverEffect::Condition {
                    condition,
                    duration,
                } => {
                    next_target.conditions = with_condition(
                        &next_target.conditions,
                        ActiveCondition::new(condition, duration),
                    );
                    log.push(LogEntry::new(
                        LogKind::Condition,
                        format!("{} is {condition}", target.name),
                    ));
                }
                ManeuverEffect::Push { feet } => {
                    let destination = push_destination(
                        ctx.grid,
                        user.position,
                        target.position,
                        feet,
                        ctx.occupied,
                    );
                    next_target.position = destination;
                    log.push(LogEntry::new(
                        LogKind::Maneuver,
                        format!("{} is pushed to {destination}", target.name),
                    ));
                }
            }
        }
        save = Some(throw);
    }

    Ok(OnHitManeuver {
        user: next_user,
        target: next_target,
        bonus_damage,
        save,
        effect_applied,
        log,
    })
}

// ============================================================================
// Reactions
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParryOutcome {
    pub user: Combatant,
    /// Damage prevented, never more than the incoming damage.
    pub reduction: u32,
    pub remaining_damage: u32,
    pub log: Vec<LogEntry>,
}

/// Parry: reduce incoming melee damage by the die plus DEX modifier.
pub fn apply_parry(
    user: &Combatant,
    incoming_damage: u32,
    ctx: &ManeuverContext<'_>,
    dice: &mut impl DiceRoller,
) -> Result<ParryOutcome, ManeuverError> {
    let (mut next, _, roll) = spend_die(user, ids::PARRY, ManeuverTrigger::Reaction, ctx, dice)?;
    next.has_reacted = true;

    let dexterity = user.ability_modifier(Ability::Dexterity);
    let reduction =
        (i64::from(roll) + i64::from(dexterity)).clamp(0, i64::from(incoming_damage)) as u32;
    let remaining_damage = incoming_damage - reduction;

    Ok(ParryOutcome {
        log: vec![LogEntry::new(
            LogKind::Maneuver,
            format!("{} parries, reducing the damage by {reduction}", user.name),
        )],
        user: next,
        reduction,
        remaining_damage,
    })
}

/// Riposte: spend the reaction on a counterattack; returns the bonus damage.
pub fn apply_riposte(
    user: &Combatant,
    ctx: &ManeuverContext<'_>,
    dice: &mut impl DiceRoller,
) -> Result<(Combatant, u32), ManeuverError> {
    let (mut next, _, roll) = spend_die(user, ids::RIPOSTE, ManeuverTrigger::Reaction, ctx, dice)?;
    next.has_reacted = true;
    Ok((next, roll))
}

// ============================================================================
// Pre-attack and bonus-action maneuvers
// ============================================================================

/// Precision Attack: the die is added to the pending attack roll.
pub fn apply_precision_attack(
    user: &Combatant,
    ctx: &ManeuverContext<'_>,
    dice: &mut impl DiceRoller,
) -> Result<Combatant, ManeuverError> {
    let (mut next, _, roll) = spend_die(
        user,
        ids::PRECISION_ATTACK,
        ManeuverTrigger::PreAttack,
        ctx,
        dice,
    )?;
    next.turn.precision_bonus = roll;
    next.turn.used_maneuver_this_attack = true;
    Ok(next)
}

/// Evasive Footwork: AC bonus equal to the die until the start of the next turn.
pub fn apply_evasive_footwork(
    user: &Combatant,
    ctx: &ManeuverContext<'_>,
    dice: &mut impl DiceRoller,
) -> Result<Combatant, ManeuverError> {
    let (mut next, _, roll) = spend_die(
        user,
        ids::EVASIVE_FOOTWORK,
        ManeuverTrigger::BonusAction,
        ctx,
        dice,
    )?;
    next.turn.has_bonus_acted = true;
    next.evasive_ac_bonus = roll;
    next.conditions = with_condition(
        &next.conditions,
        ActiveCondition::for_turns(Condition::Evasive, 1),
    );
    Ok(next)
}

/// Feinting Attack: advantage and bonus damage on the next attack against an
/// adjacent target this turn.
pub fn apply_feinting_attack(
    user: &Combatant,
    target: &Combatant,
    ctx: &ManeuverContext<'_>,
    dice: &mut impl DiceRoller,
) -> Result<Combatant, ManeuverError> {
    if !user.position.is_adjacent(target.position) {
        return Err(ManeuverError::TargetOutOfReach);
    }
    let (mut next, _, roll) = spend_die(
        user,
        ids::FEINTING_ATTACK,
        ManeuverTrigger::BonusAction,
        ctx,
        dice,
    )?;
    next.turn.has_bonus_acted = true;
    next.turn.feint_target = Some(target.id);
    next.turn.feint_bonus = roll;
    Ok(next)
}

/// Lunging Attack: Dash, and the die is added to the next melee hit.
pub fn apply_lunging_attack(
    user: &Combatant,
    ctx: &ManeuverContext<'_>,
    dice: &mut impl DiceRoller,
) -> Result<Combatant, ManeuverError> {
    let (mut next, _, roll) = spend_die(
        user,
        ids::LUNGING_ATTACK,
        ManeuverTrigger::BonusAction,
        ctx,
        dice,
    )?;
    next.turn.has_bonus_acted = true;
    next.turn.dashed = true;
    next.turn.lunging_bonus = roll;
    Ok(next)
}

/// Rally: an ally gains temporary HP equal to the die plus the user's CHA
/// modifier (minimum 0).
pub fn apply_rally(
    user: &Combatant,
    ally: &Combatant,
    ctx: &ManeuverContext<'_>,
    dice: &mut impl DiceRoller,
) -> Result<(Combatant, Combatant), ManeuverError> {
    let (mut next, _, roll) = spend_die(user, ids::RALLY, ManeuverTrigger::BonusAction, ctx, dice)?;
    next.turn.has_bonus_acted = true;
    let amount = roll + user.ability_modifier(Ability::Charisma).max(0) as u32;
    Ok((next, grant_temporary_hp(ally, amount)))
}

// ============================================================================
// Relentless
// ============================================================================

/// True when Relentless should hand back a die at the start of the turn.
pub fn check_relentless(combatant: &Combatant) -> bool {
    has_relentless(combatant) && combatant.resources.superiority_dice_remaining == 0
}

/// Regains exactly one die when [`check_relentless`] holds.
#[must_use]
pub fn apply_relentless(combatant: &Combatant) -> Combatant {
    let mut next = combatant.clone();
    if check_relentless(combatant) {
        next.resources.superiority_dice_remaining = 1;
    }
    next
}
