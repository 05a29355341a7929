//! Weapon and natural attacks.

use tracing::debug;

use crate::env::{Advantage, D20Roll, DiceExpr, DiceRoller};
use crate::error::{RejectionKind, RuleError};
use crate::features::{
    archery_bonus, armor_class, can_sneak_attack, dueling_bonus, get_critical_range,
    get_max_attacks, sneak_attack_dice,
};
use crate::grid::{
    FogOfWar, Grid, can_target_with_ranged_attack, diagonal_rule_distance, distance_feet,
    has_line_of_sight,
};
use crate::state::{
    Ability, CharacterSheet, Combatant, CombatantId, Condition, DamageType, Position, Weapon,
    WeaponMastery, WeaponProperties, WeaponReach,
};

use super::damage::is_dead;
use super::log::{LogEntry, LogKind};

/// One attack a combatant can make, with its bonuses already folded in.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackOption {
    pub name: String,
    pub reach: WeaponReach,
    /// Total to-hit bonus before situational modifiers.
    pub attack_bonus: i32,
    /// Damage dice with the ability modifier and static bonuses as modifier.
    pub damage: DiceExpr,
    pub damage_type: DamageType,
    pub properties: WeaponProperties,
    pub mastery: Option<WeaponMastery>,
}

impl AttackOption {
    pub const fn is_ranged(&self) -> bool {
        matches!(self.reach, WeaponReach::Ranged { .. })
    }

    pub const fn is_melee(&self) -> bool {
        matches!(self.reach, WeaponReach::Melee { .. })
    }

    pub fn is_finesse(&self) -> bool {
        self.properties.contains(WeaponProperties::FINESSE)
    }

    /// Melee reach, or normal range for ranged attacks, in feet.
    pub const fn effective_range(&self) -> u32 {
        match self.reach {
            WeaponReach::Melee { reach } => reach,
            WeaponReach::Ranged { normal, .. } => normal,
        }
    }
}

fn weapon_ability(sheet: &CharacterSheet, weapon: &Weapon) -> Ability {
    let strength = sheet.abilities.modifier(Ability::Strength);
    let dexterity = sheet.abilities.modifier(Ability::Dexterity);
    if weapon.is_ranged() || (weapon.is_finesse() && dexterity > strength) {
        Ability::Dexterity
    } else {
        Ability::Strength
    }
}

fn weapon_attack(combatant: &Combatant, sheet: &CharacterSheet, weapon: &Weapon) -> AttackOption {
    let modifier = sheet.abilities.modifier(weapon_ability(sheet, weapon));
    AttackOption {
        name: weapon.name.clone(),
        reach: weapon.reach,
        attack_bonus: combatant.proficiency_bonus() + modifier + archery_bonus(combatant, weapon),
        damage: weapon
            .damage
            .with_modifier(weapon.damage.modifier + modifier + dueling_bonus(combatant, weapon)),
        damage_type: weapon.damage_type,
        properties: weapon.properties,
        mastery: weapon.mastery,
    }
}

fn unarmed_strike(combatant: &Combatant) -> AttackOption {
    let strength = combatant.ability_modifier(Ability::Strength);
    AttackOption {
        name: "Unarmed Strike".into(),
        reach: WeaponReach::Melee { reach: 5 },
        attack_bonus: combatant.proficiency_bonus() + strength,
        damage: DiceExpr::new(0, 1).with_modifier(1 + strength),
        damage_type: DamageType::Bludgeoning,
        properties: WeaponProperties::empty(),
        mastery: None,
    }
}

/// Attacks the combatant can choose from, in equipment order.
///
/// A character without weapons still has an unarmed strike.
pub fn available_attacks(combatant: &Combatant) -> Vec<AttackOption> {
    if let Some(stats) = combatant.stat_block() {
        return stats
            .attacks
            .iter()
            .map(|attack| AttackOption {
                name: attack.name.clone(),
                reach: attack.reach,
                attack_bonus: attack.attack_bonus,
                damage: attack.damage,
                damage_type: attack.damage_type,
                properties: WeaponProperties::empty(),
                mastery: None,
            })
            .collect();
    }
    let Some(sheet) = combatant.sheet() else {
        return Vec::new();
    };
    if sheet.weapons.is_empty() {
        return vec![unarmed_strike(combatant)];
    }
    sheet
        .weapons
        .iter()
        .map(|weapon| weapon_attack(combatant, sheet, weapon))
        .collect()
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttackError {
    #[error("action already used this turn")]
    ActionUsed,
    #[error("no attacks remaining this turn ({made} of {max} made)")]
    NoAttacksRemaining { made: u32, max: u32 },
    #[error("{0} cannot act")]
    Incapacitated(CombatantId),
    #[error("target {0} is already dead")]
    TargetDead(CombatantId),
    #[error("target is {distance} ft away but reach is {reach} ft")]
    OutOfReach { distance: u32, reach: u32 },
    #[error("target is {distance} ft away but range is {range} ft")]
    OutOfRange { distance: u32, range: u32 },
    #[error("line of sight blocked at {0}")]
    NoLineOfSight(Position),
}

impl RuleError for AttackError {
    fn kind(&self) -> RejectionKind {
        match self {
            Self::ActionUsed | Self::NoAttacksRemaining { .. } => RejectionKind::ActionEconomy,
            Self::Incapacitated(_)
            | Self::TargetDead(_)
            | Self::OutOfReach { .. }
            | Self::OutOfRange { .. }
            | Self::NoLineOfSight(_) => RejectionKind::Precondition,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActionUsed => "action_used",
            Self::NoAttacksRemaining { .. } => "no_attacks_remaining",
            Self::Incapacitated(_) => "incapacitated",
            Self::TargetDead(_) => "target_dead",
            Self::OutOfReach { .. } => "out_of_reach",
            Self::OutOfRange { .. } => "out_of_range",
            Self::NoLineOfSight(_) => "no_line_of_sight",
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// The battlefield an attack happens on.
#[derive(Clone, Copy, Debug)]
pub struct AttackSituation<'a> {
    pub grid: &'a Grid,
    pub fog: Option<&'a FogOfWar>,
    /// Every combatant in the encounter, used to find allies next to the target.
    pub combatants: &'a [Combatant],
}

/// Outcome of a single d20 attack roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRoll {
    pub natural: u32,
    pub total: i32,
    pub target_ac: i32,
    pub advantage: Advantage,
    pub hit: bool,
    pub critical: bool,
}

/// Natural 1 always misses; a natural roll at or above `critical_range` always
/// hits and crits; anything else hits when the total meets the AC.
pub fn resolve_attack_roll(
    d20: D20Roll,
    bonus: i32,
    target_ac: i32,
    critical_range: u32,
    advantage: Advantage,
) -> AttackRoll {
    let total = d20.natural as i32 + bonus;
    let (hit, critical) = match d20.natural {
        1 => (false, false),
        n if n >= critical_range => (true, true),
        _ => (total >= target_ac, false),
    };
    AttackRoll {
        natural: d20.natural,
        total,
        target_ac,
        advantage,
        hit,
        critical,
    }
}

/// Advantage state of `attacker` attacking `target` with `attack`.
pub fn attack_advantage(attacker: &Combatant, target: &Combatant, attack: &AttackOption) -> Advantage {
    let adjacent = attacker.position.is_adjacent(target.position);
    let long_range = match attack.reach {
        WeaponReach::Ranged { normal, .. } => {
            diagonal_rule_distance(attacker.position, target.position) > normal
        }
        WeaponReach::Melee { .. } => false,
    };

    let advantage = attacker.turn.feint_target == Some(target.id)
        || attacker.has_condition(Condition::Invisible)
        || target.has_condition(Condition::Vexed)
        || [
            Condition::Blinded,
            Condition::Paralyzed,
            Condition::Restrained,
            Condition::Stunned,
            Condition::Unconscious,
        ]
        .into_iter()
        .any(|c| target.has_condition(c))
        || (adjacent && target.has_condition(Condition::Prone));

    let disadvantage = [
        Condition::Blinded,
        Condition::Frightened,
        Condition::Poisoned,
        Condition::Prone,
        Condition::Restrained,
        Condition::Sapped,
    ]
    .into_iter()
    .any(|c| attacker.has_condition(c))
        || target.has_condition(Condition::Dodging)
        || (!adjacent && target.has_condition(Condition::Prone))
        || long_range;

    Advantage::combine(advantage, disadvantage)
}

/// Checks reach, range and line of sight without rolling anything.
pub fn check_attack_reach(
    situation: &AttackSituation<'_>,
    attacker: &Combatant,
    target: &Combatant,
    attack: &AttackOption,
) -> Result<(), AttackError> {
    match attack.reach {
        WeaponReach::Melee { reach } => {
            let distance = distance_feet(attacker.position, target.position);
            if distance > reach {
                return Err(AttackError::OutOfReach { distance, reach });
            }
            if !has_line_of_sight(situation.grid, attacker.position, target.position, situation.fog) {
                return Err(AttackError::NoLineOfSight(target.position));
            }
            Ok(())
        }
        WeaponReach::Ranged { long, .. } => {
            let targeting = can_target_with_ranged_attack(
                situation.grid,
                attacker.position,
                target.position,
                long,
                situation.fog,
            );
            match (targeting.can_target, targeting.blocked_by) {
                (true, _) => Ok(()),
                (false, Some(blocked)) => Err(AttackError::NoLineOfSight(blocked)),
                (false, None) => Err(AttackError::OutOfRange {
                    distance: diagonal_rule_distance(attacker.position, target.position),
                    range: long,
                }),
            }
        }
    }
}

/// Whether `attacker` may make another attack against `target` right now.
pub fn can_attack(
    situation: &AttackSituation<'_>,
    attacker: &Combatant,
    target: &Combatant,
    attack: &AttackOption,
) -> Result<(), AttackError> {
    if is_dead(attacker) || attacker.conditions.iter().any(|c| c.condition.is_incapacitating()) {
        return Err(AttackError::Incapacitated(attacker.id));
    }
    if is_dead(target) {
        return Err(AttackError::TargetDead(target.id));
    }
    let max = get_max_attacks(attacker);
    let made = attacker.turn.attacks_made_this_turn;
    if attacker.turn.has_acted && made == 0 {
        return Err(AttackError::ActionUsed);
    }
    if made >= max {
        return Err(AttackError::NoAttacksRemaining { made, max });
    }
    check_attack_reach(situation, attacker, target, attack)
}

fn ally_adjacent_to(situation: &AttackSituation<'_>, attacker: &Combatant, target: &Combatant) -> bool {
    situation.combatants.iter().any(|c| {
        c.id != attacker.id
            && c.id != target.id
            && !c.is_enemy_of(attacker)
            && !is_dead(c)
            && !c.conditions.iter().any(|a| a.condition.is_incapacitating())
            && c.position.is_adjacent(target.position)
    })
}

/// A resolved attack: the attacker's updated turn state plus the damage
/// dealt. Damage is not applied to the target here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeaponAttack {
    pub attacker: Combatant,
    pub roll: AttackRoll,
    /// Total damage including Sneak Attack and pending maneuver bonuses.
    pub damage: u32,
    pub sneak_attack_damage: u32,
    pub damage_type: DamageType,
    pub log: Vec<LogEntry>,
}

/// Makes one attack.
///
/// Gates on action economy, reach or range, and line of sight, then rolls to
/// hit with Archery, Precision Attack and advantage folded in. On a hit the
/// damage dice double on a critical, and Sneak Attack is added once per turn
/// when it applies.
pub fn resolve_weapon_attack(
    situation: &AttackSituation<'_>,
    attacker: &Combatant,
    target: &Combatant,
    attack: &AttackOption,
    dice: &mut impl DiceRoller,
) -> Result<WeaponAttack, AttackError> {
    can_attack(situation, attacker, target, attack)?;

    let advantage = attack_advantage(attacker, target, attack);
    let d20 = dice.roll_d20_with(advantage);
    let bonus = attack.attack_bonus + attacker.turn.precision_bonus as i32;
    let roll = resolve_attack_roll(
        d20,
        bonus,
        armor_class(target),
        get_critical_range(attacker),
        advantage,
    );

    let mut next = attacker.clone();
    next.turn.has_acted = true;
    next.turn.attacks_made_this_turn += 1;
    next.turn.precision_bonus = 0;
    next.turn.used_maneuver_this_attack = false;

    let mut log = Vec::new();
    let mut damage = 0;
    let mut sneak_attack_damage = 0;

    if roll.hit {
        let dice_expr = if roll.critical {
            attack.damage.doubled()
        } else {
            attack.damage
        };
        damage = dice.roll(&dice_expr).total;

        if attack.is_melee() {
            damage += next.turn.lunging_bonus;
            next.turn.lunging_bonus = 0;
        }
        if next.turn.feint_target == Some(target.id) {
            damage += next.turn.feint_bonus;
        }

        let ally = ally_adjacent_to(situation, attacker, target);
        if can_sneak_attack(attacker, attack, advantage, ally).is_ok()
            && let Some(sneak) = sneak_attack_dice(attacker)
        {
            let sneak = if roll.critical { sneak.doubled() } else { sneak };
            sneak_attack_damage = dice.roll(&sneak).total;
            damage += sneak_attack_damage;
            next.turn.used_sneak_attack_this_turn = true;
        }

        let verdict = if roll.critical { "critically hits" } else { "hits" };
        log.push(LogEntry::new(
            LogKind::Attack,
            format!(
                "{} {verdict} {} with {} ({} vs AC {}) for {damage} {} damage",
                attacker.name, target.name, attack.name, roll.total, roll.target_ac, attack.damage_type
            ),
        ));
    } else {
        log.push(LogEntry::new(
            LogKind::Attack,
            format!(
                "{} misses {} with {} ({} vs AC {})",
                attacker.name, target.name, attack.name, roll.total, roll.target_ac
            ),
        ));
    }

    if next.turn.feint_target == Some(target.id) {
        next.turn.feint_target = None;
        next.turn.feint_bonus = 0;
    }

    debug!(
        target: "tactics::attack",
        attacker = %attacker.id,
        defender = %target.id,
        natural = roll.natural,
        total = roll.total,
        hit = roll.hit,
        critical = roll.critical,
        damage,
        "weapon attack resolved"
    );

    Ok(WeaponAttack {
        attacker: next,
        roll,
        damage,
        sneak_attack_damage,
        damage_type: attack.damage_type,
        log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedDice;
    use crate::testing::{champion, fighter, goblin, open_grid, rogue};

    fn situation<'a>(grid: &'a Grid, combatants: &'a [Combatant]) -> AttackSituation<'a> {
        AttackSituation {
            grid,
            fog: None,
            combatants,
        }
    }

    #[test]
    fn character_attacks_fold_in_modifiers() {
        let attacks = available_attacks(&fighter(1));
        let longsword = &attacks[0];
        assert_eq!(longsword.attack_bonus, 2 + 3);
        assert_eq!(longsword.damage, DiceExpr::new(1, 8).with_modifier(3));
    }

    #[test]
    fn finesse_uses_the_better_ability() {
        let attacks = available_attacks(&rogue(1));
        assert_eq!(attacks[0].attack_bonus, 2 + 3);
        assert!(attacks[0].is_finesse());
    }

    #[test]
    fn natural_one_misses_and_natural_twenty_crits() {
        let miss = resolve_attack_roll(
            D20Roll { natural: 1, discarded: None },
            50,
            10,
            20,
            Advantage::Normal,
        );
        assert!(!miss.hit);

        let crit = resolve_attack_roll(
            D20Roll { natural: 20, discarded: None },
            -10,
            30,
            20,
            Advantage::Normal,
        );
        assert!(crit.hit && crit.critical);

        let meets = resolve_attack_roll(
            D20Roll { natural: 10, discarded: None },
            5,
            15,
            20,
            Advantage::Normal,
        );
        assert!(meets.hit && !meets.critical);
    }

    #[test]
    fn improved_critical_widens_the_range() {
        let grid = open_grid();
        let hero = champion(3).at(Position::new(1, 1));
        let gob = goblin().at(Position::new(2, 1));
        let roster = [hero.clone(), gob.clone()];
        let attack = available_attacks(&hero).remove(0);

        let mut dice = ScriptedDice::new([19, 4, 5]);
        let result = resolve_weapon_attack(&situation(&grid, &roster), &hero, &gob, &attack, &mut dice)
            .unwrap();
        assert!(result.roll.critical);
        assert_eq!(result.damage, 4 + 5 + 3);
    }

    #[test]
    fn melee_needs_reach() {
        let grid = open_grid();
        let hero = fighter(1).at(Position::new(1, 1));
        let gob = goblin().at(Position::new(3, 1));
        let roster = [hero.clone(), gob.clone()];
        let attack = available_attacks(&hero).remove(0);
        let err = resolve_weapon_attack(
            &situation(&grid, &roster),
            &hero,
            &gob,
            &attack,
            &mut ScriptedDice::new([20]),
        )
        .unwrap_err();
        assert_eq!(err, AttackError::OutOfReach { distance: 10, reach: 5 });
        assert_eq!(err.kind(), RejectionKind::Precondition);
    }

    #[test]
    fn attacks_are_bounded_per_turn() {
        let grid = open_grid();
        let mut hero = fighter(1).at(Position::new(1, 1));
        hero.turn.has_acted = true;
        hero.turn.attacks_made_this_turn = 1;
        let gob = goblin().at(Position::new(2, 1));
        let roster = [hero.clone(), gob.clone()];
        let attack = available_attacks(&hero).remove(0);
        assert_eq!(
            can_attack(&situation(&grid, &roster), &hero, &gob, &attack),
            Err(AttackError::NoAttacksRemaining { made: 1, max: 1 })
        );
    }

    #[test]
    fn sneak_attack_needs_an_adjacent_ally() {
        let grid = open_grid();
        let thief = rogue(5).at(Position::new(1, 1));
        let gob = goblin().at(Position::new(2, 1));
        let ally = fighter(5).at(Position::new(3, 1));
        let attack = available_attacks(&thief).remove(0);

        let alone = [thief.clone(), gob.clone()];
        let mut dice = ScriptedDice::new([15, 3]);
        let result =
            resolve_weapon_attack(&situation(&grid, &alone), &thief, &gob, &attack, &mut dice)
                .unwrap();
        assert_eq!(result.sneak_attack_damage, 0);

        let flanked = [thief.clone(), gob.clone(), ally];
        let mut dice = ScriptedDice::new([15, 3, 2, 2, 2]);
        let result =
            resolve_weapon_attack(&situation(&grid, &flanked), &thief, &gob, &attack, &mut dice)
                .unwrap();
        assert_eq!(result.sneak_attack_damage, 6);
        assert_eq!(result.damage, 3 + 3 + 6);
        assert!(result.attacker.turn.used_sneak_attack_this_turn);
    }

    #[test]
    fn prone_targets_are_easier_up_close() {
        let hero = fighter(1).at(Position::new(1, 1));
        let gob = goblin()
            .at(Position::new(2, 1))
            .with_condition(crate::state::ActiveCondition::indefinite(Condition::Prone));
        let attack = available_attacks(&hero).remove(0);
        assert_eq!(attack_advantage(&hero, &gob, &attack), Advantage::Advantage);
    }
}
