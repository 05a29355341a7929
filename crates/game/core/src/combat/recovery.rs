//! Healing, death saving throws and concentration checks.

use crate::env::DiceRoller;
use crate::state::{
    Ability, ActiveCondition, Combatant, Condition, DeathSaves, with_condition, without_condition,
};

use super::damage::is_dead;
use super::log::{LogEntry, LogKind};
use super::saves::{SavingThrow, roll_saving_throw};

/// Restores up to `amount` HP, never above max.
///
/// A character brought up from 0 HP wakes and its death saves reset. The dead
/// stay dead.
#[must_use]
pub fn apply_healing(combatant: &Combatant, amount: u32) -> Combatant {
    if amount == 0 || is_dead(combatant) {
        return combatant.clone();
    }
    let mut next = combatant.clone();
    next.current_hp = (combatant.current_hp + amount).min(combatant.max_hp);
    if combatant.current_hp == 0 && next.current_hp > 0 {
        next.conditions = without_condition(&next.conditions, Condition::Unconscious);
        next.death_saves = DeathSaves::default();
    }
    next
}

/// Temporary HP do not stack; the larger pool is kept.
#[must_use]
pub fn grant_temporary_hp(combatant: &Combatant, amount: u32) -> Combatant {
    let mut next = combatant.clone();
    next.temporary_hp = combatant.temporary_hp.max(amount);
    next
}

// ============================================================================
// Death saves
// ============================================================================

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
pub enum DeathSaveResult {
    /// Natural 20: back on their feet with 1 HP.
    Revived,
    Success,
    Stabilized,
    Failure,
    Died,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeathSaveOutcome {
    pub combatant: Combatant,
    pub natural: u32,
    pub result: DeathSaveResult,
    pub log: Vec<LogEntry>,
}

/// Rolls a death save for a downed, unstable, living character.
///
/// Returns `None` when no save is due. A natural 20 restores 1 HP, a natural 1
/// counts as two failures, 10 or higher is a success. Three successes
/// stabilize; three failures kill.
pub fn roll_death_save(combatant: &Combatant, dice: &mut impl DiceRoller) -> Option<DeathSaveOutcome> {
    if !combatant.is_character()
        || combatant.current_hp > 0
        || combatant.death_saves.is_stable
        || is_dead(combatant)
    {
        return None;
    }

    let natural = dice.roll_d20();
    let mut next = combatant.clone();
    let saves = &mut next.death_saves;

    let result = match natural {
        20 => DeathSaveResult::Revived,
        n if n >= 10 => {
            saves.successes += 1;
            if saves.successes >= DeathSaves::STABILIZING_SUCCESSES {
                saves.is_stable = true;
                DeathSaveResult::Stabilized
            } else {
                DeathSaveResult::Success
            }
        }
        n => {
            saves.failures += if n == 1 { 2 } else { 1 };
            if saves.failures >= DeathSaves::FATAL_FAILURES {
                saves.failures = DeathSaves::FATAL_FAILURES;
                DeathSaveResult::Died
            } else {
                DeathSaveResult::Failure
            }
        }
    };

    let message = match result {
        DeathSaveResult::Revived => {
            next = apply_healing(&next, 1);
            format!("{} rolls a natural 20 and regains 1 HP!", combatant.name)
        }
        DeathSaveResult::Success => format!(
            "{} succeeds a death save ({}/{})",
            combatant.name,
            next.death_saves.successes,
            DeathSaves::STABILIZING_SUCCESSES
        ),
        DeathSaveResult::Stabilized => format!("{} is stable.", combatant.name),
        DeathSaveResult::Failure => format!(
            "{} fails a death save ({}/{})",
            combatant.name,
            next.death_saves.failures,
            DeathSaves::FATAL_FAILURES
        ),
        DeathSaveResult::Died => {
            next.conditions =
                with_condition(&next.conditions, ActiveCondition::indefinite(Condition::Prone));
            format!("{} has died.", combatant.name)
        }
    };

    Some(DeathSaveOutcome {
        combatant: next,
        natural,
        result,
        log: vec![LogEntry::new(LogKind::Death, message)],
    })
}

// ============================================================================
// Concentration
// ============================================================================

/// DC to keep concentrating after taking `damage`: half the damage, at least 10.
pub const fn concentration_dc(damage: u32) -> i32 {
    let half = (damage / 2) as i32;
    if half > 10 { half } else { 10 }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcentrationCheck {
    pub combatant: Combatant,
    pub save: SavingThrow,
    pub maintained: bool,
    pub log: Vec<LogEntry>,
}

/// Constitution save to hold concentration after taking damage.
///
/// Returns `None` when the combatant is not concentrating or took no damage.
pub fn check_concentration(
    combatant: &Combatant,
    damage: u32,
    dice: &mut impl DiceRoller,
) -> Option<ConcentrationCheck> {
    let spell = combatant.concentrating_on.as_deref()?;
    if damage == 0 {
        return None;
    }

    let save = roll_saving_throw(combatant, Ability::Constitution, concentration_dc(damage), dice);
    let mut next = combatant.clone();
    let mut log = Vec::new();
    if !save.success {
        next.concentrating_on = None;
        log.push(LogEntry::new(
            LogKind::Spell,
            format!("{} loses concentration on {spell}", combatant.name),
        ));
    }

    Some(ConcentrationCheck {
        combatant: next,
        maintained: save.success,
        save,
        log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::calculate_damage_application;
    use crate::env::ScriptedDice;
    use crate::testing::{fighter, wizard};

    fn downed() -> Combatant {
        let hero = fighter(1).with_hp(1);
        calculate_damage_application(&hero, 1).apply_to(&hero)
    }

    #[test]
    fn healing_caps_at_max_and_wakes_the_downed() {
        let hero = downed();
        let healed = apply_healing(&hero, 500);
        assert_eq!(healed.current_hp, healed.max_hp);
        assert!(!healed.has_condition(Condition::Unconscious));
        assert_eq!(healed.death_saves, DeathSaves::default());
    }

    #[test]
    fn temporary_hp_keep_the_larger_pool() {
        let hero = grant_temporary_hp(&fighter(1), 5);
        assert_eq!(grant_temporary_hp(&hero, 3).temporary_hp, 5);
        assert_eq!(grant_temporary_hp(&hero, 8).temporary_hp, 8);
    }

    #[test]
    fn death_save_outcomes() {
        let hero = downed();

        let revived = roll_death_save(&hero, &mut ScriptedDice::new([20])).unwrap();
        assert_eq!(revived.result, DeathSaveResult::Revived);
        assert_eq!(revived.combatant.current_hp, 1);

        let nat_one = roll_death_save(&hero, &mut ScriptedDice::new([1])).unwrap();
        assert_eq!(nat_one.combatant.death_saves.failures, 2);

        let mut dice = ScriptedDice::new([10, 15, 12]);
        let mut current = hero.clone();
        let mut last = DeathSaveResult::Success;
        for _ in 0..3 {
            let outcome = roll_death_save(&current, &mut dice).unwrap();
            last = outcome.result;
            current = outcome.combatant;
        }
        assert_eq!(last, DeathSaveResult::Stabilized);
        assert!(current.death_saves.is_stable);
        assert!(roll_death_save(&current, &mut dice).is_none());
    }

    #[test]
    fn three_failures_kill() {
        let mut hero = downed();
        hero.death_saves.failures = 2;
        let outcome = roll_death_save(&hero, &mut ScriptedDice::new([1])).unwrap();
        assert_eq!(outcome.result, DeathSaveResult::Died);
        assert_eq!(outcome.combatant.death_saves.failures, 3);
        assert!(is_dead(&outcome.combatant));
    }

    #[test]
    fn conscious_characters_roll_no_death_save() {
        assert!(roll_death_save(&fighter(1), &mut ScriptedDice::new([5])).is_none());
    }

    #[test]
    fn concentration_dc_floor_is_ten() {
        assert_eq!(concentration_dc(4), 10);
        assert_eq!(concentration_dc(21), 10);
        assert_eq!(concentration_dc(22), 11);
        assert_eq!(concentration_dc(40), 20);
    }

    #[test]
    fn failed_concentration_ends_the_spell() {
        let mut mage = wizard(5);
        mage.concentrating_on = Some("hold_person".into());

        let kept = check_concentration(&mage, 8, &mut ScriptedDice::new([15])).unwrap();
        assert!(kept.maintained);
        assert!(kept.combatant.is_concentrating());

        let lost = check_concentration(&mage, 8, &mut ScriptedDice::new([2])).unwrap();
        assert!(!lost.maintained);
        assert!(!lost.combatant.is_concentrating());
        assert!(check_concentration(&wizard(5), 8, &mut ScriptedDice::new([2])).is_none());
    }
}
