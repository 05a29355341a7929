//! Turning raw damage into HP loss, unconsciousness and death.

use tracing::debug;

use crate::features::RacialAbilityKind;
use crate::state::{ActiveCondition, Combatant, Condition, DeathSaves, with_condition};

use super::log::{LogEntry, LogKind};

/// Everything a hit changes on its target, computed without touching it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageApplication {
    pub new_hp: u32,
    pub new_temporary_hp: u32,
    pub was_conscious: bool,
    pub fell_unconscious: bool,
    pub monster_died: bool,
    pub character_died: bool,
    pub death_save_failure_added: bool,
    pub new_death_save_failures: u8,
    pub relentless_endurance_used: bool,
    pub new_conditions: Vec<ActiveCondition>,
    pub deferred_log_entries: Vec<LogEntry>,
}

impl DamageApplication {
    fn unchanged(target: &Combatant) -> Self {
        Self {
            new_hp: target.current_hp,
            new_temporary_hp: target.temporary_hp,
            was_conscious: target.current_hp > 0,
            fell_unconscious: false,
            monster_died: false,
            character_died: false,
            death_save_failure_added: false,
            new_death_save_failures: target.death_saves.failures,
            relentless_endurance_used: false,
            new_conditions: target.conditions.clone(),
            deferred_log_entries: Vec::new(),
        }
    }

    /// Produces the damaged target.
    ///
    /// Dropping to 0 HP also ends concentration.
    #[must_use]
    pub fn apply_to(&self, target: &Combatant) -> Combatant {
        let mut next = target.clone();
        next.current_hp = self.new_hp;
        next.temporary_hp = self.new_temporary_hp;
        next.conditions = self.new_conditions.clone();
        next.death_saves.failures = self.new_death_save_failures;
        if self.relentless_endurance_used
            && let Some(uses) = next
                .resources
                .racial_ability_uses
                .get_mut(&RacialAbilityKind::RelentlessEndurance)
        {
            *uses = uses.saturating_sub(1);
        }
        if self.new_hp == 0 {
            next.concentrating_on = None;
        }
        next
    }
}

fn relentless_endurance_available(target: &Combatant) -> bool {
    target.sheet().is_some_and(|sheet| {
        sheet.racial_abilities.iter().any(|a| a.kind.prevents_knockout())
    }) && target
        .resources
        .racial_ability_uses
        .get(&RacialAbilityKind::RelentlessEndurance)
        .is_some_and(|&uses| uses > 0)
}

/// Works out what `amount` damage does to `target`.
///
/// Temporary HP soak damage first. HP never drops below 0 and zero damage
/// changes nothing. A usable Relentless Endurance leaves a conscious character
/// at 1 HP; otherwise a character at 0 HP falls unconscious, and one already
/// down (and not stable) gains a death-save failure, dying on the third.
/// Monsters at 0 HP die outright.
pub fn calculate_damage_application(target: &Combatant, amount: u32) -> DamageApplication {
    let mut result = DamageApplication::unchanged(target);
    if amount == 0 {
        return result;
    }

    let absorbed = amount.min(target.temporary_hp);
    result.new_temporary_hp = target.temporary_hp - absorbed;
    let remaining = amount - absorbed;
    if remaining == 0 {
        return result;
    }

    let was_conscious = target.current_hp > 0;
    let raw_hp = target.current_hp.saturating_sub(remaining);
    result.new_hp = raw_hp;

    if target.is_character() && raw_hp == 0 {
        if was_conscious && relentless_endurance_available(target) {
            result.new_hp = 1;
            result.relentless_endurance_used = true;
            result.deferred_log_entries.push(LogEntry::new(
                LogKind::Feature,
                format!("{} endures and drops to 1 HP instead!", target.name),
            ));
        } else if was_conscious {
            result.fell_unconscious = true;
            result.new_conditions = with_condition(
                &result.new_conditions,
                ActiveCondition::indefinite(Condition::Unconscious),
            );
            result.deferred_log_entries.push(LogEntry::new(
                LogKind::Death,
                format!("{} falls unconscious!", target.name),
            ));
        } else if !target.death_saves.is_stable && !is_dead(target) {
            let failures = target.death_saves.failures + 1;
            result.death_save_failure_added = true;
            result.new_death_save_failures = failures;
            result.deferred_log_entries.push(LogEntry::new(
                LogKind::Death,
                format!(
                    "{} takes damage while down ({failures}/{} failures)",
                    target.name,
                    DeathSaves::FATAL_FAILURES
                ),
            ));
            if failures >= DeathSaves::FATAL_FAILURES {
                result.character_died = true;
                result.new_conditions = with_condition(
                    &result.new_conditions,
                    ActiveCondition::indefinite(Condition::Prone),
                );
                result.deferred_log_entries.push(LogEntry::new(
                    LogKind::Death,
                    format!("{} has died.", target.name),
                ));
            }
        }
    } else if target.is_monster() && raw_hp == 0 && was_conscious {
        result.monster_died = true;
        result.new_conditions = with_condition(
            &result.new_conditions,
            ActiveCondition::indefinite(Condition::Prone),
        );
        result.deferred_log_entries.push(LogEntry::new(
            LogKind::Death,
            format!("{} is slain!", target.name),
        ));
    }

    debug!(
        target: "tactics::damage",
        combatant = %target.id,
        amount,
        absorbed,
        hp_before = target.current_hp,
        hp_after = result.new_hp,
        "damage applied"
    );
    result
}

/// Monsters die at 0 HP; characters only after three death-save failures.
pub fn is_dead(combatant: &Combatant) -> bool {
    if combatant.is_monster() {
        combatant.current_hp == 0
    } else {
        combatant.death_saves.failures >= DeathSaves::FATAL_FAILURES
    }
}

/// How an encounter ended.
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
pub enum CombatOutcome {
    Victory,
    Defeat,
}

/// `Victory` once every monster is dead, `Defeat` once every character is,
/// `None` while the fight goes on.
pub fn check_combat_end(combatants: &[Combatant]) -> Option<CombatOutcome> {
    let all_dead = |monsters: bool| {
        combatants
            .iter()
            .filter(|c| c.is_monster() == monsters)
            .all(is_dead)
    };
    if all_dead(true) {
        Some(CombatOutcome::Victory)
    } else if all_dead(false) {
        Some(CombatOutcome::Defeat)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fighter, goblin, half_orc};

    #[test]
    fn zero_damage_is_a_no_op() {
        let hero = fighter(3);
        let result = calculate_damage_application(&hero, 0);
        assert_eq!(result.apply_to(&hero), hero);
        assert!(result.deferred_log_entries.is_empty());
    }

    #[test]
    fn hp_never_goes_negative() {
        let gob = goblin();
        for amount in [1, 6, 7, 8, 500] {
            let result = calculate_damage_application(&gob, amount);
            assert_eq!(result.new_hp, gob.current_hp.saturating_sub(amount));
        }
    }

    #[test]
    fn temporary_hp_absorbs_first() {
        let mut hero = fighter(3);
        hero.temporary_hp = 5;
        let result = calculate_damage_application(&hero, 3);
        assert_eq!(result.new_temporary_hp, 2);
        assert_eq!(result.new_hp, hero.current_hp);

        let result = calculate_damage_application(&hero, 8);
        assert_eq!(result.new_temporary_hp, 0);
        assert_eq!(result.new_hp, hero.current_hp - 3);
    }

    #[test]
    fn character_at_zero_falls_unconscious_not_dead() {
        let hero = fighter(1).with_hp(4);
        let result = calculate_damage_application(&hero, 10);
        assert!(result.fell_unconscious);
        assert!(!result.character_died);
        let downed = result.apply_to(&hero);
        assert!(downed.has_condition(Condition::Unconscious));
        assert!(!is_dead(&downed));
    }

    #[test]
    fn damage_while_down_adds_one_failure_until_death() {
        let mut hero = fighter(1).with_hp(1);
        hero = calculate_damage_application(&hero, 1).apply_to(&hero);

        for expected in 1..=3u8 {
            let result = calculate_damage_application(&hero, 4);
            assert!(result.death_save_failure_added);
            assert_eq!(result.new_death_save_failures, expected);
            assert_eq!(result.character_died, expected == 3);
            hero = result.apply_to(&hero);
        }
        assert!(is_dead(&hero));
        assert!(hero.has_condition(Condition::Prone));

        let after = calculate_damage_application(&hero, 4);
        assert!(!after.death_save_failure_added);
        assert!(!after.character_died);
    }

    #[test]
    fn stable_characters_take_no_failure() {
        let mut hero = fighter(1).with_hp(0);
        hero.death_saves.is_stable = true;
        let result = calculate_damage_application(&hero, 5);
        assert!(!result.death_save_failure_added);
        assert_eq!(result.new_death_save_failures, 0);
    }

    #[test]
    fn relentless_endurance_keeps_one_hp_once() {
        let orc = half_orc().with_hp(10);
        let first = calculate_damage_application(&orc, 10);
        assert_eq!(first.new_hp, 1);
        assert!(first.relentless_endurance_used);
        assert!(!first.fell_unconscious);
        let orc = first.apply_to(&orc);

        let orc = orc.with_hp(10);
        let second = calculate_damage_application(&orc, 10);
        assert_eq!(second.new_hp, 0);
        assert!(second.fell_unconscious);
    }

    #[test]
    fn monsters_die_at_zero() {
        let gob = goblin();
        let result = calculate_damage_application(&gob, 50);
        assert!(result.monster_died);
        let dead = result.apply_to(&gob);
        assert!(is_dead(&dead));
        assert!(dead.has_condition(Condition::Prone));
    }

    #[test]
    fn conditions_are_appended() {
        let gob = goblin().with_condition(ActiveCondition::for_turns(Condition::Poisoned, 2));
        let dead = calculate_damage_application(&gob, 50).apply_to(&gob);
        assert_eq!(dead.conditions.len(), 2);
        assert_eq!(dead.conditions[0].condition, Condition::Poisoned);
    }

    #[test]
    fn combat_end_detection() {
        let hero = fighter(1);
        let gob = goblin();
        assert_eq!(check_combat_end(&[hero.clone(), gob.clone()]), None);

        let dead_gob = calculate_damage_application(&gob, 50).apply_to(&gob);
        assert_eq!(
            check_combat_end(&[hero.clone(), dead_gob]),
            Some(CombatOutcome::Victory)
        );

        let mut dead_hero = hero.with_hp(0);
        dead_hero.death_saves.failures = 3;
        assert_eq!(check_combat_end(&[dead_hero, gob]), Some(CombatOutcome::Defeat));
    }
}
